//! Resource identifier validation.
//!
//! Resource identifiers are relative, `/`-separated paths such as
//! `texts/de/luther_1912.zst`. Sources resolve them against their own root
//! (a directory or a base URL), so an identifier must never climb above it.

use crate::error::{ErrorKind, Result};

/// Validates and normalizes a resource identifier.
///
/// Empty and `.` segments are dropped, `..` pops the previous segment and
/// fails if nothing is left to pop. Null bytes and backslashes are rejected.
///
/// # Examples
///
/// ```
/// use vellum_source::validate_resource;
/// assert_eq!(validate_resource("texts/en/web.zst").unwrap(), "texts/en/web.zst");
/// assert_eq!(validate_resource("/texts/./en//web.zst").unwrap(), "texts/en/web.zst");
/// assert!(validate_resource("../etc/passwd").is_err());
/// ```
pub fn validate(resource: &str) -> Result<String> {
    if resource.contains(['\0', '\\']) {
        exn::bail!(ErrorKind::InvalidResource(resource.to_string()));
    }
    let mut segments = Vec::new();
    for segment in resource.split('/') {
        match segment {
            "" | "." => {},
            ".." => {
                if segments.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidResource(resource.to_string()));
                }
            },
            other => segments.push(other),
        }
    }
    if segments.is_empty() {
        exn::bail!(ErrorKind::InvalidResource(resource.to_string()));
    }
    Ok(segments.join("/"))
}
