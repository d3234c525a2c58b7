//! Local filesystem source.
//!
//! Serves resources from a directory via `tokio::fs`.

use crate::error::{ErrorKind, Result};
use crate::resource::validate as validate_resource;
use crate::source::Source;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Local filesystem source.
///
/// # Examples
///
/// ```no_run
/// use vellum_source::LocalSource;
///
/// # fn example() -> vellum_source::error::Result<()> {
/// let source = LocalSource::new("local", "/srv/vellum")?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalSource {
    name: String,
    /// Directory that resource identifiers are resolved against
    root: PathBuf,
}
impl LocalSource {
    /// Create a new local filesystem source.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not an existing directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            exn::bail!(ErrorKind::InvalidResource(root.display().to_string()));
        }
        Ok(Self { name: name.into(), root })
    }

    fn absolute_path(&self, resource: &str) -> Result<PathBuf> {
        Ok(self.root.join(validate_resource(resource)?))
    }

    fn map_io_error(e: std::io::Error, resource: &str) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(resource.to_string()),
            _ => ErrorKind::Io(e),
        }
    }
}

#[async_trait]
impl Source for LocalSource {
    fn name(&self) -> &str {
        &self.name
    }

    #[tracing::instrument(skip(self), fields(source = %self.name))]
    async fn fetch(&self, resource: &str) -> Result<Vec<u8>> {
        let path = self.absolute_path(resource)?;
        Ok(fs::read(&path).await.map_err(|e| Self::map_io_error(e, resource))?)
    }
}
