//! HTTP(S) source.

use crate::error::{ErrorKind, Result};
use crate::resource::validate as validate_resource;
use crate::source::Source;
use async_trait::async_trait;
use exn::ResultExt;
use reqwest::Client;
use url::Url;

/// Serves resources relative to a base URL.
///
/// # Examples
///
/// ```
/// use vellum_source::HttpSource;
///
/// let source = HttpSource::new("cdn", "https://example.org/bible/").unwrap();
/// assert_eq!(source.url_for("texts/en/web.zst").unwrap().as_str(), "https://example.org/bible/texts/en/web.zst");
/// ```
#[derive(Clone, Debug)]
pub struct HttpSource {
    name: String,
    base: Url,
    client: Client,
}
impl HttpSource {
    /// Create a source with a default [`Client`].
    pub fn new(name: impl Into<String>, base: impl AsRef<str>) -> Result<Self> {
        Self::with_client(name, base, Client::new())
    }

    /// Create a source sharing an existing [`Client`] (and its connection pool).
    pub fn with_client(name: impl Into<String>, base: impl AsRef<str>, client: Client) -> Result<Self> {
        let base = base.as_ref();
        // Url::join replaces the last segment unless the base ends in a slash.
        let normalized = if base.ends_with('/') { base.to_string() } else { format!("{base}/") };
        let base = Url::parse(&normalized).or_raise(|| ErrorKind::InvalidResource(base.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            exn::bail!(ErrorKind::InvalidResource(base.to_string()));
        }
        Ok(Self { name: name.into(), base, client })
    }

    /// Resolve a resource identifier to an absolute URL.
    pub fn url_for(&self, resource: &str) -> Result<Url> {
        let resource = validate_resource(resource)?;
        self.base.join(&resource).or_raise(|| ErrorKind::InvalidResource(resource))
    }
}

#[async_trait]
impl Source for HttpSource {
    fn name(&self) -> &str {
        &self.name
    }

    #[tracing::instrument(skip(self), fields(source = %self.name, status, size))]
    async fn fetch(&self, resource: &str) -> Result<Vec<u8>> {
        let url = self.url_for(resource)?;
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .or_raise(|| ErrorKind::Transport(url.to_string()))?;
        let status = response.status();
        tracing::Span::current().record("status", status.as_u16());
        if !status.is_success() {
            exn::bail!(ErrorKind::Fetch {
                resource: resource.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes().await.or_raise(|| ErrorKind::Transport(url.to_string()))?;
        tracing::Span::current().record("size", bytes.len());
        tracing::debug!(%url, "Fetched resource");
        Ok(bytes.to_vec())
    }
}
