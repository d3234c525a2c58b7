//! In-memory source for testing.

use crate::error::{ErrorKind, Result};
use crate::resource::validate as validate_resource;
use crate::source::Source;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

/// In-memory source for testing.
///
/// Resources live in a `HashMap` behind a [`RwLock`]. Resources can be
/// registered as failing with a given HTTP status, and every fetch is counted
/// so tests can assert whether the cache was consulted first.
///
/// # Examples
///
/// ```
/// use vellum_source::{MockSource, Source};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let source = MockSource::with_resources([("texts/en/web.txt", "Genesis 1:1 In the beginning")]);
/// assert_eq!(source.fetch("texts/en/web.txt").await.unwrap(), b"Genesis 1:1 In the beginning");
/// assert_eq!(source.fetch_count(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct MockSource {
    resources: RwLock<HashMap<String, Response>>,
    fetches: AtomicUsize,
}

enum Response {
    Body(Vec<u8>),
    Status(u16),
}

impl MockSource {
    /// Create a mock source pre-populated with resources.
    ///
    /// Panics if any identifier fails validation. If test setup is wrong,
    /// then test should not pass.
    pub fn with_resources(resources: impl IntoIterator<Item = (impl Into<String>, impl Into<Vec<u8>>)>) -> Self {
        let mut map = HashMap::new();
        for (resource, data) in resources {
            let resource = resource.into();
            let Ok(validated) = validate_resource(&resource) else {
                panic!("MockSource::with_resources: invalid resource {resource}");
            };
            map.insert(validated, Response::Body(data.into()));
        }
        Self {
            resources: RwLock::new(map),
            fetches: AtomicUsize::new(0),
        }
    }

    /// Add or replace a resource.
    pub async fn insert(&self, resource: &str, data: impl Into<Vec<u8>>) {
        let Ok(validated) = validate_resource(resource) else {
            panic!("MockSource::insert: invalid resource {resource}");
        };
        self.resources.write().await.insert(validated, Response::Body(data.into()));
    }

    /// Make every fetch of `resource` fail with the given HTTP status.
    pub async fn fail_with(&self, resource: &str, status: u16) {
        let Ok(validated) = validate_resource(resource) else {
            panic!("MockSource::fail_with: invalid resource {resource}");
        };
        self.resources.write().await.insert(validated, Response::Status(status));
    }

    /// Number of fetches attempted so far, successful or not.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Source for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, resource: &str) -> Result<Vec<u8>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let validated = validate_resource(resource)?;
        match self.resources.read().await.get(&validated) {
            Some(Response::Body(data)) => Ok(data.clone()),
            Some(Response::Status(status)) => exn::bail!(ErrorKind::Fetch {
                resource: resource.to_string(),
                status: *status,
            }),
            None => exn::bail!(ErrorKind::NotFound(resource.to_string())),
        }
    }
}
