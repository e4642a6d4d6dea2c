mod client;
pub mod protocol;

use anyhow::Result;
use futures::future::BoxFuture;

use crate::domain::ClassificationLabel;

pub use client::PredictionClient;

/// Remote verdict for a single URL. One request, one response, no retries.
pub trait Classifier: Send + Sync {
    fn classify<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<ClassificationLabel>>;
}
