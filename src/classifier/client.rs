use anyhow::{Context, Result};
use futures::future::BoxFuture;
use reqwest::Client;

use crate::{config::ClassifierConfig, domain::ClassificationLabel};

use super::{
    protocol::{build_request, parse_response},
    Classifier,
};

/// HTTP client for the prediction service (`POST {"url": ..}` → `{"label": ..}`).
#[derive(Clone)]
pub struct PredictionClient {
    http: Client,
    config: ClassifierConfig,
}

impl PredictionClient {
    pub fn new(http: Client, config: ClassifierConfig) -> Self {
        Self { http, config }
    }

    pub async fn predict(&self, url: &str) -> Result<ClassificationLabel> {
        let response = self
            .http
            .post(self.config.endpoint.clone())
            .timeout(self.config.timeout)
            .json(&build_request(url))
            .send()
            .await
            .with_context(|| format!("prediction request for {url} failed"))?
            .error_for_status()
            .context("prediction service returned an error status")?;

        parse_response(response).await
    }
}

impl Classifier for PredictionClient {
    fn classify<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<ClassificationLabel>> {
        Box::pin(self.predict(url))
    }
}
