use anyhow::{Context, Result};
use reqwest::Response;
use serde::Serialize;
use serde_json::Value;

use crate::domain::ClassificationLabel;

#[derive(Debug, Serialize)]
pub struct PredictRequest<'a> {
    pub url: &'a str,
}

pub fn build_request(url: &str) -> PredictRequest<'_> {
    PredictRequest { url }
}

/// Reads the prediction body. A body that is not JSON is an error; any JSON
/// without a string `label` field (including the service's `{"error": ..}`
/// reply) degrades to `Unknown`.
pub async fn parse_response(response: Response) -> Result<ClassificationLabel> {
    let body = response
        .text()
        .await
        .context("failed to read prediction response body")?;
    parse_body(&body)
}

pub fn parse_body(body: &str) -> Result<ClassificationLabel> {
    let value: Value =
        serde_json::from_str(body).context("prediction response is not valid JSON")?;
    let label = value
        .get("label")
        .and_then(Value::as_str)
        .map(ClassificationLabel::from)
        .unwrap_or_default();
    Ok(label)
}
