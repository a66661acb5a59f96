//! Client for the external annotation service.
//!
//! Each accepted article's body is sent once; the service's JSON reply is
//! passed through untouched.

use crate::credentials::Credentials;
use crate::error::AnnotationError;
use serde::Serialize;
use serde_json::Value;

/// Something that can annotate text
pub trait Annotator {
    async fn annotate(&self, text: &str) -> Result<Value, AnnotationError>;
}

#[derive(Serialize)]
struct ArticutRequest<'a> {
    username: &'a str,
    api_key: &'a str,
    input_str: &'a str,
}

/// Annotator backed by the Articut HTTP API
pub struct ArticutClient {
    http: reqwest::Client,
    endpoint: String,
    credentials: Credentials,
}

impl ArticutClient {
    pub fn new(endpoint: &str, credentials: Credentials) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint: endpoint.to_string(),
            credentials,
        }
    }
}

impl Annotator for ArticutClient {
    async fn annotate(&self, text: &str) -> Result<Value, AnnotationError> {
        let request = ArticutRequest {
            username: &self.credentials.username,
            api_key: &self.credentials.apikey,
            input_str: text,
        };

        let response = self.http.post(&self.endpoint).json(&request).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AnnotationError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<Value>().await?)
    }
}
