//! Changelog Service Client
//!
//! Sends the current and the recovered document to a remote diff service and
//! returns its markdown changelog.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use crate::error::DiffServiceError;
use crate::spec::SpecificationDocument;
use crate::utils::truncate::{snippet, SNIPPET_BYTES};

/// Produces a human-readable changelog between two documents
#[async_trait]
pub trait Changelog: Send + Sync {
    async fn changelog(
        &self,
        old: &SpecificationDocument,
        new: &SpecificationDocument,
    ) -> Result<String, DiffServiceError>;
}

pub struct DiffServiceClient {
    client: Client,
    endpoint: String,
}

impl DiffServiceClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            endpoint: endpoint.into(),
        })
    }

    fn json_part(name: &'static str, doc: &SpecificationDocument) -> Result<Part, DiffServiceError> {
        let bytes = serde_json::to_vec(doc)?;
        Ok(Part::bytes(bytes)
            .file_name(format!("{name}.json"))
            .mime_str("application/json")?)
    }
}

#[async_trait]
impl Changelog for DiffServiceClient {
    async fn changelog(
        &self,
        old: &SpecificationDocument,
        new: &SpecificationDocument,
    ) -> Result<String, DiffServiceError> {
        let form = Form::new()
            .part("base", Self::json_part("base", old)?)
            .part("revision", Self::json_part("revision", new)?);

        debug!("POST {} ({} -> {})", self.endpoint, old.info.version, new.info.version);
        let response = self.client.post(&self.endpoint).multipart(form).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(DiffServiceError::Status {
                status: status.as_u16(),
                snippet: snippet(&body, SNIPPET_BYTES),
            });
        }

        Ok(body)
    }
}
