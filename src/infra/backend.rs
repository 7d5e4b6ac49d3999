//! REST client for the hosted quote store: row inserts plus object storage
//! uploads, Supabase wire format.

use reqwest::{header, Client, StatusCode, Url};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use crate::domain::quote::QuoteRecord;
use crate::util::version;

const QUOTES_TABLE: &str = "quotes";
const DOCUMENTS_TABLE: &str = "quote_documents";

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("failed to build backend HTTP client: {0}")]
    BuildClient(reqwest::Error),
    #[error("backend request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend rejected {context}: status {status}: {body}")]
    Api {
        context: &'static str,
        status: u16,
        body: String,
    },
}

/// Client for the delivery backend. Both row inserts must succeed for a
/// submission; there is no rollback of the first insert when the second
/// fails.
pub struct BackendClient {
    http: Client,
    base_url: Url,
    api_key: String,
    bucket: String,
}

impl BackendClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Result<Self, BackendError> {
        let base_url = Url::parse(base_url)?;
        let http = Client::builder()
            .user_agent(version::user_agent())
            .build()
            .map_err(BackendError::BuildClient)?;
        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
            bucket: bucket.into(),
        })
    }

    pub async fn insert_quote(&self, record: &QuoteRecord) -> Result<(), BackendError> {
        self.insert(QUOTES_TABLE, record, "quote record").await?;
        info!(id = %record.id, "quote record persisted");
        Ok(())
    }

    pub async fn insert_document(&self, id: &str, html: &str) -> Result<(), BackendError> {
        let row = json!({ "id": id, "html": html });
        self.insert(DOCUMENTS_TABLE, &row, "quote document").await?;
        info!(%id, "quote document persisted");
        Ok(())
    }

    async fn insert<T: Serialize + ?Sized>(
        &self,
        table: &str,
        row: &T,
        context: &'static str,
    ) -> Result<(), BackendError> {
        let url = self.base_url.join(&format!("/rest/v1/{table}"))?;
        let response = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                context,
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    /// Upload the rendered document under the quote id. An object that
    /// already exists counts as success; either way the public URL is
    /// constructed deterministically.
    pub async fn upload_document(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<String, BackendError> {
        let url = self
            .base_url
            .join(&format!("/storage/v1/object/{}/{}", self.bucket, filename))?;
        let response = self
            .http
            .post(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header(header::CONTENT_TYPE, "text/html")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            debug!(%filename, "document already uploaded, reusing object");
        } else if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                context: "document upload",
                status: status.as_u16(),
                body,
            });
        }

        Ok(self.public_url(filename))
    }

    pub fn public_url(&self, filename: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            self.bucket,
            filename
        )
    }
}
