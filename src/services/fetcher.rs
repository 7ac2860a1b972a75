// src/services/fetcher.rs

//! Listing page and document retrieval.

use async_trait::async_trait;
use reqwest::Client;

use crate::error::{AppError, Result};
use crate::models::Config;
use crate::utils::http::create_async_client;

/// Source of raw listing pages and document bytes.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Retrieve the listing page body.
    ///
    /// Only transport failures are errors; a non-success status with a body
    /// is returned as-is and left to the extractor.
    async fn fetch_page(&self) -> Result<String>;

    /// Retrieve a document. Non-success statuses are errors here.
    async fn fetch_document(&self, url: &str) -> Result<Vec<u8>>;
}

/// HTTP implementation of [`PageFetcher`] for a fixed listing URL.
pub struct HttpFetcher {
    client: Client,
    source_url: String,
}

impl HttpFetcher {
    /// Create a fetcher with a client built from the configuration.
    pub fn new(config: &Config) -> Result<Self> {
        let client = create_async_client(&config.http)?;
        Ok(Self::with_client(client, &config.source.url))
    }

    /// Create a fetcher around an existing client.
    pub fn with_client(client: Client, source_url: impl Into<String>) -> Self {
        Self {
            client,
            source_url: source_url.into(),
        }
    }

    pub fn source_url(&self) -> &str {
        &self.source_url
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.source_url)
            .send()
            .await
            .map_err(|e| AppError::fetch(&self.source_url, e))?;

        if !response.status().is_success() {
            log::warn!(
                "Listing page {} answered with status {}",
                self.source_url,
                response.status()
            );
        }

        response
            .text()
            .await
            .map_err(|e| AppError::fetch(&self.source_url, e))
    }

    async fn fetch_document(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AppError::fetch(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(url, format!("HTTP status {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::fetch(url, e))?;
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fetcher_for(server: &MockServer, page: &str) -> HttpFetcher {
        HttpFetcher::with_client(Client::new(), format!("{}{}", server.uri(), page))
    }

    #[tokio::test]
    async fn test_fetch_page_returns_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/bienes/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&server)
            .await;

        let body = fetcher_for(&server, "/bienes/").fetch_page().await.unwrap();
        assert_eq!(body, "<html>ok</html>");
    }

    #[tokio::test]
    async fn test_fetch_page_tolerates_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let body = fetcher_for(&server, "/").fetch_page().await.unwrap();
        assert_eq!(body, "maintenance");
    }

    #[tokio::test]
    async fn test_fetch_document_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/doc.pdf"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server, "/");
        let err = fetcher
            .fetch_document(&format!("{}/doc.pdf", server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Fetch { .. }));
    }

    #[tokio::test]
    async fn test_fetch_document_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/doc.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
            .mount(&server)
            .await;

        let fetcher = fetcher_for(&server, "/");
        let bytes = fetcher
            .fetch_document(&format!("{}/doc.pdf", server.uri()))
            .await
            .unwrap();
        assert_eq!(bytes, b"%PDF-1.4");
    }
}
