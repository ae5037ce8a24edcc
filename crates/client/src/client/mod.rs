//! HTTP client for the platform's REST API.

pub mod assignments;
pub mod enrollments;
pub mod events;
pub mod groups;

use coursesync_core::pagination::{next_page_link, resolve_next_page};
use coursesync_core::platform::PlatformError;
use reqwest::header::LINK;
use serde::de::DeserializeOwned;

use crate::config::Config;
use crate::error::Result;

/// HTTP client bound to one course.
#[derive(Debug, Clone)]
pub struct CanvasClient {
    client: reqwest::Client,
    base_url: String,
    access_token: String,
    course_id: u64,
    per_page: u32,
}

impl CanvasClient {
    /// Create a client from a validated configuration.
    pub fn new(config: &Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: reqwest::Client::new(),
            base_url: config.base_url.clone(),
            access_token: config.access_token.clone(),
            course_id: config.course_id,
            per_page: config.per_page,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn course_id(&self) -> u64 {
        self.course_id
    }

    /// Build a URL for an API path.
    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    /// Build a URL for a path under the configured course.
    fn course_url(&self, path: &str) -> String {
        self.url(&format!("/courses/{}{}", self.course_id, path))
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.get(url).bearer_auth(&self.access_token)
    }

    fn post(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.post(url).bearer_auth(&self.access_token)
    }

    fn delete(&self, url: &str) -> reqwest::RequestBuilder {
        self.client.delete(url).bearer_auth(&self.access_token)
    }

    /// Fetch every page of a list endpoint.
    ///
    /// The query is sent with the first request only; next-page links already
    /// carry it. Any non-success page aborts the whole fetch.
    async fn get_paged<T: DeserializeOwned>(
        &self,
        resource: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> std::result::Result<Vec<T>, PlatformError> {
        let mut request = self
            .get(url)
            .query(&[("per_page", self.per_page.to_string())])
            .query(query);
        let mut items = Vec::new();
        let mut page = 1;

        loop {
            let response = request.send().await.map_err(transport)?;
            let status = response.status();
            let current = response.url().clone();
            let next = response
                .headers()
                .get(LINK)
                .and_then(|value| value.to_str().ok())
                .and_then(next_page_link);

            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(PlatformError::Fetch {
                    resource: resource.to_string(),
                    status: status.as_u16(),
                    body,
                });
            }

            let mut batch: Vec<T> = response
                .json()
                .await
                .map_err(|e| PlatformError::InvalidResponse(format!("{resource}: {e}")))?;
            tracing::debug!(resource, page, count = batch.len(), "Fetched page");
            items.append(&mut batch);

            let Some(link) = next else {
                break;
            };
            let next_url = resolve_next_page(&current, &link)
                .map_err(|e| PlatformError::InvalidResponse(format!("bad next link '{link}': {e}")))?;
            request = self.get(next_url.as_str());
            page += 1;
        }

        Ok(items)
    }

    /// Fetch a single resource.
    async fn get_one<T: DeserializeOwned>(
        &self,
        resource: &str,
        url: &str,
    ) -> std::result::Result<T, PlatformError> {
        let response = self.get(url).send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Fetch {
                resource: resource.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        response
            .json()
            .await
            .map_err(|e| PlatformError::InvalidResponse(format!("{resource}: {e}")))
    }

    /// Handle a create response: any 2xx carries the created record.
    async fn handle_mutation<T: DeserializeOwned>(
        &self,
        action: &str,
        response: reqwest::Response,
    ) -> std::result::Result<T, PlatformError> {
        let status = response.status();
        if !status.is_success() {
            return Err(mutation_error(action, response).await);
        }
        tracing::debug!(action, status = status.as_u16(), "Mutation succeeded");
        response
            .json()
            .await
            .map_err(|e| PlatformError::InvalidResponse(format!("{action}: {e}")))
    }

    /// Handle delete responses (body ignored).
    async fn handle_delete_response(
        &self,
        action: &str,
        response: reqwest::Response,
    ) -> std::result::Result<(), PlatformError> {
        if response.status().is_success() {
            Ok(())
        } else {
            Err(mutation_error(action, response).await)
        }
    }
}

async fn mutation_error(action: &str, response: reqwest::Response) -> PlatformError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    PlatformError::Mutation {
        action: action.to_string(),
        status,
        body,
    }
}

fn transport(error: reqwest::Error) -> PlatformError {
    PlatformError::Transport(error.to_string())
}
