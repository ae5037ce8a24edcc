use chrono::NaiveTime;

use crate::error::{ClientError, Result};

/// Default page size requested from list endpoints.
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Connection settings for one course on the platform.
#[derive(Debug, Clone)]
pub struct Config {
    /// Platform domain, e.g. "https://school.instructure.com" (no trailing slash).
    pub base_url: String,
    /// Bearer token sent on every request.
    pub access_token: String,
    pub course_id: u64,
    /// Items requested per page on list endpoints (default: 100)
    pub per_page: u32,
    /// Due time used when a schedule column carries only a date (default: 23:59)
    pub default_due_time: NaiveTime,
}

impl Config {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>, course_id: u64) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            course_id,
            per_page: DEFAULT_PER_PAGE,
            default_due_time: default_due_time(),
        }
    }

    /// Checks the values a request cannot be made without.
    pub fn validate(&self) -> Result<()> {
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ClientError::Config(format!(
                "base URL must start with http:// or https://, got '{}'",
                self.base_url
            )));
        }
        if self.access_token.trim().is_empty() {
            return Err(ClientError::Config("access token is empty".to_string()));
        }
        if self.per_page == 0 {
            return Err(ClientError::Config("per_page must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn default_due_time() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN)
}
