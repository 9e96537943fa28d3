//! HTTP client core for the screenscraper.fr API.
//!
//! All API commands are plain GETs against
//! `<base>/<command>.php` with the caller's credentials, `output=xml` and
//! the command's own parameters in the query string. Responses are validated
//! by an exact XML-prolog check before anything downstream parses them.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ScraperConfig;
use crate::error::{Error, Result};
use crate::scraper::ResponseCache;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Exact prolog a well-formed service response must start with. HTTP-level
/// errors often come back as 200s with an HTML or plain-text body, so this
/// check is the only envelope validation there is.
pub const XML_PROLOG: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\" ?>";

pub(crate) const CMD_USER_INFO: &str = "ssuserInfos";
pub(crate) const CMD_SYSTEM_LIST: &str = "systemesListe";
pub(crate) const CMD_GAME_INFO: &str = "jeuInfos";

// ---------------------------------------------------------------------------
// Credentials
// ---------------------------------------------------------------------------

/// API credentials, supplied once at client construction and immutable for
/// the client's lifetime.
///
/// ScreenScraper authenticates both the integrating software (dev id +
/// password + software name) and the end user (ssid + password).
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Credentials {
    /// Developer id issued by screenscraper.fr.
    #[serde(default)]
    pub dev_id: String,

    /// Developer password.
    #[serde(default)]
    pub dev_password: String,

    /// Name of the client software, as registered with the service.
    #[serde(default)]
    pub soft_name: String,

    /// End-user account id.
    #[serde(default)]
    pub user_id: String,

    /// End-user account password.
    #[serde(default)]
    pub user_password: String,
}

impl Credentials {
    /// Returns `true` when enough fields are present to authenticate.
    pub fn is_complete(&self) -> bool {
        !self.dev_id.is_empty() && !self.soft_name.is_empty() && !self.user_id.is_empty()
    }

    fn query_params(&self) -> [(&'static str, &str); 5] {
        [
            ("devid", self.dev_id.as_str()),
            ("devpassword", self.dev_password.as_str()),
            ("softname", self.soft_name.as_str()),
            ("ssid", self.user_id.as_str()),
            ("sspassword", self.user_password.as_str()),
        ]
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for the screenscraper.fr API.
///
/// Holds the HTTP client, the credentials and the on-disk response cache.
/// One request is in flight at a time; retries within a lookup are strictly
/// sequential because each rung depends on the previous failure.
pub struct ScraperClient {
    client: reqwest::Client,
    base_url: String,
    credentials: Credentials,
    cache: ResponseCache,
}

impl ScraperClient {
    /// Create a new client from credentials and scraper configuration.
    pub fn new(credentials: Credentials, config: &ScraperConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .expect("failed to build reqwest client");

        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials,
            cache: ResponseCache::new(config.cache_dir.clone()),
        }
    }

    /// The on-disk response cache.
    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Execute one API command and validate the response envelope.
    ///
    /// Transport failures (DNS, refused connections, non-2xx statuses)
    /// propagate as [`Error::Http`] and are never retried here. A 2xx body
    /// that does not start with the expected XML prolog becomes
    /// [`Error::InvalidResponse`], which the lookup ladder treats as a
    /// recoverable miss.
    pub(crate) async fn send(&self, command: &str, params: &[(&str, String)]) -> Result<String> {
        let url = format!("{}/{}.php", self.base_url, command);
        debug!(url = %url, command = command, "scraper request");

        let resp = self
            .client
            .get(&url)
            .query(&self.credentials.query_params())
            .query(&[("output", "xml")])
            .query(params)
            .send()
            .await?
            .error_for_status()?;

        let final_url = resp.url().to_string();
        let body = resp.text().await?;

        if !body.starts_with(XML_PROLOG) {
            return Err(Error::InvalidResponse {
                url: final_url,
                body,
            });
        }

        Ok(body)
    }
}
