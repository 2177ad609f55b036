use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{redirect, Client, Method, Response};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::errors::{Result, ShoutError};
use crate::types::{AnnouncementIn, EventIn, StateOut, StateRaw, TopicState};

const EVENTS_PATH: &str = "/events";
const JSON: &str = "application/json";

/// Number of redirects the default transport follows before the final
/// response is checked for a 2xx status
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

static DEFAULT_TRANSPORT: OnceLock<ClientWithMiddleware> = OnceLock::new();

/// The process-wide transport used by [`ShoutClient::new`]
///
/// Built on first use with reqwest defaults: no timeout, up to
/// [`DEFAULT_MAX_REDIRECTS`] redirects. Clones share one connection pool.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built. A failed build is
/// not cached, so the next call tries again.
pub fn default_transport() -> Result<ClientWithMiddleware> {
    if let Some(client) = DEFAULT_TRANSPORT.get() {
        return Ok(client.clone());
    }

    let client = Client::builder()
        .redirect(redirect::Policy::limited(DEFAULT_MAX_REDIRECTS))
        .build()
        .map_err(ShoutError::BuildHttpClient)?;

    // Keep whichever client was stored first.
    Ok(DEFAULT_TRANSPORT
        .get_or_init(|| ClientBuilder::new(client).build())
        .clone())
}

/// Client for posting events and announcements to SHOUT!
///
/// # Example
///
/// ```rust,no_run
/// use shout_client::{EventIn, ShoutClient, TopicState};
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = ShoutClient::builder("http://localhost:8080")
///         .timeout(Duration::from_secs(10))
///         .build()?;
///
///     let event = EventIn::broken("nightly-backup").with_message("disk full");
///
///     let state = client.post_event(&event).await?;
///     if state.state == TopicState::Broken {
///         println!("{} is broken since {}", state.name, state.last.occurred_at);
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct ShoutClient {
    client: ClientWithMiddleware,
    target: String,
}

impl ShoutClient {
    /// Create a client that uses the [`default_transport`]
    ///
    /// Request paths are appended to `target` as-is, so it should not end
    /// with a slash.
    ///
    /// # Errors
    ///
    /// Returns an error if the default HTTP client cannot be built.
    pub fn new(target: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(default_transport()?, target))
    }

    /// Create a new client with a custom reqwest middleware client
    ///
    /// This allows you to add custom middleware (retry, logging, etc.)
    pub fn with_client(client: ClientWithMiddleware, target: impl Into<String>) -> Self {
        Self {
            client,
            target: target.into(),
        }
    }

    /// Start configuring a client with its own transport
    pub fn builder(target: impl Into<String>) -> ShoutClientBuilder {
        ShoutClientBuilder::new(target)
    }

    /// Get the target base URL
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Post an event, updating the state of its topic
    ///
    /// SHOUT! notifies its configured backends if the state of the topic
    /// changed. `occurred_at` is sent as whole seconds.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request cannot be built or sent
    /// - SHOUT! returns a status code of 300 or above
    /// - The response body is not the expected JSON
    #[instrument(
        name = "ShoutClient::post_event",
        skip_all,
        fields(topic = %event.topic, ok = event.ok)
    )]
    pub async fn post_event(&self, event: &EventIn) -> Result<StateOut> {
        let body = serde_json::to_vec(event).map_err(ShoutError::Serialize)?;

        let response = self.do_request(Method::POST, EVENTS_PATH, body).await?;
        let bytes = response.bytes().await.map_err(ShoutError::ReadBody)?;

        let raw: StateRaw = serde_json::from_slice(&bytes).map_err(ShoutError::Decode)?;

        if TopicState::from_wire(&raw.state).is_none() {
            warn!(state = %raw.state, "Unknown topic state, treating as working");
        }

        let state = StateOut::from(raw);
        debug!(name = %state.name, state = %state.state, "Event posted");
        Ok(state)
    }

    /// Post an announcement
    ///
    /// Announcements have no working or broken state, so SHOUT! always
    /// sends them on. The response body is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The request cannot be built or sent
    /// - SHOUT! returns a status code of 300 or above
    #[instrument(
        name = "ShoutClient::post_announcement",
        skip_all,
        fields(topic = %announcement.topic)
    )]
    pub async fn post_announcement(&self, announcement: &AnnouncementIn) -> Result<()> {
        let body = serde_json::to_vec(announcement).map_err(ShoutError::Serialize)?;

        let response = self.do_request(Method::POST, EVENTS_PATH, body).await?;
        response.bytes().await.map_err(ShoutError::ReadBody)?;

        debug!("Announcement posted");
        Ok(())
    }

    async fn do_request(&self, method: Method, path: &str, body: Vec<u8>) -> Result<Response> {
        let raw_url = format!("{}{}", self.target, path);
        let url = Url::parse(&raw_url).map_err(|source| ShoutError::InvalidUrl {
            url: raw_url,
            source,
        })?;

        debug!(method = %method, url = %url, "Sending request to SHOUT!");

        let response = self
            .client
            .request(method, url)
            .header(CONTENT_TYPE, JSON)
            .header(ACCEPT, JSON)
            .body(body)
            .send()
            .await
            .map_err(ShoutError::Request)?;

        let status = response.status();

        if status.as_u16() >= 300 {
            let message = response.text().await.unwrap_or_default();
            return Err(ShoutError::Api {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
                message,
            });
        }

        Ok(response)
    }
}

/// Builder for a [`ShoutClient`] with a dedicated transport
#[derive(Debug, Clone)]
pub struct ShoutClientBuilder {
    target: String,
    timeout: Option<Duration>,
    max_redirects: usize,
}

impl ShoutClientBuilder {
    fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            timeout: None,
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }

    /// Total timeout for each request
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Maximum number of redirects to follow, 0 disables redirects
    ///
    /// A redirect that is not followed is reported as an API error.
    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Build the client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn build(self) -> Result<ShoutClient> {
        let policy = match self.max_redirects {
            0 => redirect::Policy::none(),
            n => redirect::Policy::limited(n),
        };

        let mut builder = Client::builder().redirect(policy);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder.build().map_err(ShoutError::BuildHttpClient)?;
        let client = ClientBuilder::new(client).build();

        Ok(ShoutClient::with_client(client, self.target))
    }
}
