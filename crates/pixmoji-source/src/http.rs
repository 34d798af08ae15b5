//! reqwest-backed fetchers
//!
//! Both hold an optional client: `close` drops it, `reopen` builds a fresh
//! one from the same [`HttpConfig`]. Fetching while closed fails with
//! [`FetchError::SessionClosed`], which the asset source turns into a miss.

use std::future::Future;
use std::time::Duration;

use pixmoji_core::{AsyncFetch, Fetch, FetchError, FetchResponse, PixmojiError, Result};

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0";

/// Session settings shared by the blocking and async fetchers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpConfig {
    /// Some CDNs refuse requests without a browser-like agent
    pub user_agent: String,
    pub timeout: Option<Duration>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl HttpConfig {
    pub fn validate(&self) -> Result<()> {
        if self.user_agent.trim().is_empty() {
            return Err(PixmojiError::Config("user agent must not be blank".into()));
        }
        if self.timeout == Some(Duration::ZERO) {
            return Err(PixmojiError::Config("timeout must be positive".into()));
        }
        Ok(())
    }
}

fn transport(err: reqwest::Error) -> FetchError {
    if err.is_builder() {
        FetchError::InvalidUrl(err.to_string())
    } else {
        FetchError::Transport(err.to_string())
    }
}

/// Blocking HTTP fetcher
///
/// Must not be used from inside an async runtime; use [`AsyncHttpFetcher`]
/// there.
#[derive(Debug)]
pub struct HttpFetcher {
    config: HttpConfig,
    client: Option<reqwest::blocking::Client>,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_config(HttpConfig::default())
    }

    pub fn with_config(config: HttpConfig) -> Result<Self> {
        config.validate()?;
        let client = Self::connect(&config)?;
        Ok(Self {
            config,
            client: Some(client),
        })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }

    fn connect(config: &HttpConfig) -> Result<reqwest::blocking::Client> {
        reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()
            .map_err(|e| PixmojiError::Fetch(transport(e)))
    }
}

impl Fetch for HttpFetcher {
    fn name(&self) -> &'static str {
        "reqwest-blocking"
    }

    fn fetch(&self, url: &str) -> std::result::Result<FetchResponse, FetchError> {
        let client = self.client.as_ref().ok_or(FetchError::SessionClosed)?;
        let response = client.get(url).send().map_err(transport)?;
        let status = response.status().as_u16();
        if !response.status().is_success() {
            return Ok(FetchResponse::new(status, Vec::new()));
        }
        let body = response.bytes().map_err(transport)?;
        Ok(FetchResponse::new(status, body.to_vec()))
    }

    fn close(&mut self) {
        if self.client.take().is_some() {
            log::debug!("Closed blocking HTTP session");
        }
    }

    fn reopen(&mut self) -> Result<()> {
        if self.client.is_none() {
            self.client = Some(Self::connect(&self.config)?);
            log::debug!("Reopened blocking HTTP session");
        }
        Ok(())
    }
}

/// Async HTTP fetcher, for use inside a tokio runtime
#[derive(Debug, Clone)]
pub struct AsyncHttpFetcher {
    config: HttpConfig,
    client: Option<reqwest::Client>,
}

impl AsyncHttpFetcher {
    pub fn new() -> Result<Self> {
        Self::with_config(HttpConfig::default())
    }

    pub fn with_config(config: HttpConfig) -> Result<Self> {
        config.validate()?;
        let client = Self::connect(&config)?;
        Ok(Self {
            config,
            client: Some(client),
        })
    }

    pub fn config(&self) -> &HttpConfig {
        &self.config
    }

    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }

    fn connect(config: &HttpConfig) -> Result<reqwest::Client> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.as_str());
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        builder.build().map_err(|e| PixmojiError::Fetch(transport(e)))
    }
}

impl AsyncFetch for AsyncHttpFetcher {
    fn name(&self) -> &'static str {
        "reqwest"
    }

    fn fetch(
        &self,
        url: &str,
    ) -> impl Future<Output = std::result::Result<FetchResponse, FetchError>> + Send {
        // reqwest clients are reference counted, so the clone is cheap
        let client = self.client.clone();
        let url = url.to_owned();
        async move {
            let client = client.ok_or(FetchError::SessionClosed)?;
            let response = client.get(&url).send().await.map_err(transport)?;
            let status = response.status().as_u16();
            if !response.status().is_success() {
                return Ok(FetchResponse::new(status, Vec::new()));
            }
            let body = response.bytes().await.map_err(transport)?;
            Ok(FetchResponse::new(status, body.to_vec()))
        }
    }

    fn close(&mut self) {
        if self.client.take().is_some() {
            log::debug!("Closed async HTTP session");
        }
    }

    fn reopen(&mut self) -> Result<()> {
        if self.client.is_none() {
            self.client = Some(Self::connect(&self.config)?);
            log::debug!("Reopened async HTTP session");
        }
        Ok(())
    }
}
