//! Client configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;

/// Where the service runs during local development.
pub const DEV_ORIGIN: &str = "http://localhost:8000";

/// Path prefix of the service API under its origin.
const API_PREFIX: &str = "/api";

/// Timeout applied to every request issued through the API client.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Selects the base endpoints the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildMode {
    /// Service on the developer machine at [`DEV_ORIGIN`].
    Development,
    /// Service reachable under the deployment origin with root-relative paths.
    Production,
}

impl Default for BuildMode {
    /// Debug builds talk to the local service, release builds to the deployment.
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => f.write_str("development"),
            Self::Production => f.write_str("production"),
        }
    }
}

impl FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(format!("unknown mode '{}'", other)),
        }
    }
}

/// How `download_psd` treats a non-success response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DownloadPolicy {
    /// Hand the body to the downloader whatever the status was.
    #[default]
    Passthrough,
    /// Fail with the HTTP error before anything is saved.
    Strict,
}

/// Transfer client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base endpoint selection.
    pub mode: BuildMode,

    /// Origin that root-relative production routes resolve against.
    pub origin: Option<Url>,

    /// Timeout for upload, status and health requests.
    pub timeout: Duration,

    /// Status handling for the PSD download.
    pub download_policy: DownloadPolicy,
}

impl ClientConfig {
    /// Configuration for the given mode with default timeout and policy.
    pub fn for_mode(mode: BuildMode) -> Self {
        Self {
            mode,
            origin: None,
            timeout: DEFAULT_TIMEOUT,
            download_policy: DownloadPolicy::default(),
        }
    }

    /// Configuration for the local development service.
    pub fn development() -> Self {
        Self::for_mode(BuildMode::Development)
    }

    /// Configuration for a deployment served from `origin`.
    pub fn production(origin: Url) -> Self {
        Self::for_mode(BuildMode::Production).with_origin(origin)
    }

    /// Builder method to set the origin.
    pub fn with_origin(mut self, origin: Url) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Builder method to set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Builder method to set the PSD download policy.
    pub fn with_download_policy(mut self, policy: DownloadPolicy) -> Self {
        self.download_policy = policy;
        self
    }

    /// Base of the routed API calls.
    pub fn api_base(&self) -> String {
        format!("{}{}", self.download_base(), API_PREFIX)
    }

    /// Base of the direct-fetch download call, which adds its own `/api`.
    pub fn download_base(&self) -> &'static str {
        match self.mode {
            BuildMode::Development => DEV_ORIGIN,
            BuildMode::Production => "",
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::for_mode(BuildMode::default())
    }
}
