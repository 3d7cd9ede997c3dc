//! Endpoints and runtime settings of the client.

use std::{env, path::PathBuf, time::Duration};

use crate::EHSTResult;

/// Public eHST TAP service.
pub const DEFAULT_TAP_URL: &str = "https://hst.esac.esa.int/tap-server/tap";
/// Public eHST data retrieval servlet.
pub const DEFAULT_DATA_URL: &str = "https://hst.esac.esa.int/ehst-sl-server/servlet/data-action";
/// Public eHST metadata servlet.
pub const DEFAULT_METADATA_URL: &str =
    "https://hst.esac.esa.int/ehst-sl-server/servlet/metadata-action";
/// Public eHST target name resolver.
pub const DEFAULT_TARGET_URL: &str =
    "https://hst.esac.esa.int/ehst-sl-server/servlet/targetresolver";

/// Endpoints and tuning knobs for talking to the archive.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveConfig {
    /// Base URL of the TAP service (without `/sync` or `/async`).
    pub tap_url: String,
    /// Data retrieval endpoint.
    pub data_url: String,
    /// Metadata endpoint.
    pub metadata_url: String,
    /// Target resolver endpoint.
    pub target_url: String,
    /// Directory holding staged downloads.
    pub download_dir: PathBuf,
    /// Per-request HTTP timeout.
    pub timeout: Duration,
    /// Delay between phase polls of an asynchronous job.
    pub poll_interval: Duration,
    /// Number of polls after which an asynchronous job is given up on.
    pub max_polls: u32,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            tap_url: DEFAULT_TAP_URL.to_string(),
            data_url: DEFAULT_DATA_URL.to_string(),
            metadata_url: DEFAULT_METADATA_URL.to_string(),
            target_url: DEFAULT_TARGET_URL.to_string(),
            download_dir: env::temp_dir().join("ehst"),
            timeout: Duration::from_secs(300),
            poll_interval: Duration::from_millis(500),
            max_polls: 1200,
        }
    }
}

impl ArchiveConfig {
    /// Defaults overridden by `EHST_TAP_URL`, `EHST_DATA_URL`, `EHST_METADATA_URL`,
    /// `EHST_TARGET_URL` and `EHST_DOWNLOAD_DIR` when they are set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("EHST_TAP_URL") {
            config.tap_url = url;
        }
        if let Ok(url) = env::var("EHST_DATA_URL") {
            config.data_url = url;
        }
        if let Ok(url) = env::var("EHST_METADATA_URL") {
            config.metadata_url = url;
        }
        if let Ok(url) = env::var("EHST_TARGET_URL") {
            config.target_url = url;
        }
        if let Some(dir) = env::var_os("EHST_DOWNLOAD_DIR") {
            config.download_dir = PathBuf::from(dir);
        }
        config
    }

    /// Sets the TAP base URL.
    pub fn with_tap_url(mut self, url: impl Into<String>) -> Self {
        self.tap_url = url.into();
        self
    }

    /// Sets the data retrieval URL.
    pub fn with_data_url(mut self, url: impl Into<String>) -> Self {
        self.data_url = url.into();
        self
    }

    /// Sets the metadata URL.
    pub fn with_metadata_url(mut self, url: impl Into<String>) -> Self {
        self.metadata_url = url.into();
        self
    }

    /// Sets the target resolver URL.
    pub fn with_target_url(mut self, url: impl Into<String>) -> Self {
        self.target_url = url.into();
        self
    }

    /// Sets the staging directory for downloads.
    pub fn with_download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.download_dir = dir.into();
        self
    }

    /// Sets the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets how asynchronous jobs are polled.
    pub fn with_polling(mut self, interval: Duration, max_polls: u32) -> Self {
        self.poll_interval = interval;
        self.max_polls = max_polls;
        self
    }

    /// Builds a blocking HTTP client honouring the configured timeout.
    pub fn http_client(&self) -> EHSTResult<reqwest::blocking::Client> {
        Ok(reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("ehst-archive/", env!("CARGO_PKG_VERSION")))
            .build()?)
    }
}
