//! HTTP retrieval of archive files.

use std::{
    fmt::Write as _,
    fs::{self, File},
    io::{BufWriter, Write},
    path::PathBuf,
};

use reqwest::blocking::Client;
use sha2::{Digest, Sha256};
use strum::{Display, EnumIter, EnumString};
use tracing::debug;

use crate::{config::ArchiveConfig, tap::check_status, EHSTResult};

/// Kinds of file retrieval offered by the archive servlets.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum FetchKind {
    /// Observation products.
    Science,
    /// Preview images.
    Postcard,
    /// Single artifacts.
    Artifact,
    /// Metadata cone search.
    ConeSearch,
    /// Metadata query by target name.
    Target,
}

impl FetchKind {
    /// True for kinds served by the metadata endpoint rather than the data endpoint.
    pub fn is_metadata(&self) -> bool {
        matches!(self, Self::ConeSearch | Self::Target)
    }
}

/// A single retrieval from the archive.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FetchRequest {
    /// Kind of retrieval.
    pub kind: FetchKind,
    /// Query parameters, in order.
    pub params: Vec<(String, String)>,
    /// Reuse a previously staged file for the same request.
    pub cache: bool,
}

impl FetchRequest {
    /// Creates a request with no parameters.
    pub fn new(kind: FetchKind) -> Self {
        Self {
            kind,
            params: Vec::new(),
            cache: false,
        }
    }

    /// Appends a parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    /// Appends several parameters.
    pub fn with_params(mut self, params: impl IntoIterator<Item = (String, String)>) -> Self {
        self.params.extend(params);
        self
    }

    /// Enables or disables staging reuse.
    pub fn with_cache(mut self, cache: bool) -> Self {
        self.cache = cache;
        self
    }

    /// Value of the first parameter named `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Retrieves files and hands back where they were staged.
pub trait Transport {
    /// Performs `request`, returning the path of the staged file.
    fn fetch(&self, request: &FetchRequest) -> EHSTResult<PathBuf>;
}

/// [`Transport`] issuing GET requests against the eHST servlets.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    data_url: String,
    metadata_url: String,
    download_dir: PathBuf,
}

impl HttpTransport {
    /// Creates a transport for the endpoints configured in `config`.
    pub fn new(config: &ArchiveConfig) -> EHSTResult<Self> {
        Ok(Self::with_client(config.http_client()?, config))
    }

    /// Creates a transport reusing an existing HTTP client.
    pub fn with_client(client: Client, config: &ArchiveConfig) -> Self {
        Self {
            client,
            data_url: config.data_url.clone(),
            metadata_url: config.metadata_url.clone(),
            download_dir: config.download_dir.clone(),
        }
    }

    /// Staging path of `request`.
    ///
    /// The name is a SHA-256 digest of the endpoint, kind and parameters, so identical
    /// requests against the same server map to the same path across builds.
    pub fn staging_path(&self, request: &FetchRequest) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(b"ehst-stage:v1");
        write_str(&mut hasher, self.endpoint(request.kind));
        write_str(&mut hasher, &request.kind.to_string());
        for (key, value) in &request.params {
            write_str(&mut hasher, key);
            write_str(&mut hasher, value);
        }
        let digest = hasher.finalize();
        let mut name = format!("{}-", request.kind);
        for byte in &digest[..16] {
            let _ = write!(name, "{byte:02x}");
        }
        self.download_dir.join(name)
    }

    fn endpoint(&self, kind: FetchKind) -> &str {
        if kind.is_metadata() {
            &self.metadata_url
        } else {
            &self.data_url
        }
    }
}

fn write_str(hasher: &mut Sha256, value: &str) {
    hasher.update((value.len() as u64).to_be_bytes());
    hasher.update(value.as_bytes());
}

impl Transport for HttpTransport {
    fn fetch(&self, request: &FetchRequest) -> EHSTResult<PathBuf> {
        let path = self.staging_path(request);
        if request.cache && path.is_file() {
            debug!("reusing staged {}", path.display());
            return Ok(path);
        }
        fs::create_dir_all(&self.download_dir)?;
        let url = self.endpoint(request.kind);
        debug!("fetching {} from {url}", request.kind);
        let mut response = check_status(self.client.get(url).query(&request.params).send()?)?;
        let partial = path.with_extension("part");
        {
            let mut writer = BufWriter::new(File::create(&partial)?);
            response.copy_to(&mut writer)?;
            writer.flush()?;
        }
        fs::rename(&partial, &path)?;
        Ok(path)
    }
}
