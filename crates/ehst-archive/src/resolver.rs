//! Target name resolution.

use ehst_core::{Degrees, SkyCoord};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::{config::ArchiveConfig, tap::check_status, EHSTError, EHSTResult};

/// Turns target names into sky positions.
pub trait TargetResolver {
    /// Resolves `name` into ICRS coordinates.
    fn resolve(&self, name: &str) -> EHSTResult<SkyCoord>;
}

/// [`TargetResolver`] backed by the eHST name resolution servlet.
#[derive(Debug, Clone)]
pub struct HttpTargetResolver {
    client: Client,
    url: String,
}

impl HttpTargetResolver {
    /// Creates a resolver for the endpoint configured in `config`.
    pub fn new(config: &ArchiveConfig) -> EHSTResult<Self> {
        Ok(Self::with_client(config.http_client()?, config))
    }

    /// Creates a resolver reusing an existing HTTP client.
    pub fn with_client(client: Client, config: &ArchiveConfig) -> Self {
        Self {
            client,
            url: config.target_url.clone(),
        }
    }
}

impl TargetResolver for HttpTargetResolver {
    fn resolve(&self, name: &str) -> EHSTResult<SkyCoord> {
        debug!("resolving target {name}");
        let response = check_status(
            self.client
                .get(&self.url)
                .query(&[
                    ("TARGET_NAME", name),
                    ("RESOLVER_TYPE", "SN"),
                    ("FORMAT", "json"),
                ])
                .send()?,
        )?;
        let body: Value = response.json()?;
        coordinates_from_response(name, &body)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Degree {
    Number(Degrees),
    Text(String),
}

impl Degree {
    fn value(&self) -> Option<Degrees> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Deserialize)]
struct ResolvedTarget {
    #[serde(rename = "RA_DEGREES")]
    ra: Degree,
    #[serde(rename = "DEC_DEGREES")]
    dec: Degree,
}

/// Extracts the position of `name` from a resolver response.
///
/// The first entry of `data` is used; `RA_DEGREES` and `DEC_DEGREES` may be numbers or numeric
/// strings.
pub fn coordinates_from_response(name: &str, body: &Value) -> EHSTResult<SkyCoord> {
    let not_resolved = || EHSTError::TargetNotResolved(name.to_string());
    let first = body
        .get("data")
        .and_then(|data| data.get(0))
        .ok_or_else(not_resolved)?;
    let target = ResolvedTarget::deserialize(first).map_err(|_| not_resolved())?;
    match (target.ra.value(), target.dec.value()) {
        (Some(ra), Some(dec)) => Ok(SkyCoord::new(ra, dec)?),
        _ => Err(not_resolved()),
    }
}
