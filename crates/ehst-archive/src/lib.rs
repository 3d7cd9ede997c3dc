//! Client for the ESA Hubble Science Archive (eHST).
//!
//! Queries are written in ADQL and executed through a [`TapHandler`](tap::TapHandler); data
//! products are fetched through a [`Transport`](transport::Transport); target names are turned
//! into sky positions by a [`TargetResolver`](resolver::TargetResolver). The [`EHST`] facade
//! validates the caller's criteria, builds the query string and hands it to those collaborators.

pub mod archive;
pub mod cond;
pub mod config;
pub mod download;
pub mod input;
pub mod models;
pub mod query;
pub mod resolver;
pub mod tap;
pub mod transport;

pub use archive::EHST;
pub use config::ArchiveConfig;
pub use download::{DownloadRequest, ProductSelection};
pub use input::{CalibrationLevelSelector, CoordinateInput};
pub use models::{CalibrationLevel, OutputFormat, ProductType};
pub use query::{build_criteria_query, ConeSearchCriteria, CriteriaQuery};

use ehst_core::{AngleError, ParseCoordError};
use models::JobPhase;
use thiserror::Error;

/// Convenience alias for results returned from archive operations.
pub type EHSTResult<T> = Result<T, EHSTError>;

/// Abstract classification of [`EHSTError`] values.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Mutually exclusive or unsupported arguments.
    InvalidArgument,
    /// A numeric argument outside of its allowed range.
    OutOfRange,
    /// A list-valued criterion that is empty or holds non-string entries.
    MalformedCollection,
    /// A failure reported by the TAP service, the transport or the local filesystem.
    Collaborator,
}

/// Errors that can occur while building queries or talking to the archive.
#[derive(Error, Debug)]
pub enum EHSTError {
    /// Numeric calibration level outside of `0..=3`.
    #[error("Calibration level must be between 0 and 3")]
    CalibrationLevelOutOfRange(i64),
    /// Calibration level given as something other than a name or an integer code.
    #[error("calibration_level must be a level name or an integer code (got {0})")]
    InvalidCalibrationLevel(String),
    /// A list criterion was empty or contained a non-string element.
    #[error("One of the lists is empty or there are elements that are not strings")]
    MalformedList {
        /// Name of the offending criterion.
        field: &'static str,
    },
    /// A scalar criterion was given as something other than a string.
    #[error("{field} must be a string")]
    InvalidCriterion {
        /// Name of the offending criterion.
        field: &'static str,
    },
    /// Both a target name and explicit coordinates were supplied.
    #[error("Please use only target or coordinates as parameter.")]
    TargetAndCoordinates,
    /// Neither a target name nor coordinates were supplied.
    #[error("Please provide either a target or coordinates as parameter.")]
    MissingPosition,
    /// Coordinates were given as something other than text or a coordinate object.
    #[error("Coordinates must be either a string or a recognized coordinate object")]
    UnsupportedCoordinates,
    /// Coordinate text could not be parsed.
    #[error("{0}")]
    ParseCoordError(#[from] ParseCoordError),
    /// Invalid search radius.
    #[error("{0}")]
    AngleError(#[from] AngleError),
    /// Product type outside of the downloadable set.
    #[error("This product_type is not allowed")]
    ProductTypeNotAllowed(String),
    /// Calibration level name outside of the downloadable set.
    #[error("This calibration_level is not allowed")]
    CalibrationLevelNotAllowed(String),
    /// Both download selection modes were supplied.
    #[error("Please use only calibration_level or product_type as parameter.")]
    ConflictingProductSelection,
    /// Postcard resolution other than 256 or 1024 pixels.
    #[error("Postcard resolution must be 256 or 1024 (got {0})")]
    PostcardResolutionNotAllowed(u32),
    /// The target resolver did not know the requested name.
    #[error("This target cannot be resolved: {0}")]
    TargetNotResolved(String),
    /// The requested table does not exist in the archive.
    #[error("table name specified was not found in HSTTAP!")]
    TableNotFound(String),
    /// The TAP service answered with a non-success status.
    #[error("TAP request failed with status {status}: {message}")]
    TapRequest {
        /// HTTP status code.
        status: u16,
        /// Response body returned by the service.
        message: String,
    },
    /// An asynchronous job ended in a phase other than `COMPLETED`.
    #[error("TAP job {job} finished in phase {phase}")]
    JobFailed {
        /// Job URL.
        job: String,
        /// Terminal phase reported by the service.
        phase: JobPhase,
    },
    /// An asynchronous job was still running after the configured number of polls.
    #[error("TAP job {0} did not finish before the polling limit")]
    JobTimeout(String),
    /// A job result was decoded as a table but was not requested in JSON format.
    #[error("only JSON results can be decoded into a table (got {0})")]
    NotJsonResult(OutputFormat),
    /// Wrapper around HTTP client errors.
    #[error("{0}")]
    HttpError(#[from] reqwest::Error),
    /// Wrapper around filesystem errors.
    #[error("{0}")]
    IoError(#[from] std::io::Error),
    /// Wrapper around JSON decoding errors.
    #[error("{0}")]
    JsonError(#[from] serde_json::Error),
}

impl EHSTError {
    /// Returns the abstract kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::CalibrationLevelOutOfRange(_) => ErrorKind::OutOfRange,
            Self::MalformedList { .. } => ErrorKind::MalformedCollection,
            Self::TargetAndCoordinates
            | Self::MissingPosition
            | Self::InvalidCalibrationLevel(_)
            | Self::InvalidCriterion { .. }
            | Self::UnsupportedCoordinates
            | Self::ParseCoordError(_)
            | Self::AngleError(_)
            | Self::ProductTypeNotAllowed(_)
            | Self::CalibrationLevelNotAllowed(_)
            | Self::ConflictingProductSelection
            | Self::PostcardResolutionNotAllowed(_) => ErrorKind::InvalidArgument,
            Self::TargetNotResolved(_)
            | Self::TableNotFound(_)
            | Self::TapRequest { .. }
            | Self::JobFailed { .. }
            | Self::JobTimeout(_)
            | Self::NotJsonResult(_)
            | Self::HttpError(_)
            | Self::IoError(_)
            | Self::JsonError(_) => ErrorKind::Collaborator,
        }
    }
}

/// Re-exports for the most common types.
pub mod prelude {
    pub use crate::{
        archive::EHST,
        config::ArchiveConfig,
        download::{DownloadRequest, ProductSelection},
        input::{CalibrationLevelSelector, CoordinateInput},
        models::{CalibrationLevel, OutputFormat, PostcardResolution, ProductType},
        query::{build_criteria_query, ConeSearchCriteria, CriteriaQuery},
        resolver::TargetResolver,
        tap::{JobOptions, JobResult, TapHandler},
        transport::{FetchKind, FetchRequest, Transport},
        EHSTError, EHSTResult, ErrorKind,
    };
    pub use ehst_core::{AngleUnit, AngularDistance, SkyCoord};
}
