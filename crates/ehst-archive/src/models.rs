//! Archive vocabulary and TAP metadata types.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString};

use crate::{EHSTError, EHSTResult};

/// Processing stage of an observation product.
///
/// The numeric codes follow the archive's own ordering: `0 = AUXILIARY`, `1 = RAW`,
/// `2 = CALIBRATED`, `3 = PRODUCT`.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CalibrationLevel {
    /// Auxiliary files (code 0).
    Auxiliary,
    /// Uncalibrated raw data (code 1).
    Raw,
    /// Calibrated data (code 2).
    Calibrated,
    /// Higher-level products (code 3).
    Product,
}

impl CalibrationLevel {
    /// Maps a numeric calibration code onto a level.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Auxiliary),
            1 => Some(Self::Raw),
            2 => Some(Self::Calibrated),
            3 => Some(Self::Product),
            _ => None,
        }
    }

    /// Numeric code of the level.
    pub fn code(&self) -> u8 {
        match self {
            Self::Auxiliary => 0,
            Self::Raw => 1,
            Self::Calibrated => 2,
            Self::Product => 3,
        }
    }

    /// Name used by the archive.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auxiliary => "AUXILIARY",
            Self::Raw => "RAW",
            Self::Calibrated => "CALIBRATED",
            Self::Product => "PRODUCT",
        }
    }
}
impl Display for CalibrationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Product types accepted by the download endpoint.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, EnumString, EnumIter, Serialize, Deserialize,
)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductType {
    /// Full product bundle (tarball).
    Product,
    /// Science file, delivered gzipped FITS.
    ScienceProduct,
    /// Preview image.
    Postcard,
}

impl ProductType {
    /// Name used by the archive.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Product => "PRODUCT",
            Self::ScienceProduct => "SCIENCE_PRODUCT",
            Self::Postcard => "POSTCARD",
        }
    }
}
impl Display for ProductType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result formats understood by the TAP and metadata services.
#[derive(
    Debug,
    Copy,
    Clone,
    Default,
    PartialEq,
    Eq,
    Hash,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Binary-encoded VOTable.
    #[default]
    Votable,
    /// VOTable with TABLEDATA serialization.
    VotablePlain,
    /// Comma separated values.
    Csv,
    /// ESA TAP+ JSON (`metadata` + `data`).
    Json,
}

impl OutputFormat {
    /// Name sent to the services.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Votable => "votable",
            Self::VotablePlain => "votable_plain",
            Self::Csv => "csv",
            Self::Json => "json",
        }
    }
}
impl Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Edge length of a postcard preview.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum PostcardResolution {
    /// 256 pixels.
    #[default]
    Low,
    /// 1024 pixels.
    High,
}

impl PostcardResolution {
    /// Edge length in pixels.
    pub fn pixels(&self) -> u32 {
        match self {
            Self::Low => 256,
            Self::High => 1024,
        }
    }
}
impl TryFrom<u32> for PostcardResolution {
    type Error = EHSTError;

    fn try_from(value: u32) -> EHSTResult<Self> {
        match value {
            256 => Ok(Self::Low),
            1024 => Ok(Self::High),
            other => Err(EHSTError::PostcardResolutionNotAllowed(other)),
        }
    }
}

/// Phase of a TAP job as reported by the UWS interface.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, EnumString, strum::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum JobPhase {
    /// Created but not queued.
    Pending,
    /// Waiting for execution.
    Queued,
    /// Running.
    Executing,
    /// Finished successfully.
    Completed,
    /// Finished with an error.
    Error,
    /// Cancelled.
    Aborted,
    /// Phase not known to the service.
    Unknown,
    /// Held by the service.
    Held,
    /// Suspended by the service.
    Suspended,
    /// Results deleted.
    Archived,
}

impl JobPhase {
    /// True when the job will not change phase anymore.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Completed | Self::Error | Self::Aborted | Self::Archived
        )
    }
}

/// A table published by the TAP service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableInfo {
    /// Qualified table name, e.g. `ehst.observation`.
    pub name: String,
    /// Schema holding the table (absent when only names were requested).
    pub schema: Option<String>,
    /// Free-text description (absent when only names were requested).
    pub description: Option<String>,
}

/// A column of a TAP table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    /// Column name.
    pub name: String,
    /// ADQL data type.
    pub datatype: Option<String>,
    /// Physical unit.
    pub unit: Option<String>,
    /// Free-text description.
    pub description: Option<String>,
}

/// Field description in a JSON TAP result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMeta {
    /// Column name.
    pub name: String,
    /// Data type reported by the service.
    #[serde(default)]
    pub datatype: Option<String>,
    /// Physical unit.
    #[serde(default)]
    pub unit: Option<String>,
}

/// A TAP result decoded from the ESA JSON output format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTable {
    /// Column descriptions in order.
    pub metadata: Vec<FieldMeta>,
    /// Rows, one value per column.
    #[serde(default)]
    pub data: Vec<Vec<serde_json::Value>>,
}

impl ResultTable {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when the result has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Position of the named column.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.metadata.iter().position(|field| field.name == name)
    }

    /// Iterates over the values of the named column, or `None` if there is no such column.
    pub fn column<'a>(
        &'a self,
        name: &str,
    ) -> Option<impl Iterator<Item = &'a serde_json::Value> + 'a> {
        let index = self.column_index(name)?;
        Some(self.data.iter().filter_map(move |row| row.get(index)))
    }

    /// Returns the value in `row` for the named column as a string, if it is one.
    pub fn text(&self, row: usize, name: &str) -> Option<&str> {
        let index = self.column_index(name)?;
        self.data.get(row)?.get(index)?.as_str()
    }
}
