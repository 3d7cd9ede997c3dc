//! Normalization of loosely typed caller input.
//!
//! Every accepted representation is converted into one canonical value here, before any
//! query text is produced.

use std::str::FromStr;

use ehst_core::SkyCoord;
use serde_json::Value;

use crate::{models::CalibrationLevel, EHSTError, EHSTResult};

/// Calibration level as given by the caller: a name or a numeric code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CalibrationLevelSelector {
    /// A level name such as `"RAW"`.
    Name(String),
    /// A numeric code in `0..=3`.
    Code(i64),
}

/// Canonical form of a [`CalibrationLevelSelector`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CalibrationLevelMatch {
    /// A known calibration level.
    Level(CalibrationLevel),
    /// A name that is not one of the known levels, matched literally.
    Unrecognized(String),
}

impl CalibrationLevelSelector {
    /// Converts the selector into its canonical form.
    ///
    /// Numeric codes are range checked. Names are never rejected: anything that is not an
    /// exact level name is passed through as a literal match term.
    pub fn normalize(&self) -> EHSTResult<CalibrationLevelMatch> {
        match self {
            Self::Code(code) => CalibrationLevel::from_code(*code)
                .map(CalibrationLevelMatch::Level)
                .ok_or(EHSTError::CalibrationLevelOutOfRange(*code)),
            Self::Name(name) => Ok(CalibrationLevel::from_str(name).map_or_else(
                |_| CalibrationLevelMatch::Unrecognized(name.clone()),
                CalibrationLevelMatch::Level,
            )),
        }
    }
}

impl CalibrationLevelMatch {
    /// Text matched against `p.calibration_level`.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Level(level) => level.as_str(),
            Self::Unrecognized(name) => name,
        }
    }
}

impl From<CalibrationLevel> for CalibrationLevelSelector {
    fn from(value: CalibrationLevel) -> Self {
        Self::Name(value.as_str().to_string())
    }
}
impl From<&str> for CalibrationLevelSelector {
    fn from(value: &str) -> Self {
        Self::Name(value.to_string())
    }
}
impl From<String> for CalibrationLevelSelector {
    fn from(value: String) -> Self {
        Self::Name(value)
    }
}
impl From<i64> for CalibrationLevelSelector {
    fn from(value: i64) -> Self {
        Self::Code(value)
    }
}
impl From<i32> for CalibrationLevelSelector {
    fn from(value: i32) -> Self {
        Self::Code(i64::from(value))
    }
}
impl From<u8> for CalibrationLevelSelector {
    fn from(value: u8) -> Self {
        Self::Code(i64::from(value))
    }
}

impl TryFrom<&Value> for CalibrationLevelSelector {
    type Error = EHSTError;

    fn try_from(value: &Value) -> EHSTResult<Self> {
        match value {
            Value::String(name) => Ok(Self::Name(name.clone())),
            Value::Number(number) => number
                .as_i64()
                .map(Self::Code)
                .ok_or_else(|| EHSTError::InvalidCalibrationLevel(number.to_string())),
            other => Err(EHSTError::InvalidCalibrationLevel(other.to_string())),
        }
    }
}

/// Rejects empty string lists.
pub fn validate_string_list(field: &'static str, values: &[String]) -> EHSTResult<()> {
    if values.is_empty() {
        return Err(EHSTError::MalformedList { field });
    }
    Ok(())
}

/// Reads a list of strings from dynamically typed input.
///
/// Fails when the value is not an array, is an empty array, or holds anything other than
/// strings.
pub fn string_list_from_json(field: &'static str, value: &Value) -> EHSTResult<Vec<String>> {
    let Some(items) = value.as_array() else {
        return Err(EHSTError::MalformedList { field });
    };
    let values = items
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect::<Option<Vec<String>>>()
        .ok_or(EHSTError::MalformedList { field })?;
    validate_string_list(field, &values)?;
    Ok(values)
}

/// Position given either as free text or as an already parsed coordinate.
#[derive(Debug, Clone, PartialEq)]
pub enum CoordinateInput {
    /// Free text such as `"00h42m44.51s +41d16m08.45s"`.
    Text(String),
    /// A parsed ICRS coordinate.
    Sky(SkyCoord),
}

impl CoordinateInput {
    /// Resolves the input into a coordinate, parsing text when needed.
    pub fn resolve(&self) -> EHSTResult<SkyCoord> {
        match self {
            Self::Text(text) => Ok(SkyCoord::from_str(text)?),
            Self::Sky(coord) => Ok(*coord),
        }
    }
}

impl From<&str> for CoordinateInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}
impl From<String> for CoordinateInput {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
impl From<SkyCoord> for CoordinateInput {
    fn from(value: SkyCoord) -> Self {
        Self::Sky(value)
    }
}

impl TryFrom<&Value> for CoordinateInput {
    type Error = EHSTError;

    /// Accepts a string or an object with numeric `ra` and `dec` degrees.
    fn try_from(value: &Value) -> EHSTResult<Self> {
        match value {
            Value::String(text) => Ok(Self::Text(text.clone())),
            Value::Object(map) => match (
                map.get("ra").and_then(Value::as_f64),
                map.get("dec").and_then(Value::as_f64),
            ) {
                (Some(ra), Some(dec)) => Ok(Self::Sky(SkyCoord::new(ra, dec)?)),
                _ => Err(EHSTError::UnsupportedCoordinates),
            },
            _ => Err(EHSTError::UnsupportedCoordinates),
        }
    }
}
