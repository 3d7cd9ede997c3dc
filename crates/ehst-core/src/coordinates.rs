//! Sky positions and angular distances.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};

use crate::{
    errors::{AngleError, ParseCoordError},
    parsers::parse_sky_coord,
};

/// An ICRS position on the sky, stored as right ascension and declination in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "SkyCoordDegrees")]
pub struct SkyCoord {
    ra: f64,
    dec: f64,
}

#[derive(Deserialize)]
struct SkyCoordDegrees {
    ra: f64,
    dec: f64,
}

impl TryFrom<SkyCoordDegrees> for SkyCoord {
    type Error = ParseCoordError;

    fn try_from(value: SkyCoordDegrees) -> Result<Self, Self::Error> {
        SkyCoord::new(value.ra, value.dec)
    }
}

impl SkyCoord {
    /// Creates a coordinate from right ascension and declination in degrees.
    pub fn new(ra: f64, dec: f64) -> Result<Self, ParseCoordError> {
        if !ra.is_finite() || !(0.0..360.0).contains(&ra) {
            return Err(ParseCoordError::RightAscensionOutOfRange(ra));
        }
        if !dec.is_finite() || !(-90.0..=90.0).contains(&dec) {
            return Err(ParseCoordError::DeclinationOutOfRange(dec));
        }
        Ok(Self { ra, dec })
    }

    /// Right ascension in degrees.
    pub fn ra(&self) -> f64 {
        self.ra
    }

    /// Declination in degrees.
    pub fn dec(&self) -> f64 {
        self.dec
    }
}

impl FromStr for SkyCoord {
    type Err = ParseCoordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_sky_coord(s)
    }
}

impl Display for SkyCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.ra, self.dec)
    }
}

/// Units accepted for angular distances such as search radii.
#[derive(
    Debug, Copy, Clone, Default, PartialEq, Eq, Hash, EnumString, AsRefStr, EnumIter, Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    /// Degrees.
    #[strum(serialize = "deg", serialize = "degree", serialize = "degrees")]
    Degree,
    /// Minutes of arc, the default unit for search radii.
    #[default]
    #[strum(serialize = "arcmin", serialize = "arcminute", serialize = "arcminutes")]
    Arcminute,
    /// Seconds of arc.
    #[strum(serialize = "arcsec", serialize = "arcsecond", serialize = "arcseconds")]
    Arcsecond,
}

impl AngleUnit {
    fn per_degree(self) -> f64 {
        match self {
            Self::Degree => 1.0,
            Self::Arcminute => 60.0,
            Self::Arcsecond => 3600.0,
        }
    }
}

/// A non-negative angular distance with its unit.
#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct AngularDistance {
    value: f64,
    unit: AngleUnit,
}

impl AngularDistance {
    /// Creates a distance, rejecting negative and non-finite values.
    pub fn new(value: f64, unit: AngleUnit) -> Result<Self, AngleError> {
        if !value.is_finite() || value < 0.0 {
            return Err(AngleError::InvalidDistance(value));
        }
        Ok(Self { value, unit })
    }

    /// Distance expressed in minutes of arc.
    pub fn arcminutes(value: f64) -> Result<Self, AngleError> {
        Self::new(value, AngleUnit::Arcminute)
    }

    /// Distance expressed in degrees.
    pub fn degrees(value: f64) -> Result<Self, AngleError> {
        Self::new(value, AngleUnit::Degree)
    }

    /// Distance expressed in seconds of arc.
    pub fn arcseconds(value: f64) -> Result<Self, AngleError> {
        Self::new(value, AngleUnit::Arcsecond)
    }

    /// The numeric value in the original unit.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// The original unit.
    pub fn unit(&self) -> AngleUnit {
        self.unit
    }

    /// Converts the distance to degrees.
    pub fn to_degrees(&self) -> f64 {
        match self.unit {
            AngleUnit::Degree => self.value,
            unit => self.value / unit.per_degree(),
        }
    }
}

impl FromStr for AngularDistance {
    type Err = AngleError;

    /// Parses `"7"`, `"7arcmin"`, `"0.5 deg"` or `"30arcsec"`; bare numbers are minutes of arc.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| c.is_ascii_alphabetic())
            .unwrap_or(trimmed.len());
        let (number, unit) = trimmed.split_at(split);
        let value = number
            .trim()
            .parse::<f64>()
            .map_err(|_| AngleError::Unparsable(trimmed.to_string()))?;
        let unit = if unit.is_empty() {
            AngleUnit::default()
        } else {
            AngleUnit::from_str(unit.trim()).map_err(|_| AngleError::UnknownUnit(unit.to_string()))?
        };
        Self::new(value, unit)
    }
}
