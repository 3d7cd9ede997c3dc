//! Error types for coordinate parsing.

use thiserror::Error;

/// Errors raised while parsing a sky coordinate or one of its components.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseCoordError {
    /// The input did not contain anything to parse.
    #[error("coordinate string is empty")]
    Empty,
    /// The input could not be split into a right ascension and a declination.
    #[error("coordinate \"{0}\" must contain exactly a right ascension and a declination")]
    WrongComponentCount(String),
    /// A component contained something other than digits and separators.
    #[error("invalid coordinate component \"{0}\"")]
    InvalidComponent(String),
    /// Right ascension outside of [0, 360) degrees.
    #[error("right ascension {0} is outside of [0, 360) degrees")]
    RightAscensionOutOfRange(f64),
    /// Declination outside of [-90, 90] degrees.
    #[error("declination {0} is outside of [-90, 90] degrees")]
    DeclinationOutOfRange(f64),
    /// Minutes or seconds of a sexagesimal value were 60 or larger.
    #[error("sexagesimal field {0} must be smaller than 60")]
    SexagesimalOverflow(f64),
}

/// Errors raised for invalid angular distances.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AngleError {
    /// The distance was negative or not a finite number.
    #[error("angular distance must be a finite, non-negative number (got {0})")]
    InvalidDistance(f64),
    /// The text did not start with a number.
    #[error("cannot parse angular distance \"{0}\"")]
    Unparsable(String),
    /// The unit name was not recognised.
    #[error("unknown angle unit: {0}")]
    UnknownUnit(String),
}
