//! Shared types for the ESA Hubble Science Archive (eHST) crates.
//!
//! This crate owns the sky-coordinate model used by positional queries: a validated
//! [`SkyCoord`](coordinates::SkyCoord), free-text coordinate parsers and
//! [`AngularDistance`](coordinates::AngularDistance) for search radii.

pub mod coordinates;
pub mod errors;
pub mod parsers;

pub use coordinates::{AngleUnit, AngularDistance, SkyCoord};
pub use errors::{AngleError, ParseCoordError};

/// Angle measured in degrees.
pub type Degrees = f64;
