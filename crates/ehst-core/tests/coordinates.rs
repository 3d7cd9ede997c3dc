//! Integration tests: coordinates.

use std::str::FromStr;

use ehst_core::{
    parsers::{parse_declination, parse_right_ascension},
    AngleError, AngleUnit, AngularDistance, ParseCoordError, SkyCoord,
};

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn parse_sexagesimal_with_unit_letters() -> Result<(), ParseCoordError> {
    let coord = SkyCoord::from_str("00h42m44.51s +41d16m08.45s")?;
    assert_close(coord.ra(), (42.0 / 60.0 + 44.51 / 3600.0) * 15.0);
    assert_close(coord.dec(), 41.0 + 16.0 / 60.0 + 8.45 / 3600.0);
    Ok(())
}

#[test]
fn colon_and_bare_field_layouts_agree() -> Result<(), ParseCoordError> {
    let letters = SkyCoord::from_str("00h42m44.51s +41d16m08.45s")?;
    let colons = SkyCoord::from_str("00:42:44.51 +41:16:08.45")?;
    let bare = SkyCoord::from_str("00 42 44.51 +41 16 08.45")?;
    assert_close(colons.ra(), letters.ra());
    assert_close(colons.dec(), letters.dec());
    assert_close(bare.ra(), letters.ra());
    assert_close(bare.dec(), letters.dec());
    Ok(())
}

#[test]
fn decimal_degrees_are_kept_verbatim() -> Result<(), ParseCoordError> {
    let coord = SkyCoord::from_str("10.6847083, 41.26875")?;
    assert_eq!(coord.ra(), 10.6847083);
    assert_eq!(coord.dec(), 41.26875);
    assert_eq!(coord.to_string(), "10.6847083 41.26875");
    Ok(())
}

#[test]
fn negative_declination_applies_to_all_fields() -> Result<(), ParseCoordError> {
    assert_close(parse_declination("-00d30m00s")?, -0.5);
    assert_close(parse_declination("-12:30:00")?, -12.5);
    Ok(())
}

#[test]
fn invalid_coordinates_are_rejected() {
    assert_eq!(SkyCoord::from_str("   "), Err(ParseCoordError::Empty));
    assert!(matches!(
        SkyCoord::from_str("10.0"),
        Err(ParseCoordError::WrongComponentCount(_))
    ));
    assert!(matches!(
        SkyCoord::from_str("abc def"),
        Err(ParseCoordError::InvalidComponent(_))
    ));
    assert!(matches!(
        parse_right_ascension("25h00m00s"),
        Err(ParseCoordError::RightAscensionOutOfRange(_))
    ));
    assert!(matches!(
        parse_right_ascension("-01h00m00s"),
        Err(ParseCoordError::InvalidComponent(_))
    ));
    assert!(matches!(
        parse_declination("95.0"),
        Err(ParseCoordError::DeclinationOutOfRange(_))
    ));
    assert!(matches!(
        parse_declination("10d75m"),
        Err(ParseCoordError::SexagesimalOverflow(_))
    ));
}

#[test]
fn sky_coord_deserialization_validates_ranges() {
    let coord: SkyCoord =
        serde_json::from_value(serde_json::json!({"ra": 10.5, "dec": -20.0})).unwrap();
    assert_eq!(coord.ra(), 10.5);
    assert!(serde_json::from_value::<SkyCoord>(serde_json::json!({"ra": 400.0, "dec": 0.0})).is_err());
}

#[test]
fn radius_conversion_to_degrees() -> Result<(), AngleError> {
    assert_eq!(AngularDistance::arcminutes(7.0)?.to_degrees().to_string(), "0.11666666666666667");
    assert_eq!(AngularDistance::arcseconds(36.0)?.to_degrees(), 0.01);
    assert_eq!(AngularDistance::degrees(0.25)?.to_degrees(), 0.25);
    assert_eq!(AngularDistance::arcminutes(0.0)?.to_degrees(), 0.0);
    Ok(())
}

#[test]
fn radius_parsing_defaults_to_arcminutes() -> Result<(), AngleError> {
    assert_eq!(AngularDistance::from_str("7")?.unit(), AngleUnit::Arcminute);
    assert_eq!(AngularDistance::from_str("0.5 deg")?.unit(), AngleUnit::Degree);
    assert_eq!(AngularDistance::from_str("30arcsec")?.value(), 30.0);
    assert!(matches!(
        AngularDistance::from_str("3 parsecs"),
        Err(AngleError::UnknownUnit(_))
    ));
    assert!(matches!(
        AngularDistance::from_str("-1"),
        Err(AngleError::InvalidDistance(_))
    ));
    Ok(())
}
