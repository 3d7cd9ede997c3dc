//! Integration tests: cli.

use std::fs;

use ehst_cli::cli::{run_with_args, run_with_writer};

fn run_to_string(args: &[&str]) -> Result<String, Box<dyn std::error::Error>> {
    let mut out = Vec::new();
    run_with_writer(args.iter().copied(), &mut out)?;
    Ok(String::from_utf8(out)?)
}

#[test]
fn criteria_query_is_printed_without_connecting() {
    let printed = run_to_string(&[
        "ehst",
        "criteria",
        "--calibration-level",
        "1",
        "--collection",
        "HST",
        "--instrument",
        "WFC3,ACS/WFC",
        "--get-query",
    ])
    .expect("criteria query should print");
    assert_eq!(
        printed.trim_end(),
        "select o.*, p.calibration_level, p.data_product_type, pos.ra, pos.dec from ehst.observation AS o JOIN ehst.plane as p on o.observation_uuid=p.observation_uuid JOIN ehst.position as pos on p.plane_id = pos.plane_id where(p.calibration_level LIKE '%RAW%' AND (o.collection LIKE '%HST%') AND (o.instrument_name LIKE '%WFC3%' OR o.instrument_name LIKE '%ACS/WFC%'))"
    );
}

#[test]
fn cone_criteria_file_carries_the_position() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("cone.json");
    fs::write(
        &path,
        r#"{"coordinates": {"ra": 10.5, "dec": -20.25}, "radius": "0.5 deg", "obs_collection": ["HST"]}"#,
    )
    .expect("failed to write criteria");
    let printed = run_to_string(&[
        "ehst",
        "cone-criteria",
        "--criteria-file",
        path.to_str().expect("utf-8 path"),
        "--get-query",
    ])
    .expect("cone query should print");
    assert!(printed.trim_end().ends_with(
        "where((o.collection LIKE '%HST%') AND 1=CONTAINS(POINT('ICRS', pos.ra, pos.dec),CIRCLE('ICRS', 10.5, -20.25, 0.5)))"
    ));
}

#[test]
fn cone_criteria_file_rejects_integer_coordinates() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("cone.json");
    fs::write(&path, r#"{"coordinates": 123}"#).expect("failed to write criteria");
    let err = run_to_string(&[
        "ehst",
        "cone-criteria",
        "--criteria-file",
        path.to_str().expect("utf-8 path"),
        "--get-query",
    ])
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Coordinates must be either a string or a recognized coordinate object"
    );
}

#[test]
fn invalid_calibration_code_is_reported() {
    let result = run_with_args(["ehst", "criteria", "--calibration-level", "4", "--get-query"]);
    let err = result.unwrap_err();
    assert_eq!(err.to_string(), "Calibration level must be between 0 and 3");
}

#[test]
fn criteria_file_is_read_as_json() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let path = dir.path().join("criteria.json");
    fs::write(&path, r#"{"instrument_name": [1]}"#).expect("failed to write criteria");
    let err = run_with_args([
        "ehst",
        "criteria",
        "--criteria-file",
        path.to_str().expect("utf-8 path"),
        "--get-query",
    ])
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "One of the lists is empty or there are elements that are not strings"
    );
}

#[test]
fn science_product_type_is_rejected() {
    let err = run_with_args([
        "ehst",
        "download",
        "j6fl25s4q",
        "--product-type",
        "SCIENCE",
    ])
    .unwrap_err();
    assert_eq!(err.to_string(), "This product_type is not allowed");
}
