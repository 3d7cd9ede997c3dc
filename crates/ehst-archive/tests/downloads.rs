//! Integration tests: downloads.

mod common;

use std::{fs, path::PathBuf};

use ehst_archive::prelude::*;

#[test]
fn science_is_not_a_downloadable_product_type() {
    let err = DownloadRequest::new("j6fl25s4q")
        .with_product_type("SCIENCE")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(err.to_string(), "This product_type is not allowed");
}

#[test]
fn unknown_calibration_level_is_not_downloadable() {
    let err = DownloadRequest::new("j6fl25s4q")
        .with_calibration_level("BOGUS")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(err.to_string(), "This calibration_level is not allowed");
}

#[test]
fn selection_modes_are_exclusive() {
    let err = ProductSelection::from_options(Some("RAW"), Some("PRODUCT")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Please use only calibration_level or product_type as parameter."
    );
    let err = DownloadRequest::new("j6fl25s4q")
        .with_calibration_level("RAW")
        .and_then(|request| request.with_product_type("PRODUCT"))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}

#[test]
fn calibration_level_download_parameters() -> EHSTResult<()> {
    let request = DownloadRequest::new("j6fl25s4q").with_calibration_level("RAW")?;
    assert_eq!(
        request.params(),
        vec![
            ("OBSERVATION_ID".to_string(), "j6fl25s4q".to_string()),
            ("USERNAME".to_string(), "ehst-astroquery".to_string()),
            ("CALIBRATION_LEVEL".to_string(), "RAW".to_string()),
        ]
    );
    assert_eq!(request.target_filename(), PathBuf::from("j6fl25s4q.tar"));
    Ok(())
}

#[test]
fn product_type_download_parameters() -> EHSTResult<()> {
    let request = DownloadRequest::new("j6fl25s4q").with_product_type("PRODUCT")?;
    assert_eq!(
        request.params().last(),
        Some(&("RETRIEVAL_TYPE".to_string(), "PRODUCT".to_string()))
    );
    Ok(())
}

#[test]
fn science_products_are_gzipped_fits() -> EHSTResult<()> {
    let request = DownloadRequest::new("j6fl25s4q")
        .with_product_type("SCIENCE_PRODUCT")?
        .with_filename("science");
    assert_eq!(request.target_filename(), PathBuf::from("science.fits.gz"));
    assert_eq!(
        DownloadRequest::new("j6fl25s4q")
            .with_product_type("SCIENCE_PRODUCT")?
            .target_filename(),
        PathBuf::from("j6fl25s4q.tar.fits.gz")
    );
    Ok(())
}

#[test]
fn download_moves_the_staged_file() -> EHSTResult<()> {
    let archive = common::archive();
    let out = tempfile::tempdir()?;
    let target = out.path().join("nested").join("j6fl25s4q.tar");
    let request = DownloadRequest::new("j6fl25s4q")
        .with_calibration_level("CALIBRATED")?
        .with_filename(&target);
    let path = archive.download_product(&request, true)?;
    assert_eq!(path, target);
    let body = fs::read_to_string(&path)?;
    assert!(body.contains("CALIBRATION_LEVEL=CALIBRATED"));

    let fetched = archive.transport().last_request();
    assert_eq!(fetched.kind, FetchKind::Science);
    assert!(!fetched.cache);
    assert_eq!(fs::read_dir(archive.transport().dir.path())?.count(), 0);
    Ok(())
}

#[test]
fn postcard_request() -> EHSTResult<()> {
    let archive = common::archive();
    let out = tempfile::tempdir()?;
    let target = out.path().join("preview.jpg");
    let path = archive.get_postcard(
        "j6fl25s4q",
        CalibrationLevel::Raw,
        PostcardResolution::try_from(1024_u32)?,
        Some(target.as_path()),
        false,
    )?;
    assert_eq!(path, target);
    let request = archive.transport().last_request();
    assert_eq!(request.kind, FetchKind::Postcard);
    assert_eq!(request.param("RETRIEVAL_TYPE"), Some("POSTCARD"));
    assert_eq!(request.param("OBSERVATION_ID"), Some("j6fl25s4q"));
    assert_eq!(request.param("CALIBRATION_LEVEL"), Some("RAW"));
    assert_eq!(request.param("RESOLUTION"), Some("1024"));
    Ok(())
}

#[test]
fn postcard_resolution_is_restricted() {
    let err = PostcardResolution::try_from(512_u32).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    assert_eq!(PostcardResolution::default().pixels(), 256);
}

#[test]
fn artifact_request() -> EHSTResult<()> {
    let archive = common::archive();
    let out = tempfile::tempdir()?;
    let target = out.path().join("o4k1a0010_raw.fits");
    archive.get_artifact("O4K1A0010_RAW", Some(target.as_path()), false)?;
    let request = archive.transport().last_request();
    assert_eq!(request.kind, FetchKind::Artifact);
    assert_eq!(request.params, vec![("ARTIFACT_ID".to_string(), "O4K1A0010_RAW".to_string())]);
    assert!(target.is_file());
    Ok(())
}

#[test]
fn query_target_request() -> EHSTResult<()> {
    let archive = common::archive();
    let out = tempfile::tempdir()?;
    let target = out.path().join("target.xml");
    archive.query_target("m31", Some(target.as_path()), OutputFormat::Votable, false)?;
    let request = archive.transport().last_request();
    assert_eq!(request.kind, FetchKind::Target);
    assert_eq!(request.param("QUERY"), Some("(TARGET.TARGET_NAME=='m31')"));
    assert_eq!(request.param("RESOURCE_CLASS"), Some("OBSERVATION"));
    assert_eq!(request.param("SELECTED_FIELDS"), Some("OBSERVATION"));
    assert_eq!(request.param("RETURN_TYPE"), Some("votable"));
    Ok(())
}

#[test]
fn target_name_quotes_are_doubled() -> EHSTResult<()> {
    let archive = common::archive();
    let out = tempfile::tempdir()?;
    let target = out.path().join("target.xml");
    archive.query_target("Barnard's Star", Some(target.as_path()), OutputFormat::Votable, false)?;
    assert_eq!(
        archive.transport().last_request().param("QUERY"),
        Some("(TARGET.TARGET_NAME=='Barnard''s Star')")
    );
    Ok(())
}
