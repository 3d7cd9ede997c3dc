//! Integration tests: transport.

use std::fs;

use ehst_archive::{
    prelude::*,
    transport::{FetchRequest, HttpTransport, Transport},
};

fn cone_request() -> FetchRequest {
    FetchRequest::new(FetchKind::ConeSearch)
        .with_param("ADQLQUERY", "select 1")
        .with_param("PAGE", 1)
        .with_cache(true)
}

#[test]
fn staging_path_depends_on_the_endpoint() -> EHSTResult<()> {
    let dir = tempfile::tempdir()?;
    let config = ArchiveConfig::default().with_download_dir(dir.path());
    let primary = HttpTransport::new(&config)?;
    let mirror =
        HttpTransport::new(&config.clone().with_metadata_url("http://mirror.invalid/metadata"))?;
    let request = cone_request();
    assert_ne!(primary.staging_path(&request), mirror.staging_path(&request));
    assert_eq!(primary.staging_path(&request), primary.staging_path(&request.clone()));
    Ok(())
}

#[test]
fn staging_path_depends_on_the_parameters() -> EHSTResult<()> {
    let dir = tempfile::tempdir()?;
    let transport = HttpTransport::new(&ArchiveConfig::default().with_download_dir(dir.path()))?;
    let first = transport.staging_path(&cone_request());
    let second = transport.staging_path(&cone_request().with_param("PAGE_SIZE", 50));
    assert_ne!(first, second);
    let name = first.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    assert!(name.starts_with("cone_search-"));
    assert_eq!(name.len(), "cone_search-".len() + 32);
    Ok(())
}

#[test]
fn cached_request_reuses_the_staged_file() -> EHSTResult<()> {
    let dir = tempfile::tempdir()?;
    let config = ArchiveConfig::default()
        .with_download_dir(dir.path())
        .with_metadata_url("http://127.0.0.1:9/unreachable");
    let transport = HttpTransport::new(&config)?;
    let request = cone_request();
    let staged = transport.staging_path(&request);
    fs::write(&staged, "previous result")?;

    let path = transport.fetch(&request)?;
    assert_eq!(path, staged);
    assert_eq!(fs::read_to_string(&path)?, "previous result");
    Ok(())
}
