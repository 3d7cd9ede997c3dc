#![allow(dead_code)]

use std::{
    cell::RefCell,
    collections::HashMap,
    fs,
    path::PathBuf,
};

use ehst_archive::{
    models::{ColumnInfo, TableInfo},
    prelude::*,
};
use tempfile::TempDir;

/// Records every job it is asked to run and answers with a canned payload.
#[derive(Default)]
pub struct RecordingTap {
    pub jobs: RefCell<Vec<(String, JobOptions)>>,
    pub payload: String,
}

impl RecordingTap {
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            jobs: RefCell::default(),
            payload: payload.into(),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.jobs.borrow().iter().map(|(q, _)| q.clone()).collect()
    }

    pub fn last_query(&self) -> Option<String> {
        self.jobs.borrow().last().map(|(q, _)| q.clone())
    }
}

impl TapHandler for RecordingTap {
    fn launch_job(&self, query: &str, options: &JobOptions) -> EHSTResult<JobResult> {
        self.jobs
            .borrow_mut()
            .push((query.to_string(), options.clone()));
        Ok(JobResult {
            query: query.to_string(),
            format: options.output_format,
            payload: self.payload.clone(),
            output_file: options.output_file.clone(),
            job_url: None,
        })
    }

    fn get_tables(&self, only_names: bool, _verbose: bool) -> EHSTResult<Vec<TableInfo>> {
        let detail = |text: &str| (!only_names).then(|| text.to_string());
        Ok(vec![
            TableInfo {
                name: "ehst.observation".to_string(),
                schema: detail("ehst"),
                description: detail("HST observations"),
            },
            TableInfo {
                name: "ehst.plane".to_string(),
                schema: detail("ehst"),
                description: detail("Observation planes"),
            },
        ])
    }

    fn get_columns(
        &self,
        table_name: &str,
        only_names: bool,
        _verbose: bool,
    ) -> EHSTResult<Vec<ColumnInfo>> {
        if table_name != "ehst.observation" {
            return Err(EHSTError::TableNotFound(table_name.to_string()));
        }
        let detail = |text: &str| (!only_names).then(|| text.to_string());
        Ok(vec![ColumnInfo {
            name: "observation_id".to_string(),
            datatype: detail("VARCHAR"),
            unit: None,
            description: detail("Observation identifier"),
        }])
    }
}

/// Writes one staging file per request into a temporary directory.
pub struct StagingTransport {
    pub dir: TempDir,
    pub requests: RefCell<Vec<FetchRequest>>,
}

impl StagingTransport {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create staging directory"),
            requests: RefCell::default(),
        }
    }

    pub fn last_request(&self) -> FetchRequest {
        self.requests
            .borrow()
            .last()
            .cloned()
            .expect("no request was made")
    }
}

impl Transport for StagingTransport {
    fn fetch(&self, request: &FetchRequest) -> EHSTResult<PathBuf> {
        let index = self.requests.borrow().len();
        self.requests.borrow_mut().push(request.clone());
        let path = self.dir.path().join(format!("{}-{index}", request.kind));
        let body = request
            .params
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("\n");
        fs::write(&path, body)?;
        Ok(path)
    }
}

/// Resolves names from a fixed table and remembers what was asked.
#[derive(Default)]
pub struct TableResolver {
    pub known: HashMap<String, SkyCoord>,
    pub calls: RefCell<Vec<String>>,
}

impl TableResolver {
    pub fn with_target(mut self, name: &str, ra: f64, dec: f64) -> Self {
        self.known.insert(
            name.to_string(),
            SkyCoord::new(ra, dec).expect("valid test coordinates"),
        );
        self
    }
}

impl TargetResolver for TableResolver {
    fn resolve(&self, name: &str) -> EHSTResult<SkyCoord> {
        self.calls.borrow_mut().push(name.to_string());
        self.known
            .get(name)
            .copied()
            .ok_or_else(|| EHSTError::TargetNotResolved(name.to_string()))
    }
}

pub type TestArchive = EHST<RecordingTap, StagingTransport, TableResolver>;

pub fn archive() -> TestArchive {
    EHST::with_handlers(
        RecordingTap::default(),
        StagingTransport::new(),
        TableResolver::default().with_target("m31", 10.6847083, 41.26875),
    )
}
