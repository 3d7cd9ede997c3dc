//! Execution of ADQL queries against a TAP service.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
    thread,
    time::Duration,
};

use reqwest::blocking::{Client, Response};
use tracing::{debug, info};

use crate::{
    config::ArchiveConfig,
    models::{ColumnInfo, JobPhase, OutputFormat, ResultTable, TableInfo},
    EHSTError, EHSTResult,
};

/// How a query is submitted and where its result goes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobOptions {
    /// Submit through the asynchronous (UWS) interface instead of `/sync`.
    pub async_job: bool,
    /// File the raw result is written to.
    pub output_file: Option<PathBuf>,
    /// Requested result format.
    pub output_format: OutputFormat,
    /// Report progress at info level.
    pub verbose: bool,
}

impl JobOptions {
    /// Runs the job asynchronously.
    pub fn asynchronous(mut self, async_job: bool) -> Self {
        self.async_job = async_job;
        self
    }

    /// Dumps the result to `path`.
    pub fn with_output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// Requests `format`.
    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Enables verbose reporting.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// Result of a finished TAP job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobResult {
    /// Query that produced the result.
    pub query: String,
    /// Format of [`JobResult::payload`].
    pub format: OutputFormat,
    /// Raw result document.
    pub payload: String,
    /// File the result was written to, if any.
    pub output_file: Option<PathBuf>,
    /// URL of the asynchronous job, if the query ran asynchronously.
    pub job_url: Option<String>,
}

impl JobResult {
    /// Raw result document.
    pub fn text(&self) -> &str {
        &self.payload
    }

    /// Decodes a JSON result.
    pub fn table(&self) -> EHSTResult<ResultTable> {
        if self.format != OutputFormat::Json {
            return Err(EHSTError::NotJsonResult(self.format));
        }
        Ok(serde_json::from_str(&self.payload)?)
    }

    /// Writes the raw result to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> EHSTResult<()> {
        fs::write(path, &self.payload)?;
        Ok(())
    }
}

/// Something that can run ADQL queries and describe the tables they run against.
pub trait TapHandler {
    /// Runs `query` and returns its result.
    fn launch_job(&self, query: &str, options: &JobOptions) -> EHSTResult<JobResult>;

    /// Lists the published tables.
    fn get_tables(&self, only_names: bool, verbose: bool) -> EHSTResult<Vec<TableInfo>>;

    /// Lists the columns of `table_name`.
    ///
    /// Fails with [`EHSTError::TableNotFound`] when the table does not exist.
    fn get_columns(
        &self,
        table_name: &str,
        only_names: bool,
        verbose: bool,
    ) -> EHSTResult<Vec<ColumnInfo>>;
}

/// [`TapHandler`] speaking the IVOA TAP protocol over HTTP.
#[derive(Debug, Clone)]
pub struct HttpTap {
    client: Client,
    base_url: String,
    poll_interval: Duration,
    max_polls: u32,
}

impl HttpTap {
    /// Creates a handler for the TAP service configured in `config`.
    pub fn new(config: &ArchiveConfig) -> EHSTResult<Self> {
        Ok(Self::with_client(config.http_client()?, config))
    }

    /// Creates a handler reusing an existing HTTP client.
    pub fn with_client(client: Client, config: &ArchiveConfig) -> Self {
        Self {
            client,
            base_url: config.tap_url.trim_end_matches('/').to_string(),
            poll_interval: config.poll_interval,
            max_polls: config.max_polls,
        }
    }

    /// Base URL of the service.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn run_sync(&self, query: &str, format: OutputFormat) -> EHSTResult<String> {
        let response = self
            .client
            .post(format!("{}/sync", self.base_url))
            .form(&query_params(query, format))
            .send()?;
        Ok(check_status(response)?.text()?)
    }

    fn run_async(&self, query: &str, format: OutputFormat) -> EHSTResult<(String, String)> {
        let mut params = query_params(query, format);
        params.push(("PHASE", "RUN"));
        let response = check_status(
            self.client
                .post(format!("{}/async", self.base_url))
                .form(&params)
                .send()?,
        )?;
        // The service redirects to the job resource.
        let job_url = response.url().as_str().trim_end_matches('/').to_string();
        debug!("submitted job {job_url}");
        self.wait_for_job(&job_url)?;
        let result = check_status(
            self.client
                .get(format!("{job_url}/results/result"))
                .send()?,
        )?
        .text()?;
        Ok((result, job_url))
    }

    fn wait_for_job(&self, job_url: &str) -> EHSTResult<()> {
        wait_for_completion(job_url, self.max_polls, self.poll_interval, || {
            self.job_phase(job_url)
        })
    }

    fn job_phase(&self, job_url: &str) -> EHSTResult<JobPhase> {
        let text = check_status(self.client.get(format!("{job_url}/phase")).send()?)?.text()?;
        Ok(JobPhase::from_str(text.trim()).unwrap_or(JobPhase::Unknown))
    }

    fn json_query(&self, query: &str) -> EHSTResult<ResultTable> {
        let payload = self.run_sync(query, OutputFormat::Json)?;
        Ok(serde_json::from_str(&payload)?)
    }
}

impl TapHandler for HttpTap {
    fn launch_job(&self, query: &str, options: &JobOptions) -> EHSTResult<JobResult> {
        if options.verbose {
            info!("launching {} job: {query}", job_mode(options));
        } else {
            debug!("launching {} job: {query}", job_mode(options));
        }
        let (payload, job_url) = if options.async_job {
            let (payload, url) = self.run_async(query, options.output_format)?;
            (payload, Some(url))
        } else {
            (self.run_sync(query, options.output_format)?, None)
        };
        let result = JobResult {
            query: query.to_string(),
            format: options.output_format,
            payload,
            output_file: options.output_file.clone(),
            job_url,
        };
        if let Some(path) = &result.output_file {
            result.save(path)?;
            if options.verbose {
                info!("job result saved to {}", path.display());
            }
        }
        Ok(result)
    }

    fn get_tables(&self, only_names: bool, verbose: bool) -> EHSTResult<Vec<TableInfo>> {
        if verbose {
            info!("retrieving tables");
        }
        let table =
            self.json_query("select table_name, schema_name, description from TAP_SCHEMA.tables")?;
        Ok(tables_from_result(&table, only_names))
    }

    fn get_columns(
        &self,
        table_name: &str,
        only_names: bool,
        verbose: bool,
    ) -> EHSTResult<Vec<ColumnInfo>> {
        if verbose {
            info!("retrieving columns of {table_name}");
        }
        let table = self.json_query(&format!(
            "select column_name, datatype, unit, description from TAP_SCHEMA.columns where table_name = '{}'",
            table_name.replace('\'', "''")
        ))?;
        let columns = columns_from_result(&table, only_names);
        if columns.is_empty() {
            return Err(EHSTError::TableNotFound(table_name.to_string()));
        }
        Ok(columns)
    }
}

/// Polls `next_phase` until the job `job` reaches a terminal phase.
///
/// Returns `Ok` on [`JobPhase::Completed`] and [`EHSTError::JobFailed`] on any other terminal
/// phase. Non-terminal phases, [`JobPhase::Unknown`] included, sleep for `interval` and poll
/// again, giving up with [`EHSTError::JobTimeout`] after `max_polls` polls.
pub fn wait_for_completion(
    job: &str,
    max_polls: u32,
    interval: Duration,
    mut next_phase: impl FnMut() -> EHSTResult<JobPhase>,
) -> EHSTResult<()> {
    for _ in 0..max_polls {
        match next_phase()? {
            JobPhase::Completed => return Ok(()),
            phase if phase.is_terminal() => {
                return Err(EHSTError::JobFailed {
                    job: job.to_string(),
                    phase,
                })
            }
            phase => {
                debug!("job {job} is {phase}");
                thread::sleep(interval);
            }
        }
    }
    Err(EHSTError::JobTimeout(job.to_string()))
}

fn job_mode(options: &JobOptions) -> &'static str {
    if options.async_job {
        "async"
    } else {
        "sync"
    }
}

fn query_params(query: &str, format: OutputFormat) -> Vec<(&str, &str)> {
    vec![
        ("REQUEST", "doQuery"),
        ("LANG", "ADQL"),
        ("FORMAT", format.as_str()),
        ("QUERY", query),
    ]
}

pub(crate) fn check_status(response: Response) -> EHSTResult<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(EHSTError::TapRequest {
            status: status.as_u16(),
            message: response.text().unwrap_or_default(),
        })
    }
}

/// Reads a `TAP_SCHEMA.tables` result.
pub fn tables_from_result(table: &ResultTable, only_names: bool) -> Vec<TableInfo> {
    (0..table.len())
        .filter_map(|row| {
            let name = table.text(row, "table_name")?.to_string();
            let detail = |column: &str| {
                (!only_names)
                    .then(|| table.text(row, column).map(str::to_string))
                    .flatten()
            };
            Some(TableInfo {
                name,
                schema: detail("schema_name"),
                description: detail("description"),
            })
        })
        .collect()
}

/// Reads a `TAP_SCHEMA.columns` result.
pub fn columns_from_result(table: &ResultTable, only_names: bool) -> Vec<ColumnInfo> {
    (0..table.len())
        .filter_map(|row| {
            let name = table.text(row, "column_name")?.to_string();
            let detail = |column: &str| {
                (!only_names)
                    .then(|| table.text(row, column).map(str::to_string))
                    .flatten()
            };
            Some(ColumnInfo {
                name,
                datatype: detail("datatype"),
                unit: detail("unit"),
                description: detail("description"),
            })
        })
        .collect()
}
