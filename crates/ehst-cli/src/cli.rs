//! Argument parsing and dispatch for the `ehst` binary.

use std::{
    env,
    ffi::OsString,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use clap::{Args, Parser, Subcommand};
use ehst_archive::{
    config::{DEFAULT_DATA_URL, DEFAULT_METADATA_URL, DEFAULT_TAP_URL, DEFAULT_TARGET_URL},
    prelude::*,
};
use serde_json::to_writer_pretty;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ehst", version, about = "Query and download data from the ESA Hubble Science Archive")]
struct Cli {
    /// TAP service URL
    #[arg(long, env = "EHST_TAP_URL", default_value = DEFAULT_TAP_URL, global = true)]
    tap_url: String,

    /// Data retrieval URL
    #[arg(long, env = "EHST_DATA_URL", default_value = DEFAULT_DATA_URL, global = true)]
    data_url: String,

    /// Metadata URL
    #[arg(long, env = "EHST_METADATA_URL", default_value = DEFAULT_METADATA_URL, global = true)]
    metadata_url: String,

    /// Target resolver URL
    #[arg(long, env = "EHST_TARGET_URL", default_value = DEFAULT_TARGET_URL, global = true)]
    target_url: String,

    /// Staging directory for downloads (or env EHST_DOWNLOAD_DIR)
    #[arg(long, env = "EHST_DOWNLOAD_DIR", global = true)]
    download_dir: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 300, global = true)]
    timeout: u64,

    /// Report queries and downloads
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a raw ADQL query
    Query {
        /// ADQL query text
        query: String,
        #[command(flatten)]
        job: JobArgs,
    },
    /// Search observations by criteria
    Criteria {
        #[command(flatten)]
        criteria: CriteriaArgs,
        /// Print the query instead of running it
        #[arg(long)]
        get_query: bool,
        #[command(flatten)]
        job: JobArgs,
    },
    /// Search observations by criteria around a target or position
    ConeCriteria {
        /// Target name to resolve
        #[arg(long)]
        target: Option<String>,
        /// Position, e.g. "00h42m44.51s +41d16m08.45s"
        #[arg(long)]
        coordinates: Option<String>,
        /// Radius, arcminutes unless a unit is given (e.g. "7", "0.5 deg")
        #[arg(long, default_value = "7")]
        radius: AngularDistance,
        #[command(flatten)]
        criteria: CriteriaArgs,
        /// Print the query instead of running it
        #[arg(long)]
        get_query: bool,
        #[command(flatten)]
        job: JobArgs,
    },
    /// Detailed observation cone search through the metadata service
    Cone {
        /// Position, e.g. "10.6847083, 41.26875"
        coordinates: String,
        /// Radius, arcminutes unless a unit is given
        #[arg(long, default_value = "7")]
        radius: AngularDistance,
        /// Output file (default cone.<format>)
        #[arg(long)]
        filename: Option<PathBuf>,
        /// Result format
        #[arg(long, default_value = "votable")]
        format: OutputFormat,
        /// Reuse a previous identical download
        #[arg(long)]
        cache: bool,
    },
    /// List the observations of a target through the metadata service
    Target {
        /// Target name
        name: String,
        /// Output file (default target.xml)
        #[arg(long)]
        filename: Option<PathBuf>,
        /// Result format
        #[arg(long, default_value = "votable")]
        format: OutputFormat,
    },
    /// Download the files of an observation
    Download {
        /// Observation identifier
        observation_id: String,
        /// RAW, CALIBRATED, PRODUCT or AUXILIARY
        #[arg(long, conflicts_with = "product_type")]
        calibration_level: Option<String>,
        /// PRODUCT, SCIENCE_PRODUCT or POSTCARD
        #[arg(long)]
        product_type: Option<String>,
        /// Output file (default <observation_id>.tar)
        #[arg(long)]
        filename: Option<PathBuf>,
    },
    /// Download the preview image of an observation
    Postcard {
        /// Observation identifier
        observation_id: String,
        /// Calibration level of the preview
        #[arg(long, default_value = "RAW")]
        calibration_level: CalibrationLevel,
        /// Edge length in pixels, 256 or 1024
        #[arg(long, default_value_t = 256)]
        resolution: u32,
        /// Output file (default <observation_id>.jpg)
        #[arg(long)]
        filename: Option<PathBuf>,
    },
    /// Download a single artifact
    Artifact {
        /// Artifact identifier
        artifact_id: String,
        /// Output file (default <artifact_id>)
        #[arg(long)]
        filename: Option<PathBuf>,
    },
    /// List the published tables
    Tables {
        /// Only report table names
        #[arg(long)]
        only_names: bool,
    },
    /// List the columns of a table
    Columns {
        /// Qualified table name, e.g. ehst.observation
        table: String,
        /// Only report column names
        #[arg(long)]
        only_names: bool,
    },
    /// Resolve a target name into coordinates
    Resolve {
        /// Target name
        name: String,
    },
}

#[derive(Args)]
struct CriteriaArgs {
    /// Calibration level name or code (0-3)
    #[arg(long, value_parser = parse_calibration_level)]
    calibration_level: Option<CalibrationLevelSelector>,

    /// Data product type, e.g. image
    #[arg(long)]
    data_product_type: Option<String>,

    /// Observation intent, e.g. SCIENCE
    #[arg(long)]
    intent: Option<String>,

    /// Collections, comma separated
    #[arg(long = "collection", value_delimiter = ',')]
    collections: Option<Vec<String>>,

    /// Instruments, comma separated
    #[arg(long = "instrument", value_delimiter = ',')]
    instruments: Option<Vec<String>>,

    /// Filters, comma separated
    #[arg(long = "filter", value_delimiter = ',')]
    filters: Option<Vec<String>>,

    /// JSON document holding the criteria (for cone-criteria, optionally also target, coordinates and radius)
    #[arg(long, conflicts_with_all = ["calibration_level", "data_product_type", "intent", "collections", "instruments", "filters"])]
    criteria_file: Option<PathBuf>,
}

#[derive(Args)]
struct JobArgs {
    /// Run as an asynchronous job
    #[arg(long = "async")]
    async_job: bool,

    /// Write the result to this file instead of stdout
    #[arg(long)]
    output_file: Option<PathBuf>,

    /// Result format
    #[arg(long, default_value = "votable")]
    output_format: OutputFormat,
}

fn parse_calibration_level(s: &str) -> Result<CalibrationLevelSelector, String> {
    Ok(s.parse::<i64>().map_or_else(
        |_| CalibrationLevelSelector::Name(s.to_string()),
        CalibrationLevelSelector::Code,
    ))
}

fn read_json(path: &Path) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    Ok(serde_json::from_str(&fs::read_to_string(path)?)?)
}

impl CriteriaArgs {
    fn into_query(self) -> Result<CriteriaQuery, Box<dyn std::error::Error>> {
        if let Some(path) = self.criteria_file {
            return Ok(CriteriaQuery::from_json(&read_json(&path)?)?);
        }
        let mut query = CriteriaQuery::default();
        if let Some(level) = self.calibration_level {
            query = query.with_calibration_level(level);
        }
        if let Some(data_product_type) = self.data_product_type {
            query = query.with_data_product_type(data_product_type);
        }
        if let Some(intent) = self.intent {
            query = query.with_intent(intent);
        }
        if let Some(collections) = self.collections {
            query = query.with_collections(collections);
        }
        if let Some(instruments) = self.instruments {
            query = query.with_instruments(instruments);
        }
        if let Some(filters) = self.filters {
            query = query.with_filters(filters);
        }
        Ok(query)
    }
}

impl JobArgs {
    fn options(&self, verbose: bool) -> JobOptions {
        let options = JobOptions::default()
            .asynchronous(self.async_job)
            .with_output_format(self.output_format)
            .verbose(verbose);
        match &self.output_file {
            Some(path) => options.with_output_file(path),
            None => options,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    // A subscriber may already be installed when running inside tests.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .try_init();
}

fn print_job(out: &mut impl Write, result: &JobResult) -> io::Result<()> {
    match &result.output_file {
        Some(path) => writeln!(out, "{}", path.display()),
        None => writeln!(out, "{}", result.text()),
    }
}

/// Execute the command-line interface with a custom argv iterator, printing to stdout.
pub fn run_with_args<I, T>(args: I) -> Result<(), Box<dyn std::error::Error>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    run_with_writer(args, &mut io::stdout().lock())
}

/// Execute the command-line interface, writing command output to `out`.
pub fn run_with_writer<I, T, W>(args: I, out: &mut W) -> Result<(), Box<dyn std::error::Error>>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
    W: Write,
{
    let cli = Cli::parse_from(args);
    init_tracing(cli.verbose);

    let mut config = ArchiveConfig::default()
        .with_tap_url(cli.tap_url)
        .with_data_url(cli.data_url)
        .with_metadata_url(cli.metadata_url)
        .with_target_url(cli.target_url)
        .with_timeout(Duration::from_secs(cli.timeout));
    if let Some(dir) = cli.download_dir {
        config = config.with_download_dir(dir);
    }
    debug!("archive configuration: {config:?}");
    let verbose = cli.verbose;
    let connect = || EHST::connect(&config);

    match cli.command {
        Command::Query { query, job } => {
            print_job(out, &connect()?.query_hst_tap(&query, &job.options(verbose))?)?;
        }
        Command::Criteria {
            criteria,
            get_query,
            job,
        } => {
            let criteria = criteria.into_query()?;
            if get_query {
                writeln!(out, "{}", build_criteria_query(&criteria)?)?;
            } else {
                print_job(out, &connect()?.query_criteria(&criteria, &job.options(verbose))?)?;
            }
        }
        Command::ConeCriteria {
            target,
            coordinates,
            radius,
            criteria,
            get_query,
            job,
        } => {
            // A criteria file may also carry the position and the radius.
            let mut search = if let Some(path) = &criteria.criteria_file {
                ConeSearchCriteria::from_json(&read_json(path)?, radius)?
            } else {
                ConeSearchCriteria::new(radius).with_criteria(criteria.into_query()?)
            };
            if let Some(target) = target {
                search = search.with_target(target);
            }
            if let Some(coordinates) = coordinates {
                search = search.with_coordinates(coordinates);
            }
            let archive = connect()?;
            if get_query {
                writeln!(out, "{}", archive.build_cone_search_query(&search)?)?;
            } else {
                print_job(out, &archive.cone_search_criteria(&search, &job.options(verbose))?)?;
            }
        }
        Command::Cone {
            coordinates,
            radius,
            filename,
            format,
            cache,
        } => {
            let path = connect()?.cone_search(
                &CoordinateInput::from(coordinates),
                &radius,
                filename.as_deref(),
                format,
                cache,
                verbose,
            )?;
            writeln!(out, "{}", path.display())?;
        }
        Command::Target {
            name,
            filename,
            format,
        } => {
            let path = connect()?.query_target(&name, filename.as_deref(), format, verbose)?;
            writeln!(out, "{}", path.display())?;
        }
        Command::Download {
            observation_id,
            calibration_level,
            product_type,
            filename,
        } => {
            let mut request = DownloadRequest::new(observation_id);
            if let Some(selection) = ProductSelection::from_options(
                calibration_level.as_deref(),
                product_type.as_deref(),
            )? {
                request = request.with_selection(selection)?;
            }
            if let Some(filename) = filename {
                request = request.with_filename(filename);
            }
            let path = connect()?.download_product(&request, verbose)?;
            writeln!(out, "{}", path.display())?;
        }
        Command::Postcard {
            observation_id,
            calibration_level,
            resolution,
            filename,
        } => {
            let resolution = PostcardResolution::try_from(resolution)?;
            let path = connect()?.get_postcard(
                &observation_id,
                calibration_level,
                resolution,
                filename.as_deref(),
                verbose,
            )?;
            writeln!(out, "{}", path.display())?;
        }
        Command::Artifact {
            artifact_id,
            filename,
        } => {
            let path = connect()?.get_artifact(&artifact_id, filename.as_deref(), verbose)?;
            writeln!(out, "{}", path.display())?;
        }
        Command::Tables { only_names } => {
            to_writer_pretty(&mut *out, &connect()?.get_tables(only_names, verbose)?)?;
            writeln!(out)?;
        }
        Command::Columns { table, only_names } => {
            to_writer_pretty(
                &mut *out,
                &connect()?.get_columns(&table, only_names, verbose)?,
            )?;
            writeln!(out)?;
        }
        Command::Resolve { name } => {
            to_writer_pretty(&mut *out, &connect()?.resolve_target(&name)?)?;
            writeln!(out)?;
        }
    }
    Ok(())
}

/// Execute the command-line interface with the process arguments.
pub fn cli() -> Result<(), Box<dyn std::error::Error>> {
    run_with_args(env::args_os())
}
