//! The [`EHST`] client facade.

use std::{
    fs,
    path::{Path, PathBuf},
};

use ehst_core::{AngularDistance, SkyCoord};
use tracing::{debug, info};

use crate::{
    cond,
    config::ArchiveConfig,
    download::{DownloadRequest, ProductSelection},
    input::CoordinateInput,
    models::{CalibrationLevel, ColumnInfo, OutputFormat, PostcardResolution, ProductType, TableInfo},
    query::{
        build_criteria_query, cone_search_query, metadata_cone_query, ConeSearchCriteria,
        CriteriaQuery, PositionSource,
    },
    resolver::{HttpTargetResolver, TargetResolver},
    tap::{HttpTap, JobOptions, JobResult, TapHandler},
    transport::{FetchKind, FetchRequest, HttpTransport, Transport},
    EHSTResult,
};

fn report(verbose: bool, message: &str) {
    if verbose {
        info!("{message}");
    } else {
        debug!("{message}");
    }
}

/// Primary entry point for querying and downloading from the eHST archive.
///
/// The archive delegates query execution, file retrieval and name resolution to three
/// collaborators; everything it sends them has already been validated.
#[derive(Debug, Clone)]
pub struct EHST<T = HttpTap, D = HttpTransport, R = HttpTargetResolver> {
    tap: T,
    transport: D,
    resolver: R,
}

impl EHST {
    /// Connects to the services configured in `config` over HTTP.
    pub fn connect(config: &ArchiveConfig) -> EHSTResult<Self> {
        let client = config.http_client()?;
        Ok(Self::with_handlers(
            HttpTap::with_client(client.clone(), config),
            HttpTransport::with_client(client.clone(), config),
            HttpTargetResolver::with_client(client, config),
        ))
    }
}

impl<T: TapHandler, D: Transport, R: TargetResolver> EHST<T, D, R> {
    /// Creates an archive from explicit collaborators.
    pub fn with_handlers(tap: T, transport: D, resolver: R) -> Self {
        Self {
            tap,
            transport,
            resolver,
        }
    }

    /// The TAP handler.
    pub fn tap(&self) -> &T {
        &self.tap
    }

    /// The file transport.
    pub fn transport(&self) -> &D {
        &self.transport
    }

    /// The target resolver.
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Runs a hand-written ADQL query.
    pub fn query_hst_tap(&self, query: &str, options: &JobOptions) -> EHSTResult<JobResult> {
        self.tap.launch_job(query, options)
    }

    /// Builds the criteria query and runs it.
    ///
    /// Use [`build_criteria_query`] to obtain the query text without running it.
    pub fn query_criteria(
        &self,
        criteria: &CriteriaQuery,
        options: &JobOptions,
    ) -> EHSTResult<JobResult> {
        let query = build_criteria_query(criteria)?;
        report(options.verbose, &query);
        self.tap.launch_job(&query, options)
    }

    /// Builds the query for a cone search combined with criteria.
    ///
    /// Criteria and position are validated before a target name is resolved.
    pub fn build_cone_search_query(&self, search: &ConeSearchCriteria) -> EHSTResult<String> {
        let predicates = search.criteria().predicates()?;
        let center = match search.position()? {
            PositionSource::Target(name) => self.resolver.resolve(name)?,
            PositionSource::Coordinates(coordinates) => coordinates,
        };
        Ok(cone_search_query(predicates, &center, search.radius()))
    }

    /// Builds a cone search combined with criteria and runs it.
    pub fn cone_search_criteria(
        &self,
        search: &ConeSearchCriteria,
        options: &JobOptions,
    ) -> EHSTResult<JobResult> {
        let query = self.build_cone_search_query(search)?;
        report(options.verbose, &query);
        self.tap.launch_job(&query, options)
    }

    /// Runs the detailed observation cone search of the metadata service.
    ///
    /// The result is written to `filename`, by default `cone.<format>`.
    pub fn cone_search(
        &self,
        coordinates: &CoordinateInput,
        radius: &AngularDistance,
        filename: Option<&Path>,
        output_format: OutputFormat,
        cache: bool,
        verbose: bool,
    ) -> EHSTResult<PathBuf> {
        let center = coordinates.resolve()?;
        let query = metadata_cone_query(&center, radius);
        report(verbose, &query);
        let request = FetchRequest::new(FetchKind::ConeSearch)
            .with_param("RESOURCE_CLASS", "OBSERVATION")
            .with_param("ADQLQUERY", query)
            .with_param("SELECTED_FIELDS", "OBSERVATION")
            .with_param("PAGE", 1)
            .with_param("PAGE_SIZE", 50)
            .with_param("RETURN_TYPE", output_format)
            .with_cache(cache);
        let target = filename.map_or_else(
            || PathBuf::from(format!("cone.{output_format}")),
            Path::to_path_buf,
        );
        self.retrieve(&request, &target, verbose)
    }

    /// Lists the observations of a named target through the metadata service.
    ///
    /// The result is written to `filename`, by default `target.xml`.
    pub fn query_target(
        &self,
        name: &str,
        filename: Option<&Path>,
        output_format: OutputFormat,
        verbose: bool,
    ) -> EHSTResult<PathBuf> {
        let request = FetchRequest::new(FetchKind::Target)
            .with_param("RESOURCE_CLASS", "OBSERVATION")
            .with_param("SELECTED_FIELDS", "OBSERVATION")
            .with_param(
                "QUERY",
                format!("(TARGET.TARGET_NAME=='{}')", cond::escape_literal(name)),
            )
            .with_param("RETURN_TYPE", output_format);
        let target = filename.map_or_else(|| PathBuf::from("target.xml"), Path::to_path_buf);
        self.retrieve(&request, &target, verbose)
    }

    /// Downloads the files of an observation.
    pub fn download_product(
        &self,
        download: &DownloadRequest,
        verbose: bool,
    ) -> EHSTResult<PathBuf> {
        let target = download.target_filename();
        if download.selection() == Some(ProductSelection::ProductType(ProductType::ScienceProduct))
        {
            info!(
                "science products are gzipped FITS files, saving as {}",
                target.display()
            );
        }
        let request = FetchRequest::new(FetchKind::Science).with_params(download.params());
        self.retrieve(&request, &target, verbose)
    }

    /// Downloads the preview image of an observation.
    ///
    /// The image is written to `filename`, by default `<observation_id>.jpg`.
    pub fn get_postcard(
        &self,
        observation_id: &str,
        calibration_level: CalibrationLevel,
        resolution: PostcardResolution,
        filename: Option<&Path>,
        verbose: bool,
    ) -> EHSTResult<PathBuf> {
        let request = FetchRequest::new(FetchKind::Postcard)
            .with_param("RETRIEVAL_TYPE", ProductType::Postcard)
            .with_param("OBSERVATION_ID", observation_id)
            .with_param("CALIBRATION_LEVEL", calibration_level)
            .with_param("RESOLUTION", resolution.pixels());
        let target = filename.map_or_else(
            || PathBuf::from(format!("{observation_id}.jpg")),
            Path::to_path_buf,
        );
        self.retrieve(&request, &target, verbose)
    }

    /// Downloads a single artifact.
    ///
    /// The file is written to `filename`, by default named after the artifact.
    pub fn get_artifact(
        &self,
        artifact_id: &str,
        filename: Option<&Path>,
        verbose: bool,
    ) -> EHSTResult<PathBuf> {
        let request =
            FetchRequest::new(FetchKind::Artifact).with_param("ARTIFACT_ID", artifact_id);
        let target = filename.map_or_else(|| PathBuf::from(artifact_id), Path::to_path_buf);
        self.retrieve(&request, &target, verbose)
    }

    /// Lists the tables published by the TAP service.
    pub fn get_tables(&self, only_names: bool, verbose: bool) -> EHSTResult<Vec<TableInfo>> {
        self.tap.get_tables(only_names, verbose)
    }

    /// Lists the columns of a TAP table.
    pub fn get_columns(
        &self,
        table_name: &str,
        only_names: bool,
        verbose: bool,
    ) -> EHSTResult<Vec<ColumnInfo>> {
        self.tap.get_columns(table_name, only_names, verbose)
    }

    /// Resolves a target name into coordinates.
    pub fn resolve_target(&self, name: &str) -> EHSTResult<SkyCoord> {
        self.resolver.resolve(name)
    }

    fn retrieve(&self, request: &FetchRequest, target: &Path, verbose: bool) -> EHSTResult<PathBuf> {
        let staged = self.transport.fetch(request)?;
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        if request.cache {
            fs::copy(&staged, target)?;
        } else if fs::rename(&staged, target).is_err() {
            // Staging directory may live on another filesystem.
            fs::copy(&staged, target)?;
            fs::remove_file(&staged)?;
        }
        report(
            verbose,
            &format!("{} saved to {}", request.kind, target.display()),
        );
        Ok(target.to_path_buf())
    }
}
