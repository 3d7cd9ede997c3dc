//! Observation download requests.

use std::{path::PathBuf, str::FromStr};

use crate::{
    models::{CalibrationLevel, ProductType},
    EHSTError, EHSTResult,
};

/// User name the data service expects from this client.
pub const DOWNLOAD_USERNAME: &str = "ehst-astroquery";

/// Which files of an observation to retrieve.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ProductSelection {
    /// Every file at the given calibration level.
    CalibrationLevel(CalibrationLevel),
    /// A specific product type.
    ProductType(ProductType),
}

impl ProductSelection {
    /// Parses a calibration level name, rejecting anything outside the downloadable set.
    pub fn calibration_level(name: &str) -> EHSTResult<Self> {
        CalibrationLevel::from_str(name)
            .map(Self::CalibrationLevel)
            .map_err(|_| EHSTError::CalibrationLevelNotAllowed(name.to_string()))
    }

    /// Parses a product type name, rejecting anything outside the downloadable set.
    pub fn product_type(name: &str) -> EHSTResult<Self> {
        ProductType::from_str(name)
            .map(Self::ProductType)
            .map_err(|_| EHSTError::ProductTypeNotAllowed(name.to_string()))
    }

    /// Builds a selection from the two optional, mutually exclusive names.
    ///
    /// With neither given, the whole product bundle is selected.
    pub fn from_options(
        calibration_level: Option<&str>,
        product_type: Option<&str>,
    ) -> EHSTResult<Option<Self>> {
        match (calibration_level, product_type) {
            (Some(_), Some(_)) => Err(EHSTError::ConflictingProductSelection),
            (Some(level), None) => Self::calibration_level(level).map(Some),
            (None, Some(product)) => Self::product_type(product).map(Some),
            (None, None) => Ok(None),
        }
    }

    fn param(&self) -> (&'static str, &'static str) {
        match self {
            Self::CalibrationLevel(level) => ("CALIBRATION_LEVEL", level.as_str()),
            Self::ProductType(product) => ("RETRIEVAL_TYPE", product.as_str()),
        }
    }
}

/// Download of the files belonging to one observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    observation_id: String,
    selection: Option<ProductSelection>,
    filename: Option<PathBuf>,
}

impl DownloadRequest {
    /// Downloads the default bundle of `observation_id`.
    pub fn new(observation_id: impl Into<String>) -> Self {
        Self {
            observation_id: observation_id.into(),
            selection: None,
            filename: None,
        }
    }

    /// Selects files by calibration level name.
    ///
    /// Fails if a product type was already selected or the name is not downloadable.
    pub fn with_calibration_level(self, name: &str) -> EHSTResult<Self> {
        let selection = ProductSelection::calibration_level(name)?;
        self.with_selection(selection)
    }

    /// Selects files by product type name.
    ///
    /// Fails if a calibration level was already selected or the name is not downloadable.
    pub fn with_product_type(self, name: &str) -> EHSTResult<Self> {
        let selection = ProductSelection::product_type(name)?;
        self.with_selection(selection)
    }

    /// Sets an already validated selection; fails if one is already set.
    pub fn with_selection(mut self, selection: ProductSelection) -> EHSTResult<Self> {
        if self.selection.is_some() {
            return Err(EHSTError::ConflictingProductSelection);
        }
        self.selection = Some(selection);
        Ok(self)
    }

    /// Overrides the output path.
    pub fn with_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Requested observation.
    pub fn observation_id(&self) -> &str {
        &self.observation_id
    }

    /// Requested selection, if any.
    pub fn selection(&self) -> Option<ProductSelection> {
        self.selection
    }

    /// Where the download ends up.
    ///
    /// Defaults to `<observation_id>.tar`. Science products are gzipped FITS files, so
    /// `.fits.gz` is appended to whatever name was chosen.
    pub fn target_filename(&self) -> PathBuf {
        let base = self
            .filename
            .clone()
            .unwrap_or_else(|| PathBuf::from(format!("{}.tar", self.observation_id)));
        if self.selection == Some(ProductSelection::ProductType(ProductType::ScienceProduct)) {
            let mut name = base.into_os_string();
            name.push(".fits.gz");
            PathBuf::from(name)
        } else {
            base
        }
    }

    /// Query parameters sent to the data service.
    pub fn params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("OBSERVATION_ID".to_string(), self.observation_id.clone()),
            ("USERNAME".to_string(), DOWNLOAD_USERNAME.to_string()),
        ];
        if let Some(selection) = &self.selection {
            let (key, value) = selection.param();
            params.push((key.to_string(), value.to_string()));
        }
        params
    }
}
