//! ADQL query construction from search criteria.

use ehst_core::{AngularDistance, SkyCoord};
use serde_json::Value;

use crate::{
    cond::{self, Column, Expr},
    input::{
        string_list_from_json, validate_string_list, CalibrationLevelSelector, CoordinateInput,
    },
    EHSTError, EHSTResult,
};

const CRITERIA_SELECT: &str = "select o.*, p.calibration_level, p.data_product_type, pos.ra, pos.dec from ehst.observation AS o JOIN ehst.plane as p on o.observation_uuid=p.observation_uuid JOIN ehst.position as pos on p.plane_id = pos.plane_id";

const BARE_SELECT: &str = "select o.*, p.calibration_level, p.data_product_type from ehst.observation AS o LEFT JOIN ehst.plane as p on o.observation_uuid=p.observation_uuid";

const METADATA_CONE_SELECT: &str = "select o.observation_id, o.start_time, o.end_time, o.start_time_mjd, o.end_time_mjd, o.exposure_duration, o.release_date, o.run_id, o.program_id, o.set_id, o.collection, o.members_number, o.instrument_configuration, o.instrument_name, o.obs_type, o.target_moving, o.target_name, o.target_description, o.proposal_id, o.pi_name, prop.title, pl.metadata_provenance, pl.data_product_type, pl.software_version, pos.ra, pos.dec, pos.gal_lat, pos.gal_lon, pos.ecl_lat, pos.ecl_lon, pos.fov_size, en.wave_central, en.wave_bandwidth, en.wave_max, en.wave_min, en.filter from ehst.observation o join ehst.proposal prop on o.proposal_id=prop.proposal_id join ehst.plane pl on pl.observation_id=o.observation_id join ehst.position pos on pos.plane_id = pl.plane_id join ehst.energy en on en.plane_id=pl.plane_id where pl.main=true and pl.metadata_provenance='HST' and (o.collection='HST' or o.collection='HLA') and ";

/// Structured search criteria over observations and their planes.
///
/// Every field is optional; absent fields do not constrain the query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CriteriaQuery {
    calibration_level: Option<CalibrationLevelSelector>,
    data_product_type: Option<String>,
    intent: Option<String>,
    obs_collection: Option<Vec<String>>,
    instrument_name: Option<Vec<String>>,
    filters: Option<Vec<String>>,
}

type PredicateBuilder = fn(&CriteriaQuery) -> EHSTResult<Option<Expr>>;

// Rendering order of the WHERE clause.
const PREDICATE_BUILDERS: [PredicateBuilder; 6] = [
    calibration_level_predicate,
    data_product_type_predicate,
    intent_predicate,
    collection_predicate,
    instrument_predicate,
    filters_predicate,
];

impl CriteriaQuery {
    /// Restricts the calibration level, by name or numeric code.
    pub fn with_calibration_level(mut self, level: impl Into<CalibrationLevelSelector>) -> Self {
        self.calibration_level = Some(level.into());
        self
    }

    /// Restricts the data product type (e.g. `image`, `spectrum`).
    pub fn with_data_product_type(mut self, data_product_type: impl Into<String>) -> Self {
        self.data_product_type = Some(data_product_type.into());
        self
    }

    /// Restricts the observation intent (e.g. `SCIENCE`, `CALIBRATION`).
    pub fn with_intent(mut self, intent: impl Into<String>) -> Self {
        self.intent = Some(intent.into());
        self
    }

    /// Restricts the collections; observations from any of them match.
    pub fn with_collections<I, S>(mut self, collections: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.obs_collection = Some(collections.into_iter().map(Into::into).collect());
        self
    }

    /// Restricts the instruments; observations from any of them match.
    pub fn with_instruments<I, S>(mut self, instruments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instrument_name = Some(instruments.into_iter().map(Into::into).collect());
        self
    }

    /// Restricts the filters; observations using any of them match.
    pub fn with_filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filters = Some(filters.into_iter().map(Into::into).collect());
        self
    }

    /// Reads criteria from a JSON object.
    ///
    /// Recognised keys are `calibration_level`, `data_product_type`, `intent`,
    /// `obs_collection`, `instrument_name` and `filters`; `null` values are ignored.
    pub fn from_json(value: &Value) -> EHSTResult<Self> {
        let field = |name: &str| value.get(name).filter(|v| !v.is_null());
        Ok(Self {
            calibration_level: field("calibration_level")
                .map(CalibrationLevelSelector::try_from)
                .transpose()?,
            data_product_type: string_from_json(value, "data_product_type")?,
            intent: string_from_json(value, "intent")?,
            obs_collection: field("obs_collection")
                .map(|v| string_list_from_json("obs_collection", v))
                .transpose()?,
            instrument_name: field("instrument_name")
                .map(|v| string_list_from_json("instrument_name", v))
                .transpose()?,
            filters: field("filters")
                .map(|v| string_list_from_json("filters", v))
                .transpose()?,
        })
    }

    /// True when no criterion is set.
    pub fn is_empty(&self) -> bool {
        self.calibration_level.is_none()
            && self.data_product_type.is_none()
            && self.intent.is_none()
            && self.obs_collection.is_none()
            && self.instrument_name.is_none()
            && self.filters.is_none()
    }

    /// Validates the criteria and returns one predicate per present field, in clause order.
    pub fn predicates(&self) -> EHSTResult<Vec<Expr>> {
        let mut predicates = Vec::with_capacity(PREDICATE_BUILDERS.len());
        for builder in PREDICATE_BUILDERS {
            if let Some(predicate) = builder(self)? {
                predicates.push(predicate);
            }
        }
        Ok(predicates)
    }
}

fn string_from_json(value: &Value, field: &'static str) -> EHSTResult<Option<String>> {
    match value.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(EHSTError::InvalidCriterion { field }),
    }
}

fn calibration_level_predicate(criteria: &CriteriaQuery) -> EHSTResult<Option<Expr>> {
    criteria
        .calibration_level
        .as_ref()
        .map(|selector| {
            let level = selector.normalize()?;
            Ok(Column::CalibrationLevel.like(level.as_str()))
        })
        .transpose()
}

fn data_product_type_predicate(criteria: &CriteriaQuery) -> EHSTResult<Option<Expr>> {
    Ok(criteria
        .data_product_type
        .as_deref()
        .map(|value| Column::DataProductType.like(value)))
}

fn intent_predicate(criteria: &CriteriaQuery) -> EHSTResult<Option<Expr>> {
    Ok(criteria
        .intent
        .as_deref()
        .map(|value| Column::Intent.like(value)))
}

fn list_predicate(
    field: &'static str,
    column: Column,
    values: Option<&Vec<String>>,
) -> EHSTResult<Option<Expr>> {
    let Some(values) = values else {
        return Ok(None);
    };
    validate_string_list(field, values)?;
    Ok(Some(column.like_any(values.iter().cloned())))
}

fn collection_predicate(criteria: &CriteriaQuery) -> EHSTResult<Option<Expr>> {
    list_predicate(
        "obs_collection",
        Column::Collection,
        criteria.obs_collection.as_ref(),
    )
}

fn instrument_predicate(criteria: &CriteriaQuery) -> EHSTResult<Option<Expr>> {
    list_predicate(
        "instrument_name",
        Column::InstrumentName,
        criteria.instrument_name.as_ref(),
    )
}

fn filters_predicate(criteria: &CriteriaQuery) -> EHSTResult<Option<Expr>> {
    list_predicate(
        "filters",
        Column::InstrumentConfiguration,
        criteria.filters.as_ref(),
    )
}

/// Builds the ADQL query selecting observations that match `criteria`.
///
/// Without any criterion the query is a plain `LEFT JOIN` of observations and planes with no
/// `WHERE` clause.
pub fn build_criteria_query(criteria: &CriteriaQuery) -> EHSTResult<String> {
    let predicates = criteria.predicates()?;
    if predicates.is_empty() {
        return Ok(BARE_SELECT.to_string());
    }
    Ok(criteria_select(predicates))
}

/// Builds a criteria query restricted to a circle on the sky.
pub fn build_cone_search_query(
    criteria: &CriteriaQuery,
    center: &SkyCoord,
    radius: &AngularDistance,
) -> EHSTResult<String> {
    Ok(cone_search_query(criteria.predicates()?, center, radius))
}

/// Appends the containment predicate to already validated criteria predicates.
pub fn cone_search_query(
    mut predicates: Vec<Expr>,
    center: &SkyCoord,
    radius: &AngularDistance,
) -> String {
    predicates.push(cond::within_circle(center, radius.to_degrees()));
    criteria_select(predicates)
}

fn criteria_select(predicates: Vec<Expr>) -> String {
    format!("{CRITERIA_SELECT} where{}", cond::all(predicates).to_adql())
}

/// Builds the detailed observation cone search sent to the metadata service.
pub fn metadata_cone_query(center: &SkyCoord, radius: &AngularDistance) -> String {
    format!(
        "{METADATA_CONE_SELECT}1=CONTAINS(POINT('ICRS', pos.ra, pos.dec), CIRCLE('ICRS', {}, {}, {}))",
        center.ra(),
        center.dec(),
        radius.to_degrees()
    )
}

/// Criteria combined with a sky position and a search radius.
#[derive(Debug, Clone, PartialEq)]
pub struct ConeSearchCriteria {
    target: Option<String>,
    coordinates: Option<CoordinateInput>,
    radius: AngularDistance,
    criteria: CriteriaQuery,
}

/// Where the center of a cone search comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum PositionSource<'a> {
    /// A target name still to be resolved.
    Target(&'a str),
    /// Explicit coordinates.
    Coordinates(SkyCoord),
}

impl ConeSearchCriteria {
    /// Creates a cone search of the given radius with no position and no criteria.
    pub fn new(radius: AngularDistance) -> Self {
        Self {
            target: None,
            coordinates: None,
            radius,
            criteria: CriteriaQuery::default(),
        }
    }

    /// Centers the search on a named target.
    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Centers the search on explicit coordinates.
    pub fn with_coordinates(mut self, coordinates: impl Into<CoordinateInput>) -> Self {
        self.coordinates = Some(coordinates.into());
        self
    }

    /// Adds observation criteria.
    pub fn with_criteria(mut self, criteria: CriteriaQuery) -> Self {
        self.criteria = criteria;
        self
    }

    /// Search radius.
    pub fn radius(&self) -> &AngularDistance {
        &self.radius
    }

    /// Observation criteria.
    pub fn criteria(&self) -> &CriteriaQuery {
        &self.criteria
    }

    /// Reads a cone search from a JSON object.
    ///
    /// `target` must be a string and `coordinates` a string or an `{"ra", "dec"}` object.
    /// `radius` may be a number of arcminutes or a string such as `"0.5 deg"`; without it
    /// `default_radius` is used. The remaining keys are read by [`CriteriaQuery::from_json`].
    /// Whether a position is present is only checked when the query is built.
    pub fn from_json(value: &Value, default_radius: AngularDistance) -> EHSTResult<Self> {
        let radius = match value.get("radius") {
            None | Some(Value::Null) => default_radius,
            Some(Value::String(text)) => text.parse()?,
            Some(Value::Number(number)) => number
                .as_f64()
                .map(AngularDistance::arcminutes)
                .transpose()?
                .ok_or(EHSTError::InvalidCriterion { field: "radius" })?,
            Some(_) => return Err(EHSTError::InvalidCriterion { field: "radius" }),
        };
        let coordinates = match value.get("coordinates") {
            None | Some(Value::Null) => None,
            Some(coordinates) => Some(CoordinateInput::try_from(coordinates)?),
        };
        Ok(Self {
            target: string_from_json(value, "target")?,
            coordinates,
            radius,
            criteria: CriteriaQuery::from_json(value)?,
        })
    }

    /// Checks that exactly one of target and coordinates is set and parses the coordinates.
    pub fn position(&self) -> EHSTResult<PositionSource<'_>> {
        match (&self.target, &self.coordinates) {
            (Some(_), Some(_)) => Err(EHSTError::TargetAndCoordinates),
            (None, None) => Err(EHSTError::MissingPosition),
            (Some(target), None) => Ok(PositionSource::Target(target)),
            (None, Some(coordinates)) => Ok(PositionSource::Coordinates(coordinates.resolve()?)),
        }
    }
}
