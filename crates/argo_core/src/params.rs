use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::geometry::parse_coordinate;

/// Dataset family requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Core,
    Bio,
}

impl Category {
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Core => "core",
            Category::Bio => "bio",
        }
    }

    /// Variables shown for this category. Display only; the service decides
    /// what is actually returned.
    pub fn variables(self) -> &'static [&'static str] {
        match self {
            Category::Core => CORE_VARIABLES,
            Category::Bio => BIO_VARIABLES,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "core" => Ok(Category::Core),
            "bio" | "bgc" => Ok(Category::Bio),
            other => Err(format!("unknown category '{other}' (expected core or bio)")),
        }
    }
}

pub const ALL_PARAMETERS: &str = "All available parameters";

const CORE_VARIABLES: &[&str] = &[
    "PRES",
    "TEMP",
    "PSAL",
    "PRES_QC",
    "TEMP_QC",
    "PSAL_QC",
    ALL_PARAMETERS,
];

const BIO_VARIABLES: &[&str] = &[
    "PRES",
    "CHLA",
    "DOXY",
    "NITRATE",
    "PH_IN_SITU_TOTAL",
    "BBP700",
    "DOWN_IRRADIANCE412",
    "PRES_QC",
    "CHLA_QC",
    "DOXY_QC",
    "NITRATE_QC",
    "PH_IN_SITU_TOTAL_QC",
    "BBP700_QC",
    "DOWN_IRRADIANCE412_QC",
    ALL_PARAMETERS,
];

/// A query parameter editable from the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamField {
    StartDate,
    EndDate,
    MinDepth,
    MaxDepth,
}

impl FromStr for ParamField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_'], "").as_str() {
            "start" | "startdate" => Ok(ParamField::StartDate),
            "end" | "enddate" => Ok(ParamField::EndDate),
            "mindepth" => Ok(ParamField::MinDepth),
            "maxdepth" => Ok(ParamField::MaxDepth),
            other => Err(format!("unknown parameter '{other}'")),
        }
    }
}

/// Query parameters as sent to the service.
///
/// Dates are ISO 8601 strings passed through untouched; ordering of the date
/// and depth ranges is the service's concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParameters {
    pub start_date: String,
    pub end_date: String,
    pub min_depth: Option<f64>,
    pub max_depth: Option<f64>,
    #[serde(rename = "type")]
    pub category: Category,
}

impl Default for QueryParameters {
    fn default() -> Self {
        Self {
            start_date: "2023-01-01".to_string(),
            end_date: "2023-12-31".to_string(),
            min_depth: Some(0.0),
            max_depth: Some(2000.0),
            category: Category::Core,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParameterSelector {
    params: QueryParameters,
}

impl ParameterSelector {
    pub fn new(params: QueryParameters) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &QueryParameters {
        &self.params
    }

    /// Merges one field. Depths that do not parse become unset.
    pub fn set_field(&mut self, field: ParamField, raw: &str) {
        match field {
            ParamField::StartDate => self.params.start_date = raw.trim().to_string(),
            ParamField::EndDate => self.params.end_date = raw.trim().to_string(),
            ParamField::MinDepth => self.params.min_depth = parse_coordinate(raw),
            ParamField::MaxDepth => self.params.max_depth = parse_coordinate(raw),
        }
    }

    pub fn set_category(&mut self, category: Category) {
        self.params.category = category;
    }

    pub fn visible_variables(&self) -> &'static [&'static str] {
        self.params.category.variables()
    }
}
