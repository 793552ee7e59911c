//! Typed dataset rows, boundary regions and the background loader.

pub(crate) mod loader;
mod region;
mod source;

pub use loader::{run_job, Job, Loaded, Loader, MapBase, Outcome, Ticket};
pub use region::{county_regions, feature_fips, state_regions, Region};
pub use source::{Fetch, Resource, ResourceSource};

use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

use crate::metric::MetricType;

/// Errors raised while fetching or decoding a static resource.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Reading a file from the data directory failed.
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// HTTP request failed or returned an error status.
    #[error("HTTP error fetching {resource}: {source}")]
    Http {
        resource: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Payload was not valid JSON for the expected shape.
    #[error("failed to parse {resource}: {source}")]
    Parse {
        resource: &'static str,
        #[source]
        source: simd_json::Error,
    },
}

/// Rural/urban classification of a county
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum Urbanicity {
    Rural,
    Urban,
}

impl Urbanicity {
    pub fn as_str(self) -> &'static str {
        match self {
            Urbanicity::Rural => "Rural",
            Urbanicity::Urban => "Urban",
        }
    }
}

/// One county, averaged over 2010-2023.
///
/// Upstream replaces NaN/Inf with `null`, so every measure is optional.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CountyData {
    /// 5-digit FIPS code, zero-padded
    #[serde(rename = "FIPS_STR")]
    pub fips: String,
    #[serde(rename = "county_id", default)]
    pub county_id: Option<String>,
    #[serde(rename = "Pct_Less_HS", default)]
    pub pct_less_hs: Option<f64>,
    /// Fatalities per 100k population
    #[serde(rename = "Fatality_Rate", default)]
    pub fatality_rate: Option<f64>,
    #[serde(rename = "Urbanicity", default)]
    pub urbanicity: Option<Urbanicity>,
    #[serde(rename = "Population", default)]
    pub population: Option<f64>,
    #[serde(rename = "State_Abbrev", default)]
    pub state: Option<String>,
    #[serde(rename = "Drunk_Rate_Per_100k", default)]
    pub drunk_rate_per_100k: Option<f64>,
    #[serde(rename = "Dark_Pct", default)]
    pub dark_pct: Option<f64>,
    #[serde(rename = "Weather_Pct", default)]
    pub weather_pct: Option<f64>,
}

impl CountyData {
    pub fn metric_value(&self, metric: MetricType) -> Option<f64> {
        match metric {
            MetricType::FatalityRate => self.fatality_rate,
            MetricType::PctLessHs => self.pct_less_hs,
            MetricType::Population => self.population,
        }
    }
}

/// One state, averaged over 2010-2023
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct StateData {
    #[serde(rename = "State_Abbrev")]
    pub abbrev: String,
    #[serde(rename = "Fatality_Rate", default)]
    pub fatality_rate: Option<f64>,
    #[serde(rename = "Pct_Less_HS", default)]
    pub pct_less_hs: Option<f64>,
    #[serde(rename = "Population", default)]
    pub population: Option<f64>,
}

impl StateData {
    pub fn metric_value(&self, metric: MetricType) -> Option<f64> {
        match metric {
            MetricType::FatalityRate => self.fatality_rate,
            MetricType::PctLessHs => self.pct_less_hs,
            MetricType::Population => self.population,
        }
    }
}

/// Decode a JSON payload in place with simd-json
pub(crate) fn parse_json<T>(resource: Resource, mut bytes: Vec<u8>) -> Result<T, LoadError>
where
    T: serde::de::DeserializeOwned,
{
    simd_json::serde::from_slice(&mut bytes).map_err(|source| LoadError::Parse {
        resource: resource.file_name(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_county_row_with_nulls() {
        let json = br#"[{"FIPS_STR":"01001","county_id":"01001","Pct_Less_HS":12.4,
            "Fatality_Rate":null,"Urbanicity":"Rural","Population":55000.0,
            "State_Abbrev":"AL","Drunk_Rate_Per_100k":4.1,"Dark_Pct":null,"Weather_Pct":8.0}]"#;
        let rows: Vec<CountyData> = parse_json(Resource::CountyScatter, json.to_vec()).unwrap();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.fips, "01001");
        assert_eq!(row.fatality_rate, None);
        assert_eq!(row.urbanicity, Some(Urbanicity::Rural));
        assert_eq!(row.metric_value(MetricType::Population), Some(55000.0));
        assert_eq!(row.metric_value(MetricType::PctLessHs), Some(12.4));
    }

    #[test]
    fn test_county_by_state_map() {
        let json = br#"{"TX":[{"FIPS_STR":"48201","Fatality_Rate":10.5}],"AL":[]}"#;
        let map: HashMap<String, Vec<CountyData>> =
            parse_json(Resource::CountyByState, json.to_vec()).unwrap();
        assert_eq!(map["TX"][0].fatality_rate, Some(10.5));
        assert_eq!(map["TX"][0].urbanicity, None);
        assert!(map["AL"].is_empty());
    }

    #[test]
    fn test_state_rows() {
        let json = br#"[{"State_Abbrev":"TX","Fatality_Rate":14.2,"Pct_Less_HS":17.1,"Population":28000000.0}]"#;
        let rows: Vec<StateData> = parse_json(Resource::StateData, json.to_vec()).unwrap();
        assert_eq!(rows[0].abbrev, "TX");
        assert_eq!(rows[0].metric_value(MetricType::FatalityRate), Some(14.2));
    }

    #[test]
    fn test_parse_error_names_resource() {
        let err = parse_json::<Vec<StateData>>(Resource::StateData, b"{oops".to_vec()).unwrap_err();
        assert!(err.to_string().contains("state_data.json"));
    }
}
