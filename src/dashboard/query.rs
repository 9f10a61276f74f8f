//! Dashboard filter parameters.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::cache::CacheParams;
use crate::dashboard::Period;

/// Date format accepted for `start_date` / `end_date`.
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Filters shared by every dashboard query, as received on the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DashboardQuery {
    pub parent_asin: String,
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    /// Comma separated city names
    #[serde(default)]
    pub cities: Option<String>,
}

impl DashboardQuery {
    pub fn new(parent_asin: impl Into<String>) -> Self {
        Self {
            parent_asin: parent_asin.into(),
            ..Self::default()
        }
    }

    pub fn with_dates(mut self, start_date: impl Into<String>, end_date: impl Into<String>) -> Self {
        self.start_date = Some(start_date.into());
        self.end_date = Some(end_date.into());
        self
    }

    pub fn with_cities(mut self, cities: impl Into<String>) -> Self {
        self.cities = Some(cities.into());
        self
    }

    /// Trims every field and turns blank optional filters into absent ones.
    pub fn normalized(self) -> Self {
        fn blank_to_none(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }

        Self {
            parent_asin: self.parent_asin.trim().to_string(),
            start_date: blank_to_none(self.start_date),
            end_date: blank_to_none(self.end_date),
            cities: blank_to_none(self.cities),
        }
    }

    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.parent_asin.trim().is_empty() {
            return Some("parent_asin cannot be empty".to_string());
        }
        for (name, value) in [("start_date", &self.start_date), ("end_date", &self.end_date)] {
            if let Some(date) = value {
                if NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() {
                    return Some(format!("{} must be YYYY-MM-DD, got '{}'", name, date));
                }
            }
        }
        if let (Some(start), Some(end)) = (&self.start_date, &self.end_date) {
            if start > end {
                return Some("start_date must not be after end_date".to_string());
            }
        }
        None
    }

    /// City filter split on commas, `None` when no filter applies.
    pub fn city_list(&self) -> Option<Vec<String>> {
        let cities: Vec<String> = self
            .cities
            .as_deref()?
            .split(',')
            .map(|city| city.trim().to_string())
            .filter(|city| !city.is_empty())
            .collect();
        (!cities.is_empty()).then_some(cities)
    }

    /// Key parameters of a composite or non-distribution component.
    pub fn cache_params(&self) -> CacheParams {
        CacheParams::new()
            .with("parent_asin", &self.parent_asin)
            .with_opt("start_date", self.start_date.as_ref())
            .with_opt("end_date", self.end_date.as_ref())
            .with_opt("cities", self.cities.as_ref())
    }

    /// Key parameters of a component, including its period if it has one.
    pub fn component_params(&self, period: Option<Period>) -> CacheParams {
        self.cache_params().with_opt("period", period)
    }
}
