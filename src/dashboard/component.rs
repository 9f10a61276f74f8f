//! Dashboard component catalog.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// Bucketing of the sentiment distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    Year,
    Month,
}

impl Period {
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::Year => "year",
            Period::Month => "month",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "year" => Ok(Period::Year),
            "month" => Ok(Period::Month),
            other => Err(format!("Invalid period '{}': expected year or month", other)),
        }
    }
}

/// One independently cached aggregate of a product's reviews.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Summary,
    WordCloud,
    Timeline,
    Distribution(Period),
    SentimentMap,
    SentimentPie,
}

impl Component {
    /// Every component, with both distribution periods.
    pub const ALL: [Component; 7] = [
        Component::Summary,
        Component::WordCloud,
        Component::Timeline,
        Component::Distribution(Period::Year),
        Component::Distribution(Period::Month),
        Component::SentimentMap,
        Component::SentimentPie,
    ];

    /// Cache namespace. Both distribution periods share one namespace and
    /// are told apart by the `period` parameter.
    pub fn namespace(&self) -> &'static str {
        match self {
            Component::Summary => "summary",
            Component::WordCloud => "wordcloud",
            Component::Timeline => "timeline",
            Component::Distribution(_) => "distribution",
            Component::SentimentMap => "sentiment_map",
            Component::SentimentPie => "sentiment_pie",
        }
    }

    /// Unique name, used for warming task labels and source documents.
    pub fn name(&self) -> &'static str {
        match self {
            Component::Distribution(Period::Year) => "distribution_year",
            Component::Distribution(Period::Month) => "distribution_month",
            other => other.namespace(),
        }
    }

    pub fn period(&self) -> Option<Period> {
        match self {
            Component::Distribution(period) => Some(*period),
            _ => None,
        }
    }

    /// Resolves a route segment; `period` applies to `distribution` only.
    pub fn parse(name: &str, period: Option<Period>) -> Option<Self> {
        let component = match name {
            "summary" => Component::Summary,
            "wordcloud" => Component::WordCloud,
            "timeline" => Component::Timeline,
            "distribution" => Component::Distribution(period.unwrap_or_default()),
            "distribution_year" => Component::Distribution(Period::Year),
            "distribution_month" => Component::Distribution(Period::Month),
            "sentiment_map" => Component::SentimentMap,
            "sentiment_pie" => Component::SentimentPie,
            _ => return None,
        };
        Some(component)
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Composite namespace of the full dashboard.
pub const DASHBOARD_NAMESPACE: &str = "dashboard";

/// Composite namespace of the product dashboard.
pub const PRODUCT_DASHBOARD_NAMESPACE: &str = "product_dashboard";

/// Every namespace holding entries of a product, composites first.
pub fn entity_namespaces() -> Vec<&'static str> {
    let mut namespaces = vec![DASHBOARD_NAMESPACE, PRODUCT_DASHBOARD_NAMESPACE];
    for component in Component::ALL {
        if !namespaces.contains(&component.namespace()) {
            namespaces.push(component.namespace());
        }
    }
    namespaces
}
