use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::warn;

/// One posting from the job search API. Read-only, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub company: Company,
    #[serde(default)]
    pub location: Location,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    #[serde(default)]
    pub contract_type: Option<String>,
    #[serde(default)]
    pub contract_time: Option<String>,
    pub created: DateTime<Utc>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default)]
    pub redirect_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub area: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub tag: String,
}

/// Envelope of a search response. Only `results` is consumed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    #[serde(default, deserialize_with = "skip_malformed")]
    pub results: Vec<JobListing>,
}

/// Decodes listings one at a time so a single bad entry does not sink the batch.
fn skip_malformed<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<JobListing>, D::Error> {
    let raw = Vec::<Value>::deserialize(d)?;
    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<JobListing>(value) {
            Ok(listing) => Some(listing),
            Err(e) => {
                warn!("Skipping malformed job listing: {e}");
                None
            }
        })
        .collect())
}
