//! ARM response shapes for `Microsoft.Advisor/recommendations`
use std::collections::HashMap;

use advisor_core::Recommendation;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendationPage {
    pub value: Vec<RecommendationResource>,
    #[serde(default, rename = "nextLink")]
    pub next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RecommendationResource {
    pub properties: RecommendationProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RecommendationProperties {
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub impact: String,
    #[serde(default)]
    pub impacted_field: String,
    #[serde(default)]
    pub impacted_value: String,
    #[serde(default)]
    pub last_updated: String,
    #[serde(default)]
    pub short_description: ShortDescription,
    #[serde(default)]
    pub extended_properties: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ShortDescription {
    #[serde(default)]
    pub problem: String,
    #[serde(default)]
    pub solution: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArmErrorBody {
    pub error: ArmErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ArmErrorDetail {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl From<RecommendationResource> for Recommendation {
    fn from(resource: RecommendationResource) -> Self {
        let p = resource.properties;
        let message = match p.extended_properties.get("recommendationMessage") {
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        };

        Recommendation {
            affected_resource: p.impacted_value,
            resource_type: p.impacted_field,
            problem: p.short_description.problem,
            solution: p.short_description.solution,
            impact: p.impact,
            category: p.category,
            last_updated: p.last_updated,
            message,
        }
    }
}
