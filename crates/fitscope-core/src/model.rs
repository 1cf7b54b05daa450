//! Fit-report data model.
//!
//! The backend's analysis object is a loosely shaped JSON record: almost
//! every field is optional and nested shapes appear and disappear between
//! backend versions. The model mirrors that with defaults everywhere and
//! safe accessors, so the view layer never null-checks. `validate` runs once
//! at the API boundary; past it, an `Analysis` is safe to render.

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// One transcript's fit analysis as returned by the backend.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Analysis {
    pub id: Option<String>,
    pub customer_name: Option<String>,
    pub industry: Option<String>,
    pub fit_score: Option<i64>,
    pub user_count: Option<UserCount>,
    pub timeline: Option<String>,
    pub current_systems: Vec<CurrentSystem>,
    pub services: Vec<String>,
    pub requirements: Option<Requirements>,
    pub strengths: Vec<Insight>,
    pub challenges: Vec<Insight>,
    pub similar_customers: Vec<SimilarCustomer>,
    pub recommendations: Option<Recommendations>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserCount {
    pub total: Option<u32>,
    pub back_office: Option<u32>,
    pub field: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct CurrentSystem {
    pub name: Option<String>,
    pub description: Option<String>,
    pub replacing: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Requirements {
    pub key_features: Vec<String>,
    pub integrations: Vec<String>,
    pub pain_points: Vec<String>,
}

/// A titled strength or challenge entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Insight {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct SimilarCustomer {
    pub name: Option<String>,
    pub description: Option<String>,
    pub match_percentage: Option<f64>,
    pub user_count: Option<u32>,
    pub industries: Vec<String>,
    pub services: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Recommendations {
    pub implementation_approach: Vec<String>,
    pub integration_strategy: Vec<String>,
    pub training_recommendations: Vec<String>,
    /// Phase label -> projection text, in stable label order.
    pub timeline_projection: BTreeMap<String, String>,
}

impl Analysis {
    /// Check the invariants the renderer relies on. Called once when a
    /// response crosses the API boundary.
    pub fn validate(&self) -> Result<()> {
        match self.customer_name.as_deref().map(str::trim) {
            None | Some("") => bail!("analysis is missing a customer name"),
            Some(_) => {}
        }
        if let Some(score) = self.fit_score {
            if !(0..=100).contains(&score) {
                bail!("fit score {} is outside 0-100", score);
            }
        }
        Ok(())
    }

    pub fn display_name(&self) -> &str {
        self.customer_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or("Unknown customer")
    }

    /// Fit score clamped into 0-100, if the backend reported one.
    pub fn fit_score(&self) -> Option<u8> {
        self.fit_score.map(|s| s.clamp(0, 100) as u8)
    }

    pub fn industry(&self) -> &str {
        self.industry.as_deref().unwrap_or("—")
    }

    pub fn has_report_body(&self) -> bool {
        !self.strengths.is_empty()
            || !self.challenges.is_empty()
            || !self.similar_customers.is_empty()
            || self.recommendations.is_some()
    }
}

impl Insight {
    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("Untitled")
    }
}

impl SimilarCustomer {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("Unnamed customer")
    }

    /// Match percentage as a whole-number label, e.g. "90%".
    pub fn match_label(&self) -> String {
        match self.match_percentage {
            Some(pct) => format!("{:.0}%", pct.clamp(0.0, 100.0)),
            None => "—".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_sparse_object() {
        let analysis: Analysis =
            serde_json::from_str(r#"{"customerName": "Acme Corp"}"#).unwrap();
        assert_eq!(analysis.display_name(), "Acme Corp");
        assert!(analysis.fit_score().is_none());
        assert!(analysis.strengths.is_empty());
        assert!(analysis.validate().is_ok());
    }

    #[test]
    fn test_validate_requires_customer_name() {
        let analysis = Analysis::default();
        assert!(analysis.validate().is_err());

        let blank: Analysis = serde_json::from_str(r#"{"customerName": "  "}"#).unwrap();
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_out_of_range_score() {
        let analysis: Analysis =
            serde_json::from_str(r#"{"customerName": "Acme", "fitScore": 140}"#).unwrap();
        assert!(analysis.validate().is_err());
    }

    #[test]
    fn test_fit_score_clamps() {
        let analysis = Analysis {
            fit_score: Some(140),
            ..Default::default()
        };
        assert_eq!(analysis.fit_score(), Some(100));
    }

    #[test]
    fn test_nested_shapes_round_trip() {
        let json = r#"{
            "customerName": "Acme Corp",
            "fitScore": 85,
            "userCount": {"total": 120, "backOffice": 20, "field": 100},
            "similarCustomers": [
                {"name": "Beta Inc", "matchPercentage": 80.0, "industries": ["Construction"]}
            ],
            "recommendations": {
                "implementationApproach": ["Start with onboarding"],
                "timelineProjection": {"Phase 1": "Weeks 1-4"}
            }
        }"#;
        let analysis: Analysis = serde_json::from_str(json).unwrap();
        assert_eq!(analysis.fit_score(), Some(85));
        assert_eq!(analysis.similar_customers[0].match_label(), "80%");
        assert_eq!(
            analysis.recommendations.as_ref().unwrap().timeline_projection["Phase 1"],
            "Weeks 1-4"
        );
    }
}
