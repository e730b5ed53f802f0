//! Request and response bodies of the REST surface.
//!
//! Field names are the public JSON contract and must not change.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body of `POST /extract`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct ExtractReq {
    /// Free text in any language.
    #[serde(default)]
    pub text: Option<String>,
}

/// Result of `POST /extract`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExtractRes {
    pub symptoms: Vec<String>,
}

/// Result of `POST /predict_severity`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SeverityRes {
    /// One of `Normal`, `Medium`, `High`.
    #[schema(example = "Medium")]
    pub severity: String,
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_req_tolerates_missing_text() {
        let req: ExtractReq = serde_json::from_str("{}").expect("parse");
        assert!(req.text.is_none());

        let req: ExtractReq = serde_json::from_str(r#"{"text":"sir dard"}"#).expect("parse");
        assert_eq!(req.text.as_deref(), Some("sir dard"));
    }

    #[test]
    fn responses_use_contract_field_names() {
        let body = serde_json::to_string(&ExtractRes {
            symptoms: vec!["fever".into()],
        })
        .expect("serialise");
        assert_eq!(body, r#"{"symptoms":["fever"]}"#);

        let body = serde_json::to_string(&ErrorRes {
            error: "No text provided".into(),
        })
        .expect("serialise");
        assert_eq!(body, r#"{"error":"No text provided"}"#);
    }
}
