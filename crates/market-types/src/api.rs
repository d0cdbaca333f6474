use serde::{Deserialize, Serialize};

use crate::models::Section;

// -- Catalog --

#[derive(Debug, Default, Deserialize)]
pub struct ChannelQuery {
    pub id: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
}

/// A catalog entry as the Mini App renders it.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelResponse {
    pub id: String,
    pub name: String,
    pub category: String,
    pub icon: String,
    pub url: String,
    pub description: String,
    pub short_description: Option<String>,
    /// Card blurb, already cut to two lines.
    pub preview: String,
    pub rating: f64,
    pub is_verified: bool,
    pub screenshots: Vec<String>,
}

// -- Reviews --

#[derive(Debug, Default, Deserialize)]
pub struct ReviewQuery {
    pub idminiapp: Option<String>,
}

/// Body of `POST /api/reviews`.
///
/// Every field is optional so that a missing field gets its own 400 message
/// instead of a generic body rejection. `rating` stays a raw JSON value for
/// the same reason.
#[derive(Debug, Default, Deserialize)]
pub struct CreateReviewRequest {
    pub idminiapp: Option<String>,
    pub rating: Option<serde_json::Value>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: i64,
    pub idminiapp: String,
    pub username: String,
    pub rating: i64,
    pub text: String,
    pub created_at: String,
}

// -- Sections --

#[derive(Debug, Clone, Serialize)]
pub struct SectionWithApps {
    pub section: Section,
    pub apps: Vec<ChannelResponse>,
}

// -- Static assets --

#[derive(Debug, Default, Deserialize)]
pub struct StaticQuery {
    pub file: Option<String>,
}

// -- Errors --

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn responses_use_camel_case_keys() {
        let review = ReviewResponse {
            id: 7,
            idminiapp: "1".into(),
            username: "Anon".into(),
            rating: 5,
            text: "great".into(),
            created_at: "2026-01-01T00:00:00.000Z".into(),
        };
        assert_eq!(
            serde_json::to_value(&review).unwrap(),
            json!({
                "id": 7,
                "idminiapp": "1",
                "username": "Anon",
                "rating": 5,
                "text": "great",
                "createdAt": "2026-01-01T00:00:00.000Z",
            })
        );

        let err = ErrorResponse { error: "nope".into() };
        assert_eq!(serde_json::to_value(&err).unwrap(), json!({ "error": "nope" }));
    }

    #[test]
    fn review_body_fields_are_optional() {
        let req: CreateReviewRequest = serde_json::from_str(r#"{"rating": 4}"#).unwrap();
        assert_eq!(req.idminiapp, None);
        assert_eq!(req.rating, Some(json!(4)));
        assert_eq!(req.text, None);
    }
}
