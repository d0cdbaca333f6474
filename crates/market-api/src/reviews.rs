use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use market_db::models::{NewReview, ReviewRow};
use market_types::api::{CreateReviewRequest, ReviewQuery, ReviewResponse};
use market_types::models::DEFAULT_REVIEW_USERNAME;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::state::{AppState, with_db};

const MSG_MISSING_APP: &str = "Не указан idminiapp";
const MSG_BAD_RATING: &str = "Неверная оценка (должна быть от 1 до 5)";
const MSG_EMPTY_TEXT: &str = "Текст отзыва не может быть пустым";
const MSG_BAD_BODY: &str = "Некорректное тело запроса";
const MSG_UNKNOWN_APP: &str = "Приложение не найдено";

/// GET /api/reviews?idminiapp=…: reviews of one app, newest first.
pub async fn get_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let idminiapp = query
        .idminiapp
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request(MSG_MISSING_APP))?;

    let rows = with_db(&state, move |db| db.list_reviews(&idminiapp)).await?;
    let reviews: Vec<ReviewResponse> = rows.into_iter().map(to_response).collect();

    Ok(Json(reviews))
}

/// POST /api/reviews: validates, appends the review and refreshes the
/// app's cached rating.
pub async fn create_review(
    State(state): State<AppState>,
    payload: Result<Json<CreateReviewRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload.map_err(|e| {
        warn!("Rejected review body: {}", e);
        ApiError::bad_request(MSG_BAD_BODY)
    })?;
    let review = validate(req)?;

    let id = review.idminiapp.clone();
    let lookup = with_db(&state, move |db| Ok(db.channel_exists(&id))).await?;
    check_membership(&review.idminiapp, lookup)?;

    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let row = {
        let review = review.clone();
        let created_at = created_at.clone();
        with_db(&state, move |db| {
            db.insert_review(&NewReview {
                idminiapp: &review.idminiapp,
                username: DEFAULT_REVIEW_USERNAME,
                rating: review.rating,
                text: &review.text,
                created_at: &created_at,
            })
        })
        .await?
    };

    info!("Review {} added for app {} ({}★)", row, review.idminiapp, review.rating);

    Ok((
        StatusCode::CREATED,
        Json(ReviewResponse {
            id: row,
            idminiapp: review.idminiapp,
            username: DEFAULT_REVIEW_USERNAME.to_string(),
            rating: review.rating,
            text: review.text,
            created_at,
        }),
    ))
}

/// Best effort: if the catalog cannot be queried the insert goes ahead and
/// the foreign key has the last word.
fn check_membership(idminiapp: &str, lookup: anyhow::Result<bool>) -> Result<(), ApiError> {
    match lookup {
        Ok(true) => Ok(()),
        Ok(false) => Err(ApiError::not_found(MSG_UNKNOWN_APP)),
        Err(e) => {
            warn!("Catalog check skipped for {}: {:#}", idminiapp, e);
            Ok(())
        }
    }
}

#[derive(Debug, Clone)]
struct ValidReview {
    idminiapp: String,
    rating: i64,
    /// Trimmed.
    text: String,
}

fn validate(req: CreateReviewRequest) -> Result<ValidReview, ApiError> {
    let idminiapp = req
        .idminiapp
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::bad_request(MSG_MISSING_APP))?;

    let rating = req
        .rating
        .as_ref()
        .and_then(parse_rating)
        .ok_or_else(|| ApiError::bad_request(MSG_BAD_RATING))?;

    let text = req
        .text
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| ApiError::bad_request(MSG_EMPTY_TEXT))?
        .to_string();

    Ok(ValidReview {
        idminiapp,
        rating,
        text,
    })
}

/// Accepts a JSON integer 1..=5; `4.0` counts as an integer, `4.5` does not.
fn parse_rating(value: &serde_json::Value) -> Option<i64> {
    let rating = match value.as_i64() {
        Some(n) => n,
        None => {
            let f = value.as_f64()?;
            if f.fract() != 0.0 {
                return None;
            }
            f as i64
        }
    };
    (1..=5).contains(&rating).then_some(rating)
}

fn to_response(row: ReviewRow) -> ReviewResponse {
    ReviewResponse {
        created_at: normalize_timestamp(&row.created_at),
        id: row.id,
        idminiapp: row.idminiapp,
        username: row.username,
        rating: row.rating,
        text: row.text,
    }
}

/// Rows written by older tooling carry SQLite's `YYYY-MM-DD HH:MM:SS`;
/// everything leaves the API as RFC 3339.
fn normalize_timestamp(raw: &str) -> String {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc()))
        .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|e| {
            warn!("Corrupt review timestamp '{}': {}", raw, e);
            raw.to_string()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{app, get_json, post_json};

    #[test]
    fn rating_must_be_whole_and_in_range() {
        use serde_json::json;
        assert_eq!(parse_rating(&json!(1)), Some(1));
        assert_eq!(parse_rating(&json!(5.0)), Some(5));
        assert_eq!(parse_rating(&json!(0)), None);
        assert_eq!(parse_rating(&json!(6)), None);
        assert_eq!(parse_rating(&json!(4.5)), None);
        assert_eq!(parse_rating(&json!(-3)), None);
        assert_eq!(parse_rating(&json!("5")), None);
        assert_eq!(parse_rating(&json!(null)), None);
    }

    #[test]
    fn normalizes_sqlite_timestamps() {
        assert_eq!(normalize_timestamp("2025-03-01 12:30:00"), "2025-03-01T12:30:00.000Z");
        assert_eq!(
            normalize_timestamp("2025-03-01T12:30:00.250+00:00"),
            "2025-03-01T12:30:00.250Z"
        );
        assert_eq!(normalize_timestamp("yesterday"), "yesterday");
    }

    #[test]
    fn membership_check_degrades_when_catalog_unreachable() {
        assert!(check_membership("1", Ok(true)).is_ok());
        assert!(matches!(
            check_membership("nope", Ok(false)),
            Err(ApiError::NotFound(msg)) if msg == MSG_UNKNOWN_APP
        ));
        assert!(check_membership("1", Err(anyhow::anyhow!("database is locked"))).is_ok());
    }

    #[test]
    fn foreign_key_decides_when_check_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let db = market_db::Database::open(&dir.path().join("market.db")).unwrap();
        db.upsert_channel(&crate::testing::channel("1", "Major", "", "Игры")).unwrap();

        assert!(check_membership("nope", Err(anyhow::anyhow!("catalog offline"))).is_ok());
        let review = |id| NewReview {
            idminiapp: id,
            username: DEFAULT_REVIEW_USERNAME,
            rating: 4,
            text: "ok",
            created_at: "2026-01-01T00:00:00.000Z",
        };
        assert!(db.insert_review(&review("nope")).is_err());
        assert!(db.insert_review(&review("1")).is_ok());
    }

    #[tokio::test]
    async fn creates_review() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let (status, body) = post_json(
            &app,
            "/api/reviews",
            r#"{"idminiapp": "1", "rating": 5, "text": "  Great app  "}"#,
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["idminiapp"], "1");
        assert_eq!(body["rating"], 5);
        assert_eq!(body["text"], "Great app");
        assert_eq!(body["username"], DEFAULT_REVIEW_USERNAME);
        assert!(body["id"].as_i64().unwrap() > 0);
        assert!(body["createdAt"].as_str().unwrap().parse::<DateTime<Utc>>().is_ok());

        let (status, list) = get_json(&app, "/api/reviews?idminiapp=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().unwrap().len(), 1);
        assert_eq!(list[0]["text"], "Great app");
    }

    #[tokio::test]
    async fn rejects_out_of_range_rating() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        for rating in ["0", "6", "-1", "4.5", "\"5\"", "null"] {
            let body = format!(r#"{{"idminiapp": "1", "rating": {rating}, "text": "ok"}}"#);
            let (status, body) = post_json(&app, "/api/reviews", &body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "rating {rating}");
            assert_eq!(body["error"], MSG_BAD_RATING);
        }
    }

    #[tokio::test]
    async fn rejects_blank_text() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        for text in [r#""""#, r#""   \n\t ""#] {
            let body = format!(r#"{{"idminiapp": "1", "rating": 3, "text": {text}}}"#);
            let (status, body) = post_json(&app, "/api/reviews", &body).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], MSG_EMPTY_TEXT);
        }

        let (status, _) =
            post_json(&app, "/api/reviews", r#"{"idminiapp": "1", "rating": 3}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn rejects_unknown_app() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let (status, body) = post_json(
            &app,
            "/api/reviews",
            r#"{"idminiapp": "nope", "rating": 4, "text": "hi"}"#,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], MSG_UNKNOWN_APP);
    }

    #[tokio::test]
    async fn rejects_missing_app_and_malformed_body() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let (status, body) =
            post_json(&app, "/api/reviews", r#"{"rating": 4, "text": "hi"}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], MSG_MISSING_APP);

        let (status, body) = post_json(&app, "/api/reviews", "not json").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], MSG_BAD_BODY);
    }

    #[tokio::test]
    async fn listing_requires_app_id() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let (status, body) = get_json(&app, "/api/reviews").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], MSG_MISSING_APP);
    }
}
