// REST API with Axum - thin adapter over the validator
//
// Validation failures are normal answers (HTTP 200, valid: false); only
// malformed requests get a 4xx: bad JSON from axum's extractors, an
// out-of-range reference year from here.

use crate::batch::BatchSummary;
use crate::config::check_reference_year;
use crate::validator::Validator;
use crate::verdict::Verdict;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared application state
#[derive(Clone, Debug, Default)]
pub struct AppState {
    /// Reference year pinned by configuration; requests may override it
    pub reference_year: Option<i32>,
}

impl AppState {
    fn validator(&self, requested: Option<i32>) -> Result<Validator, ApiError> {
        let requested = requested
            .map(check_reference_year)
            .transpose()
            .map_err(|e| bad_request(e.to_string()))?;
        Ok(Validator::from_optional(requested.or(self.reference_year)))
    }
}

type ApiError = (StatusCode, Json<ApiResponse<()>>);

fn bad_request(message: String) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ApiResponse {
            success: false,
            data: (),
            error: Some(message),
        }),
    )
}

/// API Response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            error: None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReferenceYearQuery {
    reference_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    id_number: String,
    reference_year: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    id_numbers: Vec<String>,
    reference_year: Option<i32>,
}

#[derive(Serialize)]
struct BatchItem {
    id_number: String,
    verdict: Verdict,
}

#[derive(Serialize)]
struct BatchResponse {
    results: Vec<BatchItem>,
    summary: BatchSummary,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/validate/:id_number - Validate one number from the path
async fn validate_path(
    State(state): State<AppState>,
    Path(id_number): Path<String>,
    Query(query): Query<ReferenceYearQuery>,
) -> Result<Json<ApiResponse<Verdict>>, ApiError> {
    let verdict = state.validator(query.reference_year)?.validate(id_number.trim());
    Ok(Json(ApiResponse::ok(verdict)))
}

/// POST /api/validate - Validate one number from a JSON body
async fn validate_body(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<ApiResponse<Verdict>>, ApiError> {
    let verdict = state
        .validator(request.reference_year)?
        .validate(request.id_number.trim());
    Ok(Json(ApiResponse::ok(verdict)))
}

/// POST /api/validate/batch - Validate a list of numbers
async fn validate_batch(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let validator = state.validator(request.reference_year)?;

    let results: Vec<BatchItem> = request
        .id_numbers
        .into_iter()
        .map(|id_number| {
            let verdict = validator.validate(id_number.trim());
            BatchItem { id_number, verdict }
        })
        .collect();

    let summary = BatchSummary::from_verdicts(results.iter().map(|item| &item.verdict));
    tracing::info!("{}", summary.summary());

    Ok(Json(ApiResponse::ok(BatchResponse { results, summary })))
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/validate", post(validate_body))
        .route("/validate/batch", post(validate_batch))
        .route("/validate/:id_number", get(validate_path))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        router(AppState {
            reference_year: Some(2026),
        })
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, json) = send(get_request("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"], "OK");
    }

    #[tokio::test]
    async fn test_validate_path_valid() {
        let (status, json) = send(get_request("/api/validate/8001015009087")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["valid"], true);
        assert_eq!(json["data"]["gender"], "M");
        assert_eq!(json["data"]["dateOfBirth"], "1980-01-01");
    }

    #[tokio::test]
    async fn test_validate_path_rejection_is_200() {
        let (status, json) = send(get_request("/api/validate/8002305009087")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["valid"], false);
        assert_eq!(json["data"]["reason"], "INVALID_DATE");
    }

    #[tokio::test]
    async fn test_query_reference_year_overrides_state() {
        let (_, json) =
            send(get_request("/api/validate/2601010000084?reference_year=2025")).await;
        assert_eq!(json["data"]["dateOfBirth"], "1926-01-01");

        let (_, json) = send(get_request("/api/validate/2601010000084")).await;
        assert_eq!(json["data"]["dateOfBirth"], "2026-01-01");
    }

    #[tokio::test]
    async fn test_validate_body() {
        let (status, json) = send(post_json(
            "/api/validate",
            serde_json::json!({ "id_number": " 9202204720083 " }),
        ))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["valid"], true);
        assert_eq!(json["data"]["gender"], "F");
    }

    #[tokio::test]
    async fn test_validate_batch() {
        let (status, json) = send(post_json(
            "/api/validate/batch",
            serde_json::json!({
                "id_numbers": ["8001015009087", "800101500908", "8001015009088"]
            }),
        ))
        .await;

        assert_eq!(status, StatusCode::OK);
        let results = json["data"]["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[1]["verdict"]["reason"], "NOT_THIRTEEN_DIGITS");
        assert_eq!(results[2]["verdict"]["reason"], "INVALID_CHECKSUM");
        assert_eq!(json["data"]["summary"]["total"], 3);
        assert_eq!(json["data"]["summary"]["valid"], 1);
    }

    #[tokio::test]
    async fn test_out_of_range_reference_year_is_rejected() {
        let (status, json) =
            send(get_request("/api/validate/9912319999089?reference_year=-1")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["success"], false);
        assert!(json["error"].as_str().unwrap().contains("-1"));

        let (status, _) = send(post_json(
            "/api/validate",
            serde_json::json!({ "id_number": "9912319999089", "reference_year": 10000 }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(post_json(
            "/api/validate/batch",
            serde_json::json!({ "id_numbers": ["9912319999089"], "reference_year": -5 }),
        ))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_body_is_client_error() {
        let (status, _) = send(post_json("/api/validate", serde_json::json!({ "id": 1 }))).await;
        assert!(status.is_client_error());
    }
}
