// 🌐 Webhook server - Axum router
// POST /twilio always answers 200 with TwiML; errors travel in the message text

use crate::command::SummaryScope;
use crate::error::{LedgerError, StoreError};
use crate::ledger::{Ledger, Outcome, SummaryReport};
use crate::record::ExpenseRecord;
use crate::reply::{render, twiml};
use axum::{
    extract::{rejection::FormRejection, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, post},
    Form, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<Ledger>,
}

impl AppState {
    pub fn new(ledger: Ledger) -> Self {
        AppState {
            ledger: Arc::new(ledger),
        }
    }
}

/// Inbound webhook form
#[derive(Debug, Deserialize)]
pub struct InboundMessage {
    #[serde(rename = "Body", default)]
    pub body: String,

    #[serde(rename = "From", default)]
    pub from: String,
}

/// API Response wrapper
#[derive(Serialize)]
struct ApiResponse<T> {
    success: bool,
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SummaryQuery {
    person: Option<String>,
}

/// Run blocking ledger work off the async executor
async fn run_blocking<T, F>(state: &AppState, work: F) -> Result<T, LedgerError>
where
    T: Send + 'static,
    F: FnOnce(&Ledger) -> Result<T, LedgerError> + Send + 'static,
{
    let ledger = state.ledger.clone();
    match tokio::task::spawn_blocking(move || work(&ledger)).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "ledger task panicked");
            Err(StoreError::Task(e.to_string()).into())
        }
    }
}

// ============================================================================
// Webhook
// ============================================================================

/// POST /twilio - Inbound WhatsApp message
async fn twilio_webhook(
    State(state): State<AppState>,
    form: Result<Form<InboundMessage>, FormRejection>,
) -> impl IntoResponse {
    let message = match form {
        Ok(Form(message)) => message,
        Err(rejection) => {
            warn!(%rejection, "malformed webhook form");
            InboundMessage {
                body: String::new(),
                from: String::new(),
            }
        }
    };

    let result: Result<Outcome, LedgerError> = run_blocking(&state, move |ledger| {
        ledger.handle_message(&message.body, &message.from)
    })
    .await;

    if let Err(e) = &result {
        if !e.is_user_error() {
            error!(error = %e, "request failed");
        }
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/xml")],
        twiml(&render(&result)),
    )
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/expenses - All well-formed stored expenses
async fn get_expenses(State(state): State<AppState>) -> impl IntoResponse {
    match run_blocking(&state, |ledger| ledger.expenses()).await {
        Ok(expenses) => (StatusCode::OK, Json(ApiResponse::ok(expenses))).into_response(),
        Err(e) => {
            error!(error = %e, "listing expenses failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Vec<ExpenseRecord>>::err(e.to_string())),
            )
                .into_response()
        }
    }
}

/// GET /api/summary?person= - Today and month totals
async fn get_summary(
    State(state): State<AppState>,
    Query(query): Query<SummaryQuery>,
) -> impl IntoResponse {
    let person = query.person.filter(|p| !p.trim().is_empty());

    match run_blocking(&state, move |ledger| ledger.summarize(SummaryScope::Full, person)).await {
        Ok(report) => (StatusCode::OK, Json(ApiResponse::ok(report))).into_response(),
        Err(e) => {
            error!(error = %e, "summary failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<SummaryReport>::err(e.to_string())),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Router
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/expenses", get(get_expenses))
        .route("/summary", get(get_summary))
        .with_state(state.clone());

    Router::new()
        .route("/twilio", post(twilio_webhook))
        .with_state(state)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AliasTable;
    use crate::record::{header_row, COL_AMOUNT, COL_CATEGORY, COL_DESCRIPTION, COL_WHO};
    use crate::reply::FAILURE_MARK;
    use crate::store::{MemoryRowStore, RowStore};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use chrono::{Duration, Local};
    use std::collections::HashMap;
    use tower::ServiceExt;

    fn app(store: Arc<MemoryRowStore>) -> Router {
        let mut aliases = HashMap::new();
        aliases.insert("whatsapp:+123".to_string(), "Facu".to_string());
        router(AppState::new(Ledger::new(store, AliasTable::new(aliases))))
    }

    fn webhook(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/twilio")
            .header("content-type", "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_text(response: axum::response::Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    fn stored_row(ts: chrono::NaiveDateTime, amount: i64, who: &str) -> Vec<String> {
        ExpenseRecord::new(ts, amount, "comida", "", who).to_row()
    }

    #[tokio::test]
    async fn test_record_expense_end_to_end() {
        let store = Arc::new(MemoryRowStore::new());
        let response = app(store.clone())
            .oneshot(webhook("Body=gasto+5000+comida+almuerzo&From=whatsapp%3A%2B123"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "application/xml"
        );

        let text = body_text(response).await;
        assert!(text.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(text.contains("✅"));
        assert!(text.contains("5000"));
        assert!(text.contains("comida"));

        let rows = store.read_all_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][COL_AMOUNT], "5000");
        assert_eq!(rows[1][COL_CATEGORY], "comida");
        assert_eq!(rows[1][COL_DESCRIPTION], "almuerzo");
        assert_eq!(rows[1][COL_WHO], "Facu");
    }

    #[tokio::test]
    async fn test_hoy_counts_only_today() {
        let now = Local::now().naive_local();
        let yesterday = now - Duration::days(1);
        let store = Arc::new(MemoryRowStore::with_rows(vec![
            header_row(),
            stored_row(now, 1000, "Facu"),
            stored_row(now, 2000, "Ana"),
            stored_row(yesterday, 40000, "Facu"),
        ]));

        let response = app(store)
            .oneshot(webhook("Body=hoy&From=whatsapp%3A%2B123"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let text = body_text(response).await;
        assert!(text.contains("Hoy: $3.000"), "got: {}", text);
        assert!(!text.contains("Mes"));
    }

    #[tokio::test]
    async fn test_invalid_amount_replies_usage_and_appends_nothing() {
        let store = Arc::new(MemoryRowStore::new());
        let response = app(store.clone())
            .oneshot(webhook("Body=gasto+abc+comida&From=whatsapp%3A%2B123"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let text = body_text(response).await;
        assert!(text.contains(FAILURE_MARK));
        assert!(text.contains("Monto inválido"));
        assert!(text.contains("Ej: gasto 10000 supermercado"));
        assert!(text.contains("&lt;monto&gt;"), "usage hint is XML-escaped");
        assert!(store.read_all_rows().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_form_still_answers_200() {
        let store = Arc::new(MemoryRowStore::new());
        let request = Request::builder()
            .method("POST")
            .uri("/twilio")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();

        let response = app(store).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_text(response).await.contains(FAILURE_MARK));
    }

    #[tokio::test]
    async fn test_api_summary_person_filter() {
        let now = Local::now().naive_local();
        let store = Arc::new(MemoryRowStore::with_rows(vec![
            header_row(),
            stored_row(now, 1000, "Facu"),
            stored_row(now, 2000, "Ana"),
        ]));

        let request = Request::builder()
            .uri("/api/summary?person=facu")
            .body(Body::empty())
            .unwrap();
        let response = app(store).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["totals"]["day"], 1000);
        assert_eq!(json["data"]["totals"]["month"], 1000);
    }

    #[tokio::test]
    async fn test_api_expenses_lists_records() {
        let now = Local::now().naive_local();
        let store = Arc::new(MemoryRowStore::with_rows(vec![
            header_row(),
            stored_row(now, 750, "Facu"),
        ]));

        let request = Request::builder()
            .uri("/api/expenses")
            .body(Body::empty())
            .unwrap();
        let response = app(store).oneshot(request).await.unwrap();

        let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(json["data"][0]["amount"], 750);
        assert_eq!(json["data"][0]["who"], "Facu");
    }
}
