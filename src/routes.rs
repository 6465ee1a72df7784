use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use include_dir::{include_dir, Dir};
use parking_lot::RwLock;
use serde::Serialize;
use serde_with::skip_serializing_none;
use std::sync::Arc;
use tower_http::{cors::{Any, CorsLayer}, trace::TraceLayer};

use crate::{
    budget::{format_usd, BudgetBreakdown},
    error::AppError,
    llm::ItineraryGenerator,
    models::{FormState, Interest, Session},
    pdf,
    planner,
};

static ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/static");

pub const PDF_PATH: &str = "/api/plan/pdf";

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<RwLock<Session>>,
    pub generator: Arc<dyn ItineraryGenerator>,
}

impl AppState {
    pub fn new(generator: Arc<dyn ItineraryGenerator>) -> Self {
        Self { session: Arc::default(), generator }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/interests", get(list_interests))
        .route("/api/session", get(get_session))
        .route("/api/plan", post(generate_plan))
        .route("/api/budget", post(estimate_budget))
        .route(PDF_PATH, get(export_pdf))
        .route("/api/reset", post(reset_session))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        )
        .with_state(state)
}

#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub form: FormState,
    pub itinerary: Option<String>,
    pub pdf_url: Option<&'static str>,
}

impl From<&Session> for SessionView {
    fn from(s: &Session) -> Self {
        let itinerary = s.has_itinerary().then(|| s.itinerary.clone());
        let pdf_url = itinerary.as_ref().map(|_| PDF_PATH);
        Self { form: s.form.clone(), itinerary, pdf_url }
    }
}

#[derive(Debug, Serialize)]
pub struct BudgetView {
    pub budget: BudgetBreakdown,
    pub summary: Vec<String>,
    pub total_display: String,
}

impl From<BudgetBreakdown> for BudgetView {
    fn from(budget: BudgetBreakdown) -> Self {
        let summary = budget.summary_lines();
        let total_display = format!("Total Estimated Cost: {}", format_usd(budget.total));
        Self { budget, summary, total_display }
    }
}

#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub itinerary: String,
    #[serde(flatten)]
    pub budget: BudgetView,
    pub pdf_url: &'static str,
}

pub async fn index() -> Response {
    match ASSETS.get_file("index.html").and_then(|f| f.contents_utf8()) {
        Some(html) => Html(html).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn list_interests() -> Json<Vec<&'static str>> {
    Json(Interest::ALL.iter().map(|i| i.label()).collect())
}

pub async fn get_session(State(state): State<AppState>) -> Json<SessionView> {
    Json(SessionView::from(&*state.session.read()))
}

pub async fn generate_plan(
    State(state): State<AppState>,
    Json(form): Json<FormState>,
) -> Result<Json<PlanResponse>, AppError> {
    // the form is remembered even if this submission fails
    state.session.write().form = form.clone();

    match planner::submit(&form, state.generator.as_ref()).await {
        Ok(outcome) => {
            state.session.write().itinerary = outcome.itinerary.clone();
            Ok(Json(PlanResponse {
                itinerary: outcome.itinerary,
                budget: outcome.budget.into(),
                pdf_url: PDF_PATH,
            }))
        }
        Err(e @ planner::PlanError::Generation { .. }) => {
            state.session.write().itinerary.clear();
            Err(e.into())
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn estimate_budget(Json(form): Json<FormState>) -> Result<Json<BudgetView>, AppError> {
    let budget = planner::estimate_budget(&form)?;
    Ok(Json(budget.into()))
}

pub async fn export_pdf(State(state): State<AppState>) -> Result<Response, AppError> {
    let itinerary = {
        let session = state.session.read();
        if !session.has_itinerary() {
            return Err(AppError::NoItinerary);
        }
        session.itinerary.clone()
    };

    let bytes = match pdf::render(&itinerary) {
        Ok(b) => b,
        Err(e) => {
            tracing::error!("❌ PDF generation failed: {}", e);
            return Err(e.into());
        }
    };
    tracing::info!("📄 Rendered {} ({} bytes)", pdf::FILE_NAME, bytes.len());

    let headers = [
        (header::CONTENT_TYPE, pdf::MIME_TYPE.to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", pdf::FILE_NAME)),
    ];
    Ok((headers, Bytes::from(bytes)).into_response())
}

pub async fn reset_session(State(state): State<AppState>) -> Json<SessionView> {
    let mut session = state.session.write();
    *session = Session::defaults();
    tracing::info!("🔁 Session reset to defaults");
    Json(SessionView::from(&*session))
}
