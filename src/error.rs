use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde_json::json;
use thiserror::Error;

use crate::{budget::BudgetBreakdown, llm::GenerationError, models::ValidationError, pdf::RenderError, planner::PlanError};

/// Everything a handler can fail with, mapped onto HTTP.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("generation failed: {source}")]
    Generation { source: GenerationError, budget: BudgetBreakdown },
    #[error("PDF generation failed: {0}")]
    Render(#[from] RenderError),
    #[error("no itinerary has been generated yet")]
    NoItinerary,
}

impl From<PlanError> for AppError {
    fn from(e: PlanError) -> Self {
        match e {
            PlanError::Validation(v) => AppError::Validation(v),
            PlanError::Generation { source, budget } => AppError::Generation { source, budget },
        }
    }
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Generation { .. } => "GENERATION_FAILED",
            AppError::Render(_) => "RENDER_FAILED",
            AppError::NoItinerary => "NO_ITINERARY",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Generation { .. } => StatusCode::BAD_GATEWAY,
            AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NoItinerary => StatusCode::NOT_FOUND,
        }
    }

    pub fn to_error_payload(&self) -> serde_json::Value {
        let mut body = json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
            }
        });
        if let AppError::Generation { source, budget } = self {
            body["error"]["auth"] = json!(source.is_auth());
            body["budget"] = json!(budget);
            body["budget_summary"] = json!(budget.summary_lines());
        }
        body
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self.to_error_payload())).into_response()
    }
}
