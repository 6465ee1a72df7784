//! Travel Guide Planner: turns a trip form into an LLM-written itinerary,
//! a proportional budget estimate and a downloadable PDF.

pub mod budget;
pub mod config;
pub mod error;
pub mod llm;
pub mod models;
pub mod pdf;
pub mod planner;
pub mod prompt;
pub mod routes;

pub use budget::{estimate, BudgetBreakdown, Category};
pub use config::Config;
pub use llm::{GenerationError, ItineraryGenerator, OpenAiClient};
pub use models::{FormState, Interest, Session, TripRequest, ValidationError};
pub use planner::{submit, PlanError, PlanOutcome};
pub use prompt::build_prompt;
pub use routes::{router, AppState};
