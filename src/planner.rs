use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::budget::{estimate_for, BudgetBreakdown};
use crate::llm::{GenerationError, ItineraryGenerator};
use crate::models::{FormState, ValidationError};
use crate::prompt::prompt_for;

#[derive(Debug, Clone, Serialize)]
pub struct PlanOutcome {
    pub itinerary: String,
    pub budget: BudgetBreakdown,
}

#[derive(Debug, Error)]
pub enum PlanError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The budget does not depend on the model, so it is still reported.
    #[error("generation failed: {source}")]
    Generation { source: GenerationError, budget: BudgetBreakdown },
}

/// Runs one submission: validate, build the prompt, call the model, estimate the budget.
/// Nothing reaches the generator unless the form validates.
pub async fn submit(form: &FormState, generator: &dyn ItineraryGenerator) -> Result<PlanOutcome, PlanError> {
    let trip = match form.validate() {
        Ok(trip) => trip,
        Err(e) => {
            warn!("⚠️ Submission rejected: {}", e);
            return Err(e.into());
        }
    };

    info!("🚀 Planning {} day(s) across {} for {} traveller(s)", trip.total_days(), trip.cities.join(" / "), trip.num_people);

    let request_text = prompt_for(&trip);
    let budget = estimate_for(&trip);

    match generator.generate(&request_text).await {
        Ok(itinerary) => {
            info!("✅ Plan ready: {} chars, total {:.2}", itinerary.len(), budget.total);
            Ok(PlanOutcome { itinerary, budget })
        }
        Err(source) => Err(PlanError::Generation { source, budget }),
    }
}

/// Budget only, independent of generation.
pub fn estimate_budget(form: &FormState) -> Result<BudgetBreakdown, ValidationError> {
    form.validate().map(|trip| estimate_for(&trip))
}
