use serde::{Serialize, Deserialize};
use thiserror::Error;

pub const DAYS_RANGE: (u32, u32) = (1, 14);
pub const PEOPLE_RANGE: (u32, u32) = (1, 20);
pub const DAILY_BUDGET_RANGE: (f64, f64) = (50.0, 1000.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interest {
    Museums,
    #[serde(rename = "Food & Cuisine")]
    FoodAndCuisine,
    #[serde(rename = "Historic Sites")]
    HistoricSites,
    Nature,
    Shopping,
}

impl Interest {
    pub const ALL: [Interest; 5] = [
        Interest::Museums,
        Interest::FoodAndCuisine,
        Interest::HistoricSites,
        Interest::Nature,
        Interest::Shopping,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Interest::Museums => "Museums",
            Interest::FoodAndCuisine => "Food & Cuisine",
            Interest::HistoricSites => "Historic Sites",
            Interest::Nature => "Nature",
            Interest::Shopping => "Shopping",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Please enter at least one city.")]
    NoCities,
    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange { field: &'static str, min: f64, max: f64, value: f64 },
}

/// Raw form fields, exactly as the user typed them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormState {
    /// One destination per line.
    pub cities: String,
    /// Days per city.
    pub days: u32,
    pub num_people: u32,
    pub ages: String,
    pub interests: Vec<Interest>,
    pub guardrails: String,
    /// USD per person per day.
    pub daily_budget: f64,
}

impl FormState {
    pub fn defaults() -> Self {
        Self {
            cities: String::new(),
            days: 3,
            num_people: 1,
            ages: String::new(),
            interests: Vec::new(),
            guardrails: String::new(),
            daily_budget: 300.0,
        }
    }

    /// Non-blank trimmed lines of the cities field, in input order.
    pub fn city_list(&self) -> Vec<String> {
        self.cities
            .lines()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn validate(&self) -> Result<TripRequest, ValidationError> {
        check_range("days", f64::from(self.days), DAYS_RANGE.0.into(), DAYS_RANGE.1.into())?;
        check_range("num_people", f64::from(self.num_people), PEOPLE_RANGE.0.into(), PEOPLE_RANGE.1.into())?;
        check_range("daily_budget", self.daily_budget, DAILY_BUDGET_RANGE.0, DAILY_BUDGET_RANGE.1)?;

        let cities = self.city_list();
        if cities.is_empty() {
            return Err(ValidationError::NoCities);
        }

        let mut interests: Vec<Interest> = Vec::with_capacity(self.interests.len());
        for i in &self.interests {
            if !interests.contains(i) {
                interests.push(*i);
            }
        }

        Ok(TripRequest {
            cities,
            days_per_city: self.days,
            num_people: self.num_people,
            ages: self.ages.trim().to_string(),
            interests,
            guardrails: self.guardrails.trim().to_string(),
            daily_budget: self.daily_budget,
        })
    }
}

impl Default for FormState {
    fn default() -> Self { Self::defaults() }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    // NaN fails both comparisons, so test for membership rather than exclusion
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::OutOfRange { field, min, max, value })
    }
}

/// A validated submission. Built fresh for every request and never stored.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRequest {
    pub cities: Vec<String>,
    pub days_per_city: u32,
    pub num_people: u32,
    pub ages: String,
    pub interests: Vec<Interest>,
    pub guardrails: String,
    pub daily_budget: f64,
}

impl TripRequest {
    /// Days per city times the number of cities.
    pub fn total_days(&self) -> u32 {
        self.days_per_city * self.cities.len() as u32
    }

    pub fn interest_labels(&self) -> Vec<&'static str> {
        self.interests.iter().map(|i| i.label()).collect()
    }
}

/// Everything the single-user form remembers between interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub form: FormState,
    /// Last generated itinerary markdown; empty when there is none.
    pub itinerary: String,
}

impl Session {
    pub fn defaults() -> Self {
        Self { form: FormState::defaults(), itinerary: String::new() }
    }

    pub fn has_itinerary(&self) -> bool {
        !self.itinerary.is_empty()
    }
}

impl Default for Session {
    fn default() -> Self { Self::defaults() }
}
