use serde::{Deserialize, Serialize};

use crate::models::TripRequest;

/// Fixed spending buckets. Order here is the display order everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Accommodation,
    Food,
    Transport,
    Activities,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Accommodation,
        Category::Food,
        Category::Transport,
        Category::Activities,
    ];

    /// Share of the total daily spend. The four weights sum to 1.0.
    pub fn weight(self) -> f64 {
        match self {
            Category::Accommodation => 0.4,
            Category::Food => 0.25,
            Category::Transport => 0.15,
            Category::Activities => 0.2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Accommodation => "Accommodation",
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Activities => "Activities",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLine {
    pub category: Category,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetBreakdown {
    pub lines: Vec<BudgetLine>,
    pub total: f64,
}

impl BudgetBreakdown {
    pub fn amount(&self, category: Category) -> Option<f64> {
        self.lines.iter().find(|l| l.category == category).map(|l| l.amount)
    }

    pub fn summary_lines(&self) -> Vec<String> {
        self.lines
            .iter()
            .map(|l| format!("{}: {}", l.category.label(), format_usd(l.amount)))
            .collect()
    }
}

/// Splits `daily_budget * num_people * total_days` across the fixed categories.
/// Inputs are expected to be range-checked by the caller; nothing is rounded here.
pub fn estimate(total_days: u32, daily_budget: f64, num_people: u32) -> BudgetBreakdown {
    let total_daily = daily_budget * f64::from(num_people);
    let days = f64::from(total_days);

    let lines: Vec<BudgetLine> = Category::ALL
        .iter()
        .map(|&category| BudgetLine { category, amount: total_daily * category.weight() * days })
        .collect();
    let total = lines.iter().map(|l| l.amount).sum();

    BudgetBreakdown { lines, total }
}

/// Budget for a whole trip: days per city times the number of cities.
pub fn estimate_for(trip: &TripRequest) -> BudgetBreakdown {
    estimate(trip.total_days(), trip.daily_budget, trip.num_people)
}

/// `1440.0` -> `$1,440.00`
pub fn format_usd(amount: f64) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}.{cents}")
}
