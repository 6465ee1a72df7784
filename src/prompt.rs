use crate::models::TripRequest;

pub const SYSTEM_PROMPT: &str = "\
You are a professional travel planner.
Create a realistic, day-by-day itinerary.
Adapt activities based on ages (kids, adults, seniors).
Respect guardrails strictly.

Format:

## City Name
### Day 1
- Morning:
- Afternoon:
- Evening:
";

/// User-turn text for the itinerary request. Free text goes in verbatim.
pub fn build_prompt(
    cities: &[String],
    days: u32,
    interests: &[&str],
    guardrails: &str,
    num_people: u32,
    ages: &str,
) -> String {
    let ages = if ages.is_empty() { "Not specified" } else { ages };
    let interests = if interests.is_empty() { "General sightseeing".to_string() } else { interests.join(", ") };
    let guardrails = if guardrails.is_empty() { "None" } else { guardrails };
    let cities = cities.join(", ");

    format!(
        "\
Cities: {cities}
Days per city: {days}

Travel Group:
- Number of people: {num_people}
- Ages: {ages}

Interests: {interests}
Guardrails: {guardrails}

Guidelines:
- Include kid-friendly or senior-friendly activities if applicable
- Avoid physically demanding activities when younger kids or seniors are present
- Balance rest and exploration

Generate a practical itinerary.
"
    )
}

pub fn prompt_for(trip: &TripRequest) -> String {
    build_prompt(
        &trip.cities,
        trip.days_per_city,
        &trip.interest_labels(),
        &trip.guardrails,
        trip.num_people,
        &trip.ages,
    )
}
