use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use travel_planner::{router, AppState, GenerationError, ItineraryGenerator};

const ITINERARY: &str = "## Rome, Italy\n### Day 1\n- Morning: Colosseum\n- Afternoon: Roman Forum\n- Evening: Trastevere\n";

struct FakeGenerator {
    calls: Mutex<Vec<String>>,
    fail: bool,
}

impl FakeGenerator {
    fn ok() -> Arc<Self> { Arc::new(Self { calls: Mutex::new(Vec::new()), fail: false }) }
    fn failing() -> Arc<Self> { Arc::new(Self { calls: Mutex::new(Vec::new()), fail: true }) }
    fn call_count(&self) -> usize { self.calls.lock().len() }
}

#[async_trait]
impl ItineraryGenerator for FakeGenerator {
    async fn generate(&self, request_text: &str) -> Result<String, GenerationError> {
        self.calls.lock().push(request_text.to_string());
        if self.fail {
            Err(GenerationError::Network("connection refused".into()))
        } else {
            Ok(ITINERARY.to_string())
        }
    }
}

fn app(gen: Arc<FakeGenerator>) -> (Router, AppState) {
    let state = AppState::new(gen);
    (router(state.clone()), state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let mut req = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(v) => {
            req = req.header(header::CONTENT_TYPE, "application/json");
            Body::from(v.to_string())
        }
        None => Body::empty(),
    };
    let res = app.clone().oneshot(req.body(body).unwrap()).await.unwrap();
    let status = res.status();
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes) = send(app, method, uri, body).await;
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn rome_paris() -> Value {
    json!({
        "cities": "Rome, Italy\nParis, France",
        "days": 3,
        "num_people": 2,
        "ages": "",
        "interests": [],
        "guardrails": "",
        "daily_budget": 300
    })
}

fn approx(v: &Value, expected: f64) -> bool {
    (v.as_f64().unwrap() - expected).abs() < 1e-6
}

#[tokio::test]
async fn plan_returns_itinerary_and_budget() {
    let gen = FakeGenerator::ok();
    let (app, state) = app(gen.clone());

    let (status, body) = send_json(&app, "POST", "/api/plan", Some(rome_paris())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["itinerary"], ITINERARY);
    assert!(approx(&body["budget"]["total"], 3600.0));
    assert_eq!(
        body["summary"],
        json!([
            "Accommodation: $1,440.00",
            "Food: $900.00",
            "Transport: $540.00",
            "Activities: $720.00"
        ])
    );
    assert_eq!(body["total_display"], "Total Estimated Cost: $3,600.00");
    assert_eq!(body["pdf_url"], "/api/plan/pdf");

    assert_eq!(gen.call_count(), 1);
    let prompt = gen.calls.lock()[0].clone();
    assert!(prompt.contains("Ages: Not specified"));
    assert!(prompt.contains("Interests: General sightseeing"));
    assert!(prompt.contains("Guardrails: None"));

    assert!(state.session.read().has_itinerary());
}

#[tokio::test]
async fn empty_cities_is_rejected_before_generation() {
    let gen = FakeGenerator::ok();
    let (app, state) = app(gen.clone());

    let mut form = rome_paris();
    form["cities"] = json!("  \n \n");
    let (status, body) = send_json(&app, "POST", "/api/plan", Some(form)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Please enter at least one city.");
    assert_eq!(gen.call_count(), 0);
    // the typed form is still remembered
    assert_eq!(state.session.read().form.num_people, 2);
}

#[tokio::test]
async fn generation_failure_reports_budget_and_clears_itinerary() {
    let (ok_app, ok_state) = app(FakeGenerator::ok());
    send_json(&ok_app, "POST", "/api/plan", Some(rome_paris())).await;
    assert!(ok_state.session.read().has_itinerary());

    // same session, now with a failing generator
    let gen = FakeGenerator::failing();
    let failing_state = AppState { session: ok_state.session.clone(), generator: gen.clone() };
    let failing_app = router(failing_state);

    let (status, body) = send_json(&failing_app, "POST", "/api/plan", Some(rome_paris())).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "GENERATION_FAILED");
    assert!(body.get("itinerary").is_none());
    assert!(approx(&body["budget"]["total"], 3600.0));
    assert_eq!(gen.call_count(), 1);

    assert!(!ok_state.session.read().has_itinerary());
    let (status, body) = send_json(&failing_app, "GET", "/api/plan/pdf", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NO_ITINERARY");
}

#[tokio::test]
async fn budget_endpoint_is_independent_of_generation() {
    let gen = FakeGenerator::failing();
    let (app, _) = app(gen.clone());

    let (status, body) = send_json(&app, "POST", "/api/budget", Some(rome_paris())).await;
    assert_eq!(status, StatusCode::OK);
    assert!(approx(&body["budget"]["lines"][0]["amount"], 1440.0));
    assert_eq!(body["budget"]["lines"][0]["category"], "Accommodation");
    assert_eq!(gen.call_count(), 0);
}

#[tokio::test]
async fn out_of_range_fields_are_rejected() {
    let (app, _) = app(FakeGenerator::ok());
    let mut form = rome_paris();
    form["daily_budget"] = json!(20);
    let (status, body) = send_json(&app, "POST", "/api/budget", Some(form)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"]["message"].as_str().unwrap().contains("daily_budget"));
}

#[tokio::test]
async fn pdf_download_after_plan() {
    let (app, _) = app(FakeGenerator::ok());
    send_json(&app, "POST", "/api/plan", Some(rome_paris())).await;

    let res = app
        .clone()
        .oneshot(Request::builder().uri("/api/plan/pdf").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.headers()[header::CONTENT_TYPE], "application/pdf");
    assert_eq!(res.headers()[header::CONTENT_DISPOSITION], "attachment; filename=\"travel_plan.pdf\"");
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn reset_restores_defaults() {
    let (app, _) = app(FakeGenerator::ok());
    let mut form = rome_paris();
    form["interests"] = json!(["Museums", "Nature"]);
    form["guardrails"] = json!("No walking tours");
    send_json(&app, "POST", "/api/plan", Some(form)).await;

    let (status, body) = send_json(&app, "POST", "/api/reset", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "form": {
                "cities": "",
                "days": 3,
                "num_people": 1,
                "ages": "",
                "interests": [],
                "guardrails": "",
                "daily_budget": 300.0
            }
        })
    );

    let (_, session) = send_json(&app, "GET", "/api/session", None).await;
    assert_eq!(session, body);
}

#[tokio::test]
async fn session_remembers_form_and_itinerary() {
    let (app, _) = app(FakeGenerator::ok());
    send_json(&app, "POST", "/api/plan", Some(rome_paris())).await;

    let (status, body) = send_json(&app, "GET", "/api/session", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["form"]["cities"], "Rome, Italy\nParis, France");
    assert_eq!(body["itinerary"], ITINERARY);
    assert_eq!(body["pdf_url"], "/api/plan/pdf");
}

#[tokio::test]
async fn unknown_interest_is_refused() {
    let gen = FakeGenerator::ok();
    let (app, _) = app(gen.clone());
    let mut form = rome_paris();
    form["interests"] = json!(["Skydiving"]);
    let (status, _) = send(&app, "POST", "/api/plan", Some(form)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(gen.call_count(), 0);
}

#[tokio::test]
async fn index_page_and_interest_list_are_served() {
    let (app, _) = app(FakeGenerator::ok());
    let (status, html) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(String::from_utf8(html).unwrap().contains("Travel Guide Planner"));

    let (_, interests) = send_json(&app, "GET", "/api/interests", None).await;
    assert_eq!(interests, json!(["Museums", "Food & Cuisine", "Historic Sites", "Nature", "Shopping"]));
}

#[tokio::test]
async fn form_page_downloads_pdf_without_navigating_away() {
    let (app, _) = app(FakeGenerator::ok());
    let (_, html) = send(&app, "GET", "/", None).await;
    let html = String::from_utf8(html).unwrap();

    // the download goes through fetch so a RENDER_FAILED body lands in the status line
    assert!(html.contains(r#"id="download""#));
    assert!(html.contains(r#"fetch("/api/plan/pdf")"#));
    assert!(!html.contains(r#"href="/api/plan/pdf""#));
    // error bodies are parsed through a text fallback, never a bare res.json()
    assert!(html.contains("async function readBody(res)"));
    assert!(!html.contains(".json();\n  if (res.ok)"));
}

#[tokio::test]
async fn malformed_numbers_are_rejected_as_plain_text() {
    let gen = FakeGenerator::ok();
    let (app, _) = app(gen.clone());
    let mut form = rome_paris();
    form["days"] = json!(2.5);
    let (status, body) = send(&app, "POST", "/api/plan", Some(form)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(serde_json::from_slice::<Value>(&body).is_err());
    assert_eq!(gen.call_count(), 0);
}
