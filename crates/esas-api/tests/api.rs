use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use esas_api::config::ApiConfig;
use esas_api::router;
use esas_api::state::AppState;
use esas_education::EducationCatalog;
use esas_recommendations::RecommendationTable;
use esas_storage::backend::StoreBackend;
use esas_storage::memory::MemoryObjectStore;
use serde_json::{Value, json};
use tower::ServiceExt;

fn app_with(vars: &[(&str, &str)]) -> Router {
    let config = ApiConfig::from_lookup(|name| {
        vars.iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.to_string())
            .or_else(|| (name == "ESAS_STORAGE").then(|| "memory".to_string()))
    })
    .unwrap();
    let state = AppState::new(
        &config,
        StoreBackend::Memory(MemoryObjectStore::new()),
        RecommendationTable::builtin().unwrap(),
        EducationCatalog::builtin().unwrap(),
    );
    router(state)
}

fn app() -> Router {
    app_with(&[("ESAS_ADMIN_ACCOUNTS", "admin-1")])
}

async fn send_raw(
    app: &Router,
    method: &str,
    uri: &str,
    account: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", "203.0.113.9");
    if let Some(account) = account {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {account}"));
    }
    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, bytes.to_vec())
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    account: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let (status, _, bytes) = send_raw(app, method, uri, account, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn high_fatigue_scores() -> Value {
    json!({"1": 2, "2": 8, "3": 1, "4": 0, "5": 8, "6": 3, "7": 2, "8": 1, "9": 4})
}

fn guest_body() -> Value {
    json!({
        "identity": {"name": "  Made Ayu ", "age": 66, "gender": "female"},
        "scores": high_fatigue_scores(),
    })
}

#[tokio::test]
async fn public_lookups() {
    let app = app();

    let (status, body) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storage"], "memory");

    let (status, body) = send(&app, "GET", "/symptoms", None, None).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<u64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|q| q["id"].as_u64().unwrap())
        .collect();
    assert_eq!(ids, (1..=9).collect::<Vec<u64>>());

    let (status, body) = send(&app, "GET", "/recommendations/pain/high", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["interventions"].as_array().is_some());

    let (status, _) = send(&app, "GET", "/recommendations/itching/high", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/education?q=oxygen&limit=3", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["article"]["id"], "oxygen-at-home");
}

#[tokio::test]
async fn guest_screening_returns_result_and_token() {
    let app = app();

    let (status, body) = send(&app, "POST", "/screenings/guest", None, Some(guest_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["guest_token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(body["classification"]["primary_symptom"], "fatigue");
    assert_eq!(body["classification"]["risk_level"], "high");
    assert_eq!(body["classification"]["highest_score"], 8);
    assert!(body["recommendation"]["therapy"].as_str().is_some());
}

#[tokio::test]
async fn invalid_scores_are_rejected_with_field() {
    let app = app();

    let mut body = guest_body();
    body["scores"]["3"] = json!(11);
    let (status, err) = send(&app, "POST", "/screenings/guest", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["field"], "scores.3");

    let mut body = guest_body();
    body["scores"].as_object_mut().unwrap().remove("9");
    let (status, err) = send(&app, "POST", "/screenings/guest", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["field"], "scores");

    let mut body = guest_body();
    body["identity"]["name"] = json!("   ");
    let (status, err) = send(&app, "POST", "/screenings/guest", None, Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["field"], "identity.name");
}

#[tokio::test]
async fn protected_routes_need_a_bearer_subject() {
    let app = app();

    let (status, _) = send(&app, "GET", "/screenings", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/screenings", Some("../etc"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Authenticated but never registered.
    let (status, _) = send(&app, "GET", "/accounts/me", Some("stranger"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn guest_registers_and_links_screenings() {
    let app = app();

    let (_, created) = send(&app, "POST", "/screenings/guest", None, Some(guest_body())).await;
    let token = created["guest_token"].as_str().unwrap().to_string();
    let screening_id = created["screening_id"].clone();

    let (status, profile) = send(
        &app,
        "POST",
        "/accounts",
        Some("patient-1"),
        Some(json!({"display_name": "Made Ayu"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(profile["role"], "patient");

    let (status, again) = send(
        &app,
        "POST",
        "/accounts",
        Some("patient-1"),
        Some(json!({"display_name": "Made Ayu"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT, "{again}");

    let (status, outcome) = send(
        &app,
        "POST",
        "/guest-link",
        Some("patient-1"),
        Some(json!({"guest_token": token, "screening_id": screening_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["screening_ids"], json!([screening_id]));

    let (status, err) = send(
        &app,
        "POST",
        "/guest-link",
        Some("patient-1"),
        Some(json!({"guest_token": token})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err["error"], "nothing to link");

    let (_, me) = send(&app, "GET", "/accounts/me", Some("patient-1"), None).await;
    assert_eq!(me["patient_id"], outcome["patient_id"]);

    let (status, list) = send(&app, "GET", "/screenings", Some("patient-1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert_eq!(list[0]["ownership"], "linked");
    assert_eq!(list[0]["name"], "Made Ayu");

    let uri = format!("/screenings/{}", screening_id.as_str().unwrap());
    let (status, detail) = send(&app, "GET", &uri, Some("patient-1"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["subject_type"], "self_registered");
    assert_eq!(detail["guest_token"], Value::Null);

    // A follow-up self screening reuses the linked patient.
    let (status, second) = send(
        &app,
        "POST",
        "/screenings",
        Some("patient-1"),
        Some(json!({"scores": high_fatigue_scores()})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(second.get("guest_token").is_none());
    let (_, list) = send(&app, "GET", "/screenings", Some("patient-1"), None).await;
    assert_eq!(list.as_array().unwrap().len(), 2);
    assert!(
        list.as_array()
            .unwrap()
            .iter()
            .all(|s| s["patient_id"] == outcome["patient_id"])
    );
}

#[tokio::test]
async fn first_self_screening_needs_identity() {
    let app = app();
    send(
        &app,
        "POST",
        "/accounts",
        Some("patient-2"),
        Some(json!({"display_name": "Ketut"})),
    )
    .await;

    let (status, err) = send(
        &app,
        "POST",
        "/screenings",
        Some("patient-2"),
        Some(json!({"scores": high_fatigue_scores()})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["field"], "identity");

    let (status, _) = send(
        &app,
        "POST",
        "/screenings",
        Some("patient-2"),
        Some(json!({
            "identity": {"name": "Ketut", "age": 58, "gender": "male"},
            "scores": high_fatigue_scores(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, me) = send(&app, "GET", "/accounts/me", Some("patient-2"), None).await;
    assert!(me["patient_id"].is_string());
}

async fn setup_nurse(app: &Router) -> String {
    send(
        app,
        "POST",
        "/accounts",
        Some("admin-1"),
        Some(json!({"display_name": "Admin"})),
    )
    .await;
    send(
        app,
        "POST",
        "/accounts",
        Some("nurse-1"),
        Some(json!({"display_name": "Ners Dewi"})),
    )
    .await;

    let (status, provider) = send(
        app,
        "POST",
        "/providers",
        Some("admin-1"),
        Some(json!({"account_id": "nurse-1", "name": "Ners Dewi"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    provider["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn nurse_assisted_screening_and_report() {
    let app = app();
    setup_nurse(&app).await;

    let (_, me) = send(&app, "GET", "/accounts/me", Some("nurse-1"), None).await;
    assert_eq!(me["role"], "nurse");

    let (status, patient) = send(
        &app,
        "POST",
        "/patients",
        Some("nurse-1"),
        Some(json!({"name": "Nyoman", "age": 80, "gender": "male"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let patient_id = patient["id"].clone();

    let (status, created) = send(
        &app,
        "POST",
        "/screenings",
        Some("nurse-1"),
        Some(json!({"patient_id": patient_id, "scores": high_fatigue_scores()})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let screening_id = created["screening_id"].as_str().unwrap().to_string();

    let (status, report) = send(
        &app,
        "GET",
        &format!("/reports/{screening_id}"),
        Some("nurse-1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["patient"]["name"], "Nyoman");
    assert_eq!(report["patient"]["facility_name"], json!({"status": "not_provided"}));
    assert_eq!(
        report["provider"]["name"],
        json!({"status": "provided", "value": "Ners Dewi"})
    );
    assert_eq!(report["rows"].as_array().unwrap().len(), 9);
    assert!(report["recommendation"].is_object());

    let (status, headers, bytes) = send_raw(
        &app,
        "POST",
        &format!("/reports/{screening_id}/export"),
        Some("nurse-1"),
        Some(json!({"format": "markdown"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/markdown")
    );
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("- **Facility:** Not provided"));

    let (status, headers, bytes) = send_raw(
        &app,
        "POST",
        &format!("/reports/{screening_id}/export"),
        Some("nurse-1"),
        Some(json!({"format": "docx"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .contains("wordprocessingml")
    );
    assert!(bytes.starts_with(b"PK"));

    let (status, list) = send(
        &app,
        "GET",
        &format!("/screenings?patient_id={}", patient_id.as_str().unwrap()),
        Some("nurse-1"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn nurse_screening_requires_patient() {
    let app = app();
    setup_nurse(&app).await;

    let (status, err) = send(
        &app,
        "POST",
        "/screenings",
        Some("nurse-1"),
        Some(json!({"scores": high_fatigue_scores()})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err["field"], "patient_id");
}

#[tokio::test]
async fn roles_gate_access() {
    let app = app();
    setup_nurse(&app).await;
    send(
        &app,
        "POST",
        "/accounts",
        Some("patient-3"),
        Some(json!({"display_name": "Wayan"})),
    )
    .await;

    let (status, _) = send(&app, "GET", "/patients", Some("patient-3"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "PUT",
        "/accounts/patient-3/role",
        Some("nurse-1"),
        Some(json!({"role": "admin"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = send(
        &app,
        "PUT",
        "/accounts/patient-3/role",
        Some("admin-1"),
        Some(json!({"role": "nurse"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["role"], "nurse");

    // Someone else's guest screening is invisible to a patient.
    let (_, created) = send(&app, "POST", "/screenings/guest", None, Some(guest_body())).await;
    send(
        &app,
        "POST",
        "/accounts",
        Some("patient-4"),
        Some(json!({"display_name": "Komang"})),
    )
    .await;
    let uri = format!("/screenings/{}", created["screening_id"].as_str().unwrap());
    let (status, _) = send(&app, "GET", &uri, Some("patient-4"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", &uri, Some("nurse-1"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn guest_submissions_are_rate_limited() {
    let app = app_with(&[("ESAS_RATE_LIMIT_PER_MINUTE", "2")]);

    for _ in 0..2 {
        let (status, _) = send(&app, "POST", "/screenings/guest", None, Some(guest_body())).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, headers, _) =
        send_raw(&app, "POST", "/screenings/guest", None, Some(guest_body())).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert!(headers.contains_key(header::RETRY_AFTER));

    // Other routes are not limited.
    let (status, _) = send(&app, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
