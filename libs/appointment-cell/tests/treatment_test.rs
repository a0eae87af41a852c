use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_partial_json, headers, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{AppointmentError, AppointmentStatus, CompleteAppointmentRequest};
use appointment_cell::services::{AppointmentHistoryService, TreatmentService};
use shared_models::access::Actor;
use shared_utils::test_utils::{MockRows, TestConfig};

fn visit_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

fn notes(text: &str) -> CompleteAppointmentRequest {
    CompleteAppointmentRequest {
        diagnosis: Some("Seasonal flu".to_string()),
        prescription: Some("Rest and fluids".to_string()),
        notes: Some(text.to_string()),
    }
}

async fn mount_treatment_upsert(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path("/rest/v1/treatments"))
        .and(query_param("on_conflict", "appointment_id"))
        .and(headers("Prefer", vec!["resolution=merge-duplicates", "return=representation"]))
        .and(body_partial_json(json!({ "appointment_id": 100, "patient_id": 7, "notes": text, "visit_date": "2024-06-01" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([MockRows::treatment(500, 100, 7, text)])))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_completing_twice_keeps_one_treatment_with_latest_notes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(100, 1, 7, "2024-06-01", "Morning", "Booked")
        ])))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(100, 1, 7, "2024-06-01", "Morning", "Completed")
        ])))
        .mount(&mock_server)
        .await;

    mount_treatment_upsert(&mock_server, "first visit").await;
    mount_treatment_upsert(&mock_server, "follow-up needed").await;

    // Only the first completion changes status
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status", "eq.Booked"))
        .and(body_partial_json(json!({ "status": "Completed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(100, 1, 7, "2024-06-01", "Morning", "Completed")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = TreatmentService::new(&TestConfig::with_url(mock_server.uri()).to_app_config());
    let doctor = Actor::doctor(20, 1);

    let first = service.complete_appointment(100, &doctor, notes("first visit"), visit_date()).await.unwrap();
    assert_eq!(first.appointment.status, AppointmentStatus::Completed);

    let second = service.complete_appointment(100, &doctor, notes("follow-up needed"), visit_date()).await.unwrap();
    assert_eq!(second.treatment.id, first.treatment.id);
    assert_eq!(second.treatment.notes.as_deref(), Some("follow-up needed"));
}

#[tokio::test]
async fn test_completing_cancelled_appointment_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(100, 1, 7, "2024-06-01", "Morning", "Cancelled")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/treatments"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let service = TreatmentService::new(&TestConfig::with_url(mock_server.uri()).to_app_config());

    assert_matches!(
        service.complete_appointment(100, &Actor::doctor(20, 1), notes("x"), visit_date()).await,
        Err(AppointmentError::InvalidStatusTransition { from: AppointmentStatus::Cancelled, .. })
    );
}

#[tokio::test]
async fn test_only_assigned_doctor_completes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(100, 1, 7, "2024-06-01", "Morning", "Booked")
        ])))
        .mount(&mock_server)
        .await;

    let service = TreatmentService::new(&TestConfig::with_url(mock_server.uri()).to_app_config());

    assert_matches!(
        service.complete_appointment(100, &Actor::doctor(21, 2), notes("x"), visit_date()).await,
        Err(AppointmentError::Forbidden(_))
    );
}

#[tokio::test]
async fn test_patient_history_orders_newest_first() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", "eq.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([MockRows::patient(7, 50, "Jane Roe")])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("patient_id", "eq.7"))
        .and(query_param("order", "date.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(101, 1, 7, "2024-07-01", "Morning", "Booked"),
            MockRows::appointment(100, 1, 7, "2024-06-01", "Morning", "Completed"),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/treatments"))
        .and(query_param("patient_id", "eq.7"))
        .and(query_param("order", "visit_date.desc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([MockRows::treatment(500, 100, 7, "ok")])))
        .mount(&mock_server)
        .await;

    let service = AppointmentHistoryService::new(&TestConfig::with_url(mock_server.uri()).to_app_config());
    let history = service.patient_history(7).await.unwrap();

    assert_eq!(history.patient.name, "Jane Roe");
    assert_eq!(history.appointments.len(), 2);
    assert_eq!(history.appointments[0].id, 101);
    assert_eq!(history.treatments[0].appointment_id, 100);
}

#[tokio::test]
async fn test_doctor_dashboard_covers_next_week() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("doctor_id", "eq.1"))
        .and(query_param("date", "gte.2024-06-01"))
        .and(query_param("date", "lte.2024-06-08"))
        .and(query_param("order", "date.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(100, 1, 7, "2024-06-01", "Morning", "Booked")
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = AppointmentHistoryService::new(&TestConfig::with_url(mock_server.uri()).to_app_config());
    let appointments = service.doctor_dashboard(1, visit_date()).await.unwrap();

    assert_eq!(appointments.len(), 1);
}

#[tokio::test]
async fn test_appointment_history_without_treatment() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("id", "eq.100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(100, 1, 7, "2024-06-01", "Morning", "Booked")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/treatments"))
        .and(query_param("appointment_id", "eq.100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let service = AppointmentHistoryService::new(&TestConfig::with_url(mock_server.uri()).to_app_config());
    let history = service.appointment_history(100).await.unwrap();

    assert_eq!(history.appointment.id, 100);
    assert!(history.treatment.is_none());
}
