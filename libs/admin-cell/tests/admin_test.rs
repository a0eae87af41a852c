use assert_matches::assert_matches;
use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use admin_cell::models::{AddDoctorRequest, AdminError, SearchResults, SearchTarget};
use admin_cell::services::{
    AccountRemovalService, AdminDashboardService, AdminDoctorService, AdminPatientService,
    AdminSearchService,
};
use shared_config::AppConfig;
use shared_models::access::Role;
use shared_utils::test_utils::{MockRows, TestConfig};

fn config(server: &MockServer) -> AppConfig {
    TestConfig::with_url(server.uri()).to_app_config()
}

fn add_doctor_request() -> AddDoctorRequest {
    AddDoctorRequest {
        name: Some("Dr. Adams".to_string()),
        email: Some("Adams@Hospital.test".to_string()),
        password: Some("temporary".to_string()),
        department_id: Some(1),
        experience_years: Some(12),
        bio: None,
    }
}

#[tokio::test]
async fn test_deleting_doctor_removes_account_and_reports_cascade() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([MockRows::doctor(1, 20, 1, "Dr. Adams")])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("select", "id"))
        .and(query_param("doctor_id", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 100}, {"id": 101}, {"id": 102}])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/treatments"))
        .and(query_param("appointment_id", "in.(100,101,102)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 500}, {"id": 501}])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", "eq.20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::user(20, "adams@hospital.test", "doctor", "$argon2id$stub", true)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = AccountRemovalService::new(&config(&mock_server));
    let summary = service.delete_doctor(1).await.unwrap();

    assert_eq!(summary.role, Role::Doctor);
    assert_eq!(summary.user_id, 20);
    assert_eq!(summary.appointments_removed, 3);
    assert_eq!(summary.treatments_removed, 2);
}

#[tokio::test]
async fn test_deleting_doctor_without_appointments_skips_treatment_count() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([MockRows::doctor(1, 20, 1, "Dr. Adams")])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/treatments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 20}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let summary = AccountRemovalService::new(&config(&mock_server)).delete_doctor(1).await.unwrap();

    assert_eq!(summary.appointments_removed, 0);
    assert_eq!(summary.treatments_removed, 0);
}

#[tokio::test]
async fn test_deleting_patient_counts_own_treatments() {
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
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 100}, {"id": 101}])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/treatments"))
        .and(query_param("patient_id", "eq.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 500}])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", "eq.50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 50}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let summary = AccountRemovalService::new(&config(&mock_server)).delete_patient(7).await.unwrap();

    assert_eq!(summary.role, Role::Patient);
    assert_eq!(summary.appointments_removed, 2);
    assert_eq!(summary.treatments_removed, 1);
}

#[tokio::test]
async fn test_deleting_unknown_patient_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let result = AccountRemovalService::new(&config(&mock_server)).delete_patient(7).await;
    assert_matches!(result, Err(AdminError::NotFound("Patient")));
}

#[tokio::test]
async fn test_add_doctor_creates_account_and_profile() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/departments"))
        .and(query_param("id", "eq.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([MockRows::department(1, "Cardiology")])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("email", "eq.adams@hospital.test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .and(body_partial_json(json!({ "email": "adams@hospital.test", "role": "doctor" })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockRows::user(20, "adams@hospital.test", "doctor", "$argon2id$stub", true)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/doctors"))
        .and(body_partial_json(json!({ "user_id": 20, "department_id": 1, "name": "Dr. Adams", "experience_years": 12 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([MockRows::doctor(1, 20, 1, "Dr. Adams")])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let created = AdminDoctorService::new(&config(&mock_server))
        .add_doctor(add_doctor_request())
        .await
        .unwrap();

    assert_eq!(created.user_id, 20);
    assert_eq!(created.email, "adams@hospital.test");
    assert_eq!(created.doctor.id, 1);
}

#[tokio::test]
async fn test_add_doctor_removes_account_when_profile_fails() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/departments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([MockRows::department(1, "Cardiology")])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockRows::user(20, "adams@hospital.test", "doctor", "$argon2id$stub", true)
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(500).set_body_string("insert failed"))
        .mount(&mock_server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", "eq.20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 20}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = AdminDoctorService::new(&config(&mock_server)).add_doctor(add_doctor_request()).await;
    assert_matches!(result, Err(AdminError::App(_)));
}

#[tokio::test]
async fn test_add_doctor_with_taken_email_conflicts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/departments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([MockRows::department(1, "Cardiology")])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::user(20, "adams@hospital.test", "patient", "$argon2id$stub", true)
        ])))
        .mount(&mock_server)
        .await;

    let result = AdminDoctorService::new(&config(&mock_server)).add_doctor(add_doctor_request()).await;
    assert_matches!(result, Err(AdminError::Conflict(_)));
}

#[tokio::test]
async fn test_add_doctor_requires_department() {
    let service = AdminDoctorService::new(&TestConfig::default().to_app_config());
    let request = AddDoctorRequest { department_id: None, ..add_doctor_request() };

    assert_matches!(service.add_doctor(request).await, Err(AdminError::ValidationError(_)));
}

#[tokio::test]
async fn test_add_doctor_unknown_department_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/departments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let result = AdminDoctorService::new(&config(&mock_server)).add_doctor(add_doctor_request()).await;
    assert_matches!(result, Err(AdminError::NotFound("Department")));
}

#[tokio::test]
async fn test_blacklisting_patient_deactivates_account() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("id", "eq.7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([MockRows::patient(7, 50, "Jane Roe")])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/users"))
        .and(query_param("id", "eq.50"))
        .and(body_partial_json(json!({ "is_active": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::user(50, "jane@example.com", "patient", "$argon2id$stub", false)
        ])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let patient = AdminPatientService::new(&config(&mock_server)).blacklist_patient(7).await.unwrap();
    assert_eq!(patient.id, 7);
}

#[tokio::test]
async fn test_patient_search_includes_email_matches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/users"))
        .and(query_param("role", "eq.patient"))
        .and(query_param("email", "ilike.*roe*"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 50}])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("or", "(name.ilike.*roe*,contact.ilike.*roe*,user_id.in.(50))"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([MockRows::patient(7, 50, "Jane Roe")])))
        .mount(&mock_server)
        .await;

    let results = AdminSearchService::new(&config(&mock_server))
        .search("Roe", SearchTarget::Patient)
        .await
        .unwrap();

    assert_matches!(results, SearchResults::Patient(found) if found.len() == 1);
}

#[tokio::test]
async fn test_dashboard_collects_counts_and_appointments() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("select", "id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(query_param("select", "id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 7}, {"id": 9}, {"id": 11}])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status", "eq.Booked"))
        .and(query_param("date", "gte.2024-06-01"))
        .and(query_param("order", "date.asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(100, 1, 7, "2024-06-01", "Morning", "Booked")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("status", "eq.Completed"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockRows::appointment(90, 2, 9, "2024-05-20", "Evening", "Completed")
        ])))
        .mount(&mock_server)
        .await;

    let dashboard = AdminDashboardService::new(&config(&mock_server))
        .dashboard(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
        .await
        .unwrap();

    assert_eq!(dashboard.doctor_count, 2);
    assert_eq!(dashboard.patient_count, 3);
    assert_eq!(dashboard.upcoming_appointments.len(), 1);
    assert_eq!(dashboard.recent_completed[0].id, 90);
}
