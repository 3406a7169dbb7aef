use claim::{assert_none, assert_ok};
use fake::faker::address::en::CityName;
use fake::faker::company::en::CompanyName;
use fake::faker::name::en::Name;
use fake::Fake;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use school_console::api::ApiClient;
use school_console::core::AppErrorType;
use school_console::forms::payload::build_payload;
use school_console::forms::{EntityKind, FormController, FormDraft, SubmitOutcome};
use school_console::notify::Notification;
use school_console::session::SessionContext;

use crate::helpers::{api_config, spawn_app, TestApp};

async fn fill(form: &mut FormController, app: &TestApp, values: &[(&str, &str)]) {
    for (name, value) in values {
        assert_ok!(form.input(&app.api, name, *value).await);
    }
}

fn address(city: &str) -> Vec<(&'static str, String)> {
    vec![
        ("address_line1", "12 MG Road".to_string()),
        ("city", city.to_string()),
        ("state", "Karnataka".to_string()),
        ("pincode", "560 001".to_string()),
    ]
}

async fn filled_school_form(app: &TestApp) -> FormController {
    let mut form = FormController::new(EntityKind::School, 50);
    form.open(&app.api).await;

    let school_name: String = CompanyName().fake();
    let city: String = CityName().fake();
    fill(
        &mut form,
        app,
        &[
            ("school_code", "dps01"),
            ("school_name", school_name.as_str()),
            ("phone", "98-765 43210"),
            ("email", "office@dps.example.com"),
            ("board_type", "CBSE"),
            ("academic_session_start_month", "4"),
            ("grading_system", "PERCENTAGE"),
            ("affiliation_number", "AFF-2231"),
            ("recognition_status", "RECOGNIZED"),
        ],
    )
    .await;
    for (name, value) in address(&city) {
        assert_ok!(form.input(&app.api, name, value).await);
    }
    assert_ok!(form.input(&app.api, "rte_compliance", true).await);
    form
}

#[tokio::test]
async fn school_registration_sends_typed_payload_and_resets() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/api/schools/register"))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!({"message": "School registered successfully", "data": {"id": 11}})),
        )
        .expect(1)
        .mount(&app.server)
        .await;

    let mut form = filled_school_form(&app).await;
    let outcome = form.submit(&app.api, &app.notifications).await;

    assert!(matches!(outcome, SubmitOutcome::Submitted { .. }), "{:?}", outcome);
    let body = app.sent_json("/api/schools/register").await;
    assert_eq!(body["academic_session_start_month"], json!(4));
    assert_eq!(body["rte_compliance"], json!(true));
    assert_eq!(body["school_code"], json!("dps01"));
    assert_eq!(body["phone"], json!("9876543210"));
    assert_eq!(body["pincode"], json!("560001"));
    assert_eq!(body["address_line2"], json!(""));

    assert_eq!(form.draft().text("school_name"), Some(""));
    assert_eq!(form.draft().flag("rte_compliance"), Some(false));
    assert!(!form.is_submitting());
    assert!(matches!(
        app.notifications.last(),
        Some(Notification::Success { .. })
    ));
}

#[tokio::test]
async fn rejected_registration_keeps_values_and_shows_server_message() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/api/schools/register"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "School code already exists"})),
        )
        .mount(&app.server)
        .await;

    let mut form = filled_school_form(&app).await;
    let outcome = form.submit(&app.api, &app.notifications).await;

    assert_eq!(
        outcome,
        SubmitOutcome::Failed {
            message: "School code already exists".to_string()
        }
    );
    assert_eq!(form.draft().text("school_code"), Some("dps01"));
    assert!(!form.is_submitting());
    assert_eq!(
        app.notifications.last(),
        Some(Notification::error("School code already exists"))
    );
}

#[tokio::test]
async fn server_error_without_message_uses_fallback() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/api/schools/register"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&app.server)
        .await;

    let mut form = filled_school_form(&app).await;
    let outcome = form.submit(&app.api, &app.notifications).await;

    assert_eq!(
        outcome,
        SubmitOutcome::Failed {
            message: "Failed to register school. Please try again.".to_string()
        }
    );
}

#[tokio::test]
async fn invalid_form_sends_nothing() {
    let app = spawn_app().await;
    Mock::given(method("POST"))
        .and(path("/api/schools/register"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&app.server)
        .await;

    let mut form = FormController::new(EntityKind::School, 50);
    fill(&mut form, &app, &[("school_code", "DPS01"), ("phone", "12345")]).await;
    let outcome = form.submit(&app.api, &app.notifications).await;

    let SubmitOutcome::Invalid(errors) = outcome else {
        panic!("expected validation errors, got {:?}", outcome);
    };
    assert!(errors.contains_key("school_name"));
    assert!(errors.contains_key("phone"));
    assert!(!errors.contains_key("school_code"));
    assert_none!(app.notifications.last());
}

#[tokio::test]
async fn student_registration_resolves_cascading_selectors() {
    let app = spawn_app().await;
    app.mount_schools().await;
    app.mount_get(
        "/api/branches",
        json!({"data": [
            {"id": 7, "school_id": 3, "branch_code": "MAIN", "branch_name": "Main campus"},
            {"id": 8, "school_id": 4, "branch_code": "EAST", "branch_name": "East campus"}
        ]}),
    )
    .await;
    app.mount_get(
        "/api/users/school/3/STUDENT",
        json!({"users": [{"id": 42, "username": "aarav", "full_name": "Aarav Sharma"}]}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/students/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": 5}})))
        .expect(1)
        .mount(&app.server)
        .await;

    let mut form = FormController::new(EntityKind::Student, 50);
    form.open(&app.api).await;
    let student_name: String = Name().fake();
    fill(
        &mut form,
        &app,
        &[
            ("school_id", "3"),
            ("branch_id", "7"),
            ("user_id", "42"),
            ("admission_number", "ADM-1001"),
            ("roll_number", "17"),
            ("full_name", student_name.as_str()),
            ("date_of_birth", "2012-02-29"),
            ("gender", "M"),
            ("blood_group", "O+"),
            ("aadhar_number", "1234 5678 9012"),
            ("admission_date", "2020-06-01"),
            ("admission_class", "5"),
            ("current_status", "ACTIVE"),
            ("emergency_contact_name", "Meera Sharma"),
            ("emergency_contact_phone", "9123456789"),
        ],
    )
    .await;
    for (name, value) in address("Pune") {
        assert_ok!(form.input(&app.api, name, value).await);
    }

    let branch_ids: Vec<_> = form
        .options("branch_id")
        .expect("branch selector")
        .items()
        .iter()
        .map(|choice| choice.id.clone())
        .collect();
    assert_eq!(branch_ids, vec!["7".to_string()]);

    let outcome = form.submit(&app.api, &app.notifications).await;
    assert!(matches!(outcome, SubmitOutcome::Submitted { .. }), "{:?}", outcome);

    let body = app.sent_json("/api/students/register").await;
    assert_eq!(body["school_id"], json!(3));
    assert_eq!(body["branch_id"], json!(7));
    assert_eq!(body["user_id"], json!("42"));
    assert_eq!(body["admission_class"], json!(5));
    assert_eq!(body["aadhar_number"], json!("123456789012"));
    assert_eq!(body["medical_conditions"], json!(""));
    assert_eq!(
        app.notifications.last(),
        Some(Notification::success("Student registered successfully"))
    );
}

#[tokio::test]
async fn branch_registration_sends_capacity_as_integer() {
    let app = spawn_app().await;
    app.mount_schools().await;
    Mock::given(method("POST"))
        .and(path("/api/branches"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": 7}})))
        .expect(1)
        .mount(&app.server)
        .await;

    let mut form = FormController::new(EntityKind::Branch, 50);
    form.open(&app.api).await;
    fill(
        &mut form,
        &app,
        &[
            ("school_id", "3"),
            ("branch_code", "north-1"),
            ("branch_name", "North Campus"),
            ("phone", "9876543210"),
            ("max_students", "1,200"),
        ],
    )
    .await;
    for (name, value) in address("Mysuru") {
        assert_ok!(form.input(&app.api, name, value).await);
    }
    assert_ok!(form.input(&app.api, "is_main_branch", true).await);

    let outcome = form.submit(&app.api, &app.notifications).await;
    assert!(matches!(outcome, SubmitOutcome::Submitted { .. }), "{:?}", outcome);

    let body = app.sent_json("/api/branches").await;
    assert_eq!(body["school_id"], json!(3));
    assert_eq!(body["max_students"], json!(1200));
    assert_eq!(body["is_main_branch"], json!(true));
    assert_eq!(body["branch_code"], json!("north-1"));
    assert_eq!(
        app.notifications.last(),
        Some(Notification::success("Branch registered successfully"))
    );
}

#[tokio::test]
async fn user_registration_scopes_branches_and_defaults_phones() {
    let app = spawn_app().await;
    app.mount_schools().await;
    app.mount_get(
        "/api/branches",
        json!({"data": [
            {"id": 7, "school_id": 3, "branch_code": "MAIN", "branch_name": "Main campus"},
            {"id": 8, "school_id": 4, "branch_code": "EAST", "branch_name": "East campus"}
        ]}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/users/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": 42}})))
        .expect(1)
        .mount(&app.server)
        .await;

    let mut form = FormController::new(EntityKind::User, 50);
    form.open(&app.api).await;
    let full_name: String = Name().fake();
    fill(
        &mut form,
        &app,
        &[
            ("school_id", "3"),
            ("branch_id", "7"),
            ("username", "priya.k"),
            ("email", "priya@dps.example.com"),
            ("phone", "9876543210"),
            ("password", "chalk-and-slate"),
            ("full_name", full_name.as_str()),
            ("date_of_birth", "1990-08-15"),
            ("gender", "f"),
            ("role", "teacher"),
        ],
    )
    .await;
    for (name, value) in address("Pune") {
        assert_ok!(form.input(&app.api, name, value).await);
    }

    let branch_ids: Vec<_> = form
        .options("branch_id")
        .expect("branch selector")
        .items()
        .iter()
        .map(|choice| choice.id.clone())
        .collect();
    assert_eq!(branch_ids, vec!["7".to_string()]);

    let outcome = form.submit(&app.api, &app.notifications).await;
    assert!(matches!(outcome, SubmitOutcome::Submitted { .. }), "{:?}", outcome);

    let body = app.sent_json("/api/users/register").await;
    assert_eq!(body["branch_id"], json!(7));
    assert_eq!(body["password"], json!("chalk-and-slate"));
    assert_eq!(body["role"], json!("TEACHER"));
    assert_eq!(body["gender"], json!("F"));
    assert_eq!(body["alternate_phone"], json!("9876543210"));
    assert_eq!(body["emergency_contact"], json!("9876543210"));
}

#[tokio::test]
async fn parent_phone_needs_a_mobile_prefix() {
    let app = spawn_app().await;
    app.mount_schools().await;
    app.mount_get("/api/users/school/3/PARENT", json!({"data": [{"id": 21, "username": "ravi"}]}))
        .await;
    Mock::given(method("POST"))
        .and(path("/api/parents/register"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"data": {"id": 9}})))
        .expect(1)
        .mount(&app.server)
        .await;

    let mut form = FormController::new(EntityKind::Parent, 50);
    form.open(&app.api).await;
    let full_name: String = Name().fake();
    fill(
        &mut form,
        &app,
        &[
            ("school_id", "3"),
            ("user_id", "21"),
            ("full_name", full_name.as_str()),
            ("phone", "5123456789"),
            ("email", "ravi@example.com"),
            ("occupation", "Engineer"),
            ("annual_income_range", "5_10_lakh"),
            ("education_level", "graduate"),
        ],
    )
    .await;
    for (name, value) in address("Chennai") {
        assert_ok!(form.input(&app.api, name, value).await);
    }

    let SubmitOutcome::Invalid(errors) = form.submit(&app.api, &app.notifications).await else {
        panic!("a phone starting with 5 must be rejected");
    };
    assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec!["phone"]);
    assert!(app.requests_to("/api/parents/register").await.is_empty());

    assert_ok!(form.input(&app.api, "phone", "9876543210").await);
    let outcome = form.submit(&app.api, &app.notifications).await;
    assert!(matches!(outcome, SubmitOutcome::Submitted { .. }), "{:?}", outcome);

    let body = app.sent_json("/api/parents/register").await;
    assert_eq!(body["user_id"], json!("21"));
    assert_eq!(body["phone"], json!("9876543210"));
    assert_eq!(body["whatsapp_number"], json!("9876543210"));
    assert_eq!(body["annual_income_range"], json!("5_10_LAKH"));
    assert_eq!(body["education_level"], json!("GRADUATE"));
}

#[tokio::test]
async fn relationship_link_carries_bearer_token() {
    let app = spawn_app().await;
    app.mount_schools().await;
    app.mount_get("/api/users/school/4/PARENT", json!({"data": [{"id": 21, "username": "ravi"}]}))
        .await;
    app.mount_get("/api/users/school/4/STUDENT", json!({"data": [{"id": 42, "username": "aarav"}]}))
        .await;
    Mock::given(method("POST"))
        .and(path("/api/parents/relationships"))
        .and(header("Authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&app.server)
        .await;

    let mut form = FormController::new(EntityKind::Relationship, 50);
    form.open(&app.api).await;
    fill(
        &mut form,
        &app,
        &[
            ("school_id", "4"),
            ("parent_user_id", "21"),
            ("student_user_id", "42"),
            ("relationship_type", "father"),
        ],
    )
    .await;
    assert_ok!(form.input(&app.api, "is_primary_contact", true).await);

    let outcome = form.submit(&app.api, &app.notifications).await;
    assert_eq!(
        outcome,
        SubmitOutcome::Submitted {
            message: "Relationship linked successfully".to_string(),
            response: json!({"success": true}),
        }
    );

    let body = app.sent_json("/api/parents/relationships").await;
    assert_eq!(body["parent_user_id"], json!("21"));
    assert_eq!(body["student_user_id"], json!("42"));
    assert_eq!(body["relationship_type"], json!("FATHER"));
    assert_eq!(body["is_primary_contact"], json!(true));
}

#[tokio::test]
async fn password_is_not_sent_over_plain_http() {
    let api = ApiClient::new(
        &api_config("http://school.example.invalid/api"),
        SessionContext::with_token("t", None),
    )
    .expect("valid base url");

    let mut draft = FormDraft::new(EntityKind::User);
    for (name, value) in [("school_id", "1"), ("branch_id", "2"), ("password", "s3cret!")] {
        assert_ok!(draft.set(name, value.into()));
    }
    let payload = build_payload(draft.schema(), draft.values()).expect("payload builds");
    assert!(payload.carries_credentials());

    let error = api
        .register(EntityKind::User, &payload)
        .await
        .expect_err("credentials must not leave over http");
    assert_eq!(error.error_type, AppErrorType::InsecureTransport);
    assert_eq!(
        error.message_or("Failed to register user. Please try again."),
        "Refusing to send credentials over an unencrypted connection"
    );
}
