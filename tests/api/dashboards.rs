use serde_json::json;

use school_console::core::AppErrorType;
use school_console::dashboards::{load_dashboard, Dashboard};

use crate::helpers::spawn_app_as;

#[tokio::test]
async fn student_dashboard_goes_through_the_student_record() {
    let app = spawn_app_as(json!({"id": 9, "role": "STUDENT"})).await;
    app.mount_get("/api/users/9", json!({"data": {"id": 9, "student": {"id": 31}}}))
        .await;
    app.mount_get(
        "/api/students/31/dashboard",
        json!({"data": {"attendance_percentage": 94.5}}),
    )
    .await;

    let dashboard = load_dashboard(&app.api, &app.session).await.unwrap();

    assert_eq!(
        dashboard,
        Dashboard::Student {
            student_id: "31".to_string(),
            data: json!({"data": {"attendance_percentage": 94.5}}),
        }
    );
}

#[tokio::test]
async fn student_without_record_gets_a_session_error() {
    let app = spawn_app_as(json!({"id": 9, "role": {"name": "student"}})).await;
    app.mount_get("/api/users/9", json!({"data": {"id": 9}})).await;

    let error = load_dashboard(&app.api, &app.session).await.unwrap_err();

    assert_eq!(error.error_type, AppErrorType::SessionError);
    assert_eq!(error.message(), "No student record is linked to this account");
}

#[tokio::test]
async fn teacher_dashboard_uses_the_user_id() {
    let app = spawn_app_as(json!({"user_id": "15", "role": "teacher"})).await;
    app.mount_get("/api/teachers/15/dashboard", json!({"classes": []})).await;

    let dashboard = load_dashboard(&app.api, &app.session).await.unwrap();

    assert_eq!(dashboard.role().as_str(), "teacher");
}

#[tokio::test]
async fn principal_lands_on_the_admin_console_without_requests() {
    let app = spawn_app_as(json!({"id": 2, "role": "PRINCIPAL"})).await;

    let dashboard = load_dashboard(&app.api, &app.session).await.unwrap();

    assert!(matches!(dashboard, Dashboard::Admin { .. }));
    assert!(app.server.received_requests().await.unwrap_or_default().is_empty());
}
