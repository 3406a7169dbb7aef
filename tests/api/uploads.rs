use claim::{assert_none, assert_some};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use school_console::api::UploadFile;
use school_console::notify::Notification;
use school_console::uploads::{AutoConfirm, UploadController, UploadKind, UploadOutcome};

use crate::helpers::{spawn_app, TestApp};

fn csv(name: &str) -> UploadFile {
    UploadFile {
        file_name: name.to_string(),
        bytes: b"admission_number,date,status\nADM-1,2024-03-01,P\n".to_vec(),
    }
}

async fn mount_post(app: &TestApp, route: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("POST"))
        .and(path(route))
        .respond_with(response)
        .expect(times)
        .mount(&app.server)
        .await;
}

#[tokio::test]
async fn simple_upload_reports_counts_and_clears_file() {
    let app = spawn_app().await;
    mount_post(
        &app,
        "/api/attendance/upload",
        ResponseTemplate::new(200)
            .set_body_json(json!({"total_count": 3, "success_count": 3, "failed_count": 0})),
        1,
    )
    .await;

    let mut upload = UploadController::new(UploadKind::Attendance);
    upload.select(csv("march.CSV"));
    let outcome = upload.run(&app.api, &AutoConfirm(true), &app.notifications).await;

    let UploadOutcome::Completed { summary, .. } = outcome else {
        panic!("expected completed upload, got {:?}", outcome);
    };
    assert_eq!(summary.message, "Upload complete. Total: 3, Success: 3, Failed: 0");
    assert_none!(upload.selected());
    assert!(!upload.is_uploading());
    assert_eq!(
        app.notifications.last(),
        Some(Notification::success("Upload complete. Total: 3, Success: 3, Failed: 0"))
    );

    let body = app.sent_text("/api/attendance/upload").await;
    assert!(body.contains(r#"name="file"; filename="march.CSV""#));
}

#[tokio::test]
async fn failed_upload_keeps_file_for_retry() {
    let app = spawn_app().await;
    mount_post(
        &app,
        "/api/bulk-upload/families",
        ResponseTemplate::new(400).set_body_json(json!({"message": "Missing column: parent_phone"})),
        1,
    )
    .await;

    let mut upload = UploadController::new(UploadKind::Families);
    upload.select(csv("families.xlsx"));
    let outcome = upload.run(&app.api, &AutoConfirm(true), &app.notifications).await;

    assert_eq!(
        outcome,
        UploadOutcome::Failed {
            message: "Missing column: parent_phone".to_string()
        }
    );
    assert_some!(upload.selected());
    assert!(!upload.is_uploading());
}

#[tokio::test]
async fn partial_batch_is_a_warning() {
    let app = spawn_app().await;
    mount_post(
        &app,
        "/api/upload/student_enrollments",
        ResponseTemplate::new(200).set_body_json(json!({
            "total": 4,
            "success": 3,
            "failed": 1,
            "errors": [{"row": 3, "error": "Unknown class"}]
        })),
        1,
    )
    .await;

    let mut upload = UploadController::new(UploadKind::StudentEnrollments);
    upload.select(csv("enrollments.csv"));
    upload.run(&app.api, &AutoConfirm(true), &app.notifications).await;

    assert_eq!(
        app.notifications.last(),
        Some(Notification::warning(
            "Upload complete. Total: 4, Success: 3, Failed: 1\nRow 3: Unknown class"
        ))
    );
    assert_none!(upload.selected());
}

#[tokio::test]
async fn wrong_extension_is_rejected_without_a_request() {
    let app = spawn_app().await;
    let mut upload = UploadController::new(UploadKind::Attendance);
    upload.select(csv("march.pdf"));

    let outcome = upload.run(&app.api, &AutoConfirm(true), &app.notifications).await;

    assert_eq!(
        outcome,
        UploadOutcome::Rejected {
            message: "Invalid file type. Allowed: .csv, .xlsx, .xls".to_string()
        }
    );
    assert!(app.server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn question_papers_accept_documents() {
    let app = spawn_app().await;
    mount_post(
        &app,
        "/api/question-papers/upload",
        ResponseTemplate::new(201).set_body_json(json!({"message": "Question paper uploaded"})),
        1,
    )
    .await;

    let mut upload = UploadController::new(UploadKind::QuestionPapers);
    upload.select(csv("maths-term1.docx"));
    upload.run(&app.api, &AutoConfirm(true), &app.notifications).await;

    assert_eq!(
        app.notifications.last(),
        Some(Notification::success("Question paper uploaded"))
    );
}

#[tokio::test]
async fn report_cards_send_their_form_fields() {
    let app = spawn_app().await;
    mount_post(
        &app,
        "/api/report-cards/upload-csv",
        ResponseTemplate::new(200).set_body_json(json!({"success_count": 30})),
        1,
    )
    .await;

    let mut upload = UploadController::new(UploadKind::ReportCards);
    upload.select(csv("term1.csv"));
    upload.set_extra("schoolId", "3").unwrap();
    upload.set_extra("yearId", "2024").unwrap();
    upload.set_extra("term", "TERM_1").unwrap();
    let outcome = upload.run(&app.api, &AutoConfirm(true), &app.notifications).await;
    assert!(matches!(outcome, UploadOutcome::Completed { .. }), "{:?}", outcome);

    let body = app.sent_text("/api/report-cards/upload-csv").await;
    for field in ["schoolId", "yearId", "term"] {
        assert!(body.contains(&format!(r#"name="{}""#, field)), "missing {}", field);
    }
    assert!(body.contains("TERM_1"));
}

#[tokio::test]
async fn school_setup_cancel_commits_nothing() {
    let app = spawn_app().await;
    mount_post(
        &app,
        "/api/unified-setup/validate",
        ResponseTemplate::new(200).set_body_json(json!({
            "status": "valid",
            "message": "File looks good",
            "total_rows": 12,
            "errors": []
        })),
        1,
    )
    .await;
    mount_post(&app, "/api/unified-setup/upload", ResponseTemplate::new(200), 0).await;

    let mut upload = UploadController::new(UploadKind::SchoolSetup);
    upload.select(csv("setup.csv"));
    let outcome = upload.run(&app.api, &AutoConfirm(false), &app.notifications).await;

    let UploadOutcome::Cancelled { preview } = outcome else {
        panic!("expected cancellation, got {:?}", outcome);
    };
    assert_eq!(preview.status, "valid");
    assert_eq!(preview.counts.total, Some(12));
    assert_some!(upload.selected());
    assert!(!upload.is_uploading());

    let body = app.sent_text("/api/unified-setup/validate").await;
    assert!(body.contains(r#"name="csvFile"; filename="setup.csv""#));
}

#[tokio::test]
async fn school_setup_confirm_commits_the_same_file() {
    let app = spawn_app().await;
    mount_post(
        &app,
        "/api/unified-setup/validate",
        ResponseTemplate::new(200).set_body_json(json!({"status": "valid", "total_rows": 2})),
        1,
    )
    .await;
    mount_post(
        &app,
        "/api/unified-setup/upload",
        ResponseTemplate::new(200).set_body_json(json!({"total_rows": 2, "valid_rows": 2, "invalid_rows": 0})),
        1,
    )
    .await;

    let mut upload = UploadController::new(UploadKind::SchoolSetup);
    upload.select(csv("setup.csv"));
    let outcome = upload.run(&app.api, &AutoConfirm(true), &app.notifications).await;

    assert!(matches!(outcome, UploadOutcome::Completed { .. }), "{:?}", outcome);
    let validated = app.sent_text("/api/unified-setup/validate").await;
    let committed = app.sent_text("/api/unified-setup/upload").await;
    assert!(validated.contains("ADM-1,2024-03-01,P"));
    assert!(committed.contains("ADM-1,2024-03-01,P"));
    assert_none!(upload.selected());
}

#[tokio::test]
async fn school_setup_validation_failure_stops_before_commit() {
    let app = spawn_app().await;
    mount_post(
        &app,
        "/api/unified-setup/validate",
        ResponseTemplate::new(422).set_body_json(json!({"error": "Sheet 'Schools' is missing"})),
        1,
    )
    .await;
    mount_post(&app, "/api/unified-setup/upload", ResponseTemplate::new(200), 0).await;

    let mut upload = UploadController::new(UploadKind::SchoolSetup);
    upload.select(csv("setup.xls"));
    let outcome = upload.run(&app.api, &AutoConfirm(true), &app.notifications).await;

    assert_eq!(
        outcome,
        UploadOutcome::Failed {
            message: "Sheet 'Schools' is missing".to_string()
        }
    );
    assert_some!(upload.selected());
}
