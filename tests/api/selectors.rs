use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use school_console::forms::{EntityKind, FormController};
use school_console::loader::{LoadState, SelectorView};

use crate::helpers::spawn_app;

#[tokio::test]
async fn parent_form_without_parent_users_explains_empty_list() {
    let app = spawn_app().await;
    app.mount_schools().await;
    app.mount_get("/api/users/school/3/PARENT", json!({"data": []})).await;

    let mut form = FormController::new(EntityKind::Parent, 50);
    form.open(&app.api).await;
    form.input(&app.api, "school_id", "3").await.unwrap();

    let users = form.options("user_id").unwrap();
    assert_eq!(users.state(), LoadState::Ready);
    assert_eq!(
        users.view(),
        SelectorView::Empty("No parent users available for this school")
    );
}

#[tokio::test]
async fn failed_user_fetch_becomes_empty_list() {
    let app = spawn_app().await;
    app.mount_schools().await;
    Mock::given(method("GET"))
        .and(path("/api/users/school/3/STUDENT"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "db down"})))
        .mount(&app.server)
        .await;

    let mut form = FormController::new(EntityKind::Student, 50);
    form.open(&app.api).await;
    form.input(&app.api, "school_id", "3").await.unwrap();

    let users = form.options("user_id").unwrap();
    assert_eq!(users.state(), LoadState::Ready);
    assert!(users.items().is_empty());
}

#[tokio::test]
async fn tab_activation_fetches_schools_once() {
    let app = spawn_app().await;
    Mock::given(method("GET"))
        .and(path("/api/schools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 3, "name": "DPS"}])))
        .expect(1)
        .mount(&app.server)
        .await;

    let mut form = FormController::new(EntityKind::Branch, 50);
    form.open(&app.api).await;
    form.open(&app.api).await;

    let schools = form.options("school_id").unwrap();
    assert_eq!(schools.items().len(), 1);
    assert_eq!(schools.items()[0].id, "3");
}

#[tokio::test]
async fn changing_school_refetches_and_clears_dependents() {
    let app = spawn_app().await;
    app.mount_schools().await;
    app.mount_get("/api/users/school/3/PARENT", json!({"data": [{"id": 21}]})).await;
    app.mount_get("/api/users/school/3/STUDENT", json!({"data": [{"id": 42}]})).await;
    app.mount_get("/api/users/school/4/PARENT", json!({"data": [{"id": 22}]})).await;
    app.mount_get("/api/users/school/4/STUDENT", json!({"data": []})).await;

    let mut form = FormController::new(EntityKind::Relationship, 50);
    form.open(&app.api).await;
    form.input(&app.api, "school_id", "3").await.unwrap();
    form.input(&app.api, "parent_user_id", "21").await.unwrap();
    form.input(&app.api, "student_user_id", "42").await.unwrap();

    form.input(&app.api, "school_id", "4").await.unwrap();

    assert_eq!(form.draft().text("parent_user_id"), Some(""));
    assert_eq!(form.draft().text("student_user_id"), Some(""));
    assert!(form.options("parent_user_id").unwrap().contains("22"));
    assert_eq!(
        form.options("student_user_id").unwrap().view(),
        SelectorView::Empty("No student users available for this school")
    );
}

#[tokio::test]
async fn schools_load_page_by_page() {
    let app = spawn_app().await;
    let page_of = |ids: std::ops::RangeInclusive<u32>| {
        json!({"data": ids.map(|id| json!({"id": id, "school_name": format!("School {}", id)})).collect::<Vec<_>>()})
    };
    Mock::given(method("GET"))
        .and(path("/api/schools"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(1..=50)))
        .expect(1)
        .mount(&app.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/schools"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_of(51..=60)))
        .expect(1)
        .mount(&app.server)
        .await;

    let mut form = FormController::new(EntityKind::Branch, 50);
    form.open(&app.api).await;
    assert!(form.options("school_id").unwrap().has_more());

    form.load_remaining(&app.api, "school_id").await;
    let schools = form.options("school_id").unwrap();
    assert_eq!(schools.items().len(), 60);
    assert!(!schools.has_more());
}
