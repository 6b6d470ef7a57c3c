mod common;

use chrono::{Duration, Utc};
use serde_json::Value;

async fn post_json(base_url: &str, path: &str, body: Value) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{}{}", base_url, path))
        .json(&body)
        .send()
        .await
        .expect("post")
}

async fn get_json(base_url: &str, path: &str) -> Value {
    reqwest::Client::new()
        .get(format!("{}{}", base_url, path))
        .send()
        .await
        .expect("get")
        .json()
        .await
        .expect("parse json")
}

fn document_form(dept_id: &str, title: &str, date: &str) -> reqwest::multipart::Form {
    reqwest::multipart::Form::new()
        .text("deptId", dept_id.to_string())
        .text("title", title.to_string())
        .text("date", date.to_string())
}

async fn create_document(base_url: &str, form: reqwest::multipart::Form) -> Value {
    let resp = reqwest::Client::new()
        .post(format!("{}/api/v1/documents", base_url))
        .multipart(form)
        .send()
        .await
        .expect("create document");
    assert_eq!(resp.status(), 201);
    resp.json().await.expect("parse document response")
}

#[tokio::test]
async fn health_endpoint_responds() {
    let server = common::TestServer::start().await;

    let body = reqwest::get(format!("{}/health", server.base_url))
        .await
        .expect("health")
        .text()
        .await
        .expect("health body");
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn department_crud_and_soft_delete() {
    let server = common::TestServer::start().await;
    let base = &server.base_url;

    let resp = post_json(
        base,
        "/api/v1/departments",
        serde_json::json!({"name": "Quality Assurance", "year": 2024}),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let created: Value = resp.json().await.expect("parse");
    // Slug: uppercased, whitespace stripped, truncated to 12 chars
    assert_eq!(created["data"]["id"], "QUALITYASSUR");
    assert_eq!(created["data"]["active"], true);

    let listed = get_json(base, "/api/v1/departments").await;
    assert_eq!(listed["data"].as_array().expect("array").len(), 1);

    let years = get_json(base, "/api/v1/departments/years").await;
    assert_eq!(years["data"], serde_json::json!([2024]));

    let resp = reqwest::Client::new()
        .patch(format!("{}/api/v1/departments/QUALITYASSUR", base))
        .json(&serde_json::json!({"name": "QA", "year": 2025, "active": true}))
        .send()
        .await
        .expect("update");
    assert_eq!(resp.status(), 200);
    let updated: Value = resp.json().await.expect("parse");
    assert_eq!(updated["data"]["name"], "QA");
    assert_eq!(updated["data"]["year"], 2025);

    let resp = reqwest::Client::new()
        .delete(format!("{}/api/v1/departments/QUALITYASSUR", base))
        .send()
        .await
        .expect("delete");
    assert_eq!(resp.status(), 204);

    // Soft deleted: gone from listings
    let listed = get_json(base, "/api/v1/departments").await;
    assert!(listed["data"].as_array().expect("array").is_empty());

    let resp = reqwest::Client::new()
        .delete(format!("{}/api/v1/departments/MISSING", base))
        .send()
        .await
        .expect("delete missing");
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn department_upsert_reactivates_and_keeps_year() {
    let server = common::TestServer::start().await;
    let base = &server.base_url;

    post_json(
        base,
        "/api/v1/departments",
        serde_json::json!({"name": "QA", "year": 2023}),
    )
    .await;

    reqwest::Client::new()
        .delete(format!("{}/api/v1/departments/QA", base))
        .send()
        .await
        .expect("delete");

    // Re-adding without a year reactivates the row and keeps the old year
    let resp = post_json(base, "/api/v1/departments", serde_json::json!({"name": "QA"})).await;
    let body: Value = resp.json().await.expect("parse");
    assert_eq!(body["data"]["active"], true);
    assert_eq!(body["data"]["year"], 2023);
}

#[tokio::test]
async fn group_slug_uses_underscores() {
    let server = common::TestServer::start().await;

    let resp = post_json(
        &server.base_url,
        "/api/v1/groups",
        serde_json::json!({"name": "Protap 2024"}),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.expect("parse");
    assert_eq!(body["data"]["id"], "PROTAP_2024");
}

#[tokio::test]
async fn document_create_normalizes_date_and_autocreates_department() {
    let server = common::TestServer::start().await;
    let base = &server.base_url;

    create_document(base, document_form("QA", "Protap 1", "01/01/2024")).await;

    let listed = get_json(base, "/api/v1/documents?dept=QA").await;
    let docs = listed["data"].as_array().expect("array");
    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0]["title"], "Protap 1");
    assert_eq!(docs[0]["has_file"], false);
    assert!(
        docs[0]["created_at"]
            .as_str()
            .expect("created_at")
            .starts_with("2024-01-01")
    );

    // The referenced department was created on first use
    let depts = get_json(base, "/api/v1/departments").await;
    let ids: Vec<&str> = depts["data"]
        .as_array()
        .expect("array")
        .iter()
        .map(|d| d["id"].as_str().expect("id"))
        .collect();
    assert_eq!(ids, vec!["QA"]);
}

#[tokio::test]
async fn document_create_requires_dept_and_title() {
    let server = common::TestServer::start().await;
    let base = &server.base_url;

    let resp = reqwest::Client::new()
        .post(format!("{}/api/v1/documents", base))
        .multipart(reqwest::multipart::Form::new().text("title", "No dept"))
        .send()
        .await
        .expect("post");
    assert_eq!(resp.status(), 400);

    let resp = reqwest::Client::new()
        .post(format!("{}/api/v1/documents", base))
        .multipart(reqwest::multipart::Form::new().text("deptId", "QA"))
        .send()
        .await
        .expect("post");
    assert_eq!(resp.status(), 400);

    // Nothing was written
    let listed = get_json(base, "/api/v1/documents?dept=QA").await;
    assert!(listed["data"].as_array().expect("array").is_empty());
}

#[tokio::test]
async fn due_date_drives_overdue_flag() {
    let server = common::TestServer::start().await;
    let base = &server.base_url;

    let created = create_document(base, document_form("QA", "Audit", "2024-01-01")).await;
    let id = created["data"]["id"].as_str().expect("id").to_string();
    assert_eq!(created["data"]["overdue"], false);

    let client = reqwest::Client::new();

    let yesterday = (Utc::now() - Duration::days(1)).format("%d/%m/%Y").to_string();
    let resp = client
        .put(format!("{}/api/v1/documents/{}/due-date", base, id))
        .json(&serde_json::json!({"due_date": yesterday}))
        .send()
        .await
        .expect("set due date");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("parse");
    assert_eq!(body["data"]["overdue"], true);

    let tomorrow = (Utc::now() + Duration::days(1)).format("%Y-%m-%d").to_string();
    let resp = client
        .put(format!("{}/api/v1/documents/{}/due-date", base, id))
        .json(&serde_json::json!({"due_date": tomorrow}))
        .send()
        .await
        .expect("set due date");
    let body: Value = resp.json().await.expect("parse");
    assert_eq!(body["data"]["overdue"], false);

    // Clearing the due date clears the flag
    let resp = client
        .put(format!("{}/api/v1/documents/{}/due-date", base, id))
        .json(&serde_json::json!({"due_date": null}))
        .send()
        .await
        .expect("clear due date");
    let body: Value = resp.json().await.expect("parse");
    assert_eq!(body["data"]["overdue"], false);
    assert!(body["data"]["due_date"].is_null());
}

#[tokio::test]
async fn file_upload_and_download_round_trip() {
    let server = common::TestServer::start().await;
    let base = &server.base_url;

    let content = b"hello pdf content".to_vec();
    let form = document_form("QA", "Report", "").part(
        "file",
        reqwest::multipart::Part::bytes(content.clone())
            .file_name("report.pdf")
            .mime_str("application/pdf")
            .expect("mime"),
    );
    let created = create_document(base, form).await;
    let id = created["data"]["id"].as_str().expect("id").to_string();
    assert_eq!(created["data"]["has_file"], true);

    let resp = reqwest::get(format!("{}/api/v1/documents/{}/file", base, id))
        .await
        .expect("download");
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["content-type"].to_str().expect("header"),
        "application/pdf"
    );
    assert!(
        resp.headers()["content-disposition"]
            .to_str()
            .expect("header")
            .contains("report.pdf")
    );
    assert_eq!(
        resp.headers()["cache-control"].to_str().expect("header"),
        "private, max-age=0, must-revalidate"
    );
    let body = resp.bytes().await.expect("body");
    assert_eq!(body.to_vec(), content);

    // Documents without a blob have no file to serve
    let created = create_document(base, document_form("QA", "Linked only", "")).await;
    let bare_id = created["data"]["id"].as_str().expect("id");
    let resp = reqwest::get(format!("{}/api/v1/documents/{}/file", base, bare_id))
        .await
        .expect("download");
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn update_without_file_keeps_existing_blob() {
    let server = common::TestServer::start().await;
    let base = &server.base_url;

    let content = b"original bytes".to_vec();
    let form = document_form("QA", "Spec", "").part(
        "file",
        reqwest::multipart::Part::bytes(content.clone())
            .file_name("spec.bin")
            .mime_str("application/octet-stream")
            .expect("mime"),
    );
    let created = create_document(base, form).await;
    let id = created["data"]["id"].as_str().expect("id").to_string();

    let resp = reqwest::Client::new()
        .patch(format!("{}/api/v1/documents/{}", base, id))
        .multipart(document_form("QA", "Spec rev B", ""))
        .send()
        .await
        .expect("update");
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.expect("parse");
    assert_eq!(body["data"]["title"], "Spec rev B");
    assert_eq!(body["data"]["has_file"], true);

    let bytes = reqwest::get(format!("{}/api/v1/documents/{}/file", base, id))
        .await
        .expect("download")
        .bytes()
        .await
        .expect("body");
    assert_eq!(bytes.to_vec(), content);

    // A new file part replaces the blob
    let replacement = b"replacement".to_vec();
    let form = document_form("QA", "Spec rev C", "").part(
        "file",
        reqwest::multipart::Part::bytes(replacement.clone())
            .file_name("spec-v2.bin")
            .mime_str("application/octet-stream")
            .expect("mime"),
    );
    reqwest::Client::new()
        .patch(format!("{}/api/v1/documents/{}", base, id))
        .multipart(form)
        .send()
        .await
        .expect("update");

    let bytes = reqwest::get(format!("{}/api/v1/documents/{}/file", base, id))
        .await
        .expect("download")
        .bytes()
        .await
        .expect("body");
    assert_eq!(bytes.to_vec(), replacement);
}

#[tokio::test]
async fn sheet_import_and_read_back() {
    let server = common::TestServer::start().await;
    let base = &server.base_url;

    let created = create_document(base, document_form("QA", "Checklist", "")).await;
    let id = created["data"]["id"].as_str().expect("id").to_string();

    let client = reqwest::Client::new();
    let resp = client
        .put(format!("{}/api/v1/documents/{}/sheet", base, id))
        .body("a,b\n1,2\n3,4")
        .send()
        .await
        .expect("import");
    assert_eq!(resp.status(), 200);

    let sheet = get_json(base, &format!("/api/v1/documents/{}/sheet", id)).await;
    assert_eq!(sheet["data"]["headers"], serde_json::json!(["a", "b"]));
    assert_eq!(
        sheet["data"]["rows"],
        serde_json::json!([["1", "2"], ["3", "4"]])
    );

    // Re-import replaces the previous sheet
    client
        .put(format!("{}/api/v1/documents/{}/sheet", base, id))
        .body("x\nonly")
        .send()
        .await
        .expect("reimport");
    let sheet = get_json(base, &format!("/api/v1/documents/{}/sheet", id)).await;
    assert_eq!(sheet["data"]["headers"], serde_json::json!(["x"]));

    let resp = client
        .put(format!("{}/api/v1/documents/unknown/sheet", base))
        .body("a,b")
        .send()
        .await
        .expect("import unknown");
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn comment_lifecycle_and_cascade() {
    let server = common::TestServer::start().await;
    let base = &server.base_url;

    let created = create_document(base, document_form("QA", "Checklist", "")).await;
    let id = created["data"]["id"].as_str().expect("id").to_string();
    let comments_path = format!("/api/v1/documents/{}/comments", id);

    let resp = post_json(
        base,
        &comments_path,
        serde_json::json!({"row": 0, "col": 1, "field": "qty", "comment": "check the total", "reviewer": "dina"}),
    )
    .await;
    assert_eq!(resp.status(), 201);
    let first: Value = resp.json().await.expect("parse");
    assert_eq!(first["data"]["status"], "Open");
    let first_id = first["data"]["id"].as_str().expect("id").to_string();

    post_json(
        base,
        &comments_path,
        serde_json::json!({"row": 2, "col": 0, "comment": "typo in name"}),
    )
    .await;

    // Validation happens before any write
    let resp = post_json(
        base,
        &comments_path,
        serde_json::json!({"row": -1, "col": 0, "comment": "bad row"}),
    )
    .await;
    assert_eq!(resp.status(), 400);
    let resp = post_json(
        base,
        &comments_path,
        serde_json::json!({"row": 0, "col": 0, "comment": "   "}),
    )
    .await;
    assert_eq!(resp.status(), 400);

    let listed = get_json(base, &comments_path).await;
    assert_eq!(listed["data"].as_array().expect("array").len(), 2);

    // Toggle flips to Resolved; resolved comments sort after open ones
    let resp = post_json(
        base,
        &format!("/api/v1/comments/{}/toggle", first_id),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let toggled: Value = resp.json().await.expect("parse");
    assert_eq!(toggled["data"]["status"], "Resolved");

    let listed = get_json(base, &comments_path).await;
    let statuses: Vec<&str> = listed["data"]
        .as_array()
        .expect("array")
        .iter()
        .map(|c| c["status"].as_str().expect("status"))
        .collect();
    assert_eq!(statuses, vec!["Open", "Resolved"]);

    // Toggle is involutive
    let resp = post_json(
        base,
        &format!("/api/v1/comments/{}/toggle", first_id),
        serde_json::json!({}),
    )
    .await;
    let toggled: Value = resp.json().await.expect("parse");
    assert_eq!(toggled["data"]["status"], "Open");

    // Deleting the document removes its sheet and comments
    reqwest::Client::new()
        .put(format!("{}/api/v1/documents/{}/sheet", base, id))
        .body("a\n1")
        .send()
        .await
        .expect("import");
    let resp = reqwest::Client::new()
        .delete(format!("{}/api/v1/documents/{}", base, id))
        .send()
        .await
        .expect("delete");
    assert_eq!(resp.status(), 204);

    let listed = get_json(base, &comments_path).await;
    assert!(listed["data"].as_array().expect("array").is_empty());
    let resp = reqwest::get(format!("{}/api/v1/documents/{}/sheet", base, id))
        .await
        .expect("get sheet");
    assert_eq!(resp.status(), 404);
}
