//! API integration tests
//!
//! End-to-end tests for the REST endpoints: auth, project CRUD, phases,
//! the phase detail tree, tasks, members, notes, and budget.

use anyhow::Result;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tempfile::TempDir;

use trellis::config::Config;
use trellis::database::migrations::Migrator;
use trellis::server::app::create_app;

/// Create a test server backed by a throwaway sqlite file. The TempDir
/// keeps both the database and the upload dir alive for the test.
async fn setup_test_server() -> Result<(TestServer, TempDir)> {
    let dir = TempDir::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());

    let db = Database::connect(&db_url).await?;
    Migrator::up(&db, None).await?;

    let config = Config {
        jwt_secret: "test-secret".to_string(),
        token_expiry_minutes: 60,
        upload_dir: dir.path().join("uploads"),
    };
    let app = create_app(db, config, Some("*")).await?;
    let server = TestServer::new(app)?;

    Ok((server, dir))
}

/// Register a user and log in, returning a bearer token.
async fn auth_token(server: &TestServer, email: &str, role: &str) -> Result<String> {
    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({
            "name": "Test User",
            "email": email,
            "password": "hunter2-secret",
            "role": role,
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let response = server
        .post("/api/v1/auth/login")
        .form(&[("username", email), ("password", "hunter2-secret")])
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    Ok(body["access_token"].as_str().unwrap().to_string())
}

fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    )
}

async fn create_project(server: &TestServer, token: &str, title: &str) -> Value {
    let (name, value) = bearer(token);
    let response = server
        .post("/api/v1/projects")
        .add_header(name, value)
        .json(&json!({ "title": title }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json()
}

async fn create_phase(server: &TestServer, token: &str, project_id: i64, name: &str) -> Value {
    let (hname, hvalue) = bearer(token);
    let response = server
        .post(&format!("/api/v1/projects/{project_id}/phases"))
        .add_header(hname, hvalue)
        .json(&json!({ "name": name }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    response.json()
}

#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let response = server.get("/health").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["service"], "trellis-server");
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_register_and_login() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({
            "name": "Alex",
            "email": "alex@example.com",
            "password": "long-enough-password",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let user: Value = response.json();
    assert_eq!(user["email"], "alex@example.com");
    assert_eq!(user["role"], "member");
    assert!(user.get("password_hash").is_none());

    // duplicate email is rejected
    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({
            "name": "Alex Again",
            "email": "alex@example.com",
            "password": "another-password",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // wrong password is a 401
    let response = server
        .post("/api/v1/auth/login")
        .form(&[("username", "alex@example.com"), ("password", "wrong")])
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let response = server
        .post("/api/v1/auth/login")
        .form(&[
            ("username", "alex@example.com"),
            ("password", "long-enough-password"),
        ])
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["token_type"], "bearer");
    assert!(body["access_token"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_requests_without_token_are_rejected() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let response = server.get("/api/v1/projects").await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    let (name, value) = bearer("not-a-real-token");
    let response = server
        .get("/api/v1/projects")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn test_projects_crud_api() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let token = auth_token(&server, "pm@example.com", "member").await?;

    let project = create_project(&server, &token, "Test API Project").await;
    let project_id = project["id"].as_i64().unwrap();
    assert_eq!(project["title"], "Test API Project");
    assert_eq!(project["status"], "Planning");
    assert_eq!(project["priority"], "Normal");
    assert_eq!(project["progress"], 0);

    // list shows the caller's project
    let (name, value) = bearer(&token);
    let response = server.get("/api/v1/projects").add_header(name, value).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let projects: Vec<Value> = response.json();
    assert_eq!(projects.len(), 1);
    assert_eq!(projects[0]["id"], project_id);

    // status filter is case-insensitive
    let (name, value) = bearer(&token);
    let response = server
        .get("/api/v1/projects?status=planning")
        .add_header(name, value)
        .await;
    let projects: Vec<Value> = response.json();
    assert_eq!(projects.len(), 1);

    let (name, value) = bearer(&token);
    let response = server
        .get("/api/v1/projects?status=closed")
        .add_header(name, value)
        .await;
    let projects: Vec<Value> = response.json();
    assert!(projects.is_empty());

    // unknown status is a 400
    let (name, value) = bearer(&token);
    let response = server
        .get("/api/v1/projects?status=underway")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // partial update
    let (name, value) = bearer(&token);
    let response = server
        .patch(&format!("/api/v1/projects/{project_id}"))
        .add_header(name, value)
        .json(&json!({ "status": "executing", "priority": "High" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["status"], "Executing");
    assert_eq!(updated["priority"], "High");
    assert_eq!(updated["title"], "Test API Project");

    // delete then 404
    let (name, value) = bearer(&token);
    let response = server
        .delete(&format!("/api/v1/projects/{project_id}"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let (name, value) = bearer(&token);
    let response = server
        .get(&format!("/api/v1/projects/{project_id}"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_project_access_policy() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let owner = auth_token(&server, "owner@example.com", "member").await?;
    let outsider = auth_token(&server, "outsider@example.com", "member").await?;
    let admin = auth_token(&server, "admin@example.com", "admin").await?;

    let project = create_project(&server, &owner, "Private Project").await;
    let project_id = project["id"].as_i64().unwrap();

    // an unrelated user cannot read it
    let (name, value) = bearer(&outsider);
    let response = server
        .get(&format!("/api/v1/projects/{project_id}"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);

    // an admin can
    let (name, value) = bearer(&admin);
    let response = server
        .get(&format!("/api/v1/projects/{project_id}"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    // unknown project is 404 before any 403
    let (name, value) = bearer(&outsider);
    let response = server
        .get("/api/v1/projects/99999")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_phases_crud_and_reorder() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let token = auth_token(&server, "phases@example.com", "member").await?;

    let project = create_project(&server, &token, "Phase Project").await;
    let project_id = project["id"].as_i64().unwrap();

    let design = create_phase(&server, &token, project_id, "Design").await;
    let build = create_phase(&server, &token, project_id, "Build").await;
    assert_eq!(design["sort_order"], 1);
    assert_eq!(build["sort_order"], 2);
    assert_eq!(design["status"], "not_started");

    // invalid status is rejected
    let (name, value) = bearer(&token);
    let response = server
        .post(&format!("/api/v1/projects/{project_id}/phases"))
        .add_header(name, value)
        .json(&json!({ "name": "Bogus", "status": "finished" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // reorder must cover exactly the project's phases
    let (name, value) = bearer(&token);
    let response = server
        .post(&format!("/api/v1/projects/{project_id}/phases/reorder"))
        .add_header(name, value)
        .json(&json!({ "ordered_ids": [design["id"]] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let (name, value) = bearer(&token);
    let response = server
        .post(&format!("/api/v1/projects/{project_id}/phases/reorder"))
        .add_header(name, value)
        .json(&json!({ "ordered_ids": [build["id"], design["id"]] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let (name, value) = bearer(&token);
    let response = server
        .get(&format!("/api/v1/projects/{project_id}/phases"))
        .add_header(name, value)
        .await;
    let phases: Vec<Value> = response.json();
    assert_eq!(phases[0]["name"], "Build");
    assert_eq!(phases[1]["name"], "Design");

    // delete one
    let (name, value) = bearer(&token);
    let response = server
        .delete(&format!(
            "/api/v1/projects/{project_id}/phases/{}",
            build["id"]
        ))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let (name, value) = bearer(&token);
    let response = server
        .get(&format!("/api/v1/projects/{project_id}/phases"))
        .add_header(name, value)
        .await;
    let phases: Vec<Value> = response.json();
    assert_eq!(phases.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_phase_detail_tree_endpoints() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let token = auth_token(&server, "tree@example.com", "member").await?;

    let project = create_project(&server, &token, "Tree Project").await;
    let project_id = project["id"].as_i64().unwrap();
    let phase = create_phase(&server, &token, project_id, "Execution").await;
    let phase_id = phase["id"].as_i64().unwrap();

    // a container with two tasks under it, plus one root task
    let (name, value) = bearer(&token);
    let response = server
        .post("/api/v1/phase-details")
        .add_header(name, value)
        .json(&json!({
            "phase_id": phase_id,
            "title": "Groundwork",
            "item_type": "sub_phase",
        }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let group: Value = response.json();
    let group_id = group["id"].as_i64().unwrap();
    assert_eq!(group["item_type"], "sub_phase");

    for title in ["Dig", "Pour"] {
        let (name, value) = bearer(&token);
        let response = server
            .post("/api/v1/phase-details")
            .add_header(name, value)
            .json(&json!({
                "phase_id": phase_id,
                "title": title,
                "parent_id": group_id,
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::OK);
    }

    let (name, value) = bearer(&token);
    let response = server
        .post("/api/v1/phase-details")
        .add_header(name, value)
        .json(&json!({ "phase_id": phase_id, "title": "Inspect" }))
        .await;
    let inspect: Value = response.json();

    // the tree endpoint resolves parent pointers
    let (name, value) = bearer(&token);
    let response = server
        .get(&format!("/api/v1/phase-details/phase/{phase_id}/tree"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let tree: Vec<Value> = response.json();
    assert_eq!(tree.len(), 2);
    assert_eq!(tree[0]["title"], "Groundwork");
    assert_eq!(tree[0]["children"].as_array().unwrap().len(), 2);
    assert_eq!(tree[1]["title"], "Inspect");
    assert!(tree[1]["children"].as_array().unwrap().is_empty());

    // completing a child stamps completed_at
    let child_id = tree[0]["children"][0]["id"].as_i64().unwrap();
    let (name, value) = bearer(&token);
    let response = server
        .put(&format!("/api/v1/phase-details/{child_id}"))
        .add_header(name, value)
        .json(&json!({ "is_completed": true }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let updated: Value = response.json();
    assert_eq!(updated["is_completed"], true);
    assert!(updated["completed_at"].is_string());

    // un-completing clears it again
    let (name, value) = bearer(&token);
    let response = server
        .put(&format!("/api/v1/phase-details/{child_id}"))
        .add_header(name, value)
        .json(&json!({ "is_completed": false }))
        .await;
    let updated: Value = response.json();
    assert!(updated["completed_at"].is_null());

    // deleting the container removes its whole subtree
    let (name, value) = bearer(&token);
    let response = server
        .delete(&format!("/api/v1/phase-details/{group_id}"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let (name, value) = bearer(&token);
    let response = server
        .get(&format!("/api/v1/phase-details/phase/{phase_id}"))
        .add_header(name, value)
        .await;
    let flat: Vec<Value> = response.json();
    assert_eq!(flat.len(), 1);
    assert_eq!(flat[0]["id"], inspect["id"]);

    // unknown phase is a 404
    let (name, value) = bearer(&token);
    let response = server
        .get("/api/v1/phase-details/phase/99999")
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_phase_detail_notes() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let token = auth_token(&server, "detailnotes@example.com", "member").await?;

    let project = create_project(&server, &token, "Notes Project").await;
    let project_id = project["id"].as_i64().unwrap();
    let phase = create_phase(&server, &token, project_id, "Review").await;

    let (name, value) = bearer(&token);
    let response = server
        .post("/api/v1/phase-details")
        .add_header(name, value)
        .json(&json!({ "phase_id": phase["id"], "title": "Collect feedback" }))
        .await;
    let detail: Value = response.json();
    let detail_id = detail["id"].as_i64().unwrap();

    let (name, value) = bearer(&token);
    let response = server
        .post(&format!("/api/v1/phase-details/{detail_id}/notes"))
        .add_header(name, value)
        .json(&json!({ "user": "alex", "note": "waiting on vendor" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let (name, value) = bearer(&token);
    let response = server
        .get(&format!("/api/v1/phase-details/{detail_id}/notes"))
        .add_header(name, value)
        .await;
    let notes: Vec<Value> = response.json();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0]["note"], "waiting on vendor");
    assert_eq!(notes[0]["user"], "alex");

    // notes on a missing detail are a 404
    let (name, value) = bearer(&token);
    let response = server
        .post("/api/v1/phase-details/99999/notes")
        .add_header(name, value)
        .json(&json!({ "user": "alex", "note": "nope" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_tasks_crud_and_reorder() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let token = auth_token(&server, "tasks@example.com", "member").await?;

    let project = create_project(&server, &token, "Task Project").await;
    let project_id = project["id"].as_i64().unwrap();
    let phase = create_phase(&server, &token, project_id, "Sprint 1").await;
    let phase_id = phase["id"].as_i64().unwrap();

    let mut task_ids = Vec::new();
    for title in ["Write spec", "Implement", "Ship"] {
        let (name, value) = bearer(&token);
        let response = server
            .post(&format!(
                "/api/v1/projects/{project_id}/phases/{phase_id}/tasks"
            ))
            .add_header(name, value)
            .json(&json!({ "title": title }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        let task: Value = response.json();
        task_ids.push(task["id"].as_i64().unwrap());
    }

    // marking done stamps completed_at; other statuses clear it
    let (name, value) = bearer(&token);
    let response = server
        .patch(&format!("/api/v1/projects/{project_id}/tasks/{}", task_ids[0]))
        .add_header(name, value)
        .json(&json!({ "status": "done" }))
        .await;
    let task: Value = response.json();
    assert_eq!(task["status"], "done");
    assert!(task["completed_at"].is_string());

    let (name, value) = bearer(&token);
    let response = server
        .patch(&format!("/api/v1/projects/{project_id}/tasks/{}", task_ids[0]))
        .add_header(name, value)
        .json(&json!({ "status": "doing" }))
        .await;
    let task: Value = response.json();
    assert!(task["completed_at"].is_null());

    // unknown status rejected
    let (name, value) = bearer(&token);
    let response = server
        .patch(&format!("/api/v1/projects/{project_id}/tasks/{}", task_ids[0]))
        .add_header(name, value)
        .json(&json!({ "status": "in_progress" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // reorder
    let (name, value) = bearer(&token);
    let response = server
        .post(&format!(
            "/api/v1/projects/{project_id}/phases/{phase_id}/tasks/reorder"
        ))
        .add_header(name, value)
        .json(&json!({ "ordered_ids": [task_ids[2], task_ids[0], task_ids[1]] }))
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let (name, value) = bearer(&token);
    let response = server
        .get(&format!(
            "/api/v1/projects/{project_id}/phases/{phase_id}/tasks"
        ))
        .add_header(name, value)
        .await;
    let tasks: Vec<Value> = response.json();
    assert_eq!(tasks[0]["title"], "Ship");

    // delete
    let (name, value) = bearer(&token);
    let response = server
        .delete(&format!("/api/v1/projects/{project_id}/tasks/{}", task_ids[1]))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    Ok(())
}

#[tokio::test]
async fn test_members_and_notes() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let owner = auth_token(&server, "lead@example.com", "member").await?;
    let _other = auth_token(&server, "teammate@example.com", "member").await?;

    let project = create_project(&server, &owner, "Team Project").await;
    let project_id = project["id"].as_i64().unwrap();

    // the creator is already the owner member; the second registered user
    // has id 2
    let (name, value) = bearer(&owner);
    let response = server
        .post(&format!("/api/v1/projects/{project_id}/members"))
        .add_header(name, value)
        .json(&json!({ "user_id": 2, "role_in_project": "member" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let member: Value = response.json();
    assert_eq!(member["role_in_project"], "contributor");
    assert_eq!(member["user_email"], "teammate@example.com");

    // adding the same user again conflicts
    let (name, value) = bearer(&owner);
    let response = server
        .post(&format!("/api/v1/projects/{project_id}/members"))
        .add_header(name, value)
        .json(&json!({ "user_id": 2 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CONFLICT);

    let (name, value) = bearer(&owner);
    let response = server
        .get(&format!("/api/v1/projects/{project_id}/members"))
        .add_header(name, value)
        .await;
    let members: Vec<Value> = response.json();
    assert_eq!(members.len(), 2);

    // notes: blank content is unprocessable
    let (name, value) = bearer(&owner);
    let response = server
        .post(&format!("/api/v1/projects/{project_id}/notes"))
        .add_header(name, value)
        .json(&json!({ "content": "   " }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

    let (name, value) = bearer(&owner);
    let response = server
        .post(&format!("/api/v1/projects/{project_id}/notes"))
        .add_header(name, value)
        .json(&json!({ "content": "kickoff on monday" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let note: Value = response.json();
    assert_eq!(note["author_name"], "Test User");

    // project detail aggregates members and notes
    let (name, value) = bearer(&owner);
    let response = server
        .get(&format!("/api/v1/projects/{project_id}/detail"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let detail: Value = response.json();
    assert_eq!(detail["title"], "Team Project");
    assert_eq!(detail["members"].as_array().unwrap().len(), 2);
    assert_eq!(detail["notes"].as_array().unwrap().len(), 1);

    // note delete
    let (name, value) = bearer(&owner);
    let response = server
        .delete(&format!(
            "/api/v1/projects/{project_id}/notes/{}",
            note["id"]
        ))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    Ok(())
}

#[tokio::test]
async fn test_budget_and_expenses() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let token = auth_token(&server, "finance@example.com", "member").await?;

    let project = create_project(&server, &token, "Budget Project").await;
    let project_id = project["id"].as_i64().unwrap();

    let (name, value) = bearer(&token);
    let response = server
        .put(&format!("/api/v1/projects/{project_id}/budget"))
        .add_header(name, value)
        .json(&json!({ "total_budget": 1000.0 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let budget: Value = response.json();
    assert_eq!(budget["total_budget"], 1000.0);
    assert_eq!(budget["spent_amount"], 0.0);
    assert_eq!(budget["remaining"], 1000.0);

    // negative budget rejected
    let (name, value) = bearer(&token);
    let response = server
        .put(&format!("/api/v1/projects/{project_id}/budget"))
        .add_header(name, value)
        .json(&json!({ "total_budget": -5.0 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // expenses drive spent_amount
    let (name, value) = bearer(&token);
    let response = server
        .post(&format!("/api/v1/projects/{project_id}/expenses"))
        .add_header(name, value)
        .json(&json!({ "amount": 250.0, "note": "fixtures" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    let expense: Value = response.json();

    let (name, value) = bearer(&token);
    let response = server
        .get(&format!("/api/v1/projects/{project_id}/budget"))
        .add_header(name, value)
        .await;
    let budget: Value = response.json();
    assert_eq!(budget["spent_amount"], 250.0);
    assert_eq!(budget["remaining"], 750.0);
    assert_eq!(budget["percent_used"], 25.0);

    // zero or negative amounts rejected
    let (name, value) = bearer(&token);
    let response = server
        .post(&format!("/api/v1/projects/{project_id}/expenses"))
        .add_header(name, value)
        .json(&json!({ "amount": 0.0 }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    // deleting the expense restores spent to zero
    let (name, value) = bearer(&token);
    let response = server
        .delete(&format!(
            "/api/v1/projects/{project_id}/expenses/{}",
            expense["id"]
        ))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let (name, value) = bearer(&token);
    let response = server
        .get(&format!("/api/v1/projects/{project_id}/budget"))
        .add_header(name, value)
        .await;
    let budget: Value = response.json();
    assert_eq!(budget["spent_amount"], 0.0);

    Ok(())
}

#[tokio::test]
async fn test_files_listing_and_missing_file() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;
    let token = auth_token(&server, "files@example.com", "member").await?;

    let project = create_project(&server, &token, "File Project").await;
    let project_id = project["id"].as_i64().unwrap();

    let (name, value) = bearer(&token);
    let response = server
        .get(&format!("/api/v1/projects/{project_id}/files"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let files: Vec<Value> = response.json();
    assert!(files.is_empty());

    let (name, value) = bearer(&token);
    let response = server
        .get(&format!("/api/v1/projects/{project_id}/files/12345"))
        .add_header(name, value)
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_cors_headers() -> Result<()> {
    let (server, _dir) = setup_test_server().await?;

    let response = server
        .get("/health")
        .add_header(
            HeaderName::from_static("origin"),
            HeaderValue::from_static("http://localhost:3001"),
        )
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let headers = response.headers();
    assert!(headers.get("access-control-allow-origin").is_some());

    Ok(())
}
