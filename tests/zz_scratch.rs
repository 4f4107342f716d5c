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

async fn setup() -> Result<(TestServer, TempDir)> {
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
    Ok((TestServer::new(app)?, dir))
}

fn bearer(token: &str) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("authorization"),
        HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
    )
}

#[tokio::test]
async fn scratch() -> Result<()> {
    let (server, _dir) = setup().await?;
    let response = server
        .post("/api/v1/auth/register")
        .json(&json!({"name":"T","email":"pm@example.com","password":"hunter2-secret","role":"member"}))
        .await;
    let response = server
        .post("/api/v1/auth/login")
        .form(&[("username", "pm@example.com"), ("password", "hunter2-secret")])
        .await;
    let body: Value = response.json();
    let token = body["access_token"].as_str().unwrap().to_string();

    let (n, v) = bearer(&token);
    let r = server.post("/api/v1/projects").add_header(n, v).json(&json!({"title":"Test API Project"})).await;
    println!("CREATE status={} body={}", r.status_code(), r.text());

    let (n, v) = bearer(&token);
    let r = server.get("/api/v1/projects?status=planning").add_header(n, v).await;
    println!("INLINE status={} body={:?}", r.status_code(), r.text());

    let (n, v) = bearer(&token);
    let r = server.get("/api/v1/projects").add_query_param("status", "planning").add_header(n, v).await;
    println!("QUERYPARAM status={} body={:?}", r.status_code(), r.text());

    let (n, v) = bearer(&token);
    let r = server.get("/api/v1/projects").add_header(n, v).await;
    println!("NOQUERY status={} body={:?}", r.status_code(), r.text());
    Ok(())
}
