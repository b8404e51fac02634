use std::net::SocketAddr;
use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::{json, Value};
use service::repository::memory::MemoryStore;
use service::services::Services;
use tokio::net::TcpListener;

struct TestApp {
    base_url: String,
    client: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String { format!("{}{}", self.base_url, path) }

    async fn post(&self, path: &str, body: Value) -> anyhow::Result<(StatusCode, Value)> {
        let res = self.client.post(self.url(path)).json(&body).send().await?;
        let status = res.status();
        Ok((status, res.json().await?))
    }

    async fn put(&self, path: &str, body: Value) -> anyhow::Result<(StatusCode, Value)> {
        let res = self.client.put(self.url(path)).json(&body).send().await?;
        let status = res.status();
        Ok((status, res.json().await?))
    }

    async fn get(&self, path: &str) -> anyhow::Result<(StatusCode, Value)> {
        let res = self.client.get(self.url(path)).send().await?;
        let status = res.status();
        Ok((status, res.json().await?))
    }

    async fn delete(&self, path: &str) -> anyhow::Result<StatusCode> {
        Ok(self.client.delete(self.url(path)).send().await?.status())
    }
}

async fn start_server() -> anyhow::Result<TestApp> {
    let services = Services::from_store(Arc::new(MemoryStore::new()));
    let app = server::startup::app(services);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            eprintln!("server error: {}", e);
        }
    });
    Ok(TestApp { base_url: format!("http://{}:{}", addr.ip(), addr.port()), client: reqwest::Client::new() })
}

/// Lima with Miraflores, plus a Courier role. Returns (department, city, role) ids.
async fn seed(app: &TestApp) -> anyhow::Result<(i64, i64, i64)> {
    let (_, dept) = app.post("/api/departments", json!({"name": "Lima"})).await?;
    let dept_id = dept["id"].as_i64().unwrap();
    let (_, city) = app.post("/api/cities", json!({"name": "Miraflores", "departmentId": dept_id})).await?;
    let (_, role) = app.post("/api/roles", json!({"name": "Courier"})).await?;
    Ok((dept_id, city["id"].as_i64().unwrap(), role["id"].as_i64().unwrap()))
}

#[tokio::test]
async fn health_is_ok() -> anyhow::Result<()> {
    let app = start_server().await?;
    let (status, body) = app.get("/health").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn user_lifecycle_over_http() -> anyhow::Result<()> {
    let app = start_server().await?;
    let (dept_id, city_id, role_id) = seed(&app).await?;

    let (status, user) = app
        .post(
            "/api/users",
            json!({
                "name": "Maria Lopez",
                "email": "maria@example.com",
                "cityId": city_id,
                "departmentId": dept_id,
                "roleId": role_id
            }),
        )
        .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["cityId"], city_id);
    assert_eq!(user["cityName"], "Miraflores");
    assert_eq!(user["departmentName"], "Lima");
    assert_eq!(user["registeredOn"], chrono::Utc::now().date_naive().to_string());
    let user_id = user["id"].as_i64().unwrap();

    let (status, updated) = app
        .put(&format!("/api/users/{user_id}"), json!({"phone": "+51987654321", "addressDetail": "Av. Larco 123"}))
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["phone"], "+51987654321");
    assert_eq!(updated["email"], "maria@example.com");

    let (_, cleared) = app.put(&format!("/api/users/{user_id}"), json!({"phone": null})).await?;
    assert!(cleared["phone"].is_null());
    assert_eq!(cleared["addressDetail"], "Av. Larco 123");

    let (status, page) = app.get("/api/users?q=maria&page=0&size=5").await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalElements"], 1);
    assert_eq!(page["size"], 5);

    let (_, by_city) = app.get(&format!("/api/cities/{city_id}/users")).await?;
    assert_eq!(by_city["content"][0]["id"], user_id);

    assert_eq!(app.delete(&format!("/api/cities/{city_id}")).await?, StatusCode::CONFLICT);
    assert_eq!(app.delete(&format!("/api/users/{user_id}")).await?, StatusCode::NO_CONTENT);
    assert_eq!(app.delete(&format!("/api/users/{user_id}")).await?, StatusCode::NOT_FOUND);

    let (status, _) = app.get(&format!("/api/users/{user_id}")).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn errors_map_to_statuses() -> anyhow::Result<()> {
    let app = start_server().await?;
    let (dept_id, city_id, role_id) = seed(&app).await?;
    let (_, cusco) = app.post("/api/departments", json!({"name": "Cusco"})).await?;

    let base = json!({
        "name": "Juan Perez",
        "email": "juan@example.com",
        "cityId": city_id,
        "departmentId": dept_id,
        "roleId": role_id
    });
    let (status, _) = app.post("/api/users", base.clone()).await?;
    assert_eq!(status, StatusCode::CREATED);

    let mut duplicate = base.clone();
    duplicate["email"] = json!("JUAN@EXAMPLE.COM");
    let (status, body) = app.post("/api/users", duplicate).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["errors"][0]["status"], 409);

    let mut mismatch = base.clone();
    mismatch["email"] = json!("other@example.com");
    mismatch["departmentId"] = cusco["id"].clone();
    let (status, body) = app.post("/api/users", mismatch).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["errors"][0]["title"], "Validation Error");

    let mut unknown = base.clone();
    unknown["email"] = json!("ghost@example.com");
    unknown["roleId"] = json!(999);
    let (status, _) = app.post("/api/users", unknown).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.put("/api/departments/999", json!({"name": "Nowhere"})).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn department_listings() -> anyhow::Result<()> {
    let app = start_server().await?;
    let (dept_id, _, _) = seed(&app).await?;
    app.post("/api/cities", json!({"name": "Barranco", "departmentId": dept_id})).await?;

    let (_, cities) = app.get(&format!("/api/departments/{dept_id}/cities")).await?;
    let names: Vec<_> = cities["content"].as_array().unwrap().iter().map(|c| c["name"].as_str().unwrap().to_string()).collect();
    assert_eq!(names, ["Barranco", "Miraflores"]);
    assert_eq!(cities["content"][0]["departmentName"], "Lima");

    let (_, none) = app.get("/api/departments?q=zzz").await?;
    assert_eq!(none["totalElements"], 0);
    assert_eq!(none["content"].as_array().unwrap().len(), 0);

    assert_eq!(app.delete(&format!("/api/departments/{dept_id}")).await?, StatusCode::CONFLICT);
    Ok(())
}
