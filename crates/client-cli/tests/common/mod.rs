#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use adforge::{ApiClient, ClientConfig, CredentialStore, MemoryStore, Notice, Notifier, SessionStore};
use axum::extract::{Multipart, Path};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Form, Json, Router};
use serde_json::{json, Value};

/// Notifier that keeps every notice for later assertions
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn count(&self, notice: &Notice) -> usize {
        self.notices().iter().filter(|n| *n == notice).count()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// In-memory storage that counts purges
#[derive(Default)]
pub struct CountingStore {
    inner: MemoryStore,
    purges: AtomicUsize,
}

impl CountingStore {
    pub fn purges(&self) -> usize {
        self.purges.load(Ordering::SeqCst)
    }
}

impl CredentialStore for CountingStore {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.inner.remove(key)
    }

    fn purge(&self) -> anyhow::Result<()> {
        self.purges.fetch_add(1, Ordering::SeqCst);
        self.inner.purge()
    }
}

pub struct Harness {
    pub session: SessionStore,
    pub storage: Arc<CountingStore>,
    pub notices: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(base_url: &str) -> Self {
        Self::with_storage(base_url, Arc::new(CountingStore::default()), Duration::from_secs(5))
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        Self::with_storage(base_url, Arc::new(CountingStore::default()), timeout)
    }

    pub fn with_storage(base_url: &str, storage: Arc<CountingStore>, timeout: Duration) -> Self {
        let notices = Arc::new(RecordingNotifier::default());
        let config = ClientConfig {
            base_url: base_url.to_string(),
            timeout,
        };
        let api = ApiClient::new(config, storage.clone(), notices.clone()).unwrap();
        Self {
            session: SessionStore::new(api),
            storage,
            notices,
        }
    }

    pub fn api(&self) -> &ApiClient {
        self.session.api()
    }
}

/// Start the mock backend on an ephemeral port, returning its API base URL
pub async fn spawn_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router()).await.unwrap();
    });
    format!("http://{}/api/v1", addr)
}

/// Base URL of a port nothing listens on
pub async fn unreachable_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/api/v1", addr)
}

pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\nmock";

fn router() -> Router {
    let api = Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        .route("/auth/register", post(register))
        .route("/projects", get(list_projects).post(create_project))
        .route(
            "/projects/:id",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/projects/:id/images", get(list_images).post(upload_image))
        .route("/projects/:id/images/:image_id/primary", put(set_primary))
        .route("/admin/stats", get(rate_limited))
        .route("/content/generations", get(server_error))
        .route("/content/generations/:id", get(slow_generation))
        .route("/content/text-to-image", post(text_to_image))
        .route("/content/product-render", post(product_render));

    Router::new()
        .nest("/api/v1", api)
        .route("/static/render.png", get(static_image))
}

fn user_json(username: &str) -> Value {
    match username {
        "demo" => json!({
            "id": 1,
            "email": "demo@example.com",
            "username": "demo",
            "full_name": "Demo User",
            "is_active": true,
            "is_superuser": false,
            "created_at": "2026-01-05T14:30:00"
        }),
        other => json!({
            "id": 2,
            "email": format!("{}@example.com", other),
            "username": other,
            "is_active": true,
            "is_superuser": false
        }),
    }
}

fn detail(status: StatusCode, detail: Value) -> Response {
    (status, Json(json!({ "detail": detail }))).into_response()
}

/// Username behind a valid bearer token
fn bearer_user(headers: &HeaderMap) -> Option<String> {
    let value = headers.get("authorization")?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    let user = token.strip_prefix("tok-")?;
    matches!(user, "demo" | "newbie").then(|| user.to_string())
}

async fn login(Form(form): Form<HashMap<String, String>>) -> Response {
    let username = form.get("username").map(String::as_str).unwrap_or_default();
    let password = form.get("password").map(String::as_str).unwrap_or_default();
    match (username, password) {
        // `stale` gets a token that `/auth/me` refuses
        ("demo", "demo123") | ("newbie", "secret123") | ("stale", "stale123") => Json(json!({
            "access_token": format!("tok-{}", username),
            "token_type": "bearer"
        }))
        .into_response(),
        _ => detail(
            StatusCode::UNAUTHORIZED,
            json!("Incorrect username or password"),
        ),
    }
}

async fn me(headers: HeaderMap) -> Response {
    match bearer_user(&headers) {
        Some(user) => Json(user_json(&user)).into_response(),
        None => detail(StatusCode::UNAUTHORIZED, json!("Could not validate credentials")),
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    let username = body["username"].as_str().unwrap_or_default();
    let email = body["email"].as_str().unwrap_or_default();
    if username == "taken" {
        return detail(StatusCode::BAD_REQUEST, json!("Username already registered"));
    }
    if !email.contains('@') {
        return detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!([
                {"loc": ["body", "email"], "msg": "value is not a valid email address", "type": "value_error"},
                "password is too short"
            ]),
        );
    }
    Json(user_json(username)).into_response()
}

async fn list_projects(headers: HeaderMap) -> Response {
    if bearer_user(&headers).is_none() {
        return detail(StatusCode::UNAUTHORIZED, json!("Could not validate credentials"));
    }
    Json(json!([{
        "id": 1,
        "name": "Spring sneakers",
        "product_category": "Footwear",
        "created_at": "2026-01-05T14:30:00"
    }]))
    .into_response()
}

async fn get_project(Path(id): Path<i64>) -> Response {
    if id != 1 {
        return detail(StatusCode::NOT_FOUND, json!("Project not found"));
    }
    Json(json!({ "id": 1, "name": "Spring sneakers", "product_images": images_json() })).into_response()
}

async fn create_project(Json(body): Json<Value>) -> Response {
    if body["name"].as_str().unwrap_or_default().is_empty() {
        return detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            json!([{"loc": ["body", "name"], "msg": "field required"}]),
        );
    }
    let mut project = body;
    project["id"] = json!(5);
    Json(project).into_response()
}

async fn update_project(Path(id): Path<i64>, Json(body): Json<Value>) -> Response {
    if id != 1 {
        return detail(StatusCode::NOT_FOUND, json!("Project not found"));
    }
    let mut project = json!({ "id": 1, "name": "Spring sneakers", "product_category": "Footwear" });
    if let (Some(project), Some(changes)) = (project.as_object_mut(), body.as_object()) {
        for (key, value) in changes {
            project.insert(key.clone(), value.clone());
        }
    }
    Json(project).into_response()
}

async fn delete_project(Path(id): Path<i64>) -> Response {
    if id != 1 {
        return detail(StatusCode::NOT_FOUND, json!("Project not found"));
    }
    Json(json!({ "message": "Project deleted successfully" })).into_response()
}

/// Multipart fields as `name -> text`; file fields become `filename|mime|size`
async fn read_fields(mut multipart: Multipart) -> Result<HashMap<String, String>, Response> {
    let mut fields = HashMap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| detail(StatusCode::BAD_REQUEST, json!(e.to_string())))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let value = match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let mime = field.content_type().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| detail(StatusCode::BAD_REQUEST, json!(e.to_string())))?;
                format!("{}|{}|{}", file_name, mime, bytes.len())
            }
            None => field
                .text()
                .await
                .map_err(|e| detail(StatusCode::BAD_REQUEST, json!(e.to_string())))?,
        };
        fields.insert(name, value);
    }
    Ok(fields)
}

async fn upload_image(Path(id): Path<i64>, multipart: Multipart) -> Response {
    let fields = match read_fields(multipart).await {
        Ok(fields) => fields,
        Err(response) => return response,
    };
    let Some(file) = fields.get("file") else {
        return detail(StatusCode::BAD_REQUEST, json!("Missing 'file' field in multipart form"));
    };
    let parts: Vec<&str> = file.split('|').collect();
    Json(json!({
        "id": 10 + id,
        "filename": "stored.png",
        "original_filename": parts[0],
        "mime_type": parts[1],
        "file_size": parts[2].parse::<u64>().unwrap(),
        "is_primary": fields.get("is_primary").map(String::as_str) == Some("true")
    }))
    .into_response()
}

async fn product_render(multipart: Multipart) -> Response {
    let fields = match read_fields(multipart).await {
        Ok(fields) => fields,
        Err(response) => return response,
    };
    let (Some(render_type), Some(image)) = (fields.get("render_type"), fields.get("image")) else {
        return detail(StatusCode::BAD_REQUEST, json!("render_type and image are required"));
    };
    let content_type = match render_type.as_str() {
        "3d_render" => "product_3d_render",
        "professional_product" => "professional_product",
        _ => return detail(StatusCode::BAD_REQUEST, json!("Unknown render type")),
    };
    let echo = format!(
        "instructions={};project_id={};image={}",
        fields.get("instructions").map(String::as_str).unwrap_or("-"),
        fields.get("project_id").map(String::as_str).unwrap_or("-"),
        image
    );
    Json(json!({
        "id": 11,
        "content_type": content_type,
        "status": "completed",
        "generated_content": echo
    }))
    .into_response()
}

fn images_json() -> Value {
    json!([
        {"id": 1, "filename": "a.png", "original_filename": "front.png", "file_size": 2048, "is_primary": true},
        {"id": 2, "filename": "b.png", "original_filename": "side.png", "file_size": 4096, "is_primary": false}
    ])
}

async fn list_images() -> Json<Value> {
    Json(images_json())
}

async fn set_primary(Path((_, image_id)): Path<(i64, i64)>) -> Response {
    if image_id > 2 {
        return detail(StatusCode::NOT_FOUND, json!("Image not found"));
    }
    Json(json!({ "message": "Primary image updated" })).into_response()
}

async fn rate_limited() -> Response {
    detail(StatusCode::TOO_MANY_REQUESTS, json!("Rate limit exceeded"))
}

async fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

async fn slow_generation() -> Response {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({ "id": 7, "content_type": "text_to_image", "status": "completed" })).into_response()
}

async fn text_to_image(Json(body): Json<Value>) -> Json<Value> {
    let prompt = body["prompt"].clone();
    Json(json!({
        "id": 9,
        "content_type": "text_to_image",
        "status": "completed",
        "generated_content": prompt,
        "generation_metadata": {
            "images": [
                {"url": "data:image/png;base64,aGVsbG8=", "type": "base64"},
                {"url": "/static/render.png", "type": "url"}
            ]
        },
        "model_used": "mock-diffusion",
        "processing_time": 1
    }))
}

/// Refuses requests that carry credentials
async fn static_image(headers: HeaderMap) -> Response {
    if headers.contains_key("authorization") {
        return StatusCode::FORBIDDEN.into_response();
    }
    ([("content-type", "image/png")], PNG_BYTES).into_response()
}
