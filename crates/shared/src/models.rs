use serde::{Deserialize, Serialize};

// ============================================================================
// Identity / Auth
// ============================================================================

/// Authenticated user as returned by `GET /auth/me`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    /// Name shown in greetings: full name when set, otherwise the username
    pub fn display_name(&self) -> &str {
        match self.full_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.username,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Credential exchange form (`application/x-www-form-urlencoded`)
#[derive(Debug, Clone, Serialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

// ============================================================================
// Projects
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub product_category: Option<String>,
    #[serde(default)]
    pub target_audience: Option<String>,
    /// Brand colors, fonts and style preferences
    #[serde(default)]
    pub brand_guidelines: Option<serde_json::Value>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    /// Only populated by `GET /projects/{id}`
    #[serde(default)]
    pub product_images: Vec<ProductImage>,
}

impl Project {
    pub fn primary_image(&self) -> Option<&ProductImage> {
        self.product_images.iter().find(|img| img.is_primary)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProject {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_guidelines: Option<serde_json::Value>,
}

/// Partial update, unset fields are left untouched server-side
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_audience: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand_guidelines: Option<serde_json::Value>,
}

impl ProjectUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.product_category.is_none()
            && self.target_audience.is_none()
            && self.brand_guidelines.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductImage {
    pub id: i64,
    pub filename: String,
    pub original_filename: String,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub file_size: Option<u64>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub is_primary: bool,
    #[serde(default)]
    pub uploaded_at: Option<String>,
}

/// Make `image_id` the only primary image in a project's image list.
///
/// Mirrors the server-side rule so a cached list can be updated without
/// refetching. Returns false (and leaves the list untouched) when the image
/// is not part of the list.
pub fn mark_primary(images: &mut [ProductImage], image_id: i64) -> bool {
    if !images.iter().any(|img| img.id == image_id) {
        return false;
    }
    for img in images.iter_mut() {
        img.is_primary = img.id == image_id;
    }
    true
}

// ============================================================================
// Content generation
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    TextToImage,
    #[serde(rename = "product_3d_render")]
    Product3dRender,
    ProfessionalProduct,
    SeoCaption,
    ContentPlan,
    MarketingPlan,
}

impl ContentType {
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::TextToImage => "Text to Image",
            ContentType::Product3dRender => "3D Product Render",
            ContentType::ProfessionalProduct => "Professional Product Shot",
            ContentType::SeoCaption => "SEO Content",
            ContentType::ContentPlan => "Content Plan",
            ContentType::MarketingPlan => "Marketing Plan",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

/// Result of a content generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Generation {
    pub id: i64,
    pub content_type: ContentType,
    pub status: GenerationStatus,
    #[serde(default)]
    pub generated_content: Option<String>,
    #[serde(default)]
    pub generated_image_path: Option<String>,
    #[serde(default)]
    pub generation_metadata: Option<serde_json::Value>,
    #[serde(default)]
    pub model_used: Option<String>,
    /// Seconds
    #[serde(default)]
    pub processing_time: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl Generation {
    /// Images listed in `generation_metadata.images`
    pub fn images(&self) -> Vec<GeneratedImage> {
        self.generation_metadata
            .as_ref()
            .and_then(|meta| meta.get("images"))
            .and_then(|images| serde_json::from_value(images.clone()).ok())
            .unwrap_or_default()
    }

    /// Failure reason recorded in `generation_metadata.error`
    pub fn error(&self) -> Option<&str> {
        self.generation_metadata
            .as_ref()
            .and_then(|meta| meta.get("error"))
            .and_then(|err| err.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratedImage {
    pub url: String,
    #[serde(rename = "type", default)]
    pub kind: ImageKind,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ImageKind {
    /// `data:image/...;base64,` URL
    Base64,
    #[default]
    Url,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextToImageRequest {
    pub prompt: String,
    pub style: String,
    pub aspect_ratio: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
}

impl TextToImageRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            style: "Realistic".to_string(),
            aspect_ratio: "Square (1:1)".to_string(),
            project_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RenderType {
    #[serde(rename = "3d_render")]
    Render3d,
    #[serde(rename = "professional_product")]
    ProfessionalProduct,
}

impl RenderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RenderType::Render3d => "3d_render",
            RenderType::ProfessionalProduct => "professional_product",
        }
    }
}

/// Form fields of the multipart product render request (the image is sent alongside)
#[derive(Debug, Clone)]
pub struct ProductRenderRequest {
    pub render_type: RenderType,
    pub instructions: String,
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoContentRequest {
    pub product_description: String,
    #[serde(default)]
    pub target_keywords: Vec<String>,
    pub platform: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentPlanRequest {
    pub product_info: String,
    pub target_audience: String,
    pub goals: Vec<String>,
    pub timeframe: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MarketingGoal {
    Outreach,
    Sales,
    Branding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketingPlanRequest {
    pub product_info: String,
    pub target_audience: String,
    pub goal: MarketingGoal,
    pub budget_range: String,
    pub timeline: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i64>,
}

// ============================================================================
// Admin
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiKeyStatus {
    pub total_keys: u32,
    pub active_keys: u32,
    pub rate_limited_keys: u32,
    pub error_keys: u32,
    #[serde(default)]
    pub keys: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemStats {
    pub total_users: u64,
    pub active_users: u64,
    pub total_projects: u64,
    pub total_generations: u64,
    pub api_key_status: ApiKeyStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub daily_requests_count: Option<u64>,
    #[serde(default)]
    pub last_request_date: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRotation {
    pub message: String,
    #[serde(default)]
    pub previous_key: Option<String>,
    #[serde(default)]
    pub current_key: Option<String>,
}

/// Plain `{"message": ...}` acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

/// `skip`/`limit` query parameters accepted by list endpoints
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct Page {
    pub skip: u32,
    pub limit: u32,
}

impl Page {
    pub fn first(limit: u32) -> Self {
        Self { skip: 0, limit }
    }
}
