use base64::Engine;
use reqwest::multipart::Form;
use reqwest::{Method, Url};
use shared::{
    ContentPlanRequest, GeneratedImage, Generation, ImageKind, MarketingPlanRequest, Page,
    ProductRenderRequest, SeoContentRequest, TextToImageRequest,
};
use std::path::Path;

use super::projects::file_part;
use super::{ApiClient, ApiError, ApiResult};

/// `/content` endpoints: generation requests and history
pub struct ContentApi<'a> {
    client: &'a ApiClient,
}

impl<'a> ContentApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn text_to_image(&self, request: &TextToImageRequest) -> ApiResult<Generation> {
        self.client.post_json("/content/text-to-image", request).await
    }

    /// POST /content/product-render (multipart with the source product image)
    pub async fn product_render(&self, request: &ProductRenderRequest, image: &Path) -> ApiResult<Generation> {
        let mut form = Form::new()
            .text("render_type", request.render_type.as_str())
            .text("instructions", request.instructions.clone())
            .part("image", file_part(image).await?);
        if let Some(project_id) = request.project_id {
            form = form.text("project_id", project_id.to_string());
        }

        let request = self
            .client
            .request(Method::POST, "/content/product-render")
            .multipart(form);
        self.client.send_json(request).await
    }

    pub async fn seo_content(&self, request: &SeoContentRequest) -> ApiResult<Generation> {
        self.client.post_json("/content/seo-content", request).await
    }

    pub async fn content_plan(&self, request: &ContentPlanRequest) -> ApiResult<Generation> {
        self.client.post_json("/content/content-plan", request).await
    }

    pub async fn marketing_plan(&self, request: &MarketingPlanRequest) -> ApiResult<Generation> {
        self.client.post_json("/content/marketing-plan", request).await
    }

    /// Generation history, newest first
    pub async fn generations(&self, page: Page) -> ApiResult<Vec<Generation>> {
        self.client.get_query("/content/generations", &page).await
    }

    pub async fn generation(&self, id: i64) -> ApiResult<Generation> {
        self.client.get(&format!("/content/generations/{}", id)).await
    }

    /// Save a generated image to `dest`, returning the number of bytes written.
    ///
    /// Inline `data:` URLs are decoded locally. Other references are fetched
    /// without credentials; relative paths resolve against the API origin.
    pub async fn download(&self, image: &GeneratedImage, dest: &Path) -> ApiResult<u64> {
        let bytes = match image.kind {
            ImageKind::Base64 => decode_data_url(&image.url)?,
            ImageKind::Url if image.url.starts_with("data:") => decode_data_url(&image.url)?,
            ImageKind::Url => self.fetch(&image.url).await?,
        };

        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, &bytes).await?;
        tracing::info!("Saved {} bytes to {}", bytes.len(), dest.display());
        Ok(bytes.len() as u64)
    }

    async fn fetch(&self, reference: &str) -> ApiResult<Vec<u8>> {
        let url = resolve_reference(self.client.base_url(), reference)?;
        let response = self
            .client
            .http()
            .get(url)
            .send()
            .await
            .map_err(|e| if e.is_timeout() { ApiError::Timeout } else { ApiError::Network(e) })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail: shared::ErrorDetail::Unknown,
            });
        }

        let body = response.bytes().await.map_err(ApiError::Network)?;
        Ok(body.to_vec())
    }
}

/// File extension matching a generated image reference
pub fn image_extension(image: &GeneratedImage) -> &'static str {
    let url = image.url.as_str();
    let probe = if url.starts_with("data:") {
        url.split(';').next().unwrap_or(url)
    } else {
        url.split(['?', '#']).next().unwrap_or(url)
    };

    let probe = probe.to_ascii_lowercase();
    if probe.ends_with("jpeg") || probe.ends_with("jpg") {
        "jpg"
    } else if probe.ends_with("webp") {
        "webp"
    } else if probe.ends_with("gif") {
        "gif"
    } else {
        "png"
    }
}

fn decode_data_url(url: &str) -> ApiResult<Vec<u8>> {
    let (_, payload) = url
        .split_once(";base64,")
        .ok_or_else(|| ApiError::Decode("image is not a base64 data URL".to_string()))?;

    base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|e| ApiError::Decode(e.to_string()))
}

fn resolve_reference(base_url: &str, reference: &str) -> ApiResult<Url> {
    let base = Url::parse(base_url).map_err(|e| ApiError::Decode(e.to_string()))?;
    base.join(reference).map_err(|e| ApiError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_data_url() {
        let bytes = decode_data_url("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(bytes, b"hello");
        assert!(matches!(decode_data_url("https://x/y.png"), Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_resolve_reference() {
        let base = "http://localhost:8000/api/v1";
        assert_eq!(
            resolve_reference(base, "/uploads/project_1/a.png").unwrap().as_str(),
            "http://localhost:8000/uploads/project_1/a.png"
        );
        assert_eq!(
            resolve_reference(base, "https://cdn.example.com/b.png").unwrap().as_str(),
            "https://cdn.example.com/b.png"
        );
    }

    #[test]
    fn test_image_extension() {
        let image = |url: &str, kind| GeneratedImage { url: url.to_string(), kind };
        assert_eq!(image_extension(&image("data:image/jpeg;base64,AA==", ImageKind::Base64)), "jpg");
        assert_eq!(image_extension(&image("https://x/y.webp?sig=1", ImageKind::Url)), "webp");
        assert_eq!(image_extension(&image("https://x/render", ImageKind::Url)), "png");
    }
}
