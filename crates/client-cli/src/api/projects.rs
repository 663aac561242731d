use reqwest::multipart::{Form, Part};
use reqwest::Method;
use shared::{Message, NewProject, Page, ProductImage, Project, ProjectUpdate};
use std::path::{Path, PathBuf};

use super::{ApiClient, ApiError, ApiResult};

/// `/projects` endpoints, including nested product images
pub struct ProjectsApi<'a> {
    client: &'a ApiClient,
}

/// Image file to attach to a project
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub path: PathBuf,
    pub is_primary: bool,
}

impl<'a> ProjectsApi<'a> {
    pub(super) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, page: Page) -> ApiResult<Vec<Project>> {
        self.client.get_query("/projects", &page).await
    }

    /// Project with its images
    pub async fn get(&self, id: i64) -> ApiResult<Project> {
        self.client.get(&format!("/projects/{}", id)).await
    }

    pub async fn create(&self, project: &NewProject) -> ApiResult<Project> {
        self.client.post_json("/projects", project).await
    }

    pub async fn update(&self, id: i64, update: &ProjectUpdate) -> ApiResult<Project> {
        self.client.put_json(&format!("/projects/{}", id), update).await
    }

    pub async fn delete(&self, id: i64) -> ApiResult<Message> {
        self.client.call(Method::DELETE, &format!("/projects/{}", id)).await
    }

    /// POST /projects/{id}/images (multipart: `file`, `is_primary`)
    pub async fn upload_image(&self, project_id: i64, upload: &ImageUpload) -> ApiResult<ProductImage> {
        let file = file_part(&upload.path).await?;
        let form = Form::new()
            .part("file", file)
            .text("is_primary", upload.is_primary.to_string());

        let request = self
            .client
            .request(Method::POST, &format!("/projects/{}/images", project_id))
            .multipart(form);
        self.client.send_json(request).await
    }

    pub async fn images(&self, project_id: i64) -> ApiResult<Vec<ProductImage>> {
        self.client.get(&format!("/projects/{}/images", project_id)).await
    }

    pub async fn delete_image(&self, project_id: i64, image_id: i64) -> ApiResult<Message> {
        self.client
            .call(
                Method::DELETE,
                &format!("/projects/{}/images/{}", project_id, image_id),
            )
            .await
    }

    /// PUT /projects/{id}/images/{image_id}/primary
    pub async fn set_primary_image(&self, project_id: i64, image_id: i64) -> ApiResult<Message> {
        self.client
            .call(
                Method::PUT,
                &format!("/projects/{}/images/{}/primary", project_id, image_id),
            )
            .await
    }
}

/// Read a file into a multipart part carrying its name and image MIME type
pub(crate) async fn file_part(path: &Path) -> ApiResult<Part> {
    let data = tokio::fs::read(path).await?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    Part::bytes(data)
        .file_name(file_name)
        .mime_str(mime_for(path))
        .map_err(|e| ApiError::Decode(e.to_string()))
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("webp") => "image/webp",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_for() {
        assert_eq!(mime_for(Path::new("shoe.PNG")), "image/png");
        assert_eq!(mime_for(Path::new("/tmp/a.jpeg")), "image/jpeg");
        assert_eq!(mime_for(Path::new("notes")), "application/octet-stream");
    }
}
