//! HTTP request handlers
//!
//! Gallery page, the two mutation endpoints and raw media files.

use crate::page;
use crate::server::AppContext;
use app_core::{AppError, MutationResult};
use axum::{
    body::Body,
    extract::{Query, State},
    http::{header, Method, StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tracing::{error, info, warn};

#[derive(Debug, Deserialize)]
pub struct NameQuery {
    name: Option<String>,
}

impl NameQuery {
    fn required(self) -> Result<String, ApiError> {
        match self.name {
            Some(name) if !name.is_empty() => Ok(name),
            _ => Err(AppError::MissingParameter("name").into()),
        }
    }
}

/// Error response with a JSON [`MutationResult`] body
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(e: AppError) -> Self {
        Self(e)
    }
}

impl From<app_fs::FsError> for ApiError {
    fn from(e: app_fs::FsError) -> Self {
        Self(e.into())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            AppError::MissingParameter(_) | AppError::UnsupportedType(_) => StatusCode::BAD_REQUEST,
            AppError::PathEscape(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Unexpected(_) | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.0.is_client_error() {
            warn!("Rejected request: {}", self.0);
        } else {
            error!("Request failed: {}", self.0);
        }
        (status, Json(MutationResult::failure(&self.0))).into_response()
    }
}

/// Run blocking file system work off the async workers
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> app_fs::Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(work).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(e) => Err(AppError::Unexpected(format!("Blocking task failed: {}", e)).into()),
    }
}

/// GET / - gallery page from a fresh scan
pub async fn index(State(ctx): State<Arc<AppContext>>) -> Result<Html<String>, ApiError> {
    let indexer = ctx.indexer.clone();
    let items = blocking(move || Ok(indexer.scan())).await?;

    info!("Serving gallery with {} items", items.len());
    Ok(Html(page::render_gallery(&items, &ctx.config)))
}

/// DELETE /api/delete?name=<relative path>
pub async fn delete_file(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<NameQuery>,
) -> Result<Json<MutationResult>, ApiError> {
    let name = query.required()?;
    let operations = Arc::clone(&ctx.operations);

    let outcome = blocking(move || operations.delete(&name)).await?;

    info!("Moved to {}", outcome.destination.display());
    Ok(Json(MutationResult::success()))
}

/// POST /api/favorite?name=<relative path>
pub async fn favorite_file(
    State(ctx): State<Arc<AppContext>>,
    Query(query): Query<NameQuery>,
) -> Result<Json<MutationResult>, ApiError> {
    let name = query.required()?;
    let operations = Arc::clone(&ctx.operations);

    let outcome = blocking(move || operations.favorite(&name)).await?;

    info!(
        "Copied to {} (overwritten: {})",
        outcome.destination.display(),
        outcome.overwritten
    );
    Ok(Json(MutationResult::favorited(outcome.overwritten)))
}

/// Any other path - raw file bytes below the served root
pub async fn serve_media(
    State(ctx): State<Arc<AppContext>>,
    method: Method,
    uri: Uri,
) -> Result<Response, ApiError> {
    if method != Method::GET && method != Method::HEAD {
        return Err(AppError::NotFound(uri.path().to_string()).into());
    }

    let requested = urlencoding::decode(uri.path().trim_start_matches('/'))
        .map_err(|_| AppError::NotFound(uri.path().to_string()))?
        .into_owned();

    let root = ctx.root.clone();
    let resolved = blocking(move || root.resolve_file(&requested)).await?;

    let file = tokio::fs::File::open(resolved.absolute())
        .await
        .map_err(|e| AppError::Unexpected(e.to_string()))?;
    let length = file
        .metadata()
        .await
        .map_err(|e| AppError::Unexpected(e.to_string()))?
        .len();

    let mime = mime_guess::from_path(resolved.absolute()).first_or_octet_stream();

    // Streamed in chunks; videos can be far larger than memory allows
    let body = Body::from_stream(ReaderStream::new(file));

    Ok((
        [
            (header::CONTENT_TYPE, mime.as_ref().to_string()),
            (header::CONTENT_LENGTH, length.to_string()),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::router;
    use app_core::AppConfig;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn fixture() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        fs::create_dir_all(root.join("a")).unwrap();
        fs::write(root.join("photo.jpg"), b"photo").unwrap();
        fs::write(root.join("a/b.png"), b"png bytes").unwrap();
        fs::write(root.join("a/clip.mp4"), b"video").unwrap();
        fs::write(root.join("notes.txt"), b"text").unwrap();
        temp
    }

    fn app(root: &Path) -> axum::Router {
        let ctx = AppContext::new(root, AppConfig::default()).unwrap();
        router(Arc::new(ctx))
    }

    async fn send(root: &Path, method: &str, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let response = app(root).oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    async fn send_json(root: &Path, method: &str, uri: &str) -> (StatusCode, MutationResult) {
        let (status, body) = send(root, method, uri).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    fn item_names(html: &str) -> Vec<String> {
        html.split(r#"data-name=""#)
            .skip(1)
            .map(|rest| rest.split('"').next().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_index_lists_media_in_order() {
        let temp = fixture();
        let (status, body) = send(temp.path(), "GET", "/").await;
        assert_eq!(status, StatusCode::OK);

        let html = String::from_utf8(body).unwrap();
        assert_eq!(item_names(&html), vec!["a/b.png", "a/clip.mp4", "photo.jpg"]);

        let (_, with_query) = send(temp.path(), "GET", "/?x=1").await;
        assert_eq!(item_names(&String::from_utf8(with_query).unwrap()), item_names(&html));
    }

    #[tokio::test]
    async fn test_index_empty_directory() {
        let temp = TempDir::new().unwrap();
        let (status, body) = send(temp.path(), "GET", "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(String::from_utf8(body).unwrap().contains(page::NO_MEDIA_HTML));
    }

    #[tokio::test]
    async fn test_delete_moves_to_trash() {
        let temp = fixture();
        fs::create_dir_all(temp.path().join("deleted")).unwrap();
        fs::write(temp.path().join("deleted/photo.jpg"), b"older").unwrap();

        let (status, result) = send_json(temp.path(), "DELETE", "/api/delete?name=photo.jpg").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(result, MutationResult::success());
        assert!(!temp.path().join("photo.jpg").exists());
        assert_eq!(fs::read(temp.path().join("deleted/photo_1.jpg")).unwrap(), b"photo");

        // Deleted files drop out of the next scan
        let (_, body) = send(temp.path(), "GET", "/").await;
        assert_eq!(item_names(&String::from_utf8(body).unwrap()), vec!["a/b.png", "a/clip.mp4"]);
    }

    #[tokio::test]
    async fn test_delete_errors() {
        let temp = fixture();

        let (status, result) = send_json(temp.path(), "DELETE", "/api/delete").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(result.error.as_deref(), Some("Missing filename"));

        let (status, _) = send_json(temp.path(), "DELETE", "/api/delete?name=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, result) = send_json(temp.path(), "DELETE", "/api/delete?name=missing.jpg").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(result.error.as_deref(), Some("File not found"));

        let (status, result) =
            send_json(temp.path(), "DELETE", "/api/delete?name=..%2F..%2Fetc%2Fpasswd").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(!result.ok);
        assert_eq!(result.error.as_deref(), Some("Invalid file path"));

        assert!(temp.path().join("photo.jpg").exists());
        assert!(!temp.path().join("deleted").exists());
    }

    #[tokio::test]
    async fn test_favorite_twice_reports_overwrite() {
        let temp = fixture();
        let uri = "/api/favorite?name=a%2Fb.png";

        let (status, first) = send_json(temp.path(), "POST", uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first.overwritten, Some(false));

        let (status, second) = send_json(temp.path(), "POST", uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second.overwritten, Some(true));

        assert_eq!(fs::read(temp.path().join("a/b.png")).unwrap(), b"png bytes");
        assert_eq!(fs::read(temp.path().join("favorites/a/b.png")).unwrap(), b"png bytes");
    }

    #[tokio::test]
    async fn test_favorite_rejections() {
        let temp = fixture();

        let (status, result) = send_json(temp.path(), "POST", "/api/favorite?name=notes.txt").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            result.error.as_deref(),
            Some("Only supported media files can be favorited")
        );

        fs::create_dir_all(temp.path().join("favorites")).unwrap();
        fs::write(temp.path().join("favorites/x.jpg"), b"fav").unwrap();
        let (status, _) = send_json(temp.path(), "POST", "/api/favorite?name=favorites%2Fx.jpg").await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = send_json(temp.path(), "DELETE", "/api/delete?name=favorites%2Fx.jpg").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(temp.path().join("favorites/x.jpg").exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_symlink_outside_root_is_forbidden() {
        let outside = TempDir::new().unwrap();
        fs::write(outside.path().join("secret.jpg"), b"secret").unwrap();

        let temp = fixture();
        std::os::unix::fs::symlink(outside.path().join("secret.jpg"), temp.path().join("link.jpg"))
            .unwrap();

        let (status, _) = send_json(temp.path(), "DELETE", "/api/delete?name=link.jpg").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(outside.path().join("secret.jpg").exists());

        let (status, _) = send(temp.path(), "GET", "/link.jpg").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_serve_media_file() {
        let temp = fixture();
        fs::write(temp.path().join("a/with space.jpg"), b"spaced").unwrap();

        let request = Request::builder()
            .uri("/a/with%20space.jpg")
            .body(Body::empty())
            .unwrap();
        let response = app(temp.path()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"spaced");

        let large = vec![7u8; 300 * 1024];
        fs::write(temp.path().join("a/big.mp4"), &large).unwrap();
        let request = Request::builder().uri("/a/big.mp4").body(Body::empty()).unwrap();
        let response = app(temp.path()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "video/mp4");
        assert_eq!(response.headers()[header::CONTENT_LENGTH], large.len().to_string().as_str());
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.len(), large.len());
        assert!(body.iter().all(|&b| b == 7));

        let (status, _) = send(temp.path(), "GET", "/nope.jpg").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(temp.path(), "GET", "/a").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_unknown_routes() {
        let temp = fixture();

        let (status, _) = send(temp.path(), "POST", "/api/unknown").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(temp.path(), "DELETE", "/photo.jpg").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(temp.path().join("photo.jpg").exists());

        let (status, _) = send(temp.path(), "GET", "/api/nothing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
