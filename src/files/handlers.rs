//! HTTP handlers for the file portals: single-file download, directory
//! browsing, and uploads into the shared directory.

use std::path::{Path, PathBuf};

use anyhow::Context;
use axum::body::Body;
use axum::extract::{OriginalUri, Path as UrlPath, State};
use axum::http::{header, HeaderName, HeaderValue, Response};
use axum::response::IntoResponse;
use axum_typed_multipart::{FieldData, TryFromMultipart, TypedMultipart};
use tempfile::NamedTempFile;
use tokio_util::io::ReaderStream;

use crate::common::AppError;
use crate::files::storage;
use crate::ui::web::{self, ListEntry};
use crate::utils::security;

/// State for single-file mode: one readable file, fixed at startup.
#[derive(Clone)]
pub struct SendFileState {
    pub path: PathBuf,
    pub filename: String,
}

/// State for directory mode: the canonical shared root.
#[derive(Clone)]
pub struct DirState {
    pub root: PathBuf,
}

#[derive(TryFromMultipart)]
pub struct UploadRequest {
    #[form_data(limit = "unlimited")]
    pub file: FieldData<NamedTempFile>,
}

/// GET `/` in single-file mode: stream the configured file as a download.
pub async fn download_file(State(state): State<SendFileState>) -> Result<Response<Body>, AppError> {
    stream_file(&state.path, Some(&state.filename)).await
}

/// GET `/<name>` in single-file mode: same download under its canonical name.
pub async fn download_named(
    UrlPath(name): UrlPath<String>,
    State(state): State<SendFileState>,
) -> Result<Response<Body>, AppError> {
    if name != state.filename {
        return Err(AppError::NotFound);
    }
    stream_file(&state.path, Some(&state.filename)).await
}

/// GET `/` in directory mode: listing of the shared root plus upload form.
pub async fn list_root(
    OriginalUri(uri): OriginalUri,
    State(state): State<DirState>,
) -> Result<Response<Body>, AppError> {
    let base = uri.path().trim_end_matches('/').to_string();
    let entries = read_entries(&state.root).await?;
    Ok(web::listing_page("Shared directory", &base, true, &entries).into_response())
}

/// GET `/<relpath>` in directory mode: stream a file or list a subdirectory.
/// Guard rejections are 403, missing entries 404.
pub async fn get_entry(
    OriginalUri(uri): OriginalUri,
    UrlPath(rel): UrlPath<String>,
    State(state): State<DirState>,
) -> Result<Response<Body>, AppError> {
    let resolved = match security::resolve_read_path(&state.root, &rel) {
        Ok(Some(path)) => path,
        Ok(None) => return Err(AppError::NotFound),
        Err(rejection) => {
            tracing::warn!(path = %rel, reason = %rejection, "rejected sub-path");
            return Err(AppError::Forbidden(rejection.to_string()));
        }
    };

    if resolved.is_dir() {
        let base = uri.path().trim_end_matches('/').to_string();
        let entries = read_entries(&resolved).await?;
        let label = format!("Shared directory / {}", rel.trim_end_matches('/'));
        return Ok(web::listing_page(&label, &base, false, &entries).into_response());
    }

    let attach_name = resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned());
    stream_file(&resolved, attach_name.as_deref()).await
}

/// POST `/` in directory mode: land the uploaded file next to the shared
/// root's contents, never overwriting, and report the final stored name.
pub async fn upload(
    State(state): State<DirState>,
    TypedMultipart(request): TypedMultipart<UploadRequest>,
) -> Result<Response<Body>, AppError> {
    let declared = request
        .file
        .metadata
        .file_name
        .clone()
        .ok_or_else(|| AppError::BadRequest("filename is unknown".to_string()))?;

    let name = security::sanitize_upload_name(&declared)
        .map_err(|rejection| AppError::Forbidden(rejection.to_string()))?;

    let stored = storage::store_upload(&state.root, &name, request.file.contents.path()).await?;
    tracing::info!(name = %stored.name, "stored upload");

    let mut response =
        web::ok_page(&format!("Saved as {}", stored.name)).into_response();
    if let Ok(value) = HeaderValue::from_str(&stored.name) {
        response
            .headers_mut()
            .insert(HeaderName::from_static("x-stored-name"), value);
    }
    Ok(response)
}

/// Immediate entries of `dir`, case-insensitive lexicographic order so two
/// consecutive listings always agree. Hidden files (including in-flight
/// upload staging files) are skipped.
async fn read_entries(dir: &Path) -> Result<Vec<ListEntry>, AppError> {
    let mut read_dir = tokio::fs::read_dir(dir)
        .await
        .with_context(|| format!("list directory {}", dir.display()))?;

    let mut entries = Vec::new();
    while let Some(entry) = read_dir
        .next_entry()
        .await
        .context("read directory entry")?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }
        let metadata = match entry.metadata().await {
            Ok(m) => m,
            // Entry vanished between readdir and stat; skip it
            Err(_) => continue,
        };
        entries.push(ListEntry {
            name,
            is_dir: metadata.is_dir(),
            size: metadata.len(),
        });
    }

    entries.sort_by_key(|e| e.name.to_lowercase());
    Ok(entries)
}

/// Stream a file with inferred Content-Type, exact Content-Length, and an
/// attachment disposition carrying the download name.
async fn stream_file(path: &Path, attach_name: Option<&str>) -> Result<Response<Body>, AppError> {
    let file = match tokio::fs::File::open(path).await {
        Ok(f) => f,
        // Payload moved or deleted after startup
        Err(_) => return Err(AppError::NotFound),
    };
    let metadata = file.metadata().await.context("read file metadata")?;
    if metadata.is_dir() {
        return Err(AppError::NotFound);
    }

    let mime = mime_guess::from_path(path).first_or_octet_stream();
    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CONTENT_LENGTH, metadata.len());
    if let Some(name) = attach_name {
        builder = builder.header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", name.replace(['"', '\\'], "_")),
        );
    }

    let stream = ReaderStream::new(file);
    Ok(builder
        .body(Body::from_stream(stream))
        .context("build file response")?)
}
