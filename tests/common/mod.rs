#![allow(dead_code)]

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use laport::portal::Portal;
use laport::server::routes;
use laport::text::TextSlot;
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "laport-test-boundary";

pub fn setup_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

pub fn file_router(path: &std::path::Path) -> Router {
    let portal = Portal::send_file(path).expect("send-file portal");
    routes::build_portal_router(&portal)
}

pub fn dir_router(root: &std::path::Path) -> Router {
    let portal = Portal::recv_files(root).expect("receive-files portal");
    routes::build_portal_router(&portal)
}

pub fn send_text_router(text: &str) -> Router {
    routes::build_portal_router(&Portal::send_text(text.to_string()))
}

pub fn recv_text_router() -> (Router, Arc<TextSlot>) {
    let portal = Portal::recv_text();
    let slot = portal.text_slot().expect("receive-text portal has a slot");
    (routes::build_portal_router(&portal), slot)
}

pub async fn get(app: &Router, path: &str) -> Response {
    let request = Request::builder()
        .uri(path)
        .body(Body::empty())
        .expect("build GET request");
    app.clone().oneshot(request).await.expect("dispatch GET")
}

pub async fn request_method(app: &Router, method: &str, path: &str) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(path)
        .body(Body::empty())
        .expect("build request");
    app.clone().oneshot(request).await.expect("dispatch request")
}

/// Multipart POST with one file field, the way a browser submits the upload
/// form.
pub async fn post_file(app: &Router, path: &str, filename: &str, bytes: &[u8]) -> Response {
    let body = multipart_body(&[("file", Some(filename), bytes)]);
    post_multipart(app, path, body).await
}

/// Multipart POST with one text field, the way the paste form submits.
pub async fn post_text(app: &Router, path: &str, text: &str) -> Response {
    let body = multipart_body(&[("text", None, text.as_bytes())]);
    post_multipart(app, path, body).await
}

pub async fn post_multipart(app: &Router, path: &str, body: Vec<u8>) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .expect("build multipart request");
    app.clone().oneshot(request).await.expect("dispatch POST")
}

pub fn multipart_body(fields: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, bytes) in fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body")
        .to_vec()
}

pub async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).expect("response body is valid UTF-8")
}
