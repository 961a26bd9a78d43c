//! HTTP handlers for the text portals: serve a fixed snippet, or accept
//! exactly one pasted snippet.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum_typed_multipart::{TryFromMultipart, TypedMultipart};

use crate::common::AppError;
use crate::text::slot::TextSlot;
use crate::ui::web;

/// State for send-text mode: the snippet, immutable for the process.
#[derive(Clone)]
pub struct SendTextState {
    pub text: Arc<str>,
}

/// State for receive-text mode: the shared first-write-wins slot.
#[derive(Clone)]
pub struct RecvTextState {
    pub slot: Arc<TextSlot>,
}

// Raw bytes, not String: a paste with a broken encoding is still accepted
// and interpreted lossily instead of failing the request.
#[derive(TryFromMultipart)]
pub struct PasteRequest {
    pub text: Option<Bytes>,
}

/// GET `/` in send-text mode: the configured text, plain.
pub async fn copy_text(State(state): State<SendTextState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        state.text.to_string(),
    )
}

/// GET `/` in receive-text mode: the paste form.
pub async fn paste_form() -> impl IntoResponse {
    web::paste_page()
}

/// POST `/` in receive-text mode. The first submission fills the slot and
/// gets the success page; later ones get a conflict and change nothing.
pub async fn paste_submit(
    State(state): State<RecvTextState>,
    TypedMultipart(request): TypedMultipart<PasteRequest>,
) -> Result<impl IntoResponse, AppError> {
    // An empty textarea is still a valid paste
    let text = request
        .text
        .map(|raw| String::from_utf8_lossy(&raw).into_owned())
        .unwrap_or_default();

    if state.slot.try_fill(text).await {
        tracing::info!("received text");
        Ok(web::ok_page("Received"))
    } else {
        Err(AppError::Conflict(
            "text already received by this portal".to_string(),
        ))
    }
}
