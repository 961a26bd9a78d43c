//! Router construction: one match over the portal mode at startup wires in
//! exactly one handler set; everything else falls through to 404/405.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue};
use axum::response::Response;
use axum::routing::get;
use axum::Router;

use crate::files::handlers as file_handlers;
use crate::files::{DirState, SendFileState};
use crate::portal::Portal;
use crate::text::handlers as text_handlers;
use crate::text::{RecvTextState, SendTextState};

/// Whole-file uploads arrive as one POST; allow large ones.
const UPLOAD_BODY_LIMIT: usize = 4 * 1024 * 1024 * 1024;
/// Pasted snippets are short by definition.
const TEXT_BODY_LIMIT: usize = 1024 * 1024;

const SERVER_IDENT: &str = concat!("LaPort/", env!("CARGO_PKG_VERSION"));

/// Build the per-mode router.
pub fn build_portal_router(portal: &Portal) -> Router {
    match portal {
        Portal::SendFile { path, filename } => Router::new()
            .route("/", get(file_handlers::download_file))
            .route("/:name", get(file_handlers::download_named))
            .with_state(SendFileState {
                path: path.clone(),
                filename: filename.clone(),
            }),

        Portal::RecvFiles { root } => Router::new()
            .route(
                "/",
                get(file_handlers::list_root)
                    .post(file_handlers::upload)
                    .put(file_handlers::upload),
            )
            .route("/*path", get(file_handlers::get_entry))
            .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
            .with_state(DirState { root: root.clone() }),

        Portal::SendText { text } => Router::new()
            .route("/", get(text_handlers::copy_text))
            .with_state(SendTextState {
                text: Arc::from(text.as_str()),
            }),

        Portal::RecvText { slot } => Router::new()
            .route(
                "/",
                get(text_handlers::paste_form).post(text_handlers::paste_submit),
            )
            .layer(DefaultBodyLimit::max(TEXT_BODY_LIMIT))
            .with_state(RecvTextState { slot: slot.clone() }),
    }
}

/// Mount the portal router at its service path and stamp the Server header
/// on every response, including fallback 404s.
pub fn mount_at(portal_router: Router, service_path: &str) -> Router {
    let mounted = if service_path == "/" {
        portal_router
    } else {
        Router::new().nest(service_path, portal_router)
    };
    mounted.layer(axum::middleware::map_response(set_server_header))
}

async fn set_server_header(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(header::SERVER, HeaderValue::from_static(SERVER_IDENT));
    response
}
