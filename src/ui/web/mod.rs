//! Browser-facing pages: directory listing, paste form, success page.

use axum::{
    http::header,
    response::{Html, IntoResponse},
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

const CONTENT_SECURITY_POLICY: &str = "default-src 'none'; style-src 'unsafe-inline'; form-action 'self'; base-uri 'none'; frame-ancestors 'none'";

fn hardening_headers() -> [(header::HeaderName, &'static str); 4] {
    [
        (header::CONTENT_SECURITY_POLICY, CONTENT_SECURITY_POLICY),
        (header::X_FRAME_OPTIONS, "DENY"),
        (header::X_CONTENT_TYPE_OPTIONS, "nosniff"),
        (header::REFERRER_POLICY, "no-referrer"),
    ]
}

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <title>{title}</title>\n\
         <meta charset=\"utf-8\"/>\n\
         <meta name=\"viewport\" content=\"width=device-width,initial-scale=1.0\"/>\n\
         </head>\n\
         <body style=\"font-family: sans-serif; margin: 5vh 10%;\">\n\
         {body}\n\
         </body>\n\
         </html>"
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KiB", "MiB", "GiB", "TiB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = "B";
    for next in UNITS {
        if value < 1024.0 {
            break;
        }
        value /= 1024.0;
        unit = next;
    }
    format!("{value:.1} {unit}")
}

/// One row of a directory listing.
pub struct ListEntry {
    pub name: String,
    pub is_dir: bool,
    pub size: u64,
}

/// Render a browsable listing of `entries`. Links are built relative to
/// `base_href` (the request path, no trailing slash). The upload form is only
/// shown on the portal root, where POST lands.
pub fn listing_page(dir_label: &str, base_href: &str, with_upload_form: bool, entries: &[ListEntry]) -> impl IntoResponse {
    let mut body = String::new();
    body.push_str(&format!("<h2>{}</h2>\n", escape_html(dir_label)));

    if with_upload_form {
        body.push_str(
            "<form enctype=\"multipart/form-data\" method=\"post\" style=\"margin: 15px 0;\">\n\
             <input name=\"file\" type=\"file\" required/>\n\
             <input type=\"submit\" value=\"Upload\"/>\n\
             </form>\n<hr/>\n",
        );
    }

    if entries.is_empty() {
        body.push_str("<p><i>(empty)</i></p>\n");
    } else {
        body.push_str("<ul style=\"list-style: none; padding: 0; line-height: 1.8;\">\n");
        for entry in entries {
            let encoded = utf8_percent_encode(&entry.name, NON_ALPHANUMERIC);
            let label = escape_html(&entry.name);
            if entry.is_dir {
                body.push_str(&format!(
                    "<li>&#128193; <a href=\"{base_href}/{encoded}\">{label}/</a></li>\n"
                ));
            } else {
                body.push_str(&format!(
                    "<li>&#128196; <a href=\"{base_href}/{encoded}\">{label}</a> <small>({})</small></li>\n",
                    human_size(entry.size)
                ));
            }
        }
        body.push_str("</ul>\n");
    }

    (hardening_headers(), Html(page("LaPort", &body)))
}

/// The paste form shown on GET in receive-text mode.
pub fn paste_page() -> impl IntoResponse {
    (hardening_headers(), Html(include_str!("paste.html")))
}

/// Green-check success page with a short detail line, shown after an upload
/// or paste lands.
pub fn ok_page(detail: &str) -> impl IntoResponse {
    let body = format!(
        "<div style=\"text-align: center; margin-top: 25vh;\">\n\
         <div style=\"font-size: 120px; font-weight: bold; color: darkgreen;\">&check;</div>\n\
         <p>{}</p>\n\
         </div>",
        escape_html(detail)
    );
    (hardening_headers(), Html(page("LaPort", &body)))
}
