//! The NVIDIA Sales Agent chat page.
//!
//! `frontend/` holds a single page that creates a session through
//! `POST /api/session`, submits questions to `POST /api/query` and polls
//! `GET /api/notifications` every 500 ms. Each notification kind gets its
//! own line: agent invocations and completions as a per-domain trace,
//! `orchestrator_thinking` as coordinator notes, and `response` as the
//! answer bubble, which also re-enables the input box.
//!
//! The three files are compiled in, so `productdesk serve` needs no asset
//! directory next to the binary.

use axum::{
    Router,
    http::header,
    response::{Html, IntoResponse},
    routing::get,
};

const INDEX_HTML: &str = include_str!("../../../frontend/index.html");

/// Stylesheet and script referenced by the page, with their content types.
const ASSETS: &[(&str, &str, &str)] = &[
    (
        "/static/style.css",
        "text/css; charset=utf-8",
        include_str!("../../../frontend/style.css"),
    ),
    (
        "/static/app.js",
        "application/javascript; charset=utf-8",
        include_str!("../../../frontend/app.js"),
    ),
];

/// Router serving the chat page and its assets.
pub fn frontend_router() -> Router {
    let router = Router::new().route("/", get(|| async { Html(INDEX_HTML) }));

    ASSETS
        .iter()
        .fold(router, |router, &(path, content_type, body)| {
            router.route(
                path,
                get(move || async move { ([(header::CONTENT_TYPE, content_type)], body).into_response() }),
            )
        })
}
