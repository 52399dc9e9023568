//! Generic error page carrying the request trace id.

use std::any::Any;

use askama::Template;
use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Response},
};
use uuid::Uuid;

use crate::error::Fatal;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub request_id: String,
}

fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn render(status: StatusCode, request_id: String) -> Response {
    match (ErrorTemplate { request_id }).render() {
        Ok(html) => (status, [(header::CACHE_CONTROL, "no-store, no-cache")], Html(html)).into_response(),
        Err(e) => {
            tracing::error!("failed to render error page: {}", e);
            (status, "An error occurred while processing your request.").into_response()
        }
    }
}

/// GET /error
pub async fn error(headers: HeaderMap) -> Response {
    render(StatusCode::OK, request_id(&headers))
}

/// Swap the body of fatal responses for the error page, keeping the status.
pub async fn render_fatal(req: Request, next: Next) -> Response {
    let request_id = request_id(req.headers());
    let response = next.run(req).await;

    if response.extensions().get::<Fatal>().is_none() {
        return response;
    }

    render(response.status(), request_id)
}

/// 500 for a handler that panicked; `render_fatal` turns it into the error page.
pub fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| err.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    tracing::error!("handler panicked: {}", detail);

    let mut response = StatusCode::INTERNAL_SERVER_ERROR.into_response();
    response.extensions_mut().insert(Fatal);
    response
}
