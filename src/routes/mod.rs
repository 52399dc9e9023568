use axum::{
    middleware,
    response::Redirect,
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub mod antiforgery;
mod error_page;
mod health;
pub mod todos;

pub use health::health;

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/error", get(error_page::error))
        .route("/todo", get(todos::routes::index))
        .route(
            "/todo/create",
            get(todos::routes::create_form).post(todos::routes::create),
        )
        .route(
            "/todo/edit/{id}",
            get(todos::routes::edit_form).post(todos::routes::edit),
        )
        .route(
            "/todo/delete/{id}",
            get(todos::routes::delete_form).post(todos::routes::delete),
        )
        .route("/todo/toggle/{id}", post(todos::routes::toggle))
}

/// Full application: routes, error page, request ids and request tracing.
pub fn app(state: AppState) -> Router {
    layered(routes()).with_state(state)
}

/// Panics and fatal errors become the error page under the request's id.
fn layered(router: Router<AppState>) -> Router<AppState> {
    router
        .layer(CatchPanicLayer::custom(error_page::panic_response))
        .layer(middleware::from_fn(error_page::render_fatal))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

async fn root() -> Redirect {
    Redirect::to("/todo")
}
