// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method},
    middleware,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{actions, files, health, quiz, threads},
    state::AppState,
    utils::jwt::request_context,
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (threads, quiz, questions, files).
/// * Applies global middleware (request context, Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let thread_routes = Router::new()
        .route("/", get(threads::list_threads).post(threads::create_thread))
        .route("/{id}", get(threads::get_thread).delete(threads::delete_thread))
        .route("/{id}/items", get(threads::list_items))
        .route("/{id}/messages", post(threads::post_message))
        .route("/{id}/actions", post(actions::handle_action))
        .route("/{id}/quiz", post(quiz::create_questions))
        .route("/{id}/quiz/show", post(quiz::show_question));

    let file_routes = Router::new()
        .route("/", post(files::upload_file))
        .route("/{id}", get(files::get_file).delete(files::delete_file));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/threads", thread_routes)
        .route("/api/questions", get(quiz::get_questions))
        .nest("/api/files", file_routes)
        .layer(middleware::from_fn_with_state(state.clone(), request_context))
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
