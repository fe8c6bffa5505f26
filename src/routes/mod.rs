pub mod auth;
pub mod health;
pub mod pages;
pub mod question;
pub mod variant;

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn router(state: AppState) -> Router {
    let question_routes = Router::new()
        .route("/add", post(question::add))
        .route("/remove", delete(question::remove))
        .route("/:question_id/get", get(question::get))
        .route("/:question_id/accept", post(question::accept));

    let variant_scoped = Router::new()
        .route("/remove", delete(variant::remove))
        .route("/start", post(variant::start))
        .route("/results", get(variant::results))
        .route("/get", get(variant::get))
        .nest("/question", question_routes);

    let variant_routes = Router::new()
        .route("/add", post(variant::add))
        .route("/list", get(variant::list))
        .nest("/:variant_name", variant_scoped);

    let protected = Router::new()
        .route("/quit", post(auth::quit))
        .nest("/variant", variant_routes)
        // route_layer keeps the gate off unmatched paths, which fall
        // through to a plain 404.
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::auth::require_user,
        ));

    Router::new()
        .route("/", get(pages::register_page))
        .route("/health", get(health::health))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .nest("/:user_id", protected)
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
