// src/routes.rs

use axum::{
    Router,
    http::{Method, header},
    middleware,
    routing::{get, post, put},
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    error::page_not_found,
    handlers::{account, auth, posts, quiz},
    state::AppState,
    utils::jwt::auth_middleware,
};

/// Assembles the main application router.
///
/// * Public routes: auth, home feed, post reading.
/// * Everything touching tests, results or the account sits behind
///   `auth_middleware`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    let require_auth = middleware::from_fn_with_state(state.clone(), auth_middleware);

    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    let account_routes = Router::new()
        .route("/", get(account::get_account).put(account::update_account))
        .route("/results", get(account::list_my_results))
        .layer(require_auth.clone());

    let public_post_routes = Router::new().route("/{id}", get(posts::get_post));

    let protected_post_routes = Router::new()
        .route("/", post(posts::create_post))
        .route(
            "/{id}",
            put(posts::update_post).delete(posts::delete_post),
        )
        .route(
            "/{id}/test",
            get(quiz::submission_form)
                .post(quiz::submission_form)
                .put(quiz::update_test),
        )
        .route("/{id}/test/new", post(quiz::create_test))
        .route("/{id}/test/result", post(quiz::score_submission))
        .route("/{id}/test/result_handling", post(quiz::handle_result))
        .route(
            "/{id}/test/result_handling/{score}/{user_id}/{test_id}/{completed_at}",
            get(quiz::handle_result_legacy).post(quiz::handle_result_legacy),
        )
        .layer(require_auth.clone());

    let result_routes = Router::new()
        .route("/{id}/document", get(quiz::export_result))
        .layer(require_auth);

    let user_routes = Router::new().route("/{username}/posts", get(posts::list_user_posts));

    Router::new()
        .route("/api/home", get(posts::home))
        .nest("/api/auth", auth_routes)
        .nest("/api/account", account_routes)
        .nest(
            "/api/posts",
            public_post_routes.merge(protected_post_routes),
        )
        .nest("/api/results", result_routes)
        .nest("/api/users", user_routes)
        .fallback(page_not_found)
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
