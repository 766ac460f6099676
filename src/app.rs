use crate::assets;
use crate::config;
use crate::state;
use crate::store;

use axum::Router;
use axum::routing::get;
use axum::routing::post;

mod auth;
mod pages;

pub fn app(config: config::AppConfig) -> Router {
    let store = store::Store::new(config.data_dir.clone());
    let state = state::AppState { config, store };
    Router::new()
        .route("/", get(pages::home))
        .route("/login", get(auth::login_form).post(auth::login_submit))
        .route(
            "/official/login",
            get(auth::official_login_form).post(auth::official_login_submit),
        )
        .route("/logout", get(auth::logout))
        .route(
            "/report",
            get(pages::report_form).post(pages::report_submit),
        )
        .route("/dashboard", get(pages::dashboard))
        .route("/official", get(pages::official_dashboard))
        .route("/issues/{id}/upvote", post(pages::issue_upvote))
        .route("/issues/{id}/advance", post(pages::issue_advance))
        .route("/issues/{id}/comment", post(pages::issue_comment))
        .route("/issues/{id}/assign", post(pages::issue_assign))
        .route("/issues/{id}/resolve", post(pages::issue_resolve))
        .route("/static/style.css", get(assets::stylesheet))
        .route("/static/map.js", get(assets::map_script))
        .route("/static/app.js", get(assets::app_script))
        .route("/health", get(health))
        // Unmatched paths land on Home, like the original hash router.
        .fallback(pages::home)
        .with_state(state)
}

pub(crate) async fn health() -> &'static str {
    "ok"
}
