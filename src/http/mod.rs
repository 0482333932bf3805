use axum::{
    Router,
    routing::{get, patch, post},
};
use log::info;
use tower_http::cors::CorsLayer;

use crate::{app::AppState, jwt};

mod accounts;
mod admin;
mod contact_requests;
mod favorites;
mod payments;
mod profiles;
mod stories;

pub async fn run(
    app_state: AppState,
    shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
) {
    let router = Router::new()
        .route("/", get(root))
        .route("/jwt", post(jwt::handle_issue_token))
        .route("/profiles", get(profiles::list).post(profiles::submit))
        .route("/profiles/similar", get(profiles::similar))
        .route("/profiles/{id}", get(profiles::get_by_id))
        .route("/accounts", post(accounts::register).get(accounts::list))
        .route("/accounts/{email}/admin", get(accounts::admin_flag))
        .route("/accounts/{email}/role", patch(accounts::set_role))
        .route(
            "/accounts/{email}/premium-request",
            post(accounts::request_premium),
        )
        .route(
            "/contact-requests",
            post(contact_requests::create).get(contact_requests::pending),
        )
        .route(
            "/contact-requests/{id}",
            get(contact_requests::list_for).delete(contact_requests::remove),
        )
        .route(
            "/contact-requests/{id}/approve",
            patch(contact_requests::approve),
        )
        .route("/favorites", post(favorites::add))
        .route(
            "/favorites/{id}",
            get(favorites::list_for).delete(favorites::remove),
        )
        .route("/success-stories", post(stories::submit).get(stories::list))
        .route("/admin/stats", get(admin::stats))
        .route("/payment-intents", post(payments::create_payment_intent))
        .layer(CorsLayer::permissive());

    let port = std::env::var("MATRI_PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .expect("MATRI_PORT must be a valid u16");

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .unwrap();

    info!("Matrimony server listening on port {}", port);
    axum::serve(listener, router.with_state(app_state))
        .with_graceful_shutdown(shutdown_signal)
        .await
        .unwrap();

    info!("HTTP server shut down gracefully");
}

async fn root() -> &'static str {
    "Matrimony server is running"
}

// Mutation responses carry store-result counts; the web client branches on
// insertedId being null for duplicate submissions.
#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonInsertResponse {
    pub inserted_id: Option<i64>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonMatchedResponse {
    pub matched_count: usize,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JsonDeletedResponse {
    pub deleted_count: usize,
}
