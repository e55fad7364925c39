//! Lumiere storefront library.
//!
//! Catalog browsing, a session-held cart and wishlist, and checkout over
//! `PostgreSQL`. Prices are always recomputed with
//! [`lumiere_core::price_cart`]; see [`services::checkout`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, extract::State, http::StatusCode, middleware::from_fn, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tower_sessions::{SessionManagerLayer, SessionStore};
use tracing::Span;

use crate::state::AppState;

/// Build the storefront application over the given session layer.
///
/// Production passes [`middleware::create_session_layer`]; tests can pass a
/// layer over `tower_sessions::MemoryStore`.
pub fn app<S>(state: AppState, sessions: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(routes::routes())
        .layer(sessions)
        .layer(from_fn(middleware::security_headers_middleware))
        .layer(from_fn(middleware::request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}

async fn health() -> &'static str {
    "ok"
}

/// 503 until the database answers.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{
        body::Body,
        http::{
            Request,
            header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
        },
        response::Response,
    };
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use tower_sessions::MemoryStore;

    use lumiere_core::{CurrencyCode, PricingPolicy};

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::middleware::session_layer;

    const FORM: &str = "application/x-www-form-urlencoded";
    const CLIENT_IP: (&str, &str) = ("x-real-ip", "203.0.113.10");

    /// An app whose pool never connects; only paths that answer before the
    /// database are exercised here.
    fn test_app() -> Router {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/lumiere_storefront_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            base_url: "https://shop.lumiere.test".parse().unwrap(),
            pricing: PricingPolicy::default(),
            currency: CurrencyCode::INR,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 0.0,
            sentry_traces_sample_rate: 0.0,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/lumiere_storefront_test")
            .unwrap();
        app(
            AppState::new(config, pool),
            session_layer(MemoryStore::default(), true),
        )
    }

    async fn json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_form(uri: &str, body: &'static str) -> Request<Body> {
        Request::post(uri)
            .header(CONTENT_TYPE, FORM)
            .header(CLIENT_IP.0, CLIENT_IP.1)
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_empty_cart_without_session() {
        let response = test_app()
            .oneshot(Request::get("/cart").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        // Reading an empty session does not create one
        assert!(!response.headers().contains_key(SET_COOKIE));

        let body = json(response).await;
        assert_eq!(body["item_count"], 0);
        assert_eq!(body["summary"]["total"], 0);
        assert_eq!(body["currency"], "INR");
    }

    #[tokio::test]
    async fn test_clear_cart_starts_session() {
        let response = test_app()
            .oneshot(post_form("/cart/clear", ""))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("lumiere_session="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Secure"));
    }

    #[tokio::test]
    async fn test_update_missing_item_is_not_found() {
        let response = test_app()
            .oneshot(post_form("/cart/update", "product_id=42&quantity=3"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_quote_for_empty_cart_is_bad_request() {
        let response = test_app()
            .oneshot(Request::get("/checkout/quote").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_checkout_with_empty_cart_is_bad_request() {
        let response = test_app()
            .oneshot(post_form(
                "/checkout",
                "customer_name=Ada+Lovelace&customer_email=ada%40example.com\
                 &customer_phone=%2B44+20+7946+0958&shipping_address=12+Analytical+Row\
                 &payment_reference=pay_Q1w2E3r4&amount_minor=6745",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_checkout_rejects_missing_details() {
        let response = test_app()
            .oneshot(post_form(
                "/checkout",
                "customer_name=&customer_email=ada%40example.com&customer_phone=1\
                 &shipping_address=x&payment_reference=pay_1&amount_minor=100",
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_foreign_order_is_not_found() {
        let response = test_app()
            .oneshot(Request::get("/orders/1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_blank_search_returns_nothing() {
        let response = test_app()
            .oneshot(Request::get("/search?q=%20%20").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["results"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_overlong_search_is_bad_request() {
        let uri = format!("/search?q={}", "a".repeat(150));
        let response = test_app()
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_session_persists_across_requests() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(post_form("/cart/clear", ""))
            .await
            .unwrap();
        let cookie = response.headers()[SET_COOKIE]
            .to_str()
            .unwrap()
            .split(';')
            .next()
            .unwrap()
            .to_string();

        let response = app
            .oneshot(
                Request::get("/wishlist")
                    .header(COOKIE, cookie)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json(response).await;
        assert_eq!(body["items"], serde_json::json!([]));
    }
}
