use axum::{
    extract::Request,
    middleware,
    routing::{get, post},
    Router,
};
use log::{info, warn};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use wedding_shared::event::WeddingEvent;
use wedding_shared::store::{
    dynamo::{DynamoLikeStore, DynamoRsvpStore},
    memory::{MemoryLikeStore, MemoryRsvpStore},
    LikeStore, RsvpStore,
};

use crate::handlers::{
    calendar_handlers::{download_ics, google_calendar},
    like_handlers::{get_likes, increment_likes, init_likes},
    rsvp_handlers::{create_rsvp, search_rsvps, update_rsvp},
};

/// Creates a router with the store backend selected by `STORE_BACKEND`
/// (`dynamodb` unless set to `memory`).
pub async fn create_router() -> Router {
    let backend = std::env::var("STORE_BACKEND").unwrap_or_else(|_| "dynamodb".to_string());

    let (rsvps, likes): (Arc<dyn RsvpStore>, Arc<dyn LikeStore>) =
        if backend.eq_ignore_ascii_case("memory") {
            info!("Creating router with in-memory stores");
            (
                Arc::new(MemoryRsvpStore::new()),
                Arc::new(MemoryLikeStore::new()),
            )
        } else {
            info!("Creating router with DynamoDB stores");
            (
                Arc::new(DynamoRsvpStore::new().await),
                Arc::new(DynamoLikeStore::new().await),
            )
        };

    // Check if we should remove the base path prefix
    let remove_base_path = std::env::var("REMOVE_BASE_PATH")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false);

    // If REMOVE_BASE_PATH is set to true, don't add the /Prod prefix
    let prefix = if remove_base_path { "" } else { "/Prod" };
    info!("Using API route prefix: {}", prefix);

    create_router_with_stores(rsvps, likes, WeddingEvent::default(), prefix)
}

/// Creates a router over the given store implementations
pub fn create_router_with_stores<R, L>(
    rsvps: Arc<R>,
    likes: Arc<L>,
    event: WeddingEvent,
    prefix: &str,
) -> Router
where
    R: RsvpStore + ?Sized + 'static,
    L: LikeStore + ?Sized + 'static,
{
    info!("Setting up API routes with prefix: '{}'", prefix);

    // The invitation page is static and hosted elsewhere
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Logging middleware to trace all requests
    async fn logging_middleware(
        req: Request,
        next: axum::middleware::Next,
    ) -> impl axum::response::IntoResponse {
        info!(
            "Router received request: method={}, uri={}",
            req.method(),
            req.uri()
        );
        next.run(req).await
    }

    let rsvp_routes = Router::new()
        .route("/rsvps", get(search_rsvps::<R>).post(create_rsvp::<R>))
        .route("/rsvps/:id", axum::routing::patch(update_rsvp::<R>))
        .with_state(rsvps);

    let like_routes = Router::new()
        .route("/likes", get(get_likes::<L>).put(init_likes::<L>))
        .route("/likes/increment", post(increment_likes::<L>))
        .with_state(likes);

    let calendar_routes = Router::new()
        .route("/calendar/event.ics", get(download_ics))
        .route("/calendar/google", get(google_calendar))
        .with_state(Arc::new(event));

    let api_routes = rsvp_routes.merge(like_routes).merge(calendar_routes);

    let router = if prefix.is_empty() {
        api_routes
            .layer(cors)
            .layer(middleware::from_fn(logging_middleware))
    } else {
        Router::new()
            .nest(prefix, api_routes)
            .layer(cors)
            .layer(middleware::from_fn(logging_middleware))
    };

    router.fallback(|req: Request| async move {
        warn!("No route matched for: {} {}", req.method(), req.uri());
        (
            axum::http::StatusCode::NOT_FOUND,
            "The requested resource was not found".to_string(),
        )
    })
}
