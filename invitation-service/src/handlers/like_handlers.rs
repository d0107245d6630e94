use axum::{
    extract::{Query, State},
    Json,
};
use log::info;
use std::sync::Arc;
use wedding_shared::store::LikeStore;

use crate::error::{AppError, Result};
use crate::models::{IncrementParams, LikeCount};

/// Largest step a single increment request may add.
pub const MAX_INCREMENT: u64 = 10;

// GET /likes
pub async fn get_likes<S>(State(store): State<Arc<S>>) -> Result<Json<LikeCount>>
where
    S: LikeStore + ?Sized,
{
    let count = store.get_likes().await?;
    Ok(Json(LikeCount { count }))
}

// PUT /likes
// Creates the counter at zero when it does not exist; never resets it.
pub async fn init_likes<S>(State(store): State<Arc<S>>) -> Result<Json<LikeCount>>
where
    S: LikeStore + ?Sized,
{
    let count = store.init_likes().await?;
    Ok(Json(LikeCount { count: Some(count) }))
}

// POST /likes/increment?by=..
pub async fn increment_likes<S>(
    State(store): State<Arc<S>>,
    Query(params): Query<IncrementParams>,
) -> Result<Json<LikeCount>>
where
    S: LikeStore + ?Sized,
{
    let delta = params.by.unwrap_or(1);
    if delta == 0 || delta > MAX_INCREMENT {
        return Err(AppError::bad_request(format!(
            "Increment must be between 1 and {}",
            MAX_INCREMENT
        )));
    }

    let count = store.increment_likes(delta).await?;
    info!("Like counter incremented to {}", count);
    Ok(Json(LikeCount { count: Some(count) }))
}
