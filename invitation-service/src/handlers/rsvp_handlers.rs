use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use log::{debug, info};
use std::sync::Arc;
use wedding_shared::store::RsvpStore;

use crate::error::{AppError, Result};
use crate::models::{RsvpDraft, RsvpRecord, RsvpSearchParams};

fn require_complete(draft: &RsvpDraft) -> Result<()> {
    let missing = draft.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::bad_request(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

// GET /rsvps?name=..&birthdate=..
pub async fn search_rsvps<S>(
    State(store): State<Arc<S>>,
    Query(params): Query<RsvpSearchParams>,
) -> Result<Json<Vec<RsvpRecord>>>
where
    S: RsvpStore + ?Sized,
{
    let name = params.name.as_deref().map(str::trim).unwrap_or_default();
    if name.is_empty() {
        return Err(AppError::bad_request(
            "Query parameter 'name' is required".into(),
        ));
    }

    let birthdate = params
        .birthdate
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty());

    let records = match birthdate {
        Some(birthdate) => store.find_by_identity(name, birthdate).await?,
        None => store.find_by_name(name).await?,
    };

    debug!(
        "RSVP search matched {} records (identity lookup: {})",
        records.len(),
        birthdate.is_some()
    );

    Ok(Json(records))
}

// POST /rsvps
pub async fn create_rsvp<S>(
    State(store): State<Arc<S>>,
    Json(draft): Json<RsvpDraft>,
) -> Result<(StatusCode, Json<RsvpRecord>)>
where
    S: RsvpStore + ?Sized,
{
    require_complete(&draft)?;

    let created = store.create_rsvp(draft).await?;
    info!("RSVP created id={}", created.id);

    Ok((StatusCode::CREATED, Json(created)))
}

// PATCH /rsvps/:id
pub async fn update_rsvp<S>(
    State(store): State<Arc<S>>,
    Path(id): Path<String>,
    Json(draft): Json<RsvpDraft>,
) -> Result<Json<RsvpRecord>>
where
    S: RsvpStore + ?Sized,
{
    require_complete(&draft)?;

    let updated = store.update_rsvp(&id, draft).await?;
    info!("RSVP updated id={}", updated.id);

    Ok(Json(updated))
}
