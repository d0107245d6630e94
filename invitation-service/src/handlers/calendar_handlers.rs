use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Redirect},
};
use std::sync::Arc;
use wedding_shared::event::{WeddingEvent, ICS_FILE_NAME};

use crate::error::{AppError, Result};

// GET /calendar/event.ics
pub async fn download_ics(State(event): State<Arc<WeddingEvent>>) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "text/calendar; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", ICS_FILE_NAME),
            ),
        ],
        event.to_ics(),
    )
}

// GET /calendar/google
pub async fn google_calendar(State(event): State<Arc<WeddingEvent>>) -> Result<Redirect> {
    let url = event.google_calendar_url().map_err(|e| {
        AppError::internal_server_error(format!("Failed to build calendar link: {}", e))
    })?;
    Ok(Redirect::temporary(url.as_str()))
}
