use serde::Deserialize;

// Query DTOs
#[derive(Deserialize, Debug, Default)]
pub struct RsvpSearchParams {
    pub name: Option<String>,
    pub birthdate: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
pub struct IncrementParams {
    pub by: Option<u64>,
}

// Stored records and counter bodies are shared with the client
pub use wedding_shared::models::{LikeCount, RsvpDraft, RsvpRecord};
