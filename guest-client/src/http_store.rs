use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use wedding_shared::error::{Result, StoreError};
use wedding_shared::models::{LikeCount, RsvpDraft, RsvpRecord};
use wedding_shared::store::{LikeStore, LikeSubscription, RsvpStore};

use crate::config::ClientConfig;

/// Store client backed by the invitation service's REST API.
#[derive(Clone)]
pub struct HttpStore {
    client: Client,
    base_url: String,
    poll_interval: Duration,
}

fn request_error(context: &str, err: reqwest::Error) -> StoreError {
    let message = if err.is_timeout() {
        format!("{}: request timed out", context)
    } else {
        format!("{}: {}", context, err)
    };
    error!("{}", message);
    StoreError::Backend(message)
}

async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(StoreError::NotFound(what.to_string()));
    }
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!("{} returned {}: {}", what, status, body);
        return Err(StoreError::Backend(format!("{} returned {}", what, status)));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| StoreError::InvalidRecord(format!("{}: {}", what, e)))
}

impl HttpStore {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| request_error("Failed to build HTTP client", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            poll_interval: config.likes_poll_interval,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn query_rsvps(&self, params: &[(&str, &str)]) -> Result<Vec<RsvpRecord>> {
        let response = self
            .client
            .get(self.url("/rsvps"))
            .query(params)
            .send()
            .await
            .map_err(|e| request_error("RSVP search", e))?;
        read_json(response, "RSVP search").await
    }
}

#[async_trait]
impl RsvpStore for HttpStore {
    async fn find_by_name(&self, name: &str) -> Result<Vec<RsvpRecord>> {
        self.query_rsvps(&[("name", name)]).await
    }

    async fn find_by_identity(&self, name: &str, birthdate: &str) -> Result<Vec<RsvpRecord>> {
        self.query_rsvps(&[("name", name), ("birthdate", birthdate)])
            .await
    }

    async fn create_rsvp(&self, draft: RsvpDraft) -> Result<RsvpRecord> {
        let response = self
            .client
            .post(self.url("/rsvps"))
            .json(&draft)
            .send()
            .await
            .map_err(|e| request_error("RSVP create", e))?;
        read_json(response, "RSVP create").await
    }

    async fn update_rsvp(&self, id: &str, draft: RsvpDraft) -> Result<RsvpRecord> {
        debug!("Updating RSVP id={}", id);
        let response = self
            .client
            .patch(self.url(&format!("/rsvps/{}", id)))
            .json(&draft)
            .send()
            .await
            .map_err(|e| request_error("RSVP update", e))?;
        read_json(response, &format!("RSVP {}", id)).await
    }
}

#[async_trait]
impl LikeStore for HttpStore {
    async fn get_likes(&self) -> Result<Option<u64>> {
        let response = self
            .client
            .get(self.url("/likes"))
            .send()
            .await
            .map_err(|e| request_error("Like counter read", e))?;
        let body: LikeCount = read_json(response, "Like counter").await?;
        Ok(body.count)
    }

    async fn init_likes(&self) -> Result<u64> {
        let response = self
            .client
            .put(self.url("/likes"))
            .send()
            .await
            .map_err(|e| request_error("Like counter init", e))?;
        let body: LikeCount = read_json(response, "Like counter").await?;
        Ok(body.count.unwrap_or(0))
    }

    async fn increment_likes(&self, delta: u64) -> Result<u64> {
        let response = self
            .client
            .post(self.url("/likes/increment"))
            .query(&[("by", delta)])
            .send()
            .await
            .map_err(|e| request_error("Like counter increment", e))?;
        let body: LikeCount = read_json(response, "Like counter").await?;
        body.count
            .ok_or_else(|| StoreError::InvalidRecord("increment returned no count".into()))
    }

    async fn watch_likes(&self) -> Result<LikeSubscription> {
        Ok(LikeSubscription::polling(self.clone(), self.poll_interval))
    }
}
