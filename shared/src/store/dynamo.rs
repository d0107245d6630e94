use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use log::{debug, error, info};
use std::collections::HashMap;
use std::env;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::models::{now_str, Choice, RsvpDraft, RsvpRecord};
use crate::store::{LikeStore, LikeSubscription, RsvpStore};

const DEFAULT_RSVP_TABLE: &str = "wedding-rsvps";
const DEFAULT_LIKES_TABLE: &str = "wedding-likes";
const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Global secondary index on `name` used by every RSVP lookup.
pub const NAME_INDEX: &str = "name-index";

/// Partition key value of the one like-counter item.
pub const LIKES_KEY: &str = "likes";

type Item = HashMap<String, AttributeValue>;

/// Builds a DynamoDB client from the default AWS config, honouring
/// `DYNAMODB_ENDPOINT` for local DynamoDB.
pub async fn create_client() -> Client {
    let config = aws_config::load_defaults(BehaviorVersion::latest()).await;
    match env::var("DYNAMODB_ENDPOINT") {
        Ok(endpoint) => {
            info!("Using DynamoDB endpoint override: {}", endpoint);
            let dynamo_config = aws_sdk_dynamodb::config::Builder::from(&config)
                .endpoint_url(endpoint)
                .build();
            Client::from_conf(dynamo_config)
        }
        Err(_) => Client::new(&config),
    }
}

fn backend_error<E>(context: &str, err: E) -> StoreError
where
    E: std::error::Error,
{
    let message = format!("{}: {}", context, DisplayErrorContext(&err));
    error!("{}", message);
    StoreError::Backend(message)
}

fn choice_value(choice: Option<Choice>) -> AttributeValue {
    match choice {
        Some(c) => AttributeValue::S(c.to_string()),
        None => AttributeValue::Null(true),
    }
}

fn count_from_item(item: &Item) -> Result<u64> {
    match item.get("count") {
        Some(AttributeValue::N(n)) => n
            .parse::<u64>()
            .map_err(|e| StoreError::InvalidRecord(format!("count {:?}: {}", n, e))),
        other => Err(StoreError::InvalidRecord(format!(
            "count attribute missing or not a number: {:?}",
            other
        ))),
    }
}

/// RSVP records in a DynamoDB table keyed by `id`, with a `name` GSI.
#[derive(Clone)]
pub struct DynamoRsvpStore {
    client: Client,
    table_name: String,
}

impl DynamoRsvpStore {
    pub async fn new() -> Self {
        let table_name =
            env::var("RSVP_TABLE_NAME").unwrap_or_else(|_| DEFAULT_RSVP_TABLE.to_string());
        info!("Using RSVP table '{}'", table_name);
        Self::with_client_and_table(create_client().await, table_name)
    }

    pub fn with_client_and_table(client: Client, table_name: String) -> Self {
        Self { client, table_name }
    }

    async fn query_by_name(&self, name: &str, birthdate: Option<&str>) -> Result<Vec<RsvpRecord>> {
        let mut records = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let mut request = self
                .client
                .query()
                .table_name(&self.table_name)
                .index_name(NAME_INDEX)
                .key_condition_expression("#name = :name")
                .expression_attribute_names("#name", "name")
                .expression_attribute_values(":name", AttributeValue::S(name.to_string()))
                .set_exclusive_start_key(start_key.take());

            if let Some(birthdate) = birthdate {
                request = request
                    .filter_expression("#birthdate = :birthdate")
                    .expression_attribute_names("#birthdate", "birthdate")
                    .expression_attribute_values(
                        ":birthdate",
                        AttributeValue::S(birthdate.to_string()),
                    );
            }

            let output = request
                .send()
                .await
                .map_err(|e| backend_error("Failed to query RSVPs by name", e))?;

            let items = output.items.unwrap_or_default();
            let mut page: Vec<RsvpRecord> = serde_dynamo::from_items(items)
                .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
            records.append(&mut page);

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        debug!("Found {} RSVPs for name query", records.len());
        Ok(records)
    }
}

#[async_trait]
impl RsvpStore for DynamoRsvpStore {
    async fn find_by_name(&self, name: &str) -> Result<Vec<RsvpRecord>> {
        self.query_by_name(name, None).await
    }

    async fn find_by_identity(&self, name: &str, birthdate: &str) -> Result<Vec<RsvpRecord>> {
        self.query_by_name(name, Some(birthdate)).await
    }

    async fn create_rsvp(&self, draft: RsvpDraft) -> Result<RsvpRecord> {
        let record = RsvpRecord::from_draft(Uuid::new_v4().to_string(), draft);
        let item: Item =
            serde_dynamo::to_item(&record).map_err(|e| StoreError::InvalidRecord(e.to_string()))?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await
            .map_err(|e| backend_error("Failed to create RSVP", e))?;

        info!("Created RSVP id={}", record.id);
        Ok(record)
    }

    async fn update_rsvp(&self, id: &str, draft: RsvpDraft) -> Result<RsvpRecord> {
        let result = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("id", AttributeValue::S(id.to_string()))
            .update_expression(
                "SET #name = :name, #birthdate = :birthdate, #attendance = :attendance, \
                 #meal = :meal, #companionCount = :companionCount, #message = :message, \
                 #updatedAt = :updatedAt",
            )
            .condition_expression("attribute_exists(id)")
            .expression_attribute_names("#name", "name")
            .expression_attribute_names("#birthdate", "birthdate")
            .expression_attribute_names("#attendance", "attendance")
            .expression_attribute_names("#meal", "meal")
            .expression_attribute_names("#companionCount", "companionCount")
            .expression_attribute_names("#message", "message")
            .expression_attribute_names("#updatedAt", "updatedAt")
            .expression_attribute_values(":name", AttributeValue::S(draft.name))
            .expression_attribute_values(":birthdate", AttributeValue::S(draft.birthdate))
            .expression_attribute_values(":attendance", choice_value(draft.attendance))
            .expression_attribute_values(":meal", choice_value(draft.meal))
            .expression_attribute_values(
                ":companionCount",
                AttributeValue::N(draft.companion_count.to_string()),
            )
            .expression_attribute_values(":message", AttributeValue::S(draft.message))
            .expression_attribute_values(":updatedAt", AttributeValue::S(now_str()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await;

        let output = match result {
            Ok(output) => output,
            Err(e) => {
                let missing = e
                    .as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false);
                if missing {
                    return Err(StoreError::NotFound(format!("RSVP {}", id)));
                }
                return Err(backend_error("Failed to update RSVP", e));
            }
        };

        let attributes = output
            .attributes
            .ok_or_else(|| StoreError::InvalidRecord("update returned no attributes".into()))?;
        let record: RsvpRecord = serde_dynamo::from_item(attributes)
            .map_err(|e| StoreError::InvalidRecord(e.to_string()))?;

        info!("Updated RSVP id={}", record.id);
        Ok(record)
    }
}

/// The like counter as a single item (`pk = "likes"`) in its own table.
#[derive(Clone)]
pub struct DynamoLikeStore {
    client: Client,
    table_name: String,
    poll_interval: Duration,
}

impl DynamoLikeStore {
    pub async fn new() -> Self {
        let table_name =
            env::var("LIKES_TABLE_NAME").unwrap_or_else(|_| DEFAULT_LIKES_TABLE.to_string());
        info!("Using likes table '{}'", table_name);
        Self::with_client_and_table(create_client().await, table_name)
    }

    pub fn with_client_and_table(client: Client, table_name: String) -> Self {
        Self {
            client,
            table_name,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

#[async_trait]
impl LikeStore for DynamoLikeStore {
    async fn get_likes(&self) -> Result<Option<u64>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key("pk", AttributeValue::S(LIKES_KEY.to_string()))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| backend_error("Failed to read like counter", e))?;

        match output.item {
            Some(item) => count_from_item(&item).map(Some),
            None => Ok(None),
        }
    }

    async fn init_likes(&self) -> Result<u64> {
        let result = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item("pk", AttributeValue::S(LIKES_KEY.to_string()))
            .item("count", AttributeValue::N("0".to_string()))
            .condition_expression("attribute_not_exists(pk)")
            .send()
            .await;

        if let Err(e) = result {
            let exists = e
                .as_service_error()
                .map(|se| se.is_conditional_check_failed_exception())
                .unwrap_or(false);
            if !exists {
                return Err(backend_error("Failed to initialize like counter", e));
            }
            debug!("Like counter already initialized");
        } else {
            info!("Initialized like counter at zero");
        }

        Ok(self.get_likes().await?.unwrap_or(0))
    }

    async fn increment_likes(&self, delta: u64) -> Result<u64> {
        let output = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key("pk", AttributeValue::S(LIKES_KEY.to_string()))
            .update_expression("ADD #count :delta")
            .expression_attribute_names("#count", "count")
            .expression_attribute_values(":delta", AttributeValue::N(delta.to_string()))
            .return_values(ReturnValue::UpdatedNew)
            .send()
            .await
            .map_err(|e| backend_error("Failed to increment like counter", e))?;

        let attributes = output
            .attributes
            .ok_or_else(|| StoreError::InvalidRecord("increment returned no attributes".into()))?;
        count_from_item(&attributes)
    }

    async fn watch_likes(&self) -> Result<LikeSubscription> {
        Ok(LikeSubscription::polling(self.clone(), self.poll_interval))
    }
}
