use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, GlobalSecondaryIndex, KeySchemaElement,
    KeyType, Projection, ProjectionType, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use log::{debug, info};
use std::env;

use crate::store::dynamo::NAME_INDEX;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Tests run against the memory stores unless `USE_DYNAMODB=true`.
pub fn use_dynamodb() -> bool {
    env::var("USE_DYNAMODB")
        .map(|v| v.to_lowercase() == "true")
        .unwrap_or(false)
}

/// Client for DynamoDB Local (`DYNAMODB_ENDPOINT`, default
/// `http://localhost:8000`) with static test credentials.
pub async fn create_dynamo_client() -> Client {
    let endpoint =
        env::var("DYNAMODB_ENDPOINT").unwrap_or_else(|_| "http://localhost:8000".to_string());
    info!("Connecting to test DynamoDB at {}", endpoint);

    let config = aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(Credentials::new("test", "test", None, None, "test"))
        .endpoint_url(endpoint)
        .load()
        .await;
    Client::new(&config)
}

fn string_key(name: &str) -> Result<AttributeDefinition, BoxError> {
    Ok(AttributeDefinition::builder()
        .attribute_name(name)
        .attribute_type(ScalarAttributeType::S)
        .build()?)
}

fn hash_key(name: &str) -> Result<KeySchemaElement, BoxError> {
    Ok(KeySchemaElement::builder()
        .attribute_name(name)
        .key_type(KeyType::Hash)
        .build()?)
}

/// Creates the RSVP table with its `name` index.
pub async fn create_rsvp_table(client: &Client, table_name: &str) -> Result<(), BoxError> {
    let name_index = GlobalSecondaryIndex::builder()
        .index_name(NAME_INDEX)
        .key_schema(hash_key("name")?)
        .projection(
            Projection::builder()
                .projection_type(ProjectionType::All)
                .build(),
        )
        .build()?;

    client
        .create_table()
        .table_name(table_name)
        .attribute_definitions(string_key("id")?)
        .attribute_definitions(string_key("name")?)
        .key_schema(hash_key("id")?)
        .global_secondary_indexes(name_index)
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await?;
    Ok(())
}

pub async fn create_likes_table(client: &Client, table_name: &str) -> Result<(), BoxError> {
    client
        .create_table()
        .table_name(table_name)
        .attribute_definitions(string_key("pk")?)
        .key_schema(hash_key("pk")?)
        .billing_mode(BillingMode::PayPerRequest)
        .send()
        .await?;
    Ok(())
}

/// Deletes every item of a table whose hash key is `key_name`.
pub async fn clear_dynamo_table(
    client: &Client,
    table_name: &str,
    key_name: &str,
) -> Result<(), BoxError> {
    let output = client.scan().table_name(table_name).send().await?;
    let items = output.items.unwrap_or_default();
    debug!("Clearing {} items from '{}'", items.len(), table_name);

    for item in items {
        if let Some(key) = item.get(key_name) {
            client
                .delete_item()
                .table_name(table_name)
                .key(key_name, key.clone())
                .send()
                .await?;
        }
    }
    Ok(())
}

/// Number of items currently in a table.
pub async fn count_items(client: &Client, table_name: &str) -> Result<usize, BoxError> {
    let output = client.scan().table_name(table_name).send().await?;
    Ok(output.items.unwrap_or_default().len())
}

/// Sets the like counter item directly.
pub async fn seed_likes(client: &Client, table_name: &str, count: u64) -> Result<(), BoxError> {
    client
        .put_item()
        .table_name(table_name)
        .item("pk", AttributeValue::S(crate::store::dynamo::LIKES_KEY.to_string()))
        .item("count", AttributeValue::N(count.to_string()))
        .send()
        .await?;
    Ok(())
}
