/// DynamoDBリポジトリ共通のエラー型とアイテム変換・ページネーションヘルパー
///
/// 各リポジトリはserde_dynamoでドメイン型とアイテムを相互変換し、
/// クエリはLastEvaluatedKeyが無くなるまで読み進める。
use std::collections::HashMap;

use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::operation::query::builders::QueryFluentBuilder;
use aws_sdk_dynamodb::types::{
    AttributeValue, DeleteRequest, KeysAndAttributes, Select, WriteRequest,
};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// DynamoDBのアイテム表現
pub type Item = HashMap<String, AttributeValue>;

/// BatchWriteItemは1回最大25件まで
pub const BATCH_WRITE_SIZE: usize = 25;

/// BatchGetItemは1回最大100件まで
pub const BATCH_GET_SIZE: usize = 100;

/// リポジトリ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RepositoryError {
    /// DynamoDBへの書き込みに失敗
    #[error("Write error: {0}")]
    WriteError(String),

    /// DynamoDBからの読み取りに失敗
    #[error("Read error: {0}")]
    ReadError(String),

    /// データのシリアライズ/デシリアライズに失敗
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// ドメイン型をDynamoDBアイテムに変換
pub fn to_item<T: Serialize>(value: &T) -> Result<Item, RepositoryError> {
    serde_dynamo::aws_sdk_dynamodb_1::to_item(value)
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

/// DynamoDBアイテムをドメイン型に変換
pub fn from_item<T: DeserializeOwned>(item: Item) -> Result<T, RepositoryError> {
    serde_dynamo::aws_sdk_dynamodb_1::from_item(item)
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

/// 複数アイテムをまとめて変換
pub fn from_items<T: DeserializeOwned>(items: Vec<Item>) -> Result<Vec<T>, RepositoryError> {
    items.into_iter().map(from_item).collect()
}

/// 文字列属性1つからなるキー
pub fn string_key(name: &str, value: &str) -> Item {
    HashMap::from([(name.to_string(), AttributeValue::S(value.to_string()))])
}

/// 文字列属性2つからなる複合キー
pub fn composite_key(
    partition_name: &str,
    partition_value: &str,
    sort_name: &str,
    sort_value: &str,
) -> Item {
    HashMap::from([
        (
            partition_name.to_string(),
            AttributeValue::S(partition_value.to_string()),
        ),
        (sort_name.to_string(), AttributeValue::S(sort_value.to_string())),
    ])
}

/// SDKエラーを原因込みの文字列に変換
pub fn describe<E: std::error::Error>(err: E) -> String {
    DisplayErrorContext(err).to_string()
}

/// クエリを全ページ読み切ってアイテムを返す
pub async fn query_all(query: QueryFluentBuilder) -> Result<Vec<Item>, RepositoryError> {
    let mut items = Vec::new();
    let mut last_evaluated_key = None;

    // ページネーション: LastEvaluatedKeyがある限りクエリを続ける
    loop {
        let result = query
            .clone()
            .set_exclusive_start_key(last_evaluated_key.take())
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(describe(e)))?;

        if let Some(page) = result.items {
            items.extend(page);
        }

        match result.last_evaluated_key {
            Some(key) => last_evaluated_key = Some(key),
            None => break,
        }
    }

    Ok(items)
}

/// クエリに一致する件数を全ページ分合計する（アイテム本体は取得しない）
pub async fn count_all(query: QueryFluentBuilder) -> Result<usize, RepositoryError> {
    let mut count = 0usize;
    let mut last_evaluated_key = None;

    loop {
        let result = query
            .clone()
            .select(Select::Count)
            .set_exclusive_start_key(last_evaluated_key.take())
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(describe(e)))?;

        count += usize::try_from(result.count).unwrap_or_default();

        match result.last_evaluated_key {
            Some(key) => last_evaluated_key = Some(key),
            None => break,
        }
    }

    Ok(count)
}

/// キーの一覧をBatchGetItemで取得する
///
/// 100件ごとに順番に送信する。UnprocessedKeysが返った場合は失敗として扱う。
/// 見つからないキーは結果に含まれない。重複キーは呼び出し側で除いておくこと。
pub async fn batch_get_all(
    client: &DynamoDbClient,
    table_name: &str,
    keys: Vec<Item>,
) -> Result<Vec<Item>, RepositoryError> {
    let mut items = Vec::new();

    for chunk in keys.chunks(BATCH_GET_SIZE) {
        let request = KeysAndAttributes::builder()
            .set_keys(Some(chunk.to_vec()))
            .build()
            .map_err(|e| RepositoryError::ReadError(e.to_string()))?;

        let result = client
            .batch_get_item()
            .request_items(table_name, request)
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(describe(e)))?;

        let unprocessed = unprocessed_key_count(result.unprocessed_keys, table_name);
        if unprocessed > 0 {
            return Err(RepositoryError::ReadError(format!(
                "{} keys were not processed",
                unprocessed
            )));
        }

        if let Some(mut responses) = result.responses
            && let Some(found) = responses.remove(table_name)
        {
            items.extend(found);
        }
    }

    Ok(items)
}

/// キーの一覧をBatchWriteItemで削除する
///
/// 25件ごとに順番に送信する。UnprocessedItemsが返った場合は失敗として扱う。
pub async fn batch_delete_all(
    client: &DynamoDbClient,
    table_name: &str,
    keys: Vec<Item>,
) -> Result<(), RepositoryError> {
    let mut write_requests: Vec<WriteRequest> = Vec::with_capacity(keys.len());

    for key in keys {
        let delete_request = DeleteRequest::builder()
            .set_key(Some(key))
            .build()
            .map_err(|e| RepositoryError::WriteError(e.to_string()))?;

        write_requests.push(WriteRequest::builder().delete_request(delete_request).build());
    }

    for chunk in write_requests.chunks(BATCH_WRITE_SIZE) {
        let result = client
            .batch_write_item()
            .request_items(table_name, chunk.to_vec())
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(describe(e)))?;

        let unprocessed = unprocessed_item_count(result.unprocessed_items, table_name);
        if unprocessed > 0 {
            return Err(RepositoryError::WriteError(format!(
                "{} items were not processed",
                unprocessed
            )));
        }
    }

    Ok(())
}

/// BatchGetItemのUnprocessedKeysのうち、対象テーブル分の件数
fn unprocessed_key_count(
    unprocessed: Option<HashMap<String, KeysAndAttributes>>,
    table_name: &str,
) -> usize {
    unprocessed
        .and_then(|mut unprocessed| unprocessed.remove(table_name))
        .map(|rest| rest.keys.len())
        .unwrap_or(0)
}

/// BatchWriteItemのUnprocessedItemsのうち、対象テーブル分の件数
fn unprocessed_item_count(
    unprocessed: Option<HashMap<String, Vec<WriteRequest>>>,
    table_name: &str,
) -> usize {
    unprocessed
        .and_then(|mut unprocessed| unprocessed.remove(table_name))
        .map(|rest| rest.len())
        .unwrap_or(0)
}
