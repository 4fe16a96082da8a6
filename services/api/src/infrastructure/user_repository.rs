/// Usersテーブルのリポジトリ
use std::collections::BTreeSet;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoDbClient;

use super::dynamo::{
    batch_get_all, describe, from_item, from_items, string_key, to_item, RepositoryError,
};
use crate::domain::UserProfile;

/// ユーザープロフィール永続化用トレイト
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, RepositoryError>;

    async fn put(&self, profile: &UserProfile) -> Result<(), RepositoryError>;

    /// 複数ユーザーのプロフィールをまとめて取得（存在しないIDは無視）
    async fn batch_get(&self, user_ids: &[String]) -> Result<Vec<UserProfile>, RepositoryError>;
}

/// UserRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoUserRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// ユーザーテーブル名
    table_name: String,
}

impl DynamoUserRepository {
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }
}

#[async_trait]
impl UserRepository for DynamoUserRepository {
    async fn get(&self, user_id: &str) -> Result<Option<UserProfile>, RepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(string_key("id", user_id)))
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(describe(e)))?;

        result.item.map(from_item).transpose()
    }

    async fn put(&self, profile: &UserProfile) -> Result<(), RepositoryError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(profile)?))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(describe(e)))?;

        Ok(())
    }

    async fn batch_get(&self, user_ids: &[String]) -> Result<Vec<UserProfile>, RepositoryError> {
        let unique: BTreeSet<&String> = user_ids.iter().collect();
        let keys = unique.into_iter().map(|id| string_key("id", id)).collect();

        from_items(batch_get_all(&self.client, &self.table_name, keys).await?)
    }
}
