/// EventRegistrationsテーブルのリポジトリ
///
/// キーは (userId, eventId)。イベント側からの参照にはEventIdIndexを使う。
use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoDbClient;

use super::dynamo::{
    composite_key, describe, from_item, from_items, query_all, to_item, Item, RepositoryError,
};
use crate::domain::Registration;

/// イベントIDから参加登録を引くためのインデックス
const EVENT_ID_INDEX: &str = "EventIdIndex";

/// 参加登録永続化用トレイト
#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    async fn get(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<Option<Registration>, RepositoryError>;

    async fn put(&self, registration: &Registration) -> Result<(), RepositoryError>;

    /// 参加登録を物理削除
    async fn delete(&self, user_id: &str, event_id: &str) -> Result<(), RepositoryError>;

    /// イベントの全参加登録を取得
    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Registration>, RepositoryError>;

    /// ユーザーの全参加登録を取得
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Registration>, RepositoryError>;
}

/// RegistrationRepositoryのDynamoDB実装
#[derive(Debug, Clone)]
pub struct DynamoRegistrationRepository {
    /// DynamoDBクライアント
    client: DynamoDbClient,
    /// 参加登録テーブル名
    table_name: String,
}

impl DynamoRegistrationRepository {
    pub fn new(client: DynamoDbClient, table_name: String) -> Self {
        Self { client, table_name }
    }

    fn key(user_id: &str, event_id: &str) -> Item {
        composite_key("userId", user_id, "eventId", event_id)
    }
}

#[async_trait]
impl RegistrationRepository for DynamoRegistrationRepository {
    async fn get(
        &self,
        user_id: &str,
        event_id: &str,
    ) -> Result<Option<Registration>, RepositoryError> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(user_id, event_id)))
            .send()
            .await
            .map_err(|e| RepositoryError::ReadError(describe(e)))?;

        result.item.map(from_item).transpose()
    }

    async fn put(&self, registration: &Registration) -> Result<(), RepositoryError> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(to_item(registration)?))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(describe(e)))?;

        Ok(())
    }

    async fn delete(&self, user_id: &str, event_id: &str) -> Result<(), RepositoryError> {
        self.client
            .delete_item()
            .table_name(&self.table_name)
            .set_key(Some(Self::key(user_id, event_id)))
            .send()
            .await
            .map_err(|e| RepositoryError::WriteError(describe(e)))?;

        Ok(())
    }

    async fn list_by_event(&self, event_id: &str) -> Result<Vec<Registration>, RepositoryError> {
        let query = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(EVENT_ID_INDEX)
            .key_condition_expression("eventId = :eid")
            .expression_attribute_values(":eid", AttributeValue::S(event_id.to_string()));

        from_items(query_all(query).await?)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<Registration>, RepositoryError> {
        // パーティションキーがuserIdのためテーブル本体をクエリする
        let query = self
            .client
            .query()
            .table_name(&self.table_name)
            .key_condition_expression("userId = :uid")
            .expression_attribute_values(":uid", AttributeValue::S(user_id.to_string()));

        from_items(query_all(query).await?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    // ユニットテスト用のモックRegistrationRepository
    #[derive(Debug, Clone, Default)]
    pub struct MockRegistrationRepository {
        /// 保存された参加登録: (user_id, event_id) -> Registration
        registrations: Arc<Mutex<HashMap<(String, String), Registration>>>,
        /// 次の操作で返すエラー（エラーパスのテスト用）
        next_error: Arc<Mutex<Option<RepositoryError>>>,
    }

    impl MockRegistrationRepository {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_next_error(&self, error: RepositoryError) {
            *self.next_error.lock().unwrap() = Some(error);
        }

        pub fn insert(&self, registration: Registration) {
            let key = (registration.user_id.clone(), registration.event_id.clone());
            self.registrations.lock().unwrap().insert(key, registration);
        }

        pub fn registration_count(&self) -> usize {
            self.registrations.lock().unwrap().len()
        }

        fn take_error(&self) -> Option<RepositoryError> {
            self.next_error.lock().unwrap().take()
        }

        fn filtered(&self, predicate: impl Fn(&Registration) -> bool) -> Vec<Registration> {
            let mut registrations: Vec<Registration> = self
                .registrations
                .lock()
                .unwrap()
                .values()
                .filter(|r| predicate(r))
                .cloned()
                .collect();
            registrations.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
            registrations
        }
    }

    #[async_trait]
    impl RegistrationRepository for MockRegistrationRepository {
        async fn get(
            &self,
            user_id: &str,
            event_id: &str,
        ) -> Result<Option<Registration>, RepositoryError> {
            if let Some(error) = self.take_error() {
                return Err(error);
            }
            let key = (user_id.to_string(), event_id.to_string());
            Ok(self.registrations.lock().unwrap().get(&key).cloned())
        }

        async fn put(&self, registration: &Registration) -> Result<(), RepositoryError> {
            if let Some(error) = self.take_error() {
                return Err(error);
            }
            self.insert(registration.clone());
            Ok(())
        }

        async fn delete(&self, user_id: &str, event_id: &str) -> Result<(), RepositoryError> {
            if let Some(error) = self.take_error() {
                return Err(error);
            }
            let key = (user_id.to_string(), event_id.to_string());
            self.registrations.lock().unwrap().remove(&key);
            Ok(())
        }

        async fn list_by_event(
            &self,
            event_id: &str,
        ) -> Result<Vec<Registration>, RepositoryError> {
            if let Some(error) = self.take_error() {
                return Err(error);
            }
            Ok(self.filtered(|r| r.event_id == event_id))
        }

        async fn list_by_user(&self, user_id: &str) -> Result<Vec<Registration>, RepositoryError> {
            if let Some(error) = self.take_error() {
                return Err(error);
            }
            Ok(self.filtered(|r| r.user_id == user_id))
        }
    }

    #[tokio::test]
    async fn test_mock_repo_one_registration_per_user_and_event() {
        let repo = MockRegistrationRepository::new();
        repo.put(&Registration::new("r-1".to_string(), "u-1", "e-1", "now"))
            .await
            .unwrap();
        repo.put(&Registration::new("r-2".to_string(), "u-1", "e-1", "later"))
            .await
            .unwrap();
        repo.put(&Registration::new("r-3".to_string(), "u-2", "e-1", "now"))
            .await
            .unwrap();

        assert_eq!(repo.registration_count(), 2);
        assert_eq!(repo.list_by_event("e-1").await.unwrap().len(), 2);
        assert_eq!(repo.list_by_user("u-1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_mock_repo_delete() {
        let repo = MockRegistrationRepository::new();
        repo.insert(Registration::new("r-1".to_string(), "u-1", "e-1", "now"));

        repo.delete("u-1", "e-1").await.unwrap();

        assert!(repo.get("u-1", "e-1").await.unwrap().is_none());
        assert_eq!(repo.registration_count(), 0);
    }
}
