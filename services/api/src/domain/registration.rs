// イベント参加登録のデータモデル
//
// (userId, eventId) ごとに最大1レコード。登録解除は物理削除。

use serde::{Deserialize, Serialize};

/// 参加登録レコード
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub id: String,
    pub user_id: String,
    pub event_id: String,
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Registration {
    pub fn new(id: String, user_id: &str, event_id: &str, now: &str) -> Self {
        Self {
            id,
            user_id: user_id.to_string(),
            event_id: event_id.to_string(),
            created_at: now.to_string(),
            updated_at: now.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registration_wire_format() {
        let registration = Registration::new("r-1".to_string(), "u-1", "e-1", "now");
        let value = serde_json::to_value(&registration).unwrap();

        assert_eq!(value["userId"], "u-1");
        assert_eq!(value["eventId"], "e-1");
        assert_eq!(value["createdAt"], "now");
        assert_eq!(value["updatedAt"], "now");
    }
}
