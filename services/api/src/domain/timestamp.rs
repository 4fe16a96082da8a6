// タイムスタンプとID生成
//
// 保存する日時はすべて `YYYY-MM-DDTHH:MM:SS.mmmZ` 形式のUTC文字列に揃える。
// 同一形式であることが、日時の文字列比較（辞書順）を有効にする前提条件。

use chrono::{DateTime, SecondsFormat, Utc};

use super::ValidationError;

/// 現在時刻をISO-8601（UTC、ミリ秒）文字列で取得
pub fn now_iso() -> String {
    format_iso(Utc::now())
}

/// 日時を保存用の文字列形式に変換
pub fn format_iso(datetime: DateTime<Utc>) -> String {
    datetime.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// クライアントから受け取った日時文字列を保存用の形式に正規化
///
/// オフセット付きの入力はUTCに変換される。
pub fn normalize_iso(field: &'static str, value: &str) -> Result<String, ValidationError> {
    DateTime::parse_from_rfc3339(value)
        .map(|parsed| format_iso(parsed.with_timezone(&Utc)))
        .map_err(|_| ValidationError::InvalidDatetime { field })
}

/// 新しいレコードIDを生成
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
