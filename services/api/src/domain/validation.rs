/// 入力値検証のエラー型
///
/// リクエストボディのスキーマ検証で発生するエラーを表す。
/// アプリケーション層で400 Bad Requestに変換される。
use thiserror::Error;

/// 入力検証エラー
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// 文字列が最小長に満たない
    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    /// 日時がISO-8601形式ではない
    #[error("{field} must be an ISO-8601 datetime")]
    InvalidDatetime { field: &'static str },

    /// URLとして解釈できない
    #[error("{field} must be a valid URL")]
    InvalidUrl { field: &'static str },

    /// 正の数ではない
    #[error("{field} must be positive")]
    NotPositive { field: &'static str },
}

/// 文字数（バイト数ではなくUnicodeスカラー値の数）で最小長を検証
pub fn require_min_chars(
    field: &'static str,
    value: &str,
    min: usize,
) -> Result<(), ValidationError> {
    if value.chars().count() < min {
        return Err(ValidationError::TooShort { field, min });
    }
    Ok(())
}

/// http/httpsの絶対URLであることを検証
pub fn require_url(field: &'static str, value: &str) -> Result<(), ValidationError> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(ValidationError::InvalidUrl { field }),
    }
}

/// 有限の正の数であることを検証
pub fn require_positive(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::NotPositive { field })
    }
}
