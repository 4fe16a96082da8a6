//! S3画像ストレージモジュール
//!
//! グループ画像・イベント画像のアップロード用署名付きURLの発行と、
//! 差し替えで不要になったオブジェクトの削除を提供する。

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client as S3Client;
use thiserror::Error;
use tracing::{info, warn};

use super::config::ImageBuckets;
use crate::domain::{ImageContentType, ImageResource};

/// 署名付きアップロードURLの有効期間（秒）
pub const UPLOAD_URL_TTL_SECONDS: u64 = 60;

/// ストレージ操作のエラー型
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StorageError {
    /// 署名付きURLの発行に失敗
    #[error("Presign error: {0}")]
    PresignError(String),

    /// オブジェクト削除に失敗
    #[error("Delete error: {0}")]
    DeleteError(String),
}

/// 発行済みのアップロード先
#[derive(Debug, Clone, PartialEq)]
pub struct PresignedUpload {
    /// PUT先の署名付きURL
    pub upload_url: String,
    /// アップロード後に参照する公開URL
    pub file_url: String,
}

/// 画像ストレージ操作トレイト（テスト用の抽象化）
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// 指定キーへのPUT用署名付きURLを発行
    async fn presign_upload(
        &self,
        resource: ImageResource,
        key: &str,
        content_type: ImageContentType,
    ) -> Result<PresignedUpload, StorageError>;

    /// オブジェクトを削除
    async fn delete_object(&self, resource: ImageResource, key: &str)
        -> Result<(), StorageError>;
}

/// 公開URL `https://{bucket}.s3.amazonaws.com/{key}` を組み立てる
pub fn public_url(bucket: &str, key: &str) -> String {
    format!("https://{}.s3.amazonaws.com/{}", bucket, key)
}

/// AWS S3 SDKを使用した画像ストレージ実装
#[derive(Debug, Clone)]
pub struct S3ImageStorage {
    client: S3Client,
    buckets: ImageBuckets,
}

impl S3ImageStorage {
    pub fn new(client: S3Client, buckets: ImageBuckets) -> Self {
        Self { client, buckets }
    }
}

#[async_trait]
impl ImageStorage for S3ImageStorage {
    async fn presign_upload(
        &self,
        resource: ImageResource,
        key: &str,
        content_type: ImageContentType,
    ) -> Result<PresignedUpload, StorageError> {
        let bucket = self.buckets.bucket_for(resource);

        let presigning = PresigningConfig::expires_in(Duration::from_secs(UPLOAD_URL_TTL_SECONDS))
            .map_err(|e| StorageError::PresignError(e.to_string()))?;

        let request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type(content_type.mime())
            .presigned(presigning)
            .await
            .map_err(|e| {
                warn!(bucket = %bucket, key = %key, error = %e, "署名付きURL発行エラー");
                StorageError::PresignError(e.to_string())
            })?;

        info!(bucket = %bucket, key = %key, "署名付きアップロードURL発行");

        Ok(PresignedUpload {
            upload_url: request.uri().to_string(),
            file_url: public_url(bucket, key),
        })
    }

    async fn delete_object(&self, resource: ImageResource, key: &str) -> Result<(), StorageError> {
        let bucket = self.buckets.bucket_for(resource);

        self.client
            .delete_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                warn!(bucket = %bucket, key = %key, error = %e, "S3オブジェクト削除エラー");
                StorageError::DeleteError(e.to_string())
            })?;

        info!(bucket = %bucket, key = %key, "S3オブジェクト削除");
        Ok(())
    }
}
