/// 画像アップロードハンドラー
///
/// クライアントが直接S3にPUTするための署名付きURLを発行する。
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::api_error::ApiError;
use super::dispatcher::RouteHandler;
use super::request::ApiRequest;
use super::response::ApiResponse;
use super::route::Route;
use crate::domain::image::object_key;
use crate::domain::timestamp::new_id;
use crate::domain::{Caller, ImageContentType, ImageResource};
use crate::infrastructure::ImageStorage;

/// 署名付きURL発行リクエスト
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    #[serde(default)]
    pub file_type: Option<String>,
}

pub struct UploadHandler<S>
where
    S: ImageStorage,
{
    storage: S,
}

impl<S> UploadHandler<S>
where
    S: ImageStorage,
{
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// アップロード用の署名付きURLと公開URLを発行
    pub async fn presign(
        &self,
        caller: &Caller,
        resource: &str,
        request: UploadRequest,
    ) -> Result<ApiResponse, ApiError> {
        let resource =
            ImageResource::parse(resource).ok_or_else(|| ApiError::bad_request("Invalid resource"))?;

        let file_type = request
            .file_type
            .filter(|file_type| !file_type.is_empty())
            .ok_or_else(|| ApiError::bad_request("fileType is required"))?;
        let content_type = ImageContentType::parse(&file_type)
            .ok_or_else(|| ApiError::bad_request("Invalid file type"))?;

        let key = object_key(resource, &new_id(), content_type);
        let upload = self
            .storage
            .presign_upload(resource, &key, content_type)
            .await?;

        info!(
            resource = resource.as_str(),
            key = %key,
            user_id = %caller.user_id,
            "署名付きURL発行"
        );

        Ok(ApiResponse::ok(json!({
            "uploadUrl": upload.upload_url,
            "fileUrl": upload.file_url,
        })))
    }
}

#[async_trait]
impl<S> RouteHandler for UploadHandler<S>
where
    S: ImageStorage,
{
    async fn handle(
        &self,
        route: Route,
        request: &ApiRequest,
        caller: &Caller,
    ) -> Result<ApiResponse, ApiError> {
        match route {
            Route::PresignUpload => {
                let resource = request.path_param("resource")?;
                self.presign(caller, resource, request.json_body()?).await
            }
            _ => Err(ApiError::route_not_found()),
        }
    }
}
