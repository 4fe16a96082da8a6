// 画像アップロードのリソース種別・コンテンツタイプ・オブジェクトキー

use url::Url;

/// 画像を持つリソースの種別
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageResource {
    Group,
    Event,
}

impl ImageResource {
    /// パスパラメータから種別を解釈
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "group" => Some(ImageResource::Group),
            "event" => Some(ImageResource::Event),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageResource::Group => "group",
            ImageResource::Event => "event",
        }
    }
}

/// アップロードを許可する画像形式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageContentType {
    Jpeg,
    Png,
    Webp,
}

impl ImageContentType {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "image/jpeg" => Some(ImageContentType::Jpeg),
            "image/png" => Some(ImageContentType::Png),
            "image/webp" => Some(ImageContentType::Webp),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            ImageContentType::Jpeg => "image/jpeg",
            ImageContentType::Png => "image/png",
            ImageContentType::Webp => "image/webp",
        }
    }

    /// MIMEタイプのサブタイプをそのまま拡張子として使う
    pub fn extension(&self) -> &'static str {
        match self {
            ImageContentType::Jpeg => "jpeg",
            ImageContentType::Png => "png",
            ImageContentType::Webp => "webp",
        }
    }
}

/// アップロード先のオブジェクトキー `{resource}/{id}.{extension}` を生成
pub fn object_key(resource: ImageResource, id: &str, content_type: ImageContentType) -> String {
    format!("{}/{}.{}", resource.as_str(), id, content_type.extension())
}

/// 公開URLからオブジェクトキー（パス部分）を取り出す
///
/// URLとして解釈できない、またはパスが空の場合はNone。
pub fn object_key_from_url(image_url: &str) -> Option<String> {
    let parsed = Url::parse(image_url).ok()?;
    let key = parsed.path().trim_start_matches('/');
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_parse() {
        assert_eq!(ImageResource::parse("group"), Some(ImageResource::Group));
        assert_eq!(ImageResource::parse("event"), Some(ImageResource::Event));
        assert_eq!(ImageResource::parse("user"), None);
    }

    #[test]
    fn test_content_type_allow_list() {
        assert_eq!(ImageContentType::parse("image/png"), Some(ImageContentType::Png));
        assert_eq!(ImageContentType::parse("image/webp"), Some(ImageContentType::Webp));
        assert_eq!(ImageContentType::parse("image/gif"), None);
        assert_eq!(ImageContentType::parse("application/pdf"), None);
    }

    #[test]
    fn test_object_key_format() {
        assert_eq!(
            object_key(ImageResource::Event, "abc", ImageContentType::Jpeg),
            "event/abc.jpeg"
        );
    }

    #[test]
    fn test_object_key_from_url() {
        assert_eq!(
            object_key_from_url("https://group-images.s3.amazonaws.com/group/abc.png"),
            Some("group/abc.png".to_string())
        );
        assert_eq!(object_key_from_url("https://group-images.s3.amazonaws.com/"), None);
        assert_eq!(object_key_from_url("garbage"), None);
    }
}
