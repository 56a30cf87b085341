//! 1 リクエスト分の処理: 取得 → リサイズ → 保存 → 応答
//!
//! 状態は持たず、入力の有無と妥当性だけで分岐する。
//! 同じキーへの同時リクエストはそれぞれ独立に計算してよい。

use std::sync::Arc;

use bytes::Bytes;

use crate::config::ProxySettings;
use crate::errors::{ProxyError, StorageError, TransformError};
use crate::storage::ObjectStore;
use crate::transform::{ResizeEngine, ResizePlan};
use crate::validation::validate_key;
use crate::variant::{public_url, variant_key, SizeRequest};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// HTTP 層から渡されるリクエスト（クエリは未解釈の文字列のまま）
#[derive(Debug, Clone, Default)]
pub struct ProxyRequest {
    pub key: String,
    pub width: Option<String>,
    pub height: Option<String>,
}

/// HTTP 層が応答に変換する処理結果
#[derive(Debug, Clone)]
pub enum ProxyOutcome {
    Redirect { location: String },
    Image { body: Bytes, content_type: String },
}

/// 設定から解決した配信元
struct Origins<'a> {
    original: &'a str,
    variant: &'a str,
}

pub struct ImageProxy {
    settings: ProxySettings,
    store: Arc<dyn ObjectStore>,
    engine: ResizeEngine,
}

impl ImageProxy {
    pub fn new(settings: ProxySettings, store: Arc<dyn ObjectStore>) -> Self {
        let engine = settings.engine();
        Self {
            settings,
            store,
            engine,
        }
    }

    pub fn settings(&self) -> &ProxySettings {
        &self.settings
    }

    pub async fn handle(&self, request: &ProxyRequest) -> Result<ProxyOutcome, ProxyError> {
        let origins = self.origins()?;
        validate_key(&request.key)?;

        let size = SizeRequest::parse(request.width.as_deref(), request.height.as_deref())
            .inspect_err(|_| {
                tracing::warn!(
                    key = %request.key,
                    width = ?request.width,
                    height = ?request.height,
                    "rejected image size"
                );
            })?;

        match size {
            SizeRequest::Original => self.serve_original(&request.key, &origins).await,
            SizeRequest::WidthOnly(_) | SizeRequest::WidthHeight(..) => {
                self.serve_variant(&request.key, size, &origins).await
            }
        }
    }

    fn origins(&self) -> Result<Origins<'_>, ProxyError> {
        if self.settings.bucket.is_none() {
            tracing::error!("BUCKET is not set");
            return Err(ProxyError::missing_config("BUCKET"));
        }
        let (Some(original), Some(variant)) = (
            self.settings.public_url.as_deref(),
            self.settings.variant_base_url(),
        ) else {
            tracing::error!("URL is not set");
            return Err(ProxyError::missing_config("URL"));
        };
        Ok(Origins { original, variant })
    }

    async fn serve_original(
        &self,
        key: &str,
        origins: &Origins<'_>,
    ) -> Result<ProxyOutcome, ProxyError> {
        if self.settings.response_mode.returns_body() {
            tracing::info!(key = %key, "fetching original");
            return self.fetch(key).await;
        }

        if !self.store.head(key).await? {
            tracing::warn!(key = %key, "original not found");
            return Err(StorageError::NotFound {
                key: key.to_string(),
            }
            .into());
        }

        Ok(ProxyOutcome::Redirect {
            location: public_url(origins.original, key),
        })
    }

    async fn serve_variant(
        &self,
        key: &str,
        size: SizeRequest,
        origins: &Origins<'_>,
    ) -> Result<ProxyOutcome, ProxyError> {
        let variant = variant_key(key, &size);
        if variant == key {
            // 派生キーが元画像と同じになるので保存すると上書きしてしまう
            tracing::warn!(key = %key, "image key has no folder, refusing to resize");
            return Err(ProxyError::Validation(
                "Error: Image key has no folder; resized variants are unavailable.".to_string(),
            ));
        }

        if self.settings.check_variant_cache && self.store.head(&variant).await? {
            tracing::info!(key = %key, variant = %variant, "serving cached variant");
            return self.respond_variant(&variant, origins).await;
        }

        tracing::info!(key = %key, "fetching original");
        let original = self.store.get(key).await?;

        let plan = ResizePlan::from_request(&size, self.settings.crop_to_height);
        tracing::info!(key = %key, variant = %variant, plan = ?plan, "transforming image");

        let engine = self.engine;
        let result = tokio::task::spawn_blocking(move || engine.resize(&original.body, plan))
            .await
            .map_err(|e| TransformError::ProcessingFailed(format!("resize task failed: {e}")))??;

        tracing::info!(
            variant = %variant,
            bytes = result.bytes.len(),
            content_type = result.content_type,
            "storing variant"
        );
        self.store
            .put(&variant, result.bytes.clone(), result.content_type)
            .await?;

        if self.settings.response_mode.returns_body() {
            return Ok(ProxyOutcome::Image {
                body: result.bytes,
                content_type: result.content_type.to_string(),
            });
        }

        Ok(ProxyOutcome::Redirect {
            location: public_url(origins.variant, &variant),
        })
    }

    async fn respond_variant(
        &self,
        variant: &str,
        origins: &Origins<'_>,
    ) -> Result<ProxyOutcome, ProxyError> {
        if self.settings.response_mode.returns_body() {
            return self.fetch(variant).await;
        }
        Ok(ProxyOutcome::Redirect {
            location: public_url(origins.variant, variant),
        })
    }

    async fn fetch(&self, key: &str) -> Result<ProxyOutcome, ProxyError> {
        let object = self.store.get(key).await?;
        Ok(ProxyOutcome::Image {
            body: object.body,
            content_type: object
                .content_type
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ResponseMode;
    use crate::constants::SUPPORTED_WIDTHS;
    use crate::storage::MemoryStore;
    use crate::variant::Width;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    const PUBLIC_URL: &str = "https://images.example.com";
    const CDN_URL: &str = "https://cdn.example.com";

    fn png(w: u32, h: u32) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        DynamicImage::new_rgb8(w, h)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    fn configured() -> ProxySettings {
        ProxySettings {
            bucket: Some("images".to_string()),
            public_url: Some(PUBLIC_URL.to_string()),
            ..ProxySettings::default()
        }
    }

    fn proxy_with(settings: ProxySettings) -> (ImageProxy, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        store.insert("photos/beach.jpg", png(1280, 960), "image/png");
        (ImageProxy::new(settings, store.clone()), store)
    }

    fn request(key: &str, width: Option<&str>, height: Option<&str>) -> ProxyRequest {
        ProxyRequest {
            key: key.to_string(),
            width: width.map(str::to_string),
            height: height.map(str::to_string),
        }
    }

    fn location(outcome: ProxyOutcome) -> String {
        match outcome {
            ProxyOutcome::Redirect { location } => location,
            other => panic!("expected redirect, got {other:?}"),
        }
    }

    fn stored_width(store: &MemoryStore, key: &str) -> u32 {
        let object = store.object(key).expect("variant stored");
        image::load_from_memory(&object.body).unwrap().width()
    }

    #[tokio::test]
    async fn test_missing_bucket_is_configuration_error() {
        let settings = ProxySettings {
            bucket: None,
            ..configured()
        };
        let (proxy, store) = proxy_with(settings);

        let err = proxy
            .handle(&request("foo/bar.jpg", Some("640"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::Configuration(ref m) if m.contains("BUCKET")));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_url_is_configuration_error() {
        let settings = ProxySettings {
            public_url: None,
            cdn_url: Some(CDN_URL.to_string()),
            ..configured()
        };
        let (proxy, store) = proxy_with(settings);

        let err = proxy
            .handle(&request("photos/beach.jpg", None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::Configuration(_)));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_key_is_not_found() {
        let (proxy, store) = proxy_with(configured());

        let err = proxy.handle(&request("", Some("640"), None)).await.unwrap_err();
        assert_eq!(err.to_string(), "Error: Image not found.");
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_unsupported_width_touches_no_storage() {
        let (proxy, store) = proxy_with(configured());

        for width in ["999", "641", "abc"] {
            let err = proxy
                .handle(&request("photos/beach.jpg", Some(width), None))
                .await
                .unwrap_err();
            assert_eq!(err.to_string(), "Error: Invalid image size.");
        }
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_original_redirect() {
        let (proxy, store) = proxy_with(configured());

        let outcome = proxy
            .handle(&request("photos/beach.jpg", None, None))
            .await
            .unwrap();
        assert_eq!(location(outcome), "https://images.example.com/photos/beach.jpg");
        assert_eq!(store.head_count(), 1);
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn test_original_missing() {
        let (proxy, _store) = proxy_with(configured());

        let err = proxy
            .handle(&request("photos/missing.jpg", None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::Storage(StorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_resize_stores_variant_and_redirects() {
        let (proxy, store) = proxy_with(configured());

        let outcome = proxy
            .handle(&request("photos/beach.jpg", Some("640"), None))
            .await
            .unwrap();

        assert_eq!(
            location(outcome),
            "https://images.example.com/photos/640xAUTO/beach.jpg"
        );
        assert_eq!(store.put_count(), 1);
        assert_eq!(stored_width(&store, "photos/640xAUTO/beach.jpg"), 640);
        let stored = store.object("photos/640xAUTO/beach.jpg").unwrap();
        assert_eq!(stored.content_type.as_deref(), Some("image/jpeg"));
    }

    #[tokio::test]
    async fn test_large_photos_are_resized() {
        let (proxy, store) = proxy_with(configured());
        store.insert("photos/portrait.jpg", png(3000, 4000), "image/png");
        store.insert("photos/camera.jpg", png(6000, 4000), "image/png");

        // 縦長写真は出力の高さが 4096px を超える
        proxy
            .handle(&request("photos/portrait.jpg", Some("3840"), None))
            .await
            .unwrap();
        let stored = store.object("photos/3840xAUTO/portrait.jpg").unwrap();
        let img = image::load_from_memory(&stored.body).unwrap();
        assert_eq!((img.width(), img.height()), (3840, 5120));

        proxy
            .handle(&request("photos/camera.jpg", Some("AUTO"), None))
            .await
            .unwrap();
        assert_eq!(stored_width(&store, "photos/AUTOxAUTO/camera.jpg"), 6000);
        assert_eq!(store.put_count(), 2);
    }

    #[tokio::test]
    async fn test_variant_uses_cdn_url() {
        let settings = ProxySettings {
            cdn_url: Some(CDN_URL.to_string()),
            ..configured()
        };
        let (proxy, _store) = proxy_with(settings);

        let outcome = proxy
            .handle(&request("photos/beach.jpg", Some("320"), None))
            .await
            .unwrap();
        assert_eq!(location(outcome), "https://cdn.example.com/photos/320xAUTO/beach.jpg");
    }

    #[tokio::test]
    async fn test_repeated_request_uses_cached_variant() {
        let (proxy, store) = proxy_with(configured());
        let req = request("photos/beach.jpg", Some("800"), None);

        let first = location(proxy.handle(&req).await.unwrap());
        let second = location(proxy.handle(&req).await.unwrap());

        assert_eq!(first, second);
        assert_eq!(store.put_count(), 1);
        // 2 回目は head のみ
        assert_eq!(store.get_count(), 1);
        assert_eq!(store.head_count(), 2);
    }

    #[tokio::test]
    async fn test_cache_check_disabled_recomputes() {
        let settings = ProxySettings {
            check_variant_cache: false,
            ..configured()
        };
        let (proxy, store) = proxy_with(settings);
        let req = request("photos/beach.jpg", Some("800"), None);

        proxy.handle(&req).await.unwrap();
        proxy.handle(&req).await.unwrap();

        assert_eq!(store.head_count(), 0);
        assert_eq!(store.put_count(), 2);
    }

    #[tokio::test]
    async fn test_stored_key_matches_variant_key() {
        let (proxy, store) = proxy_with(configured());

        for width in SUPPORTED_WIDTHS.into_iter().take(4) {
            let raw = width.to_string();
            proxy
                .handle(&request("photos/beach.jpg", Some(&raw), None))
                .await
                .unwrap();

            let expected = variant_key(
                "photos/beach.jpg",
                &SizeRequest::WidthOnly(Width::Pixels(width)),
            );
            assert!(store.object(&expected).is_some(), "missing {expected}");
        }
    }

    #[tokio::test]
    async fn test_height_is_part_of_key_but_ignored_without_crop() {
        let (proxy, store) = proxy_with(configured());

        proxy
            .handle(&request("photos/beach.jpg", Some("640"), Some("200")))
            .await
            .unwrap();

        let object = store.object("photos/640x200/beach.jpg").unwrap();
        let img = image::load_from_memory(&object.body).unwrap();
        assert_eq!((img.width(), img.height()), (640, 480));
    }

    #[tokio::test]
    async fn test_crop_to_height() {
        let settings = ProxySettings {
            crop_to_height: true,
            ..configured()
        };
        let (proxy, store) = proxy_with(settings);

        proxy
            .handle(&request("photos/beach.jpg", Some("640"), Some("200")))
            .await
            .unwrap();

        let object = store.object("photos/640x200/beach.jpg").unwrap();
        let img = image::load_from_memory(&object.body).unwrap();
        assert_eq!((img.width(), img.height()), (640, 200));
    }

    #[tokio::test]
    async fn test_key_without_folder_is_not_overwritten() {
        let (proxy, store) = proxy_with(configured());
        store.insert("beach.jpg", png(100, 100), "image/png");

        let err = proxy
            .handle(&request("beach.jpg", Some("640"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::Validation(_)));
        assert_eq!(store.put_count(), 0);
        assert_eq!(
            store.object("beach.jpg").unwrap().content_type.as_deref(),
            Some("image/png")
        );
    }

    #[tokio::test]
    async fn test_corrupt_original_is_not_stored() {
        let (proxy, store) = proxy_with(configured());
        store.insert("photos/broken.jpg", b"not an image".to_vec(), "image/jpeg");

        let err = proxy
            .handle(&request("photos/broken.jpg", Some("640"), None))
            .await
            .unwrap_err();
        assert!(matches!(err, ProxyError::Transform(_)));
        assert_eq!(store.put_count(), 0);
    }

    #[tokio::test]
    async fn test_bytes_mode_returns_resized_image() {
        let settings = ProxySettings {
            response_mode: ResponseMode::Bytes,
            ..configured()
        };
        let (proxy, store) = proxy_with(settings);

        let outcome = proxy
            .handle(&request("photos/beach.jpg", Some("320"), None))
            .await
            .unwrap();
        let ProxyOutcome::Image { body, content_type } = outcome else {
            panic!("expected image body");
        };

        assert_eq!(content_type, "image/jpeg");
        assert_eq!(image::load_from_memory(&body).unwrap().width(), 320);
        assert_eq!(store.object("photos/320xAUTO/beach.jpg").unwrap().body, body);
    }

    #[tokio::test]
    async fn test_bytes_mode_original_keeps_content_type() {
        let settings = ProxySettings {
            response_mode: ResponseMode::Base64,
            ..configured()
        };
        let (proxy, store) = proxy_with(settings);

        let outcome = proxy
            .handle(&request("photos/beach.jpg", None, None))
            .await
            .unwrap();
        let ProxyOutcome::Image { content_type, .. } = outcome else {
            panic!("expected image body");
        };
        assert_eq!(content_type, "image/png");
        assert_eq!(store.head_count(), 0);
        assert_eq!(store.get_count(), 1);
    }
}
