use async_trait::async_trait;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::ObjectCannedAcl;
use aws_sdk_s3::Client;
use bytes::Bytes;

use super::{ObjectStore, StorageError, StoredObject};
use crate::constants::{CACHE_CONTROL_ONE_YEAR, DEFAULT_MAX_INPUT_BYTES};

/// S3 クライアントの接続オプション
#[derive(Debug, Clone)]
pub struct S3Options {
    /// S3 互換ストレージ用のエンドポイント
    pub endpoint: Option<String>,
    pub force_path_style: bool,
    /// 保存時に `public-read` ACL を付けるか（ACL 無効のバケットでは false）
    pub public_read: bool,
    pub max_input_bytes: u64,
}

impl Default for S3Options {
    fn default() -> Self {
        Self {
            endpoint: None,
            force_path_style: false,
            public_read: true,
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
        }
    }
}

/// バケットに束縛された S3 クライアント
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
    public_read: bool,
    max_input_bytes: u64,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: impl Into<String>, options: &S3Options) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            public_read: options.public_read,
            max_input_bytes: options.max_input_bytes,
        }
    }

    /// 環境（AWS_REGION や認証情報）から SDK 設定を読み込んで接続する
    pub async fn connect(bucket: impl Into<String>, options: &S3Options) -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(options.force_path_style);
        if let Some(endpoint) = &options.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        let client = Client::from_conf(builder.build());
        Self::new(client, bucket, options)
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify(key, e))?;

        // 読み込み前にサイズを確認
        if let Some(size) = output.content_length().and_then(|l| u64::try_from(l).ok())
            && size > self.max_input_bytes
        {
            return Err(StorageError::TooLarge {
                size,
                max: self.max_input_bytes,
            });
        }

        let content_type = output.content_type().map(str::to_owned);
        let body = output
            .body
            .collect()
            .await
            .map_err(|e| StorageError::Upstream {
                status: None,
                message: format!("failed to read object body: {e}"),
            })?
            .into_bytes();

        Ok(StoredObject { body, content_type })
    }

    async fn head(&self, key: &str) -> Result<bool, StorageError> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => absent_if_not_found(classify(key, e)),
        }
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StorageError> {
        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .cache_control(CACHE_CONTROL_ONE_YEAR);
        if self.public_read {
            request = request.acl(ObjectCannedAcl::PublicRead);
        }

        request.send().await.map_err(|e| classify(key, e))?;
        Ok(())
    }
}

/// HEAD の 404 は「存在しない」として扱う
fn absent_if_not_found(err: StorageError) -> Result<bool, StorageError> {
    match err {
        StorageError::NotFound { .. } => Ok(false),
        other => Err(other),
    }
}

/// SDK のエラーを StorageError に分類する
///
/// ステータスが取れればそれを保持し、上流のメッセージも残す。
fn classify<E>(key: &str, err: SdkError<E, HttpResponse>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let status = err.raw_response().map(|r| r.status().as_u16());
    let code = err.code().map(str::to_owned);

    match (status, code.as_deref()) {
        (Some(404), _) | (_, Some("NoSuchKey" | "NotFound")) => StorageError::NotFound {
            key: key.to_string(),
        },
        (Some(403), _) | (_, Some("AccessDenied")) => {
            tracing::error!(key = %key, "access denied by object storage");
            StorageError::Forbidden
        }
        _ => {
            let message = err
                .message()
                .map(str::to_owned)
                .unwrap_or_else(|| DisplayErrorContext(&err).to_string());
            tracing::error!(key = %key, status = ?status, code = ?code, error = %message, "object storage request failed");
            StorageError::Upstream { status, message }
        }
    }
}
