//! オブジェクトストレージへのアクセス
//!
//! ハンドラは [`ObjectStore`] トレイト越しにのみストレージを扱う。
//! 本番は [`S3ObjectStore`]、テストやローカル開発は [`MemoryStore`]。

pub mod memory;
pub mod s3;

use async_trait::async_trait;
use bytes::Bytes;

pub use crate::errors::StorageError;
pub use memory::MemoryStore;
pub use s3::{S3ObjectStore, S3Options};

/// `get` で取得したオブジェクト
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub body: Bytes,
    pub content_type: Option<String>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// オブジェクトを取得する。存在しなければ `StorageError::NotFound`
    async fn get(&self, key: &str) -> Result<StoredObject, StorageError>;

    /// オブジェクトが存在するか
    async fn head(&self, key: &str) -> Result<bool, StorageError>;

    /// オブジェクトを保存する
    ///
    /// 派生画像はサイズごとに別キーで不変なので、常に 1 年の
    /// Cache-Control を付ける。
    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StorageError>;
}
