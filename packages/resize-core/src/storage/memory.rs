use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use bytes::Bytes;

use super::{ObjectStore, StorageError, StoredObject};

/// プロセス内のマップに保存するストア
///
/// 操作ごとの呼び出し回数を数えるので、テストで
/// 「ストレージに触れていない」ことを確認できる。
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    gets: AtomicUsize,
    heads: AtomicUsize,
    puts: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 呼び出し回数を変えずにオブジェクトを置く
    pub fn insert(&self, key: impl Into<String>, body: impl Into<Bytes>, content_type: &str) {
        self.lock().insert(
            key.into(),
            StoredObject {
                body: body.into(),
                content_type: Some(content_type.to_string()),
            },
        );
    }

    /// 呼び出し回数を変えずに中身を覗く
    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.lock().get(key).cloned()
    }

    pub fn get_count(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    pub fn head_count(&self) -> usize {
        self.heads.load(Ordering::SeqCst)
    }

    pub fn put_count(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn call_count(&self) -> usize {
        self.get_count() + self.head_count() + self.put_count()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, StoredObject>> {
        // 保持中に panic してもマップ自体は壊れない
        self.objects.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<StoredObject, StorageError> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.lock()
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                key: key.to_string(),
            })
    }

    async fn head(&self, key: &str) -> Result<bool, StorageError> {
        self.heads.fetch_add(1, Ordering::SeqCst);
        Ok(self.lock().contains_key(key))
    }

    async fn put(&self, key: &str, body: Bytes, content_type: &str) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        self.lock().insert(
            key.to_string(),
            StoredObject {
                body,
                content_type: Some(content_type.to_string()),
            },
        );
        Ok(())
    }
}
