use crate::constants::MAX_KEY_LEN;
use crate::errors::ProxyError;

/// 画像キーを検証する
///
/// 空のキーや S3 の上限を超えるキーは存在し得ないので「見つからない」扱い。
pub fn validate_key(key: &str) -> Result<(), ProxyError> {
    if key.is_empty() {
        return Err(ProxyError::image_not_found());
    }

    if key.len() > MAX_KEY_LEN {
        tracing::warn!(len = key.len(), "image key exceeds maximum length");
        return Err(ProxyError::image_not_found());
    }

    Ok(())
}
