mod types;

pub use types::{ConfigError, ProxyError, StorageError, TransformError};
