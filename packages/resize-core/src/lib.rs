pub mod config;
pub mod constants;
pub mod errors;
pub mod proxy;
pub mod storage;
pub mod transform;
pub mod validation;
pub mod variant;

// 公開API
pub use config::{ProxySettings, ResponseMode};
pub use constants::{
    AUTO, CACHE_CONTROL_ONE_YEAR, DEFAULT_QUALITY, MAX_DIMENSION, MAX_PIXELS, SUPPORTED_WIDTHS,
};
pub use errors::{ConfigError, ProxyError, StorageError, TransformError};
pub use proxy::{ImageProxy, ProxyOutcome, ProxyRequest};
pub use storage::{MemoryStore, ObjectStore, S3ObjectStore, S3Options, StoredObject};
pub use transform::{OutputFormat, ResizeEngine, ResizePlan, ResizeResult};
pub use validation::{is_valid_width, validate_key};
pub use variant::{public_url, split_key, variant_key, SizeRequest, Width};
