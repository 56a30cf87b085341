pub mod key;
pub mod size;

pub use key::{public_url, split_key, variant_key};
pub use size::{SizeRequest, Width};
