pub mod key;
pub mod size;

pub use key::validate_key;
pub use size::is_valid_width;
