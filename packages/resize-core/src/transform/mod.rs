pub mod decode;
pub mod dimensions;
pub mod encode;
pub mod engine;
pub mod orientation;
pub mod params;
pub mod resize;

pub use decode::decode_image;
pub use dimensions::{calculate_crop_box, calculate_target_dimensions, CropBox};
pub use encode::encode_image;
pub use engine::{ResizeEngine, ResizeResult};
pub use orientation::read_orientation;
pub use params::{OutputFormat, ResizePlan};
pub use resize::resize_image;
