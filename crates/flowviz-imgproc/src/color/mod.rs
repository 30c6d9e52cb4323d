mod gray;
mod hsv;

pub use gray::{gray_from_rgb, gray_from_rgb_u8, rgb_from_gray};
pub use hsv::rgb_from_hsv;
