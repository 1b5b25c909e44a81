mod kelvin;
mod utils;

use smart_leds::RGB8;

pub use kelvin::{clamp_kelvin, kelvin_to_cct_byte, mired_to_kelvin};
pub use utils::{Hsb, fraction_to_percent, rgb_to_hsb, wrap_hue};

pub type Rgb = RGB8;
