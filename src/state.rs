//! Light state model
//!
//! [`LightState`] is what the host light abstraction asks for,
//! [`ResolvedChannels`] is what is left after the colour model normalised it
//! against the fixture configuration.

use crate::color::{Rgb, mired_to_kelvin, rgb_to_hsb};

/// Bias applied by the fixture when green-magenta is neutral
pub const GREEN_MAGENTA_NEUTRAL: f32 = 0.0;
/// Lowest accepted green-magenta bias
pub const GREEN_MAGENTA_MIN: f32 = -50.0;
/// Highest accepted green-magenta bias
pub const GREEN_MAGENTA_MAX: f32 = 50.0;

/// Which colour axis the fixture is emitting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Colour wheel (hue/saturation)
    #[default]
    Rgb,
    /// Correlated colour temperature
    Cct,
}

impl Mode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rgb => "rgb",
            Self::Cct => "cct",
        }
    }
}

/// Requested state of the fixture
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LightState {
    /// Requested (or, when cached by the driver, resolved) mode
    pub mode: Mode,
    /// Power
    pub is_on: bool,
    /// Hue in degrees, `[0, 360)`
    pub hue: f32,
    /// Saturation, `[0, 1]`
    pub saturation: f32,
    /// Brightness, `[0, 1]`
    pub brightness: f32,
    /// Colour temperature in Kelvin
    pub color_temperature_kelvin: f32,
    /// Green-magenta tint, `[-50, 50]`
    pub green_magenta_bias: f32,
}

impl LightState {
    /// Neutral state the driver starts from
    pub const fn new() -> Self {
        Self {
            mode: Mode::Rgb,
            is_on: false,
            hue: 0.0,
            saturation: 0.0,
            brightness: 0.0,
            color_temperature_kelvin: 0.0,
            green_magenta_bias: GREEN_MAGENTA_NEUTRAL,
        }
    }

    /// Turn the light on or off
    #[must_use]
    pub const fn with_power(mut self, is_on: bool) -> Self {
        self.is_on = is_on;
        self
    }

    /// Set the colour wheel position
    #[must_use]
    pub const fn with_hs(mut self, hue: f32, saturation: f32) -> Self {
        self.mode = Mode::Rgb;
        self.hue = hue;
        self.saturation = saturation;
        self
    }

    /// Set the colour from an RGB triple
    ///
    /// The brightness of the triple becomes the light brightness.
    #[must_use]
    pub fn with_rgb(mut self, rgb: Rgb) -> Self {
        let hsb = rgb_to_hsb(rgb);
        self.mode = Mode::Rgb;
        self.hue = f32::from(hsb.hue);
        self.saturation = hsb.saturation;
        self.brightness = hsb.brightness;
        self
    }

    /// Set the colour temperature in Kelvin
    #[must_use]
    pub const fn with_kelvin(mut self, kelvin: f32) -> Self {
        self.mode = Mode::Cct;
        self.color_temperature_kelvin = kelvin;
        self
    }

    /// Set the colour temperature in mireds
    #[must_use]
    pub fn with_mireds(self, mired: f32) -> Self {
        self.with_kelvin(mired_to_kelvin(mired))
    }

    /// Set the brightness
    #[must_use]
    pub const fn with_brightness(mut self, brightness: f32) -> Self {
        self.brightness = brightness;
        self
    }

    /// Set the green-magenta bias
    #[must_use]
    pub const fn with_green_magenta_bias(mut self, bias: f32) -> Self {
        self.green_magenta_bias = bias;
        self
    }

    /// Check if hue or saturation differ from `other`
    pub fn rgb_changed(&self, other: &Self) -> bool {
        differs(self.hue, other.hue) || differs(self.saturation, other.saturation)
    }

    /// Check if the colour temperature differs from `other`
    pub fn cct_changed(&self, other: &Self) -> bool {
        differs(self.color_temperature_kelvin, other.color_temperature_kelvin)
    }

    /// Check if the brightness differs from `other`
    pub fn brightness_changed(&self, other: &Self) -> bool {
        differs(self.brightness, other.brightness)
    }

    /// Check if the green-magenta bias differs from `other`
    pub fn tint_changed(&self, other: &Self) -> bool {
        differs(self.green_magenta_bias, other.green_magenta_bias)
    }

    /// Check if any transmitted field differs from `other`
    ///
    /// The requested mode is not part of the comparison, it is an input to
    /// the interlock policy and not a device value.
    pub fn output_changed(&self, other: &Self) -> bool {
        self.is_on != other.is_on
            || self.rgb_changed(other)
            || self.cct_changed(other)
            || self.brightness_changed(other)
            || self.tint_changed(other)
    }
}

fn differs(a: f32, b: f32) -> bool {
    libm::fabsf(a - b) > f32::EPSILON
}

/// Channel values after colour model resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedChannels {
    /// Hue in degrees (0-359)
    pub hue: u16,
    /// Saturation, `[0, 1]`
    pub saturation: f32,
    /// Gamma corrected brightness, `[0, 1]`
    pub brightness: f32,
    /// Colour temperature clamped into the fixture range
    pub kelvin: f32,
    /// Green-magenta bias, `None` when the fixture has no tint axis
    pub green_magenta: Option<f32>,
}
