//! Colour model
//!
//! Normalises a requested [`LightState`] against the fixture
//! [`DeviceConfig`]. Resolution is a pure function and cannot fail: anything
//! out of range is clamped or wrapped at this boundary.

use crate::color::{clamp_kelvin, wrap_hue};
use crate::config::DeviceConfig;
use crate::state::{
    GREEN_MAGENTA_MAX, GREEN_MAGENTA_MIN, GREEN_MAGENTA_NEUTRAL, LightState, ResolvedChannels,
};

pub struct ColorModel;

impl ColorModel {
    /// Resolve a requested state into channel values
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn resolve(request: &LightState, config: &DeviceConfig) -> ResolvedChannels {
        let hue = libm::roundf(wrap_hue(request.hue)) as u16 % 360;

        ResolvedChannels {
            hue,
            saturation: unit(request.saturation),
            brightness: Self::gamma_correct(request.brightness, config.gamma()),
            kelvin: clamp_kelvin(
                request.color_temperature_kelvin,
                config.kelvin_min(),
                config.kelvin_max(),
            ),
            green_magenta: config
                .supports_green_magenta()
                .then(|| Self::tint(request.green_magenta_bias, config)),
        }
    }

    /// Effective green-magenta bias
    ///
    /// A neutral request falls back to the bias configured for the fixture.
    pub fn tint(requested: f32, config: &DeviceConfig) -> f32 {
        let requested = bias(requested);
        if libm::fabsf(requested - GREEN_MAGENTA_NEUTRAL) > f32::EPSILON {
            requested
        } else {
            bias(config.green_magenta_bias())
        }
    }

    /// Apply gamma to a brightness value
    ///
    /// `gamma` is validated to be positive by [`DeviceConfig`].
    #[inline]
    pub fn gamma_correct(brightness: f32, gamma: f32) -> f32 {
        libm::powf(unit(brightness), gamma)
    }
}

fn unit(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

fn bias(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(GREEN_MAGENTA_MIN, GREEN_MAGENTA_MAX)
}
