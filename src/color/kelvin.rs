/// Clamp a requested colour temperature into the fixture range
///
/// NaN falls back to the warm end of the range.
pub fn clamp_kelvin(kelvin: f32, min: f32, max: f32) -> f32 {
    if kelvin.is_nan() {
        return min;
    }
    kelvin.clamp(min, max)
}

/// Convert Kelvin to the fixture CCT byte (hundreds of Kelvin)
///
/// 3200K maps to `0x20`, 5600K to `0x38`.
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn kelvin_to_cct_byte(kelvin: f32) -> u8 {
    libm::roundf(kelvin / 100.0).clamp(0.0, 255.0) as u8
}

/// Convert a mired value (as reported by most light frontends) to Kelvin
pub fn mired_to_kelvin(mired: f32) -> f32 {
    if mired <= 0.0 || !mired.is_finite() {
        return 0.0;
    }
    1_000_000.0 / mired
}
