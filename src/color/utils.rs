use super::Rgb;

/// Hue/saturation/brightness triple
///
/// The fixture "RGB" channel is really HSI, so every RGB request is
/// converted into this form before it is encoded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsb {
    /// Hue in degrees (0-359)
    pub hue: u16,
    /// Saturation (0.0-1.0)
    pub saturation: f32,
    /// Brightness (0.0-1.0)
    pub brightness: f32,
}

/// Wrap a hue angle into `[0, 360)`
///
/// Non-finite angles are treated as red (0).
pub fn wrap_hue(hue: f32) -> f32 {
    if !hue.is_finite() {
        return 0.0;
    }
    let mut wrapped = libm::fmodf(hue, 360.0);
    if wrapped < 0.0 {
        wrapped += 360.0;
    }
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Convert a `0.0-1.0` fraction to a `0-100` percent byte
#[inline]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn fraction_to_percent(value: f32) -> u8 {
    if value.is_nan() {
        return 0;
    }
    libm::roundf(value.clamp(0.0, 1.0) * 100.0) as u8
}

/// Convert an RGB color to hue/saturation/brightness
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rgb_to_hsb(rgb: Rgb) -> Hsb {
    let max = rgb.r.max(rgb.g).max(rgb.b);
    let min = rgb.r.min(rgb.g).min(rgb.b);

    let r = f32::from(rgb.r) / 255.0;
    let g = f32::from(rgb.g) / 255.0;
    let b = f32::from(rgb.b) / 255.0;
    let max_f = f32::from(max) / 255.0;
    let delta = f32::from(max - min) / 255.0;

    let saturation = if max == 0 { 0.0 } else { delta / max_f };

    let hue = if max == min {
        0.0
    } else if max == rgb.r {
        60.0 * ((g - b) / delta)
    } else if max == rgb.g {
        60.0 * ((b - r) / delta + 2.0)
    } else {
        60.0 * ((r - g) / delta + 4.0)
    };
    let hue = libm::roundf(wrap_hue(hue)) as u16 % 360;

    Hsb {
        hue,
        saturation,
        brightness: max_f,
    }
}
