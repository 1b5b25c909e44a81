//! Command encoder
//!
//! Turns resolved channel values into fixture frames. Encoding is
//! deterministic: the same input always produces the same bytes.

use crate::color::{fraction_to_percent, kelvin_to_cct_byte};
use crate::frame::{CommandFrame, EncodingError, FrameBatch, tags};
use crate::scene::{SceneDefinition, SceneId, SceneParam};
use crate::state::{GREEN_MAGENTA_MAX, Mode, ResolvedChannels};
use crate::status::StatusKind;

const POWER_ON: u8 = 0x01;
const POWER_STANDBY: u8 = 0x02;

/// Default animation speed for parameterised scenes (1-10)
pub const DEFAULT_SCENE_SPEED: u8 = 5;
/// Default spark amount for parameterised scenes (1-10)
pub const DEFAULT_SCENE_SPARKS: u8 = 5;

/// Values substituted into parameterised scene frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneContext {
    pub brightness: u8,
    pub cct: u8,
    pub green_magenta: u8,
    pub hue: u16,
    pub saturation: u8,
    pub speed: u8,
    pub sparks: u8,
}

impl SceneContext {
    /// Scene parameters derived from the last applied channels
    pub fn from_channels(channels: &ResolvedChannels) -> Self {
        Self {
            brightness: fraction_to_percent(channels.brightness),
            cct: kelvin_to_cct_byte(channels.kelvin),
            green_magenta: green_magenta_byte(channels.green_magenta),
            hue: channels.hue,
            saturation: fraction_to_percent(channels.saturation),
            speed: DEFAULT_SCENE_SPEED,
            sparks: DEFAULT_SCENE_SPARKS,
        }
    }
}

pub struct CommandEncoder;

impl CommandEncoder {
    /// Encode channel values for the given mode
    ///
    /// Only the active mode is transmitted.
    pub fn encode(mode: Mode, channels: &ResolvedChannels) -> Result<FrameBatch, EncodingError> {
        let frame = match mode {
            Mode::Rgb => Self::hsi(channels)?,
            Mode::Cct => Self::cct(channels)?,
        };
        let mut batch = FrameBatch::new();
        batch.push(frame)?;
        Ok(batch)
    }

    /// Hue, saturation and brightness frame
    pub fn hsi(channels: &ResolvedChannels) -> Result<CommandFrame, EncodingError> {
        let [hue_lo, hue_hi] = channels.hue.to_le_bytes();
        CommandFrame::build(
            tags::HSI,
            &[
                hue_lo,
                hue_hi,
                fraction_to_percent(channels.saturation),
                fraction_to_percent(channels.brightness),
            ],
        )
    }

    /// Colour temperature frame, with the tint byte when the fixture has one
    pub fn cct(channels: &ResolvedChannels) -> Result<CommandFrame, EncodingError> {
        let brightness = fraction_to_percent(channels.brightness);
        let cct = kelvin_to_cct_byte(channels.kelvin);
        match channels.green_magenta {
            Some(bias) => CommandFrame::build(
                tags::CCT,
                &[brightness, cct, green_magenta_byte(Some(bias))],
            ),
            None => CommandFrame::build(tags::CCT, &[brightness, cct]),
        }
    }

    /// Brightness-only frame
    ///
    /// The fixture accepts it in white mode as long as the colour
    /// temperature stays the same.
    pub fn brightness(brightness: f32) -> Result<CommandFrame, EncodingError> {
        CommandFrame::build(tags::CCT, &[fraction_to_percent(brightness)])
    }

    pub fn power(on: bool) -> Result<CommandFrame, EncodingError> {
        CommandFrame::build(tags::POWER, &[if on { POWER_ON } else { POWER_STANDBY }])
    }

    pub fn status_request(kind: StatusKind) -> Result<CommandFrame, EncodingError> {
        CommandFrame::build(kind.request_tag(), &[])
    }

    /// Bare scene trigger
    pub fn encode_scene(scene_id: SceneId) -> Result<CommandFrame, EncodingError> {
        CommandFrame::build(tags::SCENE, &[scene_id.get()])
    }

    /// Scene trigger followed by the parameters the scene layout asks for
    pub fn encode_scene_with(
        scene_id: SceneId,
        definition: &SceneDefinition,
        context: &SceneContext,
    ) -> Result<CommandFrame, EncodingError> {
        let mut payload = heapless::Vec::<u8, 16>::new();
        let overflow = |_: u8| EncodingError::FrameOverflow(payload_len(definition) + 1);

        payload.push(scene_id.get()).map_err(overflow)?;
        for param in definition.params {
            let pushed = match param {
                SceneParam::Brightness => payload.push(context.brightness),
                SceneParam::Brightness2 => payload.push(context.brightness / 2),
                SceneParam::Cct => payload.push(context.cct),
                SceneParam::GreenMagenta => payload.push(context.green_magenta),
                SceneParam::Speed => payload.push(context.speed),
                SceneParam::Sparks => payload.push(context.sparks),
                SceneParam::Saturation => payload.push(context.saturation),
                SceneParam::Hue16 => {
                    let [lo, hi] = context.hue.to_le_bytes();
                    payload.extend_from_slice(&[lo, hi]).map_err(|()| hi)
                }
            };
            pushed.map_err(overflow)?;
        }

        CommandFrame::build(tags::SCENE, &payload)
    }
}

fn payload_len(definition: &SceneDefinition) -> usize {
    definition.params.iter().map(|param| param.width()).sum()
}

/// Tint byte, `0` full green, `50` neutral, `100` full magenta
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn green_magenta_byte(bias: Option<f32>) -> u8 {
    let bias = bias.unwrap_or(0.0);
    libm::roundf(bias + GREEN_MAGENTA_MAX).clamp(0.0, 100.0) as u8
}
