//! Colour interlock
//!
//! The fixture emits either the colour wheel or white, never both. This
//! module decides which one an update should drive.
//!
//! When both axes change in the same update the colour wheel wins. This
//! tie-break is a policy choice and has not been checked against hardware.

use crate::state::{LightState, Mode};

/// Select the mode for `incoming` given the previously applied state
///
/// With interlock enabled the mode is sticky: a brightness-only update keeps
/// the previous mode. Without interlock the host requested mode is used when
/// no colour axis changed.
pub fn select_mode(previous: &LightState, incoming: &LightState, interlock_enabled: bool) -> Mode {
    let rgb_changed = incoming.rgb_changed(previous);
    let cct_changed = incoming.cct_changed(previous);

    match (rgb_changed, cct_changed) {
        (true, _) => Mode::Rgb,
        (false, true) => Mode::Cct,
        (false, false) if interlock_enabled => previous.mode,
        (false, false) => incoming.mode,
    }
}
