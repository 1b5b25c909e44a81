//! Fixture configuration
//!
//! [`DeviceConfig`] holds the per-fixture constants the driver works with.
//! It is derived from a [`FixtureModel`] preset and validated once, so
//! nothing downstream has to deal with an invalid range or gamma.
//! [`FixtureConfig`] is the user facing surface: it is assembled into a
//! [`DeviceConfig`] and a [`SceneRegistry`].

use heapless::String;
use thiserror::Error;

use crate::scene::{SceneRegistry, SceneTrigger};
use crate::state::{GREEN_MAGENTA_MAX, GREEN_MAGENTA_MIN, GREEN_MAGENTA_NEUTRAL};

const MODEL_NAME_BASE: &str = "rgb660";
const MODEL_NAME_RGB62: &str = "rgb62";

/// Default gamma, no correction
pub const DEFAULT_GAMMA: f32 = 1.0;

/// Maximum length of a fixture or effect name
pub const MAX_NAME_LEN: usize = 48;

/// Errors found while validating static configuration
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("scene id {0} is outside 1..=9")]
    SceneIdOutOfRange(u8),
    #[error("scene id {0} is declared more than once")]
    DuplicateSceneId(u8),
    #[error("effect list is full")]
    TooManyEffects,
    #[error("name longer than 48 bytes")]
    NameTooLong,
    #[error("gamma must be positive, got {0}")]
    NonPositiveGamma(f32),
    #[error("invalid kelvin range {min}..{max}")]
    InvalidKelvinRange { min: f32, max: f32 },
    #[error("green-magenta bias {0} is outside -50..=50")]
    GreenMagentaBiasOutOfRange(f32),
    #[error("unknown fixture model")]
    UnknownModel,
}

/// Known fixture variants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FixtureModel {
    /// RGB660, 3200-5600K, no tint axis
    #[default]
    Base,
    /// RGB62, 2500-8500K with green-magenta and built-in scenes
    Rgb62,
}

impl FixtureModel {
    pub fn parse_from_str(s: &str) -> Result<Self, ConfigError> {
        if s.eq_ignore_ascii_case(MODEL_NAME_RGB62) {
            Ok(Self::Rgb62)
        } else if s.eq_ignore_ascii_case(MODEL_NAME_BASE) {
            Ok(Self::Base)
        } else {
            Err(ConfigError::UnknownModel)
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Base => MODEL_NAME_BASE,
            Self::Rgb62 => MODEL_NAME_RGB62,
        }
    }

    /// Kelvin range supported by the model
    pub const fn kelvin_range(self) -> (f32, f32) {
        match self {
            Self::Base => (3200.0, 5600.0),
            Self::Rgb62 => (2500.0, 8500.0),
        }
    }

    pub const fn supports_green_magenta(self) -> bool {
        matches!(self, Self::Rgb62)
    }

    /// Whether the nine built-in scenes are exposed as effects
    pub const fn has_scene_presets(self) -> bool {
        matches!(self, Self::Rgb62)
    }

    /// Device configuration preset for the model
    pub const fn device_config(self) -> DeviceConfig {
        let (kelvin_min, kelvin_max) = self.kelvin_range();
        DeviceConfig {
            kelvin_min,
            kelvin_max,
            supports_green_magenta: self.supports_green_magenta(),
            parameterised_scenes: self.has_scene_presets(),
            color_interlock: true,
            gamma: DEFAULT_GAMMA,
            green_magenta_bias: GREEN_MAGENTA_NEUTRAL,
        }
    }
}

/// Immutable per-fixture constants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceConfig {
    kelvin_min: f32,
    kelvin_max: f32,
    supports_green_magenta: bool,
    parameterised_scenes: bool,
    color_interlock: bool,
    gamma: f32,
    green_magenta_bias: f32,
}

impl DeviceConfig {
    /// Create a validated configuration
    pub fn new(
        kelvin_min: f32,
        kelvin_max: f32,
        supports_green_magenta: bool,
        color_interlock: bool,
        gamma: f32,
    ) -> Result<Self, ConfigError> {
        validate_kelvin_range(kelvin_min, kelvin_max)?;
        validate_gamma(gamma)?;
        Ok(Self {
            kelvin_min,
            kelvin_max,
            supports_green_magenta,
            parameterised_scenes: false,
            color_interlock,
            gamma,
            green_magenta_bias: GREEN_MAGENTA_NEUTRAL,
        })
    }

    /// Send scene parameters after the scene id
    ///
    /// Firmware without scene parameters only understands the bare id.
    #[must_use]
    pub const fn with_parameterised_scenes(mut self, enabled: bool) -> Self {
        self.parameterised_scenes = enabled;
        self
    }

    /// Override gamma
    pub fn with_gamma(mut self, gamma: f32) -> Result<Self, ConfigError> {
        validate_gamma(gamma)?;
        self.gamma = gamma;
        Ok(self)
    }

    /// Default tint for updates that leave the bias neutral
    pub fn with_green_magenta_bias(mut self, bias: f32) -> Result<Self, ConfigError> {
        if !(GREEN_MAGENTA_MIN..=GREEN_MAGENTA_MAX).contains(&bias) {
            return Err(ConfigError::GreenMagentaBiasOutOfRange(bias));
        }
        self.green_magenta_bias = bias;
        Ok(self)
    }

    /// Override colour interlock
    #[must_use]
    pub const fn with_color_interlock(mut self, enabled: bool) -> Self {
        self.color_interlock = enabled;
        self
    }

    pub const fn kelvin_min(&self) -> f32 {
        self.kelvin_min
    }

    pub const fn kelvin_max(&self) -> f32 {
        self.kelvin_max
    }

    pub const fn supports_green_magenta(&self) -> bool {
        self.supports_green_magenta
    }

    pub const fn parameterised_scenes(&self) -> bool {
        self.parameterised_scenes
    }

    pub const fn color_interlock(&self) -> bool {
        self.color_interlock
    }

    pub const fn gamma(&self) -> f32 {
        self.gamma
    }

    pub const fn green_magenta_bias(&self) -> f32 {
        self.green_magenta_bias
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        FixtureModel::Base.device_config()
    }
}

fn validate_gamma(gamma: f32) -> Result<(), ConfigError> {
    if gamma.is_finite() && gamma > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositiveGamma(gamma))
    }
}

fn validate_kelvin_range(min: f32, max: f32) -> Result<(), ConfigError> {
    if min.is_finite() && max.is_finite() && min > 0.0 && min < max {
        Ok(())
    } else {
        Err(ConfigError::InvalidKelvinRange { min, max })
    }
}

/// User declared scene effect
#[derive(Debug, Clone, Copy)]
pub struct EffectDeclaration<'a> {
    pub name: &'a str,
    pub scene_id: u8,
    pub trigger: SceneTrigger,
}

impl<'a> EffectDeclaration<'a> {
    pub const fn new(name: &'a str, scene_id: u8) -> Self {
        Self {
            name,
            scene_id,
            trigger: SceneTrigger::Once,
        }
    }

    #[must_use]
    pub const fn with_trigger(mut self, trigger: SceneTrigger) -> Self {
        self.trigger = trigger;
        self
    }
}

/// User facing fixture configuration
#[derive(Debug, Clone, Copy)]
pub struct FixtureConfig<'a> {
    pub name: &'a str,
    pub model: FixtureModel,
    pub gamma: f32,
    pub color_interlock: bool,
    pub green_magenta_bias: f32,
    pub effects: &'a [EffectDeclaration<'a>],
}

impl<'a> FixtureConfig<'a> {
    /// Configuration with defaults for everything but name and model
    pub const fn new(name: &'a str, model: FixtureModel) -> Self {
        Self {
            name,
            model,
            gamma: DEFAULT_GAMMA,
            color_interlock: true,
            green_magenta_bias: GREEN_MAGENTA_NEUTRAL,
            effects: &[],
        }
    }

    /// Validate the configuration and build the driver inputs
    ///
    /// User declared effects are registered first, so they take precedence
    /// over the built-in presets that share their scene id.
    pub fn assemble(&self) -> Result<AssembledFixture, ConfigError> {
        if self.name.len() > MAX_NAME_LEN {
            return Err(ConfigError::NameTooLong);
        }

        let device = self
            .model
            .device_config()
            .with_gamma(self.gamma)?
            .with_green_magenta_bias(self.green_magenta_bias)?
            .with_color_interlock(self.color_interlock);

        let mut effects = SceneRegistry::new();
        for effect in self.effects {
            effects.register_with(effect.name, effect.scene_id, effect.trigger)?;
        }
        if self.model.has_scene_presets() {
            effects.ensure_builtin_presets()?;
        }

        let mut name = String::new();
        name.push_str(self.name)
            .map_err(|()| ConfigError::NameTooLong)?;

        Ok(AssembledFixture {
            name,
            model: self.model,
            device,
            effects,
        })
    }
}

/// Output of [`FixtureConfig::assemble`]
#[derive(Debug, Clone)]
pub struct AssembledFixture {
    pub name: String<MAX_NAME_LEN>,
    pub model: FixtureModel,
    pub device: DeviceConfig,
    pub effects: SceneRegistry,
}
