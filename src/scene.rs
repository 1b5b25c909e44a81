//! Scene effect registry
//!
//! Scenes are animations stored in the fixture firmware. The host only picks
//! one by id, the fixture plays it on its own. The registry is assembled once
//! at configuration time and passed to the fixture runtime.

use embassy_time::Duration;
use heapless::{String, Vec};

use crate::config::{ConfigError, MAX_NAME_LEN};

/// Maximum number of scene effects per fixture
pub const MAX_SCENE_EFFECTS: usize = 16;

const SCENE_ID_MIN: u8 = 1;
const SCENE_ID_MAX: u8 = 9;

/// Validated scene id, `1..=9`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SceneId(u8);

impl SceneId {
    pub const fn new(raw: u8) -> Result<Self, ConfigError> {
        if raw < SCENE_ID_MIN || raw > SCENE_ID_MAX {
            return Err(ConfigError::SceneIdOutOfRange(raw));
        }
        Ok(Self(raw))
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for SceneId {
    type Error = ConfigError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// When the scene trigger is sent while the effect is active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SceneTrigger {
    /// Send once on activation, the fixture loops the scene itself
    #[default]
    Once,
    /// Re-send every period
    Repeat(Duration),
}

/// Parameter bytes following the scene id in a scene frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneParam {
    /// Brightness percent
    Brightness,
    /// Secondary (dim phase) brightness percent
    Brightness2,
    /// CCT byte
    Cct,
    /// Green-magenta byte (bias + 50)
    GreenMagenta,
    /// Animation speed 1-10
    Speed,
    /// Spark amount 1-10
    Sparks,
    /// Hue, two bytes little endian
    Hue16,
    /// Saturation percent
    Saturation,
}

impl SceneParam {
    /// Number of bytes the parameter takes on the wire
    pub const fn width(self) -> usize {
        match self {
            Self::Hue16 => 2,
            _ => 1,
        }
    }
}

/// Layout of a built-in scene
#[derive(Debug, Clone, Copy)]
pub struct SceneDefinition {
    pub scene_id: u8,
    pub name: &'static str,
    pub params: &'static [SceneParam],
}

use SceneParam::{
    Brightness, Brightness2, Cct, GreenMagenta, Hue16, Saturation, Sparks, Speed,
};

/// Scenes built into RGB62 firmware
pub const BUILTIN_SCENES: [SceneDefinition; 9] = [
    SceneDefinition {
        scene_id: 1,
        name: "Neewer FX • Lighting",
        params: &[Brightness, Cct, Speed],
    },
    SceneDefinition {
        scene_id: 2,
        name: "Neewer FX • Paparazzi",
        params: &[Brightness, Cct, GreenMagenta, Speed],
    },
    SceneDefinition {
        scene_id: 3,
        name: "Neewer FX • Defective Bulb",
        params: &[Brightness, Cct, GreenMagenta, Speed],
    },
    SceneDefinition {
        scene_id: 4,
        name: "Neewer FX • Explosion",
        params: &[Brightness, Cct, GreenMagenta, Speed, Sparks],
    },
    SceneDefinition {
        scene_id: 5,
        name: "Neewer FX • Welding",
        params: &[Brightness, Brightness2, Cct, GreenMagenta, Speed],
    },
    SceneDefinition {
        scene_id: 6,
        name: "Neewer FX • CCT Flash",
        params: &[Brightness, Cct, GreenMagenta, Speed],
    },
    SceneDefinition {
        scene_id: 7,
        name: "Neewer FX • Hue Flash",
        params: &[Brightness, Hue16, Saturation, Speed],
    },
    SceneDefinition {
        scene_id: 8,
        name: "Neewer FX • CCT Pulse",
        params: &[Brightness, Cct, GreenMagenta, Speed],
    },
    SceneDefinition {
        scene_id: 9,
        name: "Neewer FX • Hue Pulse",
        params: &[Brightness, Hue16, Saturation, Speed],
    },
];

/// Find the built-in layout of a scene
pub fn builtin_scene(scene_id: SceneId) -> Option<&'static SceneDefinition> {
    BUILTIN_SCENES
        .iter()
        .find(|definition| definition.scene_id == scene_id.get())
}

/// Named scene effect exposed to the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneEffect {
    pub scene_id: SceneId,
    pub name: String<MAX_NAME_LEN>,
    pub trigger: SceneTrigger,
}

/// Effect list of one fixture, unique by scene id
#[derive(Debug, Clone, Default)]
pub struct SceneRegistry {
    effects: Vec<SceneEffect, MAX_SCENE_EFFECTS>,
}

impl SceneRegistry {
    pub const fn new() -> Self {
        Self {
            effects: Vec::new(),
        }
    }

    /// Register a scene effect that is triggered once on activation
    pub fn register(&mut self, name: &str, scene_id: u8) -> Result<SceneId, ConfigError> {
        self.register_with(name, scene_id, SceneTrigger::Once)
    }

    /// Register a scene effect with an explicit trigger
    pub fn register_with(
        &mut self,
        name: &str,
        scene_id: u8,
        trigger: SceneTrigger,
    ) -> Result<SceneId, ConfigError> {
        let scene_id = SceneId::new(scene_id)?;
        if self.contains(scene_id) {
            return Err(ConfigError::DuplicateSceneId(scene_id.get()));
        }

        let mut effect_name = String::new();
        effect_name
            .push_str(name)
            .map_err(|()| ConfigError::NameTooLong)?;

        self.effects
            .push(SceneEffect {
                scene_id,
                name: effect_name,
                trigger,
            })
            .map_err(|_| ConfigError::TooManyEffects)?;
        Ok(scene_id)
    }

    /// Add the built-in presets whose scene id is not registered yet
    ///
    /// Returns the number of presets added.
    pub fn ensure_builtin_presets(&mut self) -> Result<usize, ConfigError> {
        let mut added = 0;
        for definition in &BUILTIN_SCENES {
            let scene_id = SceneId::new(definition.scene_id)?;
            if self.contains(scene_id) {
                continue;
            }
            self.register(definition.name, definition.scene_id)?;
            added += 1;
        }
        Ok(added)
    }

    pub fn contains(&self, scene_id: SceneId) -> bool {
        self.get(scene_id).is_some()
    }

    pub fn get(&self, scene_id: SceneId) -> Option<&SceneEffect> {
        self.effects.iter().find(|effect| effect.scene_id == scene_id)
    }

    pub fn find_by_name(&self, name: &str) -> Option<&SceneEffect> {
        self.effects.iter().find(|effect| effect.name.as_str() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SceneEffect> {
        self.effects.iter()
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}
