#![no_std]

pub mod color;
pub mod color_model;
pub mod config;
pub mod discovery;
pub mod driver;
pub mod effect_engine;
pub mod encoder;
pub mod frame;
pub mod intent_processor;
pub mod interlock;
pub mod scene;
pub mod state;
pub mod status;

use thiserror::Error;

pub use color::{Hsb, Rgb};
pub use color_model::ColorModel;
pub use config::{
    AssembledFixture, ConfigError, DeviceConfig, EffectDeclaration, FixtureConfig, FixtureModel,
};
pub use driver::{ApplyOutcome, DriverError, LinkEvent, OutputDriver};
pub use effect_engine::{EffectState, SceneEffectEngine, SceneRequest};
pub use encoder::{CommandEncoder, SceneContext};
pub use frame::{CommandFrame, EncodingError, FrameBatch};
pub use intent_processor::{
    DriverIntent, FixtureRuntime, IntentChannel, IntentReceiver, IntentSender,
};
pub use interlock::select_mode;
pub use scene::{SceneEffect, SceneId, SceneRegistry, SceneTrigger};
pub use state::{LightState, Mode, ResolvedChannels};
pub use status::{NotificationError, PowerStatus, StatusKind, StatusReport};

pub use embassy_time::{Duration, Instant};

/// Errors reported by transport implementations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("link is down")]
    Disconnected,
    #[error("command characteristic not found")]
    CharacteristicNotFound,
    #[error("write failed with status {0}")]
    WriteFailed(u8),
}

/// Abstract BLE link trait
///
/// Implement this trait to connect the driver to a BLE stack. The driver
/// only ever writes to the command characteristic, in the order the frames
/// were produced.
#[allow(async_fn_in_trait)]
pub trait BleTransport {
    /// Check if the command characteristic is writable
    fn is_connected(&self) -> bool;

    /// Write one frame to the command characteristic
    async fn write(&mut self, frame: &[u8]) -> Result<(), TransportError>;
}
