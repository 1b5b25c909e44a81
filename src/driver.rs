//! Fixture output driver
//!
//! Owns the transport and the last applied state of one fixture. Every
//! update goes through the same pipeline: colour model, interlock, encoder,
//! ordered writes. The cached state only changes after all frames of an
//! update were written.

use embassy_time::Instant;
use log::{debug, error, info, warn};
use thiserror::Error;

use crate::color_model::ColorModel;
use crate::config::DeviceConfig;
use crate::encoder::{CommandEncoder, SceneContext};
use crate::frame::{CommandFrame, EncodingError, FrameBatch};
use crate::interlock::select_mode;
use crate::scene::{SceneId, builtin_scene};
use crate::state::{LightState, Mode, ResolvedChannels};
use crate::status::{
    NotificationError, PowerStatus, StatusKind, StatusReport, StatusTracker, parse_notification,
};
use crate::{BleTransport, TransportError};

/// Errors returned by driver operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("fixture is not connected")]
    NotConnected,
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("encoding error: {0}")]
    Encoding(#[from] EncodingError),
    #[error("unknown effect")]
    UnknownEffect,
}

/// Connection lifecycle reported by the BLE collaborator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkEvent {
    /// GATT connection established, write characteristic found
    Connected,
    /// Notify characteristic subscribed
    NotificationsReady,
    Disconnected,
}

/// Frames an applied update put on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Nothing was written
    Unchanged,
    /// The fixture was switched to standby
    Standby,
    /// Channel frames were written, after a power frame if needed
    Output,
}

/// Driver for a single fixture
pub struct OutputDriver<T: BleTransport> {
    transport: T,
    config: DeviceConfig,

    state: LightState,
    resolved: Option<ResolvedChannels>,
    synced: bool,
    active_scene: Option<SceneId>,

    notifications_ready: bool,
    status: StatusTracker,
}

impl<T: BleTransport> OutputDriver<T> {
    pub const fn new(transport: T, config: DeviceConfig) -> Self {
        Self {
            transport,
            config,
            state: LightState::new(),
            resolved: None,
            synced: false,
            active_scene: None,
            notifications_ready: false,
            status: StatusTracker::new(),
        }
    }

    /// Apply a host update
    ///
    /// Nothing is written and the cache is left untouched when the fixture
    /// is not connected. An update equal to what the fixture already shows
    /// is skipped and reported as [`ApplyOutcome::Unchanged`].
    pub async fn apply(&mut self, update: &LightState) -> Result<ApplyOutcome, DriverError> {
        self.ensure_connected()?;

        if !update.is_on {
            return self.apply_power_off().await;
        }

        let mode = select_mode(&self.state, update, self.config.color_interlock());
        let channels = ColorModel::resolve(update, &self.config);
        let powering_on = !self.state.is_on || !self.synced;
        let showing_scene = self.active_scene.is_some();

        if !powering_on
            && !showing_scene
            && mode == self.state.mode
            && !update.output_changed(&self.state)
        {
            debug!("update unchanged, skipping");
            return Ok(ApplyOutcome::Unchanged);
        }

        let brightness_only = !powering_on
            && !showing_scene
            && mode == Mode::Cct
            && self.state.mode == Mode::Cct
            && !update.cct_changed(&self.state)
            && !update.tint_changed(&self.state);

        let batch = Self::encode_update(mode, &channels, powering_on, brightness_only)
            .inspect_err(|e| error!("failed to encode update: {}", e))?;

        debug!(
            "applying {} update, {} frame(s)",
            mode.as_str(),
            batch.len()
        );
        self.write_batch(&batch).await?;

        self.state = LightState { mode, ..*update };
        self.resolved = Some(channels);
        self.active_scene = None;
        self.synced = true;
        Ok(ApplyOutcome::Output)
    }

    fn encode_update(
        mode: Mode,
        channels: &ResolvedChannels,
        powering_on: bool,
        brightness_only: bool,
    ) -> Result<FrameBatch, EncodingError> {
        let mut batch = FrameBatch::new();
        if powering_on {
            batch.push(CommandEncoder::power(true)?)?;
        }
        if brightness_only {
            batch.push(CommandEncoder::brightness(channels.brightness)?)?;
        } else {
            batch.append(CommandEncoder::encode(mode, channels)?)?;
        }
        Ok(batch)
    }

    async fn apply_power_off(&mut self) -> Result<ApplyOutcome, DriverError> {
        if !self.state.is_on && self.synced {
            debug!("fixture already in standby");
            return Ok(ApplyOutcome::Unchanged);
        }

        let frame = CommandEncoder::power(false)
            .inspect_err(|e| error!("failed to encode power frame: {}", e))?;
        self.transport.write(frame.as_bytes()).await?;

        self.state.is_on = false;
        self.active_scene = None;
        self.synced = true;
        Ok(ApplyOutcome::Standby)
    }

    /// Write a prebuilt frame, bypassing resolution
    pub async fn send_raw(&mut self, frame: &CommandFrame) -> Result<(), DriverError> {
        self.ensure_connected()?;
        self.transport.write(frame.as_bytes()).await?;
        Ok(())
    }

    /// Start a scene stored in the fixture firmware
    ///
    /// Parameterised scenes take their brightness and colour from the last
    /// applied state. The fixture is switched on first if needed.
    pub async fn send_scene(&mut self, scene_id: SceneId) -> Result<(), DriverError> {
        self.ensure_connected()?;

        let channels = self
            .resolved
            .unwrap_or_else(|| ColorModel::resolve(&self.state, &self.config));
        let powering_on = !self.state.is_on || !self.synced;

        let batch = self
            .encode_scene(scene_id, &channels, powering_on)
            .inspect_err(|e| error!("failed to encode scene {}: {}", scene_id.get(), e))?;

        info!("starting scene {}", scene_id.get());
        self.write_batch(&batch).await?;

        self.state.is_on = true;
        self.active_scene = Some(scene_id);
        self.synced = true;
        Ok(())
    }

    fn encode_scene(
        &self,
        scene_id: SceneId,
        channels: &ResolvedChannels,
        powering_on: bool,
    ) -> Result<FrameBatch, EncodingError> {
        let mut batch = FrameBatch::new();
        if powering_on {
            batch.push(CommandEncoder::power(true)?)?;
        }
        let frame = match builtin_scene(scene_id) {
            Some(definition) if self.config.parameterised_scenes() => {
                let context = SceneContext::from_channels(channels);
                CommandEncoder::encode_scene_with(scene_id, definition, &context)?
            }
            _ => CommandEncoder::encode_scene(scene_id)?,
        };
        batch.push(frame)?;
        Ok(batch)
    }

    /// Handle a connection lifecycle event
    pub fn on_link_event(&mut self, event: LinkEvent) {
        match event {
            LinkEvent::Connected => {
                info!("fixture connected");
                self.synced = false;
                self.notifications_ready = false;
            }
            LinkEvent::NotificationsReady => {
                debug!("status notifications enabled");
                self.notifications_ready = true;
                // Queries sent before the subscription will never be answered
                self.status.reset_pending();
            }
            LinkEvent::Disconnected => {
                warn!("fixture disconnected");
                self.synced = false;
                self.notifications_ready = false;
                self.active_scene = None;
                self.status.clear();
            }
        }
    }

    /// Ask the fixture for its power state, and optionally its channel
    ///
    /// A query that is still waiting for an answer is not sent again.
    /// Without a notification subscription there is nobody to hear the
    /// answer, so nothing is sent.
    pub async fn refresh_status(
        &mut self,
        include_channel: bool,
        now: Instant,
    ) -> Result<(), DriverError> {
        self.ensure_connected()?;
        if !self.notifications_ready {
            debug!("status refresh skipped, notifications not ready");
            return Ok(());
        }

        self.request_status(StatusKind::Power, now).await?;
        if include_channel {
            self.request_status(StatusKind::Channel, now).await?;
        }
        Ok(())
    }

    async fn request_status(&mut self, kind: StatusKind, now: Instant) -> Result<(), DriverError> {
        if self.status.is_awaiting(kind) {
            return Ok(());
        }
        let frame = CommandEncoder::status_request(kind)?;
        self.transport.write(frame.as_bytes()).await?;
        self.status.mark_requested(kind, now);
        Ok(())
    }

    /// Handle a notification from the fixture
    ///
    /// A power report that disagrees with the cache updates it, so the next
    /// update switches the fixture back on when needed.
    pub fn handle_notification(&mut self, data: &[u8]) -> Result<StatusReport, NotificationError> {
        let report = parse_notification(data)
            .inspect_err(|e| warn!("ignoring notification: {}", e))?;
        self.status.record(report);

        match report {
            StatusReport::Power(power) => {
                let is_on = power == PowerStatus::On;
                if is_on != self.state.is_on {
                    info!("fixture reports power {}", if is_on { "on" } else { "standby" });
                    self.state.is_on = is_on;
                }
            }
            StatusReport::Channel(channel) => {
                debug!("fixture reports channel {}", channel);
            }
        }
        Ok(report)
    }

    /// Abandon status queries that did not get an answer in time
    pub fn check_status_timeouts(&mut self, now: Instant) {
        let (power, channel) = self.status.expire(now);
        if power {
            warn!("power status request timed out");
        }
        if channel {
            warn!("channel status request timed out");
        }
    }

    /// Log the effective configuration
    pub fn dump_config(&self) {
        info!("RGBCT fixture:");
        info!(
            "  kelvin range: {}K - {}K",
            self.config.kelvin_min(),
            self.config.kelvin_max()
        );
        info!("  gamma: {}", self.config.gamma());
        info!("  colour interlock: {}", self.config.color_interlock());
        info!(
            "  green-magenta: {}",
            self.config.supports_green_magenta()
        );
        info!(
            "  scene parameters: {}",
            self.config.parameterised_scenes()
        );
    }

    fn ensure_connected(&self) -> Result<(), DriverError> {
        if self.transport.is_connected() {
            Ok(())
        } else {
            warn!("fixture not connected");
            Err(DriverError::NotConnected)
        }
    }

    async fn write_batch(&mut self, batch: &FrameBatch) -> Result<(), DriverError> {
        for frame in batch {
            self.transport
                .write(frame.as_bytes())
                .await
                .inspect_err(|e| warn!("write failed: {}", e))?;
        }
        Ok(())
    }

    /// Last applied state
    pub const fn state(&self) -> &LightState {
        &self.state
    }

    /// Mode the fixture is emitting
    pub const fn mode(&self) -> Mode {
        self.state.mode
    }

    /// Channel values of the last applied update
    pub const fn resolved(&self) -> Option<&ResolvedChannels> {
        self.resolved.as_ref()
    }

    pub const fn active_scene(&self) -> Option<SceneId> {
        self.active_scene
    }

    pub const fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub const fn power_status(&self) -> Option<PowerStatus> {
        self.status.power()
    }

    pub const fn channel(&self) -> Option<u8> {
        self.status.channel()
    }

    pub const fn notifications_ready(&self) -> bool {
        self.notifications_ready
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }
}
