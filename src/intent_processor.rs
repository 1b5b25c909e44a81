//! Intent processing module
//!
//! Host updates, effect commands and link events reach the fixture through a
//! bounded channel. [`FixtureRuntime`] drains it and handles one intent to
//! completion before taking the next, so frame sequences of different
//! intents never interleave.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, Receiver, Sender};
use embassy_time::Instant;
use heapless::Vec;
use log::{debug, info, warn};

use crate::BleTransport;
use crate::config::AssembledFixture;
use crate::driver::{ApplyOutcome, DriverError, LinkEvent, OutputDriver};
use crate::effect_engine::SceneEffectEngine;
use crate::frame::MAX_FRAME_LEN;
use crate::scene::{SceneId, SceneRegistry};
use crate::state::LightState;

/// Intent to change the fixture or report something about it
#[derive(Debug, Clone, PartialEq)]
pub enum DriverIntent {
    /// Apply a host state, cancelling any active effect
    State(LightState),
    /// Activate a registered scene effect
    ActivateEffect(SceneId),
    /// Stop the active effect without touching the fixture
    DeactivateEffect,
    /// Connection lifecycle change
    Link(LinkEvent),
    /// Raw notification from the status characteristic
    Notification(Vec<u8, MAX_FRAME_LEN>),
    /// Query power (and optionally channel) status
    RefreshStatus { include_channel: bool },
}

impl DriverIntent {
    /// Wrap notification bytes, `None` if they do not fit
    pub fn notification(data: &[u8]) -> Option<Self> {
        Vec::from_slice(data).ok().map(Self::Notification)
    }
}

/// Type alias for intent sender
pub type IntentSender<'a, const SIZE: usize> =
    Sender<'a, CriticalSectionRawMutex, DriverIntent, SIZE>;

/// Type alias for intent receiver
pub type IntentReceiver<'a, const SIZE: usize> =
    Receiver<'a, CriticalSectionRawMutex, DriverIntent, SIZE>;

/// Type alias for the intent channel
pub type IntentChannel<const SIZE: usize> = Channel<CriticalSectionRawMutex, DriverIntent, SIZE>;

/// Single consumer of the intent channel for one fixture
pub struct FixtureRuntime<'a, T: BleTransport, const SIZE: usize> {
    intents: IntentReceiver<'a, SIZE>,
    driver: OutputDriver<T>,
    effects: SceneRegistry,
    engine: SceneEffectEngine,
}

impl<'a, T: BleTransport, const SIZE: usize> FixtureRuntime<'a, T, SIZE> {
    pub const fn new(
        intents: IntentReceiver<'a, SIZE>,
        driver: OutputDriver<T>,
        effects: SceneRegistry,
    ) -> Self {
        Self {
            intents,
            driver,
            effects,
            engine: SceneEffectEngine::new(),
        }
    }

    /// Build the runtime from an assembled configuration
    pub fn from_fixture(
        intents: IntentReceiver<'a, SIZE>,
        transport: T,
        fixture: AssembledFixture,
    ) -> Self {
        info!(
            "fixture '{}' ({}), {} effect(s)",
            fixture.name.as_str(),
            fixture.model.as_str(),
            fixture.effects.len()
        );
        let driver = OutputDriver::new(transport, fixture.device);
        driver.dump_config();
        Self::new(intents, driver, fixture.effects)
    }

    /// Handle one intent to completion
    pub async fn process(&mut self, intent: DriverIntent, now: Instant) -> Result<(), DriverError> {
        match intent {
            DriverIntent::State(update) => {
                // A manual command always wins over the effect
                self.engine.deactivate();
                match self.driver.apply(&update).await? {
                    ApplyOutcome::Unchanged => {}
                    ApplyOutcome::Standby => self.refresh_after_write(false, now).await,
                    ApplyOutcome::Output => self.refresh_after_write(true, now).await,
                }
                Ok(())
            }
            DriverIntent::ActivateEffect(scene_id) => {
                let effect = self.effects.get(scene_id).ok_or(DriverError::UnknownEffect)?;
                info!("activating effect '{}'", effect.name.as_str());
                self.engine.activate(scene_id, effect.trigger, now);
                self.dispatch_due(now).await
            }
            DriverIntent::DeactivateEffect => {
                self.engine.deactivate();
                Ok(())
            }
            DriverIntent::Link(event) => {
                if event == LinkEvent::Disconnected {
                    self.engine.deactivate();
                }
                self.driver.on_link_event(event);
                if event == LinkEvent::NotificationsReady {
                    self.driver.refresh_status(true, now).await?;
                }
                Ok(())
            }
            DriverIntent::Notification(data) => {
                if let Err(e) = self.driver.handle_notification(&data) {
                    debug!("notification dropped: {}", e);
                }
                Ok(())
            }
            DriverIntent::RefreshStatus { include_channel } => {
                self.driver.refresh_status(include_channel, now).await
            }
        }
    }

    /// Drain all queued intents without waiting
    ///
    /// Failures are logged and do not stop the drain. Returns the number of
    /// intents handled.
    pub async fn process_pending(&mut self, now: Instant) -> usize {
        let mut processed = 0;
        while let Ok(intent) = self.intents.try_receive() {
            if let Err(e) = self.process(intent, now).await {
                warn!("intent failed: {}", e);
            }
            processed += 1;
        }
        processed
    }

    /// Wait for the next intent and handle it
    pub async fn next(&mut self, now: Instant) -> Result<(), DriverError> {
        let intent = self.intents.receive().await;
        self.process(intent, now).await
    }

    /// Periodic housekeeping: due scene triggers and status timeouts
    pub async fn tick(&mut self, now: Instant) -> Result<(), DriverError> {
        self.driver.check_status_timeouts(now);
        self.dispatch_due(now).await
    }

    /// Send the active scene when its trigger is due
    ///
    /// A scene the fixture never received is not left active, the host has
    /// to activate it again.
    async fn dispatch_due(&mut self, now: Instant) -> Result<(), DriverError> {
        let Some(request) = self.engine.tick(now) else {
            return Ok(());
        };
        let sent = self.driver.send_scene(request.scene_id).await;
        if sent.is_err() {
            warn!("scene {} not sent, stopping effect", request.scene_id.get());
            self.engine.deactivate();
        }
        sent
    }

    /// Query status after a write, the answer confirms what the fixture did
    ///
    /// The write itself succeeded, so a failed query is only logged.
    async fn refresh_after_write(&mut self, include_channel: bool, now: Instant) {
        if let Err(e) = self.driver.refresh_status(include_channel, now).await {
            warn!("status refresh failed: {}", e);
        }
    }

    /// Look up a scene effect by its display name
    pub fn effect_by_name(&self, name: &str) -> Option<SceneId> {
        self.effects.find_by_name(name).map(|effect| effect.scene_id)
    }

    pub const fn effects(&self) -> &SceneRegistry {
        &self.effects
    }

    pub const fn engine(&self) -> &SceneEffectEngine {
        &self.engine
    }

    pub const fn driver(&self) -> &OutputDriver<T> {
        &self.driver
    }

    pub fn driver_mut(&mut self) -> &mut OutputDriver<T> {
        &mut self.driver
    }
}
