//! Scene effect state machine
//!
//! Tracks which scene effect is active and when its trigger is due. Every
//! activation or deactivation starts a new epoch. A request carries the
//! epoch it was created in, so a request overtaken by a newer activation
//! or a manual command can be recognised and dropped.

use embassy_time::{Duration, Instant};

use crate::scene::{SceneId, SceneTrigger};

/// Scene trigger due for transmission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneRequest {
    pub scene_id: SceneId,
    pub epoch: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EffectState {
    #[default]
    Idle,
    Active {
        scene_id: SceneId,
        trigger: SceneTrigger,
        /// `None` once a one-shot trigger was emitted, or when the next
        /// repeat would fall past the end of the clock
        next_due: Option<Instant>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SceneEffectEngine {
    state: EffectState,
    epoch: u32,
}

impl SceneEffectEngine {
    pub const fn new() -> Self {
        Self {
            state: EffectState::Idle,
            epoch: 0,
        }
    }

    /// Activate a scene, superseding any active one
    ///
    /// The first trigger is due immediately.
    pub fn activate(&mut self, scene_id: SceneId, trigger: SceneTrigger, now: Instant) -> u32 {
        let trigger = match trigger {
            SceneTrigger::Repeat(period) if period == Duration::from_ticks(0) => SceneTrigger::Once,
            trigger => trigger,
        };
        self.epoch = self.epoch.wrapping_add(1);
        self.state = EffectState::Active {
            scene_id,
            trigger,
            next_due: Some(now),
        };
        self.epoch
    }

    /// Return to idle, invalidating pending requests
    pub fn deactivate(&mut self) {
        if matches!(self.state, EffectState::Active { .. }) {
            self.epoch = self.epoch.wrapping_add(1);
        }
        self.state = EffectState::Idle;
    }

    /// Emit a request when the active scene is due
    pub fn tick(&mut self, now: Instant) -> Option<SceneRequest> {
        let EffectState::Active {
            scene_id,
            trigger,
            next_due,
        } = &mut self.state
        else {
            return None;
        };

        let due = (*next_due)?;
        if now < due {
            return None;
        }

        *next_due = match *trigger {
            SceneTrigger::Once => None,
            SceneTrigger::Repeat(period) => {
                // Skip the backlog after a long stall instead of bursting.
                // A period past the end of the clock never fires again.
                let stalled = period
                    .checked_mul(2)
                    .and_then(|backlog| due.checked_add(backlog))
                    .is_some_and(|limit| now > limit);
                let base = if stalled { now } else { due };
                base.checked_add(period)
            }
        };

        Some(SceneRequest {
            scene_id: *scene_id,
            epoch: self.epoch,
        })
    }

    /// Check if a request still belongs to the active scene
    pub fn is_current(&self, request: &SceneRequest) -> bool {
        request.epoch == self.epoch
            && matches!(self.state, EffectState::Active { scene_id, .. } if scene_id == request.scene_id)
    }

    pub const fn state(&self) -> EffectState {
        self.state
    }

    pub const fn epoch(&self) -> u32 {
        self.epoch
    }

    pub const fn active_scene(&self) -> Option<SceneId> {
        match self.state {
            EffectState::Active { scene_id, .. } => Some(scene_id),
            EffectState::Idle => None,
        }
    }
}
