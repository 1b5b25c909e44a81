//! Fixture status reporting
//!
//! The fixture answers power and channel queries on the notify
//! characteristic. Responses are `[prefix, type, len, payload, ..]`.
//! A query without an answer expires after [`STATUS_TIMEOUT`].

use embassy_time::{Duration, Instant};
use thiserror::Error;

use crate::frame::tags;

/// Time after which an unanswered status query is abandoned
pub const STATUS_TIMEOUT: Duration = Duration::from_millis(2000);

const CHANNEL_RESPONSE_TYPE: u8 = 0x01;
const POWER_RESPONSE_TYPE: u8 = 0x02;
const MIN_NOTIFICATION_LEN: usize = 4;

/// Errors parsing status notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum NotificationError {
    #[error("notification too short ({0} bytes)")]
    TooShort(usize),
    #[error("unknown notification type {0:#04x}")]
    UnknownType(u8),
    #[error("unexpected power state {0:#04x}")]
    UnexpectedPowerState(u8),
}

/// Status query kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Power,
    Channel,
}

impl StatusKind {
    pub const fn request_tag(self) -> u8 {
        match self {
            Self::Power => tags::POWER_STATUS_REQUEST,
            Self::Channel => tags::CHANNEL_STATUS_REQUEST,
        }
    }
}

/// Power state reported by the fixture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerStatus {
    On,
    Standby,
}

/// Parsed status notification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusReport {
    Power(PowerStatus),
    Channel(u8),
}

impl StatusReport {
    pub const fn kind(self) -> StatusKind {
        match self {
            Self::Power(_) => StatusKind::Power,
            Self::Channel(_) => StatusKind::Channel,
        }
    }
}

/// Parse a status notification payload
pub fn parse_notification(data: &[u8]) -> Result<StatusReport, NotificationError> {
    if data.len() < MIN_NOTIFICATION_LEN {
        return Err(NotificationError::TooShort(data.len()));
    }
    let response_type = data[1];
    let payload = data[3];

    match response_type {
        POWER_RESPONSE_TYPE => match payload {
            0x01 => Ok(StatusReport::Power(PowerStatus::On)),
            0x02 => Ok(StatusReport::Power(PowerStatus::Standby)),
            other => Err(NotificationError::UnexpectedPowerState(other)),
        },
        CHANNEL_RESPONSE_TYPE => Ok(StatusReport::Channel(payload)),
        other => Err(NotificationError::UnknownType(other)),
    }
}

/// Tracks outstanding status queries and the last reported values
#[derive(Debug, Clone, Default)]
pub struct StatusTracker {
    power_requested_at: Option<Instant>,
    channel_requested_at: Option<Instant>,
    power: Option<PowerStatus>,
    channel: Option<u8>,
}

impl StatusTracker {
    pub const fn new() -> Self {
        Self {
            power_requested_at: None,
            channel_requested_at: None,
            power: None,
            channel: None,
        }
    }

    /// Check if a query of this kind is waiting for an answer
    pub const fn is_awaiting(&self, kind: StatusKind) -> bool {
        match kind {
            StatusKind::Power => self.power_requested_at.is_some(),
            StatusKind::Channel => self.channel_requested_at.is_some(),
        }
    }

    /// Record that a query was sent
    pub fn mark_requested(&mut self, kind: StatusKind, now: Instant) {
        match kind {
            StatusKind::Power => self.power_requested_at = Some(now),
            StatusKind::Channel => self.channel_requested_at = Some(now),
        }
    }

    /// Record an answer, clearing the outstanding query
    pub fn record(&mut self, report: StatusReport) {
        match report {
            StatusReport::Power(power) => {
                self.power_requested_at = None;
                self.power = Some(power);
            }
            StatusReport::Channel(channel) => {
                self.channel_requested_at = None;
                self.channel = Some(channel);
            }
        }
    }

    /// Abandon queries older than [`STATUS_TIMEOUT`]
    ///
    /// Returns the kinds that expired.
    pub fn expire(&mut self, now: Instant) -> (bool, bool) {
        let power = expired(&mut self.power_requested_at, now);
        let channel = expired(&mut self.channel_requested_at, now);
        (power, channel)
    }

    /// Forget outstanding queries, used when notifications are subscribed
    pub fn reset_pending(&mut self) {
        self.power_requested_at = None;
        self.channel_requested_at = None;
    }

    /// Forget everything, used on disconnect
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    pub const fn power(&self) -> Option<PowerStatus> {
        self.power
    }

    pub const fn channel(&self) -> Option<u8> {
        self.channel
    }
}

fn expired(requested_at: &mut Option<Instant>, now: Instant) -> bool {
    let timed_out =
        requested_at.is_some_and(|at| now.saturating_duration_since(at) > STATUS_TIMEOUT);
    if timed_out {
        *requested_at = None;
    }
    timed_out
}
