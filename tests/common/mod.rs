#![allow(dead_code)]

use myrtio_rgbct_light::{BleTransport, TransportError};

/// Transport that records every written frame
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub connected: bool,
    pub writes: Vec<Vec<u8>>,
    /// Fail every write once this many frames were recorded
    pub fail_after: Option<usize>,
}

impl RecordingTransport {
    pub fn connected() -> Self {
        Self {
            connected: true,
            ..Self::default()
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }

    /// Tag byte of every written frame, in order
    pub fn tags(&self) -> Vec<u8> {
        self.writes.iter().map(|frame| frame[1]).collect()
    }

    pub fn last(&self) -> Option<&[u8]> {
        self.writes.last().map(Vec::as_slice)
    }

    pub fn clear(&mut self) {
        self.writes.clear();
    }
}

impl BleTransport for RecordingTransport {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn write(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        if !self.connected {
            return Err(TransportError::Disconnected);
        }
        if self.fail_after.is_some_and(|limit| self.writes.len() >= limit) {
            return Err(TransportError::WriteFailed(0x0e));
        }
        self.writes.push(frame.to_vec());
        Ok(())
    }
}

/// Build a frame by hand to compare against encoder output
pub fn frame(tag: u8, payload: &[u8]) -> Vec<u8> {
    let mut bytes = vec![0x78, tag, payload.len() as u8];
    bytes.extend_from_slice(payload);
    let sum = bytes.iter().fold(0u8, |acc, byte| acc.wrapping_add(*byte));
    bytes.push(sum);
    bytes
}

pub fn assert_close(actual: f32, expected: f32) {
    assert!(
        (actual - expected).abs() < 1e-5,
        "expected {expected}, got {actual}"
    );
}
