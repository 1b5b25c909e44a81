//! Command frames
//!
//! Every instruction is `[0x78, tag, len, payload.., checksum]` where the
//! checksum is the low byte of the sum of all preceding bytes.

use heapless::Vec;
use thiserror::Error;

/// Maximum frame size accepted by the fixture write characteristic
pub const MAX_FRAME_LEN: usize = 20;

/// Maximum number of frames produced by one update
pub const MAX_BATCH_LEN: usize = 3;

/// Leading byte of every command
pub const COMMAND_PREFIX: u8 = 0x78;

/// Frame tags
pub mod tags {
    pub const POWER: u8 = 0x81;
    pub const CHANNEL_STATUS_REQUEST: u8 = 0x84;
    pub const POWER_STATUS_REQUEST: u8 = 0x85;
    pub const HSI: u8 = 0x86;
    pub const CCT: u8 = 0x87;
    pub const SCENE: u8 = 0x88;
}

const HEADER_LEN: usize = 3;
const MAX_PAYLOAD_LEN: usize = MAX_FRAME_LEN - HEADER_LEN - 1;

/// Errors building frames
///
/// These indicate a contract violation between the colour model and the
/// encoder, validated inputs never produce them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EncodingError {
    #[error("payload of {0} bytes does not fit into a frame")]
    FrameOverflow(usize),
    #[error("too many frames for one update")]
    BatchOverflow,
}

/// One immutable device instruction
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CommandFrame {
    bytes: Vec<u8, MAX_FRAME_LEN>,
}

impl CommandFrame {
    /// Build a frame from a tag and payload, appending length and checksum
    pub fn build(tag: u8, payload: &[u8]) -> Result<Self, EncodingError> {
        if payload.len() > MAX_PAYLOAD_LEN {
            return Err(EncodingError::FrameOverflow(payload.len()));
        }
        let mut bytes = Vec::new();
        #[allow(clippy::cast_possible_truncation)]
        let header = [COMMAND_PREFIX, tag, payload.len() as u8];
        bytes
            .extend_from_slice(&header)
            .map_err(|()| EncodingError::FrameOverflow(payload.len()))?;
        bytes
            .extend_from_slice(payload)
            .map_err(|()| EncodingError::FrameOverflow(payload.len()))?;
        let sum = checksum(&bytes);
        bytes
            .push(sum)
            .map_err(|_| EncodingError::FrameOverflow(payload.len()))?;
        Ok(Self { bytes })
    }

    /// Raw bytes ready for transmission
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn tag(&self) -> u8 {
        self.bytes[1]
    }

    /// Payload without header and checksum
    pub fn payload(&self) -> &[u8] {
        &self.bytes[HEADER_LEN..self.bytes.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Low byte of the sum of all bytes
#[inline]
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, byte| acc.wrapping_add(*byte))
}

/// Ordered frames produced by a single update
///
/// Frames are transmitted front to back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameBatch {
    frames: Vec<CommandFrame, MAX_BATCH_LEN>,
}

impl FrameBatch {
    pub const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    pub fn push(&mut self, frame: CommandFrame) -> Result<(), EncodingError> {
        self.frames
            .push(frame)
            .map_err(|_| EncodingError::BatchOverflow)
    }

    /// Append all frames of `other`, keeping their order
    pub fn append(&mut self, other: FrameBatch) -> Result<(), EncodingError> {
        for frame in other.frames {
            self.push(frame)?;
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandFrame> {
        self.frames.iter()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl<'a> IntoIterator for &'a FrameBatch {
    type Item = &'a CommandFrame;
    type IntoIter = core::slice::Iter<'a, CommandFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}
