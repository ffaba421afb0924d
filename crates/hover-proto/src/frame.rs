//! Command and status wire vocabulary.
//!
//! Frames are tiny datagrams addressed by a (port, channel) byte pair,
//! followed by a one-byte opcode and an optional little-endian payload.
//! Status replies travel back on the same (port, channel).

use thiserror::Error;

pub const NAV_PORT: u8 = 0x0D;
pub const NAV_CHANNEL: u8 = 0;

pub mod opcode {
    pub const STOP: u8 = 0;
    pub const SQUARE: u8 = 1;
    pub const RECTANGLE: u8 = 2;
    pub const OVAL: u8 = 3;
    pub const TRIANGLE: u8 = 4;
    /// Payload: target altitude, u16 little-endian, millimetres.
    pub const SET_ALT_MM: u8 = 5;
    pub const OVERRIDE_ON: u8 = 10;
    pub const OVERRIDE_OFF: u8 = 11;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Stop,
    StartSquare,
    StartRectangle,
    StartOval,
    StartTriangle,
    SetAltitudeMm(u16),
    OverrideOn,
    OverrideOff,
}

/// Why a frame was dropped. The decoder is best-effort: every variant is
/// drop-and-continue for the receive loop, nothing propagates upward.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("frame too short ({0} bytes)")]
    TooShort(usize),
    #[error("not ours: port {port:#04x} channel {channel}")]
    WrongAddress { port: u8, channel: u8 },
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u8),
    #[error("opcode {0:#04x} payload truncated")]
    TruncatedPayload(u8),
}

impl Command {
    pub fn decode(frame: &[u8]) -> Result<Self, DecodeError> {
        if frame.len() < 3 {
            return Err(DecodeError::TooShort(frame.len()));
        }
        let (port, channel) = (frame[0], frame[1]);
        if port != NAV_PORT || channel != NAV_CHANNEL {
            return Err(DecodeError::WrongAddress { port, channel });
        }
        let op = frame[2];
        let payload = &frame[3..];
        match op {
            opcode::STOP => Ok(Self::Stop),
            opcode::SQUARE => Ok(Self::StartSquare),
            opcode::RECTANGLE => Ok(Self::StartRectangle),
            opcode::OVAL => Ok(Self::StartOval),
            opcode::TRIANGLE => Ok(Self::StartTriangle),
            opcode::SET_ALT_MM => match payload.first_chunk::<2>() {
                Some(raw) => Ok(Self::SetAltitudeMm(u16::from_le_bytes(*raw))),
                None => Err(DecodeError::TruncatedPayload(op)),
            },
            opcode::OVERRIDE_ON => Ok(Self::OverrideOn),
            opcode::OVERRIDE_OFF => Ok(Self::OverrideOff),
            other => Err(DecodeError::UnknownOpcode(other)),
        }
    }

    /// Encode for sending, header included. Used by operator tooling and
    /// tests; the vehicle side only decodes.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = vec![NAV_PORT, NAV_CHANNEL];
        match self {
            Self::Stop => out.push(opcode::STOP),
            Self::StartSquare => out.push(opcode::SQUARE),
            Self::StartRectangle => out.push(opcode::RECTANGLE),
            Self::StartOval => out.push(opcode::OVAL),
            Self::StartTriangle => out.push(opcode::TRIANGLE),
            Self::SetAltitudeMm(mm) => {
                out.push(opcode::SET_ALT_MM);
                out.extend_from_slice(&mm.to_le_bytes());
            }
            Self::OverrideOn => out.push(opcode::OVERRIDE_ON),
            Self::OverrideOff => out.push(opcode::OVERRIDE_OFF),
        }
        out
    }
}

/// Status reply: current state code plus the latest valid downward range
/// (0 when unavailable). Informational telemetry, not control input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status {
    pub state: u8,
    pub alt_mm: u16,
}

impl Status {
    pub const ENCODED_LEN: usize = 5;

    pub fn encode(&self) -> [u8; Self::ENCODED_LEN] {
        let alt = self.alt_mm.to_le_bytes();
        [NAV_PORT, NAV_CHANNEL, self.state, alt[0], alt[1]]
    }

    pub fn decode(frame: &[u8]) -> Result<Self, DecodeError> {
        if frame.len() < Self::ENCODED_LEN {
            return Err(DecodeError::TooShort(frame.len()));
        }
        if frame[0] != NAV_PORT || frame[1] != NAV_CHANNEL {
            return Err(DecodeError::WrongAddress { port: frame[0], channel: frame[1] });
        }
        Ok(Self {
            state: frame[2],
            alt_mm: u16::from_le_bytes([frame[3], frame[4]]),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_the_command_vocabulary() {
        assert_eq!(Command::decode(&[0x0D, 0, 0]), Ok(Command::Stop));
        assert_eq!(Command::decode(&[0x0D, 0, 1]), Ok(Command::StartSquare));
        assert_eq!(Command::decode(&[0x0D, 0, 2]), Ok(Command::StartRectangle));
        assert_eq!(Command::decode(&[0x0D, 0, 3]), Ok(Command::StartOval));
        assert_eq!(Command::decode(&[0x0D, 0, 4]), Ok(Command::StartTriangle));
        assert_eq!(Command::decode(&[0x0D, 0, 10]), Ok(Command::OverrideOn));
        assert_eq!(Command::decode(&[0x0D, 0, 11]), Ok(Command::OverrideOff));
    }

    #[test]
    fn altitude_payload_is_little_endian() {
        // 1200 mm = 0x04B0
        assert_eq!(
            Command::decode(&[0x0D, 0, 5, 0xB0, 0x04]),
            Ok(Command::SetAltitudeMm(1200))
        );
    }

    #[test]
    fn truncated_altitude_payload_is_rejected() {
        assert_eq!(
            Command::decode(&[0x0D, 0, 5, 0xB0]),
            Err(DecodeError::TruncatedPayload(5))
        );
    }

    #[test]
    fn unknown_opcode_is_rejected_not_guessed() {
        assert_eq!(Command::decode(&[0x0D, 0, 9]), Err(DecodeError::UnknownOpcode(9)));
        assert_eq!(Command::decode(&[0x0D, 0, 0xFF]), Err(DecodeError::UnknownOpcode(0xFF)));
    }

    #[test]
    fn frames_for_other_ports_are_not_ours() {
        assert_eq!(
            Command::decode(&[0x0C, 0, 1]),
            Err(DecodeError::WrongAddress { port: 0x0C, channel: 0 })
        );
        assert_eq!(
            Command::decode(&[0x0D, 1, 1]),
            Err(DecodeError::WrongAddress { port: 0x0D, channel: 1 })
        );
    }

    #[test]
    fn short_frames_are_rejected() {
        assert_eq!(Command::decode(&[]), Err(DecodeError::TooShort(0)));
        assert_eq!(Command::decode(&[0x0D, 0]), Err(DecodeError::TooShort(2)));
    }

    #[test]
    fn set_altitude_encodes_with_le_payload() {
        assert_eq!(
            Command::SetAltitudeMm(1200).encode(),
            vec![0x0D, 0, 5, 0xB0, 0x04]
        );
    }

    #[test]
    fn status_encodes_state_then_altitude_le() {
        let s = Status { state: 2, alt_mm: 1200 };
        assert_eq!(s.encode(), [0x0D, 0, 2, 0xB0, 0x04]);
        assert_eq!(Status::decode(&s.encode()), Ok(s));
    }
}
