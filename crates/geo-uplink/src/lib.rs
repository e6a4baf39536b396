/// Position telemetry for trackers on a low-power wide-area uplink.
///
/// The *protocol* modules pack a fix sample into a fixed 12 byte frame (or a 1 byte frame when no
/// usable fix was obtained) and decode the 3 byte reconfiguration reply. The *controllers* decide
/// when a fix attempt starts ([`cadence::FixCadenceController`]) and whether an outgoing frame asks
/// for a reply window ([`duty_cycle::DutyCycleController`]). Hardware lives behind
/// [`platform::Platform`].
use std::sync::Once;

use thiserror::Error;

pub mod cadence;
pub mod config;
pub mod duty_cycle;
pub mod params;
pub mod platform;
pub mod protocol;
pub mod sample;
pub mod sim;

use protocol::FrameKind;

/// Result type for this library
pub type GUResult<T> = std::result::Result<T, Error>;

/// Error type for this library
#[derive(Debug, Error)]
pub enum Error {
    #[error("Malformed reconfiguration reply: expected 3 bytes, got {len}")]
    MalformedReconfiguration { len: usize },
    #[error("Parse error: {0}")]
    ParseError(String),
    #[error("Invalid {kind:?} frame length: expected {expected}, got {actual}")]
    InvalidFrameLength {
        kind: FrameKind,
        expected: usize,
        actual: usize,
    },
    #[error("Transmit failure: {0}")]
    TransmitFailure(String),
}

impl From<nom::error::Error<&[u8]>> for Error {
    fn from(err: nom::error::Error<&[u8]>) -> Self {
        Error::ParseError(format!("{:?}", err))
    }
}

/// Test binary helper to init tracing. This is usually the responsibility of the consumer of the
/// library crate.
pub fn lazy_init_tracing() {
    {
        static INIT: Once = Once::new();
        &INIT
    }
    .call_once(|| {
        tracing_subscriber::fmt::init();
    });
}
