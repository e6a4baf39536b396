pub mod quantize;
pub mod reconfig;
pub mod telemetry;
pub mod timeout;
pub mod transform;

/// Length class of an uplink frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameKind {
    /// Full position report, [`telemetry::TELEMETRY_FRAME_LEN`] bytes.
    Telemetry,
    /// Battery-only report sent when no usable fix was obtained.
    Timeout,
}

impl FrameKind {
    pub const fn frame_len(&self) -> usize {
        match self {
            FrameKind::Telemetry => telemetry::TELEMETRY_FRAME_LEN,
            FrameKind::Timeout => timeout::TIMEOUT_FRAME_LEN,
        }
    }
}

/// Trait implemented by frames that can be handed to the uplink.
pub trait UplinkMsg {
    fn kind(&self) -> FrameKind;
    fn as_bytes(&self) -> &[u8];
}

/// Render frame bytes as lowercase hex for logging.
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
