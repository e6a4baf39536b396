/// Payload transform applied to frame bytes right before transmission, e.g. encryption.
pub trait PayloadTransform {
    fn apply(&self, bytes: &[u8]) -> Vec<u8>;
}

/// Transmit frames unchanged.
#[derive(Debug, Default, Copy, Clone)]
pub struct Identity;

impl PayloadTransform for Identity {
    fn apply(&self, bytes: &[u8]) -> Vec<u8> {
        bytes.to_vec()
    }
}
