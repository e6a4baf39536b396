/// Reply window duty cycle: decides which uplink frames request a reconfiguration reply, and
/// collects the reply.
use tracing::{debug, info, warn};

use crate::{
    params::SchedulerUpdate,
    protocol::{
        hex, reconfig,
        transform::{Identity, PayloadTransform},
        FrameKind, UplinkMsg,
    },
    GUResult,
};

/// A frame ready for the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransmitRequest {
    pub kind: FrameKind,
    /// Frame bytes after the payload transform.
    pub payload: Vec<u8>,
    /// Number of repetitions the transport should send.
    pub repeats: u8,
    /// Open a reply window after this transmission.
    pub request_reconfiguration: bool,
}

/// One phase of a reply window, as reported by the transport.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DownlinkPhase<'a> {
    Begin,
    Data(&'a [u8]),
    /// Window closed, whether or not data arrived.
    End,
}

/// Acknowledgement returned to the transport for each phase.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DownlinkStatus {
    Done,
}

impl DownlinkStatus {
    /// Numeric status expected by the transport callback.
    pub fn code(&self) -> i32 {
        match self {
            DownlinkStatus::Done => 1,
        }
    }
}

pub struct DutyCycleController {
    /// Plain transmissions since the last reply window request.
    counter: u8,
    repeats: u8,
    reply_pending: bool,
    transform: Box<dyn PayloadTransform>,
}

impl DutyCycleController {
    pub fn new(repeats: u8) -> Self {
        Self {
            counter: 0,
            repeats,
            reply_pending: false,
            transform: Box::new(Identity),
        }
    }

    pub fn with_transform(mut self, transform: impl PayloadTransform + 'static) -> Self {
        self.transform = Box::new(transform);
        self
    }

    pub fn counter(&self) -> u8 {
        self.counter
    }

    /// A reply window was requested and has not been closed yet.
    pub fn reply_pending(&self) -> bool {
        self.reply_pending
    }

    /// Build the transmit request for `frame`. Every `max_counter + 1`th frame requests a reply
    /// window and resets the counter.
    pub fn on_frame_ready<M: UplinkMsg>(&mut self, frame: &M, max_counter: u8) -> TransmitRequest {
        let request_reconfiguration = self.counter >= max_counter;
        debug!(
            "{:?} frame {} (downlink counter {}/{})",
            frame.kind(),
            hex(frame.as_bytes()),
            self.counter,
            max_counter
        );
        if request_reconfiguration {
            self.counter = 0;
            self.reply_pending = true;
        } else {
            self.counter += 1;
        }
        TransmitRequest {
            kind: frame.kind(),
            payload: self.transform.apply(frame.as_bytes()),
            repeats: self.repeats,
            request_reconfiguration,
        }
    }

    /// Handle one phase of a reply window. Returns the update carried by a data phase.
    pub fn on_reconfiguration_bytes(
        &mut self,
        phase: DownlinkPhase<'_>,
    ) -> GUResult<Option<SchedulerUpdate>> {
        match phase {
            DownlinkPhase::Begin => {
                debug!("reply window open");
                Ok(None)
            }
            DownlinkPhase::End => {
                debug!("reply window closed");
                self.reply_pending = false;
                Ok(None)
            }
            DownlinkPhase::Data(bytes) => {
                if !self.reply_pending {
                    warn!("reply {} outside of a requested window", hex(bytes));
                }
                let update = reconfig::decode(bytes).inspect_err(|e| warn!("{}", e))?;
                info!("reconfiguration {}: {:?}", hex(bytes), update);
                Ok(Some(update))
            }
        }
    }

    /// The window request was not transmitted, so no reply phases will follow.
    pub fn cancel_reply_window(&mut self) {
        self.reply_pending = false;
    }

    /// Keep the counter within `[0, max_counter]` after the maximum was lowered.
    pub fn clamp_counter(&mut self, max_counter: u8) {
        self.counter = self.counter.min(max_counter);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        lazy_init_tracing,
        protocol::{reconfig::RECONFIGURATION_LEN, timeout, transform::PayloadTransform},
        Error,
    };

    struct XorTransform(u8);

    impl PayloadTransform for XorTransform {
        fn apply(&self, bytes: &[u8]) -> Vec<u8> {
            bytes.iter().map(|b| b ^ self.0).collect()
        }
    }

    #[test]
    fn test_duty_cycle_sequence() {
        lazy_init_tracing();
        let mut dc = DutyCycleController::new(2);
        let frame = timeout::encode(3000);
        let mut modes = vec![];
        for _ in 0..3 {
            let before = dc.counter();
            let req = dc.on_frame_ready(&frame, 2);
            modes.push((before, req.request_reconfiguration, dc.counter()));
        }
        assert_eq!(modes, vec![(0, false, 1), (1, false, 2), (2, true, 0)]);
        assert!(dc.reply_pending());
    }

    #[test]
    fn test_zero_max_always_requests() {
        let mut dc = DutyCycleController::new(2);
        let frame = timeout::encode(3000);
        for _ in 0..4 {
            assert!(dc.on_frame_ready(&frame, 0).request_reconfiguration);
            assert_eq!(dc.counter(), 0);
        }
    }

    #[test]
    fn test_request_contents() {
        let mut dc = DutyCycleController::new(2);
        let req = dc.on_frame_ready(&timeout::encode(3000), 23);
        assert_eq!(
            req,
            TransmitRequest {
                kind: FrameKind::Timeout,
                payload: vec![0xC8],
                repeats: 2,
                request_reconfiguration: false,
            }
        );
    }

    #[test]
    fn test_transform_applied() {
        let mut dc = DutyCycleController::new(0).with_transform(XorTransform(0xFF));
        let req = dc.on_frame_ready(&timeout::encode(3000), 23);
        assert_eq!(req.payload, vec![0x37]);
        assert_eq!(req.repeats, 0);
    }

    #[test]
    fn test_reply_phases() {
        lazy_init_tracing();
        let mut dc = DutyCycleController::new(2);
        dc.on_frame_ready(&timeout::encode(3000), 0);
        assert!(dc.on_reconfiguration_bytes(DownlinkPhase::Begin).unwrap().is_none());
        let update = dc
            .on_reconfiguration_bytes(DownlinkPhase::Data(&[90, 2, 10]))
            .unwrap()
            .unwrap();
        assert_eq!(update.fix_timeout_s, 90);
        assert_eq!(update.downlink_max_counter, Some(10));
        assert!(dc.reply_pending());
        assert!(dc.on_reconfiguration_bytes(DownlinkPhase::End).unwrap().is_none());
        assert!(!dc.reply_pending());
        assert_eq!(DownlinkStatus::Done.code(), 1);
    }

    #[test]
    fn test_empty_window_is_not_an_error() {
        let mut dc = DutyCycleController::new(2);
        dc.on_frame_ready(&timeout::encode(3000), 0);
        assert!(dc.on_reconfiguration_bytes(DownlinkPhase::Begin).is_ok());
        assert!(dc.on_reconfiguration_bytes(DownlinkPhase::End).is_ok());
    }

    #[test]
    fn test_malformed_reply() {
        let mut dc = DutyCycleController::new(2);
        let short = [1u8; RECONFIGURATION_LEN - 1];
        assert!(matches!(
            dc.on_reconfiguration_bytes(DownlinkPhase::Data(&short)),
            Err(Error::MalformedReconfiguration { len: 2 })
        ));
    }

    #[test]
    fn test_cancel_reply_window() {
        let mut dc = DutyCycleController::new(2);
        dc.on_frame_ready(&timeout::encode(3000), 0);
        assert!(dc.reply_pending());
        dc.cancel_reply_window();
        assert!(!dc.reply_pending());
        // a stray reply is still decoded
        assert!(dc
            .on_reconfiguration_bytes(DownlinkPhase::Data(&[60, 0, 5]))
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_clamp_counter() {
        let mut dc = DutyCycleController::new(2);
        let frame = timeout::encode(3000);
        for _ in 0..5 {
            dc.on_frame_ready(&frame, 23);
        }
        assert_eq!(dc.counter(), 5);
        dc.clamp_counter(3);
        assert_eq!(dc.counter(), 3);
        dc.clamp_counter(10);
        assert_eq!(dc.counter(), 3);
        assert!(dc.on_frame_ready(&frame, 3).request_reconfiguration);
    }
}
