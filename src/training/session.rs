use std::mem;
use std::time::{Duration, Instant};

use log::{debug, warn};

use crate::registry::{ControlDescriptor, DeviceRegistry};

use super::classify::{classify, classify_coarse};
use super::dedup::deduplicate;
use super::messages::{RawMessage, TrainingOutcome};

/// Finalize policy for a training cycle.
#[derive(Debug, Clone)]
pub struct TrainerPolicy {
    /// Quiet period after the most recent message before the guess is
    /// finalized. Long enough to swallow the natural burst of one physical
    /// action (note-on/note-off, a fader sweep).
    pub quiet_period: Duration,
    /// Finalize as soon as the buffer holds this many raw messages, without
    /// waiting out the quiet period. The threshold wins over the timer.
    pub eager_threshold: Option<usize>,
    /// Use the reduced button/fader split instead of the full taxonomy.
    pub coarse_taxonomy: bool,
}

impl Default for TrainerPolicy {
    fn default() -> Self {
        TrainerPolicy {
            quiet_period: Duration::from_millis(450),
            eager_threshold: None,
            coarse_taxonomy: false,
        }
    }
}

/// One control-learning cycle: buffer messages while the user operates a
/// single physical control, then classify the burst once it goes quiet and
/// attach the resulting control to the matched device. The session object
/// lives across many cycles, one per control taught.
pub struct TrainingSession {
    policy: TrainerPolicy,
    training: bool,
    buffer: Vec<RawMessage>,
    device: Option<usize>,
    deadline: Option<Instant>,
}

impl TrainingSession {
    pub fn new(policy: TrainerPolicy) -> Self {
        TrainingSession {
            policy,
            training: false,
            buffer: Vec::new(),
            device: None,
            deadline: None,
        }
    }

    pub fn is_training(&self) -> bool {
        self.training
    }

    /// Toggled by the host UI. Switching off cancels the pending deadline
    /// and abandons any partially buffered data without finalizing.
    pub fn set_training(&mut self, training: bool) {
        self.training = training;
        if !training {
            self.deadline = None;
            self.buffer.clear();
            self.device = None;
        }
    }

    /// Feed one decoded message observed while the user operates the control
    /// being mapped. Restarts the quiet-period deadline; with an eager
    /// threshold configured, may finalize on the spot.
    pub fn accept(
        &mut self,
        registry: &mut DeviceRegistry,
        source: &str,
        msg: RawMessage,
        now: Instant,
    ) -> Option<TrainingOutcome> {
        if !self.training {
            debug!("not training; dropping message {msg} from '{source}'");
            return None;
        }

        // latch the device being trained; keep trying on every message
        // until a source matches
        if self.device.is_none() {
            self.device = registry.index_of(source);
        }

        self.buffer.push(msg);

        if let Some(threshold) = self.policy.eager_threshold {
            if self.buffer.len() >= threshold {
                return Some(self.finalize(registry));
            }
        }

        self.deadline = Some(now + self.policy.quiet_period);
        None
    }

    /// Drive the quiet-period deadline; call on every model tick. Returns
    /// the finalize outcome once the deadline has passed.
    pub fn poll(&mut self, registry: &mut DeviceRegistry, now: Instant) -> Option<TrainingOutcome> {
        match self.deadline {
            Some(deadline) if now >= deadline => Some(self.finalize(registry)),
            _ => None,
        }
    }

    // Single entry point for both triggers (deadline expiry, eager
    // threshold). Clearing the deadline and taking the buffer up front keeps
    // a second trigger in the same cycle from re-entering.
    fn finalize(&mut self, registry: &mut DeviceRegistry) -> TrainingOutcome {
        self.deadline = None;
        let buffer = mem::take(&mut self.buffer);
        let device_index = self.device.take();

        let Some(device_index) = device_index else {
            warn!(
                "finalize without a matched device; dropping {} buffered message(s)",
                buffer.len()
            );
            return TrainingOutcome::DeviceUnresolved;
        };
        let Some(device) = registry.get_mut(device_index) else {
            warn!("matched device {device_index} no longer in registry");
            return TrainingOutcome::DeviceUnresolved;
        };

        let (distinct, has_duplicates) = deduplicate(&buffer);
        debug!(
            "finalizing on '{}': {} raw, {} distinct, duplicates: {}",
            device.name,
            buffer.len(),
            distinct.len(),
            has_duplicates
        );

        let classification = if self.policy.coarse_taxonomy {
            classify_coarse(&distinct)
        } else {
            classify(&distinct, buffer.len())
        };

        for msg in &distinct {
            if let Some(existing) = device.control_with_binding(classification.control_type, msg) {
                return TrainingOutcome::DuplicateBinding {
                    device: device_index,
                    control_id: existing.id,
                    binding: *msg,
                };
            }
        }

        let id = device.next_available_control_id();
        let name = format!(
            "{}_{}",
            classification.control_type,
            device.num_of_control_type(classification.control_type) + 1
        );
        let mut control = ControlDescriptor::new(id, name, classification);
        for msg in &distinct {
            control.add_binding(*msg);
        }
        device.add_control(control);

        TrainingOutcome::Trained {
            device: device_index,
            control_id: id,
        }
    }
}
