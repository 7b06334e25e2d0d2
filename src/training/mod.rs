use std::{
    collections::HashMap,
    sync::mpsc::Receiver,
    time::{Instant, SystemTime},
};

use circular_buffer::CircularBuffer;
use log::{info, warn};

use crate::registry::{ControlDescriptor, DeviceRegistry, MidiDevice};

pub mod classify;
pub mod dedup;
pub mod messages;
pub mod session;

use self::messages::{MidiReceiverPayload, RawMessage, TrainingOutcome};
use self::session::{TrainerPolicy, TrainingSession};

pub struct PortInformation {
    pub index: usize,
    pub full_name: String,
    pub last_received: SystemTime,
}

pub const MONITOR_LOG_LENGTH: usize = 16;

/// Host-supplied completion callback, invoked with the device and the newly
/// built control after every successful finalize.
pub type OnTrained = Box<dyn FnMut(&MidiDevice, &ControlDescriptor)>;

pub struct TrainerModel {
    pub message_log: CircularBuffer<MONITOR_LOG_LENGTH, String>,
    pub training_log: CircularBuffer<MONITOR_LOG_LENGTH, String>,
    pub midi_rx: Receiver<MidiReceiverPayload>,
    pub ports_metadata: HashMap<String, PortInformation>,
    pub registry: DeviceRegistry,
    pub session: TrainingSession,
    pub on_trained: Option<OnTrained>,
}

impl TrainerModel {
    pub fn new(midi_rx: Receiver<MidiReceiverPayload>, policy: TrainerPolicy) -> Self {
        TrainerModel {
            midi_rx,
            message_log: CircularBuffer::new(),
            training_log: CircularBuffer::new(),
            ports_metadata: HashMap::new(),
            registry: DeviceRegistry::new(),
            session: TrainingSession::new(policy),
            on_trained: None,
        }
    }

    /// Register an opened port; the port name doubles as the device entry
    /// the session resolves event sources against.
    pub fn add_port(&mut self, index: usize, full_name: String) {
        self.registry.add_device(&full_name);
        let port_key = format!("{index}");
        self.ports_metadata.insert(
            port_key,
            PortInformation {
                index,
                full_name,
                last_received: SystemTime::now(),
            },
        );
    }

    pub fn is_training(&self) -> bool {
        self.session.is_training()
    }

    pub fn set_training(&mut self, training: bool) {
        if training {
            info!("Training on; press or move the control you want to map");
        } else {
            info!("Training off");
        }
        self.session.set_training(training);
    }

    pub fn handle_incoming_midi(&mut self, port_index: usize, msg: &RawMessage) {
        self.message_log.push_back(format!("#{port_index} {msg}"));

        let source = match self.ports_metadata.get(&format!("{port_index}")) {
            Some(info) => info.full_name.clone(),
            None => {
                warn!("message {msg} from unregistered port {port_index}");
                String::new()
            }
        };

        let outcome = self
            .session
            .accept(&mut self.registry, &source, *msg, Instant::now());
        self.update_port_info(port_index);
        if let Some(outcome) = outcome {
            self.report(outcome);
        }
    }

    /// Drive the session's quiet-period deadline; call on every model tick.
    pub fn poll_session(&mut self, now: Instant) {
        if let Some(outcome) = self.session.poll(&mut self.registry, now) {
            self.report(outcome);
        }
    }

    fn report(&mut self, outcome: TrainingOutcome) {
        match outcome {
            TrainingOutcome::Trained { device, control_id } => {
                let Some(device) = self.registry.get(device) else {
                    return;
                };
                let Some(control) = device.controls.iter().find(|c| c.id == control_id) else {
                    return;
                };
                info!("Trained '{}' on '{}'", control.name, device.name);
                self.training_log
                    .push_back(format!("{}: {}", device.name, control.name));
                if let Some(on_trained) = self.on_trained.as_mut() {
                    on_trained(device, control);
                }
            }
            TrainingOutcome::DuplicateBinding {
                device,
                control_id,
                binding,
            } => {
                let device_name = self
                    .registry
                    .get(device)
                    .map_or("unknown device", |d| d.name.as_str());
                warn!(
                    "{binding} is already bound on control {control_id} of '{device_name}'; nothing attached"
                );
                self.training_log.push_back(format!(
                    "{device_name}: {binding} already bound (control {control_id})"
                ));
            }
            TrainingOutcome::DeviceUnresolved => {
                warn!("Training ended without a matched device");
                self.training_log.push_back("no matched device".into());
            }
        }
    }

    fn update_port_info(&mut self, index: usize) {
        for (key, info) in self.ports_metadata.iter_mut() {
            if key.eq(&format!("{index}")) {
                info.last_received = SystemTime::now();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn test_end_to_end_single_pad_press() {
        let (_tx, rx) = mpsc::channel();
        let mut model = TrainerModel::new(rx, TrainerPolicy::default());
        model.add_port(0, String::from("Pad1"));

        let trained: Rc<RefCell<Vec<(String, String)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&trained);
        model.on_trained = Some(Box::new(move |device, control| {
            sink.borrow_mut()
                .push((device.name.clone(), control.name.clone()));
        }));

        model.set_training(true);
        model.handle_incoming_midi(0, &RawMessage::new(0x90, 36, 127));
        model.poll_session(Instant::now() + Duration::from_millis(500));

        assert_eq!(
            trained.borrow().as_slice(),
            &[(String::from("Pad1"), String::from("BUTTON_1"))]
        );
        let device = model.registry.get(0).unwrap();
        assert_eq!(device.controls[0].bindings, vec![RawMessage::new(0x90, 36, 127)]);
        assert!(!model.message_log.is_empty());
    }

    #[test]
    fn test_no_callback_for_duplicate_binding() {
        let (_tx, rx) = mpsc::channel();
        let mut model = TrainerModel::new(rx, TrainerPolicy::default());
        model.add_port(0, String::from("Pad1"));

        let count = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&count);
        model.on_trained = Some(Box::new(move |_, _| *sink.borrow_mut() += 1));

        model.set_training(true);
        model.handle_incoming_midi(0, &RawMessage::new(0x90, 36, 127));
        model.poll_session(Instant::now() + Duration::from_millis(500));

        model.set_training(true);
        model.handle_incoming_midi(0, &RawMessage::new(0x90, 36, 127));
        model.poll_session(Instant::now() + Duration::from_millis(1000));

        assert_eq!(*count.borrow(), 1);
        assert_eq!(model.registry.get(0).unwrap().controls.len(), 1);
    }
}
