use serde::Serialize;

use crate::training::classify::{ControlClassification, ControlMode, ControlSubtype, ControlType};
use crate::training::messages::RawMessage;

/// A physical control synthesized from one training cycle, bound to the
/// distinct messages that control was observed producing. Owned by the
/// device once attached.
#[derive(Serialize, Debug, Clone)]
pub struct ControlDescriptor {
    pub id: u32,
    pub name: String,
    pub control_type: ControlType,
    pub subtype: Option<ControlSubtype>,
    pub mode: ControlMode,
    pub bindings: Vec<RawMessage>,
}

impl ControlDescriptor {
    pub fn new(id: u32, name: String, classification: ControlClassification) -> Self {
        ControlDescriptor {
            id,
            name,
            control_type: classification.control_type,
            subtype: classification.subtype,
            mode: classification.mode,
            bindings: Vec::new(),
        }
    }

    pub fn add_binding(&mut self, msg: RawMessage) {
        if !self.bindings.contains(&msg) {
            self.bindings.push(msg);
        }
    }

    pub fn has_binding(&self, msg: &RawMessage) -> bool {
        self.bindings.contains(msg)
    }
}

/// One MIDI input device and the controls learned on it so far. The name is
/// the port name reported by the transport and is what incoming event
/// sources are matched against.
#[derive(Serialize, Debug, Clone)]
pub struct MidiDevice {
    pub name: String,
    pub controls: Vec<ControlDescriptor>,
}

impl MidiDevice {
    pub fn new(name: &str) -> Self {
        MidiDevice {
            name: String::from(name),
            controls: Vec::new(),
        }
    }

    /// Existing control of the given type already bound to this message, if
    /// any. The type must match: the same tuple may legitimately be bound on
    /// controls of different types.
    pub fn control_with_binding(
        &self,
        control_type: ControlType,
        msg: &RawMessage,
    ) -> Option<&ControlDescriptor> {
        self.controls
            .iter()
            .find(|control| control.control_type == control_type && control.has_binding(msg))
    }

    pub fn next_available_control_id(&self) -> u32 {
        self.controls
            .iter()
            .map(|control| control.id)
            .max()
            .map_or(1, |max| max + 1)
    }

    pub fn num_of_control_type(&self, control_type: ControlType) -> usize {
        self.controls
            .iter()
            .filter(|control| control.control_type == control_type)
            .count()
    }

    pub fn add_control(&mut self, control: ControlDescriptor) {
        self.controls.push(control);
    }
}

/// The enumerable device list the session resolves event sources against,
/// populated from the MIDI ports opened at startup.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    devices: Vec<MidiDevice>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        DeviceRegistry::default()
    }

    pub fn add_device(&mut self, name: &str) {
        if self.index_of(name).is_none() {
            self.devices.push(MidiDevice::new(name));
        }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.devices.iter().position(|device| device.name == name)
    }

    pub fn get(&self, index: usize) -> Option<&MidiDevice> {
        self.devices.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut MidiDevice> {
        self.devices.get_mut(index)
    }

    pub fn devices(&self) -> &[MidiDevice] {
        &self.devices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button_classification() -> ControlClassification {
        ControlClassification {
            control_type: ControlType::Button,
            subtype: Some(ControlSubtype::On),
            mode: ControlMode::Trigger,
        }
    }

    #[test]
    fn test_control_ids_start_at_one_and_grow_past_the_max() {
        let mut device = MidiDevice::new("Pad1");
        assert_eq!(device.next_available_control_id(), 1);

        let mut control = ControlDescriptor::new(7, "BUTTON_1".into(), button_classification());
        control.add_binding(RawMessage::new(0x90, 36, 127));
        device.add_control(control);
        assert_eq!(device.next_available_control_id(), 8);
    }

    #[test]
    fn test_binding_lookup_requires_matching_type() {
        let mut device = MidiDevice::new("Pad1");
        let msg = RawMessage::new(0x90, 36, 127);
        let mut control = ControlDescriptor::new(1, "BUTTON_1".into(), button_classification());
        control.add_binding(msg);
        device.add_control(control);

        assert!(device.control_with_binding(ControlType::Button, &msg).is_some());
        assert!(device.control_with_binding(ControlType::Fader, &msg).is_none());
        assert!(device
            .control_with_binding(ControlType::Button, &RawMessage::new(0x90, 37, 127))
            .is_none());
    }

    #[test]
    fn test_counts_controls_per_type() {
        let mut device = MidiDevice::new("Pad1");
        device.add_control(ControlDescriptor::new(1, "BUTTON_1".into(), button_classification()));
        device.add_control(ControlDescriptor::new(2, "BUTTON_2".into(), button_classification()));
        assert_eq!(device.num_of_control_type(ControlType::Button), 2);
        assert_eq!(device.num_of_control_type(ControlType::Fader), 0);
    }

    #[test]
    fn test_registry_deduplicates_device_names() {
        let mut registry = DeviceRegistry::new();
        registry.add_device("Pad1");
        registry.add_device("Pad1");
        registry.add_device("Keys");
        assert_eq!(registry.devices().len(), 2);
        assert_eq!(registry.index_of("Keys"), Some(1));
        assert_eq!(registry.index_of("Unknown"), None);
    }

    #[test]
    fn test_bindings_are_not_duplicated() {
        let mut control = ControlDescriptor::new(1, "BUTTON_1".into(), button_classification());
        let msg = RawMessage::new(0x90, 36, 127);
        control.add_binding(msg);
        control.add_binding(msg);
        assert_eq!(control.bindings.len(), 1);
    }
}
