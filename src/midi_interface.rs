use std::{sync::mpsc::Sender, thread::JoinHandle, time::Duration};

use anyhow::anyhow;
use log::{debug, error, info};
use midi_msg::{MidiMsg, ReceiverContext};
use midir::{MidiInput, MidiInputPort};

use crate::training::messages::{MidiReceiverPayload, RawMessage};

pub fn get_midi_connection(
    midi_input: &MidiInput,
    preferred_port: usize,
) -> anyhow::Result<(MidiInputPort, String)> {
    let in_ports = midi_input.ports();
    if in_ports.is_empty() {
        return Err(anyhow!("no MIDI input ports available"));
    }
    let port = in_ports
        .get(preferred_port)
        .ok_or_else(|| anyhow!("no MIDI input port with index {}", preferred_port))?
        .clone();
    let port_name = midi_input.port_name(&port)?;
    Ok((port, port_name))
}

/// Listen on one opened port and forward every trainable message as a
/// (port index, raw tuple) payload. Byte handling stays here; the trainer
/// core only ever sees the decoded tuples.
pub fn midi_listener_thread(
    midi_input: MidiInput,
    port: MidiInputPort,
    tx: Sender<MidiReceiverPayload>,
    port_index: usize,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut ctx = ReceiverContext::new();
        // _conn_in needs to be a named parameter, because it needs to be kept alive until the end of the scope
        let _conn_in = match midi_input.connect(
            &port,
            "midir-read-input",
            move |_stamp, midi_bytes, _| {
                if let Ok((msg, _len)) = MidiMsg::from_midi_with_context(midi_bytes, &mut ctx) {
                    debug!("Port {} decoded: {:?}", port_index, msg);
                }
                match RawMessage::from_bytes(midi_bytes) {
                    Some(msg) => tx
                        .send((port_index, msg))
                        .expect("failed to send on MIDI thread"),
                    None => debug!(
                        "Port {}: ignoring {}-byte message",
                        port_index,
                        midi_bytes.len()
                    ),
                }
            },
            (),
        ) {
            Ok(conn) => conn,
            Err(e) => {
                error!(
                    "Failed to open MIDI connection on port {}: {}",
                    port_index, e
                );
                return;
            }
        };

        info!("MIDI connection open, reading input on port {}", port_index);

        loop {
            std::thread::sleep(Duration::from_millis(1));
        }
    })
}
