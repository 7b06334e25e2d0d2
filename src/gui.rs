use std::time::Duration;

use egui::{Color32, RichText};

use crate::training::{TrainerModel, MONITOR_LOG_LENGTH};

pub fn render_gui(model: &mut TrainerModel, ui: &mut egui::Ui) {
    ui.heading("Training");
    let mut training = model.is_training();
    if ui.checkbox(&mut training, "Training mode").changed() {
        model.set_training(training);
    }
    if training {
        ui.label(
            RichText::new("Press or move the control you want to map").color(Color32::GREEN),
        );
    } else {
        ui.label("Enable training mode, then operate a single control");
    }
    ui.separator();

    ui.heading("MIDI Ports Connected");

    for (_key, info) in model.ports_metadata.iter() {
        ui.horizontal(|ui| {
            ui.label(&format!("PORT #{}: \"{}\"", info.index, info.full_name));
            if let Ok(elapsed) = info.last_received.elapsed() {
                let color = if elapsed > Duration::from_secs(5) {
                    Color32::RED
                } else if elapsed > Duration::from_secs(1) {
                    Color32::LIGHT_YELLOW
                } else {
                    Color32::GREEN
                };
                ui.label(RichText::new(format!("{:.0}s ago", elapsed.as_secs_f32())).color(color));
            }
        });
    }

    ui.separator();

    ui.heading("Learned Controls");

    for device in model.registry.devices() {
        ui.label(&format!("\"{}\"", device.name));
        if device.controls.is_empty() {
            ui.label("Nothing learned yet");
        }
        for control in &device.controls {
            let subtype = control
                .subtype
                .map(|s| format!("/{s}"))
                .unwrap_or_default();
            ui.label(&format!(
                "#{} {} ({}{} {}) {} binding(s)",
                control.id,
                control.name,
                control.control_type,
                subtype,
                control.mode,
                control.bindings.len()
            ));
        }
    }

    ui.separator();

    ui.heading("Training results");
    for item in model.training_log.iter().rev() {
        ui.label(item);
    }

    ui.separator();

    ui.heading(&format!(
        "Last {} (max) messages received",
        MONITOR_LOG_LENGTH
    ));

    if model.message_log.is_empty() {
        ui.label("Nothing received yet");
    } else {
        egui::ScrollArea::vertical()
            .auto_shrink([true; 2])
            .show(ui, |ui| {
                for item in model.message_log.iter().rev() {
                    ui.label(item);
                }
            });
    }
}
