use std::{
    sync::mpsc,
    time::{Duration, Instant},
};

use clap::Parser;
use eframe::egui;
use env_logger::Env;
use gui::render_gui;
use log::{debug, error, info};
use midi_interface::{get_midi_connection, midi_listener_thread};
use midir::{Ignore, MidiInput};
use settings::Cli;
use training::{session::TrainerPolicy, TrainerModel};

mod gui;
mod midi_interface;
mod registry;
mod settings;
mod training;

fn list_midi_ports() -> anyhow::Result<()> {
    let mut midi_input = MidiInput::new("midir reading input").expect("midir failure");
    midi_input.ignore(Ignore::None);

    for (i, p) in midi_input.ports().iter().enumerate() {
        println!("{}: {}", i, midi_input.port_name(p)?);
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    list_midi_ports().expect("failed to list MIDI ports");

    if cli.midi_ports.is_empty() {
        panic!("You must provide at least one MIDI port index(es), e.g. \"./midi-trainer 1 2\"")
    }

    env_logger::Builder::from_env(Env::default().default_filter_or(&cli.log_level))
        .filter_module("egui_glow", log::LevelFilter::Warn)
        .filter_module("egui_winit", log::LevelFilter::Warn)
        .filter_module("eframe", log::LevelFilter::Warn)
        .init();

    // TODO: join the listener handles on shutdown instead of leaking them
    let mut handles = Vec::new();

    let (midi_tx, midi_rx) = mpsc::channel();

    let policy = TrainerPolicy {
        quiet_period: Duration::from_millis(cli.debounce_ms),
        eager_threshold: cli.eager_threshold,
        coarse_taxonomy: cli.coarse_taxonomy,
    };
    let mut model = TrainerModel::new(midi_rx, policy);

    model.on_trained = Some(Box::new(|device, control| {
        match serde_json::to_string(control) {
            Ok(json) => println!("{} {}", device.name, json),
            Err(e) => error!("Failed to encode trained control: {}", e),
        }
    }));

    for port in cli.midi_ports {
        let mut midi_input = MidiInput::new("midir reading input").expect("midir failure");
        midi_input.ignore(Ignore::None);

        let midi_tx = midi_tx.clone();
        let (midi_input_port, port_name) =
            get_midi_connection(&midi_input, port).expect("failed to open MIDI port");
        model.add_port(port, port_name);
        handles.push(midi_listener_thread(
            midi_input,
            midi_input_port,
            midi_tx,
            port,
        ));
    }

    if cli.headless_mode {
        info!("Running in headless mode; Ctrl+C to quit");
        model.set_training(true);
        loop {
            while let Ok((port_index, msg)) = model.midi_rx.try_recv() {
                debug!("Last received message: {}", &msg);
                model.handle_incoming_midi(port_index, &msg);
            }
            model.poll_session(Instant::now());
            std::thread::sleep(Duration::from_millis(1));
        }
    } else {
        info!("Running graphics mode; close the window to quit");
        let options = eframe::NativeOptions {
            ..Default::default()
        };
        eframe::run_native(
            "MIDI Control Trainer",
            options,
            Box::new(|_cc| Box::<TrainerModel>::new(model)),
        )
        .expect("Failed to launch GUI");
        info!("GUI ended; exit now...");
        std::process::exit(0);
    }
}

impl eframe::App for TrainerModel {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.request_repaint();

        egui::CentralPanel::default().show(ctx, |ui| {
            render_gui(self, ui);
        });

        if let Ok((port_index, msg)) = self.midi_rx.try_recv() {
            debug!("GUI received MIDI message: {}", &msg);
            self.handle_incoming_midi(port_index, &msg);
        }
        self.poll_session(Instant::now());
    }
}
