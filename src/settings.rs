use clap::Parser;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[arg(long = "loglevel",default_value_t=String::from("info"))]
    pub log_level: String,

    /// Flag to enable headless (no GUI) mode, suitable for server-type
    /// process; training is armed immediately and every trained control
    /// is printed as a JSON line
    #[arg(long = "headless")]
    pub headless_mode: bool,

    /// Quiet period in milliseconds after the most recent message before
    /// the trainer finalizes its guess
    #[arg(long = "trainer.debounce", default_value_t = 450)]
    pub debounce_ms: u64,

    /// Finalize as soon as this many raw messages have arrived, without
    /// waiting out the quiet period
    #[arg(long = "trainer.eager")]
    pub eager_threshold: Option<usize>,

    /// Use the reduced button/fader split instead of the full taxonomy
    #[arg(long = "trainer.coarse")]
    pub coarse_taxonomy: bool,

    /// Specify one or more MIDI ports by index, in any order
    #[clap()]
    pub midi_ports: Vec<usize>,
}
