//! Vibrato - a music-theory battle game in the console
//!
//! Main entry point: settings, logging, and the headless app loop.
//!
//! Flags:
//!   --seed N          deterministic enemy choices
//!   --mute            don't render notes
//!   --no-transcript   skip writing logs/*.evlog
//!   --skip-tutorial   go straight to battle
//!   --debug-log       verbose logging (see config/debug_logging.json)

use bevy::prelude::*;
use vibrato::{ConsoleInput, DebugLogConfig, HELP_TEXT, HeadlessAppBuilder, InitSettings};

fn main() -> AppExit {
    let args: Vec<String> = std::env::args().collect();

    // Load persistent settings (uses defaults if file doesn't exist)
    let saved = InitSettings::load();

    // Save on first run to ensure the file exists
    if let Err(e) = saved.save() {
        warn!("Failed to save initial settings: {}", e);
    }

    let mut settings = saved;
    if let Err(e) = settings.apply_args(&args) {
        eprintln!("{}", e);
        return AppExit::error();
    }

    let logging = DebugLogConfig::load_with_args(&args);

    println!("VIBRATO");
    println!("{}\n", HELP_TEXT);

    HeadlessAppBuilder::new()
        .with_settings(settings)
        .with_logging(logging)
        .with_input(ConsoleInput::spawn_stdin())
        .build()
        .run()
}
