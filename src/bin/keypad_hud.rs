use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use keypad_hud::actor::controller::{Controller, Event};
use keypad_hud::common::config::{self, Action, Config};
use keypad_hud::common::log::init_logging;
use keypad_hud::sys::headless::HeadlessSystem;
use keypad_hud::sys::window::{WindowHandle, WindowInfo};
use tracing::{info, info_span};

/// Replays a scripted session against the in-memory host and logs every
/// surface it would put on screen.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Config file to load instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,

    /// More output per occurrence (debug, then trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Comma-separated actions to perform, in order
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "switcher_toggle,switcher_next,switcher_next,switcher_prev,show_toast,switcher_hide"
    )]
    script: Vec<Action>,

    /// Virtual time that passes after each action
    #[arg(long, default_value_t = 250)]
    step_ms: u64,

    /// Executables of the sample windows, front to back
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "chrome.exe,Code.exe,WindowsTerminal.exe,slack.exe"
    )]
    windows: Vec<String>,
}

fn load_config(cli: &Cli) -> Result<Config> {
    match cli.config.clone().or_else(config::config_file) {
        Some(path) => Config::read(&path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    });
    let config = load_config(&cli)?;

    let host = HeadlessSystem::desktop(Instant::now());
    for (i, exe) in cli.windows.iter().enumerate() {
        host.add_window(WindowInfo {
            handle: WindowHandle::new(i as u64 + 1),
            title: format!("{exe} window"),
            class_name: "SampleWindow".into(),
            process_name: Some(exe.clone()),
        });
    }
    if !cli.windows.is_empty() {
        host.set_foreground(Some(WindowHandle::new(1)));
    }

    let mut controller = Controller::new(config, host);
    let step = Duration::from_millis(cli.step_ms);
    let now = controller.system().now();
    controller.start(now);

    for (n, action) in cli.script.iter().enumerate() {
        let _span = info_span!("step", n, %action).entered();
        let now = controller.system().now();
        controller.handle_event(Event::Action(*action), now);
        controller.run_until(now + step);
        for surface in controller.system().surfaces() {
            info!(
                id = ?surface.id,
                origin = ?surface.origin,
                size = ?surface.size,
                alpha = surface.alpha,
                frames = surface.frames,
                "presented"
            );
        }
    }

    let now = controller.system().now();
    controller.handle_event(Event::Shutdown, now);
    info!(
        activations = ?controller.system().activations(),
        "session finished"
    );
    Ok(())
}
