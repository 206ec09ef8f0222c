//! Entry point for the **sway-reflex** autogap/autotile daemon.
//!
//! Subscribes to sway events on a background thread and feeds them, one at
//! a time, to the [`AutotileController`] on another.  The main thread waits
//! for a signal or for sway to go away, then releases the pidfile.

use clap::Parser;
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use sway_reflex::autotile::AutotileController;
use sway_reflex::command::WmEvent;
use sway_reflex::config::{Config, PhysicalSourceKind};
use sway_reflex::daemon::{exit_code, spawn_event_source, spawn_signal_watcher, Shutdown};
use sway_reflex::output::{OutputRegistry, PhysicalSource};
use sway_reflex::pidfile::{PidFile, REFLEX_PIDFILE};
use sway_reflex::sway::{SwayEventSource, SwayWm};
use sway_reflex::{Error, Result};

/// Keep sway windows at their physical size with automatic gaps and splits.
///
/// Bind `nop reflex:toggle_current`, `nop reflex:enable_current` or
/// `nop reflex:disable_current` in sway to switch autogap per workspace.
#[derive(Debug, Parser)]
#[command(name = "sway-reflex", version)]
struct Args {
    /// Config file (default: $XDG_CONFIG_HOME/sway-reflex/config.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Preferred window size in millimeters.
    #[arg(long, value_name = "WxH")]
    window_size: Option<String>,

    /// Minimum outer gaps in pixels.
    #[arg(long)]
    default_gaps: Option<i32>,

    /// Workspace numbers to leave alone, comma separated.
    #[arg(long, value_delimiter = ',')]
    disabled_workspaces: Option<Vec<i32>>,

    /// App ids to ignore, comma separated.
    #[arg(long, value_delimiter = ',')]
    disabled_app_ids: Option<Vec<String>>,

    /// Where monitor physical sizes come from: `wayland` or `fixed`.
    #[arg(long)]
    physical_source: Option<PhysicalSourceKind>,
}

impl Args {
    fn apply(self, config: &mut Config) {
        if let Some(size) = self.window_size {
            config.reflex.window_size = size;
        }
        if let Some(gaps) = self.default_gaps {
            config.reflex.default_gaps = gaps;
        }
        if let Some(workspaces) = self.disabled_workspaces {
            config.reflex.disabled_workspaces = workspaces;
        }
        if let Some(app_ids) = self.disabled_app_ids {
            config.reflex.disabled_app_ids = app_ids;
        }
        if let Some(source) = self.physical_source {
            config.physical_source = source;
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let result = run(Args::parse());
    match &result {
        Ok(()) => {}
        Err(Error::AlreadyRunning(pid)) => info!("server already running (pid {})", pid),
        Err(e) => error!("{}", e),
    }
    std::process::exit(exit_code(&result));
}

fn run(args: Args) -> Result<()> {
    let mut config = Config::load_or_default(args.config.as_deref())?;
    args.apply(&mut config);
    config.validate()?;
    let settings = config.reflex.validate()?;

    let _lock = PidFile::lock(REFLEX_PIDFILE)?;
    let (done_tx, done_rx) = mpsc::channel::<Shutdown>();
    spawn_signal_watcher(done_tx.clone())?;

    let wm = SwayWm::connect()?;
    let source = SwayEventSource::connect()?;
    let outputs = OutputRegistry::new(PhysicalSource::from_config(&config));
    let mut controller = AutotileController::new(wm, outputs, settings);

    let (tx, rx) = mpsc::channel::<WmEvent>();
    spawn_event_source(source, tx, done_tx)?;
    thread::Builder::new()
        .name("autotile".into())
        .spawn(move || {
            for event in rx {
                if let Err(e) = controller.handle(event) {
                    warn!("event skipped: {}", e);
                }
            }
        })?;

    info!("sway-reflex running");
    done_rx
        .recv()
        .unwrap_or(Shutdown::EventsClosed(None))
        .into_result()
}
