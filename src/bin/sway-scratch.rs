//! **sway-scratch**: physically-sized scratchpads.
//!
//! `sway-scratch serve` runs the daemon; `sway-scratch call <cmd>` asks it
//! to show, hide or spawn the scratchpad for `<cmd>`.

use clap::{Parser, Subcommand};
use log::{error, info, warn};
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use sway_reflex::command::WmEvent;
use sway_reflex::config::{Config, PhysicalSourceKind};
use sway_reflex::daemon::{exit_code, spawn_event_source, spawn_signal_watcher, Shutdown};
use sway_reflex::ipc::listener::UnixSocketListener;
use sway_reflex::ipc::{client, socket_path, SCRATCH_SOCKET};
use sway_reflex::output::{OutputRegistry, PhysicalSource};
use sway_reflex::pidfile::{PidFile, SCRATCH_PIDFILE};
use sway_reflex::scratch::{
    Definition, ScratchpadRegistry, ShellLauncher, ToggleRequest, WireDefinition,
};
use sway_reflex::sway::{SwayEventSource, SwayWm};
use sway_reflex::Result;

#[derive(Debug, Parser)]
#[command(name = "sway-scratch", version)]
struct Cli {
    /// Config file (default: $XDG_CONFIG_HOME/sway-reflex/config.json).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the scratchpad daemon.
    Serve {
        /// Where monitor physical sizes come from: `wayland` or `fixed`.
        #[arg(long)]
        physical_source: Option<PhysicalSourceKind>,
    },
    /// Toggle the scratchpad running `cmd`.
    Call {
        /// Shell command that starts the scratchpad program.
        cmd: String,

        /// Scratchpad id (default: `<cmd>_<position>_<W>x<H>`).
        #[arg(long)]
        id: Option<String>,

        /// `center`, `left` or `right`.
        #[arg(long)]
        position: Option<String>,

        /// Window size in millimeters.
        #[arg(long, value_name = "WxH")]
        window_size: Option<String>,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let result = Config::load_or_default(cli.config.as_deref())
        .map_err(sway_reflex::Error::from)
        .and_then(|config| match cli.command {
            Command::Serve { physical_source } => serve(config, physical_source),
            Command::Call {
                cmd,
                id,
                position,
                window_size,
            } => call(config, cmd, id, position, window_size),
        });

    match &result {
        Ok(()) => {}
        Err(sway_reflex::Error::AlreadyRunning(pid)) => {
            info!("server already running (pid {})", pid)
        }
        Err(e) => error!("{}", e),
    }
    std::process::exit(exit_code(&result));
}

fn serve(mut config: Config, physical_source: Option<PhysicalSourceKind>) -> Result<()> {
    if let Some(source) = physical_source {
        config.physical_source = source;
    }
    config.validate()?;

    let _lock = PidFile::lock(SCRATCH_PIDFILE)?;
    let (done_tx, done_rx) = mpsc::channel::<Shutdown>();
    spawn_signal_watcher(done_tx.clone())?;

    let registry = Arc::new(ScratchpadRegistry::new(
        SwayWm::connect()?,
        OutputRegistry::new(PhysicalSource::from_config(&config)),
        ShellLauncher::default(),
    ));

    // IPC: accept loop -> toggle loop.
    let (request_tx, request_rx) = mpsc::channel::<ToggleRequest>();
    let mut listener = UnixSocketListener::new(socket_path(SCRATCH_SOCKET));
    let stop = listener.stop_handle();
    let listener_thread = thread::Builder::new()
        .name("ipc".into())
        .spawn(move || {
            if let Err(e) = listener.run(request_tx) {
                error!("listener failed: {}", e);
            }
        })?;

    let toggles = Arc::clone(&registry);
    thread::Builder::new()
        .name("toggle".into())
        .spawn(move || {
            for request in request_rx {
                let id = request.id.clone();
                if let Err(e) = toggles.toggle(request) {
                    warn!("toggle {} failed: {}", id, e);
                }
            }
        })?;

    // Window manager events -> placement.  Losing the subscription stops
    // the daemon.
    let (event_tx, event_rx) = mpsc::channel::<WmEvent>();
    spawn_event_source(SwayEventSource::connect()?, event_tx, done_tx)?;

    let events = Arc::clone(&registry);
    thread::Builder::new()
        .name("placement".into())
        .spawn(move || {
            for event in event_rx {
                if let Err(e) = events.handle_event(event) {
                    warn!("event skipped: {}", e);
                }
            }
        })?;

    info!("sway-scratch running");
    let shutdown = done_rx.recv().unwrap_or(Shutdown::EventsClosed(None));

    stop.stop();
    if listener_thread.join().is_err() {
        warn!("listener thread panicked");
    }
    shutdown.into_result()
}

fn call(
    mut config: Config,
    cmd: String,
    id: Option<String>,
    position: Option<String>,
    window_size: Option<String>,
) -> Result<()> {
    if let Some(position) = position {
        config.scratch.position = position;
    }
    if let Some(size) = window_size {
        config.scratch.window_size = size;
    }
    let (position, preference) = config.scratch.validate()?;

    let definition = WireDefinition::new(position, cmd, preference);
    Definition::try_from(&definition)?;

    let request = match id {
        Some(id) => ToggleRequest { id, definition },
        None => ToggleRequest::with_default_id(definition),
    };
    client::send(&socket_path(SCRATCH_SOCKET), &request)?;
    info!("sent toggle for {}", request.id);
    Ok(())
}
