//! Entry point for the **hyprtile** daemon.
//!
//! Spawns the command listener and the Hyprland event source on background
//! threads and processes incoming events on the main thread, one at a time.
//!
//! `hyprtile --list-layouts` prints the available layouts and exits.

use hyprtile::command::Event;
use hyprtile::config::Config;
use hyprtile::hyprland::{HyprlandEnv, HyprlandEventSource};
use hyprtile::ipc::UnixSocketListener;
use hyprtile::layout::Layout;
use hyprtile::tiler::Tiler;
use hyprtile::traits::{Environment, EventSource};
use log::{error, info};
use std::sync::mpsc;

/// Default socket path for the command listener.
fn default_socket_path() -> String {
    let runtime = std::env::var("XDG_RUNTIME_DIR").unwrap_or_else(|_| "/tmp".into());
    format!("{}/hyprtile.sock", runtime)
}

/// Resolve the config directory (`$XDG_CONFIG_HOME/hyprtile`).
fn config_dir() -> std::path::PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!("{}/.config", home)
    });
    std::path::PathBuf::from(base).join("hyprtile")
}

/// Try to load the config from `$XDG_CONFIG_HOME/hyprtile/config.json`,
/// falling back to compiled-in defaults.
fn load_config() -> Config {
    let path = config_dir().join("config.json");
    if !path.exists() {
        info!("no config file at {}, using defaults", path.display());
        return Config::default();
    }
    match Config::load(&path) {
        Ok(cfg) => {
            info!("loaded config from {}", path.display());
            cfg
        }
        Err(e) => {
            error!("{}, using defaults", e);
            Config::default()
        }
    }
}

//  Main

fn main() {
    env_logger::init();

    if std::env::args().any(|a| a == "--list-layouts") {
        list_layouts();
    } else {
        run_daemon();
    }
}

fn list_layouts() {
    for layout in Layout::ALL {
        println!("{:<26} {}", layout.name(), layout.title());
        println!("{:<26} {}", "", layout.description());
    }
}

/// Normal daemon mode.
fn run_daemon() {
    let config = load_config();

    let mut tiler = Tiler::new(HyprlandEnv::new(), config.tiling.clone());
    if let Err(e) = tiler.refresh() {
        error!("failed to query Hyprland: {}", e);
        std::process::exit(1);
    }
    info!(
        "found {} display(s), {} window(s)",
        tiler.state().displays.len(),
        tiler.state().windows_by_id.len()
    );

    let (tx, rx) = mpsc::channel::<Event>();
    let socket = config.socket_path.clone().unwrap_or_else(default_socket_path);
    spawn_event_sources(tx, socket);

    run_event_loop(tiler, rx);
}

//  Event loop

fn run_event_loop<E: Environment>(mut tiler: Tiler<E>, rx: mpsc::Receiver<Event>) {
    info!("hyprtile running");
    for event in rx {
        if let Err(e) = tiler.dispatch(event) {
            error!("event error: {}", e);
        }
    }
    info!("all event sources closed, exiting");
}

//  Helpers

fn spawn_event_sources(tx: mpsc::Sender<Event>, socket: String) {
    {
        let tx = tx.clone();
        std::thread::spawn(move || {
            let mut source = UnixSocketListener::new(&socket);
            if let Err(e) = source.run(tx) {
                error!("socket listener error: {}", e);
            }
        });
    }

    {
        let tx = tx.clone();
        std::thread::spawn(move || {
            let mut source = HyprlandEventSource::new();
            if let Err(e) = source.run(tx) {
                error!("hyprland event source error: {}", e);
            }
        });
    }

    drop(tx);
}
