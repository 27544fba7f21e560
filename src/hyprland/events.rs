//! Translates Hyprland's event stream into [`EnvironmentEvent`]s.
//!
//! Hyprland broadcasts what happens on its event socket (`socket2`) as
//! `EVENT>>DATA\n` lines.  Only the events that can change what the tiler
//! manages are forwarded:
//!
//! | Event                               | Forwarded as     |
//! |-------------------------------------|------------------|
//! | `openwindow`                        | `WindowCreated`  |
//! | `closewindow`                       | `WindowRemoved`  |
//! | `activewindowv2`                    | `FocusChanged`   |
//! | `monitoradded`, `monitorremoved`    | `DisplayChanged` |
//! | `movewindow`, `changefloatingmode`  | `WindowMoved`    |
//!
//! The payload is ignored: the tiler answers every notification with a
//! full refresh.

use super::{socket_path, HyprlandError};
use crate::command::{EnvironmentEvent, Event};
use crate::traits::EventSource;
use log::{debug, error, info, warn};
use std::io::{BufRead, BufReader};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// An [`EventSource`] that listens to Hyprland's event socket.
#[derive(Debug, Default)]
pub struct HyprlandEventSource {
    /// Explicit event socket.  `None` resolves it from the environment.
    socket: Option<PathBuf>,
}

impl HyprlandEventSource {
    /// Listen to the Hyprland instance of the current session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Listen on the event socket at `path`.
    pub fn with_socket(path: impl AsRef<Path>) -> Self {
        Self {
            socket: Some(path.as_ref().to_path_buf()),
        }
    }
}

/// Parse a single event line from socket2.
///
/// Lines have the form `EVENT>>DATA\n`.
fn parse_event_line(line: &str) -> Option<(&str, &str)> {
    let sep = line.find(">>")?;
    Some((&line[..sep], &line[sep + 2..]))
}

/// The notification a Hyprland event maps to, if the tiler cares about it.
fn environment_event(event: &str) -> Option<EnvironmentEvent> {
    match event {
        "openwindow" => Some(EnvironmentEvent::WindowCreated),
        "closewindow" => Some(EnvironmentEvent::WindowRemoved),
        "activewindowv2" => Some(EnvironmentEvent::FocusChanged),
        "monitoradded" | "monitorremoved" => Some(EnvironmentEvent::DisplayChanged),
        "movewindow" | "changefloatingmode" => Some(EnvironmentEvent::WindowMoved),
        _ => None,
    }
}

impl EventSource for HyprlandEventSource {
    type Error = HyprlandError;

    /// Connect to Hyprland's event socket and forward notifications.
    ///
    /// This method **blocks** until the socket is closed or the sink is
    /// dropped.  Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Event>) -> Result<(), Self::Error> {
        let path = match &self.socket {
            Some(path) => path.clone(),
            None => socket_path(".socket2.sock")?,
        };
        let stream = UnixStream::connect(&path)
            .map_err(|e| HyprlandError(format!("connect to {}: {}", path.display(), e)))?;
        info!("event source connected to {}", path.display());

        for line in BufReader::new(stream).lines() {
            match line {
                Ok(line) if line.is_empty() => continue,
                Ok(line) => {
                    let Some((event, data)) = parse_event_line(&line) else {
                        debug!("ignoring malformed event line {:?}", line);
                        continue;
                    };
                    let Some(ev) = environment_event(event) else {
                        continue;
                    };
                    debug!("{}>>{} -> {}", event, data, ev);
                    if sink.send(ev.into()).is_err() {
                        info!("sink closed, shutting down");
                        return Ok(());
                    }
                }
                Err(e) => {
                    error!("socket2 read error: {}", e);
                    return Err(HyprlandError(format!("read error: {}", e)));
                }
            }
        }

        warn!("socket2 stream ended");
        Ok(())
    }
}

//  Tests
