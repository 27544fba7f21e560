//! [`Environment`] implementation backed by Hyprland IPC.
//!
//! Communicates directly with Hyprland through its request socket at
//! `$XDG_RUNTIME_DIR/hypr/$HYPRLAND_INSTANCE_SIGNATURE/.socket.sock`.
//! Every query and every dispatch is one short-lived connection.
//!
//! Only **floating** clients are managed: tiled clients are arranged by
//! Hyprland itself, so they never reach the tiler.

use super::{socket_path, HyprlandError};
use crate::geometry::{DeviceRect, Rect};
use crate::state::{Display, Window, WindowId, WindowState};
use crate::traits::Environment;
use log::{debug, warn};
use serde::Deserialize;
use std::collections::HashSet;
use std::io::{Read, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};

/// Hyprland-backed environment.
///
/// No connection is opened eagerly; each method call opens a short-lived
/// IPC request.
#[derive(Debug, Default)]
pub struct HyprlandEnv {
    /// Explicit request socket.  `None` resolves it from the environment
    /// on every request.
    socket: Option<PathBuf>,
}

impl HyprlandEnv {
    /// Talk to the Hyprland instance of the current session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Talk to the request socket at `path`.
    pub fn with_socket(path: impl AsRef<Path>) -> Self {
        Self {
            socket: Some(path.as_ref().to_path_buf()),
        }
    }

    fn socket(&self) -> Result<PathBuf, HyprlandError> {
        match &self.socket {
            Some(path) => Ok(path.clone()),
            None => socket_path(".socket.sock"),
        }
    }

    /// Send a raw request and return the response as a string.
    fn request(&self, command: &str) -> Result<String, HyprlandError> {
        let path = self.socket()?;
        let mut stream = UnixStream::connect(&path)
            .map_err(|e| HyprlandError(format!("connect to {}: {}", path.display(), e)))?;

        stream
            .write_all(command.as_bytes())
            .map_err(|e| HyprlandError(format!("write: {}", e)))?;

        let mut response = Vec::new();
        stream
            .read_to_end(&mut response)
            .map_err(|e| HyprlandError(format!("read: {}", e)))?;

        String::from_utf8(response).map_err(|e| HyprlandError(format!("utf-8: {}", e)))
    }

    /// Send a JSON data query (`j/<command>`) and return the raw JSON string.
    fn query(&self, data_command: &str) -> Result<String, HyprlandError> {
        self.request(&format!("j/{}", data_command))
    }

    /// Send a dispatch command and check for `"ok"`.
    fn dispatch(&self, args: &str) -> Result<(), HyprlandError> {
        let response = self.request(&format!("/dispatch {}", args))?;
        if response.trim() == "ok" {
            Ok(())
        } else {
            Err(HyprlandError(format!("dispatch error: {}", response)))
        }
    }

    fn monitors(&self) -> Result<Vec<MonitorJson>, HyprlandError> {
        parse_monitors(&self.query("monitors")?)
    }
}

//  Minimal serde structs for the JSON we care about

#[derive(Debug, Deserialize)]
struct WorkspaceRef {
    id: i64,
}

/// Subset of the JSON object returned by `j/monitors`.
#[derive(Debug, Deserialize)]
struct MonitorJson {
    name: String,
    width: u32,
    height: u32,
    x: i32,
    y: i32,
    #[serde(default = "unit_scale")]
    scale: f64,
    #[serde(default)]
    transform: u8,
    /// Space taken by bars and panels: `[left, top, right, bottom]`.
    #[serde(default)]
    reserved: [f64; 4],
    #[serde(rename = "activeWorkspace")]
    active_workspace: WorkspaceRef,
    #[serde(default)]
    disabled: bool,
}

fn unit_scale() -> f64 {
    1.0
}

impl MonitorJson {
    /// The logical rectangle windows may occupy.
    fn work_area(&self) -> Rect {
        let scale = if self.scale > 0.0 { self.scale } else { 1.0 };
        let (mut width, mut height) = (f64::from(self.width), f64::from(self.height));
        // Rotated by 90 or 270 degrees.
        if self.transform % 2 == 1 {
            std::mem::swap(&mut width, &mut height);
        }
        let [left, top, right, bottom] = self.reserved;
        Rect::new(
            f64::from(self.y) + top,
            f64::from(self.x) + left,
            width / scale - left - right,
            height / scale - top - bottom,
        )
    }
}

/// `fullscreen` is a mode number on current Hyprland and a flag on
/// older releases.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FullscreenJson {
    Mode(u8),
    Legacy(bool),
}

impl Default for FullscreenJson {
    fn default() -> Self {
        FullscreenJson::Mode(0)
    }
}

/// Subset of the JSON object returned by `j/clients`.
#[derive(Debug, Deserialize)]
struct ClientJson {
    address: String,
    #[serde(default = "yes")]
    mapped: bool,
    #[serde(default)]
    hidden: bool,
    at: [f64; 2],
    size: [f64; 2],
    workspace: WorkspaceRef,
    #[serde(default)]
    floating: bool,
    #[serde(default)]
    fullscreen: FullscreenJson,
}

fn yes() -> bool {
    true
}

impl ClientJson {
    fn state(&self) -> WindowState {
        if self.hidden {
            return WindowState::Minimized;
        }
        match self.fullscreen {
            FullscreenJson::Mode(0) | FullscreenJson::Legacy(false) => WindowState::Normal,
            FullscreenJson::Mode(1) => WindowState::Maximized,
            FullscreenJson::Mode(_) | FullscreenJson::Legacy(true) => WindowState::Fullscreen,
        }
    }

    fn into_window(self, focused: Option<&str>) -> Window {
        let state = self.state();
        Window {
            focused: focused == Some(self.address.as_str()),
            id: WindowId(self.address),
            top: self.at[1],
            left: self.at[0],
            width: self.size[0],
            height: self.size[1],
            state,
        }
    }
}

/// Subset of the JSON object returned by `j/activewindow`.
///
/// Hyprland returns an empty object `{}` when no window is focused.
#[derive(Debug, Deserialize)]
struct ActiveWindowJson {
    #[serde(default)]
    address: Option<String>,
}

fn parse_monitors(json: &str) -> Result<Vec<MonitorJson>, HyprlandError> {
    serde_json::from_str(json).map_err(|e| HyprlandError(format!("parse monitors: {}", e)))
}

fn parse_displays(monitors: &[MonitorJson]) -> Vec<Display> {
    monitors
        .iter()
        .filter(|m| !m.disabled)
        .map(|m| Display {
            id: m.name.as_str().into(),
            work_area: m.work_area(),
        })
        .collect()
}

/// Workspaces currently shown on some monitor.
fn visible_workspaces(monitors: &[MonitorJson]) -> HashSet<i64> {
    monitors
        .iter()
        .filter(|m| !m.disabled)
        .map(|m| m.active_workspace.id)
        .collect()
}

/// Build the window list from raw `j/clients` and `j/activewindow`
/// responses.
///
/// A client whose JSON does not have the expected shape is skipped on its
/// own; the rest of the list is still returned.
fn parse_windows(
    clients: &str,
    active: &str,
    visible: &HashSet<i64>,
) -> Result<Vec<Window>, HyprlandError> {
    let active: ActiveWindowJson = serde_json::from_str(active)
        .map_err(|e| HyprlandError(format!("parse activewindow: {}", e)))?;
    let raw: Vec<serde_json::Value> = serde_json::from_str(clients)
        .map_err(|e| HyprlandError(format!("parse clients: {}", e)))?;

    let focused = active.address.as_deref();
    Ok(raw
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<ClientJson>(value) {
            Ok(client) => Some(client),
            Err(e) => {
                warn!("skipping malformed client: {}", e);
                None
            }
        })
        .filter(|c| c.mapped && c.floating && visible.contains(&c.workspace.id))
        .map(|c| c.into_window(focused))
        .collect())
}

//  Environment implementation

impl Environment for HyprlandEnv {
    type Error = HyprlandError;

    fn windows(&self) -> Result<Vec<Window>, Self::Error> {
        let monitors = self.monitors()?;
        let clients = self.query("clients")?;
        let active = self.query("activewindow")?;
        parse_windows(&clients, &active, &visible_workspaces(&monitors))
    }

    fn displays(&self) -> Result<Vec<Display>, Self::Error> {
        Ok(parse_displays(&self.monitors()?))
    }

    fn snapshot(&self) -> Result<(Vec<Window>, Vec<Display>), Self::Error> {
        let monitors = self.monitors()?;
        let clients = self.query("clients")?;
        let active = self.query("activewindow")?;
        let windows = parse_windows(&clients, &active, &visible_workspaces(&monitors))?;
        Ok((windows, parse_displays(&monitors)))
    }

    fn apply_geometry(&self, window: &WindowId, rect: DeviceRect) -> Result<(), Self::Error> {
        debug!("placing {} at {:?}", window, rect);
        self.dispatch(&format!(
            "resizewindowpixel exact {} {},address:{}",
            rect.width, rect.height, window
        ))?;
        self.dispatch(&format!(
            "movewindowpixel exact {} {},address:{}",
            rect.left, rect.top, window
        ))
    }
}

//  Tests
