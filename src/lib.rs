//! **hyprtile**: a layout-driven tiler for floating windows.
//!
//! Every display carries its own layout (equal columns, a primary window
//! beside a stack, alternating splits, …), a primary factor that sizes the
//! primary slot, and an ordered list of the windows it tiles.  Hotkey
//! commands cycle layouts, reorder windows and resize the primary slot on
//! the display holding the focused window; after each command every tiled
//! window is moved to its computed rectangle.
//!
//! # Architecture
//!
//! The core is pure and synchronous:
//!
//! * [`layout`]: strategies mapping a window's tiling index to a rectangle.
//! * [`state`]: window/display snapshots, per-display settings and the
//!   assignment of windows to displays.
//! * [`reducer`]: state transitions for each [`command::Command`].
//!
//! It is wired to the outside world through two traits:
//!
//! * [`traits::Environment`]: queries windows and displays and applies
//!   geometries, so the core is not coupled to any specific compositor.
//! * [`traits::EventSource`]: delivers commands and environment
//!   notifications over some transport into one ordered channel.
//!
//! [`tiler::Tiler`] drives the cycle.  Concrete implementations live in
//! [`hyprland`] (Hyprland IPC) and [`ipc`] (Unix-socket command listener).

pub mod command;
pub mod config;
pub mod geometry;
pub mod hyprland;
pub mod ipc;
pub mod layout;
pub mod reducer;
pub mod state;
pub mod tiler;
pub mod traits;
