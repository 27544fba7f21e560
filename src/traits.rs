//! Core traits that decouple hyprtile from any specific window system or
//! transport mechanism.
//!
//! The [`Tiler`](crate::tiler::Tiler) only depends on these abstractions;
//! concrete implementations live in [`hyprland`](crate::hyprland) and
//! [`ipc`](crate::ipc).

use crate::command::Event;
use crate::geometry::DeviceRect;
use crate::state::{Display, Window, WindowId};
use std::sync::mpsc;

/// The window system the tiler drives.
///
/// Two queries provide fresh snapshots, one effect moves a window.  An
/// implementation might talk to a compositor over IPC, or it might be a
/// recording stub used in tests.
pub trait Environment {
    /// The error type produced by this environment.
    type Error: std::error::Error + Send + 'static;

    /// Return every window the tiler may manage.
    ///
    /// Window kinds that can never be tiled (panels, popups, windows the
    /// compositor arranges itself, …) must already be filtered out.
    /// Minimized, fullscreen and maximized windows may be included; the
    /// tiler skips them.
    fn windows(&self) -> Result<Vec<Window>, Self::Error>;

    /// Return the current displays, with work areas in the same coordinate
    /// space as window positions.
    fn displays(&self) -> Result<Vec<Display>, Self::Error>;

    /// Return windows and displays taken from the same view of the window
    /// system.
    ///
    /// The default queries [`displays`](Environment::displays), then
    /// [`windows`](Environment::windows).  Override it when both share an
    /// underlying query that should run once.
    fn snapshot(&self) -> Result<(Vec<Window>, Vec<Display>), Self::Error> {
        let displays = self.displays()?;
        let windows = self.windows()?;
        Ok((windows, displays))
    }

    /// Move and resize `window` to `rect`.
    ///
    /// The tiler does not wait for or verify the result; a failure is
    /// logged and the next refresh reconciles.
    fn apply_geometry(&self, window: &WindowId, rect: DeviceRect) -> Result<(), Self::Error>;
}

/// A source of [`Event`]s.
///
/// Implementations listen on some transport (a Unix socket, a compositor
/// event stream, an in-memory channel, …) and forward what they receive
/// into the provided [`mpsc::Sender`].  All sources share one channel, so
/// the tiler sees a single, ordered stream.
///
/// # Contract
///
/// * [`run`](EventSource::run) **blocks** until the source is exhausted or
///   an unrecoverable error occurs.
/// * Each received event must be sent through `sink` exactly once.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait EventSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every incoming [`Event`] into `sink`.
    fn run(&mut self, sink: mpsc::Sender<Event>) -> Result<(), Self::Error>;
}
