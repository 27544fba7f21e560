//! Commands, environment notifications and the events that carry them.
//!
//! [`Command`] is the closed vocabulary of user intents (usually bound to
//! hotkeys).  [`EnvironmentEvent`] describes changes the window system
//! reports on its own.  Both travel to the [`Tiler`](crate::tiler::Tiler)
//! wrapped in an [`Event`], in the order they were produced.
//!
//! Commands arrive as short text tokens, one per line, e.g. `next-layout`
//! or `layout alternating_splits`.  The numbered forms used by older
//! hotkey configurations (`001-next-layout-for-screen`, …) are accepted as
//! aliases.

use crate::layout::Layout;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// One step through an ordered list: towards the end or towards the start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Previous,
    Next,
}

impl Step {
    /// `-1` for [`Step::Previous`], `+1` for [`Step::Next`].
    pub fn offset(self) -> isize {
        match self {
            Step::Previous => -1,
            Step::Next => 1,
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            Step::Previous => Step::Next,
            Step::Next => Step::Previous,
        }
    }
}

/// Every action the tiler can perform on behalf of the user.
///
/// All commands except [`Relayout`](Command::Relayout) act on the display
/// that holds the focused window, and do nothing when no tiled window has
/// focus.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Switch the focused display to the next/previous registered layout.
    CycleLayout(Step),

    /// Switch the focused display to a specific layout.
    SetLayout(Layout),

    /// Swap the focused window with its neighbour in tiling order.
    MoveWindow(Step),

    /// Swap the focused window with the primary (index 0) window.
    SwapPrimary,

    /// Enlarge the primary slot by the configured step.
    GrowPrimary,

    /// Shrink the primary slot by the configured step.
    ShrinkPrimary,

    /// Add an arbitrary delta to the focused display's primary factor.
    AdjustPrimary(f64),

    /// Re-apply the current layouts without changing any setting.
    Relayout,
}

/// Error returned when a token is not part of the command vocabulary.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("unknown command: {0:?}")]
pub struct ParseCommandError(String);

impl FromStr for Command {
    type Err = ParseCommandError;

    /// Parse a command token.  Matching is case-insensitive and ignores
    /// surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unknown = || ParseCommandError(s.trim().to_string());
        let normalized = s.trim().to_ascii_lowercase();
        let mut parts = normalized.split_whitespace();
        let head = parts.next().ok_or_else(unknown)?;
        let arg = parts.next();
        if parts.next().is_some() {
            return Err(unknown());
        }

        let cmd = match (head, arg) {
            ("next-layout" | "001-next-layout-for-screen", None) => Command::CycleLayout(Step::Next),
            ("prev-layout" | "002-prev-layout-for-screen", None) => {
                Command::CycleLayout(Step::Previous)
            }
            ("move-up" | "100-move-up", None) => Command::MoveWindow(Step::Previous),
            ("move-down" | "101-move-down", None) => Command::MoveWindow(Step::Next),
            ("increase-primary" | "200-increase-primary", None) => Command::GrowPrimary,
            ("decrease-primary" | "201-decrease-primary", None) => Command::ShrinkPrimary,
            ("swap-primary" | "900-swap-primary", None) => Command::SwapPrimary,
            ("relayout" | "999-relayout", None) => Command::Relayout,
            ("adjust-primary", Some(delta)) => {
                let delta: f64 = delta.parse().map_err(|_| unknown())?;
                if !delta.is_finite() {
                    return Err(unknown());
                }
                Command::AdjustPrimary(delta)
            }
            ("layout", Some(name)) => Command::SetLayout(Layout::from_name(name).ok_or_else(unknown)?),
            _ => return Err(unknown()),
        };
        Ok(cmd)
    }
}

impl fmt::Display for Command {
    /// The canonical token for this command; parses back to `self`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::CycleLayout(Step::Next) => write!(f, "next-layout"),
            Command::CycleLayout(Step::Previous) => write!(f, "prev-layout"),
            Command::SetLayout(layout) => write!(f, "layout {}", layout.name()),
            Command::MoveWindow(Step::Previous) => write!(f, "move-up"),
            Command::MoveWindow(Step::Next) => write!(f, "move-down"),
            Command::SwapPrimary => write!(f, "swap-primary"),
            Command::GrowPrimary => write!(f, "increase-primary"),
            Command::ShrinkPrimary => write!(f, "decrease-primary"),
            Command::AdjustPrimary(delta) => write!(f, "adjust-primary {}", delta),
            Command::Relayout => write!(f, "relayout"),
        }
    }
}

impl Serialize for Command {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Command {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(DeError::custom)
    }
}

/// A change in the environment that invalidates the current snapshot.
///
/// The tiler does not track these incrementally; any of them simply causes
/// the next refresh to rebuild the window/display assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvironmentEvent {
    /// A display was added, removed or reconfigured.
    DisplayChanged,
    WindowCreated,
    WindowRemoved,
    /// A window changed workspace, display or floating state.
    WindowMoved,
    FocusChanged,
}

impl fmt::Display for EnvironmentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvironmentEvent::DisplayChanged => write!(f, "display changed"),
            EnvironmentEvent::WindowCreated => write!(f, "window created"),
            EnvironmentEvent::WindowRemoved => write!(f, "window removed"),
            EnvironmentEvent::WindowMoved => write!(f, "window moved"),
            EnvironmentEvent::FocusChanged => write!(f, "focus changed"),
        }
    }
}

/// Anything the tiler's event loop can receive.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Command(Command),
    Environment(EnvironmentEvent),
}

impl From<Command> for Event {
    fn from(cmd: Command) -> Self {
        Event::Command(cmd)
    }
}

impl From<EnvironmentEvent> for Event {
    fn from(ev: EnvironmentEvent) -> Self {
        Event::Environment(ev)
    }
}
