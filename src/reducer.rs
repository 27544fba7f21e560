//! Pure state transitions for user commands.
//!
//! Every function here takes the current [`AppState`] and returns the next
//! one.  They act on the display holding the focused window; when no tiled
//! window is focused, or when the command cannot apply (e.g. moving the
//! last window further down), they return an unchanged copy of the input.

use crate::command::{Command, Step};
use crate::layout::Layout;
use crate::state::{AppState, DisplayId, DisplaySettings};

/// Lower bound of the primary factor.
pub const MIN_PRIMARY_FACTOR: f64 = 0.1;
/// Upper bound of the primary factor.  At 2.0 and beyond, the half-split
/// layouts would push the primary slot past its display's edge.
pub const MAX_PRIMARY_FACTOR: f64 = 1.9;

/// Where the focused window sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FocusedSlot {
    pub display: DisplayId,
    /// Tiling index of the focused window on that display.
    pub position: usize,
}

/// Find the focused window's display and position.
///
/// Displays are searched in environment order and positions in tiling
/// order; the first focused window wins.
pub fn focused_slot(state: &AppState) -> Option<FocusedSlot> {
    state.displays.iter().find_map(|display| {
        let settings = state.settings(&display.id)?;
        settings
            .window_order
            .iter()
            .position(|id| state.windows_by_id.get(id).is_some_and(|w| w.focused))
            .map(|position| FocusedSlot {
                display: display.id.clone(),
                position,
            })
    })
}

/// Apply `update` to the focused display's settings.  `update` returns
/// `None` when it has nothing to change.
fn update_focused<F>(state: &AppState, update: F) -> AppState
where
    F: FnOnce(&DisplaySettings, usize) -> Option<DisplaySettings>,
{
    let Some(slot) = focused_slot(state) else {
        return state.clone();
    };
    let Some(settings) = state.settings(&slot.display) else {
        return state.clone();
    };
    match update(settings, slot.position) {
        Some(next) => state.with_settings(&slot.display, next),
        None => state.clone(),
    }
}

/// Advance the focused display to the next or previous registered layout.
pub fn cycle_layout(state: &AppState, step: Step) -> AppState {
    update_focused(state, |settings, _| {
        Some(DisplaySettings {
            layout: settings.layout.cycle(step),
            ..settings.clone()
        })
    })
}

/// Select a specific layout on the focused display.
pub fn set_layout(state: &AppState, layout: Layout) -> AppState {
    update_focused(state, |settings, _| {
        Some(DisplaySettings {
            layout,
            ..settings.clone()
        })
    })
}

/// Swap the focused window with its neighbour in tiling order.
pub fn move_window(state: &AppState, step: Step) -> AppState {
    update_focused(state, |settings, position| {
        let target = position.checked_add_signed(step.offset())?;
        if target >= settings.window_order.len() {
            return None;
        }
        let mut next = settings.clone();
        next.window_order.swap(position, target);
        Some(next)
    })
}

/// Swap the focused window with the window in the primary slot.
pub fn swap_to_primary(state: &AppState) -> AppState {
    update_focused(state, |settings, position| {
        if position == 0 {
            return None;
        }
        let mut next = settings.clone();
        next.window_order.swap(0, position);
        Some(next)
    })
}

/// Add `delta` to the focused display's primary factor.
///
/// The result saturates at [`MIN_PRIMARY_FACTOR`] and
/// [`MAX_PRIMARY_FACTOR`].
pub fn adjust_primary_factor(state: &AppState, delta: f64) -> AppState {
    if !delta.is_finite() {
        return state.clone();
    }
    update_focused(state, |settings, _| {
        Some(DisplaySettings {
            primary_factor: (settings.primary_factor + delta)
                .clamp(MIN_PRIMARY_FACTOR, MAX_PRIMARY_FACTOR),
            ..settings.clone()
        })
    })
}

/// Apply `cmd` to `state`.
///
/// `factor_step` is the delta used by [`Command::GrowPrimary`] and
/// [`Command::ShrinkPrimary`].
pub fn reduce(state: &AppState, cmd: &Command, factor_step: f64) -> AppState {
    match cmd {
        Command::CycleLayout(step) => cycle_layout(state, *step),
        Command::SetLayout(layout) => set_layout(state, *layout),
        Command::MoveWindow(step) => move_window(state, *step),
        Command::SwapPrimary => swap_to_primary(state),
        Command::GrowPrimary => adjust_primary_factor(state, factor_step),
        Command::ShrinkPrimary => adjust_primary_factor(state, -factor_step),
        Command::AdjustPrimary(delta) => adjust_primary_factor(state, *delta),
        Command::Relayout => state.clone(),
    }
}

//  Tests
