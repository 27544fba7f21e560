//! Snapshots of the environment and the tiler's persistent state.
//!
//! [`Window`] and [`Display`] are plain snapshots: the environment produces
//! fresh ones on every refresh and the tiler never mutates them.
//! [`DisplaySettings`] is what the user customises per display (layout,
//! primary factor, window order) and survives across refreshes for as long
//! as the display stays visible.
//!
//! [`AppState`] bundles all of it.  It is a value: every refresh and every
//! command produces a new one instead of mutating the old.

use crate::geometry::Rect;
use crate::layout::{Layout, LayoutParams};
use log::warn;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Primary factor given to displays seen for the first time.
pub const DEFAULT_PRIMARY_FACTOR: f64 = 1.2;

/// Opaque window handle, as reported by the environment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub String);

/// Opaque display handle, as reported by the environment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayId(pub String);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for DisplayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WindowId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&str> for DisplayId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Presentation state of a window.
///
/// Only [`Normal`](WindowState::Normal) windows can be repositioned; the
/// others are left alone and do not count towards any layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WindowState {
    #[default]
    Normal,
    Minimized,
    Fullscreen,
    Maximized,
}

impl WindowState {
    pub fn is_tileable(self) -> bool {
        self == WindowState::Normal
    }
}

/// A window as seen during one refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    pub id: WindowId,
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
    pub focused: bool,
    pub state: WindowState,
}

impl Window {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.top, self.left, self.width, self.height)
    }

    /// A usable snapshot has an id and finite, non-negative geometry.
    pub fn is_well_formed(&self) -> bool {
        !self.id.0.is_empty() && self.bounds().is_well_formed()
    }
}

/// A display and the part of it windows may occupy.
#[derive(Debug, Clone, PartialEq)]
pub struct Display {
    pub id: DisplayId,
    /// Usable area, excluding bars and other reserved regions.
    pub work_area: Rect,
}

impl Display {
    pub fn is_well_formed(&self) -> bool {
        !self.id.0.is_empty()
            && self.work_area.is_well_formed()
            && self.work_area.width > 0.0
            && self.work_area.height > 0.0
    }
}

/// Per-display user settings.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplaySettings {
    pub layout: Layout,
    /// Always positive.
    pub primary_factor: f64,
    /// Reserved; passed to layouts but not interpreted by any of them.
    pub primary_count: usize,
    /// Tiling order.  Each id appears at most once here and in no other
    /// display's order.
    pub window_order: Vec<WindowId>,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            primary_factor: DEFAULT_PRIMARY_FACTOR,
            primary_count: 1,
            window_order: Vec::new(),
        }
    }
}

/// A computed geometry for one window.
#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub window: WindowId,
    pub display: DisplayId,
    pub rect: Rect,
}

/// Everything the tiler knows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    /// Settings of every currently visible display.
    pub display_settings: HashMap<DisplayId, DisplaySettings>,
    /// Tileable windows of the last refresh.
    pub windows_by_id: HashMap<WindowId, Window>,
    /// Displays of the last refresh, in environment order.
    pub displays: Vec<Display>,
}

impl AppState {
    /// Settings of `display`, if it is currently visible.
    pub fn settings(&self, display: &DisplayId) -> Option<&DisplaySettings> {
        self.display_settings.get(display)
    }

    /// A copy of `self` with the settings of `display` replaced.
    pub fn with_settings(&self, display: &DisplayId, settings: DisplaySettings) -> AppState {
        let mut next = self.clone();
        next.display_settings.insert(display.clone(), settings);
        next
    }

    /// Rebuild the state from fresh environment snapshots.
    ///
    /// * Settings of displays that are still present carry over, with
    ///   vanished windows dropped from their order (survivors keep their
    ///   relative order).  New displays start from `template`.
    /// * Each tileable window is assigned to the display whose work area
    ///   contains its top-left corner, or to the first display if none
    ///   does.  Unknown windows are appended to that display's order, and
    ///   the window is removed from every other display's order.
    /// * Malformed or duplicate snapshots are dropped for this refresh.
    pub fn refresh(
        &self,
        windows: Vec<Window>,
        displays: Vec<Display>,
        template: &DisplaySettings,
    ) -> AppState {
        let displays = sanitize_displays(displays);
        let windows = sanitize_windows(windows);

        let live: HashSet<&WindowId> = windows.iter().map(|w| &w.id).collect();
        let mut display_settings: HashMap<DisplayId, DisplaySettings> = displays
            .iter()
            .map(|d| {
                let settings = match self.display_settings.get(&d.id) {
                    Some(prev) => {
                        let mut kept = prev.clone();
                        kept.window_order.retain(|id| live.contains(id));
                        kept
                    }
                    None => DisplaySettings {
                        window_order: Vec::new(),
                        ..template.clone()
                    },
                };
                (d.id.clone(), settings)
            })
            .collect();

        for window in &windows {
            let Some(owner) = locate_window(window, &displays) else {
                continue;
            };
            for (display_id, settings) in display_settings.iter_mut() {
                let order = &mut settings.window_order;
                if *display_id == owner.id {
                    if !order.contains(&window.id) {
                        order.push(window.id.clone());
                    }
                } else {
                    order.retain(|id| *id != window.id);
                }
            }
        }

        let windows_by_id = windows.into_iter().map(|w| (w.id.clone(), w)).collect();

        AppState {
            display_settings,
            windows_by_id,
            displays,
        }
    }

    /// Compute the geometry of every tiled window on every display, using
    /// each display's current layout and settings.
    pub fn arrangement(&self, margin: f64) -> Vec<Placement> {
        let mut placements = Vec::new();
        for display in &self.displays {
            let Some(settings) = self.settings(&display.id) else {
                continue;
            };
            let params = LayoutParams::new(
                settings.window_order.len(),
                margin,
                settings.primary_count,
                settings.primary_factor,
            );
            for (index, id) in settings.window_order.iter().enumerate() {
                placements.push(Placement {
                    window: id.clone(),
                    display: display.id.clone(),
                    rect: settings.layout.place(index, display.work_area, &params),
                });
            }
        }
        placements
    }
}

/// The display owning `window`: the first whose work area contains the
/// window's top-left corner, else the first display.
fn locate_window<'a>(window: &Window, displays: &'a [Display]) -> Option<&'a Display> {
    displays
        .iter()
        .find(|d| d.work_area.contains_point(window.top, window.left))
        .or_else(|| displays.first())
}

fn sanitize_displays(displays: Vec<Display>) -> Vec<Display> {
    let mut seen = HashSet::new();
    displays
        .into_iter()
        .filter(|d| {
            if !d.is_well_formed() {
                warn!("dropping malformed display snapshot {:?}", d);
                return false;
            }
            if !seen.insert(d.id.clone()) {
                warn!("dropping duplicate display {}", d.id);
                return false;
            }
            true
        })
        .collect()
}

fn sanitize_windows(windows: Vec<Window>) -> Vec<Window> {
    let mut seen = HashSet::new();
    windows
        .into_iter()
        .filter(|w| {
            if !w.is_well_formed() {
                warn!("dropping malformed window snapshot {:?}", w);
                return false;
            }
            if !w.state.is_tileable() {
                return false;
            }
            if !seen.insert(w.id.clone()) {
                warn!("dropping duplicate window {}", w.id);
                return false;
            }
            true
        })
        .collect()
}

//  Tests

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use proptest::prelude::*;

    pub(crate) fn window(id: &str, top: f64, left: f64) -> Window {
        Window {
            id: id.into(),
            top,
            left,
            width: 800.0,
            height: 600.0,
            focused: false,
            state: WindowState::Normal,
        }
    }

    pub(crate) fn display(id: &str, left: f64) -> Display {
        Display {
            id: id.into(),
            work_area: Rect::new(0.0, left, 1920.0, 1080.0),
        }
    }

    pub(crate) fn order(state: &AppState, display: &str) -> Vec<String> {
        state
            .settings(&display.into())
            .map(|s| s.window_order.iter().map(|id| id.0.clone()).collect())
            .unwrap_or_default()
    }

    fn refresh(state: &AppState, windows: Vec<Window>, displays: Vec<Display>) -> AppState {
        state.refresh(windows, displays, &DisplaySettings::default())
    }

    #[test]
    fn new_display_gets_defaults() {
        let s = refresh(&AppState::default(), vec![], vec![display("DP-1", 0.0)]);
        let settings = s.settings(&"DP-1".into()).unwrap();
        assert_eq!(settings.layout, Layout::EqualColumns);
        assert_eq!(settings.primary_factor, 1.2);
        assert_eq!(settings.primary_count, 1);
        assert!(settings.window_order.is_empty());
    }

    #[test]
    fn windows_are_assigned_by_top_left_corner() {
        let s = refresh(
            &AppState::default(),
            vec![
                window("a", 10.0, 10.0),
                window("b", 100.0, 2000.0),
                window("c", 0.0, 1920.0),
            ],
            vec![display("DP-1", 0.0), display("DP-2", 1920.0)],
        );
        // "c" sits on the shared edge; the first matching display wins.
        assert_eq!(order(&s, "DP-1"), vec!["a", "c"]);
        assert_eq!(order(&s, "DP-2"), vec!["b"]);
    }

    #[test]
    fn off_screen_window_falls_back_to_first_display() {
        let s = refresh(
            &AppState::default(),
            vec![window("lost", -500.0, -500.0)],
            vec![display("DP-1", 0.0), display("DP-2", 1920.0)],
        );
        assert_eq!(order(&s, "DP-1"), vec!["lost"]);
        assert!(order(&s, "DP-2").is_empty());
    }

    #[test]
    fn known_order_survives_and_new_windows_append() {
        let displays = vec![display("DP-1", 0.0)];
        let first = refresh(
            &AppState::default(),
            vec![window("a", 0.0, 0.0), window("b", 0.0, 0.0), window("c", 0.0, 0.0)],
            displays.clone(),
        );
        let mut reordered = first.settings(&"DP-1".into()).unwrap().clone();
        reordered.window_order.reverse();
        let custom = first.with_settings(&"DP-1".into(), reordered);

        // "b" closed, "d" opened; the environment lists windows in a new order.
        let next = refresh(
            &custom,
            vec![window("d", 0.0, 0.0), window("a", 0.0, 0.0), window("c", 0.0, 0.0)],
            displays,
        );
        assert_eq!(order(&next, "DP-1"), vec!["c", "a", "d"]);
        assert!(!next.windows_by_id.contains_key(&WindowId::from("b")));
    }

    #[test]
    fn customisation_persists_while_display_is_visible() {
        let displays = vec![display("DP-1", 0.0)];
        let s = refresh(&AppState::default(), vec![], displays.clone());
        let mut settings = s.settings(&"DP-1".into()).unwrap().clone();
        settings.layout = Layout::AlternatingSplits;
        settings.primary_factor = 1.5;
        let s = s.with_settings(&"DP-1".into(), settings);

        let s = refresh(&s, vec![window("a", 0.0, 0.0)], displays.clone());
        let kept = s.settings(&"DP-1".into()).unwrap();
        assert_eq!(kept.layout, Layout::AlternatingSplits);
        assert_eq!(kept.primary_factor, 1.5);

        // Once the display disappears its settings are forgotten.
        let gone = refresh(&s, vec![], vec![display("DP-2", 0.0)]);
        let back = refresh(&gone, vec![], displays);
        assert_eq!(back.settings(&"DP-1".into()).unwrap().layout, Layout::EqualColumns);
    }

    #[test]
    fn window_moving_between_displays_is_reassigned() {
        let displays = vec![display("DP-1", 0.0), display("DP-2", 1920.0)];
        let s = refresh(
            &AppState::default(),
            vec![window("a", 0.0, 0.0), window("b", 0.0, 100.0)],
            displays.clone(),
        );
        let s = refresh(
            &s,
            vec![window("a", 0.0, 2500.0), window("b", 0.0, 100.0)],
            displays,
        );
        assert_eq!(order(&s, "DP-1"), vec!["b"]);
        assert_eq!(order(&s, "DP-2"), vec!["a"]);
    }

    #[test]
    fn untileable_windows_are_excluded() {
        let mut min = window("min", 0.0, 0.0);
        min.state = WindowState::Minimized;
        let mut full = window("full", 0.0, 0.0);
        full.state = WindowState::Fullscreen;
        let mut max = window("max", 0.0, 0.0);
        max.state = WindowState::Maximized;
        let s = refresh(
            &AppState::default(),
            vec![min, window("a", 0.0, 0.0), full, max],
            vec![display("DP-1", 0.0)],
        );
        assert_eq!(order(&s, "DP-1"), vec!["a"]);
        assert_eq!(s.windows_by_id.len(), 1);
    }

    #[test]
    fn window_that_becomes_untileable_leaves_the_order() {
        let displays = vec![display("DP-1", 0.0)];
        let s = refresh(
            &AppState::default(),
            vec![window("a", 0.0, 0.0), window("b", 0.0, 0.0)],
            displays.clone(),
        );
        let mut b = window("b", 0.0, 0.0);
        b.state = WindowState::Minimized;
        let s = refresh(&s, vec![window("a", 0.0, 0.0), b], displays);
        assert_eq!(order(&s, "DP-1"), vec!["a"]);
    }

    #[test]
    fn malformed_and_duplicate_snapshots_are_dropped() {
        let mut bad = window("bad", 0.0, 0.0);
        bad.left = f64::NAN;
        let broken_display = Display {
            id: "BROKEN".into(),
            work_area: Rect::new(0.0, 0.0, 0.0, 1080.0),
        };
        let s = refresh(
            &AppState::default(),
            vec![window("a", 0.0, 0.0), bad, window("a", 0.0, 0.0), window("", 0.0, 0.0)],
            vec![broken_display, display("DP-1", 0.0), display("DP-1", 1920.0)],
        );
        assert_eq!(s.displays.len(), 1);
        assert_eq!(s.displays[0].work_area.left, 0.0);
        assert_eq!(order(&s, "DP-1"), vec!["a"]);
        assert!(s.settings(&"BROKEN".into()).is_none());
    }

    #[test]
    fn no_displays_means_no_assignment() {
        let s = refresh(&AppState::default(), vec![window("a", 0.0, 0.0)], vec![]);
        assert!(s.display_settings.is_empty());
        assert_eq!(s.windows_by_id.len(), 1);
        assert!(s.arrangement(15.0).is_empty());
    }

    #[test]
    fn arrangement_covers_every_tiled_window() {
        let s = refresh(
            &AppState::default(),
            vec![window("a", 0.0, 0.0), window("b", 0.0, 0.0), window("c", 0.0, 2000.0)],
            vec![display("DP-1", 0.0), display("DP-2", 1920.0)],
        );
        let placements = s.arrangement(15.0);
        assert_eq!(placements.len(), 3);
        let a = &placements[0];
        assert_eq!(a.window, WindowId::from("a"));
        assert_eq!(a.rect, Rect::new(15.0, 15.0, 937.5, 1050.0));
        let c = placements.iter().find(|p| p.window.0 == "c").unwrap();
        assert_eq!(c.display, DisplayId::from("DP-2"));
        assert_eq!(c.rect, display("DP-2", 1920.0).work_area.deflate(15.0));
    }

    fn arb_windows() -> impl Strategy<Value = Vec<Window>> {
        prop::collection::vec((0u8..16, -200.0f64..4000.0, -200.0f64..1200.0), 0..12).prop_map(
            |raw| {
                raw.into_iter()
                    .map(|(id, left, top)| window(&format!("w{}", id), top, left))
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn refresh_is_idempotent(windows in arb_windows(), second in arb_windows()) {
            let displays = vec![display("DP-1", 0.0), display("DP-2", 1920.0)];
            // Start from a state with some history so carried-over orders are exercised.
            let history = refresh(&AppState::default(), second, displays.clone());
            let once = refresh(&history, windows.clone(), displays.clone());
            let twice = refresh(&once, windows, displays);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn every_window_is_assigned_exactly_once(
            before in arb_windows(),
            after in arb_windows(),
        ) {
            let displays = vec![display("DP-1", 0.0), display("DP-2", 1920.0)];
            let s = refresh(&AppState::default(), before, displays.clone());
            let s = refresh(&s, after, displays);
            for id in s.windows_by_id.keys() {
                let holders = s
                    .display_settings
                    .values()
                    .filter(|ds| ds.window_order.contains(id))
                    .count();
                prop_assert_eq!(holders, 1);
            }
            for ds in s.display_settings.values() {
                for id in &ds.window_order {
                    prop_assert!(s.windows_by_id.contains_key(id));
                }
                let unique: HashSet<_> = ds.window_order.iter().collect();
                prop_assert_eq!(unique.len(), ds.window_order.len());
            }
        }
    }
}
