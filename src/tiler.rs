//! The orchestrator that ties the state, the layout engine and the
//! environment together.
//!
//! [`Tiler`] owns the single [`AppState`].  For every command it refreshes
//! the state from the environment, applies the command through the pure
//! [`reducer`](crate::reducer), and pushes the resulting geometries back to
//! the environment.  It is driven by one thread, one event at a time, so
//! commands never interleave.

use crate::command::{Command, EnvironmentEvent, Event};
use crate::config::TilingConfig;
use crate::reducer;
use crate::state::AppState;
use crate::traits::Environment;
use log::{debug, info, warn};

/// Possible errors from the tiler.
#[derive(Debug, thiserror::Error)]
pub enum TilerError {
    /// The environment could not be queried.
    #[error("environment error: {0}")]
    Environment(String),
}

/// Orchestrates refreshes, state transitions and geometry emission.
///
/// The tiler is generic over any [`Environment`] implementation, making it
/// completely independent of Hyprland or any other concrete backend.
///
/// # Typical usage
///
/// ```ignore
/// let mut tiler = Tiler::new(HyprlandEnv::new(), TilingConfig::default());
/// tiler.refresh()?;
/// tiler.handle(Command::CycleLayout(Step::Next))?;
/// ```
pub struct Tiler<E: Environment> {
    env: E,
    state: AppState,
    config: TilingConfig,
}

impl<E: Environment> Tiler<E> {
    /// Create a tiler with an empty state.  Call [`refresh`](Self::refresh)
    /// to pick up the current windows and displays.
    pub fn new(env: E, config: TilingConfig) -> Self {
        Self {
            env,
            state: AppState::default(),
            config,
        }
    }

    /// The state as of the last processed event.
    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &TilingConfig {
        &self.config
    }

    /// Rebuild the state from fresh window and display snapshots.
    ///
    /// On error the previous state is kept untouched.
    pub fn refresh(&mut self) -> Result<(), TilerError> {
        let (windows, displays) = self
            .env
            .snapshot()
            .map_err(|e| TilerError::Environment(e.to_string()))?;
        debug!(
            "refresh: {} display(s), {} window(s)",
            displays.len(),
            windows.len()
        );
        self.state = self
            .state
            .refresh(windows, displays, &self.config.display_defaults());
        Ok(())
    }

    /// Process a single [`Command`]: refresh, transform, relayout.
    ///
    /// Every command ends with a relayout, even when it changed nothing.
    pub fn handle(&mut self, cmd: Command) -> Result<(), TilerError> {
        info!("command {}", cmd);
        self.refresh()?;
        let next = reducer::reduce(&self.state, &cmd, self.config.primary_factor_step);
        if cmd != Command::Relayout && next == self.state {
            debug!("{} changed nothing", cmd);
        }
        self.state = next;
        self.relayout();
        Ok(())
    }

    /// React to a change reported by the environment.
    ///
    /// Notifications only refresh the state; windows are not moved until
    /// the next command.
    pub fn notify(&mut self, event: EnvironmentEvent) -> Result<(), TilerError> {
        debug!("environment: {}", event);
        self.refresh()
    }

    /// Route an [`Event`] to [`handle`](Self::handle) or
    /// [`notify`](Self::notify).
    pub fn dispatch(&mut self, event: Event) -> Result<(), TilerError> {
        match event {
            Event::Command(cmd) => self.handle(cmd),
            Event::Environment(ev) => self.notify(ev),
        }
    }

    /// Send the geometry of every tiled window to the environment.
    ///
    /// Failures are logged and otherwise ignored.
    fn relayout(&self) {
        for placement in self.state.arrangement(self.config.margin) {
            let rect = placement.rect.to_device();
            debug!(
                "  {} on {} -> {}x{} at ({}, {})",
                placement.window, placement.display, rect.width, rect.height, rect.left, rect.top
            );
            if let Err(e) = self.env.apply_geometry(&placement.window, rect) {
                warn!("could not place window {}: {}", placement.window, e);
            }
        }
    }
}

//  Tests

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Step;
    use crate::geometry::{DeviceRect, Rect};
    use crate::layout::Layout;
    use crate::state::{Display, Window, WindowId, WindowState};
    use std::cell::{Cell, RefCell};

    /// Record-keeping mock environment.  Tests edit `windows` / `displays`
    /// between commands to simulate the outside world changing.
    #[derive(Debug, Default)]
    struct RecorderEnv {
        windows: RefCell<Vec<Window>>,
        displays: RefCell<Vec<Display>>,
        applied: RefCell<Vec<(WindowId, DeviceRect)>>,
        /// Window ids whose `apply_geometry` fails.
        vanished: RefCell<Vec<WindowId>>,
        /// Make the next queries fail.
        offline: Cell<bool>,
    }

    #[derive(Debug, thiserror::Error)]
    #[error("recorder error: {0}")]
    struct RecorderErr(&'static str);

    impl Environment for RecorderEnv {
        type Error = RecorderErr;

        fn windows(&self) -> Result<Vec<Window>, RecorderErr> {
            if self.offline.get() {
                return Err(RecorderErr("offline"));
            }
            Ok(self.windows.borrow().clone())
        }

        fn displays(&self) -> Result<Vec<Display>, RecorderErr> {
            if self.offline.get() {
                return Err(RecorderErr("offline"));
            }
            Ok(self.displays.borrow().clone())
        }

        fn apply_geometry(&self, window: &WindowId, rect: DeviceRect) -> Result<(), RecorderErr> {
            if self.vanished.borrow().contains(window) {
                return Err(RecorderErr("no such window"));
            }
            self.applied.borrow_mut().push((window.clone(), rect));
            Ok(())
        }
    }

    fn win(id: &str, left: f64, focused: bool) -> Window {
        Window {
            id: id.into(),
            top: 0.0,
            left,
            width: 640.0,
            height: 480.0,
            focused,
            state: WindowState::Normal,
        }
    }

    fn full_hd(id: &str, left: f64) -> Display {
        Display {
            id: id.into(),
            work_area: Rect::new(0.0, left, 1920.0, 1080.0),
        }
    }

    fn make_tiler(windows: Vec<Window>) -> Tiler<RecorderEnv> {
        let env = RecorderEnv::default();
        *env.windows.borrow_mut() = windows;
        *env.displays.borrow_mut() = vec![full_hd("DP-1", 0.0)];
        Tiler::new(env, TilingConfig::default())
    }

    fn applied(t: &Tiler<RecorderEnv>) -> Vec<(String, DeviceRect)> {
        t.env
            .applied
            .borrow()
            .iter()
            .map(|(id, r)| (id.0.clone(), *r))
            .collect()
    }

    fn order(t: &Tiler<RecorderEnv>, display: &str) -> Vec<String> {
        t.state()
            .settings(&display.into())
            .map(|s| s.window_order.iter().map(|id| id.0.clone()).collect())
            .unwrap_or_default()
    }

    #[test]
    fn relayout_emits_floored_geometry_for_every_window() {
        let mut t = make_tiler(vec![
            win("a", 0.0, true),
            win("b", 0.0, false),
            win("c", 0.0, false),
        ]);
        t.handle(Command::Relayout).unwrap();
        assert_eq!(
            applied(&t),
            vec![
                ("a".to_string(), DeviceRect { top: 15, left: 15, width: 620, height: 1050 }),
                ("b".to_string(), DeviceRect { top: 15, left: 650, width: 620, height: 1050 }),
                ("c".to_string(), DeviceRect { top: 15, left: 1285, width: 620, height: 1050 }),
            ]
        );
    }

    #[test]
    fn fractional_geometry_is_rounded_down() {
        let mut t = make_tiler(vec![win("a", 0.0, true), win("b", 0.0, false)]);
        t.handle(Command::Relayout).unwrap();
        // (1920 - 45) / 2 = 937.5
        let widths: Vec<i32> = applied(&t).iter().map(|(_, r)| r.width).collect();
        assert_eq!(widths, vec![937, 937]);
        assert_eq!(applied(&t)[1].1.left, 967);
    }

    #[test]
    fn cycle_layout_changes_focused_display_and_relayouts() {
        let mut t = make_tiler(vec![win("a", 0.0, true), win("b", 0.0, false)]);
        t.handle(Command::CycleLayout(Step::Next)).unwrap();
        let settings = t.state().settings(&"DP-1".into()).unwrap();
        assert_eq!(settings.layout, Layout::EqualRows);
        let tops: Vec<i32> = applied(&t).iter().map(|(_, r)| r.top).collect();
        assert_eq!(tops, vec![15, 547]);
    }

    #[test]
    fn settings_persist_across_commands() {
        let mut t = make_tiler(vec![win("a", 0.0, true), win("b", 0.0, false)]);
        t.handle(Command::SetLayout(Layout::LeftPrimaryRightRows)).unwrap();
        t.handle(Command::GrowPrimary).unwrap();
        t.handle(Command::Relayout).unwrap();
        let settings = t.state().settings(&"DP-1".into()).unwrap();
        assert_eq!(settings.layout, Layout::LeftPrimaryRightRows);
        assert!((settings.primary_factor - 1.25).abs() < 1e-9);
    }

    #[test]
    fn swap_primary_reorders_and_moves_windows() {
        let mut t = make_tiler(vec![
            win("a", 0.0, false),
            win("b", 0.0, false),
            win("c", 0.0, true),
            win("d", 0.0, false),
        ]);
        t.handle(Command::SwapPrimary).unwrap();
        assert_eq!(order(&t, "DP-1"), vec!["c", "b", "a", "d"]);
        let first = &applied(&t)[0];
        assert_eq!(first.0, "c");
        assert_eq!(first.1.left, 15);
    }

    #[test]
    fn commands_without_focus_still_relayout() {
        let mut t = make_tiler(vec![win("a", 0.0, false), win("b", 0.0, false)]);
        t.refresh().unwrap();
        let before = t.state().clone();
        t.handle(Command::MoveWindow(Step::Next)).unwrap();
        assert_eq!(t.state(), &before);
        assert_eq!(order(&t, "DP-1"), vec!["a", "b"]);
        assert_eq!(applied(&t).len(), 2);
    }

    #[test]
    fn refresh_before_command_picks_up_new_windows() {
        let mut t = make_tiler(vec![win("a", 0.0, true)]);
        t.refresh().unwrap();
        t.env.windows.borrow_mut().push(win("b", 0.0, false));
        t.handle(Command::Relayout).unwrap();
        assert_eq!(order(&t, "DP-1"), vec!["a", "b"]);
        assert_eq!(applied(&t).len(), 2);
    }

    #[test]
    fn windows_are_tiled_per_display() {
        let mut t = make_tiler(vec![win("a", 0.0, true), win("b", 2000.0, false)]);
        t.env.displays.borrow_mut().push(full_hd("DP-2", 1920.0));
        t.handle(Command::Relayout).unwrap();
        assert_eq!(order(&t, "DP-1"), vec!["a"]);
        assert_eq!(order(&t, "DP-2"), vec!["b"]);
        let b = applied(&t).into_iter().find(|(id, _)| id == "b").unwrap();
        assert_eq!(b.1, DeviceRect { top: 15, left: 1935, width: 1890, height: 1050 });
    }

    #[test]
    fn apply_failure_does_not_fail_the_command() {
        let mut t = make_tiler(vec![win("a", 0.0, true), win("gone", 0.0, false)]);
        t.env.vanished.borrow_mut().push("gone".into());
        assert!(t.handle(Command::Relayout).is_ok());
        let ids: Vec<String> = applied(&t).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[test]
    fn environment_failure_keeps_previous_state() {
        let mut t = make_tiler(vec![win("a", 0.0, true), win("b", 0.0, false)]);
        t.handle(Command::Relayout).unwrap();
        let before = t.state().clone();
        t.env.applied.borrow_mut().clear();
        t.env.offline.set(true);
        assert!(matches!(
            t.handle(Command::CycleLayout(Step::Next)),
            Err(TilerError::Environment(_))
        ));
        assert_eq!(t.state(), &before);
        assert!(applied(&t).is_empty());
    }

    #[test]
    fn notifications_refresh_without_moving_windows() {
        let mut t = make_tiler(vec![win("a", 0.0, true)]);
        t.dispatch(Event::Environment(EnvironmentEvent::WindowCreated))
            .unwrap();
        assert_eq!(order(&t, "DP-1"), vec!["a"]);
        assert!(applied(&t).is_empty());

        t.env.windows.borrow_mut().clear();
        t.dispatch(EnvironmentEvent::WindowRemoved.into()).unwrap();
        assert!(order(&t, "DP-1").is_empty());
        assert!(t.state().windows_by_id.is_empty());
    }

    #[test]
    fn dispatch_routes_commands() {
        let mut t = make_tiler(vec![win("a", 0.0, true)]);
        t.dispatch(Command::Relayout.into()).unwrap();
        assert_eq!(applied(&t).len(), 1);
    }

    #[test]
    fn events_are_processed_in_order() {
        let mut t = make_tiler(vec![
            win("a", 0.0, false),
            win("b", 0.0, true),
            win("c", 0.0, false),
        ]);
        for ev in [
            Event::Command(Command::MoveWindow(Step::Next)),
            Event::Command(Command::SwapPrimary),
            Event::Command(Command::MoveWindow(Step::Next)),
        ] {
            t.dispatch(ev).unwrap();
        }
        // a b c -> a c b -> b c a -> c b a
        assert_eq!(order(&t, "DP-1"), vec!["c", "b", "a"]);
    }
}
