//! The window switcher panel.
//!
//! A session lives from a `Toggle` until its fade-out finishes (or until
//! shutdown). While it lives it owns exactly one host surface; while there is
//! no session the switcher holds no surface and runs no timers.

use std::time::Instant;

use thiserror::Error;
use tracing::{debug, instrument, trace, warn};

use crate::common::config::SwitcherSettings;
use crate::layout_engine::chips::{self, PanelLayout};
use crate::layout_engine::graph::Direction;
use crate::model::focus;
use crate::model::session::{AnimState, SwitcherSession, TrackedItem};
use crate::sys::geometry::Rect;
use crate::sys::host::{HostError, System, TimerId};
use crate::sys::window::{WindowFilter, WindowHandle, WindowInfo};
use crate::ui::animation::{self, AnimationClock};
use crate::ui::surface::{PixelSurface, SurfaceError};
use crate::ui::switcher::{self as painter, ChipPaint, PanelStyle};

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Re-enumerate and replay the intro. `indicator` is where the status
    /// badge currently sits, if it is shown.
    Toggle { indicator: Option<Rect> },
    Move(Direction),
    Hide,
    AnimationTick,
    FocusTick,
    Shutdown,
}

#[derive(Debug, Error)]
enum SessionError {
    #[error(transparent)]
    Surface(#[from] SurfaceError),
    #[error(transparent)]
    Host(#[from] HostError),
}

pub struct Switcher {
    settings: SwitcherSettings,
    filter: WindowFilter,
    session: Option<SwitcherSession>,
}

impl Switcher {
    pub fn new(settings: SwitcherSettings, filter: WindowFilter) -> Self {
        Self { settings, filter, session: None }
    }

    pub fn state(&self) -> AnimState {
        self.session.as_ref().map_or(AnimState::Idle, |s| s.state)
    }

    pub fn cursor(&self) -> Option<usize> { self.session.as_ref().and_then(|s| s.cursor()) }

    pub fn session(&self) -> Option<&SwitcherSession> { self.session.as_ref() }

    pub fn labels(&self) -> Vec<&str> {
        self.session
            .iter()
            .flat_map(|s| s.items.iter().map(|item| item.label.as_str()))
            .collect()
    }

    /// Returns the window that was activated, if any.
    #[instrument(skip(self, sys))]
    pub fn handle_event<S: System>(
        &mut self,
        sys: &S,
        event: Event,
        now: Instant,
    ) -> Option<WindowHandle> {
        match event {
            Event::Toggle { indicator } => self.toggle(sys, indicator, now),
            Event::Move(direction) => return self.move_cursor(sys, direction, now),
            Event::Hide => self.hide(sys, now),
            Event::AnimationTick => self.on_animation_tick(sys, now),
            Event::FocusTick => self.on_focus_tick(sys),
            Event::Shutdown => self.teardown(sys),
        }
        None
    }

    fn toggle<S: System>(&mut self, sys: &S, indicator: Option<Rect>, now: Instant) {
        let windows = sys.visible_windows(&self.filter);
        if windows.is_empty() {
            debug!("no switchable windows");
            self.teardown(sys);
            return;
        }
        let mut session = match self.build_session(sys, &windows, indicator, now) {
            Ok(session) => session,
            Err(err) => {
                warn!(%err, "switcher: could not open panel");
                return;
            }
        };
        // Replaces whatever was there, including a session mid-fade.
        self.teardown(sys);
        session.set_cursor(focus::reconcile(sys.foreground(), session.handles()));
        debug!(items = session.items.len(), cursor = ?session.cursor(), "switcher intro");
        self.paint(&mut session, Some(0.0));
        self.present(sys, &session, self.settings.slide_distance, self.settings.panel_alpha);
        sys.start_timer(TimerId::SwitcherAnimation, self.settings.frame_interval());
        sys.start_timer(TimerId::SwitcherFocusPoll, self.settings.focus_poll());
        self.session = Some(session);
    }

    fn build_session<S: System>(
        &self,
        sys: &S,
        windows: &[WindowInfo],
        indicator: Option<Rect>,
        now: Instant,
    ) -> Result<SwitcherSession, SessionError> {
        let labels = chips::prepare_labels(
            windows.iter().map(WindowInfo::display_label),
            self.settings.max_label_chars,
        );
        let sizes: Vec<_> = labels.iter().map(|label| sys.measure(label)).collect();
        let metrics = self.settings.metrics();
        let layout = chips::layout_chips(&sizes, &metrics);
        let items = windows
            .iter()
            .zip(labels)
            .zip(&layout.chips)
            .map(|((window, label), chip)| TrackedItem {
                handle: window.handle,
                glyphs: sys.rasterize(&label),
                label,
                width: chip.width,
                x: chip.x,
            })
            .collect();
        let origin = chips::anchor_panel(
            layout.size,
            indicator,
            sys.work_area(),
            self.settings.gap,
            self.settings.fallback_offset(),
        );
        let pixels = PixelSurface::new(layout.size)?;
        let surface = sys.create_surface(layout.size)?;
        Ok(SwitcherSession::new(items, None, layout, origin, pixels, surface, now))
    }

    fn move_cursor<S: System>(
        &mut self,
        sys: &S,
        direction: Direction,
        now: Instant,
    ) -> Option<WindowHandle> {
        let session = self.session.as_mut().filter(|s| !s.items.is_empty())?;
        if session.state == AnimState::FadeOut {
            debug!("move cancels fade-out");
            sys.stop_timer(TimerId::SwitcherAnimation);
            session.enter(AnimState::Visible, now);
            sys.start_timer(TimerId::SwitcherFocusPoll, self.settings.focus_poll());
        }
        let cursor = direction.step_from(session.cursor(), session.items.len());
        session.set_cursor(cursor);
        let target = session.items[cursor?].handle;
        if session.state == AnimState::Visible {
            self.repaint_steady(sys);
        }
        match sys.activate(target) {
            Ok(()) => Some(target),
            Err(HostError::InvalidWindow(handle)) => {
                debug!(?handle, "target window went away");
                None
            }
            Err(err) => {
                warn!(%err, "switcher: activation failed");
                None
            }
        }
    }

    fn hide<S: System>(&mut self, sys: &S, now: Instant) {
        let Some(state) = self.session.as_ref().map(|s| s.state) else {
            return;
        };
        if state == AnimState::FadeOut {
            return;
        }
        sys.stop_timer(TimerId::SwitcherFocusPoll);
        self.repaint_steady(sys);
        if let Some(session) = self.session.as_mut() {
            session.enter(AnimState::FadeOut, now);
        }
        sys.start_timer(TimerId::SwitcherAnimation, self.settings.frame_interval());
        debug!("switcher fade-out");
    }

    fn on_animation_tick<S: System>(&mut self, sys: &S, now: Instant) {
        let Some(session) = self.session.as_ref() else {
            sys.stop_timer(TimerId::SwitcherAnimation);
            return;
        };
        match session.state {
            AnimState::Intro => {
                let total = self.settings.stagger().total(session.items.len());
                let g = AnimationClock::new(session.entered_at, total).progress(now);
                if g >= 1.0 {
                    sys.stop_timer(TimerId::SwitcherAnimation);
                    if let Some(session) = self.session.as_mut() {
                        session.enter(AnimState::Visible, now);
                    }
                    self.repaint_steady(sys);
                    debug!("switcher visible");
                    return;
                }
                let slide = animation::slide_offset(g, self.settings.slide_distance);
                let Some(mut session) = self.session.take() else {
                    return;
                };
                self.paint(&mut session, Some(g));
                self.present(sys, &session, slide, self.settings.panel_alpha);
                self.session = Some(session);
            }
            AnimState::FadeOut => {
                let f = AnimationClock::new(session.entered_at, self.settings.fade_out())
                    .progress(now);
                if f >= 1.0 {
                    self.teardown(sys);
                    return;
                }
                let alpha = animation::fade_out_alpha(f) * f32::from(self.settings.panel_alpha);
                trace!(f, alpha, "switcher fade frame");
                self.present(sys, session, 0, alpha as u8);
            }
            AnimState::Visible | AnimState::Idle => sys.stop_timer(TimerId::SwitcherAnimation),
        }
    }

    fn on_focus_tick<S: System>(&mut self, sys: &S) {
        let Some(session) = self.session.as_mut() else {
            sys.stop_timer(TimerId::SwitcherFocusPoll);
            return;
        };
        if session.state == AnimState::FadeOut {
            return;
        }
        let found = focus::reconcile(sys.foreground(), session.handles());
        if found == session.cursor() {
            return;
        }
        trace!(from = ?session.cursor(), to = ?found, "foreground changed");
        session.set_cursor(found);
        // During the intro the next animation frame picks the cursor up.
        if session.state == AnimState::Visible {
            self.repaint_steady(sys);
        }
    }

    /// Repaints every chip fully revealed and presents it at rest.
    fn repaint_steady<S: System>(&mut self, sys: &S) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        self.paint(&mut session, None);
        self.present(sys, &session, 0, self.settings.panel_alpha);
        self.session = Some(session);
    }

    /// `progress` is the intro's global progress, or `None` for a fully
    /// revealed panel.
    fn paint(&self, session: &mut SwitcherSession, progress: Option<f32>) {
        let style = self.style();
        let timing = self.settings.stagger();
        let count = session.items.len();
        let cursor = session.cursor();
        let (items, layout, pixels) = (&session.items, &session.layout, &mut session.pixels);
        let chips = items.iter().enumerate().filter_map(|(i, item)| {
            let frame = chip_frame(layout, i, &self.settings)?;
            Some(ChipPaint {
                frame,
                glyphs: item.glyphs.as_ref(),
                reveal: progress.map_or(1.0, |g| timing.reveal(i, count, g)),
                selected: cursor == Some(i),
            })
        });
        painter::paint_panel(pixels, &style, chips);
    }

    fn present<S: System>(&self, sys: &S, session: &SwitcherSession, slide: i32, alpha: u8) {
        let origin = session.origin.offset(0, slide);
        if let Err(err) = sys.update_surface(session.surface, origin, &session.pixels, alpha) {
            warn!(%err, "switcher: dropped frame");
        }
    }

    fn teardown<S: System>(&mut self, sys: &S) {
        sys.stop_timer(TimerId::SwitcherAnimation);
        sys.stop_timer(TimerId::SwitcherFocusPoll);
        if let Some(session) = self.session.take() {
            sys.destroy_surface(session.surface);
            debug!("switcher idle");
        }
    }

    fn style(&self) -> PanelStyle {
        PanelStyle {
            background: self.settings.background,
            chip: self.settings.chip,
            selected: self.settings.selected,
            text: self.settings.text,
        }
    }
}

fn chip_frame(layout: &PanelLayout, index: usize, settings: &SwitcherSettings) -> Option<Rect> {
    layout.chip_rect(index, &settings.metrics())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::sys::headless::HeadlessSystem;
    use crate::sys::host::Screen;

    fn host_with(n: u64) -> HeadlessSystem {
        let host = HeadlessSystem::desktop(Instant::now());
        for i in 1..=n {
            host.add_window(WindowInfo {
                handle: WindowHandle::new(i),
                title: format!("window {i}"),
                class_name: "App".into(),
                process_name: Some(format!("app{i}.exe")),
            });
        }
        host
    }

    fn switcher() -> Switcher {
        Switcher::new(SwitcherSettings::default(), WindowFilter::default())
    }

    fn after(host: &HeadlessSystem, ms: u64) -> Instant {
        host.advance(Duration::from_millis(ms));
        host.now()
    }

    #[test]
    fn toggle_starts_intro_on_foreground_window() {
        let host = host_with(3);
        host.set_foreground(Some(WindowHandle::new(2)));
        let mut sw = switcher();
        sw.handle_event(&host, Event::Toggle { indicator: None }, host.now());
        assert_eq!(sw.state(), AnimState::Intro);
        assert_eq!(sw.cursor(), Some(1));
        assert!(host.is_timer_running(TimerId::SwitcherAnimation));
        assert!(host.is_timer_running(TimerId::SwitcherFocusPoll));
        assert_eq!(host.surfaces().len(), 1);
    }

    #[test]
    fn intro_settles_to_visible() {
        let host = host_with(3);
        let mut sw = switcher();
        sw.handle_event(&host, Event::Toggle { indicator: None }, host.now());
        let now = after(&host, 300);
        sw.handle_event(&host, Event::AnimationTick, now);
        assert_eq!(sw.state(), AnimState::Intro);
        let now = after(&host, 300);
        sw.handle_event(&host, Event::AnimationTick, now);
        assert_eq!(sw.state(), AnimState::Visible);
        assert!(!host.is_timer_running(TimerId::SwitcherAnimation));
        let shown = &host.surfaces()[0];
        assert_eq!(shown.alpha, 230);
        assert_eq!(shown.origin.y, host.work_area().bottom() - shown.size.height - 8);
    }

    #[test]
    fn cursor_wraps_both_ways() {
        let host = host_with(3);
        host.set_foreground(Some(WindowHandle::new(1)));
        let mut sw = switcher();
        sw.handle_event(&host, Event::Toggle { indicator: None }, host.now());
        let activated = sw.handle_event(&host, Event::Move(Direction::Left), host.now());
        assert_eq!(sw.cursor(), Some(2));
        assert_eq!(activated, Some(WindowHandle::new(3)));
        sw.handle_event(&host, Event::Move(Direction::Right), host.now());
        assert_eq!(sw.cursor(), Some(0));
    }

    #[test]
    fn move_to_closed_window_is_a_quiet_no_op() {
        let host = host_with(2);
        let mut sw = switcher();
        sw.handle_event(&host, Event::Toggle { indicator: None }, host.now());
        host.close_window(WindowHandle::new(1));
        let activated = sw.handle_event(&host, Event::Move(Direction::Right), host.now());
        assert_eq!(activated, None);
        assert_eq!(sw.cursor(), Some(0));
        assert!(host.activations().is_empty());
    }

    #[test]
    fn hide_fades_out_then_releases_surface() {
        let host = host_with(2);
        let mut sw = switcher();
        sw.handle_event(&host, Event::Toggle { indicator: None }, host.now());
        sw.handle_event(&host, Event::Hide, host.now());
        assert_eq!(sw.state(), AnimState::FadeOut);
        assert!(!host.is_timer_running(TimerId::SwitcherFocusPoll));
        // A second hide does not restart the fade.
        let now = after(&host, 150);
        sw.handle_event(&host, Event::Hide, now);
        sw.handle_event(&host, Event::AnimationTick, now);
        assert_eq!(host.surfaces()[0].alpha, (0.75 * 230.0) as u8);
        let now = after(&host, 150);
        sw.handle_event(&host, Event::AnimationTick, now);
        assert_eq!(sw.state(), AnimState::Idle);
        assert!(host.surfaces().is_empty());
        assert!(!host.is_timer_running(TimerId::SwitcherAnimation));
    }

    #[test]
    fn focus_poll_follows_foreground_and_clears_on_unknown() {
        let host = host_with(3);
        let mut sw = switcher();
        sw.handle_event(&host, Event::Toggle { indicator: None }, host.now());
        host.set_foreground(Some(WindowHandle::new(3)));
        sw.handle_event(&host, Event::FocusTick, host.now());
        assert_eq!(sw.cursor(), Some(2));
        host.set_foreground(Some(WindowHandle::new(42)));
        sw.handle_event(&host, Event::FocusTick, host.now());
        assert_eq!(sw.cursor(), None);
    }

    #[test]
    fn focus_poll_is_ignored_while_fading() {
        let host = host_with(3);
        let mut sw = switcher();
        sw.handle_event(&host, Event::Toggle { indicator: None }, host.now());
        sw.handle_event(&host, Event::Hide, host.now());
        host.set_foreground(Some(WindowHandle::new(3)));
        sw.handle_event(&host, Event::FocusTick, host.now());
        assert_eq!(sw.cursor(), None);
    }

    #[test]
    fn anchors_beside_indicator() {
        let host = host_with(1);
        let mut sw = switcher();
        let indicator = Rect::from_xywh(8, 1000, 32, 32);
        sw.handle_event(&host, Event::Toggle { indicator: Some(indicator) }, host.now());
        let session = sw.session().unwrap();
        assert_eq!(session.origin.x, 46);
        assert_eq!(session.origin.y, 1016 - session.layout.size.height / 2);
    }
}
