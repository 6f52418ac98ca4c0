//! An in-memory host.
//!
//! `HeadlessSystem` keeps everything a real desktop host would own (windows,
//! the foreground window, presented surfaces, armed timers) in plain
//! collections and runs on a virtual clock. Tests and the demo binary drive
//! it by popping due timers and feeding them back into the controller.

use std::cell::{Cell, RefCell};
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::common::collections::HashMap;
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::host::{
    ForegroundQuery, HostError, HostSurface, Screen, SurfaceId, TextMetrics, TimerId,
    TimerScheduler, WindowEnumerator,
};
use crate::sys::window::{WindowFilter, WindowHandle, WindowInfo};
use crate::ui::surface::{GlyphMask, PixelSurface};

pub const GLYPH_ADVANCE: i32 = 7;
pub const LINE_HEIGHT: i32 = 17;
const MIN_TIMER_PERIOD: Duration = Duration::from_millis(1);

/// What the host currently shows for one surface.
#[derive(Debug, Clone)]
pub struct PresentedSurface {
    pub id: SurfaceId,
    pub size: Size,
    pub origin: Point,
    pub alpha: u8,
    /// Last presented image; `None` until the first update.
    pub pixels: Option<PixelSurface>,
    pub frames: u32,
}

#[derive(Debug, Copy, Clone)]
struct ArmedTimer {
    period: Duration,
    due: Instant,
}

pub struct HeadlessSystem {
    clock: Cell<Instant>,
    work_area: Rect,
    screen: Size,
    cursor: Cell<Point>,
    windows: RefCell<Vec<WindowInfo>>,
    foreground: Cell<Option<WindowHandle>>,
    activations: RefCell<Vec<WindowHandle>>,
    surfaces: RefCell<HashMap<SurfaceId, PresentedSurface>>,
    next_surface: Cell<u64>,
    fail_surfaces: Cell<bool>,
    timers: RefCell<HashMap<TimerId, ArmedTimer>>,
}

impl HeadlessSystem {
    pub fn new(start: Instant, screen: Size, work_area: Rect) -> HeadlessSystem {
        HeadlessSystem {
            clock: Cell::new(start),
            work_area,
            screen,
            cursor: Cell::new(Point::new(screen.width / 2, screen.height / 2)),
            windows: RefCell::default(),
            foreground: Cell::new(None),
            activations: RefCell::default(),
            surfaces: RefCell::default(),
            next_surface: Cell::new(1),
            fail_surfaces: Cell::new(false),
            timers: RefCell::default(),
        }
    }

    /// A 1920×1080 display with a 40px task bar at the bottom.
    pub fn desktop(start: Instant) -> HeadlessSystem {
        HeadlessSystem::new(start, Size::new(1920, 1080), Rect::from_xywh(0, 0, 1920, 1040))
    }

    pub fn now(&self) -> Instant { self.clock.get() }

    pub fn advance(&self, by: Duration) { self.clock.set(self.clock.get() + by); }

    pub fn add_window(&self, window: WindowInfo) { self.windows.borrow_mut().push(window); }

    pub fn close_window(&self, handle: WindowHandle) {
        self.windows.borrow_mut().retain(|w| w.handle != handle);
        if self.foreground.get() == Some(handle) {
            self.foreground.set(None);
        }
    }

    pub fn set_foreground(&self, handle: Option<WindowHandle>) { self.foreground.set(handle); }

    pub fn set_cursor(&self, point: Point) { self.cursor.set(point); }

    /// Makes every following `create_surface` fail.
    pub fn fail_surface_creation(&self, fail: bool) { self.fail_surfaces.set(fail); }

    pub fn activations(&self) -> Vec<WindowHandle> { self.activations.borrow().clone() }

    pub fn surface(&self, id: SurfaceId) -> Option<PresentedSurface> {
        self.surfaces.borrow().get(&id).cloned()
    }

    /// Live surfaces in creation order.
    pub fn surfaces(&self) -> Vec<PresentedSurface> {
        let mut all: Vec<_> = self.surfaces.borrow().values().cloned().collect();
        all.sort_by_key(|s| s.id);
        all
    }

    pub fn is_timer_running(&self, id: TimerId) -> bool { self.timers.borrow().contains_key(&id) }

    /// Earliest timer due at or before `deadline`. The clock jumps to its due
    /// time and the timer is re-armed one period later.
    pub fn pop_due_timer(&self, deadline: Instant) -> Option<TimerId> {
        let mut timers = self.timers.borrow_mut();
        let (id, timer) = timers
            .iter_mut()
            .filter(|(_, t)| t.due <= deadline)
            .min_by_key(|(id, t)| (t.due, **id))?;
        let due = timer.due;
        timer.due = due + timer.period.max(MIN_TIMER_PERIOD);
        let id = *id;
        drop(timers);
        if due > self.clock.get() {
            self.clock.set(due);
        }
        trace!(?id, "timer fired");
        Some(id)
    }
}

impl HostSurface for HeadlessSystem {
    fn create_surface(&self, size: Size) -> Result<SurfaceId, HostError> {
        if self.fail_surfaces.get() || size.is_empty() {
            return Err(HostError::SurfaceCreation {
                width: size.width,
                height: size.height,
            });
        }
        let id = SurfaceId::new(self.next_surface.get());
        self.next_surface.set(id.get() + 1);
        self.surfaces.borrow_mut().insert(
            id,
            PresentedSurface {
                id,
                size,
                origin: Point::ZERO,
                alpha: 0,
                pixels: None,
                frames: 0,
            },
        );
        debug!(?id, ?size, "created surface");
        Ok(id)
    }

    fn update_surface(
        &self,
        id: SurfaceId,
        origin: Point,
        pixels: &PixelSurface,
        alpha: u8,
    ) -> Result<(), HostError> {
        let mut surfaces = self.surfaces.borrow_mut();
        let surface = surfaces.get_mut(&id).ok_or(HostError::UnknownSurface(id))?;
        surface.size = pixels.size();
        surface.origin = origin;
        surface.alpha = alpha;
        surface.pixels = Some(pixels.clone());
        surface.frames += 1;
        Ok(())
    }

    fn move_surface(&self, id: SurfaceId, origin: Point) -> Result<(), HostError> {
        let mut surfaces = self.surfaces.borrow_mut();
        let surface = surfaces.get_mut(&id).ok_or(HostError::UnknownSurface(id))?;
        surface.origin = origin;
        Ok(())
    }

    fn destroy_surface(&self, id: SurfaceId) {
        if self.surfaces.borrow_mut().remove(&id).is_some() {
            debug!(?id, "destroyed surface");
        }
    }
}

impl WindowEnumerator for HeadlessSystem {
    fn visible_windows(&self, filter: &WindowFilter) -> Vec<WindowInfo> {
        self.windows.borrow().iter().filter(|w| filter.admits(w)).cloned().collect()
    }
}

impl ForegroundQuery for HeadlessSystem {
    fn foreground(&self) -> Option<WindowHandle> { self.foreground.get() }

    fn activate(&self, handle: WindowHandle) -> Result<(), HostError> {
        if !self.windows.borrow().iter().any(|w| w.handle == handle) {
            return Err(HostError::InvalidWindow(handle));
        }
        self.foreground.set(Some(handle));
        self.activations.borrow_mut().push(handle);
        Ok(())
    }
}

impl TextMetrics for HeadlessSystem {
    fn measure(&self, text: &str) -> Size {
        Size::new(GLYPH_ADVANCE * text.chars().count() as i32, LINE_HEIGHT)
    }

    /// Box glyphs: every non-space character is a solid 5×11 block.
    fn rasterize(&self, text: &str) -> Option<GlyphMask> {
        let size = self.measure(text);
        if size.is_empty() {
            return None;
        }
        let mut coverage = vec![0u8; (size.width * size.height) as usize];
        for (i, ch) in text.chars().enumerate() {
            if ch.is_whitespace() {
                continue;
            }
            let left = i as i32 * GLYPH_ADVANCE + 1;
            for y in 3..14 {
                for x in left..left + 5 {
                    coverage[(y * size.width + x) as usize] = 255;
                }
            }
        }
        Some(GlyphMask { size, coverage })
    }
}

impl TimerScheduler for HeadlessSystem {
    fn start_timer(&self, id: TimerId, period: Duration) {
        let due = self.clock.get() + period;
        self.timers.borrow_mut().insert(id, ArmedTimer { period, due });
    }

    fn stop_timer(&self, id: TimerId) { self.timers.borrow_mut().remove(&id); }
}

impl Screen for HeadlessSystem {
    fn work_area(&self) -> Rect { self.work_area }

    fn screen_size(&self) -> Size { self.screen }

    fn cursor_position(&self) -> Point { self.cursor.get() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timers_fire_in_due_order_on_virtual_clock() {
        let start = Instant::now();
        let host = HeadlessSystem::desktop(start);
        host.start_timer(TimerId::SwitcherFocusPoll, Duration::from_millis(100));
        host.start_timer(TimerId::SwitcherAnimation, Duration::from_millis(16));
        let deadline = start + Duration::from_millis(40);
        assert_eq!(host.pop_due_timer(deadline), Some(TimerId::SwitcherAnimation));
        assert_eq!(host.now(), start + Duration::from_millis(16));
        assert_eq!(host.pop_due_timer(deadline), Some(TimerId::SwitcherAnimation));
        assert_eq!(host.pop_due_timer(deadline), None);
        host.stop_timer(TimerId::SwitcherAnimation);
        assert!(!host.is_timer_running(TimerId::SwitcherAnimation));
    }

    #[test]
    fn activation_of_closed_window_fails() {
        let host = HeadlessSystem::desktop(Instant::now());
        let handle = WindowHandle::new(4);
        assert_eq!(host.activate(handle), Err(HostError::InvalidWindow(handle)));
        assert!(host.activations().is_empty());
    }

    #[test]
    fn surface_lifecycle() {
        let host = HeadlessSystem::desktop(Instant::now());
        let id = host.create_surface(Size::new(4, 4)).unwrap();
        let pixels = PixelSurface::new(Size::new(4, 4)).unwrap();
        host.update_surface(id, Point::new(3, 5), &pixels, 200).unwrap();
        let shown = host.surface(id).unwrap();
        assert_eq!((shown.origin, shown.alpha, shown.frames), (Point::new(3, 5), 200, 1));
        host.destroy_surface(id);
        assert_eq!(
            host.update_surface(id, Point::ZERO, &pixels, 1),
            Err(HostError::UnknownSurface(id))
        );
        host.fail_surface_creation(true);
        assert!(host.create_surface(Size::new(4, 4)).is_err());
    }

    #[test]
    fn box_glyphs_match_measurement() {
        let host = HeadlessSystem::desktop(Instant::now());
        let mask = host.rasterize("ab").unwrap();
        assert_eq!(mask.size, host.measure("ab"));
        assert_eq!(mask.coverage_at(1, 3), 255);
        assert_eq!(mask.coverage_at(0, 3), 0);
        assert!(host.rasterize("").is_none());
    }
}
