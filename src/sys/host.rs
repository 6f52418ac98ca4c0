//! Host collaborator contracts.
//!
//! The widgets never talk to the windowing system directly. Everything they
//! need (layered surfaces, window enumeration, foreground control, text
//! metrics, timers, screen geometry) goes through these traits so the state
//! machines can run against [`crate::sys::headless::HeadlessSystem`] in tests
//! and in the demo binary.

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::window::{WindowFilter, WindowHandle, WindowInfo};
use crate::ui::surface::{GlyphMask, PixelSurface};

/// Opaque handle of a host-presented layered surface.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct SurfaceId(u64);

impl SurfaceId {
    pub fn new(id: u64) -> SurfaceId { SurfaceId(id) }

    pub fn get(&self) -> u64 { self.0 }
}

impl fmt::Debug for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "SurfaceId({})", self.0) }
}

/// Every periodic or one-shot timer a widget can arm. At most one timer of
/// each kind exists at a time; restarting one replaces it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerId {
    SwitcherAnimation,
    SwitcherFocusPoll,
    IndicatorAnimation,
    EdgeFlash,
    ToastDismiss,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("host could not create a {width}x{height} surface")]
    SurfaceCreation { width: i32, height: i32 },
    #[error("{0:?} is not a live surface")]
    UnknownSurface(SurfaceId),
    #[error("window {0:?} no longer exists")]
    InvalidWindow(WindowHandle),
}

/// Layered top-level surfaces that present premultiplied pixel buffers.
pub trait HostSurface {
    fn create_surface(&self, size: Size) -> Result<SurfaceId, HostError>;

    /// Atomically replaces the presented image, placing it at `origin` and
    /// scaling the whole surface by `alpha`.
    fn update_surface(
        &self,
        id: SurfaceId,
        origin: Point,
        pixels: &PixelSurface,
        alpha: u8,
    ) -> Result<(), HostError>;

    fn move_surface(&self, id: SurfaceId, origin: Point) -> Result<(), HostError>;

    fn destroy_surface(&self, id: SurfaceId);
}

pub trait WindowEnumerator {
    /// Visible, non-minimized, unowned top-level windows in z-order, with
    /// anything `filter` rejects already removed.
    fn visible_windows(&self, filter: &WindowFilter) -> Vec<WindowInfo>;
}

pub trait ForegroundQuery {
    fn foreground(&self) -> Option<WindowHandle>;

    /// Restores (if minimized) and raises `handle`.
    fn activate(&self, handle: WindowHandle) -> Result<(), HostError>;
}

pub trait TextMetrics {
    fn measure(&self, text: &str) -> Size;

    /// Coverage mask for `text` in the display font, if the host can
    /// rasterize text at all.
    fn rasterize(&self, _text: &str) -> Option<GlyphMask> { None }
}

pub trait TimerScheduler {
    /// Arms (or re-arms) a timer firing every `period`; callbacks are at least
    /// `period` apart but otherwise best-effort.
    fn start_timer(&self, id: TimerId, period: Duration);

    fn stop_timer(&self, id: TimerId);
}

pub trait Screen {
    /// Usable area of the primary display, excluding task bars.
    fn work_area(&self) -> Rect;

    fn screen_size(&self) -> Size;

    fn cursor_position(&self) -> Point;
}

/// Everything a widget may ask of the host.
pub trait System:
    HostSurface + WindowEnumerator + ForegroundQuery + TextMetrics + TimerScheduler + Screen
{
}

impl<S> System for S where
    S: HostSurface + WindowEnumerator + ForegroundQuery + TextMetrics + TimerScheduler + Screen
{
}
