//! The switcher's per-toggle state.

use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::layout_engine::chips::PanelLayout;
use crate::sys::geometry::Point;
use crate::sys::host::SurfaceId;
use crate::sys::window::WindowHandle;
use crate::ui::surface::{GlyphMask, PixelSurface};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimState {
    Idle,
    Intro,
    Visible,
    FadeOut,
}

impl fmt::Display for AnimState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AnimState::Idle => "idle",
            AnimState::Intro => "intro",
            AnimState::Visible => "visible",
            AnimState::FadeOut => "fade_out",
        })
    }
}

#[derive(Debug, Clone)]
pub struct TrackedItem {
    pub handle: WindowHandle,
    /// Post-truncation, post-disambiguation.
    pub label: String,
    pub width: i32,
    pub x: i32,
    pub glyphs: Option<GlyphMask>,
}

/// A live switcher panel. One exists exactly while the switcher is not idle,
/// and it owns the only surface the switcher has allocated.
#[derive(Debug)]
pub struct SwitcherSession {
    pub items: Vec<TrackedItem>,
    cursor: Option<usize>,
    pub state: AnimState,
    pub entered_at: Instant,
    pub layout: PanelLayout,
    pub origin: Point,
    pub pixels: PixelSurface,
    pub surface: SurfaceId,
}

impl SwitcherSession {
    pub fn new(
        items: Vec<TrackedItem>,
        cursor: Option<usize>,
        layout: PanelLayout,
        origin: Point,
        pixels: PixelSurface,
        surface: SurfaceId,
        now: Instant,
    ) -> SwitcherSession {
        let mut session = SwitcherSession {
            items,
            cursor: None,
            state: AnimState::Intro,
            entered_at: now,
            layout,
            origin,
            pixels,
            surface,
        };
        session.set_cursor(cursor);
        session
    }

    pub fn cursor(&self) -> Option<usize> { self.cursor }

    /// Sets the cursor, dropping indexes outside the item list.
    pub fn set_cursor(&mut self, cursor: Option<usize>) {
        self.cursor = cursor.filter(|&i| i < self.items.len());
    }

    pub fn enter(&mut self, state: AnimState, now: Instant) {
        self.state = state;
        self.entered_at = now;
    }

    pub fn handles(&self) -> impl Iterator<Item = &WindowHandle> {
        self.items.iter().map(|item| &item.handle)
    }
}
