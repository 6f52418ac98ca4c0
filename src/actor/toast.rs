use std::time::Instant;

use tracing::{debug, instrument, warn};

use crate::common::config::ToastSettings;
use crate::sys::geometry::Point;
use crate::sys::host::{SurfaceId, System, TimerId};
use crate::ui::surface::PixelSurface;
use crate::ui::toast::{self as painter, ToastStyle};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Show { at: Point, text: String },
    Hide,
    DismissTimer,
    Shutdown,
}

#[derive(Debug)]
struct Shown {
    surface: SurfaceId,
    text: String,
    shown_at: Instant,
}

/// A short text label near the pointer that dismisses itself.
pub struct Toast {
    settings: ToastSettings,
    shown: Option<Shown>,
}

impl Toast {
    pub fn new(settings: ToastSettings) -> Self { Self { settings, shown: None } }

    pub fn text(&self) -> Option<&str> { self.shown.as_ref().map(|s| s.text.as_str()) }

    #[instrument(skip(self, sys))]
    pub fn handle_event<S: System>(&mut self, sys: &S, event: Event, now: Instant) {
        match event {
            Event::Show { at, text } => self.show(sys, at, text, now),
            Event::Hide | Event::DismissTimer | Event::Shutdown => self.hide(sys, now),
        }
    }

    fn show<S: System>(&mut self, sys: &S, at: Point, text: String, now: Instant) {
        self.hide(sys, now);
        let style = self.style();
        let size = style.box_size(sys.measure(&text));
        let mut pixels = match PixelSurface::new(size) {
            Ok(pixels) => pixels,
            Err(err) => {
                warn!(%err, "toast: could not allocate pixels");
                return;
            }
        };
        painter::paint(&mut pixels, &style, sys.rasterize(&text).as_ref());
        let surface = match sys.create_surface(size) {
            Ok(id) => id,
            Err(err) => {
                warn!(%err, "toast: could not create surface");
                return;
            }
        };
        let offset = self.settings.cursor_offset;
        if let Err(err) = sys.update_surface(surface, at.offset(offset, offset), &pixels, 255) {
            warn!(%err, "toast: dropped frame");
        }
        sys.start_timer(TimerId::ToastDismiss, self.settings.dismiss_after());
        debug!(%text, "toast shown");
        self.shown = Some(Shown { surface, text, shown_at: now });
    }

    fn hide<S: System>(&mut self, sys: &S, now: Instant) {
        sys.stop_timer(TimerId::ToastDismiss);
        if let Some(shown) = self.shown.take() {
            sys.destroy_surface(shown.surface);
            debug!(shown_for = ?now.saturating_duration_since(shown.shown_at), "toast hidden");
        }
    }

    fn style(&self) -> ToastStyle {
        ToastStyle {
            background: self.settings.background,
            text: self.settings.text,
            border: self.settings.border,
            padding_x: self.settings.padding_x,
            padding_y: self.settings.padding_y,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::sys::geometry::Size;
    use crate::sys::headless::HeadlessSystem;

    fn show(toast: &mut Toast, host: &HeadlessSystem, text: &str) {
        let event = Event::Show { at: Point::new(100, 200), text: text.into() };
        toast.handle_event(host, event, host.now());
    }

    #[test]
    fn shows_offset_from_cursor_and_sized_to_text() {
        let host = HeadlessSystem::desktop(Instant::now());
        let mut toast = Toast::new(ToastSettings::default());
        show(&mut toast, &host, "Hotkeys ON");
        let shown = &host.surfaces()[0];
        assert_eq!(shown.origin, Point::new(110, 210));
        assert_eq!(shown.size, Size::new(70 + 32, 17 + 24));
        assert!(host.is_timer_running(TimerId::ToastDismiss));
    }

    #[test]
    fn new_toast_replaces_old() {
        let host = HeadlessSystem::desktop(Instant::now());
        let mut toast = Toast::new(ToastSettings::default());
        show(&mut toast, &host, "one");
        show(&mut toast, &host, "two");
        assert_eq!(host.surfaces().len(), 1);
        assert_eq!(toast.text(), Some("two"));
    }

    #[test]
    fn dismiss_timer_hides_and_hide_is_idempotent() {
        let host = HeadlessSystem::desktop(Instant::now());
        let mut toast = Toast::new(ToastSettings::default());
        show(&mut toast, &host, "bye");
        host.advance(Duration::from_millis(2000));
        toast.handle_event(&host, Event::DismissTimer, host.now());
        assert_eq!(toast.text(), None);
        assert!(host.surfaces().is_empty());
        assert!(!host.is_timer_running(TimerId::ToastDismiss));
        toast.handle_event(&host, Event::Hide, host.now());
        assert!(host.surfaces().is_empty());
    }
}
