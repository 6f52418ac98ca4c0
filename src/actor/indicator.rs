//! The breathing status badge.
//!
//! While it exists the badge redraws every frame: the breath phase is
//! measured from when it was created and never restarts, a spin plays once
//! after each show or click, and hiding fades it out before the surface is
//! released. It can be dragged anywhere; a press that never travels past the
//! drag threshold counts as a click.

use std::f32::consts::TAU;
use std::time::Instant;

use tracing::{debug, instrument, trace, warn};

use crate::common::config::IndicatorSettings;
use crate::sys::event::{MouseState, PointerEvent};
use crate::sys::geometry::{Point, Rect, Size};
use crate::sys::host::{SurfaceId, System, TimerId};
use crate::ui::animation::{self, AnimationClock};
use crate::ui::compositor;
use crate::ui::indicator::{self as painter, IndicatorStyle};
use crate::ui::surface::PixelSurface;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Show,
    Hide,
    AnimationTick,
    Pointer(PointerEvent),
    Shutdown,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    start: Point,
    window_start: Point,
    dragging: bool,
}

#[derive(Debug)]
struct Widget {
    surface: SurfaceId,
    pixels: PixelSurface,
    origin: Point,
    born: Instant,
    spin: Option<Instant>,
    fade: Option<Instant>,
    button: MouseState,
    press: Option<Press>,
}

pub struct Indicator {
    settings: IndicatorSettings,
    widget: Option<Widget>,
}

impl Indicator {
    pub fn new(settings: IndicatorSettings) -> Self { Self { settings, widget: None } }

    pub fn is_shown(&self) -> bool { self.widget.is_some() }

    pub fn is_fading(&self) -> bool { self.widget.as_ref().is_some_and(|w| w.fade.is_some()) }

    pub fn is_spinning(&self) -> bool { self.widget.as_ref().is_some_and(|w| w.spin.is_some()) }

    pub fn is_dragging(&self) -> bool {
        self.widget.as_ref().and_then(|w| w.press).is_some_and(|p| p.dragging)
    }

    /// Current frame on screen, while the badge exists (fading included).
    pub fn rect(&self) -> Option<Rect> {
        let size = self.settings.size;
        self.widget.as_ref().map(|w| Rect::new(w.origin, Size::new(size, size)))
    }

    /// Returns whether a pointer event was consumed by the badge.
    #[instrument(skip(self, sys))]
    pub fn handle_event<S: System>(&mut self, sys: &S, event: Event, now: Instant) -> bool {
        match event {
            Event::Show => self.show(sys, now),
            Event::Hide => self.hide(now),
            Event::AnimationTick => self.render(sys, now),
            Event::Pointer(pointer) => return self.on_pointer(sys, pointer, now),
            Event::Shutdown => self.teardown(sys),
        }
        false
    }

    fn show<S: System>(&mut self, sys: &S, now: Instant) {
        if let Some(widget) = self.widget.as_mut() {
            if widget.fade.take().is_some() {
                debug!("show cancels fade-out");
                widget.spin = Some(now);
            }
            return;
        }
        let size = Size::new(self.settings.size, self.settings.size);
        let pixels = match PixelSurface::new(size) {
            Ok(pixels) => pixels,
            Err(err) => {
                warn!(%err, "indicator: could not allocate pixels");
                return;
            }
        };
        let surface = match sys.create_surface(size) {
            Ok(id) => id,
            Err(err) => {
                warn!(%err, "indicator: could not create surface");
                return;
            }
        };
        let work = sys.work_area();
        let margin = self.settings.margin;
        self.widget = Some(Widget {
            surface,
            pixels,
            origin: Point::new(work.left() + margin, work.bottom() - size.height - margin),
            born: now,
            spin: Some(now),
            fade: None,
            button: MouseState::Up,
            press: None,
        });
        debug!("indicator shown");
        self.render(sys, now);
        sys.start_timer(TimerId::IndicatorAnimation, self.settings.frame_interval());
    }

    fn hide(&mut self, now: Instant) {
        let Some(widget) = self.widget.as_mut() else {
            return;
        };
        if widget.fade.is_none() {
            widget.fade = Some(now);
            debug!("indicator fade-out");
        }
    }

    fn render<S: System>(&mut self, sys: &S, now: Instant) {
        let Some(widget) = self.widget.as_mut() else {
            sys.stop_timer(TimerId::IndicatorAnimation);
            return;
        };
        let breath = compositor::breath(
            now.saturating_duration_since(widget.born).as_secs_f32(),
            self.settings.breath_speed,
        );

        let mut angle = 0.0;
        if let Some(start) = widget.spin {
            let t = AnimationClock::new(start, self.settings.spin_duration()).progress(now);
            if t >= 1.0 {
                widget.spin = None;
            } else {
                angle = animation::ease_out_cubic(t) * self.settings.spin_revolutions * TAU;
            }
        }

        let mut alpha = 1.0;
        if let Some(start) = widget.fade {
            let t = AnimationClock::new(start, self.settings.fade_out()).progress(now);
            if t >= 1.0 {
                self.teardown(sys);
                return;
            }
            alpha = animation::fade_out_alpha(t);
        }

        trace!(breath, angle, alpha, "indicator frame");
        let style = IndicatorStyle {
            accent: self.settings.accent,
            body: self.settings.body,
        };
        painter::paint(&mut widget.pixels, &style, angle, breath);
        let global = (alpha * 255.0) as u8;
        if let Err(err) = sys.update_surface(widget.surface, widget.origin, &widget.pixels, global)
        {
            warn!(%err, "indicator: dropped frame");
        }
    }

    fn on_pointer<S: System>(&mut self, sys: &S, pointer: PointerEvent, now: Instant) -> bool {
        let size = self.settings.size;
        let threshold = self.settings.drag_threshold;
        let Some(widget) = self.widget.as_mut() else {
            return false;
        };
        match pointer {
            PointerEvent::Down(point) => {
                if !Rect::new(widget.origin, Size::new(size, size)).contains(point) {
                    return false;
                }
                widget.button = MouseState::Down;
                widget.press = Some(Press {
                    start: point,
                    window_start: widget.origin,
                    dragging: false,
                });
                true
            }
            PointerEvent::Moved(point) => {
                let Some(press) = widget.press.as_mut() else {
                    return false;
                };
                if widget.button != MouseState::Down {
                    return false;
                }
                let (dx, dy) = (point.x - press.start.x, point.y - press.start.y);
                if !press.dragging && (dx.abs() > threshold || dy.abs() > threshold) {
                    press.dragging = true;
                    debug!("indicator drag started");
                }
                if press.dragging {
                    widget.origin = press.window_start.offset(dx, dy);
                    if let Err(err) = sys.move_surface(widget.surface, widget.origin) {
                        warn!(%err, "indicator: move failed");
                    }
                }
                true
            }
            PointerEvent::Up(_) => {
                widget.button = MouseState::Up;
                let Some(press) = widget.press.take() else {
                    return false;
                };
                if !press.dragging {
                    debug!("indicator clicked");
                    widget.spin = Some(now);
                }
                true
            }
        }
    }

    fn teardown<S: System>(&mut self, sys: &S) {
        sys.stop_timer(TimerId::IndicatorAnimation);
        if let Some(widget) = self.widget.take() {
            sys.destroy_surface(widget.surface);
            debug!("indicator hidden");
        }
    }
}
