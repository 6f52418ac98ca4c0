use std::time::Instant;

use tracing::{debug, instrument, warn};

use crate::common::config::EdgeFlashSettings;
use crate::sys::geometry::Point;
use crate::sys::host::{SurfaceId, System, TimerId};
use crate::ui::animation::{self, AnimationClock};
use crate::ui::edge_flash as painter;
use crate::ui::surface::PixelSurface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Flash,
    AnimationTick,
    Shutdown,
}

#[derive(Debug)]
struct Flash {
    surface: SurfaceId,
    pixels: PixelSurface,
    started: Instant,
}

/// A brief glow around the screen edges, pulsed after the switcher moves
/// focus.
pub struct EdgeFlash {
    settings: EdgeFlashSettings,
    active: Option<Flash>,
}

impl EdgeFlash {
    pub fn new(settings: EdgeFlashSettings) -> Self { Self { settings, active: None } }

    pub fn is_active(&self) -> bool { self.active.is_some() }

    #[instrument(skip(self, sys))]
    pub fn handle_event<S: System>(&mut self, sys: &S, event: Event, now: Instant) {
        match event {
            Event::Flash => self.flash(sys, now),
            Event::AnimationTick => self.on_tick(sys, now),
            Event::Shutdown => self.teardown(sys),
        }
    }

    fn flash<S: System>(&mut self, sys: &S, now: Instant) {
        // The glow is static, so a repeated flash only restarts the envelope.
        if let Some(active) = self.active.as_mut() {
            if active.pixels.size() == sys.screen_size() {
                active.started = now;
                self.present(sys, 0);
                sys.start_timer(TimerId::EdgeFlash, self.settings.frame_interval());
                return;
            }
        }
        self.teardown(sys);
        let size = sys.screen_size();
        let mut pixels = match PixelSurface::new(size) {
            Ok(pixels) => pixels,
            Err(err) => {
                warn!(%err, "edge flash: could not allocate pixels");
                return;
            }
        };
        painter::paint(&mut pixels, self.settings.color, self.settings.glow_width);
        let surface = match sys.create_surface(size) {
            Ok(id) => id,
            Err(err) => {
                warn!(%err, "edge flash: could not create surface");
                return;
            }
        };
        self.active = Some(Flash { surface, pixels, started: now });
        debug!("edge flash");
        self.present(sys, 0);
        sys.start_timer(TimerId::EdgeFlash, self.settings.frame_interval());
    }

    fn on_tick<S: System>(&mut self, sys: &S, now: Instant) {
        let Some(active) = self.active.as_ref() else {
            sys.stop_timer(TimerId::EdgeFlash);
            return;
        };
        let clock = AnimationClock::new(active.started, self.settings.duration());
        if clock.is_finished(now) {
            self.teardown(sys);
            return;
        }
        let alpha = animation::flash_envelope(clock.progress(now)) * f32::from(self.settings.peak_alpha);
        self.present(sys, alpha as u8);
    }

    fn present<S: System>(&self, sys: &S, alpha: u8) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        if let Err(err) = sys.update_surface(active.surface, Point::ZERO, &active.pixels, alpha) {
            warn!(%err, "edge flash: dropped frame");
        }
    }

    fn teardown<S: System>(&mut self, sys: &S) {
        sys.stop_timer(TimerId::EdgeFlash);
        if let Some(active) = self.active.take() {
            sys.destroy_surface(active.surface);
        }
    }
}
