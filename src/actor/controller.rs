//! Routes host input to the widgets.
//!
//! The host loop only has to forward hotkeys, timer expirations and pointer
//! events into [`Controller::handle_event`]; everything else happens
//! synchronously inside it.

use std::time::Instant;

use tracing::{debug, info, instrument, trace};

use crate::actor::{edge_flash, indicator, switcher, toast};
use crate::common::config::{Action, Config};
use crate::layout_engine::graph::Direction;
use crate::sys::event::PointerEvent;
use crate::sys::headless::HeadlessSystem;
use crate::sys::host::{System, TimerId};
use crate::sys::hotkey::Hotkey;

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Hotkey(Hotkey),
    Action(Action),
    Timer(TimerId),
    Pointer(PointerEvent),
    Shutdown,
}

pub struct Controller<S: System> {
    system: S,
    config: Config,
    hotkeys_active: bool,
    switcher: switcher::Switcher,
    indicator: indicator::Indicator,
    edge_flash: edge_flash::EdgeFlash,
    toast: toast::Toast,
}

impl<S: System> Controller<S> {
    pub fn new(config: Config, system: S) -> Self {
        let settings = &config.settings;
        Self {
            switcher: switcher::Switcher::new(settings.switcher.clone(), settings.windows.clone()),
            indicator: indicator::Indicator::new(settings.indicator.clone()),
            edge_flash: edge_flash::EdgeFlash::new(settings.edge_flash.clone()),
            toast: toast::Toast::new(settings.toast.clone()),
            hotkeys_active: true,
            system,
            config,
        }
    }

    /// Hotkeys start active, so the badge comes up immediately.
    pub fn start(&mut self, now: Instant) {
        self.indicator.handle_event(&self.system, indicator::Event::Show, now);
    }

    pub fn system(&self) -> &S { &self.system }

    pub fn switcher(&self) -> &switcher::Switcher { &self.switcher }

    pub fn indicator(&self) -> &indicator::Indicator { &self.indicator }

    pub fn edge_flash(&self) -> &edge_flash::EdgeFlash { &self.edge_flash }

    pub fn toast(&self) -> &toast::Toast { &self.toast }

    pub fn hotkeys_active(&self) -> bool { self.hotkeys_active }

    #[instrument(skip(self))]
    pub fn handle_event(&mut self, event: Event, now: Instant) {
        match event {
            Event::Hotkey(hotkey) => match self.config.action_for(&hotkey) {
                Some(action) => self.perform(action, now),
                None => debug!(%hotkey, "unbound hotkey"),
            },
            Event::Action(action) => self.perform(action, now),
            Event::Timer(id) => self.on_timer(id, now),
            Event::Pointer(pointer) => {
                let consumed = self.indicator.handle_event(
                    &self.system,
                    indicator::Event::Pointer(pointer),
                    now,
                );
                trace!(position = ?pointer.position(), consumed, "pointer");
            }
            Event::Shutdown => {
                let sys = &self.system;
                self.switcher.handle_event(sys, switcher::Event::Shutdown, now);
                self.indicator.handle_event(sys, indicator::Event::Shutdown, now);
                self.edge_flash.handle_event(sys, edge_flash::Event::Shutdown, now);
                self.toast.handle_event(sys, toast::Event::Shutdown, now);
            }
        }
    }

    fn perform(&mut self, action: Action, now: Instant) {
        if action == Action::ToggleHotkeys {
            self.toggle_hotkeys(now);
            return;
        }
        if !self.hotkeys_active {
            debug!(%action, "hotkeys are off");
            return;
        }
        let sys = &self.system;
        match action {
            Action::ShowToast => {
                let at = sys.cursor_position();
                let text = self.config.settings.toast.message.clone();
                self.toast.handle_event(sys, toast::Event::Show { at, text }, now);
            }
            Action::SwitcherToggle => {
                let indicator = self.indicator.rect();
                self.switcher.handle_event(sys, switcher::Event::Toggle { indicator }, now);
            }
            Action::SwitcherPrev => self.move_switcher(Direction::Left, now),
            Action::SwitcherNext => self.move_switcher(Direction::Right, now),
            Action::SwitcherHide => {
                self.switcher.handle_event(sys, switcher::Event::Hide, now);
            }
            Action::ToggleHotkeys => {}
        }
    }

    fn move_switcher(&mut self, direction: Direction, now: Instant) {
        let sys = &self.system;
        let activated = self.switcher.handle_event(sys, switcher::Event::Move(direction), now);
        if activated.is_some() {
            self.edge_flash.handle_event(sys, edge_flash::Event::Flash, now);
        }
    }

    fn toggle_hotkeys(&mut self, now: Instant) {
        self.hotkeys_active = !self.hotkeys_active;
        let sys = &self.system;
        let at = sys.cursor_position();
        let text = if self.hotkeys_active {
            self.indicator.handle_event(sys, indicator::Event::Show, now);
            "Hotkeys ON"
        } else {
            self.switcher.handle_event(sys, switcher::Event::Hide, now);
            self.indicator.handle_event(sys, indicator::Event::Hide, now);
            "Hotkeys OFF"
        };
        info!(active = self.hotkeys_active, "hotkeys toggled");
        self.toast.handle_event(sys, toast::Event::Show { at, text: text.into() }, now);
    }

    fn on_timer(&mut self, id: TimerId, now: Instant) {
        let sys = &self.system;
        match id {
            TimerId::SwitcherAnimation => {
                self.switcher.handle_event(sys, switcher::Event::AnimationTick, now);
            }
            TimerId::SwitcherFocusPoll => {
                self.switcher.handle_event(sys, switcher::Event::FocusTick, now);
            }
            TimerId::IndicatorAnimation => {
                self.indicator.handle_event(sys, indicator::Event::AnimationTick, now);
            }
            TimerId::EdgeFlash => {
                self.edge_flash.handle_event(sys, edge_flash::Event::AnimationTick, now);
            }
            TimerId::ToastDismiss => {
                self.toast.handle_event(sys, toast::Event::DismissTimer, now);
            }
        }
    }
}

impl Controller<HeadlessSystem> {
    /// Fires every headless timer due up to `deadline`, in order, then parks
    /// the virtual clock at `deadline`.
    pub fn run_until(&mut self, deadline: Instant) {
        while let Some(id) = self.system.pop_due_timer(deadline) {
            let now = self.system.now();
            self.handle_event(Event::Timer(id), now);
        }
        let now = self.system.now();
        if deadline > now {
            self.system.advance(deadline - now);
        }
    }
}
