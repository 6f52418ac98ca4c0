use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, io};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::common::collections::HashMap;
use crate::layout_engine::chips::ChipMetrics;
use crate::sys::geometry::Point;
use crate::sys::hotkey::Hotkey;
use crate::sys::window::WindowFilter;
use crate::ui::animation::StaggerTiming;
use crate::ui::compositor::Rgb;

/// Window classes registered by the widgets themselves.
pub const INDICATOR_CLASS: &str = "KeypadHudIndicator";
pub const SWITCHER_CLASS: &str = "KeypadHudSwitcher";
pub const EDGE_FLASH_CLASS: &str = "KeypadHudEdgeFlash";
pub const TOAST_CLASS: &str = "KeypadHudToast";

pub fn config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("keypad-hud").join("config.toml"))
}

fn ms(value: u64) -> Duration { Duration::from_millis(value) }

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Action {
    ToggleHotkeys,
    ShowToast,
    SwitcherToggle,
    SwitcherPrev,
    SwitcherNext,
    SwitcherHide,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub settings: Settings,
    pub keys: HashMap<Hotkey, Action>,
}

impl Default for Config {
    fn default() -> Self {
        let keys = [
            ("ctrl+alt+m", Action::ToggleHotkeys),
            ("ctrl+shift+p", Action::ShowToast),
            ("alt+minus", Action::SwitcherToggle),
            ("alt+left", Action::SwitcherPrev),
            ("alt+right", Action::SwitcherNext),
            ("alt+down", Action::SwitcherHide),
        ]
        .into_iter()
        .filter_map(|(chord, action)| chord.parse().ok().map(|key| (key, action)))
        .collect();
        Config { settings: Settings::default(), keys }
    }
}

impl Config {
    /// Reads a config file. A missing file is not an error.
    pub fn read(path: &Path) -> anyhow::Result<Config> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Config::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", path.display()));
            }
        };
        Config::parse(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Config> { Ok(toml::from_str(text)?) }

    pub fn action_for(&self, hotkey: &Hotkey) -> Option<Action> { self.keys.get(hotkey).copied() }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub switcher: SwitcherSettings,
    pub indicator: IndicatorSettings,
    pub edge_flash: EdgeFlashSettings,
    pub toast: ToastSettings,
    pub windows: WindowFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitcherSettings {
    pub gap: i32,
    pub item_padding_x: i32,
    pub item_padding_y: i32,
    pub item_spacing: i32,
    pub panel_padding_x: i32,
    pub panel_padding_y: i32,
    pub max_label_chars: usize,
    pub background: Rgb,
    pub chip: Rgb,
    pub selected: Rgb,
    pub text: Rgb,
    pub frame_interval_ms: u64,
    pub focus_poll_ms: u64,
    pub chip_duration_ms: u64,
    pub chip_stagger_ms: u64,
    pub slide_distance: i32,
    pub fade_out_ms: u64,
    pub panel_alpha: u8,
    pub fallback_offset_x: i32,
    pub fallback_offset_y: i32,
}

impl Default for SwitcherSettings {
    fn default() -> Self {
        Self {
            gap: 6,
            item_padding_x: 10,
            item_padding_y: 4,
            item_spacing: 2,
            panel_padding_x: 4,
            panel_padding_y: 3,
            max_label_chars: 24,
            background: Rgb::from_u32(0x1A1A2E),
            chip: Rgb::from_u32(0x2A2A40),
            selected: Rgb::from_u32(0x008CB4),
            text: Rgb::WHITE,
            frame_interval_ms: 16,
            focus_poll_ms: 100,
            chip_duration_ms: 400,
            chip_stagger_ms: 100,
            slide_distance: 8,
            fade_out_ms: 300,
            panel_alpha: 230,
            fallback_offset_x: 40,
            fallback_offset_y: 8,
        }
    }
}

impl SwitcherSettings {
    pub fn metrics(&self) -> ChipMetrics {
        ChipMetrics {
            item_padding_x: self.item_padding_x,
            item_padding_y: self.item_padding_y,
            item_spacing: self.item_spacing,
            panel_padding_x: self.panel_padding_x,
            panel_padding_y: self.panel_padding_y,
        }
    }

    pub fn stagger(&self) -> StaggerTiming {
        StaggerTiming {
            item: ms(self.chip_duration_ms),
            stagger: ms(self.chip_stagger_ms),
        }
    }

    pub fn fallback_offset(&self) -> Point {
        Point::new(self.fallback_offset_x, self.fallback_offset_y)
    }

    pub fn frame_interval(&self) -> Duration { ms(self.frame_interval_ms) }

    pub fn focus_poll(&self) -> Duration { ms(self.focus_poll_ms) }

    pub fn fade_out(&self) -> Duration { ms(self.fade_out_ms) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorSettings {
    pub size: i32,
    pub margin: i32,
    pub accent: Rgb,
    pub body: Rgb,
    /// Radians per second.
    pub breath_speed: f32,
    pub spin_duration_ms: u64,
    pub spin_revolutions: f32,
    pub fade_out_ms: u64,
    pub drag_threshold: i32,
    pub frame_interval_ms: u64,
}

impl Default for IndicatorSettings {
    fn default() -> Self {
        Self {
            size: 32,
            margin: 8,
            accent: Rgb::from_u32(0x00D4FF),
            body: Rgb::from_u32(0x1A1A2E),
            breath_speed: 1.8,
            spin_duration_ms: 1200,
            spin_revolutions: 0.5,
            fade_out_ms: 400,
            drag_threshold: 5,
            frame_interval_ms: 16,
        }
    }
}

impl IndicatorSettings {
    pub fn spin_duration(&self) -> Duration { ms(self.spin_duration_ms) }

    pub fn fade_out(&self) -> Duration { ms(self.fade_out_ms) }

    pub fn frame_interval(&self) -> Duration { ms(self.frame_interval_ms) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeFlashSettings {
    pub duration_ms: u64,
    pub glow_width: i32,
    pub color: Rgb,
    pub peak_alpha: u8,
    pub frame_interval_ms: u64,
}

impl Default for EdgeFlashSettings {
    fn default() -> Self {
        Self {
            duration_ms: 500,
            glow_width: 40,
            color: Rgb::from_u32(0x008CB4),
            peak_alpha: 140,
            frame_interval_ms: 16,
        }
    }
}

impl EdgeFlashSettings {
    pub fn duration(&self) -> Duration { ms(self.duration_ms) }

    pub fn frame_interval(&self) -> Duration { ms(self.frame_interval_ms) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastSettings {
    pub padding_x: i32,
    pub padding_y: i32,
    pub cursor_offset: i32,
    pub dismiss_ms: u64,
    pub background: Rgb,
    pub text: Rgb,
    pub border: Rgb,
    pub message: String,
}

impl Default for ToastSettings {
    fn default() -> Self {
        Self {
            padding_x: 16,
            padding_y: 12,
            cursor_offset: 10,
            dismiss_ms: 2000,
            background: Rgb::BLACK,
            text: Rgb::WHITE,
            border: Rgb::from_u32(0x505050),
            message: "Hello from keypad-hud".into(),
        }
    }
}

impl ToastSettings {
    pub fn dismiss_after(&self) -> Duration { ms(self.dismiss_ms) }
}
