use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use thiserror::Error;

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const CONTROL = 1 << 0;
        const ALT = 1 << 1;
        const SHIFT = 1 << 2;
        const META = 1 << 3;
    }
}

const MODIFIER_NAMES: &[(&str, Modifiers)] = &[
    ("ctrl", Modifiers::CONTROL),
    ("control", Modifiers::CONTROL),
    ("alt", Modifiers::ALT),
    ("option", Modifiers::ALT),
    ("shift", Modifiers::SHIFT),
    ("meta", Modifiers::META),
    ("win", Modifiers::META),
    ("cmd", Modifiers::META),
];

/// A global key chord such as `ctrl+alt+m`. Key names are lowercase.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hotkey {
    pub modifiers: Modifiers,
    pub key: String,
}

impl Hotkey {
    pub fn new(modifiers: Modifiers, key: impl Into<String>) -> Hotkey {
        Hotkey {
            modifiers,
            key: key.into().to_ascii_lowercase(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HotkeyParseError {
    #[error("empty hotkey")]
    Empty,
    #[error("unknown modifier {0:?}")]
    UnknownModifier(String),
    #[error("hotkey {0:?} has no key")]
    MissingKey(String),
}

impl FromStr for Hotkey {
    type Err = HotkeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(HotkeyParseError::Empty);
        }
        let mut parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let key = parts.pop().unwrap_or_default();
        if key.is_empty() {
            return Err(HotkeyParseError::MissingKey(s.to_owned()));
        }
        let mut modifiers = Modifiers::empty();
        for part in parts {
            let Some((_, flag)) =
                MODIFIER_NAMES.iter().find(|(name, _)| name.eq_ignore_ascii_case(part))
            else {
                return Err(HotkeyParseError::UnknownModifier(part.to_owned()));
            };
            modifiers |= *flag;
        }
        Ok(Hotkey::new(modifiers, key))
    }
}

impl TryFrom<String> for Hotkey {
    type Error = HotkeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> { value.parse() }
}

impl From<Hotkey> for String {
    fn from(hotkey: Hotkey) -> String { hotkey.to_string() }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (Modifiers::CONTROL, "ctrl"),
            (Modifiers::ALT, "alt"),
            (Modifiers::SHIFT, "shift"),
            (Modifiers::META, "meta"),
        ] {
            if self.modifiers.contains(flag) {
                write!(f, "{name}+")?;
            }
        }
        f.write_str(&self.key)
    }
}

impl fmt::Debug for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Hotkey({self})") }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chords_case_insensitively() {
        let hotkey: Hotkey = "Ctrl+Alt+M".parse().unwrap();
        assert_eq!(hotkey, Hotkey::new(Modifiers::CONTROL | Modifiers::ALT, "m"));
        assert_eq!(hotkey.to_string(), "ctrl+alt+m");
    }

    #[test]
    fn display_uses_canonical_modifier_order() {
        let hotkey: Hotkey = "shift+ctrl+p".parse().unwrap();
        assert_eq!(hotkey.to_string(), "ctrl+shift+p");
    }

    #[test]
    fn rejects_malformed_chords() {
        assert_eq!("".parse::<Hotkey>(), Err(HotkeyParseError::Empty));
        assert_eq!(
            "hyper+x".parse::<Hotkey>(),
            Err(HotkeyParseError::UnknownModifier("hyper".into()))
        );
        assert_eq!("alt+".parse::<Hotkey>(), Err(HotkeyParseError::MissingKey("alt+".into())));
    }
}
