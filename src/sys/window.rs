use std::fmt;

use serde::{Deserialize, Serialize};

use crate::common::config::{EDGE_FLASH_CLASS, INDICATOR_CLASS, SWITCHER_CLASS, TOAST_CLASS};

/// Opaque handle the host uses to identify a top-level window.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(transparent)]
pub struct WindowHandle(u64);

impl WindowHandle {
    pub fn new(raw: u64) -> WindowHandle { WindowHandle(raw) }

    pub fn get(&self) -> u64 { self.0 }
}

impl fmt::Debug for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "Window({:#x})", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub handle: WindowHandle,
    pub title: String,
    pub class_name: String,
    /// Executable path or file name of the owning process, when resolvable.
    pub process_name: Option<String>,
}

const FRIENDLY_NAMES: &[(&str, &str)] = &[
    ("code", "VS Code"),
    ("msedge", "Edge"),
    ("chrome", "Chrome"),
    ("firefox", "Firefox"),
    ("explorer", "Explorer"),
    ("windowsterminal", "Terminal"),
    ("wt", "Terminal"),
    ("cmd", "CMD"),
    ("powershell", "PowerShell"),
    ("pwsh", "PowerShell"),
    ("notepad", "Notepad"),
    ("slack", "Slack"),
    ("discord", "Discord"),
    ("msteams", "Teams"),
];

/// File stem of an executable path, accepting either separator.
pub fn process_stem(process: &str) -> &str {
    let file = process.rsplit(['\\', '/']).next().unwrap_or(process);
    match file.rfind('.') {
        Some(dot) if dot > 0 => &file[..dot],
        _ => file,
    }
}

pub fn friendly_name(stem: &str) -> Option<&'static str> {
    FRIENDLY_NAMES
        .iter()
        .find(|(exe, _)| exe.eq_ignore_ascii_case(stem))
        .map(|(_, name)| *name)
}

impl WindowInfo {
    /// Friendly process name, else the executable stem, else the title.
    pub fn display_label(&self) -> String {
        let Some(process) = self.process_name.as_deref() else {
            return self.title.clone();
        };
        let stem = process_stem(process);
        if stem.is_empty() {
            return self.title.clone();
        }
        friendly_name(stem).map(str::to_owned).unwrap_or_else(|| stem.to_owned())
    }
}

/// Window-class and process blacklists applied during enumeration. The
/// default excludes the widgets' own classes and a few shell processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowFilter {
    pub excluded_classes: Vec<String>,
    pub excluded_processes: Vec<String>,
}

impl Default for WindowFilter {
    fn default() -> Self {
        WindowFilter {
            excluded_classes: [INDICATOR_CLASS, SWITCHER_CLASS, EDGE_FLASH_CLASS, TOAST_CLASS]
                .map(String::from)
                .to_vec(),
            excluded_processes: ["TextInputHost", "ApplicationFrameHost", "SystemSettings"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl WindowFilter {
    pub fn admits(&self, window: &WindowInfo) -> bool {
        if window.title.is_empty() {
            return false;
        }
        if self.excluded_classes.iter().any(|class| *class == window.class_name) {
            return false;
        }
        match window.process_name.as_deref() {
            Some(process) => {
                let stem = process_stem(process);
                !self.excluded_processes.iter().any(|p| p.eq_ignore_ascii_case(stem))
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(title: &str, class: &str, process: Option<&str>) -> WindowInfo {
        WindowInfo {
            handle: WindowHandle::new(1),
            title: title.into(),
            class_name: class.into(),
            process_name: process.map(Into::into),
        }
    }

    #[test]
    fn label_prefers_friendly_process_name() {
        let w = window("main.rs - crate", "Chrome_WidgetWin_1", Some(r"C:\Apps\Code.exe"));
        assert_eq!(w.display_label(), "VS Code");
        let w = window("~", "CASCADIA", Some("/usr/bin/WindowsTerminal.exe"));
        assert_eq!(w.display_label(), "Terminal");
    }

    #[test]
    fn label_falls_back_to_stem_then_title() {
        assert_eq!(window("Doc", "C", Some("winword.exe")).display_label(), "winword");
        assert_eq!(window("Untitled", "C", None).display_label(), "Untitled");
    }

    #[test]
    fn filter_rejects_blacklisted_and_untitled() {
        let filter = WindowFilter {
            excluded_classes: vec!["KeypadHudIndicator".into()],
            excluded_processes: vec!["TextInputHost".into()],
        };
        assert!(filter.admits(&window("x", "Notepad", Some("notepad.exe"))));
        assert!(!filter.admits(&window("x", "KeypadHudIndicator", None)));
        assert!(!filter.admits(&window("x", "C", Some(r"C:\W\textinputhost.exe"))));
        assert!(!filter.admits(&window("", "C", None)));
    }
}
