//! Label preprocessing and switcher panel geometry.

use crate::common::collections::HashMap;
use crate::sys::geometry::{Point, Rect, Size};

const ELLIPSIS: &str = "...";

/// Shortens `label` to at most `max_chars` characters, replacing the tail
/// with `...` when it has to cut.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_owned();
    }
    if max_chars < ELLIPSIS.len() {
        return ELLIPSIS[..max_chars].to_owned();
    }
    let keep = max_chars - ELLIPSIS.len();
    let mut out: String = label.chars().take(keep).collect();
    out.push_str(ELLIPSIS);
    out
}

/// Appends ` (n)` to every label that appears more than once, numbering each
/// group from 1 in order of appearance. Unique labels are left untouched.
pub fn disambiguate(labels: Vec<String>) -> Vec<String> {
    let mut totals: HashMap<String, usize> = HashMap::default();
    for label in &labels {
        *totals.entry(label.clone()).or_default() += 1;
    }
    let mut seen: HashMap<String, usize> = HashMap::default();
    labels
        .into_iter()
        .map(|label| {
            if totals.get(&label).copied().unwrap_or(0) < 2 {
                return label;
            }
            let n = seen.entry(label.clone()).or_default();
            *n += 1;
            format!("{label} ({n})")
        })
        .collect()
}

/// Truncation first, then disambiguation; the result is what gets measured.
pub fn prepare_labels<I, S>(raw: I, max_chars: usize) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    disambiguate(raw.into_iter().map(|l| truncate_label(l.as_ref(), max_chars)).collect())
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChipMetrics {
    pub item_padding_x: i32,
    pub item_padding_y: i32,
    pub item_spacing: i32,
    pub panel_padding_x: i32,
    pub panel_padding_y: i32,
}

/// One chip's box in panel-local coordinates.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChipFrame {
    pub x: i32,
    pub width: i32,
    pub text: Size,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLayout {
    pub size: Size,
    pub item_height: i32,
    pub chips: Vec<ChipFrame>,
}

impl PanelLayout {
    pub fn chip_rect(&self, index: usize, metrics: &ChipMetrics) -> Option<Rect> {
        let chip = self.chips.get(index)?;
        Some(Rect::from_xywh(chip.x, metrics.panel_padding_y, chip.width, self.item_height))
    }
}

/// Lays measured labels out left to right.
///
/// Width is `Σ chip + 2·panel_padding_x + spacing·(n − 1)`; height is the
/// tallest text plus item and panel vertical padding.
pub fn layout_chips(text_sizes: &[Size], metrics: &ChipMetrics) -> PanelLayout {
    let max_text_height = text_sizes.iter().map(|s| s.height).max().unwrap_or(0);
    let item_height = max_text_height + 2 * metrics.item_padding_y;
    let mut chips = Vec::with_capacity(text_sizes.len());
    let mut x = metrics.panel_padding_x;
    for (i, text) in text_sizes.iter().enumerate() {
        if i > 0 {
            x += metrics.item_spacing;
        }
        let width = text.width + 2 * metrics.item_padding_x;
        chips.push(ChipFrame { x, width, text: *text });
        x += width;
    }
    PanelLayout {
        size: Size::new(
            x + metrics.panel_padding_x,
            item_height + 2 * metrics.panel_padding_y,
        ),
        item_height,
        chips,
    }
}

/// Where the panel goes: just right of the indicator, vertically centered
/// on it, or at a fixed inset from the work area's bottom-left corner when
/// the indicator is gone.
pub fn anchor_panel(
    panel: Size,
    indicator: Option<Rect>,
    work_area: Rect,
    gap: i32,
    fallback_offset: Point,
) -> Point {
    match indicator {
        Some(frame) => Point::new(frame.right() + gap, frame.center_y() - panel.height / 2),
        None => Point::new(
            work_area.left() + fallback_offset.x,
            work_area.bottom() - panel.height - fallback_offset.y,
        ),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const METRICS: ChipMetrics = ChipMetrics {
        item_padding_x: 10,
        item_padding_y: 4,
        item_spacing: 2,
        panel_padding_x: 4,
        panel_padding_y: 3,
    };

    #[test]
    fn duplicate_labels_are_numbered_in_order() {
        let labels = vec!["Chrome".into(), "Chrome".into(), "Terminal".into()];
        assert_eq!(disambiguate(labels), vec!["Chrome (1)", "Chrome (2)", "Terminal"]);
    }

    #[test]
    fn interleaved_duplicates_number_per_group() {
        let labels = ["Edge", "Slack", "Edge", "Slack", "Edge"].map(String::from).to_vec();
        assert_eq!(
            disambiguate(labels),
            vec!["Edge (1)", "Slack (1)", "Edge (2)", "Slack (2)", "Edge (3)"]
        );
    }

    #[test]
    fn long_label_is_cut_to_max_with_ellipsis() {
        let label = "abcdefghijklmnopqrstuvwxyz0123";
        assert_eq!(label.len(), 30);
        let out = truncate_label(label, 24);
        assert_eq!(out, "abcdefghijklmnopqrstu...");
        assert_eq!(out.chars().count(), 24);
        assert_eq!(truncate_label("short", 24), "short");
    }

    #[test]
    fn truncation_never_exceeds_a_tiny_limit() {
        assert_eq!(truncate_label("abcdef", 2), "..");
        assert_eq!(truncate_label("abcdef", 0), "");
        assert_eq!(truncate_label("abcdef", 3), "...");
        assert_eq!(truncate_label("abcdef", 4), "a...");
    }

    #[test]
    fn truncation_counts_chars_not_bytes() {
        let label = "é".repeat(30);
        assert_eq!(truncate_label(&label, 24).chars().count(), 24);
    }

    #[test]
    fn truncation_happens_before_collision_check() {
        let a = format!("{}A", "x".repeat(30));
        let b = format!("{}B", "x".repeat(30));
        let out = prepare_labels([a, b], 24);
        let stem = format!("{}...", "x".repeat(21));
        assert_eq!(out, vec![format!("{stem} (1)"), format!("{stem} (2)")]);
    }

    #[test]
    fn panel_geometry_sums_chips() {
        let layout = layout_chips(&[Size::new(30, 17), Size::new(50, 15)], &METRICS);
        assert_eq!(layout.chips[0], ChipFrame { x: 4, width: 50, text: Size::new(30, 17) });
        assert_eq!(layout.chips[1].x, 4 + 50 + 2);
        assert_eq!(layout.size, Size::new(50 + 70 + 2 * 4 + 2, 17 + 8 + 6));
        assert_eq!(layout.item_height, 25);
    }

    #[test]
    fn anchors_next_to_indicator_or_falls_back() {
        let work = Rect::from_xywh(0, 0, 1920, 1040);
        let indicator = Rect::from_xywh(8, 1000, 32, 32);
        let panel = Size::new(200, 31);
        assert_eq!(
            anchor_panel(panel, Some(indicator), work, 6, Point::new(40, 8)),
            Point::new(46, 1016 - 15)
        );
        assert_eq!(
            anchor_panel(panel, None, work, 6, Point::new(40, 8)),
            Point::new(40, 1040 - 31 - 8)
        );
    }
}
