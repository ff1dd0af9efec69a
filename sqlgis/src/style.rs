//! Per-row drawing style and the palette rows are colored from.

use serde::{Deserialize, Serialize};

use crate::Color;

/// Colors assigned to rows of a visualization, in order.
pub const DEFAULT_PALETTE: [Color; 17] = [
    Color::from_hex("#B02EE0"),
    Color::from_hex("#E0642E"),
    Color::from_hex("#E0D62E"),
    Color::from_hex("#2E97E0"),
    Color::from_hex("#BCE02E"),
    Color::from_hex("#E02E75"),
    Color::from_hex("#5CE02E"),
    Color::from_hex("#E0B02E"),
    Color::from_hex("#0022E0"),
    Color::from_hex("#726CB1"),
    Color::from_hex("#481A36"),
    Color::from_hex("#BAC658"),
    Color::from_hex("#127224"),
    Color::from_hex("#825119"),
    Color::from_hex("#238C74"),
    Color::from_hex("#4C489B"),
    Color::from_hex("#87C9BF"),
];

/// How a single row is drawn: its color and an optional label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    /// Fill color of polygons, stroke color of lines and points.
    pub color: Color,
    label: Option<String>,
}

impl Style {
    /// Creates a new unlabelled style.
    pub fn new(color: Color) -> Self {
        Self { color, label: None }
    }

    /// Creates a new instance from a copy of the current, but with the given label. The label is trimmed, and an
    /// empty label means no label.
    pub fn with_label(&self, label: &str) -> Self {
        let label = label.trim();
        Self {
            label: (!label.is_empty()).then(|| label.to_string()),
            ..self.clone()
        }
    }

    /// Label of the row, if any.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Label for attributes that are always written, empty if there is none.
    pub(crate) fn label_or_empty(&self) -> &str {
        self.label().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_is_trimmed() {
        let style = Style::new(Color::BLACK);
        assert_eq!(style.label(), None);
        assert_eq!(style.with_label("  Ol ").label(), Some("Ol"));
        assert_eq!(style.with_label("   ").label(), None);
        assert_eq!(style.with_label("   ").label_or_empty(), "");
    }

    #[test]
    fn palette_starts_with_purple() {
        assert_eq!(DEFAULT_PALETTE[0], Color::rgb(176, 46, 224));
        assert_eq!(DEFAULT_PALETTE[16].to_css_hex(), "#87c9bf");
    }
}
