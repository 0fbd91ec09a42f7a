use colored::*;

use crate::core::{Disposition, EffectiveState};
use crate::matrix::EntryStat;

/// Width of one matrix cell, in characters
pub const CELL_WIDTH: usize = 8;

/// Width of the hostname column
pub const HOSTNAME_WIDTH: usize = 28;

/// Console handles colored formatting of matrix cells and messages
pub struct Console {
    allow_color: Color,
    block_color: Color,
}

impl Console {
    /// Create a new Console with default colors
    pub fn new() -> Self {
        Self {
            allow_color: Color::Green,
            block_color: Color::Red,
        }
    }

    /// Create a new Console with custom colors
    pub fn with_colors(allow_color: Color, block_color: Color) -> Self {
        Self {
            allow_color,
            block_color,
        }
    }

    /// Paint text the way a cell in this state is shown.
    ///
    /// Allowed cells are green and blocked ones red; a rule of the cell's own
    /// is bold, an inherited one dimmed.
    pub fn paint(&self, text: &str, state: Option<EffectiveState>) -> ColoredString {
        let Some(state) = state else {
            return text.normal();
        };
        let color = match state.disposition {
            Disposition::Allow => self.allow_color,
            Disposition::Block => self.block_color,
        };
        let painted = text.color(color);
        if state.is_specific() {
            painted.bold()
        } else {
            painted.dimmed()
        }
    }

    /// One matrix cell: the count (`-` for none), `*` when its rule is saved
    pub fn cell(&self, entry: &EntryStat) -> String {
        let mut text = if entry.count == 0 {
            "-".to_string()
        } else {
            entry.count.to_string()
        };
        if entry.saved.map(|s| s.is_specific()).unwrap_or(false) {
            text.push('*');
        }
        let padded = format!("{:>width$}", text, width = CELL_WIDTH);
        self.paint(&padded, entry.state).to_string()
    }

    /// Section heading
    pub fn heading(&self, title: &str) -> String {
        format!("{} {}", "==".bright_blue(), title.bright_blue().bold())
    }

    /// Separator line spanning the matrix
    pub fn separator(&self, columns: usize) -> String {
        "-"
            .repeat(HOSTNAME_WIDTH + columns * CELL_WIDTH)
            .bright_black()
            .to_string()
    }

    /// Print an error message
    pub fn print_error(&self, error: &str) {
        eprintln!("{} {}", "Error:".red().bold(), error);
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Layer, RequestType};

    #[test]
    fn test_cell_text() {
        colored::control::set_override(false);
        let console = Console::new();

        let mut entry = EntryStat::new("a.com", RequestType::Script);
        assert_eq!(console.cell(&entry).trim(), "-");

        entry.count = 3;
        entry.state = Some(EffectiveState::specific(Disposition::Allow, Layer::Permanent));
        entry.saved = entry.state;
        assert_eq!(console.cell(&entry).trim(), "3*");
        assert_eq!(console.cell(&entry).len(), CELL_WIDTH);

        entry.saved = Some(EffectiveState::inherited(Disposition::Allow, Layer::Permanent));
        assert_eq!(console.cell(&entry).trim(), "3");
    }

    #[test]
    fn test_custom_colors() {
        let console = Console::with_colors(Color::Blue, Color::Yellow);
        let allow = Some(EffectiveState::specific(Disposition::Allow, Layer::Temporary));
        let block = Some(EffectiveState::inherited(Disposition::Block, Layer::Temporary));

        assert_eq!(console.paint("x", allow).fgcolor(), Some(Color::Blue));
        assert_eq!(console.paint("x", block).fgcolor(), Some(Color::Yellow));
        assert_eq!(console.paint("x", None).fgcolor(), None);
    }
}
