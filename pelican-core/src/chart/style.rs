#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Reset,
    Normal,
    Error,
}

impl Style {
    pub fn marker(self) -> &'static str {
        match self {
            Style::Reset => "\x1b[0m",
            Style::Normal => "\x1b[32m",
            Style::Error => "\x1b[31m",
        }
    }
}

/// Writes styled text, emitting an escape marker only when the style changes.
///
/// Starts in `Reset`, which is what a fresh terminal line is assumed to be in.
#[derive(Debug)]
pub struct StyleRun {
    current: Style,
}

impl Default for StyleRun {
    fn default() -> Self {
        Self {
            current: Style::Reset,
        }
    }
}

impl StyleRun {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Style {
        self.current
    }

    pub fn push(&mut self, out: &mut String, style: Style, text: &str) {
        if style != self.current {
            out.push_str(style.marker());
            self.current = style;
        }
        out.push_str(text);
    }

    /// Text that does not care about the active style.
    pub fn push_plain(&mut self, out: &mut String, text: &str) {
        out.push_str(text);
    }

    /// Return the terminal to `Reset` if anything else is active.
    pub fn finish(&mut self, out: &mut String) {
        if self.current != Style::Reset {
            out.push_str(Style::Reset.marker());
            self.current = Style::Reset;
        }
    }
}
