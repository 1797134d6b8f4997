use terminal_size::{Height, Width, terminal_size};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminalSize {
    pub width: usize,
    pub height: usize,
}

impl TerminalSize {
    /// Used whenever the real size cannot be queried (pipes, CI, no tty).
    pub const DEFAULT: TerminalSize = TerminalSize {
        width: 80,
        height: 24,
    };

    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Query the controlling terminal, falling back to [`TerminalSize::DEFAULT`].
    pub fn detect() -> Self {
        match terminal_size() {
            Some((Width(w), Height(h))) if w > 0 && h > 0 => {
                let size = Self::new(w as usize, h as usize);
                tracing::debug!(width = size.width, height = size.height, "terminal dimensions");
                size
            }
            _ => {
                tracing::warn!(
                    width = Self::DEFAULT.width,
                    height = Self::DEFAULT.height,
                    "terminal size unavailable, using default"
                );
                Self::DEFAULT
            }
        }
    }
}
