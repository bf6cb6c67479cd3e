//! Presentation-level configuration
//!
//! Controls how a mirror run is laid out on the terminal.

/// How the original and challenger answers are placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layout {
    /// Two columns, printed once both answers are complete
    #[default]
    SideBySide,
    /// One section after the other, the original streamed live
    Stacked,
}

/// Output configuration for the presentation layer
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub layout: Layout,
    pub show_token_counts: bool,
    pub show_latency: bool,
    /// Show spinners while classifying and judging
    pub show_progress: bool,
    /// Total terminal width used for side-by-side columns
    pub width: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            show_token_counts: false,
            show_latency: true,
            show_progress: true,
            width: 100,
        }
    }
}

impl OutputConfig {
    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }
}
