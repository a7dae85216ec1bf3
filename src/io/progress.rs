//! Console rendering of engine progress events
//!
//! The engine emits `(percent, label)` pairs; this adapter maps them onto
//! a single indicatif bar whose draw rate is capped so rapid placement
//! updates never spam the terminal.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::LazyLock;

// A few redraws per second is plenty for a 0-100 percent bar
const DRAW_RATE_HZ: u8 = 5;

static STAGE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>3}% {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

/// Progress bar tracking a generation run from 0 to 100 percent
#[derive(Clone)]
pub struct ConsoleProgress {
    bar: ProgressBar,
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleProgress {
    /// Create a rate-limited percent bar on stderr
    pub fn new() -> Self {
        let bar = ProgressBar::with_draw_target(
            Some(100),
            ProgressDrawTarget::stderr_with_hz(DRAW_RATE_HZ),
        );
        bar.set_style(STAGE_STYLE.clone());
        Self { bar }
    }

    /// Apply one engine progress event
    pub fn update(&self, percent: u8, label: &str) {
        self.bar.set_position(u64::from(percent));
        self.bar.set_message(label.to_string());
    }

    /// Remove the bar from the terminal
    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
