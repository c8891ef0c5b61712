//! Stage spinner for long-running steps.
//!
//! A run spends almost all of its time waiting on `git` and `protoc`. The
//! [`StageSpinner`] shows which stage is active on an interactive terminal.
//! It is hidden when progress is disabled (`--no-progress` or
//! `PROTOBUILD_NO_PROGRESS`) or when stderr is not a terminal, so logs and
//! captured output stay clean.

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::ffi::OsStr;
use std::io::IsTerminal;
use std::time::Duration;

/// Environment variable that disables every spinner when set to a truthy value.
pub const NO_PROGRESS_ENV: &str = "PROTOBUILD_NO_PROGRESS";

/// Same reading as clap's `FalseyValueParser`, which parses the `--no-progress` flag.
fn is_truthy(value: Option<&OsStr>) -> bool {
    value.and_then(OsStr::to_str).is_some_and(|v| {
        !matches!(v.to_ascii_lowercase().as_str(), "" | "0" | "false" | "no" | "off" | "n" | "f")
    })
}

fn is_progress_disabled() -> bool {
    is_truthy(std::env::var_os(NO_PROGRESS_ENV).as_deref()) || !std::io::stderr().is_terminal()
}

fn spinner_style() -> IndicatifStyle {
    IndicatifStyle::default_spinner()
        .template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| IndicatifStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
}

/// A single-line spinner whose message names the current stage.
#[derive(Clone)]
pub struct StageSpinner {
    inner: IndicatifBar,
}

impl StageSpinner {
    /// Creates a spinner; `enabled = false` (or a disabled environment) yields a hidden one.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        let bar = if !enabled || is_progress_disabled() {
            IndicatifBar::hidden()
        } else {
            let bar = IndicatifBar::new_spinner();
            bar.set_style(spinner_style());
            bar.enable_steady_tick(Duration::from_millis(100));
            bar
        };
        Self {
            inner: bar,
        }
    }

    /// A spinner that never draws.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            inner: IndicatifBar::hidden(),
        }
    }

    pub fn stage(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }
}
