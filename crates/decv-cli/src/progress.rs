//! Best-effort progress display on stderr.
//!
//! Drawing never touches stdout, so records stay byte-identical whether or
//! not a bar is shown.

use indicatif::{ProgressBar, ProgressStyle};

const BAR_TEMPLATE: &str = "{prefix:.green.bold} [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})";
const SPINNER_TEMPLATE: &str = "{spinner:.cyan} {prefix:.green.bold} {pos} records ({per_sec})";

pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    /// A bar towards a known total, or a hidden one when `visible` is false.
    pub fn bar(total: u64, prefix: &'static str, visible: bool) -> anyhow::Result<Self> {
        if !visible {
            return Ok(Self::hidden());
        }
        let style = ProgressStyle::default_bar()
            .template(BAR_TEMPLATE)?
            .progress_chars("=> ");
        Ok(Self {
            bar: ProgressBar::new(total).with_style(style).with_prefix(prefix),
        })
    }

    /// A spinner for an unknown total.
    pub fn spinner(prefix: &'static str, visible: bool) -> anyhow::Result<Self> {
        if !visible {
            return Ok(Self::hidden());
        }
        let style = ProgressStyle::default_spinner().template(SPINNER_TEMPLATE)?;
        Ok(Self {
            bar: ProgressBar::new_spinner().with_style(style).with_prefix(prefix),
        })
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn set_position(&self, done: u64) {
        self.bar.set_position(done);
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }
}
