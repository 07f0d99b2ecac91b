#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Progress and logging glue for the fuel map binaries.
//!
//! The long stages (reading tract extracts, rasterizing scanlines) report
//! through the [`ProgressCallback`] trait; this crate provides the
//! `indicatif` bars behind it and wires the global logger through
//! `indicatif-log-bridge` so log lines print above live bars instead of
//! tearing them.

use std::sync::Arc;
use std::time::Duration;

use fuel_map_classify::progress::ProgressCallback;
use indicatif::{ProgressBar, ProgressStyle};

pub use indicatif::MultiProgress;

/// Bridges an `indicatif` bar to [`ProgressCallback`].
pub struct IndicatifProgress {
    bar: ProgressBar,
    /// Applied once `set_total` learns the workload size.
    sized_style: ProgressStyle,
}

impl IndicatifProgress {
    /// Spinner that becomes a row-count bar once the reader knows how many
    /// tract rows the extract holds.
    #[must_use]
    pub fn rows_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        Self::deferred(
            multi,
            message,
            "{spinner:.cyan} {msg}",
            "  {msg} {wide_bar:.cyan/dim} {human_pos}/{human_len} rows [{eta}]",
        )
    }

    /// Spinner that becomes a scanline throughput bar once the raster
    /// height is known.
    #[must_use]
    pub fn raster_bar(multi: &MultiProgress, message: &str) -> Arc<dyn ProgressCallback> {
        Self::deferred(
            multi,
            message,
            "{spinner:.magenta} {msg}",
            "  {msg} {wide_bar:.magenta/dim} {percent}% {per_sec} [{eta}]",
        )
    }

    /// Fixed-length bar over the survey years of a full run.
    #[must_use]
    pub fn years_bar(multi: &MultiProgress, total: u64) -> Arc<dyn ProgressCallback> {
        let style =
            ProgressStyle::with_template("{msg} {wide_bar:.green/dim} {pos}/{len} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-");
        let bar = multi.add(ProgressBar::new(total));
        bar.set_style(style.clone());
        bar.set_message("Years");

        Arc::new(Self {
            bar,
            sized_style: style,
        })
    }

    fn deferred(
        multi: &MultiProgress,
        message: &str,
        spinner_template: &str,
        bar_template: &str,
    ) -> Arc<dyn ProgressCallback> {
        let bar = multi.add(ProgressBar::new_spinner());
        bar.enable_steady_tick(Duration::from_millis(100));
        bar.set_style(
            ProgressStyle::with_template(spinner_template)
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message.to_string());

        let sized_style = ProgressStyle::with_template(bar_template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-");

        Arc::new(Self { bar, sized_style })
    }
}

impl ProgressCallback for IndicatifProgress {
    fn set_total(&self, total: u64) {
        self.bar.set_length(total);
        self.bar.set_position(0);
        self.bar.set_style(self.sized_style.clone());
    }

    fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    fn set_message(&self, msg: String) {
        self.bar.set_message(msg);
    }

    fn finish(&self, msg: String) {
        self.bar.finish_with_message(msg);
    }

    fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

/// Initializes the global logger wrapped in `indicatif-log-bridge`.
///
/// Returns the [`MultiProgress`] every bar must be added to; bars created
/// outside it fight the logger for the terminal.
#[must_use]
pub fn init_logger() -> MultiProgress {
    let logger = pretty_env_logger::formatted_builder()
        .parse_env("RUST_LOG")
        .build();
    let level = logger.filter();

    let multi = MultiProgress::new();
    // Repeat initialization (tests) leaves the existing logger in place.
    let _ = indicatif_log_bridge::LogWrapper::new(multi.clone(), logger).try_init();
    log::set_max_level(level);

    multi
}
