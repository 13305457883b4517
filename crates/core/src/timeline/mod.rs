//! The playback loop: walks the queue forever, gating apps on day/night,
//! rendering and pushing them, and sleeping between transitions.

use std::time::Duration;

use chrono::{Local, NaiveDateTime};
use tokio_util::sync::CancellationToken;

use crate::catalog::{AppCatalog, AppDefinition};
use crate::config::AppConfig;
use crate::daynight::{is_daytime, DayWindow};
use crate::device::{resolve_device, DeviceHandle};
use crate::probe::RenderTimeTable;
use crate::render::Toolchain;
use crate::{PixcycleError, Result};

/// Source of wall-clock time and of waiting.
#[allow(async_fn_in_trait)]
pub trait PlaybackClock {
    /// Local wall-clock time.
    fn now(&self) -> NaiveDateTime;

    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl PlaybackClock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Validated timing knobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub min_sleep: Duration,
    pub idle: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            min_sleep: Duration::from_secs(1),
            idle: Duration::from_secs(30),
        }
    }
}

/// Display duration shortened by the upcoming render cost, never below
/// `min_sleep`.
pub fn compensated_sleep(display: Duration, next_cost: Duration, min_sleep: Duration) -> Duration {
    display.saturating_sub(next_cost).max(min_sleep)
}

/// What happened during one pass over the queue.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PassReport {
    pub is_daytime: bool,
    pub shown: usize,
    pub skipped: usize,
    pub render_failures: usize,
    pub push_failures: usize,
    pub cancelled: bool,
}

pub struct PlaybackScheduler<T, C> {
    catalog: AppCatalog,
    render_times: RenderTimeTable,
    device: DeviceHandle,
    window: DayWindow,
    pacing: Pacing,
    toolchain: T,
    clock: C,
}

impl<T: Toolchain, C: PlaybackClock> PlaybackScheduler<T, C> {
    pub fn new(
        catalog: AppCatalog,
        render_times: RenderTimeTable,
        device: DeviceHandle,
        window: DayWindow,
        pacing: Pacing,
        toolchain: T,
        clock: C,
    ) -> Result<Self> {
        if render_times.len() != catalog.queue().len() {
            return Err(PixcycleError::config(format!(
                "render time table has {} entries for a queue of {} slots",
                render_times.len(),
                catalog.queue().len()
            )));
        }
        if pacing.min_sleep.is_zero() || pacing.idle.is_zero() {
            return Err(PixcycleError::config("sleep durations must be positive"));
        }

        Ok(Self {
            catalog,
            render_times,
            device,
            window,
            pacing,
            toolchain,
            clock,
        })
    }

    /// Validates `config`, resolves the device and profiles every queue slot
    /// once. Fails only when the configuration is invalid or the device
    /// cannot be found.
    pub async fn bootstrap(
        config: &AppConfig,
        device_name: &str,
        window: DayWindow,
        toolchain: T,
        clock: C,
    ) -> Result<Self> {
        let catalog = AppCatalog::from_config(config)?;
        let pacing = Pacing {
            min_sleep: config.scheduler.min_sleep()?,
            idle: config.scheduler.idle()?,
        };

        let device = resolve_device(&toolchain, device_name).await?;

        for app in catalog.apps() {
            tracing::debug!(?app, "catalog entry");
        }
        tracing::debug!(queue = ?catalog.queue(), "playback queue");

        let render_times = RenderTimeTable::measure(&toolchain, &catalog).await;
        tracing::info!(
            %device,
            slots = render_times.len(),
            "render costs measured, starting playback"
        );

        Self::new(catalog, render_times, device, window, pacing, toolchain, clock)
    }

    pub fn catalog(&self) -> &AppCatalog {
        &self.catalog
    }

    pub fn render_times(&self) -> &RenderTimeTable {
        &self.render_times
    }

    pub fn device(&self) -> &DeviceHandle {
        &self.device
    }

    /// Sleep after showing the app in `slot`, compensating for the render
    /// cost of the slot that follows it.
    pub fn sleep_after(&self, slot: usize, app: &AppDefinition) -> Duration {
        let next_slot = (slot + 1) % self.catalog.queue().len().max(1);
        let next_cost = self.render_times.cost(next_slot);
        compensated_sleep(app.display_duration, next_cost, self.pacing.min_sleep)
    }

    /// Runs passes until `cancel` fires.
    pub async fn run(&self, cancel: &CancellationToken) {
        while !cancel.is_cancelled() {
            let daytime = is_daytime(self.clock.now(), &self.window);
            let report = self.run_pass(daytime, cancel).await;
            tracing::info!(?report, "pass complete");

            if report.cancelled {
                break;
            }
            if report.shown == 0 {
                tracing::debug!(idle = ?self.pacing.idle, "nothing shown this pass, idling");
                if self.sleep_or_cancel(self.pacing.idle, cancel).await {
                    break;
                }
            }
        }
        tracing::info!("playback stopped");
    }

    /// One traversal of the queue using a fixed day/night snapshot.
    pub async fn run_pass(&self, is_daytime: bool, cancel: &CancellationToken) -> PassReport {
        let mut report = PassReport {
            is_daytime,
            ..PassReport::default()
        };

        for (slot, app) in self.catalog.slots() {
            if cancel.is_cancelled() {
                report.cancelled = true;
                return report;
            }
            if !app.is_visible(is_daytime) {
                tracing::debug!(slot, app = %app.name, "day-only app skipped at night");
                report.skipped += 1;
                continue;
            }

            report.shown += 1;
            for repetition in 1..=app.repetitions {
                tracing::debug!(slot, app = %app.name, repetition, "displaying app");
                self.display(app, &mut report).await;

                let pause = self.sleep_after(slot, app);
                tracing::debug!(slot, app = %app.name, ?pause, "sleeping");
                if self.sleep_or_cancel(pause, cancel).await {
                    report.cancelled = true;
                    return report;
                }
            }
        }

        report
    }

    async fn display(&self, app: &AppDefinition, report: &mut PassReport) {
        let rendered = self
            .toolchain
            .render(&app.render_source, &app.display_asset)
            .await;
        if !rendered.is_success() {
            tracing::error!(app = %app.name, outcome = %rendered, "render failed");
            report.render_failures += 1;
        }

        let pushed = self.toolchain.push(&self.device, &app.display_asset).await;
        if !pushed.is_success() {
            tracing::error!(app = %app.name, device = %self.device, outcome = %pushed, "push failed");
            report.push_failures += 1;
        }
    }

    /// Returns true when cancelled before `duration` elapsed.
    async fn sleep_or_cancel(&self, duration: Duration, cancel: &CancellationToken) -> bool {
        tokio::select! {
            _ = self.clock.sleep(duration) => false,
            _ = cancel.cancelled() => true,
        }
    }
}
