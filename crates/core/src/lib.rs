//! Core library for Pixcycle.
//!
//! Pixcycle cycles a pixel display through a fixed playlist of apps. Each app
//! is rendered by an external toolchain into an image, pushed to the device
//! and left on screen for its display duration, shortened by the measured
//! render cost of the next app so that transitions stay close to the target
//! cadence. Apps that are not night-visible are only shown inside the
//! configured day window.

pub mod catalog;
pub mod config;
pub mod daynight;
pub mod device;
pub mod error;
pub mod probe;
pub mod process;
pub mod render;
pub mod timeline;

pub use catalog::{AppCatalog, AppDefinition, RenderSource};
pub use config::{AppConfig, AppEntry, SchedulerSettings};
pub use daynight::{is_daytime, DayWindow};
pub use device::{resolve_device, DeviceHandle};
pub use error::{PixcycleError, Result};
pub use probe::RenderTimeTable;
pub use process::CommandOutcome;
pub use render::{PixletToolchain, Toolchain};
pub use timeline::{Pacing, PassReport, PlaybackClock, PlaybackScheduler, SystemClock};
