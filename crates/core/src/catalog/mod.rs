//! Validated, immutable playlist: app definitions plus the queue of indices
//! that orders them.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::{positive_secs, AppConfig, AppEntry};
use crate::{PixcycleError, Result};

/// What the renderer is asked to run: a `.star` file and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSource {
    pub path: PathBuf,
    pub args: Vec<String>,
}

impl RenderSource {
    /// Splits `args` on whitespace, requiring every token to be `key=value`.
    pub fn parse(path: impl Into<PathBuf>, args: &str) -> Result<Self> {
        let path = path.into();
        let args = args
            .split_whitespace()
            .map(|token| match token.split_once('=') {
                Some((key, _)) if !key.is_empty() => Ok(token.to_string()),
                _ => Err(PixcycleError::config(format!(
                    "argument `{token}` for `{}` is not of the form key=value",
                    path.display()
                ))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { path, args })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppDefinition {
    pub name: String,
    pub night_visible: bool,
    pub display_duration: Duration,
    pub repetitions: u32,
    pub render_source: RenderSource,
    pub display_asset: PathBuf,
}

impl AppDefinition {
    pub fn from_entry(entry: &AppEntry) -> Result<Self> {
        if entry.name.trim().is_empty() {
            return Err(PixcycleError::config("app name must not be empty"));
        }
        if entry.repetitions == 0 {
            return Err(PixcycleError::config(format!(
                "app `{}` must repeat at least once",
                entry.name
            )));
        }
        let display_duration = positive_secs(
            &format!("{}.display_secs", entry.name),
            entry.display_secs,
        )?;

        Ok(Self {
            name: entry.name.clone(),
            night_visible: entry.night_visible,
            display_duration,
            repetitions: entry.repetitions,
            render_source: RenderSource::parse(&entry.star_file, &entry.args)?,
            display_asset: PathBuf::from(&entry.webp_file),
        })
    }

    /// Whether the app may be shown in a pass with the given day snapshot.
    pub fn is_visible(&self, is_daytime: bool) -> bool {
        self.night_visible || is_daytime
    }
}

/// Fixed apps and the order they are visited in.
#[derive(Debug, Clone)]
pub struct AppCatalog {
    apps: Vec<AppDefinition>,
    queue: Vec<usize>,
}

impl AppCatalog {
    pub fn new(apps: Vec<AppDefinition>, queue: Vec<usize>) -> Result<Self> {
        if let Some(&bad) = queue.iter().find(|&&idx| idx >= apps.len()) {
            return Err(PixcycleError::config(format!(
                "queue references app index {bad}, but only {} apps are defined",
                apps.len()
            )));
        }
        Ok(Self { apps, queue })
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let apps = config
            .apps
            .iter()
            .map(AppDefinition::from_entry)
            .collect::<Result<Vec<_>>>()?;
        Self::new(apps, config.queue.clone())
    }

    pub fn apps(&self) -> &[AppDefinition] {
        &self.apps
    }

    pub fn queue(&self) -> &[usize] {
        &self.queue
    }

    /// The app occupying queue position `slot`.
    pub fn app_at_slot(&self, slot: usize) -> Option<&AppDefinition> {
        self.queue.get(slot).map(|&idx| &self.apps[idx])
    }

    /// Iterates the queue in order, yielding each slot with its app.
    pub fn slots(&self) -> impl Iterator<Item = (usize, &AppDefinition)> + '_ {
        self.queue
            .iter()
            .enumerate()
            .map(|(slot, &idx)| (slot, &self.apps[idx]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> AppEntry {
        AppEntry {
            name: name.to_string(),
            night_visible: false,
            display_secs: 15.0,
            repetitions: 1,
            star_file: format!("./{name}.star"),
            args: String::new(),
            webp_file: format!("./{name}.webp"),
        }
    }

    #[test]
    fn builds_from_config() {
        let mut tides = entry("tides");
        tides.args = "station=9414290  units=metric".to_string();
        let config = AppConfig {
            apps: vec![entry("clock"), tides],
            queue: vec![1, 0, 1],
            scheduler: Default::default(),
        };

        let catalog = AppCatalog::from_config(&config).unwrap();
        assert_eq!(catalog.queue(), &[1, 0, 1]);
        assert_eq!(catalog.app_at_slot(1).unwrap().name, "clock");
        assert_eq!(
            catalog.apps()[1].render_source.args,
            vec!["station=9414290", "units=metric"]
        );
        let names: Vec<_> = catalog.slots().map(|(_, app)| app.name.as_str()).collect();
        assert_eq!(names, ["tides", "clock", "tides"]);
    }

    #[test]
    fn rejects_out_of_range_queue_index() {
        let apps = vec![AppDefinition::from_entry(&entry("clock")).unwrap()];
        let err = AppCatalog::new(apps, vec![0, 1]).unwrap_err();
        assert!(err.to_string().contains("index 1"));
    }

    #[test]
    fn empty_queue_is_allowed() {
        let catalog = AppCatalog::new(Vec::new(), Vec::new()).unwrap();
        assert_eq!(catalog.slots().count(), 0);
        assert!(catalog.app_at_slot(0).is_none());
    }

    #[test]
    fn rejects_invalid_entries() {
        let mut zero_reps = entry("clock");
        zero_reps.repetitions = 0;
        assert!(AppDefinition::from_entry(&zero_reps).is_err());

        let mut zero_duration = entry("clock");
        zero_duration.display_secs = 0.0;
        assert!(AppDefinition::from_entry(&zero_duration).is_err());

        let mut bad_args = entry("clock");
        bad_args.args = "units=metric =oops".to_string();
        let err = AppDefinition::from_entry(&bad_args).unwrap_err();
        assert!(err.to_string().contains("=oops"));
    }

    #[test]
    fn visibility_follows_mode_or_day() {
        let mut app = AppDefinition::from_entry(&entry("clock")).unwrap();
        assert!(app.is_visible(true));
        assert!(!app.is_visible(false));
        app.night_visible = true;
        assert!(app.is_visible(false));
    }
}
