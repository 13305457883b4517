//! One-off measurement of how long each queued app takes to render.

use std::time::Duration;

use crate::catalog::{AppCatalog, RenderSource};
use crate::render::Toolchain;

const PROFILE_PREFIX: &str = "100% of ";
const PROFILE_SUFFIX: &str = "ms total";

/// Extracts the total from a profiler report line such as
/// `100% of 1234ms total`.
pub fn parse_profile_total(output: &str) -> Option<Duration> {
    output.match_indices(PROFILE_PREFIX).find_map(|(pos, _)| {
        let rest = &output[pos + PROFILE_PREFIX.len()..];
        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 || !rest[digits..].starts_with(PROFILE_SUFFIX) {
            return None;
        }
        rest[..digits].parse::<u64>().ok().map(Duration::from_millis)
    })
}

/// Render cost of `source`, or zero when it cannot be determined.
pub async fn measure<T: Toolchain>(toolchain: &T, source: &RenderSource) -> Duration {
    let outcome = toolchain.profile(source).await;
    let Some(stdout) = outcome.stdout() else {
        tracing::warn!(
            source = %source.path.display(),
            %outcome,
            "profiling failed, assuming negligible render cost"
        );
        return Duration::ZERO;
    };

    match parse_profile_total(stdout) {
        Some(cost) => {
            tracing::debug!(source = %source.path.display(), ?cost, "measured render cost");
            cost
        }
        None => {
            tracing::warn!(
                source = %source.path.display(),
                "profile output has no total, assuming negligible render cost"
            );
            Duration::ZERO
        }
    }
}

/// Measured render cost per queue slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderTimeTable {
    costs: Vec<Duration>,
}

impl RenderTimeTable {
    pub fn from_costs(costs: Vec<Duration>) -> Self {
        Self { costs }
    }

    /// Profiles every queue slot in order.
    pub async fn measure<T: Toolchain>(toolchain: &T, catalog: &AppCatalog) -> Self {
        let mut costs = Vec::with_capacity(catalog.queue().len());
        for (_, app) in catalog.slots() {
            costs.push(measure(toolchain, &app.render_source).await);
        }
        Self { costs }
    }

    pub fn len(&self) -> usize {
        self.costs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.costs.is_empty()
    }

    /// Cost recorded for `slot`, zero when out of range.
    pub fn cost(&self, slot: usize) -> Duration {
        self.costs.get(slot).copied().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::path::Path;

    use crate::catalog::AppDefinition;
    use crate::config::AppEntry;
    use crate::device::DeviceHandle;
    use crate::process::CommandOutcome;

    #[test]
    fn parses_total_from_profile_report() {
        let report = "Showing nodes accounting for 40ms, 100% of 1250ms total\n  flat  flat%";
        assert_eq!(parse_profile_total(report), Some(Duration::from_millis(1250)));
    }

    #[test]
    fn ignores_near_misses() {
        assert_eq!(parse_profile_total("no profile here"), None);
        assert_eq!(parse_profile_total("100% of ms total"), None);
        assert_eq!(parse_profile_total("100% of 12s total"), None);
        assert_eq!(
            parse_profile_total("100% of 5s total, 100% of 75ms total"),
            Some(Duration::from_millis(75))
        );
    }

    struct ScriptedProfiler {
        replies: RefCell<Vec<CommandOutcome>>,
        calls: RefCell<Vec<String>>,
    }

    impl Toolchain for ScriptedProfiler {
        async fn devices(&self) -> CommandOutcome {
            CommandOutcome::NotFound
        }

        async fn profile(&self, source: &RenderSource) -> CommandOutcome {
            self.calls
                .borrow_mut()
                .push(source.path.display().to_string());
            self.replies.borrow_mut().remove(0)
        }

        async fn render(&self, _: &RenderSource, _: &Path) -> CommandOutcome {
            CommandOutcome::NotFound
        }

        async fn push(&self, _: &DeviceHandle, _: &Path) -> CommandOutcome {
            CommandOutcome::NotFound
        }
    }

    fn app(name: &str) -> AppDefinition {
        AppDefinition::from_entry(&AppEntry {
            name: name.to_string(),
            night_visible: true,
            display_secs: 10.0,
            repetitions: 1,
            star_file: format!("{name}.star"),
            args: String::new(),
            webp_file: format!("{name}.webp"),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn one_entry_per_slot_with_failures_as_zero() {
        let catalog = AppCatalog::new(vec![app("a"), app("b")], vec![0, 1, 0]).unwrap();
        let profiler = ScriptedProfiler {
            replies: RefCell::new(vec![
                CommandOutcome::Success {
                    stdout: "100% of 800ms total".to_string(),
                },
                CommandOutcome::Success {
                    stdout: "garbage".to_string(),
                },
                CommandOutcome::TimedOut(Duration::from_secs(1)),
            ]),
            calls: RefCell::new(Vec::new()),
        };

        let table = RenderTimeTable::measure(&profiler, &catalog).await;

        assert_eq!(table.len(), 3);
        assert_eq!(table.cost(0), Duration::from_millis(800));
        assert_eq!(table.cost(1), Duration::ZERO);
        assert_eq!(table.cost(2), Duration::ZERO);
        assert_eq!(*profiler.calls.borrow(), ["a.star", "b.star", "a.star"]);
    }
}
