use crate::config::ReportConfig;
use crate::error::TallyError;
use crate::log::{LogFilter, RequestLog};
use crate::registry::RouteRegistry;
use crate::window::DateWindow;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Usage for one billing window: the flat total plus the per-pattern
/// breakdown over resolved trackable routes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowUsage {
    pub window: DateWindow,
    pub total: u64,
    pub usage: BTreeMap<String, u64>,
}

/// Current vs. previous billing-cycle usage for one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageReport {
    pub current: WindowUsage,
    pub previous: WindowUsage,
}

/// Computes usage reports over the request log.
///
/// Read-only and idempotent: one invocation filters the log once per
/// window/pattern predicate and never mutates anything. All knobs come
/// from the [`ReportConfig`] handed in at construction.
pub struct UsageAggregator {
    config: ReportConfig,
    registry: Arc<RouteRegistry>,
    log: Arc<dyn RequestLog>,
}

impl UsageAggregator {
    pub fn new(config: ReportConfig, registry: Arc<RouteRegistry>, log: Arc<dyn RequestLog>) -> Self {
        Self { config, registry, log }
    }

    /// Full report: per-pattern counts and totals for the month containing
    /// `today` and the month before it. `host` is the serving host the
    /// caller hit; it only matters when site restriction is on.
    ///
    /// Fails with [`TallyError::Configuration`] when no route tree has been
    /// registered at all; zero matching log entries is an ordinary report
    /// full of zeros.
    pub fn report(&self, user: &str, host: &str, today: NaiveDate) -> Result<UsageReport, TallyError> {
        if self.registry.route_count() == 0 {
            return Err(TallyError::Configuration(
                "no routes registered; cannot resolve usage patterns".to_string(),
            ));
        }

        let patterns = self.registry.patterns();
        let filter = self.filter_for(user, host);

        let current_window = DateWindow::containing(today, 0);
        let previous_window = DateWindow::containing(today, -1);

        let mut report = UsageReport {
            current: WindowUsage {
                window: current_window,
                total: self.log.count(&filter, Some(&current_window), None),
                usage: BTreeMap::new(),
            },
            previous: WindowUsage {
                window: previous_window,
                total: self.log.count(&filter, Some(&previous_window), None),
                usage: BTreeMap::new(),
            },
        };

        for pattern in patterns.iter() {
            // A route's own method list narrows which entries count
            // toward its pattern; a disjoint allow-list means zero.
            let (current, previous) = match pattern.effective_methods(&filter.methods) {
                Some(methods) => {
                    let scoped = LogFilter { methods, ..filter.clone() };
                    (
                        self.log.count(&scoped, Some(&current_window), Some(&pattern.regex)),
                        self.log.count(&scoped, Some(&previous_window), Some(&pattern.regex)),
                    )
                }
                None => (0, 0),
            };
            report.current.usage.insert(pattern.path.clone(), current);
            report.previous.usage.insert(pattern.path.clone(), previous);
        }

        debug!(
            user = %user,
            patterns = patterns.len(),
            current_total = report.current.total,
            previous_total = report.previous.total,
            "Usage report computed"
        );
        Ok(report)
    }

    /// Flat variant: `(current, previous)` totals with no breakdown.
    pub fn summary(&self, user: &str, host: &str, today: NaiveDate) -> (u64, u64) {
        let filter = self.filter_for(user, host);
        let current_window = DateWindow::containing(today, 0);
        let previous_window = DateWindow::containing(today, -1);
        (
            self.log.count(&filter, Some(&current_window), None),
            self.log.count(&filter, Some(&previous_window), None),
        )
    }

    fn filter_for(&self, user: &str, host: &str) -> LogFilter {
        LogFilter {
            user: user.to_string(),
            host: self
                .config
                .restrict_to_current_site
                .then(|| host.to_string()),
            methods: self.config.allowed_methods.clone(),
        }
    }
}
