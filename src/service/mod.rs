//! Planner operations. This is the only layer that writes to the store.

pub mod hierarchy;
pub mod items;
pub mod resolver;
pub mod rollover;

#[cfg(test)]
mod properties;

pub use items::ListFilter;

use crate::domain::Config;
use crate::error::PlannerResult;
use crate::persistence::{load_config, save_config, Store};
use chrono::NaiveDate;

/// Domain service over one store. `today` and the settings are explicit
/// values so callers (and tests) decide what "now" means.
pub struct Planner {
    store: Store,
    today: NaiveDate,
    config: Config,
}

impl Planner {
    /// Build a planner, reading the stored settings
    pub fn new(store: Store, today: NaiveDate) -> PlannerResult<Self> {
        let config = load_config(store.conn())?;
        Ok(Self::with_config(store, today, config))
    }

    /// Build a planner with caller supplied settings (nothing is written)
    pub fn with_config(store: Store, today: NaiveDate, config: Config) -> Self {
        Self {
            store,
            today,
            config,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Advance the planner's notion of today (midnight tick)
    pub fn set_today(&mut self, today: NaiveDate) {
        self.today = today;
    }

    pub fn config(&self) -> Config {
        self.config
    }

    /// Persist new settings
    pub fn update_config(&mut self, config: Config) -> PlannerResult<Config> {
        save_config(self.store.conn(), &config)?;
        self.config = config;
        tracing::info!(
            week_start = config.week_start.name(),
            auto_rollover = config.auto_rollover,
            "settings updated"
        );
        Ok(config)
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &Store {
        &self.store
    }
}
