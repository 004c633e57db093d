use super::Planner;
use crate::domain::{Column, ItemStatus};
use crate::error::PlannerResult;
use crate::persistence::repo::{self, ItemFilter, ItemOrder};
use chrono::{NaiveDate, Utc};

impl Planner {
    /// Carry every overdue pending item forward to `today`, appended below
    /// today's pending items in their existing relative order. Backlog and
    /// done items are left alone. Returns how many items moved.
    pub fn rollover(&mut self, today: NaiveDate) -> PlannerResult<usize> {
        let moved = self.store.with_tx(|tx| {
            let overdue =
                repo::query_items(tx, &[ItemFilter::OverdueBefore(today)], ItemOrder::Rollover)?;
            if overdue.is_empty() {
                return Ok(0);
            }

            let base = repo::max_order_index(tx, Column::Day(today), Some(ItemStatus::Pending))?
                .unwrap_or(-1);
            let now = Utc::now();
            let count = overdue.len();

            for (offset, mut item) in overdue.into_iter().enumerate() {
                item.scheduled_for = Some(today);
                item.order_index = base + 1 + offset as i64;
                item.updated_at = now;
                repo::update_item_fields(tx, &item)?;
            }
            Ok(count)
        })?;

        if moved > 0 {
            tracing::info!(count = moved, %today, "rolled overdue items forward");
        }
        Ok(moved)
    }

    /// Startup hook: roll over to the planner's today when enabled
    pub fn auto_rollover(&mut self) -> PlannerResult<usize> {
        if !self.config.auto_rollover {
            tracing::debug!("auto rollover disabled");
            return Ok(0);
        }
        self.rollover(self.today)
    }
}
