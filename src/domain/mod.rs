pub mod config;
pub mod enums;
pub mod item;
pub mod week;

pub use config::Config;
pub use enums::{ItemStatus, ProjectStatus, ReorderDirection, WeekStart};
pub use item::{Column, Item, ItemPatch, Project, Stats, Target, Workspace, BACKLOG_COLUMNS};
pub use week::{day_label, parse_schedule, week_days, week_label};
