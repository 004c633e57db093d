use chrono::Weekday;
use serde::{Deserialize, Serialize};

/// Completion status of an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemStatus {
    Pending,
    Done,
}

impl ItemStatus {
    /// Parse status from its stored tag like "pending"
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    /// Convert status to its stored tag
    pub fn to_tag(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

/// Lifecycle status of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectStatus {
    Pending,
    Done,
    /// Never completes (areas of responsibility like "Health")
    Permanent,
}

impl ProjectStatus {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag.to_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "done" => Some(Self::Done),
            "permanent" => Some(Self::Permanent),
            _ => None,
        }
    }

    pub fn to_tag(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Permanent => "permanent",
        }
    }
}

/// First day of the displayed week
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    Monday,
    Sunday,
}

impl WeekStart {
    pub fn weekday(&self) -> Weekday {
        match self {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WeekStart::Monday => "Monday",
            WeekStart::Sunday => "Sunday",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "monday" | "mon" => Some(WeekStart::Monday),
            "sunday" | "sun" => Some(WeekStart::Sunday),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            WeekStart::Monday => WeekStart::Sunday,
            WeekStart::Sunday => WeekStart::Monday,
        }
    }
}

/// Direction for moving an item inside its column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderDirection {
    Up,
    Down,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_status_tags() {
        assert_eq!(ItemStatus::from_tag("pending"), Some(ItemStatus::Pending));
        assert_eq!(ItemStatus::from_tag("DONE"), Some(ItemStatus::Done));
        assert_eq!(ItemStatus::from_tag("archived"), None);
        assert_eq!(ItemStatus::Done.to_tag(), "done");
    }

    #[test]
    fn test_project_status_tags() {
        assert_eq!(
            ProjectStatus::from_tag("permanent"),
            Some(ProjectStatus::Permanent)
        );
        assert_eq!(ProjectStatus::Pending.to_tag(), "pending");
        assert_eq!(ProjectStatus::from_tag(""), None);
    }

    #[test]
    fn test_week_start_names() {
        assert_eq!(WeekStart::from_name("Mon"), Some(WeekStart::Monday));
        assert_eq!(WeekStart::from_name("sunday"), Some(WeekStart::Sunday));
        assert_eq!(WeekStart::from_name("friday"), None);
        assert_eq!(WeekStart::Monday.toggled(), WeekStart::Sunday);
        assert_eq!(WeekStart::Sunday.weekday(), Weekday::Sun);
    }
}
