//! Note entity and date helpers

use chrono::{Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Suffix appended to the title of a duplicated note
pub const COPY_SUFFIX: &str = " (Copy)";

/// Date format used for calendar lookups
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A single note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Repository id; 0 until the note is first inserted
    pub id: i64,

    pub title: String,

    pub content: String,

    /// Category the note is filed under (matches a tab category)
    pub category: String,

    /// Creation date in epoch millis
    pub date: i64,

    /// Background color, packed RGB
    pub color: u32,

    /// `yyyy-MM-dd` of `date` in local time
    pub date_string: String,
}

impl Note {
    /// Id of a note the repository has not seen yet
    pub const UNASSIGNED_ID: i64 = 0;

    /// Create an unsaved note
    pub fn new(
        title: impl Into<String>,
        content: impl Into<String>,
        category: impl Into<String>,
        date: i64,
        color: u32,
    ) -> Self {
        Self {
            id: Self::UNASSIGNED_ID,
            title: title.into(),
            content: content.into(),
            category: category.into(),
            date,
            color,
            date_string: date_string(date),
        }
    }

    /// Whether the repository has assigned an id yet
    pub fn is_new(&self) -> bool {
        self.id == Self::UNASSIGNED_ID
    }

    /// Change the date and keep `date_string` in sync
    pub fn set_date(&mut self, date: i64) {
        self.date = date;
        self.date_string = date_string(date);
    }

    /// Copy of this note ready to be inserted as a new one
    pub fn duplicate(&self, now: i64) -> Self {
        let mut copy = self.clone();
        copy.id = Self::UNASSIGNED_ID;
        copy.title.push_str(COPY_SUFFIX);
        copy.set_date(now);
        copy
    }
}

/// Current time in epoch millis
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Format epoch millis as a local `yyyy-MM-dd` string
pub fn date_string(millis: i64) -> String {
    match Local.timestamp_millis_opt(millis).single() {
        Some(dt) => dt.format(DATE_FORMAT).to_string(),
        None => {
            log::warn!("Timestamp {} out of range, using epoch date", millis);
            "1970-01-01".to_string()
        }
    }
}
