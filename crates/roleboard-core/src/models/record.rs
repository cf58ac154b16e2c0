//! Session record model: one roleplay attempt by one player

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::month::Month;

/// Number of positional columns in a training CSV row
pub const CSV_COLUMNS: usize = 11;

/// Column order of the training CSV (header row is skipped, not read)
pub const CSV_HEADER: [&str; CSV_COLUMNS] = [
    "date",
    "org",
    "account",
    "group",
    "player",
    "category",
    "level",
    "lesson",
    "score",
    "speechTime",
    "playTime",
];

/// One training-session observation
///
/// Immutable once ingested. `date` is always valid: rows whose date
/// cannot be parsed never become records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub date: NaiveDateTime,
    pub org: String,
    pub account: String,
    pub group: String,
    pub player: String,
    pub category: String,
    pub level: i64,
    pub lesson: String,
    pub score: i64,
    /// Seconds
    pub speech_time: f64,
    /// Seconds or minutes, depending on the exporting system
    pub play_time: f64,
}

impl SessionRecord {
    /// Key of this record's leaf in the lesson hierarchy
    pub fn lesson_key(&self) -> String {
        lesson_key(&self.category, self.level, &self.lesson)
    }

    /// Key of this record's leaf in the player hierarchy
    pub fn player_key(&self) -> String {
        player_key(&self.org, &self.account, &self.group, &self.player)
    }

    /// Calendar month of the record date
    pub fn month(&self) -> Month {
        Month::of(&self.date)
    }
}

/// Display label for a level node, e.g. `Lv.2`
pub fn level_label(level: i64) -> String {
    format!("Lv.{}", level)
}

/// `category|Lv.level|lesson`
pub fn lesson_key(category: &str, level: i64, lesson: &str) -> String {
    format!("{}|{}|{}", category, level_label(level), lesson)
}

/// `org|account|group|player`
pub fn player_key(org: &str, account: &str, group: &str, player: &str) -> String {
    format!("{}|{}|{}|{}", org, account, group, player)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn record() -> SessionRecord {
        SessionRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_opt(14, 5, 0)
                .unwrap(),
            org: "Acme".to_string(),
            account: "East".to_string(),
            group: "Team A".to_string(),
            player: "Sato".to_string(),
            category: "Sales".to_string(),
            level: 2,
            lesson: "Cold call".to_string(),
            score: 82,
            speech_time: 95.5,
            play_time: 4.0,
        }
    }

    #[test]
    fn test_keys() {
        let r = record();
        assert_eq!(r.lesson_key(), "Sales|Lv.2|Cold call");
        assert_eq!(r.player_key(), "Acme|East|Team A|Sato");
    }

    #[test]
    fn test_keys_with_empty_components() {
        assert_eq!(player_key("", "", "", "Ito"), "|||Ito");
        assert_eq!(lesson_key("", 1, ""), "|Lv.1|");
    }

    #[test]
    fn test_record_month() {
        assert_eq!(record().month().to_string(), "2024-03");
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_string(&record()).unwrap();
        assert!(json.contains("\"speechTime\":95.5"));
        assert!(json.contains("\"playTime\":4.0"));
    }
}
