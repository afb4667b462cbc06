use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry of a character's gaming history in a single bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub won: u32,
    pub lost: u32,
}

impl ActivityRecord {
    pub fn games(&self) -> u64 {
        u64::from(self.won) + u64::from(self.lost)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBucket {
    pub date: NaiveDate,
    pub records: Vec<ActivityRecord>,
    pub game_count: u64,
    pub won: u64,
    pub lost: u64,
    /// Heatmap shade, 0 (idle) to 4.
    pub level: u8,
}

impl DayBucket {
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            records: Vec::new(),
            game_count: 0,
            won: 0,
            lost: 0,
            level: 0,
        }
    }
}

/// Monday-first row of the heatmap. `None` marks a day outside the range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekRow {
    pub days: [Option<DayBucket>; 7],
}

impl WeekRow {
    pub fn empty() -> Self {
        Self {
            days: std::array::from_fn(|_| None),
        }
    }

    pub fn first_day(&self) -> Option<&DayBucket> {
        self.days.iter().flatten().next()
    }

    pub fn buckets(&self) -> impl Iterator<Item = &DayBucket> {
        self.days.iter().flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthSpan {
    pub year: i32,
    /// Zero-based month, January is 0.
    pub month: u32,
    pub label: String,
    pub week_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityHeatmap {
    pub range_start: NaiveDate,
    pub range_end: NaiveDate,
    pub weeks: Vec<WeekRow>,
    pub total_games: u64,
    pub max_intensity: u64,
    pub month_spans: Vec<MonthSpan>,
}

impl ActivityHeatmap {
    pub fn buckets(&self) -> impl Iterator<Item = &DayBucket> {
        self.weeks.iter().flat_map(|week| week.buckets())
    }
}

/// Which window of days a heatmap covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Selection {
    /// The last 365 days up to and including today.
    #[default]
    RollingYear,
    Year { year: i32 },
    Season { id: u32 },
    Custom { start: NaiveDate, end: NaiveDate },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonWindow {
    pub id: u32,
    pub name: String,
    pub short_name: String,
    pub expansion: String,
    pub start_date: NaiveDate,
    /// `None` while the season is still running.
    pub end_date: Option<NaiveDate>,
}

impl SeasonWindow {
    pub fn is_active(&self) -> bool {
        self.end_date.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CharacterHistory {
    #[serde(default)]
    pub brackets: BTreeMap<String, Vec<ActivityRecord>>,
    #[serde(default)]
    pub alts: Vec<String>,
}

impl CharacterHistory {
    pub fn record_count(&self) -> usize {
        self.brackets.values().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppData {
    #[serde(default)]
    pub characters: BTreeMap<String, CharacterHistory>,
}

impl AppData {
    pub fn character(&self, name: &str) -> Option<&CharacterHistory> {
        self.characters.get(&normalize_name(name))
    }

    pub fn record_count(&self) -> usize {
        self.characters.values().map(CharacterHistory::record_count).sum()
    }

    pub fn character_mut(&mut self, name: &str) -> &mut CharacterHistory {
        self.characters.entry(normalize_name(name)).or_default()
    }

    /// Every record of the character and its alts, across all brackets.
    /// Returns `None` when the character itself is unknown.
    pub fn flattened_history(&self, name: &str) -> Option<Vec<ActivityRecord>> {
        let main = self.character(name)?;
        let mut records: Vec<ActivityRecord> = main.brackets.values().flatten().copied().collect();
        for alt in &main.alts {
            if normalize_name(alt) == normalize_name(name) {
                continue;
            }
            if let Some(history) = self.character(alt) {
                records.extend(history.brackets.values().flatten().copied());
            }
        }
        Some(records)
    }
}

pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

#[derive(Debug, Deserialize)]
pub struct HeatmapRequest {
    #[serde(default)]
    pub records: Vec<ActivityRecord>,
    #[serde(default)]
    pub selection: Selection,
}

#[derive(Debug, Default, Deserialize)]
pub struct HeatmapQuery {
    pub year: Option<i32>,
    pub season: Option<u32>,
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct SeasonAtQuery {
    pub ts: i64,
}

#[derive(Debug, Deserialize)]
pub struct HistoryRequest {
    pub bracket: String,
    #[serde(default)]
    pub records: Vec<ActivityRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub character: String,
    pub bracket: String,
    pub added: usize,
    pub bracket_records: usize,
    pub total_records: usize,
}

#[derive(Debug, Deserialize)]
pub struct AltsRequest {
    pub alts: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AltsResponse {
    pub character: String,
    pub alts: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(timestamp: i64) -> ActivityRecord {
        ActivityRecord {
            timestamp,
            won: 1,
            lost: 1,
        }
    }

    #[test]
    fn flattened_history_merges_brackets_and_alts() {
        let mut data = AppData::default();
        let main = data.character_mut("Sammers");
        main.brackets.insert("2v2".into(), vec![record(1)]);
        main.brackets.insert("3v3".into(), vec![record(2), record(3)]);
        main.alts = vec!["Alt".into(), "missing".into()];
        data.character_mut("alt")
            .brackets
            .insert("shuffle".into(), vec![record(4)]);

        let records = data.flattened_history(" SAMMERS ").expect("known character");
        let mut stamps: Vec<i64> = records.iter().map(|r| r.timestamp).collect();
        stamps.sort();
        assert_eq!(stamps, vec![1, 2, 3, 4]);
    }

    #[test]
    fn record_count_spans_characters_and_brackets() {
        let mut data = AppData::default();
        data.character_mut("a").brackets.insert("2v2".into(), vec![record(1), record(2)]);
        data.character_mut("a").brackets.insert("3v3".into(), vec![record(3)]);
        data.character_mut("b").brackets.insert("shuffle".into(), vec![record(4)]);
        data.character_mut("c");

        assert_eq!(data.character("a").unwrap().record_count(), 3);
        assert_eq!(data.record_count(), 4);
    }

    #[test]
    fn flattened_history_unknown_character_is_none() {
        let data = AppData::default();
        assert!(data.flattened_history("nobody").is_none());
    }

    #[test]
    fn selection_defaults_to_rolling_year() {
        let request: HeatmapRequest = serde_json::from_str(r#"{"records": []}"#).unwrap();
        assert_eq!(request.selection, Selection::RollingYear);

        let request: HeatmapRequest =
            serde_json::from_str(r#"{"selection": {"mode": "year", "year": 2024}}"#).unwrap();
        assert_eq!(request.selection, Selection::Year { year: 2024 });
    }
}
