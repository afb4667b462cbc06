//! Static catalog of rated PvP seasons and timestamp lookups against it.
//!
//! Catalog order is newest first. When one season ends on the day the next
//! starts, the shared midnight belongs to the newer season, since lookups
//! return the first match in catalog order.

use crate::errors::CatalogError;
use crate::models::SeasonWindow;
use chrono::{NaiveDate, NaiveTime, Utc};
use once_cell::sync::Lazy;
use std::collections::HashSet;

type Ymd = (i32, u32, u32);

const WOW_SEASONS: &[(u32, &str, &str, &str, Ymd, Option<Ymd>)] = &[
    (40, "The War Within Season 3", "TWW S3", "The War Within", (2025, 8, 12), None),
    (39, "The War Within Season 2", "TWW S2", "The War Within", (2025, 3, 4), Some((2025, 8, 4))),
    (38, "The War Within Season 1", "TWW S1", "The War Within", (2024, 9, 10), Some((2025, 2, 25))),
    (37, "Dragonflight Season 4", "DF S4", "Dragonflight", (2024, 4, 23), Some((2024, 7, 22))),
    (36, "Dragonflight Season 3", "DF S3", "Dragonflight", (2023, 11, 14), Some((2024, 4, 22))),
    (35, "Dragonflight Season 2", "DF S2", "Dragonflight", (2023, 5, 9), Some((2023, 11, 7))),
    (34, "Dragonflight Season 1", "DF S1", "Dragonflight", (2022, 12, 13), Some((2023, 5, 1))),
    (33, "Shadowlands Season 4", "SL S4", "Shadowlands", (2022, 8, 2), Some((2022, 10, 25))),
    (32, "Shadowlands Season 3", "SL S3", "Shadowlands", (2022, 3, 1), Some((2022, 8, 1))),
    (31, "Shadowlands Season 2", "SL S2", "Shadowlands", (2021, 7, 6), Some((2022, 2, 21))),
    (30, "Shadowlands Season 1", "SL S1", "Shadowlands", (2020, 12, 8), Some((2021, 6, 28))),
    (29, "Battle for Azeroth Season 4", "BfA S4", "Battle for Azeroth", (2020, 1, 21), Some((2020, 10, 13))),
    (28, "Battle for Azeroth Season 3", "BfA S3", "Battle for Azeroth", (2019, 7, 9), Some((2020, 1, 14))),
    (27, "Battle for Azeroth Season 2", "BfA S2", "Battle for Azeroth", (2019, 1, 22), Some((2019, 6, 25))),
    (26, "Battle for Azeroth Season 1", "BfA S1", "Battle for Azeroth", (2018, 9, 4), Some((2019, 1, 22))),
    (25, "Legion Season 7", "Legion S7", "Legion", (2018, 3, 20), Some((2018, 7, 17))),
    (24, "Legion Season 6", "Legion S6", "Legion", (2017, 11, 28), Some((2018, 3, 20))),
    (23, "Legion Season 5", "Legion S5", "Legion", (2017, 8, 29), Some((2017, 11, 28))),
    (22, "Legion Season 4", "Legion S4", "Legion", (2017, 6, 13), Some((2017, 8, 29))),
    (21, "Legion Season 3", "Legion S3", "Legion", (2017, 3, 28), Some((2017, 6, 13))),
    (20, "Legion Season 2", "Legion S2", "Legion", (2016, 12, 13), Some((2017, 3, 28))),
    (19, "Legion Season 1", "Legion S1", "Legion", (2016, 9, 20), Some((2016, 12, 13))),
    (18, "Warlords Season 3", "WoD S3", "Warlords of Draenor", (2015, 11, 17), Some((2016, 7, 19))),
    (17, "Warlords Season 2", "WoD S2", "Warlords of Draenor", (2015, 6, 30), Some((2015, 11, 10))),
    (16, "Warlords Season 1", "WoD S1", "Warlords of Draenor", (2014, 12, 2), Some((2015, 6, 23))),
    (15, "Season 15", "MoP S15", "Mists of Pandaria", (2014, 2, 25), Some((2014, 10, 14))),
    (14, "Season 14", "MoP S14", "Mists of Pandaria", (2013, 9, 17), Some((2014, 2, 18))),
    (13, "Season 13", "MoP S13", "Mists of Pandaria", (2013, 3, 12), Some((2013, 9, 10))),
    (12, "Season 12", "MoP S12", "Mists of Pandaria", (2012, 10, 2), Some((2013, 3, 5))),
    (11, "Season 11", "Cata S11", "Cataclysm", (2011, 12, 6), Some((2012, 8, 28))),
    (10, "Season 10", "Cata S10", "Cataclysm", (2011, 7, 5), Some((2011, 11, 29))),
    (9, "Season 9", "Cata S9", "Cataclysm", (2010, 12, 14), Some((2011, 6, 28))),
    (8, "Season 8", "WotLK S8", "Wrath of the Lich King", (2010, 2, 2), Some((2010, 10, 12))),
    (7, "Season 7", "WotLK S7", "Wrath of the Lich King", (2009, 9, 1), Some((2010, 1, 19))),
    (6, "Season 6", "WotLK S6", "Wrath of the Lich King", (2009, 4, 21), Some((2009, 8, 25))),
    (5, "Season 5", "WotLK S5", "Wrath of the Lich King", (2008, 12, 16), Some((2009, 4, 14))),
    (4, "Season 4", "TBC S4", "Burning Crusade", (2008, 6, 24), Some((2008, 10, 14))),
    (3, "Season 3", "TBC S3", "Burning Crusade", (2007, 11, 28), Some((2008, 6, 23))),
    (2, "Season 2", "TBC S2", "Burning Crusade", (2007, 6, 20), Some((2007, 11, 26))),
    (1, "Season 1", "TBC S1", "Burning Crusade", (2007, 1, 30), Some((2007, 6, 19))),
];

static CATALOG: Lazy<SeasonCatalog> = Lazy::new(|| {
    SeasonCatalog::from_table(WOW_SEASONS).expect("built-in season table is well-formed")
});

#[derive(Debug, Clone)]
pub struct SeasonCatalog {
    seasons: Vec<SeasonWindow>,
}

impl SeasonCatalog {
    /// Validates and wraps windows, keeping the given order for lookups.
    pub fn new(seasons: Vec<SeasonWindow>) -> Result<Self, CatalogError> {
        if seasons.is_empty() {
            return Err(CatalogError::Empty);
        }

        let mut ids = HashSet::with_capacity(seasons.len());
        let mut active: Option<u32> = None;
        for season in &seasons {
            if !ids.insert(season.id) {
                return Err(CatalogError::DuplicateId(season.id));
            }
            match season.end_date {
                Some(end) if end < season.start_date => {
                    return Err(CatalogError::InvertedWindow {
                        id: season.id,
                        start: season.start_date,
                        end,
                    });
                }
                Some(_) => {}
                None => {
                    if let Some(first) = active {
                        return Err(CatalogError::MultipleActive(first, season.id));
                    }
                    active = Some(season.id);
                }
            }
        }

        Ok(Self { seasons })
    }

    fn from_table(table: &[(u32, &str, &str, &str, Ymd, Option<Ymd>)]) -> Result<Self, CatalogError> {
        let mut seasons = Vec::with_capacity(table.len());
        for &(id, name, short_name, expansion, start, end) in table {
            let start_date = ymd(start).ok_or(CatalogError::InvalidDate(id))?;
            let end_date = match end {
                Some(end) => Some(ymd(end).ok_or(CatalogError::InvalidDate(id))?),
                None => None,
            };
            seasons.push(SeasonWindow {
                id,
                name: name.to_string(),
                short_name: short_name.to_string(),
                expansion: expansion.to_string(),
                start_date,
                end_date,
            });
        }
        Self::new(seasons)
    }

    pub fn seasons(&self) -> &[SeasonWindow] {
        &self.seasons
    }

    pub fn by_id(&self, id: u32) -> Option<&SeasonWindow> {
        self.seasons.iter().find(|season| season.id == id)
    }

    /// The running season, or the first entry when none is marked active.
    pub fn current(&self) -> &SeasonWindow {
        self.seasons
            .iter()
            .find(|season| season.is_active())
            .unwrap_or(&self.seasons[0])
    }

    /// First window in catalog order containing `ts`. The running season is
    /// bounded above by `now_ms`.
    pub fn for_timestamp_at(&self, ts: i64, now_ms: i64) -> Option<&SeasonWindow> {
        self.seasons
            .iter()
            .find(|season| contains(season, ts, now_ms))
    }

    /// The current season plus every season holding at least one of
    /// `timestamps`, in catalog order.
    pub fn with_history_at(&self, timestamps: &[i64], now_ms: i64) -> Vec<&SeasonWindow> {
        let mut ids = HashSet::new();
        ids.insert(self.current().id);
        for &ts in timestamps {
            if let Some(season) = self.for_timestamp_at(ts, now_ms) {
                ids.insert(season.id);
            }
        }
        self.seasons
            .iter()
            .filter(|season| ids.contains(&season.id))
            .collect()
    }
}

pub fn catalog() -> &'static SeasonCatalog {
    &CATALOG
}

pub fn current_season() -> &'static SeasonWindow {
    CATALOG.current()
}

pub fn season_by_id(id: u32) -> Option<&'static SeasonWindow> {
    CATALOG.by_id(id)
}

pub fn season_for_timestamp(ts: i64) -> Option<&'static SeasonWindow> {
    CATALOG.for_timestamp_at(ts, Utc::now().timestamp_millis())
}

pub fn seasons_with_history(timestamps: &[i64]) -> Vec<&'static SeasonWindow> {
    CATALOG.with_history_at(timestamps, Utc::now().timestamp_millis())
}

/// Both bounds are instants at midnight UTC of the catalog dates, so only
/// the first millisecond of an end date still belongs to the season.
fn contains(season: &SeasonWindow, ts: i64, now_ms: i64) -> bool {
    if ts < midnight_utc_ms(season.start_date) {
        return false;
    }
    match season.end_date {
        Some(end) => ts <= midnight_utc_ms(end),
        None => ts <= now_ms,
    }
}

fn midnight_utc_ms(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

fn ymd((year, month, day): Ymd) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}
