//! Season and week selection
//!
//! A [`Selection`] names the seasons to request and the rows to keep once they
//! are loaded. Rows are matched on their `season` and `week` columns, so a
//! season that falls back to the all-seasons file still yields only the rows
//! that were asked for.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::app::parse::Row;
use crate::constants::season::START_MONTH;

/// Weeks wanted from one season; no weeks means every week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonWeeks {
    pub season: i32,
    #[serde(default)]
    pub weeks: Vec<i32>,
}

impl SeasonWeeks {
    pub fn new(season: i32, weeks: impl Into<Vec<i32>>) -> Self {
        Self {
            season,
            weeks: weeks.into(),
        }
    }

    /// Every week of `season`
    pub fn all(season: i32) -> Self {
        Self::new(season, Vec::new())
    }
}

/// Which seasons and weeks to load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selection {
    /// The all-seasons file, unfiltered
    #[default]
    All,
    /// Whole seasons. Non-positive entries are ignored; none left means the
    /// current season
    Seasons(Vec<i32>),
    /// Listed weeks of listed seasons
    SeasonWeeks(Vec<SeasonWeeks>),
    /// Listed weeks of the current season; no weeks means every week
    Weeks(Vec<i32>),
}

impl Selection {
    /// Selection of whole seasons
    pub fn seasons(seasons: impl Into<Vec<i32>>) -> Self {
        Selection::Seasons(seasons.into())
    }

    /// Resolve against `current` (the season implied by `Weeks` and by an
    /// empty season list) into a row filter
    pub fn filter(&self, current: i32) -> SelectionFilter {
        let mut wanted: BTreeMap<i32, Option<BTreeSet<i32>>> = BTreeMap::new();

        match self {
            Selection::All => return SelectionFilter { wanted: None },
            Selection::Seasons(seasons) => {
                for &season in seasons.iter().filter(|season| **season > 0) {
                    wanted.insert(season, None);
                }
            }
            Selection::SeasonWeeks(list) => {
                for entry in list.iter().filter(|entry| entry.season > 0) {
                    merge_weeks(&mut wanted, entry.season, &entry.weeks);
                }
            }
            Selection::Weeks(weeks) => merge_weeks(&mut wanted, current, weeks),
        }

        if wanted.is_empty() {
            wanted.insert(current, None);
        }
        SelectionFilter {
            wanted: Some(wanted),
        }
    }
}

// An all-weeks request for a season wins over any week list for it.
fn merge_weeks(wanted: &mut BTreeMap<i32, Option<BTreeSet<i32>>>, season: i32, weeks: &[i32]) {
    if weeks.is_empty() {
        wanted.insert(season, None);
        return;
    }
    let entry = wanted
        .entry(season)
        .or_insert_with(|| Some(BTreeSet::new()));
    if let Some(set) = entry {
        set.extend(weeks.iter().copied());
    }
}

/// A [`Selection`] resolved to concrete seasons
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionFilter {
    /// `None` keeps everything; a season mapped to `None` keeps all its weeks
    wanted: Option<BTreeMap<i32, Option<BTreeSet<i32>>>>,
}

impl SelectionFilter {
    /// Seasons to request in increasing order; `0` is the all-seasons file
    pub fn seasons(&self) -> Vec<i32> {
        match &self.wanted {
            None => vec![0],
            Some(wanted) => wanted.keys().copied().collect(),
        }
    }

    /// Whether a record from `season` and `week` is wanted
    pub fn matches(&self, season: i32, week: i32) -> bool {
        let Some(wanted) = &self.wanted else {
            return true;
        };
        match wanted.get(&season) {
            None => false,
            Some(None) => true,
            Some(Some(weeks)) => weeks.contains(&week),
        }
    }

    /// [`SelectionFilter::matches`] on a row's `season` and `week` columns
    ///
    /// A column the row does not have does not constrain it, so files without
    /// seasons (the player directory) or weeks (season summaries) pass whole.
    pub fn matches_row(&self, row: &Row) -> bool {
        let Some(wanted) = &self.wanted else {
            return true;
        };
        if !row.contains_key("season") {
            return true;
        }
        match wanted.get(&row.int32(&["season"])) {
            None => false,
            Some(None) => true,
            Some(Some(weeks)) => {
                !row.contains_key("week") || weeks.contains(&row.int32(&["week"]))
            }
        }
    }
}

/// The NFL season in progress today
pub fn current_season() -> i32 {
    season_on(Utc::now().date_naive())
}

/// The NFL season in progress on `date`
///
/// Seasons start in September; earlier months belong to the previous season.
pub fn season_on(date: NaiveDate) -> i32 {
    if date.month() >= START_MONTH {
        date.year()
    } else {
        date.year() - 1
    }
}
