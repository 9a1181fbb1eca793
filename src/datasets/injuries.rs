//! Weekly injury reports

use serde::{Deserialize, Serialize};

use crate::app::context::FetchContext;
use crate::app::loader::Loader;
use crate::app::parse::Row;
use crate::app::select::Selection;
use crate::datasets::sources;
use crate::errors::LoadResult;

/// One player's entry in a weekly injury report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Injury {
    pub season: i32,
    /// `REG` or `POST`
    pub season_type: String,
    pub team: String,
    pub week: i32,
    pub gsis_id: String,
    pub position: String,
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub report_primary_injury: String,
    pub report_secondary_injury: String,
    pub report_status: String,
    pub practice_primary_injury: String,
    pub practice_secondary_injury: String,
    pub practice_status: String,
    /// ISO-8601 timestamp as published
    pub date_modified: String,
}

const TEXT_COLUMNS: [&str; 14] = [
    "season_type",
    "team",
    "gsis_id",
    "position",
    "full_name",
    "first_name",
    "last_name",
    "report_primary_injury",
    "report_secondary_injury",
    "report_status",
    "practice_primary_injury",
    "practice_secondary_injury",
    "practice_status",
    "date_modified",
];

impl Injury {
    /// Map a parsed row
    pub fn from_row(row: &Row) -> Self {
        Self {
            season: row.int32(&["season"]),
            season_type: row.text("season_type"),
            team: row.text("team"),
            week: row.int32(&["week"]),
            gsis_id: row.text("gsis_id"),
            position: row.text("position"),
            full_name: row.text("full_name"),
            first_name: row.text("first_name"),
            last_name: row.text("last_name"),
            report_primary_injury: row.text("report_primary_injury"),
            report_secondary_injury: row.text("report_secondary_injury"),
            report_status: row.text("report_status"),
            practice_primary_injury: row.text("practice_primary_injury"),
            practice_secondary_injury: row.text("practice_secondary_injury"),
            practice_status: row.text("practice_status"),
            date_modified: row.text("date_modified"),
        }
    }

    /// Back to a row keyed by the published column names
    pub fn to_row(&self) -> Row {
        let values = [
            &self.season_type,
            &self.team,
            &self.gsis_id,
            &self.position,
            &self.full_name,
            &self.first_name,
            &self.last_name,
            &self.report_primary_injury,
            &self.report_secondary_injury,
            &self.report_status,
            &self.practice_primary_injury,
            &self.practice_secondary_injury,
            &self.practice_status,
            &self.date_modified,
        ];

        let mut row: Row = TEXT_COLUMNS
            .into_iter()
            .zip(values)
            .map(|(key, value)| (key, value.as_str()))
            .collect();
        row.insert("season", self.season);
        row.insert("week", self.week);
        row
    }
}

/// Injury reports for one season, or every season when `season <= 0`
pub async fn load(loader: &Loader, ctx: &FetchContext, season: i32) -> LoadResult<Vec<Injury>> {
    loader
        .load_from_source(ctx, &sources::INJURIES, season, Injury::from_row)
        .await
}

/// Injury reports for the selected seasons and weeks
pub async fn load_selection(
    loader: &Loader,
    ctx: &FetchContext,
    selection: &Selection,
) -> LoadResult<Vec<Injury>> {
    loader
        .load_selection(ctx, &sources::INJURIES, selection, Injury::from_row)
        .await
}
