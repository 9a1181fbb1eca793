//! Team box-score totals
//!
//! The same record shape covers the weekly file and the season summaries
//! (regular season, postseason, both); summaries carry `week == 0`.

use serde::{Deserialize, Serialize};

use crate::app::context::FetchContext;
use crate::app::loader::Loader;
use crate::app::parse::Row;
use crate::app::select::Selection;
use crate::app::source::Source;
use crate::datasets::sources;
use crate::errors::LoadResult;

/// Summary level of a team stats file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Summary {
    Week,
    Regular,
    Post,
    RegularPost,
}

impl Summary {
    pub fn source(self) -> Source {
        match self {
            Summary::Week => sources::TEAM_STATS_WEEK,
            Summary::Regular => sources::TEAM_STATS_REG,
            Summary::Post => sources::TEAM_STATS_POST,
            Summary::RegularPost => sources::TEAM_STATS_REG_POST,
        }
    }
}

/// One team's totals for a week or a season
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamStat {
    pub season: i32,
    pub week: i32,
    /// `REG`, `POST` or `REG+POST`
    pub season_type: String,
    pub team: String,

    pub completions: i32,
    pub attempts: i32,
    pub passing_yards: i32,
    pub passing_tds: i32,
    pub passing_interceptions: i32,
    pub sacks_suffered: i32,
    pub sack_yards_lost: i32,
    pub passing_air_yards: i32,
    pub passing_yards_after_catch: i32,
    pub passing_first_downs: i32,

    pub carries: i32,
    pub rushing_yards: i32,
    pub rushing_tds: i32,
    pub rushing_first_downs: i32,

    pub targets: i32,
    pub receptions: i32,
    pub receiving_yards: i32,
    pub receiving_tds: i32,
    pub receiving_first_downs: i32,
    pub receiving_air_yards: i32,
    pub receiving_yards_after_catch: i32,

    pub fumbles: i32,
    pub fumbles_lost: i32,

    pub field_goals_made: i32,
    #[serde(rename = "field_goals_attempts")]
    pub field_goals_attempted: i32,
    pub extra_points_made: i32,
    #[serde(rename = "extra_points_attempts")]
    pub extra_points_attempted: i32,
    pub punts: i32,
    pub punt_yards: i32,
}

impl TeamStat {
    /// Map a parsed row
    pub fn from_row(row: &Row) -> Self {
        Self {
            season: row.int32(&["season"]),
            week: row.int32(&["week"]),
            season_type: row.upper(&["season_type"]),
            team: row.upper(&["team", "recent_team"]),
            completions: row.int32(&["completions"]),
            attempts: row.int32(&["attempts"]),
            passing_yards: row.int32(&["passing_yards"]),
            passing_tds: row.int32(&["passing_tds"]),
            passing_interceptions: row.int32(&["passing_interceptions"]),
            sacks_suffered: row.int32(&["sacks_suffered"]),
            sack_yards_lost: row.int32(&["sack_yards_lost"]),
            passing_air_yards: row.int32(&["passing_air_yards"]),
            passing_yards_after_catch: row.int32(&["passing_yards_after_catch"]),
            passing_first_downs: row.int32(&["passing_first_downs"]),

            carries: row.int32(&["carries"]),
            rushing_yards: row.int32(&["rushing_yards"]),
            rushing_tds: row.int32(&["rushing_tds"]),
            rushing_first_downs: row.int32(&["rushing_first_downs"]),

            targets: row.int32(&["targets"]),
            receptions: row.int32(&["receptions"]),
            receiving_yards: row.int32(&["receiving_yards"]),
            receiving_tds: row.int32(&["receiving_tds"]),
            receiving_first_downs: row.int32(&["receiving_first_downs"]),
            receiving_air_yards: row.int32(&["receiving_air_yards"]),
            receiving_yards_after_catch: row.int32(&["receiving_yards_after_catch"]),

            fumbles: row.int32(&["fumbles"]),
            fumbles_lost: row.int32(&["fumbles_lost"]),

            field_goals_made: row.int32(&["field_goals_made"]),
            field_goals_attempted: row.int32(&["field_goals_attempts"]),
            extra_points_made: row.int32(&["extra_points_made"]),
            extra_points_attempted: row.int32(&["extra_points_attempts"]),
            punts: row.int32(&["punts"]),
            punt_yards: row.int32(&["punt_yards"]),
        }
    }

    /// Back to a row keyed by the published column names
    pub fn to_row(&self) -> Row {
        let counts = [
            ("season", self.season),
            ("week", self.week),
            ("completions", self.completions),
            ("attempts", self.attempts),
            ("passing_yards", self.passing_yards),
            ("passing_tds", self.passing_tds),
            ("passing_interceptions", self.passing_interceptions),
            ("sacks_suffered", self.sacks_suffered),
            ("sack_yards_lost", self.sack_yards_lost),
            ("passing_air_yards", self.passing_air_yards),
            ("passing_yards_after_catch", self.passing_yards_after_catch),
            ("passing_first_downs", self.passing_first_downs),

            ("carries", self.carries),
            ("rushing_yards", self.rushing_yards),
            ("rushing_tds", self.rushing_tds),
            ("rushing_first_downs", self.rushing_first_downs),

            ("targets", self.targets),
            ("receptions", self.receptions),
            ("receiving_yards", self.receiving_yards),
            ("receiving_tds", self.receiving_tds),
            ("receiving_first_downs", self.receiving_first_downs),
            ("receiving_air_yards", self.receiving_air_yards),
            ("receiving_yards_after_catch", self.receiving_yards_after_catch),

            ("fumbles", self.fumbles),
            ("fumbles_lost", self.fumbles_lost),

            ("field_goals_made", self.field_goals_made),
            ("field_goals_attempts", self.field_goals_attempted),
            ("extra_points_made", self.extra_points_made),
            ("extra_points_attempts", self.extra_points_attempted),
            ("punts", self.punts),
            ("punt_yards", self.punt_yards),
        ];

        let mut row: Row = counts.into_iter().collect();
        row.insert("season_type", self.season_type.as_str());
        row.insert("team", self.team.as_str());
        row
    }
}

/// Weekly team stats for one season, or every season when `season <= 0`
pub async fn load(loader: &Loader, ctx: &FetchContext, season: i32) -> LoadResult<Vec<TeamStat>> {
    load_summary(loader, ctx, Summary::Week, season).await
}

/// Team stats at a given summary level
pub async fn load_summary(
    loader: &Loader,
    ctx: &FetchContext,
    summary: Summary,
    season: i32,
) -> LoadResult<Vec<TeamStat>> {
    loader
        .load_from_source(ctx, &summary.source(), season, TeamStat::from_row)
        .await
}

/// Team stats at a given summary level for the selected seasons and weeks
///
/// Week lists only narrow [`Summary::Week`]; season summaries have no `week`
/// column and pass whole for each selected season.
pub async fn load_summary_selection(
    loader: &Loader,
    ctx: &FetchContext,
    summary: Summary,
    selection: &Selection,
) -> LoadResult<Vec<TeamStat>> {
    loader
        .load_selection(ctx, &summary.source(), selection, TeamStat::from_row)
        .await
}
