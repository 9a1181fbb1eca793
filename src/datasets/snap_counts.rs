//! Per-game player snap counts

use serde::{Deserialize, Serialize};

use crate::app::context::FetchContext;
use crate::app::loader::Loader;
use crate::app::parse::Row;
use crate::app::select::Selection;
use crate::datasets::sources;
use crate::errors::LoadResult;

/// One player's snaps in one game
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapCount {
    pub season: i32,
    pub week: i32,
    pub game_id: String,
    pub player_id: String,
    /// Upper-cased team abbreviation
    pub team: String,
    /// Offensive snaps played by the team
    pub offense_snaps: i32,
    pub player_snaps: i32,
    /// Share of team snaps, 0 to 100
    pub snap_pct: f64,
}

impl SnapCount {
    /// Map a parsed row
    ///
    /// When the row carries no `snap_pct` the percentage is derived from
    /// player and team snaps, provided the team played at least one snap.
    pub fn from_row(row: &Row) -> Self {
        let offense_snaps = row.int32(&["offense_snaps", "team_snaps"]);
        let player_snaps = row.int32(&["player_snaps", "snaps"]);

        let snap_pct = if !row.text("snap_pct").is_empty() {
            row.float(&["snap_pct"])
        } else if offense_snaps > 0 && player_snaps >= 0 {
            100.0 * f64::from(player_snaps) / f64::from(offense_snaps)
        } else {
            0.0
        };

        Self {
            season: row.int32(&["season"]),
            week: row.int32(&["week"]),
            game_id: row.first_text(&["game_id", "gameid"]),
            player_id: row.first_text(&["player_id", "gsis_id", "playerid"]),
            team: row.upper(&["team"]),
            offense_snaps,
            player_snaps,
            snap_pct,
        }
    }

    /// Back to a row with canonical column names
    pub fn to_row(&self) -> Row {
        let mut row = Row::new();
        row.insert("season", self.season);
        row.insert("week", self.week);
        row.insert("game_id", self.game_id.as_str());
        row.insert("player_id", self.player_id.as_str());
        row.insert("team", self.team.as_str());
        row.insert("offense_snaps", self.offense_snaps);
        row.insert("player_snaps", self.player_snaps);
        row.insert("snap_pct", self.snap_pct);
        row
    }
}

/// Snap counts for one season, or every season when `season <= 0`
pub async fn load(loader: &Loader, ctx: &FetchContext, season: i32) -> LoadResult<Vec<SnapCount>> {
    loader
        .load_from_source(ctx, &sources::SNAP_COUNTS, season, SnapCount::from_row)
        .await
}

/// Snap counts for several seasons, concatenated in increasing season order
pub async fn load_seasons(
    loader: &Loader,
    ctx: &FetchContext,
    seasons: &[i32],
) -> LoadResult<Vec<SnapCount>> {
    loader
        .load_seasons(ctx, &sources::SNAP_COUNTS, seasons, SnapCount::from_row)
        .await
}

/// Snap counts for the selected seasons and weeks
pub async fn load_selection(
    loader: &Loader,
    ctx: &FetchContext,
    selection: &Selection,
) -> LoadResult<Vec<SnapCount>> {
    loader
        .load_selection(ctx, &sources::SNAP_COUNTS, selection, SnapCount::from_row)
        .await
}
