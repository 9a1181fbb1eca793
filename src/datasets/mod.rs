//! Dataset registry and typed bindings
//!
//! Every dataset published in `nflverse/nflverse-data` is named by a
//! [`DatasetKey`] and located by a [`Source`]. A few families also have typed
//! records with a mapper (`from_row`) and its inverse (`to_row`):
//!
//! - [`snap_counts`]: per-game player snap counts
//! - [`players`]: the player directory
//! - [`team_stats`]: weekly team box-score totals
//! - [`injuries`]: weekly injury reports
//!
//! Keys without a typed binding can still be loaded as generic [`Row`]s.
//!
//! [`Row`]: crate::app::parse::Row

use std::fmt;
use std::str::FromStr;

use crate::app::source::Source;
use crate::constants::github;
use crate::errors::ConfigError;

pub mod injuries;
pub mod players;
pub mod snap_counts;
pub mod team_stats;

pub use injuries::Injury;
pub use players::Player;
pub use snap_counts::SnapCount;
pub use team_stats::TeamStat;

/// Repository holding the published datasets
pub const REPO: &str = github::NFLVERSE_DATA;

/// Dataset sources, relative to [`REPO`]
pub mod sources {
    use super::{Source, REPO};

    pub const PLAYERS: Source = Source::new(REPO, "data/players/players");
    pub const SNAP_COUNTS: Source = Source::new(REPO, "data/snap_counts/snap_counts");
    pub const PLAYER_STATS: Source = Source::new(REPO, "data/player_stats/player_stats");
    pub const ROSTERS: Source = Source::new(REPO, "data/rosters/rosters");
    pub const ROSTERS_WEEKLY: Source = Source::new(REPO, "data/weekly_rosters/weekly_rosters");
    pub const TEAM_STATS_WEEK: Source = Source::new(REPO, "data/stats_team/stats_team_week");
    pub const TEAM_STATS_REG: Source = Source::new(REPO, "data/stats_team/stats_team_reg");
    pub const TEAM_STATS_POST: Source = Source::new(REPO, "data/stats_team/stats_team_post");
    pub const TEAM_STATS_REG_POST: Source =
        Source::new(REPO, "data/stats_team/stats_team_reg_post");
    pub const DEPTH_CHARTS: Source = Source::new(REPO, "data/depth_charts/depth_charts");
    pub const INJURIES: Source = Source::new(REPO, "data/injuries/injuries");
}

/// Stable identifier of a supported dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKey {
    Players,
    SnapCounts,
    PlayerStats,
    Rosters,
    RostersWeekly,
    TeamStatsWeekly,
    DepthCharts,
    Injuries,
}

impl DatasetKey {
    /// Every key, in display order
    pub const ALL: [DatasetKey; 8] = [
        DatasetKey::Players,
        DatasetKey::SnapCounts,
        DatasetKey::PlayerStats,
        DatasetKey::Rosters,
        DatasetKey::RostersWeekly,
        DatasetKey::TeamStatsWeekly,
        DatasetKey::DepthCharts,
        DatasetKey::Injuries,
    ];

    /// Canonical lowercase name
    pub fn name(self) -> &'static str {
        match self {
            DatasetKey::Players => "players",
            DatasetKey::SnapCounts => "snapcounts",
            DatasetKey::PlayerStats => "playerstats",
            DatasetKey::Rosters => "rosters",
            DatasetKey::RostersWeekly => "rosters_weekly",
            DatasetKey::TeamStatsWeekly => "teamstats_week",
            DatasetKey::DepthCharts => "depth_charts",
            DatasetKey::Injuries => "injuries",
        }
    }

    /// Where the dataset is published
    pub fn source(self) -> Source {
        match self {
            DatasetKey::Players => sources::PLAYERS,
            DatasetKey::SnapCounts => sources::SNAP_COUNTS,
            DatasetKey::PlayerStats => sources::PLAYER_STATS,
            DatasetKey::Rosters => sources::ROSTERS,
            DatasetKey::RostersWeekly => sources::ROSTERS_WEEKLY,
            DatasetKey::TeamStatsWeekly => sources::TEAM_STATS_WEEK,
            DatasetKey::DepthCharts => sources::DEPTH_CHARTS,
            DatasetKey::Injuries => sources::INJURIES,
        }
    }

    /// Whether the dataset has a typed record in this crate
    pub fn is_typed(self) -> bool {
        matches!(
            self,
            DatasetKey::Players
                | DatasetKey::SnapCounts
                | DatasetKey::TeamStatsWeekly
                | DatasetKey::Injuries
        )
    }

    /// Comma-separated list of canonical names, for help and error text
    pub fn names() -> String {
        Self::ALL
            .iter()
            .map(|key| key.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatasetKey {
    type Err = ConfigError;

    /// Parse a canonical name; underscores and hyphens are optional, so
    /// `snap_counts`, `snap-counts` and `snapcounts` are the same key
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = squash(s);
        Self::ALL
            .iter()
            .copied()
            .find(|key| squash(key.name()) == wanted)
            .or(match wanted.as_str() {
                "teamstats" | "statsteamweek" => Some(DatasetKey::TeamStatsWeekly),
                "weeklyrosters" => Some(DatasetKey::RostersWeekly),
                _ => None,
            })
            .ok_or_else(|| ConfigError::UnknownDataset {
                name: s.to_string(),
            })
    }
}

fn squash(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}
