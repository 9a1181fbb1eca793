//! The nflverse player directory
//!
//! One file covers every player; there are no per-season files, so loads
//! always go to the base path.

use serde::{Deserialize, Serialize};

use crate::app::context::FetchContext;
use crate::app::loader::Loader;
use crate::app::parse::Row;
use crate::datasets::sources;
use crate::errors::LoadResult;

/// One player with cross-reference ids, bio and draft data
///
/// Serialized names follow the published column names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub gsis_id: String,
    pub pfr_id: String,
    pub espn_id: String,
    pub pff_id: String,
    /// FootballDB id
    pub esb_id: String,
    #[serde(rename = "display_name")]
    pub full_name: String,
    pub first_name: String,
    pub last_name: String,
    pub short_name: String,
    pub football_name: String,
    pub position: String,
    pub position_group: String,
    pub pff_position: String,
    pub pff_status: String,
    pub ngs_status: String,
    pub ngs_position: String,
    pub ngs_position_group: String,
    pub draft_team: String,
    pub latest_team: String,
    pub status: String,
    /// Inches
    pub height: i32,
    /// Pounds
    pub weight: i32,
    /// `YYYY-MM-DD`
    pub birth_date: String,
    #[serde(rename = "college_name")]
    pub college: String,
    pub draft_year: i32,
    pub draft_round: i32,
    pub draft_pick: i32,
    #[serde(rename = "years_of_experience")]
    pub years_exp: i32,
}

impl Player {
    /// Map a parsed row, accepting the column spellings used across releases
    pub fn from_row(row: &Row) -> Self {
        Self {
            gsis_id: row.first_text(&["gsis_id", "gsisid"]),
            pfr_id: row.first_text(&["pfr_id", "pfr"]),
            espn_id: row.text("espn_id"),
            pff_id: row.text("pff_id"),
            esb_id: row.first_text(&["esb_id", "football_db_id"]),
            full_name: row.first_text(&["display_name", "player_name", "name", "name_full"]),
            first_name: row.first_text(&["first_name", "name_first", "firstname"]),
            last_name: row.first_text(&["last_name", "name_last", "lastname"]),
            short_name: row.first_text(&["short_name", "name_short"]),
            football_name: row.first_text(&["football_name", "name_football"]),
            position: row.text("position"),
            position_group: row.text("position_group"),
            pff_position: row.text("pff_position"),
            pff_status: row.text("pff_status"),
            ngs_status: row.text("ngs_status"),
            ngs_position: row.text("ngs_position"),
            ngs_position_group: row.text("ngs_position_group"),
            draft_team: row.text("draft_team"),
            latest_team: row.first_text(&["latest_team", "team", "recent_team"]),
            status: row.text("status"),
            height: row.int32(&["height", "height_in"]),
            weight: row.int32(&["weight", "weight_lb"]),
            birth_date: row.first_text(&["birth_date", "birthdate"]),
            college: row.first_text(&["college_name", "college"]),
            draft_year: row.int32(&["draft_year"]),
            draft_round: row.int32(&["draft_round"]),
            draft_pick: row.int32(&["draft_pick"]),
            years_exp: row.int32(&["years_of_experience", "years_exp"]),
        }
    }

    /// Back to a row keyed by the published column names
    pub fn to_row(&self) -> Row {
        let text = [
            ("gsis_id", &self.gsis_id),
            ("pfr_id", &self.pfr_id),
            ("espn_id", &self.espn_id),
            ("pff_id", &self.pff_id),
            ("esb_id", &self.esb_id),
            ("display_name", &self.full_name),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("short_name", &self.short_name),
            ("football_name", &self.football_name),
            ("position", &self.position),
            ("position_group", &self.position_group),
            ("pff_position", &self.pff_position),
            ("pff_status", &self.pff_status),
            ("ngs_status", &self.ngs_status),
            ("ngs_position", &self.ngs_position),
            ("ngs_position_group", &self.ngs_position_group),
            ("draft_team", &self.draft_team),
            ("latest_team", &self.latest_team),
            ("status", &self.status),
            ("birth_date", &self.birth_date),
            ("college_name", &self.college),
        ];
        let numbers = [
            ("height", self.height),
            ("weight", self.weight),
            ("draft_year", self.draft_year),
            ("draft_round", self.draft_round),
            ("draft_pick", self.draft_pick),
            ("years_of_experience", self.years_exp),
        ];

        let mut row: Row = text
            .into_iter()
            .map(|(key, value)| (key, value.as_str()))
            .collect();
        for (key, value) in numbers {
            row.insert(key, value);
        }
        row
    }
}

/// Load the full player directory
pub async fn load(loader: &Loader, ctx: &FetchContext) -> LoadResult<Vec<Player>> {
    loader
        .load_from_source(ctx, &sources::PLAYERS, 0, Player::from_row)
        .await
}
