//! CSV parsing into row mappings

use std::collections::{HashMap, HashSet};

use crate::errors::{ParseError, ParseResult};

use super::row::{Row, Value};

/// Normalize a header cell: trim, lowercase, spaces and hyphens to underscores
pub fn normalize_header(header: &str) -> String {
    header
        .trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .replace([' ', '-'], "_")
}

/// Make normalized headers unique by suffixing repeats with their ordinal
///
/// `["team", "team", "team"]` becomes `["team", "team_2", "team_3"]`. A suffixed
/// name that collides with a header already in use keeps counting upward.
pub fn dedupe_headers<I>(headers: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut used: HashSet<String> = HashSet::new();
    let mut keys = Vec::new();

    for header in headers {
        let count = seen.entry(header.clone()).or_insert(0);
        *count += 1;
        let mut key = if *count == 1 {
            header.clone()
        } else {
            format!("{}_{}", header, count)
        };
        while used.contains(&key) {
            *count += 1;
            key = format!("{}_{}", header, count);
        }
        used.insert(key.clone());
        keys.push(key);
    }

    keys
}

/// Parse CSV bytes: first record is the header, the rest become rows
///
/// Records may be shorter or longer than the header. Short records leave the
/// trailing keys absent; cells beyond the header are dropped.
pub fn parse_csv(bytes: &[u8]) -> ParseResult<Vec<Row>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);
    let mut records = reader.records();

    let header = match records.next() {
        Some(record) => record?,
        None => return Err(ParseError::EmptyInput),
    };
    let keys = dedupe_headers(header.iter().map(normalize_header));

    let mut rows = Vec::new();
    for record in records {
        let record = record?;
        let row: Row = keys
            .iter()
            .zip(record.iter())
            .map(|(key, cell)| (key.clone(), Value::Str(cell.trim().to_string())))
            .collect();
        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Player Name "), "player_name");
        assert_eq!(normalize_header("Snap-Pct"), "snap_pct");
        assert_eq!(normalize_header("\u{feff}Season"), "season");
        assert_eq!(normalize_header("gsis_id"), "gsis_id");
    }

    #[test]
    fn test_duplicate_headers_get_ordinals() {
        let rows = parse_csv(b"Team,Team\nKC,BUF\n").unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].text("team"), "KC");
        assert_eq!(rows[0].text("team_2"), "BUF");
    }

    #[test]
    fn test_dedupe_avoids_collisions() {
        let keys = dedupe_headers(
            ["team", "team", "team_2", "team"]
                .into_iter()
                .map(String::from),
        );
        assert_eq!(keys, vec!["team", "team_2", "team_2_2", "team_3"]);
    }

    #[test]
    fn test_short_rows_leave_keys_absent() {
        let rows = parse_csv(b"a,b,c\n1,2\n4,5,6,7\n").unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 2);
        assert!(!rows[0].contains_key("c"));
        assert_eq!(rows[1].len(), 3);
        assert_eq!(rows[1].text("c"), "6");
    }

    #[test]
    fn test_cells_are_trimmed_strings() {
        let rows = parse_csv(b"name, pct\n  Patrick Mahomes , 0.98 \n").unwrap();
        assert_eq!(rows[0].get("name"), Some(&Value::from("Patrick Mahomes")));
        assert_eq!(rows[0].get("pct"), Some(&Value::from("0.98")));
    }

    #[test]
    fn test_quoted_fields() {
        let rows = parse_csv(b"player,team\n\"Smith, John\",NE\n").unwrap();
        assert_eq!(rows[0].text("player"), "Smith, John");
    }

    #[test]
    fn test_header_only_yields_no_rows() {
        let rows = parse_csv(b"season,week\n").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(matches!(parse_csv(b""), Err(ParseError::EmptyInput)));
    }

    #[test]
    fn test_invalid_utf8_is_error() {
        let result = parse_csv(b"a,b\n\xff\xfe,1\n");
        assert!(matches!(result, Err(ParseError::Csv(_))));
    }
}
