//! League data file and entity lookup helpers.

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use pb_core::{EventId, Group, GroupId, GroupPlayer};
use pb_engine::{LeagueStore, MemoryStore};

use crate::error::{CliError, Result};

/// Load the league file, or an empty league when the file does not exist yet.
pub fn load(path: &Path) -> Result<MemoryStore> {
    if !path.exists() {
        return Ok(MemoryStore::new());
    }
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Write the league file.
pub fn save(path: &Path, store: &MemoryStore) -> Result<()> {
    let json = serde_json::to_string_pretty(store)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Find a group by name (case-insensitive).
pub fn find_group<'a>(store: &'a MemoryStore, name: &str) -> Result<&'a Group> {
    let query = name.to_lowercase();
    store
        .groups()
        .into_iter()
        .find(|g| g.name.to_lowercase() == query)
        .ok_or_else(|| CliError::GroupNotFound(name.to_string()))
}

/// Find a group member by player display name (case-insensitive).
pub fn find_member<'a>(
    store: &'a MemoryStore,
    group_id: GroupId,
    name: &str,
) -> Result<&'a GroupPlayer> {
    let query = name.to_lowercase();
    store
        .group_players(group_id)
        .into_iter()
        .find(|member| {
            store
                .player(member.player_id)
                .map(|p| p.display_name.to_lowercase() == query)
                .unwrap_or(false)
        })
        .ok_or_else(|| CliError::PlayerNotFound(name.to_string()))
}

/// Parse an event id argument.
pub fn parse_event_id(value: &str) -> Result<EventId> {
    value
        .parse()
        .map_err(|_| CliError::InvalidArgument(format!("not an event id: {value}")))
}

/// Parse a start time: RFC 3339, or a bare date taken as midnight UTC.
pub fn parse_starts_at(value: &str) -> Result<DateTime<Utc>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp.with_timezone(&Utc));
    }
    if let Ok(date) = value.parse::<NaiveDate>() {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    Err(CliError::InvalidArgument(format!(
        "not a timestamp: {value} (expected RFC 3339 or YYYY-MM-DD)"
    )))
}

/// The display name of a group member.
pub fn member_name(store: &MemoryStore, member: &GroupPlayer) -> String {
    store
        .player(member.player_id)
        .map(|p| p.display_name.clone())
        .unwrap_or_else(|| member.player_id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pb_core::GroupSettings;

    #[test]
    fn test_find_group_case_insensitive() {
        let mut store = MemoryStore::new();
        store.put_group(Group::new("Monday Mixers", GroupSettings::default()));

        assert!(find_group(&store, "monday mixers").is_ok());
        assert!(matches!(
            find_group(&store, "tuesday"),
            Err(CliError::GroupNotFound(_))
        ));
    }

    #[test]
    fn test_parse_starts_at_formats() {
        assert!(parse_starts_at("2025-06-01T18:00:00Z").is_ok());
        let midnight = parse_starts_at("2025-06-01").unwrap();
        assert_eq!(midnight.to_rfc3339(), "2025-06-01T00:00:00+00:00");
        assert!(parse_starts_at("yesterday").is_err());
    }
}
