use crate::model::{COMPOSITE_KEY_SEPARATOR, EntityKey, ListenEvent, RawListen};

// Artist key: MBID when present, otherwise the trimmed display name.
pub fn artist_key(artist_name: &str, artist_mbid: &str) -> EntityKey {
    if artist_mbid.is_empty() {
        artist_name.to_string()
    } else {
        artist_mbid.to_string()
    }
}

// Track key: MBID when present, otherwise artist key + separator + track name,
// so identically named tracks by different artists stay distinct.
pub fn track_key(artist_key: &str, track_name: &str, track_mbid: &str) -> EntityKey {
    if track_mbid.is_empty() {
        format!("{artist_key}{COMPOSITE_KEY_SEPARATOR}{track_name}")
    } else {
        track_mbid.to_string()
    }
}

pub fn normalize_row(row: &RawListen) -> Option<ListenEvent> {
    let timestamp = row.uts?;
    let track_name = row.track.trim();
    let artist_name = row.artist.trim();
    if track_name.is_empty() || artist_name.is_empty() {
        return None;
    }

    let artist_mbid = row.artist_mbid.trim();
    let track_mbid = row.track_mbid.trim();
    let artist_key = artist_key(artist_name, artist_mbid);
    let track_key = track_key(&artist_key, track_name, track_mbid);

    Some(ListenEvent {
        timestamp,
        track_name: track_name.to_string(),
        artist_name: artist_name.to_string(),
        track_key,
        artist_key,
        track_mbid: non_empty(track_mbid),
        artist_mbid: non_empty(artist_mbid),
        album_mbid: non_empty(row.album_mbid.trim()),
    })
}

// Bad rows are skipped, never fatal for the batch.
pub fn normalize_rows(rows: &[RawListen]) -> Vec<ListenEvent> {
    rows.iter().filter_map(normalize_row).collect()
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(uts: i64, artist: &str, track: &str) -> RawListen {
        RawListen {
            uts: Some(uts),
            artist: artist.to_string(),
            track: track.to_string(),
            ..RawListen::default()
        }
    }

    #[test]
    fn trims_names_and_keeps_valid_rows() {
        let event = normalize_row(&row(1_000, "  Neon  ", "  Night Drive ")).expect("event");
        assert_eq!(event.artist_name, "Neon");
        assert_eq!(event.track_name, "Night Drive");
        assert_eq!(event.artist_key, "Neon");
        assert_eq!(event.track_key, format!("Neon{COMPOSITE_KEY_SEPARATOR}Night Drive"));
    }

    #[test]
    fn rejects_missing_timestamp_and_blank_names() {
        assert!(normalize_row(&RawListen::default()).is_none());
        assert!(normalize_row(&row(1_000, "   ", "Song")).is_none());
        assert!(normalize_row(&row(1_000, "Artist", " \t ")).is_none());
    }

    #[test]
    fn mbids_take_precedence_in_keys() {
        let mut raw = row(1_000, "Neon", "Night Drive");
        raw.artist_mbid = String::from(" artist-mbid ");
        raw.track_mbid = String::from("track-mbid");
        let event = normalize_row(&raw).expect("event");
        assert_eq!(event.artist_key, "artist-mbid");
        assert_eq!(event.track_key, "track-mbid");
        assert_eq!(event.artist_mbid.as_deref(), Some("artist-mbid"));
    }

    #[test]
    fn same_track_always_resolves_to_same_key() {
        let a = normalize_row(&row(1_000, "Neon", "Night Drive")).expect("event");
        let b = normalize_row(&row(2_000, " Neon ", "Night Drive  ")).expect("event");
        assert_eq!(a.track_key, b.track_key);
        assert_eq!(a.artist_key, b.artist_key);
    }

    #[test]
    fn batch_skips_bad_rows_only() {
        let rows = vec![
            row(1_000, "Neon", "Night Drive"),
            RawListen::default(),
            row(2_000, "Blue", "Ocean Room"),
        ];
        let events = normalize_rows(&rows);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].artist_name, "Neon");
        assert_eq!(events[1].artist_name, "Blue");
    }
}
