use std::collections::HashMap;

use zbus::zvariant::{OwnedValue, Value};

/// Metadata information for the track a player reports
///
/// Missing or mistyped entries fall back to empty strings and a zero length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackMetadata {
    /// Track title (`xesam:title`)
    pub title: String,

    /// First entry of the artist list (`xesam:artist`)
    pub artist: String,

    /// URL to album artwork image (`mpris:artUrl`)
    pub art_url: String,

    /// Track duration in microseconds, 0 when unknown (`mpris:length`)
    pub length: i64,
}

impl TrackMetadata {
    fn string(value: &Value<'_>) -> Option<String> {
        match value {
            Value::Str(s) => Some(s.to_string()),
            Value::ObjectPath(path) => Some(path.to_string()),
            Value::Value(inner) => Self::string(inner),
            _ => None,
        }
    }

    fn first_string(value: &Value<'_>) -> Option<String> {
        match value {
            Value::Array(array) => array.iter().find_map(Self::string),
            Value::Value(inner) => Self::first_string(inner),
            other => Self::string(other),
        }
    }

    fn micros(value: &Value<'_>) -> Option<i64> {
        match value {
            Value::I64(v) => Some(*v),
            Value::U64(v) => i64::try_from(*v).ok(),
            Value::I32(v) => Some(i64::from(*v)),
            Value::U32(v) => Some(i64::from(*v)),
            Value::Value(inner) => Self::micros(inner),
            _ => None,
        }
    }
}

impl From<&HashMap<String, OwnedValue>> for TrackMetadata {
    fn from(metadata: &HashMap<String, OwnedValue>) -> Self {
        let field = |key: &str| metadata.get(key).map(|value| &**value);

        Self {
            title: field("xesam:title")
                .and_then(Self::string)
                .unwrap_or_default(),
            artist: field("xesam:artist")
                .and_then(Self::first_string)
                .unwrap_or_default(),
            art_url: field("mpris:artUrl")
                .and_then(Self::string)
                .unwrap_or_default(),
            length: field("mpris:length")
                .and_then(Self::micros)
                .filter(|length| *length > 0)
                .unwrap_or(0),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn owned(value: Value<'_>) -> OwnedValue {
        OwnedValue::try_from(value).unwrap()
    }

    fn metadata(entries: Vec<(&str, Value<'_>)>) -> HashMap<String, OwnedValue> {
        entries
            .into_iter()
            .map(|(key, value)| (key.to_string(), owned(value)))
            .collect()
    }

    #[test]
    fn extracts_known_fields() {
        let map = metadata(vec![
            ("xesam:title", Value::from("Starlight")),
            ("xesam:artist", Value::from(vec!["Muse", "Someone Else"])),
            ("mpris:artUrl", Value::from("file:///tmp/cover.png")),
            ("mpris:length", Value::from(240_000_000_i64)),
        ]);

        let track = TrackMetadata::from(&map);

        assert_eq!(track.title, "Starlight");
        assert_eq!(track.artist, "Muse");
        assert_eq!(track.art_url, "file:///tmp/cover.png");
        assert_eq!(track.length, 240_000_000);
    }

    #[test]
    fn missing_fields_are_empty() {
        let track = TrackMetadata::from(&HashMap::new());

        assert_eq!(track, TrackMetadata::default());
    }

    #[test]
    fn mistyped_fields_are_ignored() {
        let map = metadata(vec![
            ("xesam:title", Value::from(42_i32)),
            ("mpris:length", Value::from("long")),
        ]);

        let track = TrackMetadata::from(&map);

        assert!(track.title.is_empty());
        assert_eq!(track.length, 0);
    }

    #[test]
    fn unsigned_and_negative_lengths() {
        let map = metadata(vec![("mpris:length", Value::from(5_000_000_u64))]);
        assert_eq!(TrackMetadata::from(&map).length, 5_000_000);

        let map = metadata(vec![("mpris:length", Value::from(-1_i64))]);
        assert_eq!(TrackMetadata::from(&map).length, 0);
    }

    #[test]
    fn empty_artist_list() {
        let map = metadata(vec![("xesam:artist", Value::from(Vec::<&str>::new()))]);

        assert!(TrackMetadata::from(&map).artist.is_empty());
    }
}
