use crate::services::mpris::PlayerId;

/// Case-insensitive substrings of bus names that never enter the player list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    patterns: Vec<String>,
}

impl IgnoreList {
    /// Parse a comma-separated list.
    ///
    /// Quotes and line breaks are stripped, entries are trimmed and
    /// lowercased, empty entries are dropped.
    pub fn parse(raw: &str) -> Self {
        let cleaned: String = raw
            .chars()
            .filter(|c| !matches!(c, '"' | '\'' | '\n' | '\r'))
            .collect();

        Self {
            patterns: cleaned
                .split(',')
                .map(|entry| entry.trim().to_lowercase())
                .filter(|entry| !entry.is_empty())
                .collect(),
        }
    }

    /// Whether any pattern occurs in the player's bus name.
    pub fn matches(&self, id: &PlayerId) -> bool {
        let name = id.bus_name().to_lowercase();
        self.patterns.iter().any(|pattern| name.contains(pattern))
    }

    /// Parsed patterns.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether nothing is ignored.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
