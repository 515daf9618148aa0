//! Leading `@key: value` metadata block.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub const DATE_TODAY: &str = "\\today";
const DATE_TODAY_MARKER: &str = "@datetoday";

/// Document metadata: plain string keys and values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, String>);

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries of `other` replace entries of `self`.
    pub fn merged_with(&self, other: &Metadata) -> Metadata {
        let mut merged = self.clone();
        merged
            .0
            .extend(other.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }

    pub fn title(&self) -> &str {
        self.get("title").unwrap_or("Untitled")
    }

    pub fn author(&self) -> &str {
        self.get("author").unwrap_or("Unknown")
    }

    pub fn date(&self) -> &str {
        self.get("date").unwrap_or(DATE_TODAY)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Split leading metadata lines off `text`.
///
/// Scanning stops at the first line that is neither metadata nor blank;
/// everything from that line on is returned untouched. Later `@` lines are
/// ordinary content.
pub fn extract(text: &str) -> (Metadata, String) {
    let lines: Vec<&str> = text.split('\n').collect();
    let mut metadata = Metadata::new();
    let mut content_start = 0;

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed == DATE_TODAY_MARKER {
            metadata.insert("date", DATE_TODAY);
        } else if let Some((key, value)) = metadata_entry(trimmed) {
            metadata.insert(key, value);
        } else if !trimmed.is_empty() {
            break;
        }
        content_start = i + 1;
    }

    let remaining = lines.get(content_start..).unwrap_or_default().join("\n");
    (metadata, remaining)
}

fn metadata_entry(trimmed: &str) -> Option<(&str, &str)> {
    let (key, value) = trimmed.strip_prefix('@')?.split_once(':')?;
    Some((key.trim(), value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_block() {
        let (metadata, rest) = extract("@title: X\n@author: Y\n\nBody");
        assert_eq!(metadata, Metadata::from_iter([("title", "X"), ("author", "Y")]));
        assert_eq!(rest, "Body");
    }

    #[test]
    fn no_metadata_leaves_text_untouched() {
        let text = "# Heading\n\n@title: late";
        let (metadata, rest) = extract(text);
        assert!(metadata.is_empty());
        assert_eq!(rest, text);
    }

    #[test]
    fn metadata_after_content_is_content() {
        let (metadata, rest) = extract("@title: A\nBody\n@author: B");
        assert_eq!(metadata.len(), 1);
        assert_eq!(rest, "Body\n@author: B");
    }

    #[test]
    fn date_today_marker() {
        let (metadata, rest) = extract("@datetoday\n@title: T\ntext");
        assert_eq!(metadata.date(), DATE_TODAY);
        assert_eq!(metadata.get("date"), Some(DATE_TODAY));
        assert_eq!(rest, "text");
    }

    #[test]
    fn value_keeps_later_colons() {
        let (metadata, _) = extract("@geometry: margin=1in, top=2cm\n@time: 10:30\nx");
        assert_eq!(metadata.get("geometry"), Some("margin=1in, top=2cm"));
        assert_eq!(metadata.get("time"), Some("10:30"));
    }

    #[test]
    fn at_line_without_colon_ends_metadata() {
        let (metadata, rest) = extract("@title: A\n@mention someone\nmore");
        assert_eq!(metadata.len(), 1);
        assert_eq!(rest, "@mention someone\nmore");
    }

    #[test]
    fn all_metadata_leaves_nothing() {
        let (metadata, rest) = extract("@title: Only\n\n");
        assert_eq!(metadata.title(), "Only");
        assert_eq!(rest, "");
    }

    #[test]
    fn defaults() {
        let metadata = Metadata::new();
        assert_eq!(metadata.title(), "Untitled");
        assert_eq!(metadata.author(), "Unknown");
        assert_eq!(metadata.date(), DATE_TODAY);
    }

    #[test]
    fn merge_prefers_other() {
        let base = Metadata::from_iter([("title", "Default"), ("author", "Team")]);
        let doc = Metadata::from_iter([("title", "Mine")]);
        let merged = base.merged_with(&doc);
        assert_eq!(merged.title(), "Mine");
        assert_eq!(merged.author(), "Team");
    }
}
