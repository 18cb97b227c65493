//! Citation handling: registry-number extraction from document titles and
//! the grouping of grounding chunks into a per-source map.
//!
//! BELEX document titles carry the systematic registry number of the law
//! ("BSG-Nummer"), e.g. `BSG_153.01_Personalgesetz.pdf`. The number links a
//! cited document to its entry on the cantonal law portal.

use belex_gemini::{GenerationResponse, GroundingChunk};
use regex::Regex;
use std::sync::LazyLock;

/// Base address of the cantonal law portal.
pub const BELEX_PORTAL: &str = "https://www.belex.sites.be.ch";

/// Entry label for grounding chunks that carry no source title.
pub const UNKNOWN_SOURCE: &str = "Unbekannte Quelle";

static BSG_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    // "BSG" marker, optional separator, dotted digit run, optional "-n" suffix
    Regex::new(r"BSG[\s_]?([\d.]+(?:-\d+)?)")
        .expect("unreachable error: failed to compile registry number pattern")
});

/// Extracts the registry number from a document title.
///
/// The first occurrence wins. Returns `None` when the title carries no
/// `BSG` marker, in which case callers show the title unadorned.
///
/// ```
/// use belex_search::citations::extract_bsg_number;
///
/// assert_eq!(extract_bsg_number("BSG_432.311_Volksschulgesetz.pdf"), Some("432.311"));
/// assert_eq!(extract_bsg_number("Unbekannt.pdf"), None);
/// ```
pub fn extract_bsg_number(title: &str) -> Option<&str> {
    BSG_NUMBER.captures(title).and_then(|captures| captures.get(1)).map(|m| m.as_str())
}

/// Deep link to a law on the cantonal portal.
pub fn law_url(bsg: &str) -> String {
    format!("{BELEX_PORTAL}/api/de/texts_of_law/{bsg}")
}

/// One cited source: a document title and the snippets retrieved from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    pub title: String,
    pub snippets: Vec<String>,
}

/// The sources behind an answer, keyed by document title.
///
/// Entries keep first-encounter order and each entry collects its snippets
/// in encounter order. Building the map is a pure transform of the
/// response: the same response always yields the same map.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceMap {
    entries: Vec<SourceEntry>,
}

impl SourceMap {
    /// Builds the map from the grounding chunks of a response.
    pub fn from_response(response: &GenerationResponse) -> Self {
        Self::from_chunks(response.grounding_chunks())
    }

    /// Builds the map from raw grounding chunks.
    ///
    /// Chunks without retrieved context are skipped; chunks with context
    /// but no title (or an empty one) are filed under
    /// [`UNKNOWN_SOURCE`]. Snippets are trimmed, and a chunk without
    /// snippet text still establishes its source entry.
    pub fn from_chunks(chunks: &[GroundingChunk]) -> Self {
        let mut map = Self::default();
        for chunk in chunks {
            let Some(context) = &chunk.retrieved_context else { continue };
            let title =
                context.title.as_deref().filter(|title| !title.is_empty()).unwrap_or(UNKNOWN_SOURCE);
            let entry = map.entry_mut(title);
            if let Some(text) = context.text.as_deref() {
                let text = text.trim();
                if !text.is_empty() {
                    entry.snippets.push(text.to_string());
                }
            }
        }
        map
    }

    fn entry_mut(&mut self, title: &str) -> &mut SourceEntry {
        let index = match self.entries.iter().position(|entry| entry.title == title) {
            Some(index) => index,
            None => {
                self.entries.push(SourceEntry { title: title.to_string(), snippets: Vec::new() });
                self.entries.len() - 1
            }
        };
        &mut self.entries[index]
    }

    /// Entries in first-encounter order.
    pub fn iter(&self) -> impl Iterator<Item = &SourceEntry> {
        self.entries.iter()
    }

    /// Snippets recorded for a title.
    pub fn get(&self, title: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|entry| entry.title == title)
            .map(|entry| entry.snippets.as_slice())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a SourceMap {
    type Item = &'a SourceEntry;
    type IntoIter = std::slice::Iter<'a, SourceEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use belex_gemini::RetrievedContext;

    fn chunk(title: Option<&str>, text: Option<&str>) -> GroundingChunk {
        GroundingChunk {
            web: None,
            retrieved_context: Some(RetrievedContext {
                uri: None,
                title: title.map(str::to_string),
                text: text.map(str::to_string),
            }),
        }
    }

    #[test]
    fn extracts_registry_numbers() {
        let cases = [
            ("BSG_432.311_Volksschulgesetz.pdf", Some("432.311")),
            ("BSG 153.01 Personalgesetz", Some("153.01")),
            // Nothing separates the extension: the greedy run keeps its dot.
            ("BSG101.1.pdf", Some("101.1.")),
            ("Dekret BSG 152.021-1", Some("152.021-1")),
            ("Unbekannt.pdf", None),
            ("", None),
        ];
        for (title, expected) in cases {
            assert_eq!(extract_bsg_number(title), expected, "title: {title:?}");
        }
    }

    #[test]
    fn first_registry_number_wins() {
        assert_eq!(extract_bsg_number("BSG 153.01 ersetzt BSG 153.011"), Some("153.01"));
    }

    #[test]
    fn law_url_points_at_portal() {
        assert_eq!(
            law_url("432.311"),
            "https://www.belex.sites.be.ch/api/de/texts_of_law/432.311"
        );
    }

    #[test]
    fn source_map_keeps_encounter_order() {
        let chunks = [
            chunk(Some("B.pdf"), Some("erste Stelle")),
            chunk(Some("A.pdf"), Some("zweite Stelle")),
            chunk(Some("B.pdf"), Some("dritte Stelle")),
        ];

        let map = SourceMap::from_chunks(&chunks);
        let titles: Vec<&str> = map.iter().map(|entry| entry.title.as_str()).collect();
        assert_eq!(titles, ["B.pdf", "A.pdf"]);
        assert_eq!(map.get("B.pdf").unwrap(), ["erste Stelle", "dritte Stelle"]);
        assert_eq!(map.get("A.pdf").unwrap(), ["zweite Stelle"]);
    }

    #[test]
    fn source_map_trims_and_drops_blank_snippets() {
        let chunks = [chunk(Some("A.pdf"), Some("  Art. 5  ")), chunk(Some("A.pdf"), Some("   "))];

        let map = SourceMap::from_chunks(&chunks);
        assert_eq!(map.get("A.pdf").unwrap(), ["Art. 5"]);
    }

    #[test]
    fn source_map_files_untitled_chunks_under_unknown() {
        let chunks = [chunk(None, Some("verwaister Auszug")), chunk(Some(""), None)];

        let map = SourceMap::from_chunks(&chunks);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(UNKNOWN_SOURCE).unwrap(), ["verwaister Auszug"]);
    }

    #[test]
    fn source_map_skips_chunks_without_context() {
        let chunks = [GroundingChunk::default(), chunk(Some("A.pdf"), None)];

        let map = SourceMap::from_chunks(&chunks);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("A.pdf").unwrap(), &[] as &[String]);
    }

    #[test]
    fn source_map_is_idempotent() {
        let chunks = [
            chunk(Some("B.pdf"), Some("x")),
            chunk(None, Some("y")),
            chunk(Some("A.pdf"), None),
        ];
        assert_eq!(SourceMap::from_chunks(&chunks), SourceMap::from_chunks(&chunks));
    }
}
