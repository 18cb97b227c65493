//! Grouping of the document catalog into law books.
//!
//! The Bernese systematic collection arranges laws into books by the
//! leading segment of the registry number: `153.01` belongs to book `153`.
//! Catalog views group documents that way, list newest uploads first, and
//! report duplicated display names.

use crate::citations::extract_bsg_number;
use belex_gemini::StoreDocument;
use std::collections::{BTreeMap, HashMap};

/// Sort key of a law book.
///
/// All-digit book numbers order numerically (then by exact spelling, so
/// `015` and `15` stay distinct neighbors); everything else orders
/// lexically after the numeric books. The derived `Ord` encodes exactly
/// that.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BookKey {
    Numeric(u64, String),
    Other(String),
}

impl BookKey {
    /// Book key for a registry number: its leading dot-separated segment.
    pub fn from_registry_number(bsg: &str) -> Self {
        let book = bsg.split('.').next().unwrap_or(bsg);
        match book.parse::<u64>() {
            Ok(value) => BookKey::Numeric(value, book.to_string()),
            Err(_) => BookKey::Other(book.to_string()),
        }
    }

    /// The book number as shown in catalog headings.
    pub fn as_str(&self) -> &str {
        match self {
            BookKey::Numeric(_, raw) => raw,
            BookKey::Other(raw) => raw,
        }
    }
}

/// A catalog line: the extracted registry number and its document.
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub bsg: String,
    pub document: StoreDocument,
}

/// All documents of one law book, ordered by registry number.
#[derive(Debug)]
pub struct BookGroup {
    pub key: BookKey,
    pub entries: Vec<CatalogEntry>,
}

/// The grouped catalog.
#[derive(Debug, Default)]
pub struct Catalog {
    /// Book groups in ascending [`BookKey`] order.
    pub books: Vec<BookGroup>,
    /// Documents whose label yields no registry number, in input order.
    pub ungrouped: Vec<StoreDocument>,
}

/// Groups documents into law books by the leading registry-number segment.
///
/// Membership depends only on each document's label, never on input
/// order; within a group, entries sort lexically by full registry number.
pub fn group_by_book(documents: &[StoreDocument]) -> Catalog {
    let mut books: BTreeMap<BookKey, Vec<CatalogEntry>> = BTreeMap::new();
    let mut ungrouped = Vec::new();

    for document in documents {
        match extract_bsg_number(document.label()) {
            Some(bsg) => {
                let key = BookKey::from_registry_number(bsg);
                books
                    .entry(key)
                    .or_default()
                    .push(CatalogEntry { bsg: bsg.to_string(), document: document.clone() });
            }
            None => ungrouped.push(document.clone()),
        }
    }

    let books = books
        .into_iter()
        .map(|(key, mut entries)| {
            entries.sort_by(|a, b| a.bsg.cmp(&b.bsg));
            BookGroup { key, entries }
        })
        .collect();

    Catalog { books, ungrouped }
}

/// Documents ordered newest first.
///
/// `createTime` values are RFC 3339 in UTC, which compare correctly as
/// strings; documents without one go last.
pub fn sort_by_create_time_desc(documents: &[StoreDocument]) -> Vec<StoreDocument> {
    let mut sorted = documents.to_vec();
    sorted.sort_by(|a, b| b.create_time.cmp(&a.create_time));
    sorted
}

/// Documents sharing one display name.
#[derive(Debug)]
pub struct DuplicateGroup {
    pub label: String,
    pub documents: Vec<StoreDocument>,
}

/// Result of a duplicate scan over the catalog.
#[derive(Debug, Default)]
pub struct DuplicateReport {
    /// Labels held by more than one document, in first-encounter order.
    pub groups: Vec<DuplicateGroup>,
    /// Count of removable copies, `Σ (group size − 1)`.
    pub total: usize,
}

impl DuplicateReport {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Scans the catalog for documents sharing a display name.
///
/// Detection only; nothing prevents duplicate uploads.
pub fn find_duplicates(documents: &[StoreDocument]) -> DuplicateReport {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup> = Vec::new();

    for document in documents {
        let label = document.label();
        let slot = match index.get(label) {
            Some(slot) => *slot,
            None => {
                groups.push(DuplicateGroup { label: label.to_string(), documents: Vec::new() });
                index.insert(label.to_string(), groups.len() - 1);
                groups.len() - 1
            }
        };
        groups[slot].documents.push(document.clone());
    }

    let groups: Vec<DuplicateGroup> =
        groups.into_iter().filter(|group| group.documents.len() > 1).collect();
    let total = groups.iter().map(|group| group.documents.len() - 1).sum();
    DuplicateReport { groups, total }
}
