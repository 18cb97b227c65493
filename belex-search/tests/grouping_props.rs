//! Property tests for catalog grouping and the source map.

use belex_gemini::{GroundingChunk, RetrievedContext, StoreDocument};
use belex_search::citations::SourceMap;
use belex_search::lawbook::{BookKey, Catalog, group_by_book};
use proptest::prelude::*;

/// Generate a store document with either a registry-numbered or a plain
/// display name.
fn arb_document() -> impl Strategy<Value = StoreDocument> {
    let display_name = prop_oneof![
        r"BSG_[0-9]{1,3}\.[0-9]{1,3}_[a-z]{3,10}\.pdf",
        r"[A-Za-z]{3,12}\.pdf",
    ];
    ("[a-z0-9]{6}", display_name).prop_map(|(id, display_name)| StoreDocument {
        name: format!("fileSearchStores/belex/documents/{id}"),
        display_name: Some(display_name),
        ..StoreDocument::default()
    })
}

/// Order-insensitive shape of a catalog: each book key with the multiset
/// of its entries, plus the sorted ungrouped labels.
#[allow(clippy::type_complexity)]
fn shape(catalog: &Catalog) -> (Vec<(BookKey, Vec<(String, String)>)>, Vec<String>) {
    let books = catalog
        .books
        .iter()
        .map(|group| {
            let mut entries: Vec<(String, String)> = group
                .entries
                .iter()
                .map(|entry| (entry.bsg.clone(), entry.document.name.clone()))
                .collect();
            entries.sort();
            (group.key.clone(), entries)
        })
        .collect();
    let mut ungrouped: Vec<String> =
        catalog.ungrouped.iter().map(|doc| doc.label().to_string()).collect();
    ungrouped.sort();
    (books, ungrouped)
}

/// *For any* document set, grouping SHALL assign every document to exactly
/// one bucket, keep book keys strictly ascending, and produce the same
/// buckets regardless of input order.
mod prop_catalog_grouping {
    use super::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn every_document_lands_in_exactly_one_bucket(
            documents in proptest::collection::vec(arb_document(), 0..25),
        ) {
            let catalog = group_by_book(&documents);
            let grouped: usize = catalog.books.iter().map(|group| group.entries.len()).sum();
            prop_assert_eq!(grouped + catalog.ungrouped.len(), documents.len());
        }

        #[test]
        fn book_keys_are_strictly_ascending(
            documents in proptest::collection::vec(arb_document(), 0..25),
        ) {
            let catalog = group_by_book(&documents);
            for pair in catalog.books.windows(2) {
                prop_assert!(pair[0].key < pair[1].key);
            }
            for group in &catalog.books {
                prop_assert!(!group.entries.is_empty());
                for pair in group.entries.windows(2) {
                    prop_assert!(pair[0].bsg <= pair[1].bsg);
                }
            }
        }

        #[test]
        fn grouping_ignores_input_order(
            (forward, shuffled) in proptest::collection::vec(arb_document(), 0..25)
                .prop_flat_map(|documents| {
                    let forward = Just(documents.clone());
                    (forward, Just(documents).prop_shuffle())
                }),
        ) {
            prop_assert_eq!(
                shape(&group_by_book(&forward)),
                shape(&group_by_book(&shuffled))
            );
        }
    }
}

/// *For any* chunk list, building the source map SHALL be idempotent and
/// SHALL never grow beyond one entry per distinct title.
mod prop_source_map {
    use super::*;

    fn arb_chunk() -> impl Strategy<Value = GroundingChunk> {
        let title = proptest::option::of(r"[A-D]\.pdf");
        let text = proptest::option::of(r"[a-z ]{0,20}");
        (title, text).prop_map(|(title, text)| GroundingChunk {
            web: None,
            retrieved_context: Some(RetrievedContext { uri: None, title, text }),
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn building_is_idempotent(
            chunks in proptest::collection::vec(arb_chunk(), 0..20),
        ) {
            prop_assert_eq!(SourceMap::from_chunks(&chunks), SourceMap::from_chunks(&chunks));
        }

        #[test]
        fn one_entry_per_distinct_title(
            chunks in proptest::collection::vec(arb_chunk(), 0..20),
        ) {
            let map = SourceMap::from_chunks(&chunks);
            let mut titles: Vec<&str> = map.iter().map(|entry| entry.title.as_str()).collect();
            let total = titles.len();
            titles.sort_unstable();
            titles.dedup();
            prop_assert_eq!(titles.len(), total);
            prop_assert!(total <= chunks.len());

            let snippets: usize = map.iter().map(|entry| entry.snippets.len()).sum();
            prop_assert!(snippets <= chunks.len());
        }
    }
}
