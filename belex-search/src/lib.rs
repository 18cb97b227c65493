//! Domain core of the BELEX search tooling.
//!
//! BELEX is the systematic collection of Bernese law ("Bernische
//! Systematische Gesetzessammlung"). This crate holds everything the web
//! front-ends and the command-line client share: configuration loading,
//! registry-number extraction and citation grouping, the law-book catalog
//! views, official-title resolution against the cantonal portal, the
//! [`LawStore`] seam over the Gemini File Search backend, and the search
//! engine itself.

pub mod citations;
pub mod config;
pub mod engine;
pub mod error;
pub mod lawbook;
pub mod store;
pub mod titles;

pub use citations::{BELEX_PORTAL, SourceEntry, SourceMap, extract_bsg_number, law_url};
pub use config::BelexConfig;
pub use engine::{Answer, BelexSearchEngine};
pub use error::{Result, SearchError};
pub use lawbook::{
    BookGroup, BookKey, Catalog, CatalogEntry, DuplicateGroup, DuplicateReport, find_duplicates,
    group_by_book, sort_by_create_time_desc,
};
pub use store::{
    DocumentListing, GeminiLawStore, LawStore, MAX_UPLOAD_BYTES, UploadRequest, is_webapp_upload,
};
pub use titles::TitleResolver;
