// Campaign Finance Ingestion - Core Library
// Exposes all modules for use in the CLI and tests

pub mod error;      // Error taxonomy
pub mod config;     // TOML configuration
pub mod schema;     // Schema Registry - column layouts per source, kind and year
pub mod table;      // RawTable - the in-memory table every stage passes along
pub mod lookups;    // Code dictionaries and organization keywords
pub mod loader;     // Tabular Loader - delimited files and fetched batches
pub mod fetcher;    // Paginated Fetcher - the Arizona reporting API
pub mod normalize;  // Row Normalizer - dates, amounts, names, codes
pub mod entities;   // Canonical Transaction and Entity records
pub mod resolver;   // Cross-Table Resolver - left joins and entity dedup
pub mod cleaner;    // Unified Cleaner Interface - one pipeline per source
pub mod export;     // CSV output of the canonical tables

// Re-export commonly used types
pub use error::{
    EntityResolutionGap, Error, FetchError, InvalidCategoryError, MalformedRowError, Result,
    UnknownSchemaError,
};
pub use config::{Config, FetchConfig};
pub use schema::{resolve_rename_map, resolve_schema, ColumnSchema, DocumentKind, Epoch, Source};
pub use table::{Cell, RawRow, RawTable, TableDiagnostics};
pub use loader::{load_batch, load_file, read_batch_file};
pub use fetcher::{
    detail_parent, ApiFetcher, Category, FetchFailure, HttpTransport, RawBatch, TableTransport,
};
pub use entities::{EntityClass, EntityKind, EntityRecord, Transaction};
pub use resolver::{link_transactions_to_entities, JoinSpec};
pub use cleaner::{
    clean_sources, cleaner_for, ArizonaCleaner, CanonicalTables, CleanReport,
    PennsylvaniaCleaner, SourceOutcome, StateCleaner,
};
pub use export::write_tables;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
