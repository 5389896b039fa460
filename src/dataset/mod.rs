//! HR corpus schema, records, loading and splitting.

pub mod loader;
pub mod record;
pub mod schema;
pub mod split;

pub use loader::{Corpus, CorpusError, load_corpus, parse_corpus};
pub use record::{EmployeeRecord, RawRecord};
pub use schema::{
    Department, FEATURE_COUNT, Feature, FeatureKind, SalaryBand, TARGET_COLUMN, UnknownCategory,
    feature_columns,
};
pub use split::{SplitIndices, train_test_split};
