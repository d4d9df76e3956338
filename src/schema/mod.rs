pub mod mapping;
pub mod record;

pub use mapping::{
    canonical_columns, canonical_name, resolve_headers, ResolvedSchema, SCHEMA_MAPPING,
};
pub use record::CanonicalRecord;
