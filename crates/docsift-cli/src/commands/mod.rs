pub mod ingest;
pub mod model;
pub mod namespace;
pub mod query;
