pub mod chunker;
pub mod ingest;
pub mod retrieve;
