pub mod document;
pub mod ingest;
pub mod node;
