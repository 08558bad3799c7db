pub mod archive;
pub mod assembler;
pub mod bundle_model;
pub mod exporter;
pub mod pool;
pub mod prompt;
