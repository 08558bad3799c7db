pub mod component_model;
pub mod engine;
pub mod mapping;
pub mod structural_hash;
pub mod systems;
