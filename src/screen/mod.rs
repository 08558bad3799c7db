pub mod analyzer;
pub mod heuristics;
pub mod screen_model;
