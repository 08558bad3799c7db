pub mod extract;
pub mod signature;
pub mod style_model;
