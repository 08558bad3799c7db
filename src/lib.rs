//! Component discovery for design canvases.
//!
//! Ingests a canvas document, finds structurally repeated subtrees and groups
//! them into components with style variants, analyzes selected frames into
//! screen specs with inferred dependencies and permissions, and packages
//! everything into an export bundle for code generation.

pub mod cancel;
pub mod canvas;
pub mod cli;
pub mod discovery;
pub mod enrich;
pub mod error;
pub mod export;
pub mod logging;
pub mod screen;
pub mod session;
pub mod style;

pub use cancel::CancellationToken;
pub use canvas::document::Canvas;
pub use canvas::node::SceneNode;
pub use discovery::component_model::ComponentSpec;
pub use discovery::engine::{DiscoveryConfig, discover, discover_canvas};
pub use error::{PipelineError, Result};
pub use export::assembler::Assembler;
pub use export::bundle_model::ExportBundle;
pub use screen::analyzer::{AnalysisConfig, analyze};
pub use screen::screen_model::ScreenSpec;
pub use session::Session;
