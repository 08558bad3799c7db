use serde::{Deserialize, Serialize};

use crate::canvas::node::ExportFormat;
use crate::discovery::component_model::ComponentSpec;
use crate::discovery::systems::DesignSystem;
use crate::screen::screen_model::ScreenSpec;

/// Everything handed to the code generator. Built once per export; never
/// mutated afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub component_specs: Vec<ComponentSpec>,
    pub screen_specs: Vec<ScreenSpec>,
    pub ai_prompts: Vec<AiPrompt>,
    pub assets: Vec<Asset>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptSubject {
    Component,
    Screen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiPrompt {
    pub name: String,
    pub subject: PromptSubject,
    pub design_system: DesignSystem,
    /// Pretty JSON of the spec the prompt is about.
    pub specifications: String,
    pub accessibility_requirements: String,
    /// Markdown handed to the code generator.
    pub body: String,
}

/// Format plus scale of one exported asset. Scale only matters for raster
/// formats.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AssetFormat {
    pub format: ExportFormat,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl AssetFormat {
    pub const SVG: AssetFormat = AssetFormat {
        format: ExportFormat::Svg,
        scale: 1.0,
    };

    pub fn png(scale: f64) -> Self {
        Self {
            format: ExportFormat::Png,
            scale,
        }
    }

    /// File-name suffix: `""` at 1x, `"@2x"` otherwise.
    pub fn suffix(&self) -> String {
        if !self.format.is_raster() || self.scale == 1.0 {
            String::new()
        } else {
            format!("@{}x", self.scale)
        }
    }

    pub fn label(&self) -> String {
        format!("{}{}", self.format.extension().to_uppercase(), self.suffix())
    }
}

/// SVG, PNG@1x, PNG@2x, PNG@3x.
pub fn default_asset_formats() -> Vec<AssetFormat> {
    vec![
        AssetFormat::SVG,
        AssetFormat::png(1.0),
        AssetFormat::png(2.0),
        AssetFormat::png(3.0),
    ]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub name: String,
    pub node_id: String,
    pub format: AssetFormat,
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// `specs/manifest.json` entry describing one archived asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    pub name: String,
    pub node_id: String,
    pub format: String,
    pub path: String,
    pub bytes: usize,
    pub sha1: String,
}
