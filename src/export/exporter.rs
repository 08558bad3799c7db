use std::fmt::Write;
use std::path::PathBuf;

use tracing::debug;

use crate::canvas::node::{ExportFormat, NodeKind, Paint, SceneNode};
use crate::error::ExportError;

use super::archive::sanitize_filename;
use super::bundle_model::AssetFormat;

/// Turns one canvas node into encoded bytes. Called from worker threads.
pub trait AssetExporter: Send + Sync {
    fn name(&self) -> &'static str;

    fn export(&self, node: &SceneNode, format: AssetFormat) -> Result<Vec<u8>, ExportError>;
}

// ============================================================================
// SVG rendering
// ============================================================================

/// Renders a node subtree to SVG from its geometry and solid fills.
/// Raster formats are rejected.
pub struct SvgExporter;

impl AssetExporter for SvgExporter {
    fn name(&self) -> &'static str {
        "svg"
    }

    fn export(&self, node: &SceneNode, format: AssetFormat) -> Result<Vec<u8>, ExportError> {
        if format.format != ExportFormat::Svg {
            return Err(ExportError::UnsupportedFormat {
                exporter: self.name(),
                format: format.label(),
            });
        }
        Ok(render_svg(node).into_bytes())
    }
}

pub fn render_svg(node: &SceneNode) -> String {
    let g = node.geometry;
    let mut out = String::new();
    let _ = writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = g.width,
        h = g.height
    );
    render_shape(node, 0.0, 0.0, &mut out);
    for child in &node.children {
        render_node(child, &mut out);
    }
    out.push_str("</svg>\n");
    out
}

fn render_node(node: &SceneNode, out: &mut String) {
    if !node.visible {
        return;
    }
    let g = node.geometry;
    render_shape(node, g.x, g.y, out);
    if node.has_children() {
        let _ = writeln!(out, r#"<g transform="translate({},{})">"#, g.x, g.y);
        for child in &node.children {
            render_node(child, out);
        }
        out.push_str("</g>\n");
    }
}

fn render_shape(node: &SceneNode, x: f64, y: f64, out: &mut String) {
    let g = node.geometry;
    let fill = solid_fill(node);

    match &node.kind {
        NodeKind::Text(text) => {
            let _ = writeln!(
                out,
                r#"<text x="{}" y="{}" fill="{}">{}</text>"#,
                x,
                y + g.height,
                fill.as_deref().unwrap_or("#000000"),
                escape(&text.characters)
            );
        }
        NodeKind::Ellipse => {
            let _ = writeln!(
                out,
                r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" fill="{}"/>"#,
                x + g.width / 2.0,
                y + g.height / 2.0,
                g.width / 2.0,
                g.height / 2.0,
                fill.as_deref().unwrap_or("none")
            );
        }
        _ => {
            // Containers without a fill draw nothing themselves.
            if fill.is_none() && node.has_children() {
                return;
            }
            let _ = writeln!(
                out,
                r#"<rect x="{}" y="{}" width="{}" height="{}" fill="{}"/>"#,
                x,
                y,
                g.width,
                g.height,
                fill.as_deref().unwrap_or("none")
            );
        }
    }
}

fn solid_fill(node: &SceneNode) -> Option<String> {
    node.visual.fills.iter().find_map(|paint| match paint {
        Paint::Solid { color, .. } => Some(color.to_hex()),
        _ => None,
    })
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

// ============================================================================
// Pre-rendered files
// ============================================================================

/// Reads assets the host rendered ahead of time: `<sanitized id><suffix>.<ext>`
/// under `root`, e.g. `12_7@2x.png` for node `12:7` at PNG@2x.
pub struct DirectoryExporter {
    pub root: PathBuf,
}

impl DirectoryExporter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn file_name(node_id: &str, format: AssetFormat) -> String {
        format!(
            "{}{}.{}",
            sanitize_filename(node_id),
            format.suffix(),
            format.format.extension()
        )
    }
}

impl AssetExporter for DirectoryExporter {
    fn name(&self) -> &'static str {
        "directory"
    }

    fn export(&self, node: &SceneNode, format: AssetFormat) -> Result<Vec<u8>, ExportError> {
        let path = self.root.join(Self::file_name(&node.id, format));
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ExportError::Missing {
                node_id: node.id.clone(),
                format: format.label(),
            }),
            Err(e) => Err(e.into()),
        }
    }
}

// ============================================================================
// Fallback chain
// ============================================================================

/// Tries each exporter in order; the first success wins.
pub struct ChainExporter {
    exporters: Vec<Box<dyn AssetExporter>>,
}

impl ChainExporter {
    pub fn new(exporters: Vec<Box<dyn AssetExporter>>) -> Self {
        Self { exporters }
    }
}

impl AssetExporter for ChainExporter {
    fn name(&self) -> &'static str {
        "chain"
    }

    fn export(&self, node: &SceneNode, format: AssetFormat) -> Result<Vec<u8>, ExportError> {
        let mut last_error = None;
        for exporter in &self.exporters {
            match exporter.export(node, format) {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    debug!(exporter = exporter.name(), node = %node.id, error = %e, "exporter failed");
                    last_error = Some(e);
                }
            }
        }
        Err(last_error.unwrap_or_else(|| ExportError::Missing {
            node_id: node.id.clone(),
            format: format.label(),
        }))
    }
}
