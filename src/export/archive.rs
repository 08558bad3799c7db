use std::collections::HashSet;
use std::io::{Cursor, Write};

use sha1::{Digest, Sha1};
use tracing::info;
use zip::CompressionMethod;
use zip::write::{FileOptions, ZipWriter};

use crate::error::Result;

use super::bundle_model::{ExportBundle, ManifestEntry};

pub const COMPONENTS_PATH: &str = "specs/components.json";
pub const SCREENS_PATH: &str = "specs/screens.json";
pub const MANIFEST_PATH: &str = "specs/manifest.json";

/// Zip the bundle: `specs/` (components, screens, manifest), `prompts/`
/// (one Markdown file per prompt) and `assets/`.
pub fn write_archive(bundle: &ExportBundle) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options: FileOptions<'_, ()> =
        FileOptions::default().compression_method(CompressionMethod::Deflated);

    zip.start_file(COMPONENTS_PATH, options.clone())?;
    zip.write_all(serde_json::to_string_pretty(&bundle.component_specs)?.as_bytes())?;

    zip.start_file(SCREENS_PATH, options.clone())?;
    zip.write_all(serde_json::to_string_pretty(&bundle.screen_specs)?.as_bytes())?;

    let mut prompt_names = UniqueNames::default();
    for prompt in &bundle.ai_prompts {
        let path = format!("prompts/{}.md", prompt_names.claim(&sanitize_filename(&prompt.name)));
        zip.start_file(path, options.clone())?;
        zip.write_all(prompt.body.as_bytes())?;
    }

    let mut asset_names = UniqueNames::default();
    let mut manifest = Vec::with_capacity(bundle.assets.len());
    for asset in &bundle.assets {
        let stem = format!("{}{}", sanitize_filename(&asset.name), asset.format.suffix());
        let path = format!(
            "assets/{}.{}",
            asset_names.claim(&stem),
            asset.format.format.extension()
        );

        zip.start_file(path.as_str(), options.clone())?;
        zip.write_all(&asset.data)?;

        manifest.push(ManifestEntry {
            name: asset.name.clone(),
            node_id: asset.node_id.clone(),
            format: asset.format.label(),
            path,
            bytes: asset.data.len(),
            sha1: hex_digest(&asset.data),
        });
    }

    zip.start_file(MANIFEST_PATH, options)?;
    zip.write_all(serde_json::to_string_pretty(&manifest)?.as_bytes())?;

    let bytes = zip.finish()?.into_inner();
    info!(
        bytes = bytes.len(),
        prompts = bundle.ai_prompts.len(),
        assets = bundle.assets.len(),
        "archive written"
    );
    Ok(bytes)
}

/// Sanitize a layer or node name into a safe filename.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect::<String>()
        .to_lowercase();

    if cleaned.is_empty() {
        "unnamed".to_string()
    } else {
        cleaned
    }
}

/// Hands out `name`, then `name_2`, `name_3`, ... for repeats.
#[derive(Debug, Default)]
struct UniqueNames {
    taken: HashSet<String>,
}

impl UniqueNames {
    fn claim(&mut self, name: &str) -> String {
        if self.taken.insert(name.to_string()) {
            return name.to_string();
        }
        let mut n = 2;
        loop {
            let candidate = format!("{name}_{n}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

fn hex_digest(data: &[u8]) -> String {
    Sha1::digest(data)
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}
