use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::canvas::document::Canvas;
use crate::canvas::node::SceneNode;
use crate::discovery::component_model::ComponentSpec;
use crate::error::{PreconditionError, Result};
use crate::screen::screen_model::ScreenSpec;

use super::bundle_model::{Asset, AssetFormat, ExportBundle, default_asset_formats};
use super::exporter::AssetExporter;
use super::pool::{DEFAULT_CONCURRENCY, PoolTask, WorkerPool};
use super::prompt::{component_prompts, screen_prompt};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblerConfig {
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,

    #[serde(default = "default_asset_formats")]
    pub formats: Vec<AssetFormat>,
}

fn default_concurrency() -> usize {
    DEFAULT_CONCURRENCY
}

fn default_task_timeout_secs() -> u64 {
    30
}

impl Default for AssemblerConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            task_timeout_secs: default_task_timeout_secs(),
            formats: default_asset_formats(),
        }
    }
}

/// Nodes worth exporting as standalone assets.
pub fn is_exportable(node: &SceneNode) -> bool {
    !node.export_settings.is_empty() || node.kind.is_exportable_primitive()
}

/// Builds the export bundle: prompts for every component and screen, plus
/// assets rendered by the configured exporter on a bounded worker pool.
pub struct Assembler {
    exporter: Arc<dyn AssetExporter>,
    pool: WorkerPool,
    formats: Vec<AssetFormat>,
}

impl Assembler {
    pub fn new(exporter: Arc<dyn AssetExporter>, config: &AssemblerConfig) -> Self {
        Self {
            exporter,
            pool: WorkerPool::new(
                config.concurrency,
                Duration::from_secs(config.task_timeout_secs),
            ),
            formats: config.formats.clone(),
        }
    }

    pub fn with_pool(mut self, pool: WorkerPool) -> Self {
        self.pool = pool;
        self
    }

    pub async fn assemble(
        &self,
        canvas: &Canvas,
        components: Vec<ComponentSpec>,
        screens: Vec<ScreenSpec>,
        cancel: &CancellationToken,
    ) -> Result<ExportBundle> {
        if components.is_empty() && screens.is_empty() {
            return Err(PreconditionError::NothingToExport.into());
        }

        let mut ai_prompts = component_prompts(&components);
        ai_prompts.extend(screens.iter().map(|s| screen_prompt(s, &components)));
        cancel.check()?;

        let tasks = self.asset_tasks(canvas, &components);
        let task_count = tasks.len();
        debug!(tasks = task_count, exporter = self.exporter.name(), "exporting assets");

        let mut assets = Vec::with_capacity(task_count);
        for result in self.pool.run(tasks, cancel).await? {
            match result {
                Ok(asset) => assets.push(asset),
                Err(e) => warn!(error = %e, "skipping asset"),
            }
        }
        cancel.check()?;

        info!(
            components = components.len(),
            screens = screens.len(),
            prompts = ai_prompts.len(),
            assets = assets.len(),
            failed = task_count - assets.len(),
            "export bundle assembled"
        );

        Ok(ExportBundle {
            component_specs: components,
            screen_specs: screens,
            ai_prompts,
            assets,
        })
    }

    /// One task per (exportable node, format). A node shared by several
    /// components is exported once.
    fn asset_tasks(&self, canvas: &Canvas, components: &[ComponentSpec]) -> Vec<PoolTask<Asset>> {
        let mut seen = HashSet::new();
        let mut tasks = Vec::new();

        for component in components.iter().flat_map(|c| c.with_variants()) {
            let Some(root) = canvas.find_by_id(component.node_id()) else {
                debug!(component = %component.id, "component node no longer exists");
                continue;
            };

            for node in root.find_all(is_exportable) {
                if !seen.insert(node.id.clone()) {
                    continue;
                }
                let node = Arc::new(node.clone());
                for format in &self.formats {
                    let format = *format;
                    let node = Arc::clone(&node);
                    let exporter = Arc::clone(&self.exporter);
                    tasks.push(PoolTask::new(node.id.clone(), move || {
                        let data = exporter.export(&node, format)?;
                        Ok(Asset {
                            name: node.name.clone(),
                            node_id: node.id.clone(),
                            format,
                            data,
                        })
                    }));
                }
            }
        }

        tasks
    }
}
