//! One canvas, one long operation at a time.
//!
//! `Idle → Discovering | Analyzing | Exporting → Idle | Failed`. A request
//! arriving while an operation runs is rejected with `OperationInProgress`;
//! `Failed` accepts new work. Results are published only when an operation
//! completes, so a cancelled or failed run leaves the previous catalog and
//! screens in place.

pub mod channel;

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::canvas::document::Canvas;
use crate::canvas::node::SceneNode;
use crate::discovery::component_model::ComponentSpec;
use crate::discovery::engine::{DiscoveryConfig, collect_candidates, discover};
use crate::discovery::mapping::apply_best_mapping;
use crate::discovery::systems::DesignSystem;
use crate::enrich::{TextEnrichment, enrich_screens};
use crate::error::{PipelineError, PreconditionError, Result};
use crate::export::archive::write_archive;
use crate::export::assembler::{Assembler, AssemblerConfig};
use crate::export::bundle_model::ExportBundle;
use crate::export::exporter::AssetExporter;
use crate::screen::analyzer::{AnalysisConfig, analyze, check_selection};
use crate::screen::screen_model::ScreenSpec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Discovery,
    Analysis,
    Export,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Discovering,
    Analyzing,
    Exporting,
    Failed(String),
}

impl SessionState {
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SessionState::Discovering | SessionState::Analyzing | SessionState::Exporting
        )
    }

    fn running(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Discovery => SessionState::Discovering,
            OperationKind::Analysis => SessionState::Analyzing,
            OperationKind::Export => SessionState::Exporting,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    pub discovery: DiscoveryConfig,
    pub analysis: AnalysisConfig,
    pub assembler: AssemblerConfig,
    /// Fill each discovered component's mapping from this system's catalog.
    pub map_to: Option<DesignSystem>,
}

/// Proof that an operation was admitted. Returns the session to `Idle` when
/// dropped without [`finish`](Self::finish). Owns its handle on the session
/// state, so it can move into the task that runs the operation.
pub struct OperationGuard {
    state: Arc<Mutex<SessionState>>,
    kind: OperationKind,
    finished: bool,
}

impl OperationGuard {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Cancellation and precondition failures return to `Idle`; anything
    /// else leaves `Failed`.
    pub fn finish<T>(mut self, result: &Result<T>) {
        let next = match result {
            Ok(_) => SessionState::Idle,
            Err(e) if e.is_cancelled() || e.is_user_facing() => SessionState::Idle,
            Err(e) => SessionState::Failed(e.to_string()),
        };
        debug!(operation = ?self.kind, state = ?next, "operation finished");
        *lock(&self.state) = next;
        self.finished = true;
    }
}

impl Drop for OperationGuard {
    fn drop(&mut self) {
        if !self.finished {
            *lock(&self.state) = SessionState::Idle;
        }
    }
}

pub struct Session {
    canvas: Arc<Canvas>,
    config: SessionConfig,
    exporter: Arc<dyn AssetExporter>,
    enrichment: Option<Arc<dyn TextEnrichment>>,
    enrichment_token: Option<String>,
    state: Arc<Mutex<SessionState>>,
    cancel: CancellationToken,
    components: Mutex<Vec<ComponentSpec>>,
    screens: Mutex<Vec<ScreenSpec>>,
}

impl Session {
    pub fn new(canvas: Canvas, config: SessionConfig, exporter: Arc<dyn AssetExporter>) -> Self {
        Self {
            canvas: Arc::new(canvas),
            config,
            exporter,
            enrichment: None,
            enrichment_token: None,
            state: Arc::new(Mutex::new(SessionState::Idle)),
            cancel: CancellationToken::new(),
            components: Mutex::new(Vec::new()),
            screens: Mutex::new(Vec::new()),
        }
    }

    pub fn with_enrichment(mut self, enrichment: Arc<dyn TextEnrichment>) -> Self {
        self.enrichment = Some(enrichment);
        self
    }

    /// Bearer token presented with every enrichment request.
    pub fn with_enrichment_token(mut self, token: Option<String>) -> Self {
        self.enrichment_token = token;
        self
    }

    /// Start from a catalog produced earlier (e.g. loaded from disk).
    pub fn with_components(self, components: Vec<ComponentSpec>) -> Self {
        *lock(&self.components) = components;
        self
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    pub fn state(&self) -> SessionState {
        self.lock_state().clone()
    }

    pub fn components(&self) -> Vec<ComponentSpec> {
        lock(&self.components).clone()
    }

    pub fn screens(&self) -> Vec<ScreenSpec> {
        lock(&self.screens).clone()
    }

    /// Admit a new operation, or reject it while another one runs.
    ///
    /// The cancellation token is re-armed under the state lock, so a cancel
    /// that sees the session busy always reaches the admitted operation.
    pub fn begin(&self, kind: OperationKind) -> Result<OperationGuard> {
        let mut state = self.lock_state();
        if state.is_busy() {
            debug!(requested = ?kind, current = ?*state, "rejecting concurrent operation");
            return Err(PipelineError::OperationInProgress);
        }
        *state = SessionState::running(kind);
        self.cancel.reset();
        drop(state);

        info!(operation = ?kind, "operation started");
        Ok(OperationGuard {
            state: Arc::clone(&self.state),
            kind,
            finished: false,
        })
    }

    /// Preconditions of `kind`, checked before any work is announced.
    /// `screen_ids` only matters for analysis.
    pub fn precheck(&self, kind: OperationKind, screen_ids: &[String]) -> Result<()> {
        match kind {
            OperationKind::Discovery => Ok(()),
            OperationKind::Analysis => {
                let selection = self.resolve(screen_ids)?;
                check_selection(&selection, &self.config.analysis)?;
                Ok(())
            }
            OperationKind::Export => {
                if lock(&self.components).is_empty() && lock(&self.screens).is_empty() {
                    Err(PreconditionError::NothingToExport.into())
                } else {
                    Ok(())
                }
            }
        }
    }

    /// Request cancellation of the running operation. Returns false when the
    /// session is idle.
    pub fn cancel(&self) -> bool {
        let state = self.lock_state();
        if state.is_busy() {
            info!(operation = ?*state, "cancellation requested");
            self.cancel.cancel();
            true
        } else {
            false
        }
    }

    pub fn find_node(&self, node_id: &str) -> Option<&SceneNode> {
        self.canvas.find_by_id(node_id)
    }

    // ------------------------------------------------------------------
    // Discovery
    // ------------------------------------------------------------------

    pub fn discover(&self) -> Result<Vec<ComponentSpec>> {
        let guard = self.begin(OperationKind::Discovery)?;
        let result = self.run_discovery(&guard, &|_| {});
        guard.finish(&result);
        result
    }

    pub fn run_discovery(
        &self,
        _guard: &OperationGuard,
        progress: &dyn Fn(String),
    ) -> Result<Vec<ComponentSpec>> {
        let candidates = collect_candidates(&self.canvas, &self.config.discovery);
        progress(format!("Analyzing {} candidate nodes", candidates.len()));

        let mut components = discover(&candidates, &self.config.discovery, &self.cancel)?;
        if let Some(system) = self.config.map_to {
            for component in &mut components {
                apply_best_mapping(component, system);
            }
        }

        *lock(&self.components) = components.clone();
        Ok(components)
    }

    // ------------------------------------------------------------------
    // Screen analysis
    // ------------------------------------------------------------------

    pub fn analyze(&self, screen_ids: &[String]) -> Result<Vec<ScreenSpec>> {
        let guard = self.begin(OperationKind::Analysis)?;
        let result = self.run_analysis(&guard, screen_ids, &|_| {});
        guard.finish(&result);
        result
    }

    pub fn run_analysis(
        &self,
        _guard: &OperationGuard,
        screen_ids: &[String],
        progress: &dyn Fn(String),
    ) -> Result<Vec<ScreenSpec>> {
        let selection = self.resolve(screen_ids)?;
        let components = self.components();

        let mut screens = analyze(&selection, &components, &self.config.analysis, &self.cancel)?;

        if let Some(enrichment) = &self.enrichment {
            progress(format!("Generating prompts for {} screens", screens.len()));
            enrich_screens(
                enrichment.as_ref(),
                &mut screens,
                self.enrichment_token.as_deref(),
            );
            self.cancel.check()?;
        }

        *lock(&self.screens) = screens.clone();
        Ok(screens)
    }

    fn resolve(&self, ids: &[String]) -> Result<Vec<&SceneNode>> {
        ids.iter()
            .map(|id| {
                self.canvas
                    .find_by_id(id)
                    .ok_or_else(|| PreconditionError::UnknownNode(id.clone()).into())
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    /// Assemble the bundle and, when `output` is given, write the archive.
    pub async fn export(&self, output: Option<&Path>) -> Result<ExportOutcome> {
        let guard = self.begin(OperationKind::Export)?;
        let result = self.run_export(&guard, output, &|_| {}).await;
        guard.finish(&result);
        result
    }

    pub async fn run_export(
        &self,
        _guard: &OperationGuard,
        output: Option<&Path>,
        progress: &(dyn Fn(String) + Sync),
    ) -> Result<ExportOutcome> {
        let assembler = Assembler::new(Arc::clone(&self.exporter), &self.config.assembler);
        let bundle = assembler
            .assemble(&self.canvas, self.components(), self.screens(), &self.cancel)
            .await?;

        progress(format!(
            "Packaging {} prompts and {} assets",
            bundle.ai_prompts.len(),
            bundle.assets.len()
        ));
        let archive = write_archive(&bundle)?;
        self.cancel.check()?;

        let path = match output {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(path, &archive)?;
                info!(path = %path.display(), bytes = archive.len(), "archive saved");
                Some(path.to_path_buf())
            }
            None => None,
        };

        Ok(ExportOutcome {
            bundle,
            archive,
            path,
        })
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        lock(&self.state)
    }
}

/// Result of a completed export.
#[derive(Debug, Clone)]
pub struct ExportOutcome {
    pub bundle: ExportBundle,
    pub archive: Vec<u8>,
    pub path: Option<PathBuf>,
}

/// Lock, recovering the data if a worker panicked while holding it.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        warn!("recovering poisoned session lock");
        poisoned.into_inner()
    })
}
