//! JSON command/response protocol between a UI and a [`Session`].
//!
//! Messages are internally tagged by `type`:
//! `{"type":"ANALYZE_SCREENS","screenIds":["1:2"]}`.

use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

use crate::discovery::component_model::ComponentSpec;
use crate::error::{PipelineError, Result};
use crate::screen::screen_model::ScreenSpec;

use super::{ExportOutcome, OperationGuard, OperationKind, Session};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Command {
    DiscoverComponents,
    AnalyzeScreens {
        screen_ids: Vec<String>,
    },
    GenerateExport {
        #[serde(default)]
        output: Option<PathBuf>,
    },
    CancelOperation,
    HighlightNode {
        node_id: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    tag = "type",
    rename_all = "SCREAMING_SNAKE_CASE",
    rename_all_fields = "camelCase"
)]
pub enum Response {
    DiscoveryStarted,
    DiscoveryProgress { message: String },
    DiscoveryComplete { components: Vec<ComponentSpec> },
    DiscoveryFailed { error: String },
    DiscoveryCancelled,

    AnalysisStarted,
    AnalysisProgress { message: String },
    AnalysisComplete { screens: Vec<ScreenSpec> },
    AnalysisFailed { error: String },
    AnalysisCancelled,

    ExportStarted,
    ExportProgress { message: String },
    ExportComplete {
        path: Option<PathBuf>,
        bytes: usize,
        prompts: usize,
        assets: usize,
    },
    ExportFailed { error: String },
    ExportCancelled,

    OperationInProgress,
    PreconditionFailed { message: String },
    NodeHighlighted { node_id: String, name: String },
    NodeNotFound { node_id: String },
    InvalidCommand { message: String },
}

impl Response {
    fn started(kind: OperationKind) -> Self {
        match kind {
            OperationKind::Discovery => Response::DiscoveryStarted,
            OperationKind::Analysis => Response::AnalysisStarted,
            OperationKind::Export => Response::ExportStarted,
        }
    }

    fn progress(kind: OperationKind, message: String) -> Self {
        match kind {
            OperationKind::Discovery => Response::DiscoveryProgress { message },
            OperationKind::Analysis => Response::AnalysisProgress { message },
            OperationKind::Export => Response::ExportProgress { message },
        }
    }

    /// Response for an operation that ended with `error`.
    fn from_error(kind: OperationKind, error: &PipelineError) -> Self {
        match error {
            PipelineError::OperationInProgress => Response::OperationInProgress,
            PipelineError::Precondition(e) => Response::PreconditionFailed {
                message: e.to_string(),
            },
            PipelineError::Cancelled => match kind {
                OperationKind::Discovery => Response::DiscoveryCancelled,
                OperationKind::Analysis => Response::AnalysisCancelled,
                OperationKind::Export => Response::ExportCancelled,
            },
            other => {
                let error = other.to_string();
                match kind {
                    OperationKind::Discovery => Response::DiscoveryFailed { error },
                    OperationKind::Analysis => Response::AnalysisFailed { error },
                    OperationKind::Export => Response::ExportFailed { error },
                }
            }
        }
    }
}

pub type ResponseSender = mpsc::UnboundedSender<Response>;

fn send(tx: &ResponseSender, response: Response) {
    if tx.send(response).is_err() {
        debug!("response channel closed");
    }
}

/// Handle one command. Quick commands answer inline. Long operations are
/// admitted here, before anything is spawned, so a cancel read right after
/// them always finds the session busy. The work itself runs on `tasks`.
pub fn handle_command(
    session: &Arc<Session>,
    command: Command,
    tx: &ResponseSender,
    tasks: &mut JoinSet<()>,
) {
    debug!(?command, "command received");

    match command {
        Command::CancelOperation => {
            if !session.cancel() {
                debug!("cancel requested while idle");
            }
        }
        Command::HighlightNode { node_id } => {
            let response = match session.find_node(&node_id) {
                Some(node) => Response::NodeHighlighted {
                    node_id,
                    name: node.name.clone(),
                },
                None => Response::NodeNotFound { node_id },
            };
            send(tx, response);
        }
        Command::DiscoverComponents => {
            let Some(guard) = admit(session, OperationKind::Discovery, &[], tx) else {
                return;
            };
            let session = Arc::clone(session);
            let tx = tx.clone();
            tasks.spawn_blocking(move || {
                let response = run_blocking(guard, &tx, |guard, progress| {
                    session
                        .run_discovery(guard, progress)
                        .map(|components| Response::DiscoveryComplete { components })
                });
                send(&tx, response);
            });
        }
        Command::AnalyzeScreens { screen_ids } => {
            let Some(guard) = admit(session, OperationKind::Analysis, &screen_ids, tx) else {
                return;
            };
            let session = Arc::clone(session);
            let tx = tx.clone();
            tasks.spawn_blocking(move || {
                let response = run_blocking(guard, &tx, |guard, progress| {
                    session
                        .run_analysis(guard, &screen_ids, progress)
                        .map(|screens| Response::AnalysisComplete { screens })
                });
                send(&tx, response);
            });
        }
        Command::GenerateExport { output } => {
            let Some(guard) = admit(session, OperationKind::Export, &[], tx) else {
                return;
            };
            let session = Arc::clone(session);
            let tx = tx.clone();
            tasks.spawn(async move {
                let response = run_export(&session, guard, output, &tx).await;
                send(&tx, response);
            });
        }
    }
}

/// Admit `kind` and check its preconditions. Rejections are answered here
/// and never preceded by a `*_STARTED`.
fn admit(
    session: &Session,
    kind: OperationKind,
    screen_ids: &[String],
    tx: &ResponseSender,
) -> Option<OperationGuard> {
    let guard = match session.begin(kind) {
        Ok(guard) => guard,
        Err(e) => {
            send(tx, Response::from_error(kind, &e));
            return None;
        }
    };
    if let Err(e) = session.precheck(kind, screen_ids) {
        debug!(operation = ?kind, error = %e, "precondition failed");
        send(tx, Response::from_error(kind, &e));
        guard.finish::<()>(&Err(e));
        return None;
    }

    send(tx, Response::started(kind));
    Some(guard)
}

fn run_blocking<F>(guard: OperationGuard, tx: &ResponseSender, run: F) -> Response
where
    F: FnOnce(&OperationGuard, &dyn Fn(String)) -> Result<Response>,
{
    let kind = guard.kind();
    let progress = |message: String| send(tx, Response::progress(kind, message));
    let result = run(&guard, &progress);
    guard.finish(&result);

    result.unwrap_or_else(|e| {
        if !e.is_cancelled() && !e.is_user_facing() {
            error!(operation = ?kind, error = %e, "operation failed");
        }
        Response::from_error(kind, &e)
    })
}

async fn run_export(
    session: &Session,
    guard: OperationGuard,
    output: Option<PathBuf>,
    tx: &ResponseSender,
) -> Response {
    let kind = guard.kind();
    let progress = |message: String| send(tx, Response::progress(kind, message));
    let result = session
        .run_export(&guard, output.as_deref(), &progress)
        .await;
    guard.finish(&result);

    match result {
        Ok(ExportOutcome {
            bundle,
            archive,
            path,
        }) => Response::ExportComplete {
            path,
            bytes: archive.len(),
            prompts: bundle.ai_prompts.len(),
            assets: bundle.assets.len(),
        },
        Err(e) => {
            if !e.is_cancelled() && !e.is_user_facing() {
                error!(error = %e, "export failed");
            }
            Response::from_error(kind, &e)
        }
    }
}

/// Serve the protocol as JSON lines until `reader` hits EOF, then wait for
/// running operations and flush their responses.
pub async fn serve<R, W>(session: Arc<Session>, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, mut rx) = mpsc::unbounded_channel::<Response>();

    let writer_task = tokio::spawn(async move {
        while let Some(response) = rx.recv().await {
            let mut line = match serde_json::to_string(&response) {
                Ok(line) => line,
                Err(e) => {
                    error!(error = %e, "failed to encode response");
                    continue;
                }
            };
            line.push('\n');
            writer.write_all(line.as_bytes()).await?;
            writer.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });

    let mut tasks = JoinSet::new();
    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<Command>(line) {
            Ok(command) => handle_command(&session, command, &tx, &mut tasks),
            Err(e) => {
                warn!(error = %e, "invalid command");
                send(
                    &tx,
                    Response::InvalidCommand {
                        message: e.to_string(),
                    },
                );
            }
        }

        while let Some(joined) = tasks.try_join_next() {
            if let Err(e) = joined {
                error!(error = %e, "operation task panicked");
            }
        }
    }

    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            error!(error = %e, "operation task panicked");
        }
    }
    drop(tx);

    match writer_task.await {
        Ok(result) => result,
        Err(e) => Err(std::io::Error::other(e)),
    }
}
