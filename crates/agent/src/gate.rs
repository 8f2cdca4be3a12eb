//! Dispatch and confirmation gate.
//!
//! Routes an [`Action`] to its capability. Gated capabilities (file
//! patches, shell commands) are previewed to the [`Operator`] and run only
//! after an explicit yes; a patch is written to disk only after the
//! approved capability has computed it.
//!
//! ```text
//! Action ─┬─ unknown ───────────────────────────────► Failed(UnknownCapability)
//!         ├─ ungated ─► execute ────────────────────► Completed | Failed
//!         └─ gated ───► preview ─► confirm ─┬─ no ──► Cancelled
//!                                           └─ yes ─► execute ─► (persist patch) ─► Completed | Failed
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use rayo_core::error::ToolError;
use rayo_core::tool::{CapabilityKind, ToolRegistry, ToolResult};
use rayo_tools::PatchPlan;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::interpreter::Action;

pub const CANCELLED_OUTPUT: &str = "Operation cancelled by user";

/// What the human is asked to approve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Preview {
    Patch {
        path: String,
        original: String,
        new: String,
    },
    Command {
        command: String,
    },
}

impl Preview {
    /// Build the preview for a gated capability from the raw parameters.
    pub fn for_action(kind: CapabilityKind, parameters: &serde_json::Map<String, Value>) -> Option<Self> {
        let field = |key: &str, default: &str| {
            parameters
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or(default)
                .to_string()
        };
        match kind {
            CapabilityKind::ApplyPatch => Some(Preview::Patch {
                path: field("path", "unknown"),
                original: field("original_snippet", ""),
                new: field("new_snippet", ""),
            }),
            CapabilityKind::RunBash => Some(Preview::Command {
                command: field("command", ""),
            }),
            CapabilityKind::ListFiles | CapabilityKind::ReadFile => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Preview::Patch { .. } => "File Modification",
            Preview::Command { .. } => "Shell Command",
        }
    }

    /// Plain-text body shown inside the confirmation frame.
    pub fn body(&self) -> String {
        match self {
            Preview::Patch {
                path,
                original,
                new,
            } => format!("File: {path}\n\n- Original:\n{original}\n\n+ New:\n{new}"),
            Preview::Command { command } => command.clone(),
        }
    }
}

/// Progress the gate reports while handling an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Reasoning(String),
    Executing(String),
    Finished { capability: String, success: bool },
    Cancelled,
    FileUpdated(String),
    Failed(String),
    Warning(String),
}

/// The human on the other side of the confirmation boundary.
#[async_trait]
pub trait Operator: Send + Sync {
    /// Show `preview` and ask whether to proceed. Anything but a clear
    /// yes must return `false`.
    async fn confirm(&self, preview: &Preview) -> bool;

    fn notify(&self, _notice: Notice) {}
}

/// Operator that declines everything. Used when no human is attached.
pub struct DenyAll;

#[async_trait]
impl Operator for DenyAll {
    async fn confirm(&self, _preview: &Preview) -> bool {
        false
    }
}

/// The outcome of dispatching one action.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Completed(ToolResult),
    Cancelled(ToolResult),
    Failed(ToolError),
}

impl Dispatch {
    /// Serialized form folded into the tool-result turn.
    pub fn to_turn_text(&self) -> String {
        match self {
            Dispatch::Completed(result) | Dispatch::Cancelled(result) => result.to_pretty_json(),
            Dispatch::Failed(err @ ToolError::UnknownCapability(_)) => err.to_string(),
            Dispatch::Failed(err) => format!("Tool error: {err}"),
        }
    }
}

pub struct DispatchGate {
    registry: Arc<ToolRegistry>,
    operator: Arc<dyn Operator>,
}

impl DispatchGate {
    pub fn new(registry: Arc<ToolRegistry>, operator: Arc<dyn Operator>) -> Self {
        Self { registry, operator }
    }

    /// Pass a notice to the operator outside of a dispatch.
    pub(crate) fn notify(&self, notice: Notice) {
        self.operator.notify(notice);
    }

    /// Route `action` through the gate. Never fails; every outcome is a value.
    pub async fn dispatch(&self, action: &Action) -> Dispatch {
        self.operator
            .notify(Notice::Reasoning(action.rationale.clone()));

        let outcome = self.run(action).await;
        if let Dispatch::Failed(err) = &outcome {
            warn!(capability = %action.capability, error = %err, "Dispatch failed");
            self.operator.notify(Notice::Failed(Dispatch::Failed(err.clone()).to_turn_text()));
        }
        outcome
    }

    async fn run(&self, action: &Action) -> Dispatch {
        let tool = match self.registry.resolve(&action.capability) {
            Ok(tool) => tool,
            Err(err) => return Dispatch::Failed(err),
        };
        let kind = tool.kind();

        if kind.is_gated() {
            let Some(preview) = Preview::for_action(kind, &action.parameters) else {
                return Dispatch::Failed(ToolError::ExecutionFailed {
                    tool_name: kind.name().into(),
                    reason: "no preview available for gated capability".into(),
                });
            };
            if !self.operator.confirm(&preview).await {
                info!(capability = %kind, "Operation declined");
                self.operator.notify(Notice::Cancelled);
                return Dispatch::Cancelled(ToolResult::new(false, CANCELLED_OUTPUT));
            }
        }

        debug!(capability = %kind, "Executing capability");
        self.operator.notify(Notice::Executing(kind.name().into()));

        let result = match tool.execute(action.parameters_value()).await {
            Ok(result) => result,
            Err(err) => return Dispatch::Failed(err),
        };

        if kind == CapabilityKind::ApplyPatch && result.success {
            if let Err(err) = self.persist_patch(&result).await {
                return Dispatch::Failed(err);
            }
        }

        self.operator.notify(Notice::Finished {
            capability: kind.name().into(),
            success: result.success,
        });
        Dispatch::Completed(result)
    }

    /// Write an approved, computed patch to disk.
    async fn persist_patch(&self, result: &ToolResult) -> Result<(), ToolError> {
        let plan = PatchPlan::from_result(result).ok_or_else(|| ToolError::ExecutionFailed {
            tool_name: CapabilityKind::ApplyPatch.name().into(),
            reason: "prepared patch is missing fields".into(),
        })?;
        let persisted = plan.approve().persist().await?;
        self.operator
            .notify(Notice::FileUpdated(persisted.path.display().to_string()));
        Ok(())
    }
}
