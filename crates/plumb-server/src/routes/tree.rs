use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::Json;
use plumb_core::classify::Classifier;
use plumb_core::normalize::Answers;
use plumb_core::session::diagnose;
use plumb_core::tree::Step;
use plumb_core::types::DiagnosticCode;
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/tree
pub async fn get_tree(State(app): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "ok": true,
        "root": app.tree.root,
        "severityNode": app.tree.severity_node,
        "nodes": app.tree.nodes,
    }))
}

/// GET /api/tree/{node}
pub async fn get_node(
    State(app): State<AppState>,
    Path(node): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let node = app.tree.node(&node)?;
    Ok(Json(serde_json::json!({ "ok": true, "node": node })))
}

#[derive(Deserialize)]
pub struct TraverseBody {
    pub node: String,
    pub option: String,
    /// Answers given so far in this traversal, keyed by node id.
    #[serde(default)]
    pub answers: Answers,
    /// Provisional code returned by an earlier step, if any.
    #[serde(default)]
    pub provisional: Option<DiagnosticCode>,
}

/// POST /api/traverse
///
/// Stateless: the client echoes `answers` and `provisional` back on every
/// step. Reaching the severity node classifies the whole traversal.
/// Unknown nodes or options answer 409; the client restarts at the root.
pub async fn traverse(
    State(app): State<AppState>,
    body: Bytes,
) -> Result<Json<serde_json::Value>, AppError> {
    let TraverseBody {
        node,
        option,
        mut answers,
        provisional,
    } = super::parse_body(&body)?;

    let step = app.tree.advance(&node, &option)?;
    answers.insert(node, option);

    let json = match step {
        Step::Continue {
            next,
            provisional: step_code,
        } => serde_json::json!({
            "ok": true,
            "next": next,
            "provisional": step_code.or(provisional),
            "answers": answers,
        }),
        Step::Terminal { emergency, .. } => {
            let d = diagnose(&Classifier::default(), &answers, provisional.as_ref(), emergency);
            let emergency = d.result.severity.is_emergency();
            tracing::info!(
                code = %d.result.service_code,
                capability = %d.capability,
                emergency,
                "traversal completed"
            );
            serde_json::json!({
                "ok": true,
                "result": d.result,
                "capability": d.capability,
                "emergency": emergency,
                "reported": d.normalized.reported_trail,
                "normalized": d.normalized,
            })
        }
    };
    Ok(Json(json))
}
