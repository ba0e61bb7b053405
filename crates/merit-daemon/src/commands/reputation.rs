//! Reputation command handlers.
//!
//! The read/compute split is the caller's lever: `get_reputation` never
//! computes, `get_or_compute_reputation` computes only a missing record,
//! and `recompute_reputation` always runs the full pipeline.

use std::sync::Arc;

use merit_types::reputation::Reputation;
use serde_json::Value;

use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Read the cached reputation record, or null when none exists.
pub async fn get_reputation(state: &Arc<DaemonState>, params: &Value) -> Result {
    let (user_id, tag_id) = parse_pair(params)?;

    let db = state.db.lock().await;
    let row = merit_db::queries::reputations::find(&db, user_id, tag_id)?;

    Ok(match row {
        Some(row) => reputation_json(&row.into_reputation()),
        None => Value::Null,
    })
}

/// Return the cached record, computing one only when none exists.
pub async fn get_or_compute_reputation(state: &Arc<DaemonState>, params: &Value) -> Result {
    let (user_id, tag_id) = parse_pair(params)?;

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let db = state.db.lock().await;
    if !merit_db::queries::users::exists(&db, user_id)? {
        return Err(RpcError::not_found("user"));
    }
    let config = merit_db::queries::tags::find(&db, tag_id)?.config()?;

    let rep = merit_engine::compute::get_or_compute(&db, user_id, &config, now)?;
    Ok(reputation_json(&rep))
}

/// Recompute the record from current ledger state.
pub async fn recompute_reputation(state: &Arc<DaemonState>, params: &Value) -> Result {
    let (user_id, tag_id) = parse_pair(params)?;

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let db = state.db.lock().await;
    if !merit_db::queries::users::exists(&db, user_id)? {
        return Err(RpcError::not_found("user"));
    }
    let config = merit_db::queries::tags::find(&db, tag_id)?.config()?;

    let rep = merit_engine::compute::recompute(&db, user_id, &config, now)?;
    Ok(reputation_json(&rep))
}

fn parse_pair(params: &Value) -> std::result::Result<(&str, &str), RpcError> {
    let user_id = params
        .get("user_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("user_id required"))?;
    let tag_id = params
        .get("tag_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("tag_id required"))?;
    Ok((user_id, tag_id))
}

fn reputation_json(rep: &Reputation) -> Value {
    serde_json::json!({
        "user_id": rep.user_id,
        "tag_id": rep.tag_id,
        "basis_reputation": rep.basis_reputation,
        "vote_weight": rep.vote_weight,
        "voting_reward_reputation": rep.voting_reward_reputation,
        "effective_reputation": rep.effective_reputation,
        "is_trusted": rep.is_trusted,
        "last_calculated_at": rep.last_calculated_at,
    })
}
