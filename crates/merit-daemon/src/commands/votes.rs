//! Vote command handlers.
//!
//! Writing or retracting a vote refreshes the reputation of both parties
//! before the call returns. A refresh failure leaves the ledger write in
//! place; the affected records stay stale until the next computation.

use std::sync::Arc;

use merit_types::vote::{Vote, VoteSign};
use serde_json::Value;

use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Cast a vote from one user to another within a tag.
pub async fn cast_vote(state: &Arc<DaemonState>, params: &Value) -> Result {
    let author_id = params
        .get("author_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("author_id required"))?;
    let target_id = params
        .get("target_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("target_id required"))?;
    let tag_id = params
        .get("tag_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("tag_id required"))?;
    let sign_value = params
        .get("sign")
        .ok_or_else(|| RpcError::invalid_params("sign required"))?;
    let sign: VoteSign = serde_json::from_value(sign_value.clone())
        .map_err(|_| RpcError::invalid_params("sign must be \"up\" or \"down\""))?;

    if author_id == target_id {
        return Err(RpcError::self_vote());
    }

    let mut id_bytes = [0u8; 16];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut id_bytes);
    let vote_id = hex::encode(id_bytes);

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let db = state.db.lock().await;
    if !merit_db::queries::users::exists(&db, author_id)? {
        return Err(RpcError::not_found("author"));
    }
    if !merit_db::queries::users::exists(&db, target_id)? {
        return Err(RpcError::not_found("target"));
    }
    let config = merit_db::queries::tags::find(&db, tag_id)?.config()?;

    let vote = Vote {
        vote_id: vote_id.clone(),
        author_id: author_id.to_string(),
        target_id: target_id.to_string(),
        tag_id: tag_id.to_string(),
        sign,
        created_at: now,
    };
    merit_db::queries::votes::insert(&db, &vote).map_err(|err| match err {
        merit_db::DbError::Constraint(_) => RpcError::duplicate_vote(author_id, target_id, tag_id),
        other => other.into(),
    })?;

    merit_engine::compute::on_vote_written(&db, &vote, &config, now)?;

    Ok(serde_json::json!({"vote_id": vote_id}))
}

/// Retract a live vote.
pub async fn retract_vote(state: &Arc<DaemonState>, params: &Value) -> Result {
    let vote_id = params
        .get("vote_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("vote_id required"))?;

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let db = state.db.lock().await;
    let vote = merit_db::queries::votes::find(&db, vote_id)?;
    let config = merit_db::queries::tags::find(&db, &vote.tag_id)?.config()?;

    merit_db::queries::votes::soft_delete(&db, vote_id, now)?;
    merit_engine::compute::on_vote_deleted(&db, &vote, &config, now)?;

    Ok(serde_json::json!({"retracted": true}))
}
