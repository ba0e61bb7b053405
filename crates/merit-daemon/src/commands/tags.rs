//! Tag command handlers.
//!
//! A tag is a community with its own reputation configuration; the
//! configuration travels with the tag row and is snapshotted per
//! computation, so an update here affects the next computation, not the
//! ones already persisted.

use std::sync::Arc;

use merit_types::tag::TagConfig;
use serde_json::Value;
use tracing::info;

use crate::rpc::RpcError;
use crate::DaemonState;

type Result = std::result::Result<Value, RpcError>;

/// Create a new tag. Omitted configuration fields take the defaults.
pub async fn create_tag(state: &Arc<DaemonState>, params: &Value) -> Result {
    let handle = params
        .get("handle")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("handle required"))?;
    let founder_id = params
        .get("founder_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("founder_id required"))?;

    let mut id_bytes = [0u8; 16];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut id_bytes);
    let tag_id = hex::encode(id_bytes);

    let mut config = TagConfig::with_defaults(tag_id.clone());
    apply_config_params(&mut config, params)?;

    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();

    let db = state.db.lock().await;
    if !merit_db::queries::users::exists(&db, founder_id)? {
        return Err(RpcError::not_found("founder"));
    }
    merit_db::queries::tags::insert(&db, handle, founder_id, &config, now)?;

    info!(handle, "tag created");

    Ok(serde_json::json!({"tag_id": tag_id}))
}

/// Replace parts of a tag's reputation configuration.
pub async fn update_tag_config(state: &Arc<DaemonState>, params: &Value) -> Result {
    let tag_id = params
        .get("tag_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("tag_id required"))?;

    let db = state.db.lock().await;
    let mut config = merit_db::queries::tags::find(&db, tag_id)?.config()?;
    apply_config_params(&mut config, params)?;
    merit_db::queries::tags::update_config(&db, &config)?;

    info!(tag_id, "tag configuration updated");

    Ok(serde_json::json!({"updated": true}))
}

/// Look up a tag by id or handle, including its configuration.
pub async fn get_tag(state: &Arc<DaemonState>, params: &Value) -> Result {
    let db = state.db.lock().await;
    let tag = if let Some(tag_id) = params.get("tag_id").and_then(|v| v.as_str()) {
        merit_db::queries::tags::find(&db, tag_id)?
    } else if let Some(handle) = params.get("handle").and_then(|v| v.as_str()) {
        merit_db::queries::tags::find_by_handle(&db, handle)?
    } else {
        return Err(RpcError::invalid_params("tag_id or handle required"));
    };
    let config = tag.config()?;

    Ok(serde_json::json!({
        "tag_id": tag.tag_id,
        "handle": tag.handle,
        "founder_id": tag.founder_id,
        "created_at": tag.created_at,
        "config": {
            "reputation_threshold": config.reputation_threshold,
            "vote_reward": config.vote_reward,
            "min_trusted_users": config.min_trusted_users,
            "decay_periods": config.decay_periods,
        },
    }))
}

/// Current trust statistics for a tag.
pub async fn get_tag_stats(state: &Arc<DaemonState>, params: &Value) -> Result {
    let tag_id = params
        .get("tag_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("tag_id required"))?;

    let db = state.db.lock().await;
    let config = merit_db::queries::tags::find(&db, tag_id)?.config()?;
    let trusted_count = merit_db::queries::reputations::count_trusted(&db, tag_id)?;
    let member_count = merit_db::queries::reputations::count_records(&db, tag_id)?;
    let phase = merit_engine::gate::phase(trusted_count, config.min_trusted_users);

    Ok(serde_json::json!({
        "trusted_count": trusted_count,
        "member_count": member_count,
        "phase": phase.as_str(),
    }))
}

/// Fold optional configuration params into `config`, validating the
/// decay table before it can reach a computation.
fn apply_config_params(config: &mut TagConfig, params: &Value) -> std::result::Result<(), RpcError> {
    if let Some(threshold) = params.get("reputation_threshold").and_then(|v| v.as_f64()) {
        config.reputation_threshold = threshold;
    }
    if let Some(reward) = params.get("vote_reward").and_then(|v| v.as_f64()) {
        config.vote_reward = reward;
    }
    if let Some(min) = params.get("min_trusted_users").and_then(|v| v.as_u64()) {
        config.min_trusted_users = min as u32;
    }
    if let Some(periods) = params.get("decay_periods") {
        config.decay_periods = serde_json::from_value(periods.clone()).map_err(|_| {
            RpcError::invalid_params("decay_periods must be a list of {span_months, multiplier}")
        })?;
    }
    merit_engine::decay::DecayTable::new(&config.decay_periods)?;
    Ok(())
}
