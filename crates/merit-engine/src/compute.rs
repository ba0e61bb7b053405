//! Reputation pipeline: read the ledger, fold, persist.
//!
//! Every invocation is a full recomputation for one (user, tag) pair;
//! there is no stored staleness state and no incremental patching. The
//! persisted record is replaced in a single versioned write; a failed
//! computation leaves the previous record untouched.

use std::collections::{HashMap, HashSet};

use merit_db::queries::{reputations, votes};
use merit_types::reputation::Reputation;
use merit_types::tag::TagConfig;
use merit_types::vote::Vote;
use merit_types::UserId;
use rusqlite::Connection;

use crate::basis::{self, AuthorInfluence};
use crate::decay::DecayTable;
use crate::gate::{self, Phase};
use crate::{reward, weight, EngineError, Result};

/// Return the cached record for (user, tag), computing one only when
/// none exists.
///
/// The engine never judges freshness: callers that want a current value
/// ask for [`recompute`] explicitly.
pub fn get_or_compute(
    conn: &Connection,
    user_id: &str,
    config: &TagConfig,
    now: u64,
) -> Result<Reputation> {
    if let Some(row) = reputations::find(conn, user_id, &config.tag_id)? {
        return Ok(row.into_reputation());
    }
    recompute(conn, user_id, config, now)
}

/// Recompute and persist the reputation of `user_id` within the tag.
///
/// Runs the full pipeline against current ledger state and replaces the
/// cached record under an optimistic version check. Losing that check to
/// a concurrent writer re-runs the pipeline once from fresh reads; a
/// second loss surfaces [`EngineError::WriteConflict`].
pub fn recompute(
    conn: &Connection,
    user_id: &str,
    config: &TagConfig,
    now: u64,
) -> Result<Reputation> {
    let table = DecayTable::new(&config.decay_periods)?;

    if let Some(rep) = compute_and_persist(conn, user_id, config, &table, now)? {
        return Ok(rep);
    }

    tracing::warn!(
        user_id,
        tag_id = %config.tag_id,
        "reputation write conflicted, re-running computation"
    );
    if let Some(rep) = compute_and_persist(conn, user_id, config, &table, now)? {
        return Ok(rep);
    }

    Err(EngineError::WriteConflict {
        user_id: user_id.to_string(),
        tag_id: config.tag_id.clone(),
    })
}

/// Refresh both parties of a newly written vote.
///
/// The author goes first (their vote weight changed with their outgoing
/// set) so the target's basis already sees the refreshed author record.
pub fn on_vote_written(conn: &Connection, vote: &Vote, config: &TagConfig, now: u64) -> Result<()> {
    recompute(conn, &vote.author_id, config, now)?;
    recompute(conn, &vote.target_id, config, now)?;
    Ok(())
}

/// Refresh both parties of a retracted vote. Same order as
/// [`on_vote_written`].
pub fn on_vote_deleted(conn: &Connection, vote: &Vote, config: &TagConfig, now: u64) -> Result<()> {
    recompute(conn, &vote.author_id, config, now)?;
    recompute(conn, &vote.target_id, config, now)?;
    Ok(())
}

/// One pass of the pipeline. Returns `None` when the versioned persist
/// lost to a concurrent writer and the caller should re-run.
fn compute_and_persist(
    conn: &Connection,
    user_id: &str,
    config: &TagConfig,
    table: &DecayTable,
    now: u64,
) -> Result<Option<Reputation>> {
    // The version read here is the version the final write must replace.
    let expected_version = reputations::find(conn, user_id, &config.tag_id)?.map(|r| r.version);

    let incoming = votes::incoming(conn, user_id, &config.tag_id)?;
    let outgoing = votes::outgoing(conn, user_id, &config.tag_id)?;

    let vote_weight = weight::normalize(&outgoing, table, now);

    let authors = load_author_influence(conn, &incoming, &config.tag_id)?;
    let basis_reputation = basis::aggregate(&incoming, &authors, table, now);

    let is_trusted = gate::is_trusted(basis_reputation, config.reputation_threshold);

    // Counted before this user's own row is written: the subject of a
    // computation never tips the phase applied to their own rewards.
    let trusted_count = reputations::count_trusted(conn, &config.tag_id)?;
    let phase = gate::phase(trusted_count, config.min_trusted_users);

    let voting_reward_reputation = if is_trusted || phase == Phase::Bootstrap {
        reward::aggregate(&outgoing, table, config.vote_reward, now)
    } else {
        0.0
    };

    let effective_reputation = basis_reputation + voting_reward_reputation;

    let rep = Reputation {
        user_id: user_id.to_string(),
        tag_id: config.tag_id.clone(),
        basis_reputation,
        vote_weight,
        voting_reward_reputation,
        effective_reputation,
        is_trusted,
        last_calculated_at: now,
    };

    // Single-statement persist: the whole record lands or none of it.
    let written = match expected_version {
        Some(version) => reputations::update_versioned(conn, &rep, version)?,
        None => reputations::insert_new(conn, &rep)?,
    };

    if !written {
        return Ok(None);
    }

    tracing::trace!(
        user_id,
        tag_id = %config.tag_id,
        basis = basis_reputation,
        weight = vote_weight,
        rewards = voting_reward_reputation,
        effective = effective_reputation,
        trusted = is_trusted,
        phase = phase.as_str(),
        "reputation recomputed"
    );
    Ok(Some(rep))
}

/// Fetch each unique incoming author's cached record exactly once.
///
/// Authors without a record are simply left out of the map; the
/// aggregator treats them as zero influence.
fn load_author_influence(
    conn: &Connection,
    incoming: &[Vote],
    tag_id: &str,
) -> Result<HashMap<UserId, AuthorInfluence>> {
    let unique_authors: HashSet<&str> = incoming.iter().map(|v| v.author_id.as_str()).collect();

    let mut authors = HashMap::with_capacity(unique_authors.len());
    for author_id in unique_authors {
        if let Some(row) = reputations::find(conn, author_id, tag_id)? {
            authors.insert(
                author_id.to_string(),
                AuthorInfluence {
                    reputation: row.effective_reputation,
                    vote_weight: row.vote_weight,
                },
            );
        }
    }
    Ok(authors)
}
