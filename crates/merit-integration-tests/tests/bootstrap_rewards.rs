//! Integration test: participation rewards across community phases.
//!
//! Exercises the ledger -> engine flow the daemon drives:
//! 1. Register users and a tag with default configuration
//! 2. A new member casts fresh up-votes on twenty others
//! 3. In bootstrap (no trusted members) the rewards accrue
//! 4. With an established trusted core the same activity earns nothing
//! 5. The phase flips exactly at the configured minimum

use merit_db::queries::{reputations, tags, users, votes};
use merit_engine::compute;
use merit_engine::gate::{self, Phase};
use merit_types::reputation::Reputation;
use merit_types::tag::TagConfig;
use merit_types::vote::{Vote, VoteSign};
use rusqlite::Connection;

/// Simulated timestamp for deterministic testing: 2024-01-15T00:00:00Z.
const BASE_TIME: u64 = 1_705_276_800;

const TAG: &str = "t-rust";

/// Open an in-memory community: `member_count` registered users and one
/// tag with the given configuration.
fn open_community(config: &TagConfig, member_count: usize) -> Connection {
    let conn = merit_db::open_memory().expect("in-memory DB should open");
    for i in 0..member_count {
        users::insert(
            &conn,
            &format!("u-{i}"),
            &format!("user{i}"),
            "User",
            BASE_TIME,
        )
        .expect("user insertion should succeed");
    }
    tags::insert(&conn, "rust", "u-0", config, BASE_TIME).expect("tag insertion should succeed");
    conn
}

/// Append an up-vote and refresh both parties, as the daemon does.
fn cast(conn: &Connection, config: &TagConfig, id: &str, author: &str, target: &str, at: u64) {
    let vote = Vote {
        vote_id: id.to_string(),
        author_id: author.to_string(),
        target_id: target.to_string(),
        tag_id: TAG.to_string(),
        sign: VoteSign::Up,
        created_at: at,
    };
    votes::insert(conn, &vote).expect("vote insertion should succeed");
    compute::on_vote_written(conn, &vote, config, at).expect("vote refresh should succeed");
}

/// Seed a cached reputation record directly, bypassing the pipeline.
fn seed_record(conn: &Connection, user_id: &str, effective: f64, weight: f64, trusted: bool) {
    let rep = Reputation {
        user_id: user_id.to_string(),
        tag_id: TAG.to_string(),
        basis_reputation: effective,
        vote_weight: weight,
        voting_reward_reputation: 0.0,
        effective_reputation: effective,
        is_trusted: trusted,
        last_calculated_at: BASE_TIME,
    };
    assert!(
        reputations::insert_new(conn, &rep).expect("record insertion should succeed"),
        "seed must land on a fresh (user, tag) pair"
    );
}

#[test]
fn bootstrap_rewards_accrue_for_fresh_votes() {
    let config = TagConfig::with_defaults(TAG.to_string());
    let conn = open_community(&config, 25);

    // u-1 casts twenty fresh up-votes on distinct members.
    for i in 2..22 {
        cast(
            &conn,
            &config,
            &format!("v-{i}"),
            "u-1",
            &format!("u-{i}"),
            BASE_TIME,
        );
    }

    let rep = compute::get_or_compute(&conn, "u-1", &config, BASE_TIME)
        .expect("cached record should exist");

    // Twenty fresh votes: weight 1/20; no incoming votes; bootstrap
    // rewards 20 * 0.1 * 1.0.
    assert!((rep.vote_weight - 0.05).abs() < 1e-12, "weight must be 1/20");
    assert!(
        (rep.basis_reputation - 0.0).abs() < f64::EPSILON,
        "no incoming votes, basis must be zero"
    );
    assert!(
        (rep.voting_reward_reputation - 2.0).abs() < 1e-9,
        "bootstrap must grant rewards for every outgoing vote"
    );
    assert!(
        (rep.effective_reputation - 2.0).abs() < 1e-9,
        "effective = basis + rewards"
    );
    assert!(
        !rep.is_trusted,
        "rewards alone never cross the trust threshold"
    );

    // The community is still bootstrapping: nobody crossed the threshold.
    let trusted = reputations::count_trusted(&conn, TAG).expect("count should succeed");
    assert_eq!(trusted, 0, "a fresh community has no trusted members");
    assert_eq!(
        gate::phase(trusted, config.min_trusted_users),
        Phase::Bootstrap
    );

    // Normalization in action: the author's influence on any one target
    // is weight * effective = (1/20) * 2.0 = 0.1, regardless of when the
    // target's record was refreshed.
    let target = reputations::find(&conn, "u-5", TAG)
        .expect("find should succeed")
        .expect("target record should exist");
    assert!(
        (target.basis_reputation - 0.1).abs() < 1e-9,
        "per-target influence must stay normalized as the author's ledger grows"
    );
}

#[test]
fn restricted_phase_withholds_rewards() {
    let config = TagConfig::with_defaults(TAG.to_string());
    let conn = open_community(&config, 30);

    // An established trusted core: six members above the threshold.
    for i in 22..28 {
        seed_record(&conn, &format!("u-{i}"), 50.0, 0.1, true);
    }

    // The same twenty-vote spree as in bootstrap.
    for i in 2..22 {
        cast(
            &conn,
            &config,
            &format!("v-{i}"),
            "u-1",
            &format!("u-{i}"),
            BASE_TIME,
        );
    }

    let rep = reputations::find(&conn, "u-1", TAG)
        .expect("find should succeed")
        .expect("record should exist")
        .into_reputation();

    assert!((rep.vote_weight - 0.05).abs() < 1e-12, "weight must be 1/20");
    assert!(
        (rep.voting_reward_reputation - 0.0).abs() < f64::EPSILON,
        "the restricted phase withholds rewards from untrusted members"
    );
    assert!(
        (rep.effective_reputation - 0.0).abs() < f64::EPSILON,
        "no basis and no rewards leaves nothing"
    );

    let trusted = reputations::count_trusted(&conn, TAG).expect("count should succeed");
    assert_eq!(trusted, 6);
    assert_eq!(
        gate::phase(trusted, config.min_trusted_users),
        Phase::Restricted
    );
}

#[test]
fn phase_flips_exactly_at_the_minimum() {
    let config = TagConfig::with_defaults(TAG.to_string());
    let conn = open_community(&config, 12);

    // Four trusted members: one short of the minimum, rewards still flow.
    for i in 5..9 {
        seed_record(&conn, &format!("u-{i}"), 50.0, 0.1, true);
    }
    cast(&conn, &config, "v-1", "u-1", "u-2", BASE_TIME);

    let rep = reputations::find(&conn, "u-1", TAG)
        .expect("find should succeed")
        .expect("record should exist");
    assert!(
        (rep.voting_reward_reputation - 0.1).abs() < 1e-12,
        "four trusted members keep the community in bootstrap"
    );

    // A fifth trusted member ends bootstrap; the next refresh withholds.
    seed_record(&conn, "u-9", 50.0, 0.1, true);
    let rep = compute::recompute(&conn, "u-1", &config, BASE_TIME).expect("recompute");
    assert!(
        (rep.voting_reward_reputation - 0.0).abs() < f64::EPSILON,
        "five trusted members end bootstrap"
    );
    assert!(
        (rep.effective_reputation - 0.0).abs() < f64::EPSILON,
        "the reward portion disappears from the effective score"
    );
}
