// crates/tl_pipeline/tests/aggregator.rs
//
// End-to-end behaviour of the aggregator over both store backends.

use std::sync::Arc;
use std::thread;

use tl_io::{Catalog, JsonDirStore, MemoryStore, TierStore};
use tl_pipeline::{
    Aggregator, ItemId, PipelineError, PostTime, Recompute, ScopeConfig, ScopeId, Tier, VoterId,
};

fn sid(s: &str) -> ScopeId { s.parse().unwrap() }
fn vid(s: &str) -> VoterId { s.parse().unwrap() }
fn iid(s: &str) -> ItemId { s.parse().unwrap() }

fn names(agg: &Aggregator<impl TierStore>, scope: &ScopeId, tier: Tier) -> Vec<String> {
    agg.tier_view(scope)
        .unwrap()
        .get(tier)
        .iter()
        .map(|e| e.item.to_string())
        .collect()
}

#[test]
fn register_twice_keeps_one_record() {
    let agg = Aggregator::new(MemoryStore::new());
    let s = sid("guild");
    assert_eq!(agg.register_vote(&vid("u"), &s, &iid("song"), Tier::S).unwrap(), None);
    assert_eq!(agg.register_vote(&vid("u"), &s, &iid("song"), Tier::S).unwrap(), Some(Tier::S));
    assert_eq!(agg.register_vote(&vid("u"), &s, &iid("song"), Tier::B).unwrap(), Some(Tier::S));

    let votes = agg.store().load_votes(&s).unwrap();
    assert_eq!(votes[&iid("song")].len(), 1);
    assert_eq!(agg.vote_of(&vid("u"), &s, &iid("song")).unwrap(), Some(Tier::B));
    assert_eq!(agg.voted_items(&s).unwrap(), vec![iid("song")]);
}

#[test]
fn concurrent_voters_on_one_scope_lose_nothing() {
    let agg = Arc::new(Aggregator::new(MemoryStore::new()));
    let s = sid("busy");
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let agg = Arc::clone(&agg);
            let s = s.clone();
            thread::spawn(move || {
                for i in 0..10 {
                    let voter = vid(&format!("t{t}"));
                    let item = iid(&format!("song {i}"));
                    agg.register_vote(&voter, &s, &item, Tier::A).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let votes = agg.store().load_votes(&s).unwrap();
    assert_eq!(votes.len(), 10);
    assert!(votes.values().all(|by_voter| by_voter.len() == 8));
}

#[test]
fn concrete_scenario_with_json_store() {
    let dir = tempfile::tempdir().unwrap();
    let agg = Aggregator::new(JsonDirStore::open(dir.path()).unwrap());
    let s = sid("g1");
    let config = ScopeConfig::empty(3).tier(Tier::SPlus, 10, 7.0, None).tier(Tier::A, 5, 4.0, None);
    agg.set_config(&s, config).unwrap();

    agg.register_vote(&vid("u1"), &s, &iid("item_A"), Tier::SPlus).unwrap();
    agg.register_vote(&vid("u2"), &s, &iid("item_A"), Tier::SPlus).unwrap();
    agg.register_vote(&vid("u3"), &s, &iid("item_A"), Tier::A).unwrap();

    let buckets = agg.recompute(&s).unwrap();
    assert!(buckets.get(Tier::SPlus).is_empty());
    let entry = &buckets.get(Tier::A)[0];
    assert_eq!(entry.total, 25);
    assert_eq!(entry.votes, 3);
    assert!((entry.average - 25.0 / 6.0).abs() < 1e-12);

    assert!(dir.path().join("g1").join("tiers.json").is_file());
    assert_eq!(agg.tier_view(&s).unwrap(), buckets);
}

#[test]
fn stale_check_skips_unchanged_scopes() {
    let agg = Aggregator::new(MemoryStore::new());
    let s = sid("g");
    agg.register_vote(&vid("u"), &s, &iid("x"), Tier::Sss).unwrap();

    assert_eq!(agg.recompute_if_stale(&s).unwrap(), Recompute::Updated);
    assert_eq!(agg.recompute_if_stale(&s).unwrap(), Recompute::Fresh);

    agg.register_vote(&vid("v"), &s, &iid("x"), Tier::D).unwrap();
    assert_eq!(agg.recompute_if_stale(&s).unwrap(), Recompute::Updated);

    // a config change is an input change too
    agg.set_config(&s, ScopeConfig { damping: 0, ..ScopeConfig::default() }).unwrap();
    assert_eq!(agg.recompute_if_stale(&s).unwrap(), Recompute::Updated);
    assert_eq!(agg.store().load_derived(&s).unwrap().unwrap().damping, 0);
}

#[test]
fn recompute_all_keeps_going_past_a_broken_scope() {
    let dir = tempfile::tempdir().unwrap();
    let agg = Aggregator::new(JsonDirStore::open(dir.path()).unwrap());
    agg.register_vote(&vid("u"), &sid("good"), &iid("x"), Tier::A).unwrap();
    agg.register_vote(&vid("u"), &sid("bad"), &iid("x"), Tier::A).unwrap();
    std::fs::write(dir.path().join("bad").join("votes.json"), "{broken").unwrap();

    let report = agg.recompute_all().unwrap();
    assert_eq!(report.updated, vec![sid("good")]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, sid("bad"));

    let again = agg.recompute_all().unwrap();
    assert_eq!(again.fresh, vec![sid("good")]);
}

#[test]
fn missing_config_uses_default_table() {
    let agg = Aggregator::new(MemoryStore::new());
    let s = sid("fresh");
    assert_eq!(agg.effective_config(&s).unwrap(), ScopeConfig::default());

    // 12*6 / (6+3) = 8.0, meets the inclusive SSS threshold
    for u in 0..6 {
        agg.register_vote(&vid(&format!("u{u}")), &s, &iid("top"), Tier::Sss).unwrap();
    }
    assert_eq!(names(&agg, &s, Tier::Sss), vec!["top"]);

    agg.set_config(&s, ScopeConfig::empty(3)).unwrap_err();
}

#[test]
fn sss_overflow_falls_to_s_plus() {
    let agg = Aggregator::new(MemoryStore::new());
    let s = sid("g");
    for (item, n) in [("a", 9), ("b", 8), ("c", 7), ("d", 6)] {
        for u in 0..n {
            agg.register_vote(&vid(&format!("u{u}")), &s, &iid(item), Tier::Sss).unwrap();
        }
    }
    assert_eq!(names(&agg, &s, Tier::Sss), vec!["a", "b", "c"]);
    assert_eq!(names(&agg, &s, Tier::SPlus), vec!["d"]);
}

#[test]
fn setup_keeps_config_and_rotation() {
    let agg = Aggregator::new(MemoryStore::new());
    let s = sid("g");
    let custom = ScopeConfig::empty(1).tier(Tier::A, 5, 2.0, None).tier(Tier::D, 1, 0.0, None);
    agg.set_config(&s, custom.clone()).unwrap();

    let at: PostTime = "18:30".parse().unwrap();
    let setup = agg.setup_scope(&s, Some("chan".into()), Some("role".into()), Some(at)).unwrap();
    assert_eq!(setup.tiers, custom);

    let later = agg.setup_scope(&s, Some("other".into()), None, None).unwrap();
    assert_eq!(later.channel.as_deref(), Some("other"));
    assert_eq!(later.role.as_deref(), Some("role"));
    assert_eq!(later.post_time, Some(at));
    assert_eq!(agg.effective_config(&s).unwrap(), custom);
}

#[test]
fn next_item_rotates_and_wraps() {
    let agg = Aggregator::new(MemoryStore::new());
    let s = sid("g");
    let catalog = Catalog::from_json_str(r#"{"First": {}, "Second": {}, "Third": {}}"#).unwrap();

    assert!(matches!(agg.next_item(&s, &catalog), Err(PipelineError::NotSetUp(_))));
    assert!(matches!(
        agg.next_item(&s, &Catalog::default()),
        Err(PipelineError::EmptyCatalog)
    ));

    agg.setup_scope(&s, Some("chan".into()), None, None).unwrap();
    let picked: Vec<String> = (0..4).map(|_| agg.next_item(&s, &catalog).unwrap().to_string()).collect();
    assert_eq!(picked, vec!["First", "Second", "Third", "First"]);
    assert_eq!(agg.store().load_setup(&s).unwrap().unwrap().rotation_index, 1);
}

#[test]
fn empty_scope_view_has_every_default_tier() {
    let agg = Aggregator::new(MemoryStore::new());
    let view = agg.tier_view(&sid("nobody")).unwrap();
    assert!(view.is_empty());
    assert_eq!(view.tiers.len(), Tier::ALL.len());
}

#[test]
fn separate_stores_on_one_directory_lose_no_votes() {
    // Each thread has its own aggregator, so only the store's file lock
    // orders their writes, as with separate processes.
    let dir = tempfile::tempdir().unwrap();
    let s = sid("shared");
    let handles: Vec<_> = (0..8)
        .map(|t| {
            let root = dir.path().to_path_buf();
            let s = s.clone();
            thread::spawn(move || {
                let agg = Aggregator::new(JsonDirStore::open(root).unwrap());
                for i in 0..5 {
                    agg.register_vote(&vid(&format!("t{t}")), &s, &iid(&format!("song {i}")), Tier::B)
                        .unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let votes = JsonDirStore::open(dir.path()).unwrap().load_votes(&s).unwrap();
    assert_eq!(votes.len(), 5);
    assert!(votes.values().all(|by_voter| by_voter.len() == 8));
}

#[test]
fn invalid_stored_config_falls_back_to_default() {
    let store = MemoryStore::new();
    let s = sid("g");
    let heavy = ScopeConfig::empty(0).tier(Tier::A, i64::MAX, 0.0, None).tier(Tier::D, 1, 0.0, None);
    let setup = tl_io::ScopeSetup { tiers: heavy, ..tl_io::ScopeSetup::default() };
    store.save_setup(&s, &setup).unwrap();

    let agg = Aggregator::new(store);
    assert_eq!(agg.effective_config(&s).unwrap(), ScopeConfig::default());
    agg.register_vote(&vid("u1"), &s, &iid("x"), Tier::A).unwrap();
    agg.register_vote(&vid("u2"), &s, &iid("x"), Tier::A).unwrap();
    let buckets = agg.recompute(&s).unwrap();
    assert_eq!(buckets.tiers.len(), Tier::ALL.len());
    assert_eq!(buckets.tier_of(&iid("x")), Some(Tier::D));
}

#[test]
fn viewing_an_unknown_scope_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let agg = Aggregator::new(JsonDirStore::open(dir.path()).unwrap());
    let typo = sid("gulid");
    let catalog = Catalog::from_json_str(r#"{"Only": {}}"#).unwrap();

    let view = agg.tier_view(&typo).unwrap();
    assert!(view.is_empty());
    assert_eq!(view.tiers.len(), Tier::ALL.len());
    assert_eq!(agg.recompute_if_stale(&typo).unwrap(), Recompute::Fresh);
    assert!(matches!(agg.next_item(&typo, &catalog), Err(PipelineError::NotSetUp(_))));

    assert!(agg.store().list_scopes().unwrap().is_empty());
    assert!(!dir.path().join("gulid").exists());
    assert!(agg.recompute_all().unwrap().fresh.is_empty());
}
