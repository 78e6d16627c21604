//! Directory-of-JSON backend: `<root>/<scope>/{votes,setup,tiers}.json`.
//!
//! Each scope directory also holds an empty `.lock` file. `lock_scope` takes
//! an exclusive advisory lock on it, so several processes pointed at the same
//! root serialize their writes to a scope.

use std::fs::{self, OpenOptions};
use std::io::ErrorKind;
use std::path::PathBuf;

use fs2::FileExt;

use tl_algo::VoteSet;
use tl_core::determinism::sort_scopes;
use tl_core::ScopeId;

use super::{DerivedDoc, ScopeGuard, TierStore};
use crate::canonical_json::{read_json_opt, write_canonical_file};
use crate::setup::ScopeSetup;
use crate::{IoError, IoResult};

const VOTES_FILE: &str = "votes.json";
const SETUP_FILE: &str = "setup.json";
const DERIVED_FILE: &str = "tiers.json";
const LOCK_FILE: &str = ".lock";

#[derive(Clone, Debug)]
pub struct JsonDirStore {
    root: PathBuf,
}

impl JsonDirStore {
    /// Open (creating if needed) a store rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> IoResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| IoError::Path(format!("create {}: {e}", root.display())))?;
        Ok(JsonDirStore { root })
    }

    fn file(&self, scope: &ScopeId, name: &str) -> PathBuf {
        self.root.join(scope.as_str()).join(name)
    }
}

impl TierStore for JsonDirStore {
    fn list_scopes(&self) -> IoResult<Vec<ScopeId>> {
        let rd = match fs::read_dir(&self.root) {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(IoError::Path(format!("list {}: {e}", self.root.display()))),
        };
        let mut out = Vec::new();
        for entry in rd {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            match name.to_str().map(str::parse::<ScopeId>) {
                Some(Ok(scope)) => {
                    // A directory holding only the lock file has no state.
                    let dir = entry.path();
                    if [VOTES_FILE, SETUP_FILE, DERIVED_FILE].iter().any(|f| dir.join(f).is_file()) {
                        out.push(scope);
                    }
                }
                _ => tracing::debug!(dir = ?name, "skipping directory that is not a scope id"),
            }
        }
        sort_scopes(&mut out);
        Ok(out)
    }

    fn load_votes(&self, scope: &ScopeId) -> IoResult<VoteSet> {
        Ok(read_json_opt(&self.file(scope, VOTES_FILE))?.unwrap_or_default())
    }

    fn save_votes(&self, scope: &ScopeId, votes: &VoteSet) -> IoResult<()> {
        write_canonical_file(&self.file(scope, VOTES_FILE), votes)
    }

    fn load_setup(&self, scope: &ScopeId) -> IoResult<Option<ScopeSetup>> {
        read_json_opt(&self.file(scope, SETUP_FILE))
    }

    fn save_setup(&self, scope: &ScopeId, setup: &ScopeSetup) -> IoResult<()> {
        write_canonical_file(&self.file(scope, SETUP_FILE), setup)
    }

    fn load_derived(&self, scope: &ScopeId) -> IoResult<Option<DerivedDoc>> {
        let path = self.file(scope, DERIVED_FILE);
        match read_json_opt(&path) {
            Ok(doc) => Ok(doc),
            // Derived data is rebuilt from votes; a damaged copy is just stale.
            Err(IoError::Json { pointer, msg }) => {
                tracing::warn!(%scope, %pointer, %msg, "ignoring unreadable derived tier list");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    fn save_derived(&self, scope: &ScopeId, doc: &DerivedDoc) -> IoResult<()> {
        write_canonical_file(&self.file(scope, DERIVED_FILE), doc)
    }

    fn lock_scope(&self, scope: &ScopeId) -> IoResult<ScopeGuard> {
        let path = self.file(scope, LOCK_FILE);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| IoError::Path(format!("create {}: {e}", dir.display())))?;
        }
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| IoError::Path(format!("open {}: {e}", path.display())))?;
        file.lock_exclusive()
            .map_err(|e| IoError::Path(format!("lock {}: {e}", path.display())))?;
        tracing::trace!(%scope, "scope lock taken");
        Ok(ScopeGuard::holding(file))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tl_algo::{set_vote, TierBuckets};
    use tl_core::{ScopeConfig, Tier};

    fn scope(s: &str) -> ScopeId {
        s.parse().unwrap()
    }

    #[test]
    fn votes_round_trip_and_missing_scope_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirStore::open(dir.path()).unwrap();
        let g = scope("guild-1");
        assert!(store.load_votes(&g).unwrap().is_empty());

        let mut votes = VoteSet::new();
        set_vote(&mut votes, &"alice".parse().unwrap(), &"Song A".parse().unwrap(), Tier::SPlus);
        store.save_votes(&g, &votes).unwrap();
        assert_eq!(store.load_votes(&g).unwrap(), votes);

        let text = fs::read_to_string(dir.path().join("guild-1").join("votes.json")).unwrap();
        assert_eq!(text, r#"{"Song A":{"alice":"S+"}}"#);
    }

    #[test]
    fn corrupt_votes_is_an_error_corrupt_derived_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirStore::open(dir.path()).unwrap();
        let g = scope("g");
        fs::create_dir_all(dir.path().join("g")).unwrap();
        fs::write(dir.path().join("g").join("votes.json"), "{oops").unwrap();
        fs::write(dir.path().join("g").join("tiers.json"), "[1,").unwrap();

        assert!(matches!(store.load_votes(&g), Err(IoError::Json { .. })));
        assert_eq!(store.load_derived(&g).unwrap(), None);
    }

    #[test]
    fn setup_config_and_derived_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirStore::open(dir.path()).unwrap();
        let g = scope("g");
        assert_eq!(store.load_config(&g).unwrap(), None);

        let setup = ScopeSetup { channel: Some("42".into()), ..ScopeSetup::default() };
        store.save_setup(&g, &setup).unwrap();
        assert_eq!(store.load_setup(&g).unwrap(), Some(setup));
        assert_eq!(store.load_config(&g).unwrap(), Some(ScopeConfig::default()));

        let doc = DerivedDoc {
            inputs_sha256: "ab".repeat(32),
            damping: 3,
            tiers: TierBuckets::empty_for(&ScopeConfig::default()),
        };
        store.save_derived(&g, &doc).unwrap();
        assert_eq!(store.load_derived(&g).unwrap(), Some(doc));
    }

    #[test]
    fn lists_scope_directories_sorted() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirStore::open(dir.path()).unwrap();
        store.save_votes(&scope("zeta"), &VoteSet::new()).unwrap();
        store.save_votes(&scope("alpha"), &VoteSet::new()).unwrap();
        fs::write(dir.path().join("stray.txt"), "x").unwrap();
        fs::create_dir_all(dir.path().join("not a scope")).unwrap();

        let names: Vec<String> = store.list_scopes().unwrap().into_iter().map(String::from).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }

    #[test]
    fn scope_lock_excludes_a_second_store_on_the_same_root() {
        use std::sync::atomic::{AtomicBool, Ordering};
        use std::sync::Arc;
        use std::time::Duration;

        let dir = tempfile::tempdir().unwrap();
        let first = JsonDirStore::open(dir.path()).unwrap();
        let second = JsonDirStore::open(dir.path()).unwrap();
        let g = scope("g");

        let guard = first.lock_scope(&g).unwrap();
        let acquired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&acquired);
        let g2 = g.clone();
        let waiter = std::thread::spawn(move || {
            let _held = second.lock_scope(&g2).unwrap();
            flag.store(true, Ordering::SeqCst);
        });

        std::thread::sleep(Duration::from_millis(150));
        assert!(!acquired.load(Ordering::SeqCst));
        drop(guard);
        waiter.join().unwrap();
        assert!(acquired.load(Ordering::SeqCst));

        // A scope directory holding only its lock file is not listed.
        assert!(first.list_scopes().unwrap().is_empty());
        first.save_votes(&g, &VoteSet::new()).unwrap();
        assert_eq!(first.list_scopes().unwrap(), vec![g]);
    }
}
