//! Canonical JSON for scope documents.
//!
//! Canonical form: object keys in byte order, array order kept, compact
//! separators, no trailing newline. Equal documents therefore hash equal,
//! whatever map type produced them.
//!
//! Files are replaced atomically: the bytes go to a temp file in the target
//! directory, which is synced and then renamed over the target.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::{IoError, IoResult};

/// Canonical bytes of any serializable value.
pub fn to_canonical_bytes<T: Serialize + ?Sized>(v: &T) -> IoResult<Vec<u8>> {
    to_canonical_json_bytes(&serde_json::to_value(v)?)
}

pub fn to_canonical_json_bytes(v: &Value) -> IoResult<Vec<u8>> {
    let mut out = Vec::with_capacity(256);
    emit(v, &mut out)?;
    Ok(out)
}

/// Replace `path` with the canonical encoding of `v`, creating parent
/// directories as needed.
pub fn write_canonical_file<T: Serialize + ?Sized>(path: &Path, v: &T) -> IoResult<()> {
    let bytes = to_canonical_bytes(v)?;
    replace_file(path, &bytes)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "wrote canonical json");
    Ok(())
}

/// Parse `path`. A missing file is `Ok(None)`; unreadable JSON is `IoError::Json`
/// with `file:line:column` as the location.
pub fn read_json_opt<T: DeserializeOwned>(path: &Path) -> IoResult<Option<T>> {
    let bytes = match fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(IoError::Path(format!("read {}: {e}", path.display()))),
    };
    serde_json::from_slice(&bytes).map(Some).map_err(|e| IoError::Json {
        pointer: format!("{}:{}:{}", path.display(), e.line(), e.column()),
        msg: e.to_string(),
    })
}

fn replace_file(path: &Path, bytes: &[u8]) -> IoResult<()> {
    let dir = path
        .parent()
        .ok_or_else(|| IoError::Path(format!("no parent directory: {}", path.display())))?;
    fs::create_dir_all(dir).map_err(|e| IoError::Path(format!("create {}: {e}", dir.display())))?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .map_err(|e| IoError::Path(format!("replace {}: {}", path.display(), e.error)))?;
    sync_dir(dir);
    Ok(())
}

// Makes the rename durable. Best effort.
#[cfg(unix)]
fn sync_dir(dir: &Path) {
    if let Ok(d) = fs::File::open(dir) {
        let _ = d.sync_all();
    }
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) {}

fn emit(v: &Value, out: &mut Vec<u8>) -> IoResult<()> {
    match v {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_unstable_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
            out.push(b'{');
            for (i, (key, val)) in entries.into_iter().enumerate() {
                if i != 0 {
                    out.push(b',');
                }
                serde_json::to_writer(&mut *out, key)?;
                out.push(b':');
                emit(val, out)?;
            }
            out.push(b'}');
        }
        Value::Array(items) => {
            out.push(b'[');
            for (i, item) in items.iter().enumerate() {
                if i != 0 {
                    out.push(b',');
                }
                emit(item, out)?;
            }
            out.push(b']');
        }
        // Scalars already have a single compact spelling.
        scalar => serde_json::to_writer(&mut *out, scalar)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_keys_sorted_array_order_kept() {
        let v = json!({"votes": {"b": {"u2": "A", "u1": "S+"}, "a": {}}, "config": [3, 1, 2]});
        let s = String::from_utf8(to_canonical_json_bytes(&v).unwrap()).unwrap();
        assert_eq!(s, r#"{"config":[3,1,2],"votes":{"a":{},"b":{"u1":"S+","u2":"A"}}}"#);
    }

    #[test]
    fn scalars_and_escapes() {
        let v = json!({"t": "say \"hi\"\n", "n": null, "f": 7.5, "ok": true});
        let s = String::from_utf8(to_canonical_json_bytes(&v).unwrap()).unwrap();
        assert_eq!(s, r#"{"f":7.5,"n":null,"ok":true,"t":"say \"hi\"\n"}"#);
    }

    #[test]
    fn replaces_file_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scope").join("votes.json");
        write_canonical_file(&path, &json!({"z": 1})).unwrap();
        write_canonical_file(&path, &json!({"z": 2, "a": [1, 2]})).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"a":[1,2],"z":2}"#);
        let back: Option<Value> = read_json_opt(&path).unwrap();
        assert_eq!(back, Some(json!({"a": [1, 2], "z": 2})));
        assert_eq!(fs::read_dir(path.parent().unwrap()).unwrap().count(), 1);
    }

    #[test]
    fn missing_is_none_and_garbage_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing: Option<Value> = read_json_opt(&dir.path().join("nope.json")).unwrap();
        assert!(missing.is_none());

        let bad = dir.path().join("bad.json");
        fs::write(&bad, b"{not json").unwrap();
        assert!(matches!(read_json_opt::<Value>(&bad), Err(IoError::Json { .. })));
    }
}
