//! Out-of-band facility entry.
//!
//! Facilities are reference data maintained by an administrator. At startup
//! the service upserts every facility listed in a JSON seed file, keyed by
//! display name, so ids handed out earlier stay stable.

use std::path::Path;

use rusqlite::Connection;

use super::{upsert_facility, DatabaseError};
use crate::models::NewFacility;

/// Upsert facilities from `path`. A missing file is not an error; it returns 0.
pub fn seed_facilities(conn: &mut Connection, path: &Path) -> Result<usize, DatabaseError> {
    if !path.exists() {
        tracing::info!(path = %path.display(), "No facility seed file, skipping");
        return Ok(0);
    }

    let raw = std::fs::read_to_string(path).map_err(|e| DatabaseError::InvalidSeed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    let facilities: Vec<NewFacility> =
        serde_json::from_str(&raw).map_err(|e| DatabaseError::InvalidSeed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

    let tx = conn.transaction()?;
    for facility in &facilities {
        upsert_facility(&tx, facility)?;
    }
    tx.commit()?;

    tracing::info!(count = facilities.len(), "Facilities seeded");
    Ok(facilities.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{list_facilities, open_memory_database};

    fn write_seed(dir: &Path, body: &str) -> std::path::PathBuf {
        let path = dir.join("facilities.json");
        std::fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn missing_seed_file_is_skipped() {
        let mut conn = open_memory_database().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let n = seed_facilities(&mut conn, &tmp.path().join("absent.json")).unwrap();
        assert_eq!(n, 0);
        assert!(list_facilities(&conn).unwrap().is_empty());
    }

    #[test]
    fn reseeding_updates_in_place() {
        let mut conn = open_memory_database().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let path = write_seed(
            tmp.path(),
            r#"[{"name":"City General","postcode":10001,"address":"1 Main St","contactNo":"5550100","capacity":120}]"#,
        );
        seed_facilities(&mut conn, &path).unwrap();
        let first = list_facilities(&conn).unwrap();

        write_seed(
            tmp.path(),
            r#"[{"name":"City General","postcode":10001,"address":"1 Main St","contactNo":"5550100","capacity":150}]"#,
        );
        seed_facilities(&mut conn, &path).unwrap();
        let second = list_facilities(&conn).unwrap();

        assert_eq!(second.len(), 1);
        assert_eq!(second[0].facid, first[0].facid);
        assert_eq!(second[0].capacity, 150);
    }

    #[test]
    fn malformed_seed_is_rejected() {
        let mut conn = open_memory_database().unwrap();
        let tmp = tempfile::tempdir().unwrap();
        let path = write_seed(tmp.path(), r#"[{"name":"No Address"}]"#);
        let err = seed_facilities(&mut conn, &path).unwrap_err();
        assert!(matches!(err, DatabaseError::InvalidSeed { .. }));
    }

    #[test]
    fn bundled_seed_parses() {
        let mut conn = open_memory_database().unwrap();
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/facilities.json");
        let n = seed_facilities(&mut conn, &path).unwrap();
        assert!(n >= 1);
        assert!(list_facilities(&conn)
            .unwrap()
            .iter()
            .any(|f| f.name == "City General"));
    }
}
