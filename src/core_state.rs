//! Shared application state.
//!
//! `CoreState` is built once at startup and shared by every request handler
//! as `Arc<CoreState>`. The artifact store inside it is read-only; the only
//! mutable shared resource is the database, reached through a fresh
//! connection per request.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::NaiveDate;
use rusqlite::Connection;

use crate::config::AppConfig;
use crate::db::{self, DatabaseError};
use crate::inference::ArtifactStore;
use crate::prediction::PredictionService;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

pub struct CoreState {
    database_path: PathBuf,
    artifacts: Arc<ArtifactStore>,
    predictor: PredictionService,
}

impl CoreState {
    pub fn new(database_path: PathBuf, artifacts: Arc<ArtifactStore>) -> Self {
        Self {
            database_path,
            predictor: PredictionService::new(artifacts.clone()),
            artifacts,
        }
    }

    /// Build state from configuration: creates the data directory and the
    /// schema, and seeds facilities. Artifacts are loaded by the caller so a
    /// load failure can stop startup before anything else happens.
    pub fn initialize(config: &AppConfig, artifacts: Arc<ArtifactStore>) -> Result<Self, CoreError> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::SchemaFailed(format!("cannot create {}: {e}", parent.display()))
            })?;
        }

        let mut conn = db::open_database(&config.database_path)?;
        db::seed::seed_facilities(&mut conn, &config.facilities_seed)?;

        tracing::info!(db = %config.database_path.display(), "Database ready");
        Ok(Self::new(config.database_path.clone(), artifacts))
    }

    /// Open a database connection for one request.
    pub fn open_db(&self) -> Result<Connection, CoreError> {
        Ok(db::open_database(&self.database_path)?)
    }

    pub fn artifacts(&self) -> &ArtifactStore {
        &self.artifacts
    }

    pub fn predictor(&self) -> &PredictionService {
        &self.predictor
    }
}

/// The server's current calendar date (UTC). Admission and discharge dates
/// are taken from here.
pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::inference::artifacts::tests::demo_store;

    /// State over a temporary database seeded with the bundled facilities.
    /// Keep the returned `TempDir` alive for the duration of the test.
    pub(crate) fn test_core() -> (Arc<CoreState>, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = AppConfig::with_data_dir(tmp.path().to_path_buf());
        config.facilities_seed =
            std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/facilities.json");
        let core = CoreState::initialize(&config, Arc::new(demo_store())).unwrap();
        (Arc::new(core), tmp)
    }

    #[test]
    fn initialize_creates_and_seeds_database() {
        let (core, tmp) = test_core();
        assert!(tmp.path().join("stayforecast.db").exists());

        let conn = core.open_db().unwrap();
        let facilities = db::list_facilities(&conn).unwrap();
        assert!(facilities.iter().any(|f| f.name == "City General"));
    }

    #[test]
    fn connections_share_one_database() {
        let (core, _tmp) = test_core();
        let a = core.open_db().unwrap();
        let b = core.open_db().unwrap();
        a.execute(
            "INSERT INTO facilities (name, postcode, address, contact_no, capacity)
             VALUES ('Annex', 1, 'x', 'y', 1)",
            [],
        )
        .unwrap();
        assert!(db::get_facility_by_name(&b, "Annex").unwrap().is_some());
    }
}
