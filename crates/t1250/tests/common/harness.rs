//! Test harness for isolated loader runs.
//!
//! The `TestHarness` owns a temp directory holding the SQLite database, the
//! notification flag directory and any input files, plus the shipped
//! configuration with reference agents seeded.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use t1250::config::{load_config_from_str, Config, Profile};
use t1250::db::{agent_repo, item_repo, job_repo, Database, SqliteStore};
use t1250::db::item_repo::ItemRow;
use t1250::db::job_repo::JobRow;
use t1250::notify::FlagDirQueue;
use t1250::pipeline::{FileReport, Pipeline, RunOptions};

use super::builders::{file_lines, RecordBuilder};

const SHIPPED_CONFIG: &str = include_str!("../../../../config/t1250.json");

pub struct TestHarness {
    temp_dir: TempDir,
    pub config: Config,
    pub db: Database,
    pub flags_dir: PathBuf,
}

impl TestHarness {
    /// Shipped configuration, agents `A100` and `A200` active, `A900`
    /// inactive.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let config = load_config_from_str(SHIPPED_CONFIG).expect("Shipped config is valid");
        let db = Database::open(&temp_dir.path().join("data").join("t1250.db"))
            .expect("Failed to open database");
        agent_repo::upsert(&db, "A100", Some("Cairns"), true).expect("Failed to seed agent");
        agent_repo::upsert(&db, "A200", Some("Townsville"), true).expect("Failed to seed agent");
        agent_repo::upsert(&db, "A900", Some("Closed"), false).expect("Failed to seed agent");
        let flags_dir = temp_dir.path().join("flags");

        Self {
            temp_dir,
            config,
            db,
            flags_dir,
        }
    }

    pub fn temp_path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn profile(&self, business_unit: &str) -> Profile {
        self.config
            .resolve(business_unit)
            .expect("Business unit is configured")
    }

    pub fn record(&self, business_unit: &str) -> RecordBuilder {
        RecordBuilder::new(&self.profile(business_unit).fields)
    }

    pub fn pipeline(&self, business_unit: &str) -> Pipeline<SqliteStore, FlagDirQueue> {
        Pipeline::new(
            Arc::new(self.profile(business_unit)),
            SqliteStore::new(self.db.clone()),
            FlagDirQueue::new(&self.flags_dir),
        )
    }

    pub fn run(
        &self,
        business_unit: &str,
        records: &[RecordBuilder],
        options: &RunOptions,
    ) -> FileReport {
        self.pipeline(business_unit)
            .run_lines(file_lines(records), options)
            .expect("File ran")
    }

    pub fn write_file(&self, name: &str, lines: &[String]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        std::fs::write(&path, lines.join("\n") + "\n").expect("Failed to write input file");
        path
    }

    pub fn jobs_with_barcode(&self, barcode: &str) -> Vec<JobRow> {
        job_repo::find_ids_by_barcode(&self.db, barcode)
            .expect("Lookup failed")
            .into_iter()
            .filter_map(|id| job_repo::find_by_id(&self.db, id).expect("Lookup failed"))
            .collect()
    }

    pub fn items_of(&self, job_id: i64) -> Vec<ItemRow> {
        item_repo::list_by_job(&self.db, job_id).expect("Lookup failed")
    }

    pub fn job_count(&self) -> u64 {
        job_repo::count(&self.db).expect("Count failed")
    }

    pub fn item_count(&self) -> u64 {
        item_repo::count(&self.db).expect("Count failed")
    }

    /// Flag file names, sorted.
    pub fn flags(&self) -> Vec<String> {
        let Ok(entries) = std::fs::read_dir(&self.flags_dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
