#![allow(dead_code)]

use std::path::PathBuf;
use std::process::Command;

use assert_cmd::prelude::*;

/// Snapshot shared by the CLI tests.
///
/// opp-1 sits in stage 5A with value on CES and INS, giving two service
/// lines of three stages each. opp-2 has no attributed value and a BPS lead
/// offering with no templates. opp-3 never gets a timeline.
pub const SNAPSHOT: &str = r#"{
    "opportunities": [
        {"id": "opp-1", "name": "Claims platform", "total_value": 20.0,
         "service_values": {"CES": 12.0, "INS": 8.0},
         "close_date": "2024-06-01", "current_stage": "5A", "lead_service_line": "CES"},
        {"id": "opp-2", "total_value": 40.0, "service_values": {},
         "close_date": "2024-09-30", "current_stage": "5B", "lead_service_line": "BPS"},
        {"id": "opp-3", "total_value": 1.0, "close_date": "2024-12-01", "current_stage": "2"}
    ],
    "categories": [
        {"name": "SubM", "min_value": 0, "max_value": 5},
        {"name": "CatC", "min_value": 5, "max_value": 15},
        {"name": "CatB", "min_value": 15, "max_value": 30},
        {"name": "CatA", "min_value": 30}
    ],
    "templates": [
        {"category": "CatC", "service_line": "CES", "stage_code": "5A", "duration_weeks": 4, "fte_required": 1.0},
        {"category": "CatC", "service_line": "CES", "stage_code": "5B", "duration_weeks": 2, "fte_required": 2.0},
        {"category": "CatC", "service_line": "CES", "stage_code": "5C", "duration_weeks": 1, "fte_required": 1.0},
        {"category": "CatC", "service_line": "INS", "stage_code": "5A", "duration_weeks": 3, "fte_required": 0.5},
        {"category": "CatC", "service_line": "INS", "stage_code": "5B", "duration_weeks": 3, "fte_required": 0.5},
        {"category": "CatC", "service_line": "INS", "stage_code": "5C", "duration_weeks": 1, "fte_required": 2.0}
    ]
}"#;

/// Isolated database and (absent) config file for one test.
pub struct Workspace {
    pub dir: tempfile::TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("forecast.db")
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.path().join("config.toml")
    }

    pub fn write_snapshot(&self) -> PathBuf {
        let path = self.dir.path().join("snapshot.json");
        std::fs::write(&path, SNAPSHOT).expect("write snapshot");
        path
    }

    /// A `forecast-timeline` command bound to this workspace.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("forecast-timeline").expect("binary built");
        cmd.arg("--db")
            .arg(self.db_path())
            .arg("--config")
            .arg(self.config_path())
            .env_remove("FORECAST_DB_PATH")
            .env_remove("RUST_LOG");
        cmd
    }

    /// Workspace with the snapshot already imported.
    pub fn seeded() -> Self {
        let ws = Self::new();
        let snapshot = ws.write_snapshot();
        ws.cmd()
            .args(["import", "--file"])
            .arg(&snapshot)
            .assert()
            .success();
        ws
    }
}
