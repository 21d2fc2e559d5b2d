// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use std::path::PathBuf;
use std::time::Instant;

use crate::config::ReadinessConfig;
use crate::domain::ReadinessResponse;

pub const LOCAL_MODE: &str = "local";

/// Outcome of one readiness probe.
#[derive(Debug, Clone, PartialEq)]
pub struct Readiness {
    pub ready: bool,
    pub report: ReadinessResponse,
}

/// Checks whether the data the service depends on is in place.
#[derive(Debug, Clone)]
pub struct ReadinessProbe {
    mode: String,
    database_path: PathBuf,
    index_dir: PathBuf,
}

impl ReadinessProbe {
    pub fn new(config: &ReadinessConfig) -> Self {
        Self {
            mode: config.mode.clone(),
            database_path: PathBuf::from(&config.database_path),
            index_dir: PathBuf::from(&config.index_dir),
        }
    }

    /// `local` mode is always ready; every other mode needs both the
    /// database file and the index directory.
    pub fn check(&self) -> Readiness {
        if self.mode == LOCAL_MODE {
            return Readiness {
                ready: true,
                report: ReadinessResponse {
                    status: "ready".to_string(),
                    mode: self.mode.clone(),
                    db_ok: None,
                    indexes_ok: None,
                    db_path: None,
                    index_dir: None,
                },
            };
        }

        let db_ok = self.database_path.exists();
        let indexes_ok = self.index_dir.exists();
        let ready = db_ok && indexes_ok;

        if !ready {
            tracing::warn!(
                mode = %self.mode,
                db_ok,
                indexes_ok,
                "Service is not ready"
            );
        }

        Readiness {
            ready,
            report: ReadinessResponse {
                status: if ready { "ready" } else { "not-ready" }.to_string(),
                mode: self.mode.clone(),
                db_ok: Some(db_ok),
                indexes_ok: Some(indexes_ok),
                db_path: Some(self.database_path.display().to_string()),
                index_dir: Some(self.index_dir.display().to_string()),
            },
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Uptime {
    started: Instant,
}

impl Uptime {
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Seconds since start, rounded to two decimals.
    pub fn seconds(&self) -> f64 {
        (self.started.elapsed().as_secs_f64() * 100.0).round() / 100.0
    }
}

impl Default for Uptime {
    fn default() -> Self {
        Self::start()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(mode: &str, database_path: String, index_dir: String) -> ReadinessConfig {
        ReadinessConfig {
            mode: mode.to_string(),
            database_path,
            index_dir,
        }
    }

    #[test]
    fn test_local_mode_is_ready() {
        let probe = ReadinessProbe::new(&config(
            "local",
            "/does/not/exist".into(),
            "/nor/this".into(),
        ));
        let readiness = probe.check();

        assert!(readiness.ready);
        assert_eq!(readiness.report.status, "ready");
        assert_eq!(readiness.report.db_ok, None);
        assert_eq!(readiness.report.db_path, None);
    }

    #[test]
    fn test_missing_database_is_not_ready() {
        let dir = TempDir::new().unwrap();
        let indexes = dir.path().join("indexes");
        std::fs::create_dir(&indexes).unwrap();

        let probe = ReadinessProbe::new(&config(
            "server",
            dir.path().join("db.sqlite").display().to_string(),
            indexes.display().to_string(),
        ));
        let readiness = probe.check();

        assert!(!readiness.ready);
        assert_eq!(readiness.report.status, "not-ready");
        assert_eq!(readiness.report.db_ok, Some(false));
        assert_eq!(readiness.report.indexes_ok, Some(true));
    }

    #[test]
    fn test_all_present_is_ready() {
        let dir = TempDir::new().unwrap();
        let db = dir.path().join("db.sqlite");
        std::fs::write(&db, b"").unwrap();

        let probe = ReadinessProbe::new(&config(
            "server",
            db.display().to_string(),
            dir.path().display().to_string(),
        ));
        let readiness = probe.check();

        assert!(readiness.ready);
        assert_eq!(readiness.report.mode, "server");
        assert_eq!(readiness.report.db_path, Some(db.display().to_string()));
    }

    #[test]
    fn test_uptime_is_non_negative() {
        let uptime = Uptime::start();
        assert!(uptime.seconds() >= 0.0);
    }
}
