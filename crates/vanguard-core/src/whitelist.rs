//! Whitelist materializer: the derived group file.
//!
//! The artifact is regenerated in full from the store on every pass;
//! there is no incremental diffing. A full rewrite guarantees the file
//! always exactly reflects the store, so an entry whose score drops
//! below the threshold cannot linger.
//!
//! Writes are atomic: the content goes to a temporary file in the
//! target directory which is then renamed over the artifact. A crash
//! mid-write leaves the previous contents intact; a partial file is
//! never visible to the game server's config loader.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use vanguard_db::{Database, ProgressStore};
use vanguard_types::ProgressRecord;

use crate::config::{OutputConfig, ProgressConfig};
use crate::error::EngineError;

/// The whitelist materializer. One instance lives for the engine's
/// lifetime.
#[derive(Debug, Clone)]
pub struct Materializer {
    db: Database,
    path: PathBuf,
    group_name: String,
    threshold: f64,
}

impl Materializer {
    /// Create a materializer from the output and progress configuration.
    ///
    /// `base_dir` is the host-supplied directory that relative output
    /// paths resolve against.
    pub fn new(
        db: Database,
        base_dir: &Path,
        output: &OutputConfig,
        progress: &ProgressConfig,
    ) -> Self {
        let configured = Path::new(&output.path);
        let path = if configured.is_absolute() {
            configured.to_path_buf()
        } else {
            base_dir.join(configured)
        };
        Self {
            db,
            path,
            group_name: output.group_name.clone(),
            threshold: f64::from(progress.threshold),
        }
    }

    /// The resolved artifact path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rewrite the artifact from the store's current state. Returns the
    /// number of admin lines written.
    ///
    /// Safe to call before any record exists: the artifact is then just
    /// the group header, which is exactly what the game server needs to
    /// see at first boot.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Db`] if the store read fails, or
    /// [`EngineError::Io`] if the write fails (the previous file
    /// contents remain in place in both cases).
    pub async fn materialize(&self) -> Result<usize, EngineError> {
        let records = ProgressStore::new(self.db.pool())
            .qualifying(self.threshold)
            .await?;
        let contents = render(&records, &self.group_name);
        self.write_atomic(&contents)?;

        debug!(
            admins = records.len(),
            path = %self.path.display(),
            "Whitelist materialized"
        );
        Ok(records.len())
    }

    /// Write `contents` to the artifact path via temp-file-and-rename.
    fn write_atomic(&self, contents: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, contents)?;
        if let Err(error) = fs::rename(&tmp, &self.path) {
            // Leave no stray temp file behind a failed rename.
            if let Err(cleanup) = fs::remove_file(&tmp) {
                warn!(%cleanup, "Failed to remove orphaned temp file");
            }
            return Err(error);
        }
        Ok(())
    }
}

/// Render the group file: group header, blank line, one admin line per
/// qualifying record in store order, trailing newline.
pub fn render(records: &[ProgressRecord], group_name: &str) -> String {
    let mut out = format!("Group={group_name}:reserve\n\n");
    for record in records {
        out.push_str(&format!("Admin={}:{group_name}\n", record.player_id));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use vanguard_types::PlayerId;

    use super::*;

    fn record(id: &str, score: f64) -> ProgressRecord {
        ProgressRecord {
            player_id: PlayerId::new(id),
            score,
            last_progressed_at: Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).single().unwrap(),
        }
    }

    async fn materializer_in(dir: &Path) -> Materializer {
        let db = Database::connect_in_memory().await.unwrap();
        db.run_migrations().await.unwrap();
        Materializer::new(
            db,
            dir,
            &OutputConfig::default(),
            &ProgressConfig::default(),
        )
    }

    async fn seed(materializer: &Materializer, id: &str, score: f64) {
        ProgressStore::new(materializer.db.pool())
            .accrue(
                &PlayerId::new(id),
                score,
                Utc.with_ymd_and_hms(2026, 3, 14, 12, 0, 0).single().unwrap(),
            )
            .await
            .unwrap();
    }

    #[test]
    fn render_produces_exact_format() {
        let records = vec![record("76561198000000001", 120.0), record("eos-abc", 101.5)];
        let text = render(&records, "VanguardReserve");
        assert_eq!(
            text,
            "Group=VanguardReserve:reserve\n\
             \n\
             Admin=76561198000000001:VanguardReserve\n\
             Admin=eos-abc:VanguardReserve\n"
        );
    }

    #[test]
    fn render_with_no_records_is_header_only() {
        let text = render(&[], "VanguardReserve");
        assert_eq!(text, "Group=VanguardReserve:reserve\n\n");
    }

    #[tokio::test]
    async fn first_materialization_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let materializer = materializer_in(dir.path()).await;

        // The default output path nests under a directory that does not
        // exist yet.
        assert!(!materializer.path().parent().unwrap().exists());

        let admins = materializer.materialize().await.unwrap();
        assert_eq!(admins, 0);
        assert!(materializer.path().exists());

        let contents = fs::read_to_string(materializer.path()).unwrap();
        assert_eq!(contents, "Group=VanguardReserve:reserve\n\n");
    }

    #[tokio::test]
    async fn qualifying_records_appear_after_later_run() {
        let dir = tempfile::tempdir().unwrap();
        let materializer = materializer_in(dir.path()).await;
        materializer.materialize().await.unwrap();

        seed(&materializer, "veteran", 150.0).await;
        seed(&materializer, "rookie", 20.0).await;

        let admins = materializer.materialize().await.unwrap();
        assert_eq!(admins, 1);

        let contents = fs::read_to_string(materializer.path()).unwrap();
        assert!(contents.contains("Admin=veteran:VanguardReserve\n"));
        assert!(!contents.contains("rookie"));
    }

    #[tokio::test]
    async fn materialization_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let materializer = materializer_in(dir.path()).await;
        seed(&materializer, "veteran", 150.0).await;
        seed(&materializer, "captain", 110.0).await;

        materializer.materialize().await.unwrap();
        let first = fs::read_to_string(materializer.path()).unwrap();

        materializer.materialize().await.unwrap();
        let second = fs::read_to_string(materializer.path()).unwrap();

        assert_eq!(first, second, "unchanged store produces identical bytes");
    }

    #[tokio::test]
    async fn no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let materializer = materializer_in(dir.path()).await;
        materializer.materialize().await.unwrap();

        let tmp = materializer.path().with_extension("tmp");
        assert!(!tmp.exists());
    }

    #[tokio::test]
    async fn absolute_output_path_is_used_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let absolute = dir.path().join("flat.cfg");

        let db = Database::connect_in_memory().await.unwrap();
        db.run_migrations().await.unwrap();
        let output = OutputConfig {
            path: absolute.to_string_lossy().into_owned(),
            ..OutputConfig::default()
        };
        let materializer = Materializer::new(
            db,
            Path::new("/nonexistent-base"),
            &output,
            &ProgressConfig::default(),
        );

        assert_eq!(materializer.path(), absolute.as_path());
        materializer.materialize().await.unwrap();
        assert!(absolute.exists());
    }
}
