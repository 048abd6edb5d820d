use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use talon_core::{ActorSummary, TalonError, TalonResult};
use talon_pipeline::SummarySink;
use tracing::info;

/// Writes the summary as line-delimited JSON to a local file.
///
/// Rows go to a temp file beside the target which is then renamed over it,
/// so a failed run leaves the previous table untouched and a finished run
/// fully replaces it.
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SummarySink for JsonFileSink {
    async fn publish(&self, rows: &[ActorSummary]) -> TalonResult<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));
        std::fs::create_dir_all(&parent)?;

        let file_name = self
            .path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                TalonError::Sink(format!("bad output path: {}", self.path.display()))
            })?;
        let tmp_path = parent.join(format!(".{}.tmp", file_name));

        let mut tmp = std::fs::File::create(&tmp_path)?;
        for row in rows {
            let line = serde_json::to_string(row)?;
            writeln!(tmp, "{}", line)?;
        }
        tmp.sync_all()?;
        drop(tmp);
        std::fs::rename(&tmp_path, &self.path)?;

        info!(path = %self.path.display(), rows = rows.len(), "summary published");
        Ok(())
    }
}
