use async_trait::async_trait;
use flate2::read::GzDecoder;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::{Path, PathBuf};
use talon_core::{TalonError, TalonResult};
use talon_pipeline::EventSource;
use tracing::info;

/// Streams line-delimited JSON out of gzip-compressed archive files in a
/// local directory. Files are matched by name prefix, GitHub Archive style:
/// a prefix of `2026-02-01` picks up `2026-02-01-0.json.gz` through
/// `2026-02-01-23.json.gz`.
#[derive(Debug)]
pub struct GzJsonDirSource {
    // Remaining files in reverse name order; popped from the back.
    files: Vec<PathBuf>,
    current: Option<Lines<BufReader<GzDecoder<File>>>>,
}

impl GzJsonDirSource {
    pub fn open(dir: &Path, name_prefix: &str) -> TalonResult<Self> {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.starts_with(name_prefix) && name.ends_with(".json.gz") {
                files.push(entry.path());
            }
        }
        if files.is_empty() {
            return Err(TalonError::Source(format!(
                "no {}*.json.gz files under {}",
                name_prefix,
                dir.display()
            )));
        }
        files.sort();
        files.reverse();
        info!(dir = %dir.display(), prefix = %name_prefix, files = files.len(), "reading archive files");
        Ok(Self {
            files,
            current: None,
        })
    }

    fn next_line(&mut self) -> TalonResult<Option<String>> {
        loop {
            if let Some(lines) = &mut self.current {
                match lines.next() {
                    Some(Ok(line)) => {
                        if line.trim().is_empty() {
                            continue;
                        }
                        return Ok(Some(line));
                    }
                    Some(Err(e)) => return Err(e.into()),
                    None => self.current = None,
                }
            }
            let Some(path) = self.files.pop() else {
                return Ok(None);
            };
            let file = File::open(&path)?;
            self.current = Some(BufReader::new(GzDecoder::new(file)).lines());
        }
    }
}

#[async_trait]
impl EventSource for GzJsonDirSource {
    async fn next_raw(&mut self) -> TalonResult<Option<Value>> {
        let Some(line) = self.next_line()? else {
            return Ok(None);
        };
        // A line that is not JSON is one malformed record, not a dead batch.
        serde_json::from_str(&line)
            .map(Some)
            .map_err(|e| TalonError::Extract(format!("bad json line: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_gz(dir: &Path, name: &str, lines: &[&str]) {
        let file = File::create(dir.join(name)).expect("create archive file");
        let mut encoder = GzEncoder::new(file, Compression::default());
        for line in lines {
            writeln!(encoder, "{}", line).expect("write line");
        }
        encoder.finish().expect("finish gzip");
    }

    async fn drain(source: &mut GzJsonDirSource) -> Vec<Value> {
        let mut out = Vec::new();
        loop {
            match source.next_raw().await {
                Ok(Some(v)) => out.push(v),
                Ok(None) => break,
                Err(TalonError::Extract(_)) => continue,
                Err(e) => panic!("source error: {}", e),
            }
        }
        out
    }

    #[tokio::test]
    async fn reads_lines_across_files_in_name_order() {
        let dir = TempDir::new().expect("tempdir");
        write_gz(dir.path(), "2026-02-01-0.json.gz", &[r#"{"id":"1"}"#, ""]);
        write_gz(dir.path(), "2026-02-01-1.json.gz", &[r#"{"id":"2"}"#]);

        let mut source = GzJsonDirSource::open(dir.path(), "2026-02-01").expect("open");
        let records = drain(&mut source).await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["id"], "1");
        assert_eq!(records[1]["id"], "2");
    }

    #[tokio::test]
    async fn prefix_filters_other_partitions() {
        let dir = TempDir::new().expect("tempdir");
        write_gz(dir.path(), "2026-02-01-0.json.gz", &[r#"{"id":"1"}"#]);
        write_gz(dir.path(), "2026-02-02-0.json.gz", &[r#"{"id":"9"}"#]);

        let mut source = GzJsonDirSource::open(dir.path(), "2026-02-01").expect("open");
        let records = drain(&mut source).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["id"], "1");
    }

    #[tokio::test]
    async fn bad_json_line_is_a_record_level_error() {
        let dir = TempDir::new().expect("tempdir");
        write_gz(
            dir.path(),
            "2026-02-01-0.json.gz",
            &[r#"{"id":"1"}"#, "{{{not json", r#"{"id":"2"}"#],
        );

        let mut source = GzJsonDirSource::open(dir.path(), "2026-02-01").expect("open");
        let mut seen = 0;
        let mut dropped = 0;
        loop {
            match source.next_raw().await {
                Ok(Some(_)) => seen += 1,
                Ok(None) => break,
                Err(TalonError::Extract(_)) => dropped += 1,
                Err(e) => panic!("source error: {}", e),
            }
        }
        assert_eq!(seen, 2);
        assert_eq!(dropped, 1);
    }

    #[test]
    fn empty_partition_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = GzJsonDirSource::open(dir.path(), "2026-02-01").expect_err("should fail");
        assert!(matches!(err, TalonError::Source(_)));
    }
}
