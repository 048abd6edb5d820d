use async_trait::async_trait;
use flate2::read::GzDecoder;
use s3::bucket::Bucket;
use s3::creds::Credentials;
use s3::Region;
use serde_json::Value;
use std::collections::VecDeque;
use std::io::{BufRead, BufReader};
use talon_core::{ActorSummary, TalonError, TalonResult};
use talon_pipeline::{EventSource, SummarySink};
use tracing::info;

/// Bucket handle for the archive store. Region and endpoint are explicit so
/// the same code talks to AWS, R2, or a local MinIO.
pub struct S3Store {
    bucket: Box<Bucket>,
}

impl S3Store {
    pub fn new(
        bucket_name: &str,
        region: &str,
        endpoint: &str,
        access_key: &str,
        secret_key: &str,
    ) -> TalonResult<Self> {
        let region = Region::Custom {
            region: region.to_string(),
            endpoint: endpoint.to_string(),
        };
        let credentials = Credentials::new(Some(access_key), Some(secret_key), None, None, None)
            .map_err(|e| TalonError::Config(e.to_string()))?;
        let bucket = Bucket::new(bucket_name, region, credentials)
            .map_err(|e| TalonError::Config(e.to_string()))?
            .with_path_style();
        Ok(Self { bucket })
    }

    pub async fn list_keys(&self, prefix: &str) -> TalonResult<Vec<String>> {
        let pages = self
            .bucket
            .list(prefix.to_string(), None)
            .await
            .map_err(|e| TalonError::Source(e.to_string()))?;
        let mut keys: Vec<String> = pages
            .into_iter()
            .flat_map(|page| page.contents)
            .map(|object| object.key)
            .collect();
        keys.sort();
        Ok(keys)
    }

    pub async fn download(&self, key: &str) -> TalonResult<Vec<u8>> {
        let resp = self
            .bucket
            .get_object(key)
            .await
            .map_err(|e| TalonError::Source(e.to_string()))?;
        Ok(resp.to_vec())
    }

    pub async fn upload(&self, key: &str, data: &[u8], content_type: &str) -> TalonResult<()> {
        self.bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| TalonError::Sink(e.to_string()))?;
        info!(key = %key, size = data.len(), "uploaded to object store");
        Ok(())
    }
}

/// Reads one partition of gzipped line-delimited JSON objects, keys listed
/// under `<prefix>` (e.g. `raw/2026-02-01-`), one object at a time.
pub struct S3EventSource {
    store: S3Store,
    // Remaining keys in reverse name order; popped from the back.
    keys: Vec<String>,
    lines: VecDeque<String>,
}

impl S3EventSource {
    pub async fn open(store: S3Store, prefix: &str) -> TalonResult<Self> {
        let mut keys = store.list_keys(prefix).await?;
        if keys.is_empty() {
            return Err(TalonError::Source(format!("no objects under {}", prefix)));
        }
        info!(prefix = %prefix, objects = keys.len(), "reading archive objects");
        keys.reverse();
        Ok(Self {
            store,
            keys,
            lines: VecDeque::new(),
        })
    }

    async fn fill_buffer(&mut self) -> TalonResult<bool> {
        let Some(key) = self.keys.pop() else {
            return Ok(false);
        };
        let compressed = self.store.download(&key).await?;
        let reader = BufReader::new(GzDecoder::new(&compressed[..]));
        for line in reader.lines() {
            let line = line.map_err(|e| {
                TalonError::Source(format!("corrupt object {}: {}", key, e))
            })?;
            if !line.trim().is_empty() {
                self.lines.push_back(line);
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl EventSource for S3EventSource {
    async fn next_raw(&mut self) -> TalonResult<Option<Value>> {
        loop {
            if let Some(line) = self.lines.pop_front() {
                return serde_json::from_str(&line)
                    .map(Some)
                    .map_err(|e| TalonError::Extract(format!("bad json line: {}", e)));
            }
            if !self.fill_buffer().await? {
                return Ok(None);
            }
        }
    }
}

/// Publishes the whole summary as one line-delimited JSON object at a fixed
/// key. A single put per run is the full-replace contract: the previous
/// table stays in place until the new one lands.
pub struct S3SummarySink {
    store: S3Store,
    key: String,
}

impl S3SummarySink {
    pub fn new(store: S3Store, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }
}

#[async_trait]
impl SummarySink for S3SummarySink {
    async fn publish(&self, rows: &[ActorSummary]) -> TalonResult<()> {
        let mut body = Vec::new();
        for row in rows {
            serde_json::to_writer(&mut body, row)?;
            body.push(b'\n');
        }
        self.store
            .upload(&self.key, &body, "application/x-ndjson")
            .await?;
        info!(key = %self.key, rows = rows.len(), "summary published");
        Ok(())
    }
}
