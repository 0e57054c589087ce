//! Snapshot sinks
//!
//! Defines where the runner delivers per-tick snapshots (renderer bridge,
//! JSON-lines stream, in-memory capture for tests).

use crate::engine::snapshot::ControlSnapshot;
use crate::error::ControlResult;
use async_trait::async_trait;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Trait for snapshot consumers
#[async_trait]
pub trait SnapshotSink: Send {
    /// Deliver one snapshot
    async fn publish(&mut self, snapshot: &ControlSnapshot) -> ControlResult<()>;

    /// Flush buffered output
    async fn flush(&mut self) -> ControlResult<()> {
        Ok(())
    }
}

/// Writes each snapshot as one JSON line
pub struct JsonLinesSink<W> {
    writer: W,
    fresh_only: bool,
    written: u64,
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            fresh_only: false,
            written: 0,
        }
    }

    /// Skip snapshots from ticks without a new frame
    pub fn fresh_only(mut self, fresh_only: bool) -> Self {
        self.fresh_only = fresh_only;
        self
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> SnapshotSink for JsonLinesSink<W> {
    async fn publish(&mut self, snapshot: &ControlSnapshot) -> ControlResult<()> {
        if self.fresh_only && !snapshot.fresh {
            return Ok(());
        }
        let mut line = serde_json::to_vec(snapshot)?;
        line.push(b'\n');
        self.writer.write_all(&line).await?;
        self.written += 1;
        Ok(())
    }

    async fn flush(&mut self) -> ControlResult<()> {
        self.writer.flush().await?;
        Ok(())
    }
}

/// Keeps every snapshot in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    pub snapshots: Vec<ControlSnapshot>,
}

#[async_trait]
impl SnapshotSink for MemorySink {
    async fn publish(&mut self, snapshot: &ControlSnapshot) -> ControlResult<()> {
        self.snapshots.push(snapshot.clone());
        Ok(())
    }
}
