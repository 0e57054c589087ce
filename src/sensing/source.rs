//! Frame sources
//!
//! The control loop pulls at most one frame per tick through the
//! [`PressureFrameSource`] capability. Concrete backends (hardware drivers,
//! recordings, synthetic generators) are chosen at startup and never
//! inspected by type inside the core.

use crate::error::ControlResult;
use crate::geometry::Vector2;
use crate::sensing::frame::PressureFrame;
use parking_lot::Mutex as ParkingMutex;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Non-blocking frame poll
pub trait PressureFrameSource: Send {
    /// Return the next frame, or `None` when no new frame is ready
    fn next_frame(&mut self) -> Option<PressureFrame>;
}

impl<S: PressureFrameSource + ?Sized> PressureFrameSource for Box<S> {
    fn next_frame(&mut self) -> Option<PressureFrame> {
        (**self).next_frame()
    }
}

/// Single-slot mailbox between a producer thread and the control loop.
///
/// Publishing overwrites any frame the loop has not consumed yet, so the loop
/// always sees the most recent sample.
#[derive(Debug, Clone, Default)]
pub struct LatestFrameSlot {
    inner: Arc<ParkingMutex<Option<PressureFrame>>>,
    dropped: Arc<AtomicU64>,
}

impl LatestFrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a frame, replacing an unconsumed one
    pub fn publish(&self, frame: PressureFrame) {
        let mut slot = self.inner.lock();
        if slot.replace(frame).is_some() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Number of frames overwritten before the loop consumed them
    pub fn dropped_frames(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl PressureFrameSource for LatestFrameSlot {
    fn next_frame(&mut self) -> Option<PressureFrame> {
        self.inner.lock().take()
    }
}

/// Drive `source` on a background thread, publishing into `slot` every
/// `interval` until `is_running` is cleared.
pub fn spawn_frame_producer<S>(
    mut source: S,
    slot: LatestFrameSlot,
    is_running: Arc<AtomicBool>,
    interval: Duration,
) -> std::thread::JoinHandle<()>
where
    S: PressureFrameSource + 'static,
{
    std::thread::spawn(move || {
        tracing::debug!("Frame producer started (interval={:?})", interval);
        let mut produced = 0u64;

        while is_running.load(Ordering::Relaxed) {
            let loop_start = Instant::now();

            if let Some(frame) = source.next_frame() {
                slot.publish(frame);
                produced += 1;
            }

            let elapsed = loop_start.elapsed();
            if elapsed < interval {
                std::thread::sleep(interval - elapsed);
            }
        }

        tracing::debug!(
            "Frame producer stopped (produced={}, dropped={})",
            produced,
            slot.dropped_frames()
        );
    })
}

/// Plays back recorded frames; `None` entries stand for ticks where the
/// recording had no new frame.
#[derive(Debug, Clone, Default)]
pub struct ReplayFrameSource {
    frames: VecDeque<Option<PressureFrame>>,
}

impl ReplayFrameSource {
    pub fn new(frames: Vec<Option<PressureFrame>>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    /// Load a JSON array of frames (`null` for gaps)
    pub fn from_file(path: &Path) -> ControlResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let frames: Vec<Option<PressureFrame>> = serde_json::from_str(&content)?;
        tracing::info!("Loaded {} recorded frames from {}", frames.len(), path.display());
        Ok(Self::new(frames))
    }

    pub fn remaining(&self) -> usize {
        self.frames.len()
    }

    pub fn is_exhausted(&self) -> bool {
        self.frames.is_empty()
    }
}

impl PressureFrameSource for ReplayFrameSource {
    fn next_frame(&mut self) -> Option<PressureFrame> {
        self.frames.pop_front().flatten()
    }
}

/// Generates frames containing a Gaussian contact blob that follows a
/// scripted center-of-pressure trajectory.
#[derive(Debug, Clone)]
pub struct SyntheticFrameSource {
    width: usize,
    height: usize,
    peak: f64,
    sigma: f64,
    script: VecDeque<Option<Vector2>>,
}

/// Blob readings below this are written as zero
const BLOB_CUTOFF: f64 = 1e-4;

impl SyntheticFrameSource {
    /// `script` holds one entry per frame: `Some(center)` for a press,
    /// `None` for a released (all-zero) frame.
    pub fn new(width: usize, height: usize, script: Vec<Option<Vector2>>) -> Self {
        Self {
            width,
            height,
            peak: 1.0,
            sigma: 1.5,
            script: script.into(),
        }
    }

    pub fn with_blob(mut self, peak: f64, sigma: f64) -> Self {
        self.peak = peak;
        self.sigma = sigma.max(f64::EPSILON);
        self
    }

    /// Script for a press at `start`, a linear drag by `stroke` over
    /// `drag_frames` frames, a hold at the end point and a release.
    pub fn press_and_drag(
        start: Vector2,
        stroke: Vector2,
        hold_frames: usize,
        drag_frames: usize,
        release_frames: usize,
    ) -> Vec<Option<Vector2>> {
        let mut script = Vec::with_capacity(hold_frames * 2 + drag_frames + release_frames);
        script.extend(std::iter::repeat(Some(start)).take(hold_frames));
        for i in 1..=drag_frames {
            let t = i as f64 / drag_frames as f64;
            script.push(Some(start + stroke * t));
        }
        script.extend(std::iter::repeat(Some(start + stroke)).take(hold_frames));
        script.extend(std::iter::repeat(None).take(release_frames));
        script
    }

    /// Render a frame with the blob centered at `center`
    pub fn render(&self, center: Option<Vector2>) -> PressureFrame {
        let mut frame = PressureFrame::zeros(self.width, self.height);
        if let Some(c) = center {
            let two_sigma_sq = 2.0 * self.sigma * self.sigma;
            for y in 0..self.height {
                for x in 0..self.width {
                    let dx = x as f64 - c.x;
                    let dy = y as f64 - c.y;
                    let value = self.peak * (-(dx * dx + dy * dy) / two_sigma_sq).exp();
                    if value >= BLOB_CUTOFF {
                        frame.set(x, y, value);
                    }
                }
            }
        }
        frame
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl PressureFrameSource for SyntheticFrameSource {
    fn next_frame(&mut self) -> Option<PressureFrame> {
        let center = self.script.pop_front()?;
        Some(self.render(center))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensing::centroid::estimate_cop;

    #[test]
    fn test_slot_keeps_only_latest() {
        let mut slot = LatestFrameSlot::new();
        let mut first = PressureFrame::zeros(2, 2);
        first.set(0, 0, 1.0);
        let mut second = PressureFrame::zeros(2, 2);
        second.set(1, 1, 1.0);

        slot.publish(first);
        slot.publish(second.clone());

        assert_eq!(slot.next_frame(), Some(second));
        assert_eq!(slot.next_frame(), None, "slot should be empty after take");
        assert_eq!(slot.dropped_frames(), 1);
    }

    #[test]
    fn test_dropped_count_shared_across_threads() {
        let slot = LatestFrameSlot::new();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let slot = slot.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        slot.publish(PressureFrame::zeros(2, 2));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        // 100 publishes, one frame still waiting in the slot
        assert_eq!(slot.dropped_frames(), 99);
    }

    #[test]
    fn test_replay_yields_gaps_as_none() {
        let frame = PressureFrame::zeros(2, 2);
        let mut source = ReplayFrameSource::new(vec![Some(frame.clone()), None, Some(frame)]);
        assert!(source.next_frame().is_some());
        assert!(source.next_frame().is_none());
        assert!(source.next_frame().is_some());
        assert!(source.is_exhausted());
    }

    #[test]
    fn test_replay_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frames.json");
        std::fs::write(
            &path,
            r#"[{"width":2,"height":1,"values":[0.0,0.5]}, null]"#,
        )
        .unwrap();

        let mut source = ReplayFrameSource::from_file(&path).unwrap();
        assert_eq!(source.remaining(), 2);
        let frame = source.next_frame().unwrap();
        assert_eq!(frame.get(1, 0), Some(0.5));
    }

    #[test]
    fn test_synthetic_blob_centroid_tracks_script() {
        let center = Vector2::new(20.3, 40.7);
        let mut source = SyntheticFrameSource::new(64, 64, vec![Some(center), None]);

        let frame = source.next_frame().unwrap();
        let cop = estimate_cop(&frame, 0.01).unwrap();
        assert!(cop.distance(center) < 0.1, "COP {:?} should be near {:?}", cop, center);

        let released = source.next_frame().unwrap();
        assert!(released.values.iter().all(|&v| v == 0.0));
        assert!(source.next_frame().is_none(), "exhausted script yields no frame");
    }

    #[test]
    fn test_press_and_drag_script_shape() {
        let script = SyntheticFrameSource::press_and_drag(
            Vector2::new(32.0, 32.0),
            Vector2::new(6.0, 0.0),
            3,
            4,
            2,
        );
        assert_eq!(script.len(), 3 + 4 + 3 + 2);
        assert_eq!(script[6], Some(Vector2::new(38.0, 32.0)));
        assert_eq!(script.last(), Some(&None));
    }

    #[test]
    fn test_producer_thread_publishes() {
        let slot = LatestFrameSlot::new();
        let running = Arc::new(AtomicBool::new(true));
        let source = SyntheticFrameSource::new(8, 8, vec![Some(Vector2::new(4.0, 4.0)); 1000]);

        let handle = spawn_frame_producer(source, slot.clone(), running.clone(), Duration::from_millis(1));

        let mut reader = slot.clone();
        let mut received = None;
        for _ in 0..500 {
            if let Some(frame) = reader.next_frame() {
                received = Some(frame);
                break;
            }
            std::thread::sleep(Duration::from_millis(2));
        }

        running.store(false, Ordering::SeqCst);
        handle.join().unwrap();
        assert!(received.is_some(), "producer should have published a frame");
    }
}
