//! Camera Capture
//!
//! `FrameSource` is the lifecycle seam for a real camera. `SyntheticCamera`
//! produces blank frames at a fixed rate for demos and tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// One captured image plus its capture timestamp
#[derive(Debug, Clone)]
pub struct Frame {
    pub id: u64,
    /// Time since capture start
    pub timestamp: Duration,
    pub width: u32,
    pub height: u32,
    /// Opaque pixel payload, never decoded here
    pub pixels: Arc<[u8]>,
}

impl Frame {
    pub fn new(
        id: u64,
        timestamp: Duration,
        width: u32,
        height: u32,
        pixels: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            id,
            timestamp,
            width,
            height,
            pixels: pixels.into(),
        }
    }

    /// Frame with no pixel payload
    pub fn blank(id: u64, timestamp: Duration, width: u32, height: u32) -> Self {
        Self::new(id, timestamp, width, height, Vec::<u8>::new())
    }

    /// Size of the pixel payload in bytes
    pub fn byte_len(&self) -> usize {
        self.pixels.len()
    }
}

/// Receives frames on the capture thread. Must not block.
pub type FrameSink = Arc<dyn Fn(Frame) + Send + Sync>;

/// Camera lifecycle, tied to view visibility
pub trait FrameSource {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

// ============================================================================
// SYNTHETIC CAMERA
// ============================================================================

pub struct SyntheticCamera {
    fps: u32,
    width: u32,
    height: u32,
    sink: FrameSink,
    running: Arc<AtomicBool>,
    next_id: Arc<AtomicU64>,
    worker: Option<JoinHandle<()>>,
}

impl SyntheticCamera {
    pub fn new(fps: u32, sink: FrameSink) -> Self {
        Self {
            fps: fps.max(1),
            width: 1280,
            height: 720,
            sink,
            running: Arc::new(AtomicBool::new(false)),
            next_id: Arc::new(AtomicU64::new(0)),
            worker: None,
        }
    }

    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn frames_delivered(&self) -> u64 {
        self.next_id.load(Ordering::Relaxed)
    }
}

impl FrameSource for SyntheticCamera {
    fn start(&mut self) {
        if self.running.swap(true, Ordering::SeqCst) {
            return;
        }

        let running = self.running.clone();
        let next_id = self.next_id.clone();
        let sink = self.sink.clone();
        let interval = Duration::from_nanos(1_000_000_000 / u64::from(self.fps));
        let (fps, width, height) = (self.fps, self.width, self.height);

        self.worker = Some(thread::spawn(move || {
            log::info!("Synthetic camera started ({} fps, {}x{})", fps, width, height);
            let started = Instant::now();
            let mut next_tick = started;

            while running.load(Ordering::SeqCst) {
                let id = next_id.fetch_add(1, Ordering::Relaxed);
                sink(Frame::blank(id, started.elapsed(), width, height));

                next_tick += interval;
                let now = Instant::now();
                if next_tick > now {
                    thread::sleep(next_tick - now);
                } else {
                    next_tick = now;
                }
            }
            log::info!("Synthetic camera stopped");
        }));
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Capture thread panicked");
            }
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for SyntheticCamera {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[test]
    fn test_delivers_ordered_frames_until_stopped() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = seen.clone();
        let sink: FrameSink = Arc::new(move |frame: Frame| sink_seen.lock().push(frame.id));

        let mut camera = SyntheticCamera::new(200, sink).with_resolution(64, 48);
        camera.start();
        assert!(camera.is_running());
        thread::sleep(Duration::from_millis(100));
        camera.stop();
        assert!(!camera.is_running());

        let ids = seen.lock().clone();
        assert!(!ids.is_empty());
        assert!(ids.windows(2).all(|w| w[1] == w[0] + 1));

        // no frames after stop
        let count = ids.len();
        thread::sleep(Duration::from_millis(30));
        assert_eq!(seen.lock().len(), count);
    }

    #[test]
    fn test_frame_shares_pixel_payload() {
        let frame = Frame::new(3, Duration::from_millis(99), 2, 2, vec![10u8, 20, 30, 40]);
        let copy = frame.clone();

        assert_eq!(frame.byte_len(), 4);
        assert!(Arc::ptr_eq(&frame.pixels, &copy.pixels));
        assert_eq!(Frame::blank(0, Duration::ZERO, 64, 48).byte_len(), 0);
    }

    #[test]
    fn test_start_is_idempotent() {
        let sink: FrameSink = Arc::new(|_| {});
        let mut camera = SyntheticCamera::new(100, sink);
        camera.start();
        camera.start();
        camera.stop();
        camera.stop();
    }
}
