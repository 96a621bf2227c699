use std::time::{Duration, Instant};

/// Frame rate report, printed once per second when `YTML_TRACE_FPS` is set.
pub(crate) struct FrameStats {
    enabled: bool,
    last_report_at: Instant,
    frames: u32,
    total_frame_time: Duration,
    gpu_waits: u64,
}

impl FrameStats {
    pub fn new_from_env() -> Self {
        Self {
            enabled: std::env::var("YTML_TRACE_FPS").is_ok(),
            last_report_at: Instant::now(),
            frames: 0,
            total_frame_time: Duration::ZERO,
            gpu_waits: 0,
        }
    }

    pub fn record_frame(&mut self, frame_time: Duration, waited_for_gpu: bool) {
        if !self.enabled {
            return;
        }

        self.frames += 1;
        self.total_frame_time += frame_time;
        self.gpu_waits += waited_for_gpu as u64;

        let elapsed = self.last_report_at.elapsed();
        if elapsed < Duration::from_secs(1) {
            return;
        }

        let secs = elapsed.as_secs_f64().max(f64::EPSILON);
        let fps = self.frames as f64 / secs;
        let avg_ms = if self.frames == 0 {
            0.0
        } else {
            (self.total_frame_time.as_secs_f64() * 1000.0) / self.frames as f64
        };

        log::info!(
            "[perf ] fps={:.1} frame_avg={:.2}ms frames={} gpu_waits={}",
            fps,
            avg_ms,
            self.frames,
            self.gpu_waits
        );

        self.last_report_at = Instant::now();
        self.frames = 0;
        self.total_frame_time = Duration::ZERO;
        self.gpu_waits = 0;
    }
}
