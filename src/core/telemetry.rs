// src/core/telemetry.rs

//! Periodic sampling of host performance counters.

use std::fmt;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Counters read from the host whenever a telemetry sample is due.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HostCounters {
    /// Memory used by the host's managed heap or scripting runtime.
    pub managed_bytes: u64,
    /// Total memory allocated by the host.
    pub total_allocated_bytes: u64,
    /// Size of the collected heap, tracked for the per-sample delta.
    pub heap_bytes: u64,
    /// Number of live objects in the scene.
    pub object_count: usize,
    /// Name of the active scene or level.
    pub scene_name: String,
    /// Scaled time since the scene started, in seconds.
    pub scene_time_secs: f64,
    /// Real time since startup, in seconds.
    pub realtime_secs: f64,
    /// Current time scale.
    pub time_scale: f64,
    /// Rendered triangles, when the renderer exposes them.
    pub triangles: Option<u64>,
    /// Draw calls or batches, when the renderer exposes them.
    pub draw_calls: Option<u64>,
    /// Audio sources currently playing.
    pub audio_channels: usize,
    /// Static description of the machine.
    pub system: SystemInfo,
}

/// Static description of the machine the host runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    /// Processor description.
    pub cpu: String,
    /// Logical core count.
    pub cores: usize,
    /// Installed memory, when known.
    pub ram_mb: Option<u64>,
    /// Graphics device name.
    pub gpu: String,
    /// Operating system description.
    pub os: String,
}

impl SystemInfo {
    /// Whatever the standard library can tell about this machine.
    pub fn detect() -> Self {
        Self {
            cpu: std::env::consts::ARCH.to_string(),
            cores: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            ram_mb: None,
            gpu: "N/A".to_string(),
            os: format!("{} ({})", std::env::consts::OS, std::env::consts::FAMILY),
        }
    }
}

impl Default for SystemInfo {
    fn default() -> Self {
        Self::detect()
    }
}

/// Anything able to report [`HostCounters`].
pub trait TelemetrySource {
    /// Reads the current counters.
    fn counters(&self) -> HostCounters;
}

impl TelemetrySource for HostCounters {
    fn counters(&self) -> HostCounters {
        self.clone()
    }
}

/// One formatted telemetry sample.
#[derive(Debug, Clone, PartialEq)]
pub struct TelemetryReport {
    /// Average frames per second over the interval.
    pub fps: f64,
    /// See [`HostCounters::managed_bytes`].
    pub managed_mb: f64,
    /// See [`HostCounters::total_allocated_bytes`].
    pub total_mb: f64,
    /// See [`HostCounters::heap_bytes`].
    pub heap_mb: f64,
    /// Heap growth since the previous sample (negative after a collection).
    pub heap_delta_mb: f64,
    /// Real time between this sample and the previous one.
    pub secs_since_last_sample: f64,
    /// The raw counters the report was built from.
    pub counters: HostCounters,
}

impl TelemetryReport {
    /// The display lines, one per telemetry widget.
    pub fn lines(&self) -> Vec<String> {
        let c = &self.counters;
        vec![
            format!("FPS: {:.1}", self.fps),
            format!(
                "RAM: Managed {:.1} MB / Total {:.1} MB",
                self.managed_mb, self.total_mb
            ),
            format!(
                "GC: {:.1} MB (delta: {:.2} MB, {:.1}s)",
                self.heap_mb, self.heap_delta_mb, self.secs_since_last_sample
            ),
            format!("Objects: {}", c.object_count),
            format!(
                "Scene: {} | Time: {:.1}s | TS: {:.1}",
                c.scene_name, c.scene_time_secs, c.time_scale
            ),
            format!("Triangles: {}", optional_counter(c.triangles)),
            format!("Draw calls: {}", optional_counter(c.draw_calls)),
            format!("Audio channels playing sounds: {}", c.audio_channels),
            format!(
                "System info:\n- CPU: {}\n- Cores: {}\n- RAM: {}\n- GPU: {}\n- OS: {}",
                c.system.cpu,
                c.system.cores,
                c.system
                    .ram_mb
                    .map_or_else(|| "N/A".to_string(), |mb| format!("{} MB", mb)),
                c.system.gpu,
                c.system.os
            ),
        ]
    }
}

impl fmt::Display for TelemetryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines().join("\n"))
    }
}

fn optional_counter(value: Option<u64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

/// Counts frames and produces a [`TelemetryReport`] every `interval` seconds of
/// unscaled time.
#[derive(Debug, Clone)]
pub struct TelemetrySampler {
    interval: f64,
    frame_count: u32,
    timer: f64,
    last_heap_bytes: Option<u64>,
    last_sample_realtime: Option<f64>,
    latest: Option<TelemetryReport>,
}

impl TelemetrySampler {
    /// Creates a sampler. Non-positive intervals sample every frame.
    pub fn new(interval_secs: f32) -> Self {
        Self {
            interval: f64::from(interval_secs.max(0.0)),
            frame_count: 0,
            timer: 0.0,
            last_heap_bytes: None,
            last_sample_realtime: None,
            latest: None,
        }
    }

    /// Registers one frame of `unscaled_dt` seconds. Returns the new report
    /// when the interval elapsed on this frame.
    pub fn tick(
        &mut self,
        unscaled_dt: f32,
        source: &dyn TelemetrySource,
    ) -> Option<&TelemetryReport> {
        self.frame_count = self.frame_count.saturating_add(1);
        self.timer += f64::from(unscaled_dt.max(0.0));

        if self.timer < self.interval || self.timer <= 0.0 {
            return None;
        }

        let report = self.sample(source);
        log::trace!("Telemetry sample: {:.1} fps", report.fps);
        self.frame_count = 0;
        self.timer = 0.0;
        self.latest = Some(report);
        self.latest.as_ref()
    }

    fn sample(&mut self, source: &dyn TelemetrySource) -> TelemetryReport {
        let counters = source.counters();
        let fps = f64::from(self.frame_count) / self.timer;

        let heap_bytes = counters.heap_bytes;
        let previous_heap = self.last_heap_bytes.unwrap_or(heap_bytes);
        let heap_delta_mb = (heap_bytes as f64 - previous_heap as f64) / BYTES_PER_MB;
        let secs_since_last_sample = self
            .last_sample_realtime
            .map_or(0.0, |last| counters.realtime_secs - last);

        self.last_heap_bytes = Some(heap_bytes);
        self.last_sample_realtime = Some(counters.realtime_secs);

        TelemetryReport {
            fps,
            managed_mb: counters.managed_bytes as f64 / BYTES_PER_MB,
            total_mb: counters.total_allocated_bytes as f64 / BYTES_PER_MB,
            heap_mb: heap_bytes as f64 / BYTES_PER_MB,
            heap_delta_mb,
            secs_since_last_sample,
            counters,
        }
    }

    /// The most recent report, if any interval has elapsed yet.
    pub fn latest(&self) -> Option<&TelemetryReport> {
        self.latest.as_ref()
    }
}
