//! Mock transport and inertial source
//!
//! Implements `SentenceTransport` and `InertialSource`, generating
//! simulated NMEA sentences and inertial samples. Used for testing and
//! development without a serial device attached.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use bytes::Bytes;
use contracts::{
    epoch_seconds, ByteChunk, ChunkCallback, ContractError, InertialSource, RawSample,
    SampleCallback, SampleKind, SentenceTransport, Vector3,
};
use tracing::{debug, trace};

/// Mock transport configuration
#[derive(Debug, Clone)]
pub struct MockTransportConfig {
    /// Sentence emission rate (Hz)
    pub rate_hz: f64,
    /// Logical channel carrying position sentences
    pub channel: u8,
}

impl Default for MockTransportConfig {
    fn default() -> Self {
        Self {
            rate_hz: 1.0,
            channel: 2,
        }
    }
}

/// 把十进制纬度格式化为 NMEA 的 ddmm.mmmm 加半球字母
fn format_latitude(latitude: f64) -> (String, char) {
    let hemi = if latitude < 0.0 { 'S' } else { 'N' };
    let abs = latitude.abs();
    let degrees = abs.trunc() as u32;
    let minutes = (abs - degrees as f64) * 60.0;
    (format!("{degrees:02}{minutes:07.4}"), hemi)
}

/// 把十进制经度格式化为 NMEA 的 dddmm.mmmm 加半球字母
fn format_longitude(longitude: f64) -> (String, char) {
    let hemi = if longitude < 0.0 { 'W' } else { 'E' };
    let abs = longitude.abs();
    let degrees = abs.trunc() as u32;
    let minutes = (abs - degrees as f64) * 60.0;
    (format!("{degrees:03}{minutes:07.4}"), hemi)
}

/// 构造一条 RMC 语句；每第 8 帧标记为无效定位
fn build_rmc(frame_id: u64) -> String {
    let latitude = 40.0 + (frame_id as f64 * 0.0001);
    let longitude = -74.0 + (frame_id as f64 * 0.0001);
    let (lat_field, lat_hemi) = format_latitude(latitude);
    let (lon_field, lon_hemi) = format_longitude(longitude);

    let status = if frame_id % 8 == 0 { 'V' } else { 'A' };

    let seconds_of_day = (epoch_seconds() as u64) % 86_400;
    let (hh, mm, ss) = (
        seconds_of_day / 3600,
        (seconds_of_day % 3600) / 60,
        seconds_of_day % 60,
    );

    format!(
        "$GPRMC,{hh:02}{mm:02}{ss:02}.00,{status},{lat_field},{lat_hemi},{lon_field},{lon_hemi},2.5,45.0,010170,,,A"
    )
}

/// Mock transport
///
/// Emits an RMC walk northeast from (40.0, -74.0) at the configured rate,
/// mimicking a receiver wired to channel 2. A status sentence lands on
/// channel 1 every tenth frame so consumers see multiplexed traffic.
pub struct MockTransport {
    config: MockTransportConfig,
    listening: Arc<AtomicBool>,
}

impl MockTransport {
    pub fn new(config: MockTransportConfig) -> Self {
        Self {
            config,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl SentenceTransport for MockTransport {
    fn name(&self) -> &str {
        "mock"
    }

    fn channel(&self) -> u8 {
        self.config.channel
    }

    fn start(&self, callback: ChunkCallback) -> Result<(), ContractError> {
        // Idempotent: if already running, don't start again
        if self.listening.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let channel = self.config.channel;
        let listening = self.listening.clone();
        let interval = Duration::from_secs_f64(1.0 / self.config.rate_hz.max(0.1));

        thread::spawn(move || {
            let mut frame_id: u64 = 0;

            debug!(channel, "mock transport started");

            while listening.load(Ordering::Relaxed) {
                frame_id += 1;

                let sentence = build_rmc(frame_id);
                callback(ByteChunk {
                    channel,
                    payload: Bytes::from(format!("{sentence}\r\n")),
                    timestamp: epoch_seconds(),
                });

                if frame_id % 10 == 0 {
                    callback(ByteChunk {
                        channel: 1,
                        payload: Bytes::from_static(b"$STATUS,ok\r\n"),
                        timestamp: epoch_seconds(),
                    });
                }

                trace!(frame_id, "mock sentence sent");

                thread::sleep(interval);
            }

            debug!("mock transport stopped");
        });

        Ok(())
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

/// Mock inertial source configuration
#[derive(Debug, Clone)]
pub struct MockInertialConfig {
    /// Sample emission rate (Hz)
    pub sample_rate_hz: f64,
    /// Heading at start (degrees, 0 = north)
    pub start_heading_deg: f64,
    /// Heading sweep rate (degrees per second, 0 = hold)
    pub sweep_dps: f64,
}

impl Default for MockInertialConfig {
    fn default() -> Self {
        Self {
            sample_rate_hz: 10.0,
            start_heading_deg: 0.0,
            sweep_dps: 0.0,
        }
    }
}

/// 根据目标方位角构造旋转矢量样本 (x, y, z 分量)
///
/// 取绕 z 轴 -heading 的半角表示，w 分量保持非负，
/// 消费方可以用 sqrt(1 - |v|^2) 恢复 w。
fn heading_to_rotation_vector(heading_deg: f64) -> Vector3 {
    let mut signed = heading_deg.rem_euclid(360.0);
    if signed > 180.0 {
        signed -= 360.0;
    }
    let half = signed.to_radians() / 2.0;
    Vector3::new(0.0, 0.0, -half.sin())
}

/// 设备平放、屏幕朝上时的重力矢量 (m/s^2)
fn flat_gravity() -> Vector3 {
    Vector3::new(0.0, 0.0, 9.81)
}

/// 根据目标方位角构造地磁矢量 (uT)
///
/// 水平分量 22 uT 指向磁北，垂直分量 -40 uT，
/// 与平放重力矢量联立可解出同一方位角。
fn heading_to_magnetic(heading_deg: f64) -> Vector3 {
    let rad = heading_deg.to_radians();
    Vector3::new(-22.0 * rad.sin(), 22.0 * rad.cos(), -40.0)
}

/// Mock inertial source
///
/// Sweeps the heading from `start_heading_deg` at `sweep_dps` and emits a
/// consistent rotation vector, accelerometer and magnetometer triple each
/// tick, so either fusion strategy resolves the same heading.
pub struct MockInertialSource {
    config: MockInertialConfig,
    listening: Arc<AtomicBool>,
}

impl MockInertialSource {
    pub fn new(config: MockInertialConfig) -> Self {
        Self {
            config,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(MockInertialConfig::default())
    }
}

impl InertialSource for MockInertialSource {
    fn name(&self) -> &str {
        "mock-inertial"
    }

    fn start(&self, callback: SampleCallback) -> Result<(), ContractError> {
        if self.listening.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let config = self.config.clone();
        let listening = self.listening.clone();
        let interval = Duration::from_secs_f64(1.0 / config.sample_rate_hz.max(0.1));

        thread::spawn(move || {
            let start_time = std::time::Instant::now();

            debug!(
                sample_rate_hz = config.sample_rate_hz,
                sweep_dps = config.sweep_dps,
                "mock inertial source started"
            );

            while listening.load(Ordering::Relaxed) {
                let elapsed = start_time.elapsed().as_secs_f64();
                let heading = config.start_heading_deg + config.sweep_dps * elapsed;
                let now = epoch_seconds();

                let rotation = heading_to_rotation_vector(heading);
                callback(RawSample {
                    kind: SampleKind::RotationVector,
                    vector: rotation,
                    timestamp: now,
                });

                let gravity = flat_gravity();
                callback(RawSample {
                    kind: SampleKind::Accelerometer,
                    vector: gravity,
                    timestamp: now,
                });

                let magnetic = heading_to_magnetic(heading);
                callback(RawSample {
                    kind: SampleKind::Magnetometer,
                    vector: magnetic,
                    timestamp: now,
                });

                trace!(heading, "mock sample triple sent");

                thread::sleep(interval);
            }

            debug!("mock inertial source stopped");
        });

        Ok(())
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}
