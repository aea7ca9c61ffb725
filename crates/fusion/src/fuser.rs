//! OrientationFuser - 样本到航向估计
//!
//! 两种可互换策略:旋转向量直转,或加速度计 + 磁力计各留
//! 最新一条、任一侧到新样本即重算。退化输入整刻跳过,上一次
//! 估计保持不变。

use contracts::{FusionStrategy, HeadingEstimate, RawSample, SampleKind, Vector3};
use metrics::{counter, gauge};
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::matrix;

/// 航向融合器
///
/// 唯一写者,对外通过单槽 watch 暴露估计;首次成功融合之前
/// 读者看到 None,下游不得投影。
pub struct OrientationFuser {
    strategy: FusionStrategy,
    smoothing_alpha: Option<f64>,
    smoother: matrix::CircularSmoother,
    latest_accel: Option<Vector3>,
    latest_mag: Option<Vector3>,
    tx: watch::Sender<Option<HeadingEstimate>>,
    fused: u64,
    degenerate: u64,
}

impl OrientationFuser {
    pub fn new(strategy: FusionStrategy, smoothing_alpha: Option<f64>) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            strategy,
            smoothing_alpha,
            smoother: matrix::CircularSmoother::new(),
            latest_accel: None,
            latest_mag: None,
            tx,
            fused: 0,
            degenerate: 0,
        }
    }

    pub fn strategy(&self) -> FusionStrategy {
        self.strategy
    }

    /// 订阅航向估计
    pub fn subscribe(&self) -> watch::Receiver<Option<HeadingEstimate>> {
        self.tx.subscribe()
    }

    /// 喂入一条样本,融合成功返回新估计
    pub fn push(&mut self, sample: RawSample) -> Option<HeadingEstimate> {
        let raw_degrees = match self.strategy {
            FusionStrategy::RotationVector => self.fuse_rotation_vector(&sample)?,
            FusionStrategy::AccelMag => self.fuse_accel_mag(&sample)?,
        };

        let degrees = match self.smoothing_alpha {
            Some(alpha) => self.smoother.update(raw_degrees, alpha),
            None => raw_degrees,
        };

        let estimate = HeadingEstimate {
            degrees,
            strategy: self.strategy,
            timestamp: sample.timestamp,
        };

        self.fused += 1;
        counter!("fieldnav_fusions_total").increment(1);
        gauge!("fieldnav_heading_degrees").set(degrees);
        trace!(degrees, strategy = self.strategy.as_str(), "heading fused");

        self.tx.send_replace(Some(estimate));
        Some(estimate)
    }

    fn fuse_rotation_vector(&mut self, sample: &RawSample) -> Option<f64> {
        if sample.kind != SampleKind::RotationVector {
            trace!(kind = sample.kind.as_str(), "ignoring sample for strategy");
            return None;
        }
        let r = matrix::rotation_matrix_from_vector(sample.vector);
        Some(matrix::azimuth_degrees(&r))
    }

    fn fuse_accel_mag(&mut self, sample: &RawSample) -> Option<f64> {
        match sample.kind {
            SampleKind::Accelerometer => self.latest_accel = Some(sample.vector),
            SampleKind::Magnetometer => self.latest_mag = Some(sample.vector),
            SampleKind::RotationVector => {
                trace!("ignoring rotation-vector sample for accel_mag strategy");
                return None;
            }
        }

        let (gravity, geomagnetic) = (self.latest_accel?, self.latest_mag?);
        match matrix::rotation_matrix_from_gravity_mag(gravity, geomagnetic) {
            Some(r) => Some(matrix::azimuth_degrees(&r)),
            None => {
                self.degenerate += 1;
                counter!("fieldnav_fusions_degenerate_total").increment(1);
                debug!("degenerate gravity/geomagnetic pair, keeping previous heading");
                None
            }
        }
    }

    /// 当前估计快照
    pub fn current(&self) -> Option<HeadingEstimate> {
        *self.tx.borrow()
    }

    pub fn fused(&self) -> u64 {
        self.fused
    }

    pub fn degenerate(&self) -> u64 {
        self.degenerate
    }
}
