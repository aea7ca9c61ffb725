//! 姿态矩阵与航向角计算
//!
//! 与设备传感器框架同一套约定:世界坐标系 East-North-Up,
//! 旋转矩阵把设备系向量变换到世界系,航向角取
//! `atan2(R[0][1], R[1][1])`,0 = 正北,顺时针增大。

use contracts::Vector3;
use nalgebra::{Matrix3, Vector3 as NaVector3};

/// H 向量范数下限,低于它判定重力与地磁近平行 (自由落体/磁干扰)
pub const DEGENERACY_THRESHOLD: f64 = 0.1;

fn to_na(v: Vector3) -> NaVector3<f64> {
    NaVector3::new(v.x, v.y, v.z)
}

/// 旋转向量 (单位四元数向量部) 转旋转矩阵
///
/// 标量部不在线上传输,按单位范数约束补算;向量部范数超过 1
/// 时视为噪声取 w = 0。
pub fn rotation_matrix_from_vector(rv: Vector3) -> Matrix3<f64> {
    let (x, y, z) = (rv.x, rv.y, rv.z);
    let norm_sq = x * x + y * y + z * z;
    let w = if norm_sq < 1.0 {
        (1.0 - norm_sq).sqrt()
    } else {
        0.0
    };

    let (xx, yy, zz) = (2.0 * x * x, 2.0 * y * y, 2.0 * z * z);
    let (xy, xz, yz) = (2.0 * x * y, 2.0 * x * z, 2.0 * y * z);
    let (wx, wy, wz) = (2.0 * w * x, 2.0 * w * y, 2.0 * w * z);

    Matrix3::new(
        1.0 - yy - zz,
        xy - wz,
        xz + wy,
        xy + wz,
        1.0 - xx - zz,
        yz - wx,
        xz - wy,
        yz + wx,
        1.0 - xx - yy,
    )
}

/// 重力 + 地磁推导旋转矩阵
///
/// H = 地磁 × 重力;‖H‖ 低于阈值说明两向量近平行,几何上
/// 推不出航向,返回 None 让调用方保留上一次估计。
pub fn rotation_matrix_from_gravity_mag(
    gravity: Vector3,
    geomagnetic: Vector3,
) -> Option<Matrix3<f64>> {
    let a = to_na(gravity);
    let e = to_na(geomagnetic);

    let h = e.cross(&a);
    if h.norm() < DEGENERACY_THRESHOLD {
        return None;
    }

    let h = h.normalize();
    let a = a.normalize();
    let m = a.cross(&h);

    Some(Matrix3::from_rows(&[
        h.transpose(),
        m.transpose(),
        a.transpose(),
    ]))
}

/// 旋转矩阵取航向角 (度)
pub fn azimuth_degrees(r: &Matrix3<f64>) -> f64 {
    normalize_degrees(r[(0, 1)].atan2(r[(1, 1)]).to_degrees())
}

/// 角度归一化到 [0, 360)
pub fn normalize_degrees(degrees: f64) -> f64 {
    degrees.rem_euclid(360.0)
}

/// 圆周 EWMA 平滑
///
/// 普通 EWMA 在 0/360 接缝处会穿过圆心,这里在单位圆上对
/// sin/cos 分量分别平滑再取角度。
#[derive(Debug, Default)]
pub struct CircularSmoother {
    sin_acc: f64,
    cos_acc: f64,
    seeded: bool,
}

impl CircularSmoother {
    pub fn new() -> Self {
        Self::default()
    }

    /// 喂入新角度,返回平滑后角度 (度)
    pub fn update(&mut self, degrees: f64, alpha: f64) -> f64 {
        let radians = degrees.to_radians();
        if !self.seeded {
            self.sin_acc = radians.sin();
            self.cos_acc = radians.cos();
            self.seeded = true;
        } else {
            self.sin_acc = alpha * radians.sin() + (1.0 - alpha) * self.sin_acc;
            self.cos_acc = alpha * radians.cos() + (1.0 - alpha) * self.cos_acc;
        }
        normalize_degrees(self.sin_acc.atan2(self.cos_acc).to_degrees())
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
