//! 平面局部切面变换
//!
//! 演示/测试用的 ScreenTransform 实现:以视口中心为切点,
//! 纬度 1 度 ≈ 111,320 米,经度按中心纬度余弦缩放。只要求
//! 视口范围内往返一致,不承诺任何大地基准。

use contracts::{GeoPoint, ScreenPoint, ScreenTransform, Viewport, ViewportConfig};

/// 每纬度度数对应的米数 (球面近似)
pub const METERS_PER_DEGREE: f64 = 111_320.0;

/// 平面变换
#[derive(Debug, Clone)]
pub struct PlanarTransform {
    viewport: Viewport,
    center: GeoPoint,
    pixels_per_meter: f64,
}

impl PlanarTransform {
    pub fn new(viewport: Viewport, center: GeoPoint, pixels_per_meter: f64) -> Self {
        Self {
            viewport,
            center,
            pixels_per_meter,
        }
    }

    /// 从蓝图视口配置构建
    pub fn from_config(config: &ViewportConfig) -> Self {
        Self::new(
            Viewport::new(config.width, config.height),
            GeoPoint::new(config.center_latitude, config.center_longitude),
            config.pixels_per_meter,
        )
    }

    fn meters_per_lon_degree(&self) -> f64 {
        METERS_PER_DEGREE * self.center.latitude.to_radians().cos()
    }
}

impl ScreenTransform for PlanarTransform {
    fn geo_to_screen(&self, point: GeoPoint) -> ScreenPoint {
        let east_m = (point.longitude - self.center.longitude) * self.meters_per_lon_degree();
        let north_m = (point.latitude - self.center.latitude) * METERS_PER_DEGREE;

        let c = self.viewport.center();
        // 屏幕 y 向下,北为负方向
        ScreenPoint::new(
            c.x + east_m * self.pixels_per_meter,
            c.y - north_m * self.pixels_per_meter,
        )
    }

    fn screen_to_geo(&self, point: ScreenPoint) -> GeoPoint {
        let c = self.viewport.center();
        let east_m = (point.x - c.x) / self.pixels_per_meter;
        let north_m = (c.y - point.y) / self.pixels_per_meter;

        GeoPoint::new(
            self.center.latitude + north_m / METERS_PER_DEGREE,
            self.center.longitude + east_m / self.meters_per_lon_degree(),
        )
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn transform() -> PlanarTransform {
        PlanarTransform::new(
            Viewport::new(200.0, 100.0),
            GeoPoint::new(40.0, -74.0),
            2.0,
        )
    }

    #[test]
    fn test_center_maps_to_viewport_center() {
        let t = transform();
        let p = t.geo_to_screen(GeoPoint::new(40.0, -74.0));
        assert_relative_eq!(p.x, 100.0);
        assert_relative_eq!(p.y, 50.0);
    }

    #[test]
    fn test_north_decreases_y() {
        let t = transform();
        let p = t.geo_to_screen(GeoPoint::new(40.0001, -74.0));
        assert_relative_eq!(p.x, 100.0);
        assert!(p.y < 50.0, "north of center must map above center");
    }

    #[test]
    fn test_east_increases_x_scaled_by_latitude() {
        let t = transform();
        let p = t.geo_to_screen(GeoPoint::new(40.0, -73.9999));
        let expected_m = 0.0001 * METERS_PER_DEGREE * (40.0_f64).to_radians().cos();
        assert_relative_eq!(p.x, 100.0 + expected_m * 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_round_trip_consistency() {
        let t = transform();
        let original = GeoPoint::new(40.0003, -74.0004);
        let back = t.screen_to_geo(t.geo_to_screen(original));
        assert_relative_eq!(back.latitude, original.latitude, epsilon = 1e-12);
        assert_relative_eq!(back.longitude, original.longitude, epsilon = 1e-12);
    }
}
