//! 视口射线投射
//!
//! 屏幕坐标 y 向下;导航方位角 0° = 上/北,顺时针增大。
//! 四条边按固定绕序枚举:上、右、下、左。

use contracts::{ScreenPoint, Viewport};

/// 射线与边近平行的判定阈值
pub const PARALLEL_EPSILON: f64 = 1e-6;

/// 视口边界
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

impl Edge {
    /// 指标/日志标签
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }
}

/// 射线出口点
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExitPoint {
    pub point: ScreenPoint,
    pub edge: Edge,
    pub distance: f64,
}

/// 方位角转屏幕方向向量
///
/// 0° → (0,-1), 90° → (1,0), 180° → (0,1), 270° → (-1,0)。
pub fn bearing_to_screen_vector(bearing_deg: f64) -> (f64, f64) {
    let radians = bearing_deg.to_radians();
    (radians.sin(), -radians.cos())
}

/// 视口四条边,角点对,绕序固定
fn edges(viewport: Viewport) -> [(Edge, ScreenPoint, ScreenPoint); 4] {
    let (w, h) = (viewport.width, viewport.height);
    [
        (Edge::Top, ScreenPoint::new(0.0, 0.0), ScreenPoint::new(w, 0.0)),
        (Edge::Right, ScreenPoint::new(w, 0.0), ScreenPoint::new(w, h)),
        (Edge::Bottom, ScreenPoint::new(w, h), ScreenPoint::new(0.0, h)),
        (Edge::Left, ScreenPoint::new(0.0, h), ScreenPoint::new(0.0, 0.0)),
    ]
}

/// 射线-线段求交 (2D 叉积参数化)
///
/// 返回 (t1, t2):t1 为射线参数,t2 为线段参数。行列式过小
/// 说明近平行,无交点。
fn ray_segment_intersection(
    origin: ScreenPoint,
    direction: (f64, f64),
    a: ScreenPoint,
    b: ScreenPoint,
) -> Option<(f64, f64)> {
    let (dx, dy) = direction;
    let (ex, ey) = (b.x - a.x, b.y - a.y);

    let det = dx * ey - dy * ex;
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }

    let (ox, oy) = (a.x - origin.x, a.y - origin.y);
    let t1 = (ox * ey - oy * ex) / det;
    let t2 = (ox * dy - oy * dx) / -det;

    if t1 >= 0.0 && (0.0..=1.0).contains(&t2) {
        Some((t1, t2))
    } else {
        None
    }
}

/// 从视口内一点沿方位角投射,返回最近的边界出口
///
/// 取欧氏距离最近的有效交点;并列 (恰好打在角点上) 时按枚举
/// 顺序取先到者。起点在矩形外或几何上无交时返回 None。
pub fn cast_ray(origin: ScreenPoint, bearing_deg: f64, viewport: Viewport) -> Option<ExitPoint> {
    if !viewport.contains(origin) {
        return None;
    }

    let direction = bearing_to_screen_vector(bearing_deg);

    let mut nearest: Option<ExitPoint> = None;
    for (edge, a, b) in edges(viewport) {
        let Some((t1, _)) = ray_segment_intersection(origin, direction, a, b) else {
            continue;
        };

        let point = ScreenPoint::new(origin.x + t1 * direction.0, origin.y + t1 * direction.1);
        let distance = origin.distance_to(point);

        // 严格小于:并列时保留先枚举到的边
        if nearest.map_or(true, |best| distance < best.distance) {
            nearest = Some(ExitPoint {
                point,
                edge,
                distance,
            });
        }
    }

    nearest
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const VP: Viewport = Viewport {
        width: 100.0,
        height: 100.0,
    };

    fn center() -> ScreenPoint {
        VP.center()
    }

    #[test]
    fn test_bearing_convention_cardinal_directions() {
        let (dx, dy) = bearing_to_screen_vector(0.0);
        assert_relative_eq!(dx, 0.0, epsilon = 1e-12);
        assert_relative_eq!(dy, -1.0);

        let (dx, dy) = bearing_to_screen_vector(90.0);
        assert_relative_eq!(dx, 1.0);
        assert_relative_eq!(dy, 0.0, epsilon = 1e-12);

        let (dx, dy) = bearing_to_screen_vector(180.0);
        assert_relative_eq!(dx, 0.0, epsilon = 1e-12);
        assert_relative_eq!(dy, 1.0);

        let (dx, dy) = bearing_to_screen_vector(270.0);
        assert_relative_eq!(dx, -1.0);
        assert_relative_eq!(dy, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_north_exits_top_edge() {
        let exit = cast_ray(center(), 0.0, VP).expect("must intersect");
        assert_eq!(exit.edge, Edge::Top);
        assert_relative_eq!(exit.point.x, 50.0, epsilon = 1e-9);
        assert_relative_eq!(exit.point.y, 0.0, epsilon = 1e-9);
        assert_relative_eq!(exit.distance, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_east_exits_right_edge() {
        let exit = cast_ray(center(), 90.0, VP).expect("must intersect");
        assert_eq!(exit.edge, Edge::Right);
        assert_relative_eq!(exit.point.x, 100.0, epsilon = 1e-9);
        assert_relative_eq!(exit.point.y, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_south_exits_bottom_edge() {
        let exit = cast_ray(center(), 180.0, VP).expect("must intersect");
        assert_eq!(exit.edge, Edge::Bottom);
        assert_relative_eq!(exit.point.y, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_west_exits_left_edge() {
        let exit = cast_ray(center(), 270.0, VP).expect("must intersect");
        assert_eq!(exit.edge, Edge::Left);
        assert_relative_eq!(exit.point.x, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_diagonal_exits_nearest_edge() {
        // 从左上区域往东北,上边比右边近
        let exit = cast_ray(ScreenPoint::new(20.0, 30.0), 45.0, VP).expect("must intersect");
        assert_eq!(exit.edge, Edge::Top);
        assert_relative_eq!(exit.point.x, 50.0, epsilon = 1e-9);
        assert_relative_eq!(exit.point.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_corner_tie_breaks_by_enumeration_order() {
        // 正好打在右上角:上边先枚举,赢下并列
        let exit = cast_ray(center(), 45.0, VP).expect("must intersect");
        assert_eq!(exit.edge, Edge::Top);
        assert_relative_eq!(exit.point.x, 100.0, epsilon = 1e-9);
        assert_relative_eq!(exit.point.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn test_origin_outside_viewport_no_intersection() {
        assert!(cast_ray(ScreenPoint::new(-10.0, 50.0), 90.0, VP).is_none());
        assert!(cast_ray(ScreenPoint::new(50.0, 200.0), 0.0, VP).is_none());
    }

    #[test]
    fn test_origin_on_boundary_still_projects() {
        let exit = cast_ray(ScreenPoint::new(0.0, 50.0), 90.0, VP).expect("must intersect");
        assert_eq!(exit.edge, Edge::Right);
        assert_relative_eq!(exit.distance, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn test_non_cardinal_bearing_geometry() {
        // tan(30°) ≈ 0.5774:往上走 50,往右偏 50·tan(30°)
        let exit = cast_ray(center(), 30.0, VP).expect("must intersect");
        assert_eq!(exit.edge, Edge::Top);
        assert_relative_eq!(exit.point.x, 50.0 + 50.0 * (30.0_f64).to_radians().tan(), epsilon = 1e-9);
    }
}
