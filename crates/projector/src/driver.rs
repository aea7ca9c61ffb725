//! 投影驱动任务
//!
//! 订阅定位与航向两个单槽通道,任一变化即重算一次,向叠加层
//! 发出恰好一条 OverlayUpdate (线段或清除)。几何在本任务内
//! 完成,从不在回调线程上跑。

use std::sync::Arc;

use contracts::{epoch_seconds, GeoFix, HeadingEstimate, OverlayLine, OverlayUpdate, ScreenTransform};
use metrics::counter;
use tokio::sync::{mpsc, watch};
use tracing::{debug, trace};

use crate::raycast;

/// 投影任务收尾统计
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionStats {
    pub projected: u64,
    pub empty: u64,
}

/// 投影驱动
///
/// 始终使用两个通道各自的最新值;跨源不保证交错顺序。
pub struct ProjectionDriver {
    transform: Arc<dyn ScreenTransform>,
    max_fix_age_s: Option<f64>,
    fix_rx: watch::Receiver<Option<GeoFix>>,
    heading_rx: watch::Receiver<Option<HeadingEstimate>>,
    out: mpsc::Sender<OverlayUpdate>,
    // 初始无线段,避免开场或连续空结果时重复发 Clear
    cleared: bool,
    stats: ProjectionStats,
}

impl ProjectionDriver {
    pub fn new(
        transform: Arc<dyn ScreenTransform>,
        max_fix_age_s: Option<f64>,
        fix_rx: watch::Receiver<Option<GeoFix>>,
        heading_rx: watch::Receiver<Option<HeadingEstimate>>,
        out: mpsc::Sender<OverlayUpdate>,
    ) -> Self {
        Self {
            transform,
            max_fix_age_s,
            fix_rx,
            heading_rx,
            out,
            cleared: true,
            stats: ProjectionStats::default(),
        }
    }

    /// 驱动循环;两个上游都关闭或下游关闭时退出
    pub async fn run(mut self) -> ProjectionStats {
        debug!("projection driver started");

        loop {
            tokio::select! {
                changed = self.fix_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                changed = self.heading_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }

            if !self.recompute().await {
                break;
            }
        }

        debug!(
            projected = self.stats.projected,
            empty = self.stats.empty,
            "projection driver stopped"
        );
        self.stats
    }

    /// 重算一次;下游关闭返回 false
    async fn recompute(&mut self) -> bool {
        let fix = *self.fix_rx.borrow_and_update();
        let heading = *self.heading_rx.borrow_and_update();

        // 首次成功融合之前不投影,也无可清除
        let Some(heading) = heading else {
            return true;
        };
        let Some(fix) = fix else {
            return true;
        };

        if let Some(max_age) = self.max_fix_age_s {
            let age = fix.age_at(epoch_seconds());
            if age > max_age {
                trace!(age, max_age, "fix stale, clearing overlay");
                return self.emit_clear().await;
            }
        }

        let origin = self.transform.geo_to_screen(fix.point());
        let viewport = self.transform.viewport();

        match raycast::cast_ray(origin, heading.degrees, viewport) {
            Some(exit) => {
                let line = OverlayLine {
                    origin: fix.point(),
                    exit: self.transform.screen_to_geo(exit.point),
                    heading_deg: heading.degrees,
                    computed_at: epoch_seconds(),
                };
                self.stats.projected += 1;
                counter!("fieldnav_projections_total").increment(1);
                trace!(
                    heading = heading.degrees,
                    edge = exit.edge.as_str(),
                    "projection computed"
                );
                self.cleared = false;
                self.out.send(OverlayUpdate::Line(line)).await.is_ok()
            }
            None => {
                self.stats.empty += 1;
                counter!("fieldnav_projections_empty_total").increment(1);
                self.emit_clear().await
            }
        }
    }

    async fn emit_clear(&mut self) -> bool {
        if self.cleared {
            return true;
        }
        self.cleared = true;
        self.out.send(OverlayUpdate::Clear).await.is_ok()
    }
}
