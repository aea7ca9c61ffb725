//! 导航管线指标收集模块
//!
//! `record_*` 走 metrics facade (Prometheus 导出);
//! `NavMetricsAggregator` 在内存里聚合,收尾时打摘要。

use metrics::counter;

/// 记录一次投影结果 (按状态分标签)
pub fn record_projection(exited: bool) {
    let status = if exited { "line" } else { "empty" };
    counter!(
        "fieldnav_projections_by_status_total",
        "status" => status.to_string()
    )
    .increment(1);
}

/// 导航指标聚合器
///
/// 在内存中聚合运行统计,便于收尾摘要输出。
#[derive(Debug, Clone, Default)]
pub struct NavMetricsAggregator {
    /// 接受的定位数
    pub fixes_accepted: u64,

    /// 被拒的定位数
    pub fixes_rejected: u64,

    /// 丢弃的行数
    pub lines_dropped: u64,

    /// 融合次数
    pub fusions: u64,

    /// 退化跳过的融合刻数
    pub fusions_degenerate: u64,

    /// 投出线段的次数
    pub projections: u64,

    /// 空投影 (清除) 次数
    pub projections_empty: u64,

    /// 叠加层更新总数
    pub overlay_updates: u64,

    /// 航向角统计
    pub heading_stats: RunningStats,
}

impl NavMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一次融合航向
    pub fn push_heading(&mut self, degrees: f64) {
        self.fusions += 1;
        self.heading_stats.push(degrees);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        let total_fixes = self.fixes_accepted + self.fixes_rejected;
        MetricsSummary {
            fixes_accepted: self.fixes_accepted,
            fixes_rejected: self.fixes_rejected,
            reject_rate: percentage(self.fixes_rejected, total_fixes),
            lines_dropped: self.lines_dropped,
            fusions: self.fusions,
            fusions_degenerate: self.fusions_degenerate,
            degenerate_rate: percentage(
                self.fusions_degenerate,
                self.fusions + self.fusions_degenerate,
            ),
            projections: self.projections,
            projections_empty: self.projections_empty,
            overlay_updates: self.overlay_updates,
            heading_degrees: StatsSummary::from(&self.heading_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn percentage(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub fixes_accepted: u64,
    pub fixes_rejected: u64,
    pub reject_rate: f64,
    pub lines_dropped: u64,
    pub fusions: u64,
    pub fusions_degenerate: u64,
    pub degenerate_rate: f64,
    pub projections: u64,
    pub projections_empty: u64,
    pub overlay_updates: u64,
    pub heading_degrees: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Navigation Metrics Summary ===")?;
        writeln!(
            f,
            "Fixes: {} accepted, {} rejected ({:.2}%)",
            self.fixes_accepted, self.fixes_rejected, self.reject_rate
        )?;
        writeln!(f, "Lines dropped: {}", self.lines_dropped)?;
        writeln!(
            f,
            "Fusions: {} ok, {} degenerate ({:.2}%)",
            self.fusions, self.fusions_degenerate, self.degenerate_rate
        )?;
        writeln!(
            f,
            "Projections: {} lines, {} empty",
            self.projections, self.projections_empty
        )?;
        writeln!(f, "Overlay updates: {}", self.overlay_updates)?;
        writeln!(f, "Heading (deg): {}", self.heading_degrees)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count(),
            min: stats.min(),
            max: stats.max(),
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            self.m2 += delta * (value - self.mean);
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_stats() {
        let mut stats = RunningStats::default();

        for value in [1.0, 2.0, 3.0, 4.0, 5.0] {
            stats.push(value);
        }

        assert_eq!(stats.count(), 5);
        assert!((stats.mean() - 3.0).abs() < 1e-10);
        assert!((stats.min() - 1.0).abs() < 1e-10);
        assert!((stats.max() - 5.0).abs() < 1e-10);
        assert!((stats.variance() - 2.5).abs() < 1e-10);
    }

    #[test]
    fn test_aggregator_summary_rates() {
        let mut aggregator = NavMetricsAggregator::new();
        aggregator.fixes_accepted = 95;
        aggregator.fixes_rejected = 5;
        aggregator.push_heading(10.0);
        aggregator.push_heading(20.0);
        aggregator.fusions_degenerate = 2;

        let summary = aggregator.summary();
        assert!((summary.reject_rate - 5.0).abs() < 1e-9);
        assert_eq!(summary.fusions, 2);
        assert!((summary.degenerate_rate - 50.0).abs() < 1e-9);
        assert_eq!(summary.heading_degrees.count, 2);
    }

    #[test]
    fn test_summary_display() {
        let mut aggregator = NavMetricsAggregator::new();
        aggregator.fixes_accepted = 100;
        aggregator.fixes_rejected = 5;

        let output = format!("{}", aggregator.summary());
        assert!(output.contains("100 accepted"));
        assert!(output.contains("Heading (deg): N/A"));
    }

    #[test]
    fn test_empty_aggregator_rates_are_zero() {
        let summary = NavMetricsAggregator::new().summary();
        assert_eq!(summary.reject_rate, 0.0);
        assert_eq!(summary.degenerate_rate, 0.0);
    }
}
