//! FixAggregator - 维护当前定位
//!
//! 只接受有效定位语句 (last-known-good 策略):无效语句丢弃,
//! 当前 GeoFix 保持不变。对外通过单槽 watch 通道暴露,读者
//! 永远看到完整的旧值或完整的新值。

use contracts::{epoch_seconds, GeoFix, Sentence};
use tokio::sync::watch;
use tracing::{debug, trace};

/// 定位聚合器
///
/// 唯一写者;每个管线实例独占一个,重启即全新状态 (无定位)。
pub struct FixAggregator {
    tx: watch::Sender<Option<GeoFix>>,
    accepted: u64,
    rejected: u64,
}

impl FixAggregator {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            tx,
            accepted: 0,
            rejected: 0,
        }
    }

    /// 订阅当前定位;首次有效语句之前读到 None
    pub fn subscribe(&self) -> watch::Receiver<Option<GeoFix>> {
        self.tx.subscribe()
    }

    /// 喂入一条语句,返回是否被接受
    pub fn apply(&mut self, sentence: &Sentence) -> bool {
        if !sentence.is_valid_fix() {
            self.rejected += 1;
            trace!(kind = sentence.kind(), "rejected invalid fix sentence");
            return false;
        }

        // is_valid_fix 已保证坐标齐全
        let Some(point) = sentence.position() else {
            self.rejected += 1;
            return false;
        };

        let fix = GeoFix {
            latitude: point.latitude,
            longitude: point.longitude,
            speed_mps: sentence.speed_mps(),
            course_deg: sentence.course_deg(),
            utc_seconds: sentence.utc_seconds(),
            received_at: epoch_seconds(),
        };

        self.accepted += 1;
        debug!(
            latitude = fix.latitude,
            longitude = fix.longitude,
            kind = sentence.kind(),
            "fix updated"
        );
        self.tx.send_replace(Some(fix));
        true
    }

    /// 当前定位快照
    pub fn current(&self) -> Option<GeoFix> {
        *self.tx.borrow()
    }

    pub fn accepted(&self) -> u64 {
        self.accepted
    }

    pub fn rejected(&self) -> u64 {
        self.rejected
    }
}

impl Default for FixAggregator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{FixBody, SentenceBody};

    fn fix_sentence(valid: bool, latitude: f64, longitude: f64) -> Sentence {
        Sentence {
            talker: "GP".into(),
            body: SentenceBody::Fix(FixBody {
                valid,
                latitude,
                longitude,
            }),
        }
    }

    #[test]
    fn test_no_fix_before_first_valid_sentence() {
        let aggregator = FixAggregator::new();
        assert!(aggregator.current().is_none());
    }

    #[test]
    fn test_valid_sentence_updates_fix() {
        let mut aggregator = FixAggregator::new();
        assert!(aggregator.apply(&fix_sentence(true, 40.0, -73.0)));

        let fix = aggregator.current().expect("fix should be present");
        assert_eq!(fix.latitude, 40.0);
        assert_eq!(fix.longitude, -73.0);
        assert_eq!(aggregator.accepted(), 1);
    }

    #[test]
    fn test_invalid_sentence_keeps_last_known_good() {
        let mut aggregator = FixAggregator::new();
        aggregator.apply(&fix_sentence(true, 40.0, -73.0));
        assert!(!aggregator.apply(&fix_sentence(false, 41.0, -74.0)));

        let fix = aggregator.current().unwrap();
        assert_eq!(
            (fix.latitude, fix.longitude),
            (40.0, -73.0),
            "invalid sentence must not move the fix"
        );
        assert_eq!(aggregator.rejected(), 1);
    }

    #[test]
    fn test_last_good_wins_among_mixed_sentences() {
        let mut aggregator = FixAggregator::new();
        aggregator.apply(&fix_sentence(true, 40.0, -73.0));
        aggregator.apply(&fix_sentence(false, 41.0, -74.0));
        aggregator.apply(&fix_sentence(true, 40.5, -73.5));

        let fix = aggregator.current().unwrap();
        assert_eq!((fix.latitude, fix.longitude), (40.5, -73.5));
    }

    #[test]
    fn test_subscribers_observe_replacement() {
        let mut aggregator = FixAggregator::new();
        let rx = aggregator.subscribe();
        assert!(rx.borrow().is_none());

        aggregator.apply(&fix_sentence(true, 40.0, -73.0));
        assert_eq!(rx.borrow().unwrap().latitude, 40.0);
    }
}
