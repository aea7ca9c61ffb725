//! Fusion Pipeline - 惯性源到航向估计
//!
//! 结构与摄取管线对称:源回调把样本送进有界队列,融合任务
//! 在另一端跑 OrientationFuser。队列满时丢最新样本,传感器流
//! 里单条样本不关键,下一条马上就到。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_channel::{Receiver, Sender, TrySendError};
use contracts::{FusionStrategy, HeadingEstimate, InertialSource, RawSample, SampleCallback};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace};

use crate::error::{FusionError, Result};
use crate::fuser::OrientationFuser;

/// 样本队列容量;传感器速率低,浅队列足够
const SAMPLE_QUEUE_CAPACITY: usize = 32;

/// 融合管线
pub struct FusionPipeline {
    source: Box<dyn InertialSource>,
    strategy: FusionStrategy,
    smoothing_alpha: Option<f64>,
    running: Arc<AtomicBool>,
    sample_tx: Mutex<Option<Sender<RawSample>>>,
    heading_rx: Option<watch::Receiver<Option<HeadingEstimate>>>,
    task: Mutex<Option<JoinHandle<FusionStats>>>,
}

/// 融合任务收尾统计
#[derive(Debug, Clone, Copy, Default)]
pub struct FusionStats {
    pub fused: u64,
    pub degenerate: u64,
}

impl FusionPipeline {
    pub fn new(
        source: Box<dyn InertialSource>,
        strategy: FusionStrategy,
        smoothing_alpha: Option<f64>,
    ) -> Self {
        Self {
            source,
            strategy,
            smoothing_alpha,
            running: Arc::new(AtomicBool::new(false)),
            sample_tx: Mutex::new(None),
            heading_rx: None,
            task: Mutex::new(None),
        }
    }

    /// 启动惯性源与融合任务
    ///
    /// 必须在 tokio 运行时内调用。重复调用幂等。
    #[instrument(name = "fusion_start", skip(self), fields(source = %self.source.name()))]
    pub fn start(&mut self) -> Result<()> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let (tx, rx) = async_channel::bounded(SAMPLE_QUEUE_CAPACITY);

        let fuser = OrientationFuser::new(self.strategy, self.smoothing_alpha);
        self.heading_rx = Some(fuser.subscribe());

        let handle = tokio::spawn(process_samples(rx, fuser));
        *self.task.lock().unwrap() = Some(handle);

        let callback = make_callback(tx.clone(), self.running.clone());
        if let Err(e) = self.source.start(callback) {
            self.running.store(false, Ordering::SeqCst);
            tx.close();
            return Err(FusionError::SourceBind(e));
        }

        *self.sample_tx.lock().unwrap() = Some(tx);
        info!(strategy = self.strategy.as_str(), "fusion pipeline started");
        Ok(())
    }

    /// 取出航向接收端;只能取一次
    pub fn take_heading_receiver(&mut self) -> Option<watch::Receiver<Option<HeadingEstimate>>> {
        self.heading_rx.take()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// 停止惯性源并关闭样本队列
    #[instrument(name = "fusion_stop", skip(self))]
    pub fn stop(&mut self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        self.source.stop();
        if let Some(tx) = self.sample_tx.lock().unwrap().take() {
            tx.close();
        }
        debug!("fusion pipeline stopped");
    }

    /// 停止并等待融合任务退出,返回收尾统计
    pub async fn shutdown(&mut self) -> FusionStats {
        self.stop();
        let handle = self.task.lock().unwrap().take();
        match handle {
            Some(handle) => handle.await.unwrap_or_default(),
            None => FusionStats::default(),
        }
    }
}

impl Drop for FusionPipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

fn make_callback(tx: Sender<RawSample>, running: Arc<AtomicBool>) -> SampleCallback {
    Arc::new(move |sample: RawSample| {
        if !running.load(Ordering::Relaxed) {
            return;
        }
        match tx.try_send(sample) {
            Ok(()) | Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(_)) => {
                trace!("sample dropped (queue full)");
            }
        }
    })
}

/// 融合任务:样本 -> 航向估计
async fn process_samples(rx: Receiver<RawSample>, mut fuser: OrientationFuser) -> FusionStats {
    debug!("fusion task started");

    while let Ok(sample) = rx.recv().await {
        fuser.push(sample);
    }

    let stats = FusionStats {
        fused: fuser.fused(),
        degenerate: fuser.degenerate(),
    };
    debug!(
        fused = stats.fused,
        degenerate = stats.degenerate,
        "fusion task stopped"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ContractError, SampleKind};
    use std::time::Duration;
    use tokio::time::timeout;

    /// 测试惯性源:start 时同步送入预置样本
    struct ScriptedSource {
        samples: Vec<RawSample>,
        running: AtomicBool,
    }

    impl ScriptedSource {
        fn new(samples: Vec<RawSample>) -> Self {
            Self {
                samples,
                running: AtomicBool::new(false),
            }
        }
    }

    impl InertialSource for ScriptedSource {
        fn name(&self) -> &str {
            "scripted"
        }

        fn start(&self, callback: SampleCallback) -> std::result::Result<(), ContractError> {
            self.running.store(true, Ordering::SeqCst);
            for sample in &self.samples {
                callback(*sample);
            }
            Ok(())
        }

        fn stop(&self) {
            self.running.store(false, Ordering::SeqCst);
        }

        fn is_running(&self) -> bool {
            self.running.load(Ordering::Relaxed)
        }
    }

    #[tokio::test]
    async fn test_pipeline_fuses_accel_mag_pair() {
        let source = ScriptedSource::new(vec![
            RawSample::new(SampleKind::Accelerometer, 0.0, 0.0, 9.81, 1.0),
            RawSample::new(SampleKind::Magnetometer, 0.0, 22.0, -40.0, 1.1),
        ]);
        let mut pipeline =
            FusionPipeline::new(Box::new(source), FusionStrategy::AccelMag, None);

        pipeline.start().unwrap();
        let mut rx = pipeline.take_heading_receiver().unwrap();

        let estimate = timeout(Duration::from_secs(2), async {
            loop {
                if let Some(estimate) = *rx.borrow_and_update() {
                    return estimate;
                }
                rx.changed().await.expect("heading channel closed");
            }
        })
        .await
        .expect("timed out waiting for heading");

        assert!((estimate.degrees - 0.0).abs() < 1e-6);

        let stats = pipeline.shutdown().await;
        assert_eq!(stats.fused, 1);
        assert!(!pipeline.is_running());
    }

    #[tokio::test]
    async fn test_take_heading_receiver_once() {
        let source = ScriptedSource::new(vec![]);
        let mut pipeline =
            FusionPipeline::new(Box::new(source), FusionStrategy::RotationVector, None);

        pipeline.start().unwrap();
        assert!(pipeline.take_heading_receiver().is_some());
        assert!(pipeline.take_heading_receiver().is_none());

        pipeline.shutdown().await;
    }
}
