//! Ingestion Pipeline main entry
//!
//! 把传输回调接到有界块队列,处理任务在队列另一端完成
//! 切行、解码与定位聚合。回调侧只做有界非阻塞工作。

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_channel::{Receiver, Sender, TrySendError};
use contracts::{ByteChunk, ChunkCallback, GeoFix, SentenceTransport};
use metrics::counter;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, trace, warn};

use crate::aggregator::FixAggregator;
use crate::config::{BackpressureConfig, DropPolicy, IngestionMetrics};
use crate::decode::decode_sentence;
use crate::error::{IngestionError, Result};
use crate::framer::LineFramer;

/// Ingestion Pipeline
///
/// 独占持有传输连接;生命周期与上层管线一致,stop 后重建
/// 即全新状态 (定位回到 None)。
pub struct IngestionPipeline {
    transport: Box<dyn SentenceTransport>,
    config: BackpressureConfig,
    metrics: Arc<IngestionMetrics>,
    listening: Arc<AtomicBool>,
    chunk_tx: Mutex<Option<Sender<ByteChunk>>>,
    fix_rx: Option<watch::Receiver<Option<GeoFix>>>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl IngestionPipeline {
    pub fn new(transport: Box<dyn SentenceTransport>, config: BackpressureConfig) -> Self {
        Self {
            transport,
            config,
            metrics: Arc::new(IngestionMetrics::new()),
            listening: Arc::new(AtomicBool::new(false)),
            chunk_tx: Mutex::new(None),
            fix_rx: None,
            task: Mutex::new(None),
        }
    }

    /// 启动传输与处理任务
    ///
    /// 必须在 tokio 运行时内调用。重复调用幂等。
    ///
    /// # Errors
    /// 仅传输绑定失败上抛;启动后的坏数据全部就地吸收。
    #[instrument(name = "ingestion_start", skip(self), fields(transport = %self.transport.name()))]
    pub fn start(&mut self) -> Result<()> {
        if self.listening.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let (tx, rx) = async_channel::bounded(self.config.channel_capacity);

        let aggregator = FixAggregator::new();
        self.fix_rx = Some(aggregator.subscribe());

        let handle = tokio::spawn(process_chunks(rx.clone(), aggregator, self.metrics.clone()));
        *self.task.lock().unwrap() = Some(handle);

        let callback = self.make_callback(tx.clone(), rx);
        if let Err(e) = self.transport.start(callback) {
            self.listening.store(false, Ordering::SeqCst);
            tx.close();
            return Err(IngestionError::TransportBind(e));
        }

        *self.chunk_tx.lock().unwrap() = Some(tx);
        info!(
            channel = self.transport.channel(),
            capacity = self.config.channel_capacity,
            "ingestion pipeline started"
        );
        Ok(())
    }

    /// 构造传输回调:过滤通道、计数、有界入队
    fn make_callback(&self, tx: Sender<ByteChunk>, rx: Receiver<ByteChunk>) -> ChunkCallback {
        let wanted = self.transport.channel();
        let listening = self.listening.clone();
        let metrics = self.metrics.clone();
        let drop_policy = self.config.drop_policy;

        Arc::new(move |chunk: ByteChunk| {
            if !listening.load(Ordering::Relaxed) {
                return;
            }
            if chunk.channel != wanted {
                trace!(channel = chunk.channel, "ignoring chunk for other channel");
                return;
            }

            metrics.record_chunk();
            counter!("fieldnav_chunks_total").increment(1);

            match tx.try_send(chunk) {
                Ok(()) => {}
                Err(TrySendError::Full(chunk)) => {
                    metrics.record_chunk_dropped();
                    match drop_policy {
                        DropPolicy::DropNewest => {
                            trace!("chunk dropped (queue full)");
                        }
                        DropPolicy::DropOldest => {
                            let _ = rx.try_recv();
                            if tx.try_send(chunk).is_err() {
                                trace!("chunk dropped (queue still full)");
                            }
                        }
                    }
                }
                Err(TrySendError::Closed(_)) => {
                    warn!("chunk channel closed while transport still delivering");
                }
            }
        })
    }

    /// 取出定位接收端;只能取一次
    pub fn take_fix_receiver(&mut self) -> Option<watch::Receiver<Option<GeoFix>>> {
        self.fix_rx.take()
    }

    /// Get metrics reference
    pub fn metrics(&self) -> Arc<IngestionMetrics> {
        self.metrics.clone()
    }

    /// 传输侧是否已报死 (连接丢失对数据流致命,不自动重连)
    pub fn transport_fault(&self) -> Option<String> {
        self.transport.fault()
    }

    pub fn is_running(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }

    /// 停止传输并关闭块队列;排队数据直接丢弃
    #[instrument(name = "ingestion_stop", skip(self))]
    pub fn stop(&mut self) {
        if !self.listening.swap(false, Ordering::SeqCst) {
            return;
        }

        self.transport.stop();
        if let Some(tx) = self.chunk_tx.lock().unwrap().take() {
            tx.close();
        }
        debug!("ingestion pipeline stopped");
    }

    /// 停止并等待处理任务退出
    pub async fn shutdown(&mut self) {
        self.stop();
        let handle = self.task.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

impl Drop for IngestionPipeline {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 处理任务:块 -> 行 -> 语句 -> 定位
async fn process_chunks(
    rx: Receiver<ByteChunk>,
    mut aggregator: FixAggregator,
    metrics: Arc<IngestionMetrics>,
) {
    let mut framer = LineFramer::new();

    debug!("ingestion processing task started");

    while let Ok(chunk) = rx.recv().await {
        metrics.update_queue_len(rx.len());

        for line in framer.push(&chunk.payload) {
            match decode_sentence(&line) {
                Some(sentence) => {
                    if aggregator.apply(&sentence) {
                        metrics.record_fix_accepted();
                        counter!("fieldnav_fixes_accepted_total").increment(1);
                    } else {
                        metrics.record_fix_rejected();
                        counter!("fieldnav_fixes_rejected_total").increment(1);
                    }
                }
                None => {
                    metrics.record_line_dropped();
                    counter!("fieldnav_lines_dropped_total").increment(1);
                    debug!(line = %line, "dropped undecodable line");
                }
            }
        }
    }

    debug!(
        accepted = aggregator.accepted(),
        rejected = aggregator.rejected(),
        "ingestion processing task stopped"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use contracts::{epoch_seconds, ContractError};
    use std::time::Duration;
    use tokio::time::timeout;

    /// 测试传输:start 时立刻把预置负载逐块送入回调
    struct ScriptedTransport {
        chunks: Vec<(u8, &'static [u8])>,
        listening: AtomicBool,
    }

    impl ScriptedTransport {
        fn new(chunks: Vec<(u8, &'static [u8])>) -> Self {
            Self {
                chunks,
                listening: AtomicBool::new(false),
            }
        }
    }

    impl SentenceTransport for ScriptedTransport {
        fn name(&self) -> &str {
            "scripted"
        }

        fn channel(&self) -> u8 {
            2
        }

        fn start(&self, callback: ChunkCallback) -> std::result::Result<(), ContractError> {
            self.listening.store(true, Ordering::SeqCst);
            for (channel, payload) in &self.chunks {
                callback(ByteChunk {
                    channel: *channel,
                    payload: Bytes::from_static(payload),
                    timestamp: epoch_seconds(),
                });
            }
            Ok(())
        }

        fn stop(&self) {
            self.listening.store(false, Ordering::SeqCst);
        }

        fn is_running(&self) -> bool {
            self.listening.load(Ordering::Relaxed)
        }
    }

    async fn wait_for_fix(rx: &mut watch::Receiver<Option<GeoFix>>) -> GeoFix {
        timeout(Duration::from_secs(2), async {
            loop {
                if let Some(fix) = *rx.borrow_and_update() {
                    return fix;
                }
                rx.changed().await.expect("fix channel closed");
            }
        })
        .await
        .expect("timed out waiting for fix")
    }

    #[tokio::test]
    async fn test_pipeline_end_to_end_last_good_policy() {
        let transport = ScriptedTransport::new(vec![
            (2, b"$GPFIX,valid,40.0,-73.0\r\n" as &[u8]),
            (2, b"$GPFIX,invalid,41.0,-74.0\r\n"),
            (2, b"$GPFIX,valid,40.5,-73.5\r\n"),
        ]);
        let mut pipeline =
            IngestionPipeline::new(Box::new(transport), BackpressureConfig::default());

        pipeline.start().unwrap();
        let mut rx = pipeline.take_fix_receiver().unwrap();

        // 等最后一组被消化
        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        let fix = loop {
            let fix = wait_for_fix(&mut rx).await;
            if fix.latitude == 40.5 || tokio::time::Instant::now() > deadline {
                break fix;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        };

        assert_eq!((fix.latitude, fix.longitude), (40.5, -73.5));

        let snap = pipeline.metrics().snapshot();
        assert_eq!(snap.fixes_accepted, 2);
        assert_eq!(snap.fixes_rejected, 1);

        pipeline.shutdown().await;
        assert!(!pipeline.is_running());
    }

    #[tokio::test]
    async fn test_pipeline_filters_other_channels() {
        let transport = ScriptedTransport::new(vec![
            (1, b"$GPFIX,valid,10.0,10.0\r\n" as &[u8]),
            (2, b"$GPFIX,valid,40.0,-73.0\r\n"),
        ]);
        let mut pipeline =
            IngestionPipeline::new(Box::new(transport), BackpressureConfig::default());

        pipeline.start().unwrap();
        let mut rx = pipeline.take_fix_receiver().unwrap();

        let fix = wait_for_fix(&mut rx).await;
        assert_eq!(fix.latitude, 40.0, "channel 1 traffic must be ignored");
        assert_eq!(pipeline.metrics().snapshot().chunks_received, 1);

        pipeline.shutdown().await;
    }

    #[tokio::test]
    async fn test_corrupt_lines_never_stop_the_stream() {
        let transport = ScriptedTransport::new(vec![
            (2, b"\xff\xfegarbage\r\nnot-a-sentence\r\n" as &[u8]),
            (2, b"$GPVTG,unknown,type\r\n"),
            (2, b"$GPFIX,valid,40.0,-73.0\r\n"),
        ]);
        let mut pipeline =
            IngestionPipeline::new(Box::new(transport), BackpressureConfig::default());

        pipeline.start().unwrap();
        let mut rx = pipeline.take_fix_receiver().unwrap();

        let fix = wait_for_fix(&mut rx).await;
        assert_eq!(fix.latitude, 40.0);
        assert!(pipeline.metrics().snapshot().lines_dropped >= 2);

        pipeline.shutdown().await;
    }

    #[tokio::test]
    async fn test_take_fix_receiver_once() {
        let transport = ScriptedTransport::new(vec![]);
        let mut pipeline =
            IngestionPipeline::new(Box::new(transport), BackpressureConfig::default());

        pipeline.start().unwrap();
        assert!(pipeline.take_fix_receiver().is_some());
        assert!(pipeline.take_fix_receiver().is_none());

        pipeline.shutdown().await;
    }
}
