//! Replay Transport - 从录制日志回放 NMEA 语句
//!
//! 读取 `<时间戳>: <语句>` 格式的文本日志，按时间戳标签分组，
//! 逐组回放并在组间插入固定延迟。

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bytes::Bytes;
use contracts::{epoch_seconds, ByteChunk, ChunkCallback, ContractError, SentenceTransport};
use tracing::{debug, info, warn};

/// Replay 配置
#[derive(Debug, Clone)]
pub struct ReplayConfig {
    /// 录制日志文件路径
    pub replay_path: PathBuf,

    /// 回放速度倍率 (1.0 = 原速，即组间 1 秒)
    pub speed_multiplier: f64,

    /// 是否循环回放
    pub loop_playback: bool,

    /// 输出的逻辑通道号
    pub channel: u8,
}

/// 同一时间戳标签下的一组语句
#[derive(Debug, Clone)]
struct SentenceGroup {
    label: String,
    lines: Vec<String>,
}

/// 解析日志文件为分组序列
///
/// 相邻且标签相同的行落入同一组；缺少 `:` 分隔符或语句部分
/// 为空的行在加载时丢弃。
fn load_groups(path: &Path) -> std::io::Result<Vec<SentenceGroup>> {
    let raw = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&raw);

    let mut groups: Vec<SentenceGroup> = Vec::new();

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some((label, sentence)) = line.split_once(':') else {
            debug!(line = %line, "Skipping replay line without timestamp label");
            continue;
        };

        let label = label.trim();
        let sentence = sentence.trim();
        if sentence.is_empty() {
            debug!(label = %label, "Skipping replay line with empty sentence");
            continue;
        }

        match groups.last_mut() {
            Some(group) if group.label == label => group.lines.push(sentence.to_string()),
            _ => groups.push(SentenceGroup {
                label: label.to_string(),
                lines: vec![sentence.to_string()],
            }),
        }
    }

    Ok(groups)
}

/// 把一组语句打包成单个 ByteChunk
fn build_chunk(group: &SentenceGroup, channel: u8) -> ByteChunk {
    let mut payload = String::new();
    for line in &group.lines {
        payload.push_str(line);
        payload.push_str("\r\n");
    }

    ByteChunk {
        channel,
        payload: Bytes::from(payload),
        timestamp: epoch_seconds(),
    }
}

/// Replay Transport - 从录制日志回放语句流
pub struct ReplayTransport {
    config: ReplayConfig,
    listening: Arc<AtomicBool>,
    thread_handle: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl ReplayTransport {
    pub fn new(config: ReplayConfig) -> Self {
        Self {
            config,
            listening: Arc::new(AtomicBool::new(false)),
            thread_handle: std::sync::Mutex::new(None),
        }
    }
}

impl SentenceTransport for ReplayTransport {
    fn name(&self) -> &str {
        "replay"
    }

    fn channel(&self) -> u8 {
        self.config.channel
    }

    fn start(&self, callback: ChunkCallback) -> Result<(), ContractError> {
        if self.listening.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        // 文件在 start 时加载，打不开的路径直接报错给调用方
        let groups = match load_groups(&self.config.replay_path) {
            Ok(groups) => groups,
            Err(e) => {
                self.listening.store(false, Ordering::SeqCst);
                return Err(ContractError::transport_bind(
                    self.config.replay_path.display().to_string(),
                    e.to_string(),
                ));
            }
        };

        info!(
            path = %self.config.replay_path.display(),
            groups = groups.len(),
            "Loaded replay log"
        );

        let listening = self.listening.clone();
        let channel = self.config.channel;
        let speed = self.config.speed_multiplier.max(0.1);
        let loop_playback = self.config.loop_playback;

        let handle = thread::spawn(move || {
            debug!("Replay thread started");
            let delay = Duration::from_secs_f64(1.0 / speed);

            loop {
                if groups.is_empty() {
                    warn!("No replayable groups in log");
                    break;
                }

                for (index, group) in groups.iter().enumerate() {
                    if !listening.load(Ordering::Relaxed) {
                        debug!("Replay stopped");
                        return;
                    }

                    if index > 0 {
                        thread::sleep(delay);
                    }

                    callback(build_chunk(group, channel));
                }

                if !loop_playback {
                    info!("Replay completed");
                    break;
                }

                thread::sleep(delay);
                debug!("Looping replay");
            }

            listening.store(false, Ordering::SeqCst);
        });

        *self.thread_handle.lock().unwrap() = Some(handle);
        Ok(())
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);

        // 等待回放线程结束
        if let Some(handle) = self.thread_handle.lock().unwrap().take() {
            let _ = handle.join();
        }
    }

    fn is_running(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use std::sync::atomic::AtomicU64;
    use std::sync::Mutex;

    fn write_log(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_groups_by_timestamp_label() {
        let file = write_log(
            "100: $GPFIX,valid,40.0,-73.0\n\
             100: $GPFIX,invalid,41.0,-74.0\n\
             101: $GPFIX,valid,40.5,-73.5\n",
        );

        let groups = load_groups(file.path()).unwrap();

        assert_eq!(groups.len(), 2, "two labels should form two groups");
        assert_eq!(groups[0].lines.len(), 2);
        assert_eq!(groups[1].lines.len(), 1);
        assert_eq!(groups[1].lines[0], "$GPFIX,valid,40.5,-73.5");
    }

    #[test]
    fn test_load_skips_unlabeled_and_empty_lines() {
        let file = write_log("no label here\n\n100: $GPRMC,payload\n100:   \n");

        let groups = load_groups(file.path()).unwrap();

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].lines, vec!["$GPRMC,payload".to_string()]);
    }

    #[test]
    fn test_chunk_joins_group_lines() {
        let group = SentenceGroup {
            label: "7".to_string(),
            lines: vec!["$GPFIX,valid,40.0,-73.0".to_string(), "$GPGGA,x".to_string()],
        };

        let chunk = build_chunk(&group, 2);

        assert_eq!(chunk.channel, 2);
        assert_eq!(
            chunk.payload.as_ref(),
            b"$GPFIX,valid,40.0,-73.0\r\n$GPGGA,x\r\n"
        );
    }

    #[test]
    fn test_replay_emits_groups_in_order() {
        let file = write_log("1: $GPFIX,valid,40.0,-73.0\n2: $GPFIX,valid,40.5,-73.5\n");
        let transport = ReplayTransport::new(ReplayConfig {
            replay_path: file.path().to_path_buf(),
            speed_multiplier: 100.0,
            loop_playback: false,
            channel: 2,
        });

        let seen: Arc<Mutex<Vec<Bytes>>> = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();

        transport
            .start(Arc::new(move |chunk: ByteChunk| {
                assert_eq!(chunk.channel, 2, "chunk should carry the configured channel");
                seen_clone.lock().unwrap().push(chunk.payload);
            }))
            .unwrap();

        // 100x 速度下两组在几十毫秒内发完
        std::thread::sleep(Duration::from_millis(300));
        transport.stop();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2, "single pass should emit both groups");
        assert_eq!(seen[0].as_ref(), b"$GPFIX,valid,40.0,-73.0\r\n");
        assert_eq!(seen[1].as_ref(), b"$GPFIX,valid,40.5,-73.5\r\n");
        assert!(!transport.is_running(), "single pass should end quiescent");
    }

    #[test]
    fn test_replay_loops_until_stopped() {
        let file = write_log("1: $GPRMC,a\n");
        let transport = ReplayTransport::new(ReplayConfig {
            replay_path: file.path().to_path_buf(),
            speed_multiplier: 100.0,
            loop_playback: true,
            channel: 2,
        });

        let count = Arc::new(AtomicU64::new(0));
        let count_clone = count.clone();

        transport
            .start(Arc::new(move |_chunk| {
                count_clone.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();

        std::thread::sleep(Duration::from_millis(200));
        transport.stop();

        assert!(
            count.load(Ordering::SeqCst) >= 2,
            "looping replay should revisit the single group"
        );
        assert!(!transport.is_running());
    }

    #[test]
    fn test_start_missing_file_fails() {
        let transport = ReplayTransport::new(ReplayConfig {
            replay_path: PathBuf::from("/nonexistent/replay.log"),
            speed_multiplier: 1.0,
            loop_playback: false,
            channel: 2,
        });

        let result = transport.start(Arc::new(|_| {}));

        assert!(result.is_err(), "missing replay file should fail start");
        assert!(!transport.is_running(), "failed start must not stay running");
    }
}
