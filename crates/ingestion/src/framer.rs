//! LineFramer - 跨块边界的行切分
//!
//! 串口按任意边界交付字节块，一条语句可能分散在多个块里。
//! Framer 累积未完结的尾部，凑齐 `\n` 才吐出整行。

use tracing::debug;

/// 单行最大字节数；超过即认定流内无行边界，整段丢弃
const MAX_LINE_BYTES: usize = 1024;

/// 行切分器
///
/// 编码错误按有损解码容忍：无法解码的字节替换后照常切行，
/// 解不出有用内容的行由上层丢弃。
#[derive(Debug, Default)]
pub struct LineFramer {
    pending: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 喂入一个字节块，返回其中完结的行（已去除 `\r` 与首尾空白）
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut lines = Vec::new();

        for &byte in chunk {
            if byte == b'\n' {
                if let Some(line) = self.take_line() {
                    lines.push(line);
                }
                continue;
            }

            if self.pending.len() >= MAX_LINE_BYTES {
                debug!(len = self.pending.len(), "discarding oversized partial line");
                self.pending.clear();
            }
            self.pending.push(byte);
        }

        lines
    }

    /// 残留的未完结字节数
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    fn take_line(&mut self) -> Option<String> {
        let raw = std::mem::take(&mut self.pending);
        let text = String::from_utf8_lossy(&raw);
        let line = text.trim_matches(|c: char| c == '\r' || c.is_whitespace());
        if line.is_empty() {
            None
        } else {
            Some(line.to_string())
        }
    }
}
