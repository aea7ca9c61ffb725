//! Real serial transport implementation
//!
//! Reads raw bytes from a serial device using the serialport crate and
//! forwards them as chunks on the configured logical channel.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use bytes::Bytes;
use contracts::{epoch_seconds, ByteChunk, ChunkCallback, ContractError, SentenceTransport};
use tracing::{debug, info, warn};

/// Serial transport configuration
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Device path, e.g. `/dev/ttyUSB0`
    pub device: String,
    /// Baud rate
    pub baud_rate: u32,
    /// Logical channel carrying position sentences
    pub channel: u8,
}

/// Serial transport
///
/// Owns the device exclusively while running. Connection loss after a
/// successful start is latched in `fault()` rather than retried; the
/// owner decides whether to rebuild.
pub struct SerialTransport {
    config: SerialConfig,
    listening: Arc<AtomicBool>,
    fault: Arc<Mutex<Option<String>>>,
    thread_handle: Mutex<Option<JoinHandle<()>>>,
}

impl SerialTransport {
    pub fn new(config: SerialConfig) -> Self {
        Self {
            config,
            listening: Arc::new(AtomicBool::new(false)),
            fault: Arc::new(Mutex::new(None)),
            thread_handle: Mutex::new(None),
        }
    }
}

impl SentenceTransport for SerialTransport {
    fn name(&self) -> &str {
        "serial"
    }

    fn channel(&self) -> u8 {
        self.config.channel
    }

    fn start(&self, callback: ChunkCallback) -> Result<(), ContractError> {
        if self.listening.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        // 打开失败直接上报，不进入监听状态
        let mut port = match serialport::new(&self.config.device, self.config.baud_rate)
            .timeout(Duration::from_millis(200))
            .open()
        {
            Ok(port) => port,
            Err(e) => {
                self.listening.store(false, Ordering::SeqCst);
                return Err(ContractError::transport_bind(
                    self.config.device.clone(),
                    e.to_string(),
                ));
            }
        };

        info!(
            device = %self.config.device,
            baud_rate = self.config.baud_rate,
            "serial device opened"
        );

        *self.fault.lock().unwrap() = None;

        let listening = self.listening.clone();
        let fault = self.fault.clone();
        let channel = self.config.channel;
        let device = self.config.device.clone();

        let handle = thread::spawn(move || {
            let mut buf = [0u8; 1024];

            debug!(device = %device, "serial read thread started");

            while listening.load(Ordering::Relaxed) {
                match port.read(&mut buf) {
                    Ok(0) => {
                        warn!(device = %device, "serial device closed");
                        *fault.lock().unwrap() = Some("device closed".to_string());
                        break;
                    }
                    Ok(n) => {
                        callback(ByteChunk {
                            channel,
                            payload: Bytes::copy_from_slice(&buf[..n]),
                            timestamp: epoch_seconds(),
                        });
                    }
                    // 读超时只是没有数据，回头检查监听标志
                    Err(e) if e.kind() == std::io::ErrorKind::TimedOut => continue,
                    Err(e) => {
                        warn!(device = %device, error = %e, "serial read failed");
                        *fault.lock().unwrap() = Some(e.to_string());
                        break;
                    }
                }
            }

            listening.store(false, Ordering::SeqCst);
            debug!(device = %device, "serial read thread stopped");
        });

        *self.thread_handle.lock().unwrap() = Some(handle);
        Ok(())
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);

        // 等待读线程退出并释放设备
        if let Some(handle) = self.thread_handle.lock().unwrap().take() {
            let _ = handle.join();
        }
    }

    fn is_running(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }

    fn fault(&self) -> Option<String> {
        self.fault.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    // Serial tests require a physical or virtual device attached.
    // Marked ignore, only run when hardware is available.

    use super::*;

    #[test]
    #[ignore = "requires serial device"]
    fn test_serial_open_and_stop() {
        let transport = SerialTransport::new(SerialConfig {
            device: "/dev/ttyUSB0".to_string(),
            baud_rate: 9600,
            channel: 2,
        });

        transport.start(Arc::new(|_| {})).unwrap();
        assert!(transport.is_running());
        transport.stop();
        assert!(!transport.is_running());
    }

    #[test]
    fn test_open_missing_device_fails() {
        let transport = SerialTransport::new(SerialConfig {
            device: "/dev/does-not-exist".to_string(),
            baud_rate: 9600,
            channel: 2,
        });

        let result = transport.start(Arc::new(|_| {}));

        assert!(result.is_err(), "missing device should fail start");
        assert!(!transport.is_running());
    }
}
