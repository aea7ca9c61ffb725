//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 回放 e2e 测试（无需真实串口）
//! - 全链路方向线验证

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod config_tests {
    use std::io::Write as _;

    use config_loader::ConfigLoader;
    use contracts::FusionStrategy;

    const MINIMAL_TOML: &str = r#"
[transport]
mode = "replay"
replay_path = "fixes.log"

[viewport]
width = 100.0
height = 100.0
center_latitude = 40.0
center_longitude = -74.0

[[overlays]]
name = "primary"
kind = "log"
"#;

    /// 最小蓝图落盘再读回，缺省字段按合约补齐
    #[test]
    fn test_blueprint_defaults_from_minimal_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        file.write_all(MINIMAL_TOML.as_bytes()).unwrap();
        file.flush().unwrap();

        let blueprint = ConfigLoader::load_from_path(file.path()).unwrap();

        assert_eq!(blueprint.transport.channel, 2, "position channel defaults to 2");
        assert_eq!(blueprint.fusion.strategy, FusionStrategy::RotationVector);
        assert_eq!(blueprint.overlays.len(), 1);
        assert_eq!(blueprint.overlays[0].queue_capacity, 8);
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::io::Write as _;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{
        FusionStrategy, GeoFix, HeadingEstimate, InertialConfig, InertialMode, OverlayConfig,
        OverlayKind, OverlayLine, OverlayUpdate, TransportConfig, TransportMode, ViewportConfig,
    };
    use fusion::FusionPipeline;
    use ingestion::{BackpressureConfig, IngestionPipeline};
    use overlay::create_dispatcher;
    use projector::{PlanarTransform, ProjectionDriver};
    use tokio::sync::{mpsc, watch};
    use tokio::time::timeout;

    fn write_replay_log(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    fn replay_config(path: &Path, speed: f64, loop_playback: bool) -> TransportConfig {
        TransportConfig {
            mode: TransportMode::Replay,
            channel: 2,
            device: None,
            baud_rate: 9600,
            replay_path: Some(path.to_path_buf()),
            speed_multiplier: speed,
            loop_playback,
            mock_rate_hz: 1.0,
        }
    }

    fn test_viewport() -> ViewportConfig {
        ViewportConfig {
            width: 100.0,
            height: 100.0,
            center_latitude: 40.0,
            center_longitude: -74.0,
            pixels_per_meter: 1.0,
        }
    }

    /// End-to-end test: replay log -> IngestionPipeline -> GeoFix
    ///
    /// 验证 last-good 语义：混入无效定位时保留上一条有效定位，
    /// 最终定位来自最近一条被接受的语句。
    #[tokio::test]
    async fn test_e2e_replay_last_good_fix() {
        let log = write_replay_log(
            "A: $GPFIX,valid,40.0,-73.0\n\
             A: $GPFIX,invalid,41.0,-74.0\n\
             B: $GPFIX,valid,40.5,-73.5\n",
        );

        let transport = transport::build_transport(&replay_config(log.path(), 50.0, false))
            .expect("replay transport should build");
        let mut pipeline = IngestionPipeline::new(transport, BackpressureConfig::default());
        pipeline.start().unwrap();
        let mut fix_rx = pipeline.take_fix_receiver().unwrap();

        let mut observed: Vec<GeoFix> = Vec::new();
        let final_fix = timeout(Duration::from_secs(3), async {
            loop {
                if let Some(fix) = *fix_rx.borrow_and_update() {
                    let last = observed
                        .last()
                        .map(|f: &GeoFix| (f.latitude, f.longitude));
                    if last != Some((fix.latitude, fix.longitude)) {
                        observed.push(fix);
                    }
                    if fix.latitude == 40.5 {
                        return fix;
                    }
                }
                fix_rx.changed().await.expect("fix channel closed");
            }
        })
        .await
        .expect("timed out waiting for final fix");

        assert_eq!((final_fix.latitude, final_fix.longitude), (40.5, -73.5));
        assert!(
            observed.iter().all(|f| f.latitude != 41.0),
            "invalid fix must never surface, observed {:?}",
            observed
        );

        let snapshot = pipeline.metrics().snapshot();
        assert_eq!(snapshot.fixes_accepted, 2);
        assert_eq!(snapshot.fixes_rejected, 1);

        pipeline.shutdown().await;
        assert!(!pipeline.is_running());
    }

    /// End-to-end test: replay -> ingestion -> fusion -> projector -> file overlay
    ///
    /// 验证完整的数据流：
    /// 1. 回放传输提供定位语句
    /// 2. 融合管线从模拟惯性源得出 90 度航向
    /// 3. 投影驱动算出朝东的方向线
    /// 4. 文件叠加层持有最新线段的 JSON
    #[tokio::test]
    async fn test_e2e_pipeline_draws_direction_line() {
        let log = write_replay_log("1: $GPFIX,valid,40.0,-74.0\n");

        let transport = transport::build_transport(&replay_config(log.path(), 20.0, true))
            .expect("replay transport should build");
        let mut ingestion = IngestionPipeline::new(transport, BackpressureConfig::default());
        ingestion.start().unwrap();
        let fix_rx = ingestion.take_fix_receiver().unwrap();

        let source = transport::build_inertial_source(&InertialConfig {
            mode: InertialMode::Mock,
            sample_rate_hz: 50.0,
            start_heading_deg: 90.0,
            sweep_dps: 0.0,
        })
        .unwrap()
        .expect("mock mode should yield a source");
        let mut fusion = FusionPipeline::new(source, FusionStrategy::RotationVector, None);
        fusion.start().unwrap();
        let heading_rx = fusion.take_heading_receiver().unwrap();

        let transform = Arc::new(PlanarTransform::from_config(&test_viewport()));
        let (update_tx, update_rx) = mpsc::channel::<OverlayUpdate>(16);
        let driver = ProjectionDriver::new(transform, None, fix_rx, heading_rx, update_tx);
        let driver_handle = tokio::spawn(driver.run());

        let dir = tempfile::tempdir().unwrap();
        let state_path = dir.path().join("segment.json");
        let dispatcher = create_dispatcher(
            vec![OverlayConfig {
                name: "state_file".to_string(),
                kind: OverlayKind::File,
                queue_capacity: 8,
                path: Some(state_path.clone()),
            }],
            update_rx,
        )
        .unwrap();
        let dispatcher_handle = dispatcher.spawn();

        // 轮询状态文件直到出现可解析的线段
        let line = timeout(Duration::from_secs(3), async {
            loop {
                if let Ok(content) = std::fs::read_to_string(&state_path) {
                    if let Ok(line) = serde_json::from_str::<OverlayLine>(&content) {
                        return line;
                    }
                }
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
        })
        .await
        .expect("timed out waiting for overlay state");

        assert!(
            (line.heading_deg - 90.0).abs() < 1.0,
            "expected an east heading, got {}",
            line.heading_deg
        );
        assert!((line.origin.latitude - 40.0).abs() < 1e-6);
        assert!((line.origin.longitude - (-74.0)).abs() < 1e-6);
        assert!(
            line.exit.longitude > line.origin.longitude,
            "east heading should exit towards greater longitude"
        );
        assert!(
            (line.exit.latitude - line.origin.latitude).abs() < 1e-4,
            "east heading should stay on the origin latitude"
        );

        // 反序拆除：上游发送端先消失，驱动与分发器随之退出
        ingestion.shutdown().await;
        let _ = fusion.shutdown().await;

        let stats = timeout(Duration::from_secs(2), driver_handle)
            .await
            .expect("projection driver did not exit")
            .unwrap();
        assert!(stats.projected >= 1, "at least one projection expected");

        let _ = timeout(Duration::from_secs(2), dispatcher_handle).await;
    }

    /// 没有航向之前，定位流再活跃也不产生任何叠加层输出
    #[tokio::test]
    async fn test_e2e_no_heading_keeps_overlay_empty() {
        let log = write_replay_log("1: $GPFIX,valid,40.0,-74.0\n");

        let transport = transport::build_transport(&replay_config(log.path(), 50.0, true))
            .expect("replay transport should build");
        let mut ingestion = IngestionPipeline::new(transport, BackpressureConfig::default());
        ingestion.start().unwrap();
        let fix_rx = ingestion.take_fix_receiver().unwrap();

        let (heading_tx, heading_rx) = watch::channel::<Option<HeadingEstimate>>(None);

        let transform = Arc::new(PlanarTransform::from_config(&test_viewport()));
        let (update_tx, mut update_rx) = mpsc::channel::<OverlayUpdate>(16);
        let driver = ProjectionDriver::new(transform, None, fix_rx, heading_rx, update_tx);
        let driver_handle = tokio::spawn(driver.run());

        let update = timeout(Duration::from_millis(300), update_rx.recv()).await;
        assert!(
            update.is_err(),
            "no update may be emitted before the first heading, got {:?}",
            update
        );

        ingestion.shutdown().await;
        drop(heading_tx);
        let stats = timeout(Duration::from_secs(2), driver_handle)
            .await
            .expect("projection driver did not exit")
            .unwrap();
        assert_eq!(stats.projected, 0);
    }

    /// 重建的管线不继承上一次运行的 last-good 定位
    #[tokio::test]
    async fn test_e2e_restart_begins_with_no_fix() {
        let first_log = write_replay_log("1: $GPFIX,valid,40.0,-73.0\n");
        let transport = transport::build_transport(&replay_config(first_log.path(), 50.0, false))
            .expect("replay transport should build");
        let mut first = IngestionPipeline::new(transport, BackpressureConfig::default());
        first.start().unwrap();
        let mut fix_rx = first.take_fix_receiver().unwrap();

        let fix = timeout(Duration::from_secs(2), async {
            loop {
                if let Some(fix) = *fix_rx.borrow_and_update() {
                    return fix;
                }
                fix_rx.changed().await.expect("fix channel closed");
            }
        })
        .await
        .expect("timed out waiting for first fix");
        assert_eq!(fix.latitude, 40.0);

        first.shutdown().await;

        // 第二次运行只收到无效定位，定位必须停在 None
        let second_log = write_replay_log("1: $GPFIX,invalid,41.0,-74.0\n");
        let transport = transport::build_transport(&replay_config(second_log.path(), 50.0, false))
            .expect("replay transport should build");
        let mut second = IngestionPipeline::new(transport, BackpressureConfig::default());
        second.start().unwrap();
        let fix_rx = second.take_fix_receiver().unwrap();

        timeout(Duration::from_secs(2), async {
            while second.metrics().snapshot().fixes_rejected == 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("timed out waiting for the invalid sentence to be processed");

        assert!(
            fix_rx.borrow().is_none(),
            "restarted pipeline must not inherit a previous fix"
        );
        assert_eq!(second.metrics().snapshot().fixes_accepted, 0);

        second.shutdown().await;
    }
}
