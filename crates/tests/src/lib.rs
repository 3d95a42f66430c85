//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 模拟 e2e 测试（内置 mock 后端）

#[cfg(test)]
mod contract_tests {
    use contracts::{ConfigVersion, ConvertedReading, Header, LogRecord, Message, Range, RangeArray, Vector3};

    #[test]
    fn test_contracts_compile() {
        let _ = ConfigVersion::V1;
    }

    /// 输出日志行格式: {channel, log_time, message: {kind, data}}
    #[test]
    fn test_range_record_snapshot() {
        let reading = ConvertedReading {
            sensor_id: "uwb".into(),
            channel: "/uwb".into(),
            log_time: 1.0,
            message: Message::Ranges(RangeArray {
                header: Header::new(2.0, ""),
                tag_id: "tag_0".into(),
                tag_position: Vector3::new(0.0, 0.0, 0.0),
                ranges: vec![Range {
                    stamp: 2.0,
                    anchor_id: "anchor_0".into(),
                    anchor_position: Vector3::new(1.0, 2.0, 3.0),
                    valid_range: true,
                    distance: 4.0,
                    rssi: -50.0,
                }],
            }),
        };

        let json = serde_json::to_value(reading.into_record()).unwrap();
        assert_eq!(json["channel"], "/uwb");
        assert_eq!(json["log_time"], 1.0);
        assert_eq!(json["message"]["kind"], "ranges");
        assert_eq!(json["message"]["data"]["header"]["frame_id"], "");
        assert_eq!(json["message"]["data"]["ranges"][0]["anchor_id"], "anchor_0");

        let parsed: LogRecord = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.message.kind(), "ranges");
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::io::Write;
    use std::path::Path;

    use config_loader::{ConfigFormat, ConfigLoader};
    use contracts::{
        Header, ImageEncoding, LogRecord, Message, Pose, PoseStamped, Quaternion, ReplayBlueprint,
        StaticTransform, TfMessage, Vector3,
    };
    use record_log::{LogWriter, MemorySink, TrajectoryReader};
    use replay_engine::{EngineConfig, ReplayEngine, ReplayError, ShutdownSignal, StopReason};
    use sim_client::{MockConfig, MockSimClient};

    const POSE_CHANNEL: &str = "/airsim/gtpose";

    fn pose_line(t: f64) -> String {
        let record = LogRecord {
            channel: POSE_CHANNEL.into(),
            log_time: t,
            message: Message::Pose(PoseStamped {
                header: Header::new(t + 100.0, "world"),
                pose: Pose::new(Vector3::new(t, 2.0 * t, -1.0), Quaternion::identity()),
            }),
        };
        serde_json::to_string(&record).unwrap()
    }

    fn static_line(t: f64) -> String {
        let transform = StaticTransform::new(
            "base_link",
            "imu_link",
            Vector3::new(0.0, 0.0, 0.1),
            Quaternion::identity(),
        );
        let record = LogRecord {
            channel: "/tf_static".into(),
            log_time: t,
            message: Message::StaticTransforms(TfMessage {
                transforms: vec![transform.to_stamped(t)],
            }),
        };
        serde_json::to_string(&record).unwrap()
    }

    /// 10 个位姿 (0.0 .. 0.9)，外加一条静态变换与一条其它通道记录
    fn write_input(path: &Path) -> Vec<String> {
        let mut lines = vec![static_line(0.0)];
        for i in 0..10 {
            lines.push(pose_line(i as f64 * 0.1));
        }
        lines.push(r#"{"channel":"/imu","log_time":0.95,"message":{"kind":"raw","data":[1,2,3]}}"#.into());

        let mut file = std::fs::File::create(path).unwrap();
        for line in &lines {
            writeln!(file, "{line}").unwrap();
        }
        lines
    }

    fn blueprint(input: &Path, output: &Path, sensors: &str) -> ReplayBlueprint {
        let toml = format!(
            r#"
[replay]
rate_hz = 5.0
vehicle_name = "drone_1"
pose_channel = "{POSE_CHANNEL}"
input_log = "{}"
output_log = "{}"
{sensors}
"#,
            input.display(),
            output.display()
        );
        ConfigLoader::load_from_str(&toml, ConfigFormat::Toml).unwrap()
    }

    const ALL_SENSORS: &str = r#"
[[cameras]]
name = "front"
frame = "front_link"
optical_frame = "front_optical"
scene_topic = "/front/image"
camera_info = { topic = "/front/camera_info" }

[[echo_sensors]]
name = "echo_1"
topic = "/echo"
frame = "echo_link"

[[lidar_sensors]]
name = "lidar_1"
topic = "/lidar/points"
frame = "lidar_link"
segmentation_topic = "/lidar/labels"

[[gpu_lidar_sensors]]
name = "gpu_1"
topic = "/gpu/points"
frame = "gpu_link"

[uwb]
names = ["uwb_1"]
topic = "/uwb"

[wifi]
names = ["wifi_1"]
topic = "/wifi"

[[objects]]
name = "target"
topic = "/target/pose"
"#;

    fn read_records(path: &Path) -> (Vec<String>, Vec<LogRecord>) {
        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<String> = content.lines().map(str::to_string).collect();
        let records = lines
            .iter()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        (lines, records)
    }

    /// End-to-end: input log -> ReplayEngine (mock backend) -> merged output log
    ///
    /// 5 Hz, 0.1s 间隔的样本：提交 0.2 / 0.4 / 0.6 / 0.8，其余被时钟跳过。
    #[tokio::test]
    async fn test_e2e_full_replay() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("route.jsonl");
        let output = dir.path().join("merged.jsonl");
        let input_lines = write_input(&input);

        let blueprint = blueprint(&input, &output, ALL_SENSORS);
        let client = MockSimClient::new();
        let reader = TrajectoryReader::open(&input, POSE_CHANNEL, "/tf_static").unwrap();

        let engine = ReplayEngine::prepare(
            &client,
            &blueprint,
            ShutdownSignal::new(),
            EngineConfig::default(),
        )
        .await
        .unwrap();
        let outcome = engine
            .run(&reader, LogWriter::create(&output).unwrap())
            .await
            .unwrap();

        let stats = &outcome.stats;
        assert_eq!(stats.stop_reason, StopReason::Exhausted);
        assert_eq!(stats.samples_total, 10);
        assert_eq!(stats.ticks_committed, 4);
        assert_eq!(stats.samples_skipped, 6);
        assert_eq!(outcome.metrics.total_ticks, 4);
        assert_eq!(client.committed_poses().len(), 4);

        // camera(scene + info) + echo + lidar(points + labels) + gpu + uwb + wifi + object
        assert_eq!(stats.readings_written, 4 * 9);

        let (lines, records) = read_records(&output);

        // 1. 静态变换聚合：发现的变换在前，输入日志中的静态变换在后
        assert_eq!(records[0].channel, "/tf_static");
        assert_eq!(records[0].log_time, 0.0);
        let Message::StaticTransforms(tf) = &records[0].message else {
            panic!("first record is not a static transform set");
        };
        let children: Vec<&str> = tf.transforms.iter().map(|t| t.child_frame_id.as_str()).collect();
        assert_eq!(
            children,
            vec!["echo_link", "lidar_link", "gpu_link", "front_link", "front_optical", "imu_link"]
        );

        // 2. 读数：按 tick 分组，组内顺序固定
        let readings = &records[1..1 + 36];
        let committed = [0.2, 0.4, 0.6000000000000001, 0.8];
        for (tick, chunk) in readings.chunks(9).enumerate() {
            let channels: Vec<&str> = chunk.iter().map(|r| r.channel.as_str()).collect();
            assert_eq!(
                channels,
                vec![
                    "/front/image",
                    "/front/camera_info",
                    "/echo",
                    "/lidar/points",
                    "/lidar/labels",
                    "/gpu/points",
                    "/uwb",
                    "/wifi",
                    "/target/pose",
                ]
            );
            for record in chunk {
                assert_eq!(record.log_time, committed[tick]);
                let header = record.message.header().unwrap();
                assert_eq!(header.stamp, committed[tick] + 100.0);
            }
        }

        // 3. 尾部：输入日志中除静态通道外的全部原始行
        let tail = &lines[37..];
        let expected: Vec<&String> = input_lines
            .iter()
            .filter(|l| !l.contains("\"/tf_static\""))
            .collect();
        assert_eq!(tail.len(), expected.len());
        for (got, want) in tail.iter().zip(expected) {
            assert_eq!(got, want);
        }
        assert_eq!(stats.tail_records, 11);
    }

    #[tokio::test]
    async fn test_e2e_rf_consolidation() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("route.jsonl");
        write_input(&input);

        let blueprint = blueprint(
            &input,
            &dir.path().join("out.jsonl"),
            r#"
[uwb]
names = ["uwb_1"]
topic = "/uwb"
"#,
        );
        let client = MockSimClient::with_config(MockConfig {
            rf_anchors: 2,
            rf_tags: 2,
            ..Default::default()
        });
        let reader = TrajectoryReader::open(&input, POSE_CHANNEL, "/tf_static").unwrap();
        let engine = ReplayEngine::prepare(
            &client,
            &blueprint,
            ShutdownSignal::new(),
            EngineConfig { max_ticks: Some(1) },
        )
        .await
        .unwrap();
        let outcome = engine.run(&reader, MemorySink::new()).await.unwrap();
        assert_eq!(outcome.stats.stop_reason, StopReason::MaxTicks);

        let records = outcome.sink.records().unwrap();
        let arrays: Vec<_> = records
            .iter()
            .filter_map(|r| match &r.message {
                Message::Ranges(ranges) if r.channel == "/uwb" => Some(ranges),
                _ => None,
            })
            .collect();
        assert_eq!(arrays.len(), 2);
        assert_eq!(arrays[0].tag_id, "tag_0");
        assert_eq!(arrays[1].tag_id, "tag_1");

        for array in arrays {
            assert_eq!(array.header.frame_id, "");
            // 每个锚点只保留一次，顺序为首次出现顺序
            let ids: Vec<&str> = array.ranges.iter().map(|r| r.anchor_id.as_str()).collect();
            assert_eq!(ids, vec!["anchor_0", "anchor_1"]);

            // 距离与信号强度取自最强观测 (第二轮)
            assert_eq!(array.ranges[0].rssi, -50.0);
            assert_eq!(array.ranges[0].distance, 1.5);
            assert_eq!(array.ranges[1].rssi, -51.0);
            assert_eq!(array.ranges[1].distance, 2.5);
            assert_eq!(array.ranges[1].anchor_position, Vector3::new(2.0, 1.0, 0.5));
        }
    }

    #[tokio::test]
    async fn test_e2e_stale_sensor_is_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("route.jsonl");
        write_input(&input);

        let blueprint = blueprint(
            &input,
            &dir.path().join("out.jsonl"),
            r#"
[[echo_sensors]]
name = "echo_stale"
topic = "/echo/stale"
frame = "stale_link"

[[echo_sensors]]
name = "echo_live"
topic = "/echo/live"
frame = "live_link"
"#,
        );
        let client = MockSimClient::with_config(MockConfig {
            stale_sensors: vec!["echo_stale".into()],
            ..Default::default()
        });
        let reader = TrajectoryReader::open(&input, POSE_CHANNEL, "/tf_static").unwrap();
        let engine = ReplayEngine::prepare(
            &client,
            &blueprint,
            ShutdownSignal::new(),
            EngineConfig::default(),
        )
        .await
        .unwrap();
        let outcome = engine.run(&reader, MemorySink::new()).await.unwrap();

        let records = outcome.sink.records().unwrap();
        let count = |channel: &str| records.iter().filter(|r| r.channel == channel).count();
        assert_eq!(count("/echo/stale"), 1);
        assert_eq!(count("/echo/live"), 4);
        assert_eq!(outcome.stats.duplicates, 3);
        assert_eq!(outcome.metrics.total_duplicates, 3);
    }

    #[tokio::test]
    async fn test_e2e_stereo_camera_streams() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("route.jsonl");
        write_input(&input);

        let blueprint = blueprint(
            &input,
            &dir.path().join("out.jsonl"),
            r#"
[stereo]
enabled = true

[[cameras]]
name = "left"
frame = "left_link"
optical_frame = "left_optical"
scene_topic = "/left/image"
mono = true
depth = { topic = "/left/depth" }
camera_info = { topic = "/left/camera_info" }

[[cameras]]
name = "right"
frame = "right_link"
optical_frame = "right_optical"
scene_topic = "/right/image"
segmentation = { topic = "/right/segmentation" }
camera_info = { topic = "/right/camera_info" }
"#,
        );
        let mut mounts = HashMap::new();
        mounts.insert(
            "right".to_string(),
            Pose::new(Vector3::new(0.0, 0.5, 0.0), Quaternion::identity()),
        );
        let client = MockSimClient::with_config(MockConfig {
            mounts,
            ..Default::default()
        });
        let reader = TrajectoryReader::open(&input, POSE_CHANNEL, "/tf_static").unwrap();
        let engine = ReplayEngine::prepare(
            &client,
            &blueprint,
            ShutdownSignal::new(),
            EngineConfig { max_ticks: Some(1) },
        )
        .await
        .unwrap();
        let outcome = engine.run(&reader, MemorySink::new()).await.unwrap();
        let records = outcome.sink.records().unwrap();

        let by_channel: HashMap<&str, &Message> = records
            .iter()
            .map(|r| (r.channel.as_str(), &r.message))
            .collect();

        match by_channel["/left/image"] {
            Message::Image(img) => {
                assert_eq!(img.encoding, ImageEncoding::Mono8);
                assert_eq!(img.header.frame_id, "left_optical");
                assert_eq!(img.data.len(), 4 * 3);
            }
            other => panic!("unexpected {other:?}"),
        }
        match by_channel["/left/depth"] {
            Message::Image(img) => assert_eq!(img.encoding, ImageEncoding::Float32),
            other => panic!("unexpected {other:?}"),
        }
        match by_channel["/right/segmentation"] {
            Message::Image(img) => assert_eq!(img.encoding, ImageEncoding::Rgb8),
            other => panic!("unexpected {other:?}"),
        }

        // f = (4 / 2) / tan(45°) = 2, Tx = -f * 0.5 仅作用于第二台相机
        match (by_channel["/left/camera_info"], by_channel["/right/camera_info"]) {
            (Message::CameraInfo(left), Message::CameraInfo(right)) => {
                assert_eq!(left.p[3], 0.0);
                assert!((right.p[3] + 1.0).abs() < 1e-9);
                assert!((right.k[0] - 2.0).abs() < 1e-9);
                assert_eq!(right.header.frame_id, "right_optical");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_e2e_missing_sensor_fails_before_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("route.jsonl");
        write_input(&input);

        let blueprint = blueprint(
            &input,
            &dir.path().join("out.jsonl"),
            r#"
[[echo_sensors]]
name = "ghost"
topic = "/ghost/echo"
frame = "ghost_link"
"#,
        );
        let client = MockSimClient::with_config(MockConfig {
            missing: vec!["ghost".into()],
            ..Default::default()
        });

        let err = ReplayEngine::prepare(
            &client,
            &blueprint,
            ShutdownSignal::new(),
            EngineConfig::default(),
        )
        .await
        .err()
        .unwrap();
        assert!(matches!(err, ReplayError::Ingestion(_)));
        assert!(client.committed_poses().is_empty());
    }
}
