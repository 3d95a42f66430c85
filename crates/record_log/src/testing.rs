//! 测试用记录构造

use std::io::Write;

use contracts::{
    Header, LogRecord, Message, PoseStamped, Pose, Quaternion, StaticTransform, TfMessage, Vector3,
};
use tempfile::NamedTempFile;

pub fn pose_record(log_time: f64, x: f64) -> LogRecord {
    LogRecord {
        channel: "/pose".into(),
        log_time,
        message: Message::Pose(PoseStamped {
            header: Header::new(log_time, "world"),
            pose: Pose::new(Vector3::new(x, 0.0, 0.0), Quaternion::identity()),
        }),
    }
}

pub fn pose_line(log_time: f64, x: f64) -> String {
    serde_json::to_string(&pose_record(log_time, x)).unwrap()
}

pub fn static_line(log_time: f64, parent: &str, child: &str) -> String {
    let transform = StaticTransform::new(parent, child, Vector3::default(), Quaternion::identity());
    let record = LogRecord {
        channel: "/tf_static".into(),
        log_time,
        message: Message::StaticTransforms(TfMessage {
            transforms: vec![transform.to_stamped(log_time)],
        }),
    };
    serde_json::to_string(&record).unwrap()
}

pub fn write_log(lines: &[String]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for line in lines {
        writeln!(file, "{line}").unwrap();
    }
    file.flush().unwrap();
    file
}
