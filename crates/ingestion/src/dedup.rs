//! 重复抑制与一次性告警状态
//!
//! 两者都由回放引擎持有，生命周期为一次回放。

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

/// 去重 key，按数据源类别分开命名空间
///
/// 相机 `front` 的 scene 流与名为 `front_scene` 的测距传感器互不影响。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    /// 相机的一路图像流
    Camera {
        camera: String,
        stream: &'static str,
    },
    /// 扫描 / GPU 测距传感器
    Range(String),
}

impl DedupKey {
    pub fn camera(camera: impl Into<String>, stream: &'static str) -> Self {
        Self::Camera {
            camera: camera.into(),
            stream,
        }
    }

    pub fn range(sensor: impl Into<String>) -> Self {
        Self::Range(sensor.into())
    }
}

/// 每个数据源最后一次接受的后端时间戳
///
/// 只接受严格更大的时间戳，记录值永不回退。
#[derive(Debug, Default)]
pub struct DedupTracker {
    last_seen: HashMap<DedupKey, u64>,
}

impl DedupTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 时间戳是新的则记录并返回 true
    ///
    /// 相同或更旧的时间戳返回 false，状态不变。
    pub fn should_emit(&mut self, key: DedupKey, timestamp: u64) -> bool {
        match self.last_seen.entry(key) {
            Entry::Occupied(entry) if timestamp <= *entry.get() => false,
            Entry::Occupied(mut entry) => {
                entry.insert(timestamp);
                true
            }
            Entry::Vacant(entry) => {
                entry.insert(timestamp);
                true
            }
        }
    }

    /// 最后一次接受的时间戳
    pub fn last_seen(&self, key: &DedupKey) -> Option<u64> {
        self.last_seen.get(key).copied()
    }

    pub fn len(&self) -> usize {
        self.last_seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_seen.is_empty()
    }
}

/// 每个 key 只告警一次，直到问题消失
#[derive(Debug, Default)]
pub struct WarningTracker {
    active: HashSet<String>,
}

impl WarningTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 首次出现返回 true (调用方此时发出告警)
    pub fn raise(&mut self, key: &str) -> bool {
        if self.active.contains(key) {
            false
        } else {
            self.active.insert(key.to_string());
            true
        }
    }

    /// 问题已消失，下次出现时重新告警
    pub fn clear(&mut self, key: &str) {
        self.active.remove(key);
    }

    pub fn is_active(&self, key: &str) -> bool {
        self.active.contains(key)
    }
}
