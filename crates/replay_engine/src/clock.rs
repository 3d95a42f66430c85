//! 回放时钟
//!
//! 固定周期 + 容差的提交策略：日志时间为 `t` 的样本当且仅当
//! `t - last_committed + tolerance >= period` 时提交，
//! `tolerance = 0.05 × period`，`last_committed` 初始为 0。

/// 容差占周期的比例
pub const TOLERANCE_FRACTION: f64 = 0.05;

/// 回放时钟
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayClock {
    period: f64,
    tolerance: f64,
    last_committed: f64,
}

impl ReplayClock {
    /// 由回放速率 (Hz) 创建
    pub fn new(rate_hz: f64) -> Self {
        Self::with_period(1.0 / rate_hz)
    }

    pub fn with_period(period: f64) -> Self {
        Self {
            period,
            tolerance: TOLERANCE_FRACTION * period,
            last_committed: 0.0,
        }
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn last_committed(&self) -> f64 {
        self.last_committed
    }

    /// 判断样本是否提交；提交时记录其时间
    pub fn should_commit(&mut self, log_time: f64) -> bool {
        if log_time - self.last_committed + self.tolerance >= self.period {
            self.last_committed = log_time;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_sequence() {
        let mut clock = ReplayClock::new(10.0);
        let committed: Vec<f64> = [0.00, 0.09, 0.11, 0.22]
            .into_iter()
            .filter(|&t| clock.should_commit(t))
            .collect();
        assert_eq!(committed, vec![0.11, 0.22]);
        assert_eq!(clock.last_committed(), 0.22);
    }

    #[test]
    fn test_within_tolerance_commits() {
        let mut clock = ReplayClock::with_period(0.1);
        // 0.096 + 0.005 >= 0.1
        assert!(clock.should_commit(0.096));
        // 0.19 - 0.096 + 0.005 = 0.099 < 0.1
        assert!(!clock.should_commit(0.19));
        assert!(clock.should_commit(0.2));
    }

    #[test]
    fn test_skips_do_not_move_clock() {
        let mut clock = ReplayClock::with_period(1.0);
        assert!(!clock.should_commit(0.5));
        assert!(!clock.should_commit(0.9));
        assert_eq!(clock.last_committed(), 0.0);
        assert!(clock.should_commit(0.95));
    }

    #[test]
    fn test_dense_log_commits_once_per_period() {
        let mut clock = ReplayClock::new(10.0);
        let commits = (0..100)
            .map(|i| 0.01 * f64::from(i))
            .filter(|&t| clock.should_commit(t))
            .count();
        // 0.1, 0.2, ... 0.9 (浮点误差由容差吸收)
        assert_eq!(commits, 9);
    }
}
