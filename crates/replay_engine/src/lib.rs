//! # Replay Engine
//!
//! 轨迹回放引擎。
//!
//! 负责：
//! - 按固定周期 + 容差挑选要提交的轨迹样本 (`ReplayClock`)
//! - 在后端设置位姿并推进一个周期 (`PoseActuator`)
//! - 每个 tick 轮询全部传感器并写入合并日志 (`ReplayEngine`)
//! - 响应关闭信号，始终完成输出日志 (`ShutdownSignal`)
//!
//! ## 使用示例
//!
//! ```ignore
//! use replay_engine::{EngineConfig, ReplayEngine, ShutdownSignal};
//!
//! let engine = ReplayEngine::prepare(&client, &blueprint, shutdown, EngineConfig::default()).await?;
//! let outcome = engine.run(&reader, LogWriter::create(&output)?).await?;
//! println!("{}", outcome.metrics);
//! ```

mod actuator;
mod clock;
mod engine;
mod error;
mod shutdown;

pub use actuator::PoseActuator;
pub use clock::{ReplayClock, TOLERANCE_FRACTION};
pub use engine::{EngineConfig, ReplayEngine, ReplayOutcome, ReplayStats, StopReason};
pub use error::{ReplayError, Result};
pub use shutdown::ShutdownSignal;
