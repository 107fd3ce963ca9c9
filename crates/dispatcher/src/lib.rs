//! # Dispatcher
//!
//! 反应分发模块。
//!
//! 负责：
//! - 按名称管理输出模块 (`ModuleRegistry`)
//! - 解析反应入口（专用入口优先，其次 `handle_event`）
//! - 在固定大小的 worker 池中执行反应，隔离错误与 panic

pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod modules;
pub mod registry;

pub use contracts::{Binding, DeviceInfo, ReactionSink};
pub use dispatcher::{DispatchStatus, Dispatcher, DispatcherConfig, ReactionEntry};
pub use error::DispatcherError;
pub use metrics::{DispatchMetrics, MetricsSnapshot};
pub use modules::{LogModule, OscForwardConfig, OscForwardModule};
pub use registry::{create_module, create_registry, ModuleRegistry};
