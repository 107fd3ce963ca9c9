//! # Router
//!
//! 触点匹配、门控、数值映射与可热更新的路由表。
//!
//! 负责：
//! - 按地址匹配触点（精确路径优先，其次 `/<id>` 后缀）
//! - 每触点冷却 / 上升沿门控
//! - 绑定级范围映射与响应曲线
//! - 原子替换触点、绑定与模块集合
//!
//! ## 使用示例
//!
//! ```ignore
//! use router::{Router, RoutingTable};
//!
//! let table = Arc::new(RoutingTable::new());
//! table.update(contacts, bindings)?;
//! table.update_modules(registry);
//!
//! let router = Arc::new(Router::new(table, dispatcher));
//! listener.add_listener(router.listener_callback())?;
//! ```

mod engine;
mod error;
mod gate;
mod mapper;
mod matcher;
mod table;

pub use engine::{RouteOutcome, Router};
pub use error::RouterError;
pub use gate::{GateDecision, GateState, SuppressReason};
pub use mapper::{apply_curve, map_value};
pub use matcher::match_contact;
pub use table::{RoutingSnapshot, RoutingTable};

pub use contracts::{Binding, Contact, CurveType, OscArg, OscEvent};
