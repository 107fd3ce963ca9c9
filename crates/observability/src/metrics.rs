//! 路由与反应指标模块
//!
//! Prometheus 指标记录函数 + 内存聚合器（用于运行结束时输出摘要）。

use std::collections::HashMap;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};

/// 反应执行结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionStatus {
    Success,
    Failure,
    Panic,
}

impl ReactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
            Self::Panic => "panic",
        }
    }
}

/// 注册桥接器全部指标的说明（Prometheus HELP 文本）
pub fn describe_metrics() {
    describe_counter!("haptic_bridge_datagrams_received_total", "UDP datagrams received");
    describe_counter!("haptic_bridge_events_decoded_total", "OSC messages decoded");
    describe_counter!("haptic_bridge_decode_errors_total", "Malformed datagrams dropped");
    describe_counter!("haptic_bridge_listener_failures_total", "Listener callbacks that panicked");
    describe_counter!(
        "haptic_bridge_listener_events_dropped_total",
        "Events dropped because a listener queue was full"
    );
    describe_counter!("haptic_bridge_route_outcomes_total", "Routing outcomes by kind");
    describe_counter!("haptic_bridge_gate_suppressed_total", "Events suppressed by a contact gate");
    describe_histogram!("haptic_bridge_mapped_intensity", "Intensity after value mapping");
    describe_counter!("haptic_bridge_reactions_total", "Module reactions by status");
    describe_gauge!("haptic_bridge_dispatch_queue_depth", "Jobs waiting for a dispatch worker");
}

/// 记录路由结果
///
/// `outcome`: "routed" / "unmatched" / "suppressed" / "no_arguments"
pub fn record_route_outcome(outcome: &'static str) {
    counter!("haptic_bridge_route_outcomes_total", "outcome" => outcome).increment(1);
}

/// 记录被门控抑制的事件
pub fn record_gate_suppressed(contact_id: &str, reason: &'static str) {
    counter!(
        "haptic_bridge_gate_suppressed_total",
        "contact_id" => contact_id.to_string(),
        "reason" => reason
    )
    .increment(1);
}

/// 记录映射后的强度
pub fn record_mapped_intensity(contact_id: &str, intensity: f64) {
    histogram!(
        "haptic_bridge_mapped_intensity",
        "contact_id" => contact_id.to_string()
    )
    .record(intensity);
}

/// 记录反应执行
pub fn record_reaction(module: &str, reaction: &str, status: ReactionStatus) {
    counter!(
        "haptic_bridge_reactions_total",
        "module" => module.to_string(),
        "reaction" => reaction.to_string(),
        "status" => status.as_str()
    )
    .increment(1);
}

/// 记录分发队列深度
pub fn record_dispatch_queue_depth(depth: usize) {
    gauge!("haptic_bridge_dispatch_queue_depth").set(depth as f64);
}

/// 路由指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct RouteMetricsAggregator {
    /// 收到的事件总数
    pub total_events: u64,

    /// 无参数事件数
    pub empty_events: u64,

    /// 未匹配任何触点的事件数
    pub unmatched_events: u64,

    /// 被门控抑制的事件数
    pub suppressed_events: u64,

    /// 提交到分发器的反应数
    pub dispatched_reactions: u64,

    /// 映射后强度统计
    pub intensity_stats: RunningStats,

    /// 各触点触发次数
    pub contact_counts: HashMap<String, u64>,
}

impl RouteMetricsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_empty(&mut self) {
        self.total_events += 1;
        self.empty_events += 1;
    }

    pub fn record_unmatched(&mut self) {
        self.total_events += 1;
        self.unmatched_events += 1;
    }

    pub fn record_suppressed(&mut self) {
        self.total_events += 1;
        self.suppressed_events += 1;
    }

    /// 事件通过门控
    pub fn record_routed(&mut self, contact_id: &str) {
        self.total_events += 1;
        *self.contact_counts.entry(contact_id.to_string()).or_insert(0) += 1;
    }

    /// 单个反应已提交
    pub fn record_dispatch(&mut self, intensity: f64) {
        self.dispatched_reactions += 1;
        self.intensity_stats.push(intensity);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> RouteSummary {
        let routed = self.total_events - self.empty_events - self.unmatched_events - self.suppressed_events;
        RouteSummary {
            total_events: self.total_events,
            routed_events: routed,
            unmatched_events: self.unmatched_events,
            suppressed_events: self.suppressed_events,
            empty_events: self.empty_events,
            dispatched_reactions: self.dispatched_reactions,
            suppression_rate: if self.total_events > 0 {
                self.suppressed_events as f64 / self.total_events as f64 * 100.0
            } else {
                0.0
            },
            intensity: StatsSummary::from(&self.intensity_stats),
            contact_counts: self.contact_counts.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 路由摘要
#[derive(Debug, Clone, Default)]
pub struct RouteSummary {
    pub total_events: u64,
    pub routed_events: u64,
    pub unmatched_events: u64,
    pub suppressed_events: u64,
    pub empty_events: u64,
    pub dispatched_reactions: u64,
    pub suppression_rate: f64,
    pub intensity: StatsSummary,
    pub contact_counts: HashMap<String, u64>,
}

impl std::fmt::Display for RouteSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Routing Summary ===")?;
        writeln!(f, "Total events: {}", self.total_events)?;
        writeln!(f, "Routed events: {}", self.routed_events)?;
        writeln!(f, "Unmatched events: {}", self.unmatched_events)?;
        writeln!(
            f,
            "Suppressed events: {} ({:.2}%)",
            self.suppressed_events, self.suppression_rate
        )?;
        writeln!(f, "Events without arguments: {}", self.empty_events)?;
        writeln!(f, "Dispatched reactions: {}", self.dispatched_reactions)?;
        writeln!(f, "Intensity: {}", self.intensity)?;

        if !self.contact_counts.is_empty() {
            let mut counts: Vec<_> = self.contact_counts.iter().collect();
            counts.sort();
            writeln!(f, "Contact hits:")?;
            for (contact, count) in counts {
                writeln!(f, "  {}: {}", contact, count)?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
