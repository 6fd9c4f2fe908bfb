//! Prometheus metrics collection for gamechat.
//!
//! Tracks command throughput and latency, permission denials, membership
//! churn, and message fan-out. The host is expected to expose the registry
//! on whatever metrics endpoint it already serves.

use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec,
    Opts, Registry,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Total chat messages dispatched to a channel.
pub static MESSAGES_DISPATCHED: OnceLock<IntCounter> = OnceLock::new();

/// Total individual deliveries that failed (recipient unreachable).
pub static DELIVERIES_FAILED: OnceLock<IntCounter> = OnceLock::new();

/// Total channel joins (explicit, default, and auto-join-on-speak).
pub static CHANNEL_JOINS: OnceLock<IntCounter> = OnceLock::new();

/// Total channel leaves.
pub static CHANNEL_LEAVES: OnceLock<IntCounter> = OnceLock::new();

/// Permission denials by capability kind (read/write/leave).
pub static PERMISSION_DENIED: OnceLock<IntCounterVec> = OnceLock::new();

/// Commands processed by name.
pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();

/// Command errors by name and error code.
pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Gauges and histograms
// ========================================================================

/// Players with live channel state.
pub static TRACKED_PLAYERS: OnceLock<IntGauge> = OnceLock::new();

/// Channel member counts.
pub static CHANNEL_MEMBERS: OnceLock<IntGaugeVec> = OnceLock::new();

/// Command processing latency by name.
pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();

/// Message fan-out: how many recipients per dispatched message.
pub static MESSAGE_FANOUT: OnceLock<Histogram> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Must be called once at startup before any metrics are recorded.
pub fn init() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            let m = $init.expect(concat!(stringify!($metric), " creation failed"));
            if let Err(e) = r.register(Box::new(m.clone())) {
                tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
            }
            let _ = $metric.set(m);
        };
    }

    register!(MESSAGES_DISPATCHED, IntCounter::new("chat_messages_dispatched_total", "Chat messages dispatched to a channel"));
    register!(DELIVERIES_FAILED, IntCounter::new("chat_deliveries_failed_total", "Individual message deliveries that failed"));
    register!(CHANNEL_JOINS, IntCounter::new("chat_channel_joins_total", "Channel joins"));
    register!(CHANNEL_LEAVES, IntCounter::new("chat_channel_leaves_total", "Channel leaves"));
    register!(PERMISSION_DENIED, IntCounterVec::new(Opts::new("chat_permission_denied_total", "Permission denials by capability kind"), &["capability"]));
    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("chat_command_total", "Chat commands processed by name"), &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("chat_command_errors_total", "Chat command errors by name and code"), &["command", "error"]));
    register!(TRACKED_PLAYERS, IntGauge::new("chat_tracked_players", "Players with live channel state"));
    register!(CHANNEL_MEMBERS, IntGaugeVec::new(Opts::new("chat_channel_members", "Members per channel"), &["channel"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("chat_command_duration_seconds", "Chat command latency by name")
            .buckets(vec![0.00005, 0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05]),
        &["command"]));
    register!(MESSAGE_FANOUT, Histogram::with_opts(
        HistogramOpts::new("chat_message_fanout", "Recipients per dispatched message")
            .buckets(vec![1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0, 500.0])));
}

// ============================================================================
// Helper functions for metric updates
// ============================================================================

/// Record a command execution with latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

/// Record a command error.
#[inline]
pub fn record_command_error(command: &str, error: &str) {
    if let Some(c) = COMMAND_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}

/// Record a permission denial by capability kind.
#[inline]
pub fn record_permission_denied(capability: &str) {
    if let Some(c) = PERMISSION_DENIED.get() {
        c.with_label_values(&[capability]).inc();
    }
}

/// Record a channel join.
#[inline]
pub fn record_join() {
    if let Some(c) = CHANNEL_JOINS.get() {
        c.inc();
    }
}

/// Record a channel leave.
#[inline]
pub fn record_leave() {
    if let Some(c) = CHANNEL_LEAVES.get() {
        c.inc();
    }
}

/// Record a dispatched message and its fan-out.
#[inline]
pub fn record_dispatch(recipients: usize) {
    if let Some(c) = MESSAGES_DISPATCHED.get() {
        c.inc();
    }
    if let Some(h) = MESSAGE_FANOUT.get() {
        h.observe(recipients as f64);
    }
}

/// Record one failed delivery.
#[inline]
pub fn record_delivery_failure() {
    if let Some(c) = DELIVERIES_FAILED.get() {
        c.inc();
    }
}

/// Update a channel's member count gauge.
#[inline]
pub fn set_channel_members(channel: &str, count: i64) {
    if let Some(g) = CHANNEL_MEMBERS.get() {
        g.with_label_values(&[channel]).set(count);
    }
}

#[inline]
pub fn inc_tracked_players() {
    if let Some(g) = TRACKED_PLAYERS.get() {
        g.inc();
    }
}

#[inline]
pub fn dec_tracked_players() {
    if let Some(g) = TRACKED_PLAYERS.get() {
        g.dec();
    }
}
