//! Metric names recorded when the `metrics` feature is enabled.

/// Group messages inspected by the enforcement pipeline
pub const MESSAGES_INSPECTED_TOTAL: &str = "hush_messages_inspected_total";
/// Messages removed from silenced topics
pub const MESSAGES_REMOVED_TOTAL: &str = "hush_messages_removed_total";
/// Removals that failed at the transport
pub const REMOVAL_FAILURES_TOTAL: &str = "hush_removal_failures_total";
/// Warnings posted into silenced topics
pub const WARNINGS_SENT_TOTAL: &str = "hush_warnings_sent_total";
/// Warnings suppressed by the throttle
pub const WARNINGS_THROTTLED_TOTAL: &str = "hush_warnings_throttled_total";
/// Toggle commands by result (silenced, unsilenced, rejected, failed)
pub const TOGGLES_TOTAL: &str = "hush_toggles_total";
/// Membership lookups that failed
pub const AUTHORIZATION_FAILURES_TOTAL: &str = "hush_authorization_failures_total";
