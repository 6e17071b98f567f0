//! Telegram adapter metric names.

/// Updates received from `getUpdates`.
pub const UPDATES_RECEIVED_TOTAL: &str = "hush_telegram_updates_received_total";
/// Failed `getUpdates` calls.
pub const POLLING_ERRORS_TOTAL: &str = "hush_telegram_polling_errors_total";
/// Requests retried after a `RetryAfter` response.
pub const RATE_LIMITED_TOTAL: &str = "hush_telegram_rate_limited_total";
/// Commands handled, labelled by `command`.
pub const COMMANDS_TOTAL: &str = "hush_telegram_commands_total";
