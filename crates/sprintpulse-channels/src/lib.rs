//! # SprintPulse Channels
//!
//! Outbound messaging: Slack Block Kit payload builders for the sprint
//! summary and mid-sprint alert, plus the webhook that delivers them.

pub mod slack;
pub mod webhook;

pub use slack::{mid_sprint_alert_payload, sprint_summary_payload};
pub use webhook::WebhookSink;
