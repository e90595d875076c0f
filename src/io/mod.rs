/// CSV export of cycle telemetry and request outcomes.
pub mod export;
