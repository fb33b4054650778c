//! Pacing Adapter - 调用节流

mod fixed_interval;

pub use fixed_interval::FixedIntervalPacer;
