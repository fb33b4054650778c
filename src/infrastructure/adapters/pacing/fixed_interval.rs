//! Fixed Interval Pacer
//!
//! 上一次成功调用完成后至少间隔 `delay` 才允许下一次调用；失败的调用不计时

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::application::ports::PacerPort;

pub struct FixedIntervalPacer {
    delay: Duration,
    last_success: Mutex<Option<Instant>>,
}

impl FixedIntervalPacer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_success: Mutex::new(None),
        }
    }

    fn next_allowed(&self) -> Option<Instant> {
        let last = *self.last_success.lock().unwrap_or_else(|e| e.into_inner());
        last.map(|at| at + self.delay)
    }
}

#[async_trait]
impl PacerPort for FixedIntervalPacer {
    async fn wait_turn(&self) {
        if self.delay.is_zero() {
            return;
        }
        if let Some(deadline) = self.next_allowed() {
            if deadline > Instant::now() {
                tracing::trace!(wait_ms = (deadline - Instant::now()).as_millis() as u64, "Pacing");
                tokio::time::sleep_until(deadline).await;
            }
        }
    }

    fn record_success(&self) {
        *self.last_success.lock().unwrap_or_else(|e| e.into_inner()) = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_first_call_does_not_wait() {
        let pacer = FixedIntervalPacer::new(Duration::from_millis(5500));
        let start = Instant::now();
        pacer.wait_turn().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_full_delay_after_success() {
        let pacer = FixedIntervalPacer::new(Duration::from_millis(5500));
        pacer.record_success();

        let start = Instant::now();
        pacer.wait_turn().await;
        assert!(start.elapsed() >= Duration::from_millis(5500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_elapsed_time_counts_toward_delay() {
        let pacer = FixedIntervalPacer::new(Duration::from_secs(5));
        pacer.record_success();
        tokio::time::sleep(Duration::from_secs(3)).await;

        let start = Instant::now();
        pacer.wait_turn().await;
        let waited = start.elapsed();
        assert!(waited >= Duration::from_secs(2));
        assert!(waited < Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_reset_the_clock() {
        let pacer = FixedIntervalPacer::new(Duration::from_secs(5));
        // 没有成功记录：多次 wait_turn 都不等待
        let start = Instant::now();
        pacer.wait_turn().await;
        pacer.wait_turn().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
