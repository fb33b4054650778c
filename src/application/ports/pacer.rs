//! Pacer Port - 调用节流
//!
//! 调度约束："下一次调用不得早于上一次成功调用完成后 D 秒开始"。
//! 以端口形式表达，便于将来替换为令牌桶限流器而不改变契约。

use async_trait::async_trait;

#[async_trait]
pub trait PacerPort: Send + Sync {
    /// 等待直到允许开始下一次调用
    async fn wait_turn(&self);

    /// 记录一次成功调用的完成时刻
    fn record_success(&self);
}
