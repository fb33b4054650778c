//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：提交、恢复、关闭生成会话

mod generation_commands;

pub mod handlers;

pub use generation_commands::*;
