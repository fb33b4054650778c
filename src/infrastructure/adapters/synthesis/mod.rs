//! Synthesis Adapter - 语音合成提供方客户端

mod fake_synthesis_client;
mod http_synthesis_client;

pub use fake_synthesis_client::{FakeOutcome, FakeSynthesisClient, FakeSynthesisClientConfig};
pub use http_synthesis_client::*;
