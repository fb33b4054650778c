//! Fake Synthesis Client - 用于测试和本地演示的合成客户端
//!
//! 不访问网络：按脚本依次返回预设结果，脚本耗尽后返回确定性的伪音频

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::application::ports::{SynthesisError, SynthesisPort, SynthesisRequest};

/// 单次合成的预设结果
#[derive(Debug, Clone)]
pub enum FakeOutcome {
    Audio(Vec<u8>),
    Status(u16),
    Transport(String),
}

impl FakeOutcome {
    pub fn audio(bytes: Vec<u8>) -> Self {
        Self::Audio(bytes)
    }

    pub fn status(status: u16) -> Self {
        Self::Status(status)
    }

    pub fn transport(reason: &str) -> Self {
        Self::Transport(reason.to_string())
    }

    fn into_result(self) -> Result<Vec<u8>, SynthesisError> {
        match self {
            Self::Audio(bytes) => Ok(bytes),
            Self::Status(status) => Err(SynthesisError::Provider { status }),
            Self::Transport(reason) => Err(SynthesisError::Transport(reason)),
        }
    }
}

/// Fake Synthesis Client 配置
#[derive(Debug, Clone, Default)]
pub struct FakeSynthesisClientConfig {
    /// 音色名称 -> 音色 ID（为空时音色列表不可用）
    pub voices: BTreeMap<String, String>,
}

/// Fake Synthesis Client
pub struct FakeSynthesisClient {
    config: FakeSynthesisClientConfig,
    script: Mutex<VecDeque<FakeOutcome>>,
    calls: AtomicUsize,
    listings: AtomicUsize,
}

impl FakeSynthesisClient {
    pub fn new(config: FakeSynthesisClientConfig) -> Self {
        Self {
            config,
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
            listings: AtomicUsize::new(0),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(FakeSynthesisClientConfig::default())
    }

    /// 追加预设结果，按调用顺序消费
    pub fn push_outcomes(&self, outcomes: impl IntoIterator<Item = FakeOutcome>) {
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        script.extend(outcomes);
    }

    /// 已发起的合成调用次数
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// 已发起的音色列表调用次数
    pub fn listings(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    fn placeholder_audio(request: &SynthesisRequest) -> Vec<u8> {
        format!("fake-audio:{}:{}", request.voice_id, request.text).into_bytes()
    }
}

#[async_trait]
impl SynthesisPort for FakeSynthesisClient {
    async fn list_voices(&self, _api_key: &str) -> BTreeMap<String, String> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        self.config.voices.clone()
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        tracing::debug!(
            voice_id = %request.voice_id,
            scripted = scripted.is_some(),
            "FakeSynthesisClient: returning canned outcome"
        );

        match scripted {
            Some(outcome) => outcome.into_result(),
            None => Ok(Self::placeholder_audio(request)),
        }
    }
}
