//! HTTP Synthesis Client - 调用外部语音合成服务
//!
//! 实现 SynthesisPort trait，鉴权方式为 `xi-api-key` 请求头
//!
//! 外部 API:
//! GET  {base}/v1/voices                    -> {"voices": [{"name", "voice_id"}, ...]}
//! POST {base}/v1/text-to-speech/{voice_id} -> audio/mpeg binary

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::application::ports::{SynthesisError, SynthesisPort, SynthesisRequest};

const API_KEY_HEADER: &str = "xi-api-key";

/// 合成请求体 (JSON)
#[derive(Debug, Serialize)]
struct SpeechHttpRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettingsBody,
}

#[derive(Debug, Serialize)]
struct VoiceSettingsBody {
    stability: f32,
    similarity_boost: f32,
    style: u8,
    use_speaker_boost: bool,
}

#[derive(Debug, Deserialize)]
struct VoicesHttpResponse {
    #[serde(default)]
    voices: Vec<VoiceEntry>,
}

#[derive(Debug, Deserialize)]
struct VoiceEntry {
    name: String,
    voice_id: String,
}

/// HTTP 合成客户端配置
#[derive(Debug, Clone)]
pub struct HttpSynthesisClientConfig {
    /// 服务基础 URL
    pub base_url: String,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpSynthesisClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.elevenlabs.io".to_string(),
            timeout_secs: 120,
        }
    }
}

impl HttpSynthesisClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP 合成客户端
pub struct HttpSynthesisClient {
    client: Client,
    config: HttpSynthesisClientConfig,
}

impl HttpSynthesisClient {
    pub fn new(config: HttpSynthesisClientConfig) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesisError::Transport(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn base(&self) -> &str {
        self.config.base_url.trim_end_matches('/')
    }

    fn voices_url(&self) -> String {
        format!("{}/v1/voices", self.base())
    }

    fn speech_url(&self, voice_id: &str) -> String {
        format!("{}/v1/text-to-speech/{}", self.base(), voice_id)
    }
}

#[async_trait]
impl SynthesisPort for HttpSynthesisClient {
    async fn list_voices(&self, api_key: &str) -> BTreeMap<String, String> {
        let response = match self
            .client
            .get(self.voices_url())
            .header(API_KEY_HEADER, api_key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "Voice listing request failed");
                return BTreeMap::new();
            }
        };

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "Voice listing rejected");
            return BTreeMap::new();
        }

        match response.json::<VoicesHttpResponse>().await {
            Ok(body) => body
                .voices
                .into_iter()
                .map(|voice| (voice.name, voice.voice_id))
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "Voice listing returned an unreadable body");
                BTreeMap::new()
            }
        }
    }

    async fn synthesize(&self, request: &SynthesisRequest) -> Result<Vec<u8>, SynthesisError> {
        let body = SpeechHttpRequest {
            text: &request.text,
            model_id: &request.model_id,
            voice_settings: VoiceSettingsBody {
                stability: request.voice.stability,
                similarity_boost: request.voice.similarity,
                style: 0,
                use_speaker_boost: request.voice.use_speaker_boost,
            },
        };

        tracing::debug!(
            voice_id = %request.voice_id,
            text_len = request.text.chars().count(),
            "Sending synthesis request"
        );

        let response = self
            .client
            .post(self.speech_url(&request.voice_id))
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .header(API_KEY_HEADER, &request.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SynthesisError::Transport(format!("Request timed out: {}", e))
                } else if e.is_connect() {
                    SynthesisError::Transport(format!("Cannot connect to provider: {}", e))
                } else {
                    SynthesisError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(SynthesisError::Provider {
                status: status.as_u16(),
            });
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::Transport(format!("Failed to read audio: {}", e)))?
            .to_vec();

        tracing::debug!(audio_size = audio.len(), "Synthesis completed");
        Ok(audio)
    }
}
