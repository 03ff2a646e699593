use std::env;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;
use futures::channel::mpsc::{UnboundedSender, unbounded};
use serde::{Deserialize, Serialize};

use crate::ai::client::{ChatSession, ClientError, ClientResult, FragmentStream};
use crate::types::{RoomType, SourceImage};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
const DEFAULT_IMAGE_MODEL: &str = "imagen-3.0-generate-002";
const FALLBACK_IMAGE_MIME: &str = "image/jpeg";

/// Custom client for the Gemini REST endpoints. One instance serves both the
/// design flow (generateContent + Imagen predict) and chat (SSE streaming).
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    text_model: String,
    image_model: String,
}

// Gemini wire types

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl Content {
    fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("user".into()),
            parts: vec![Part::text(text)],
        }
    }

    fn model_text(text: impl Into<String>) -> Self {
        Self {
            role: Some("model".into()),
            parts: vec![Part::text(text)],
        }
    }

    fn joined_text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect()
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
    #[serde(
        rename = "inlineData",
        alias = "inline_data",
        skip_serializing_if = "Option::is_none",
        default
    )]
    inline_data: Option<InlineData>,
}

impl Part {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            inline_data: None,
        }
    }

    fn inline_image(image: &SourceImage) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: image.mime_type.clone(),
                data: image.base64_data(),
            }),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct InlineData {
    #[serde(rename = "mimeType", alias = "mime_type")]
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<Content>,
}

// Imagen predict types

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: [PredictInstance<'a>; 1],
    parameters: PredictParameters,
}

#[derive(Serialize)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
struct PredictParameters {
    #[serde(rename = "sampleCount")]
    sample_count: u32,
    #[serde(rename = "aspectRatio")]
    aspect_ratio: &'static str,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64_encoded: Option<String>,
    #[serde(rename = "mimeType")]
    mime_type: Option<String>,
}

impl GeminiClient {
    /// Read configuration from the environment. `GEMINI_API_KEY` (or the
    /// legacy `API_KEY`) is required; endpoint and model names can be
    /// overridden for staging setups.
    pub fn from_env() -> ClientResult<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .map_err(|_| ClientError::MissingApiKey)?;

        Ok(Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            text_model: env::var("GEMINI_TEXT_MODEL")
                .unwrap_or_else(|_| DEFAULT_TEXT_MODEL.to_string()),
            image_model: env::var("GEMINI_IMAGE_MODEL")
                .unwrap_or_else(|_| DEFAULT_IMAGE_MODEL.to_string()),
        })
    }

    fn model_url(&self, model: &str, action: &str) -> String {
        format!("{}/models/{}:{}", self.base_url, model, action)
    }

    async fn post_json<B: Serialize>(&self, url: &str, body: &B) -> ClientResult<String> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                body: text,
            });
        }
        Ok(text)
    }

    /// Analyze the uploaded photo and return the synthesized
    /// image-generation prompt.
    pub async fn describe_room(
        &self,
        image: &SourceImage,
        room_type: RoomType,
        style: &str,
    ) -> ClientResult<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: Some("user".into()),
                parts: vec![
                    Part::text(crate::ai::design_prompt(room_type, style)),
                    Part::inline_image(image),
                ],
            }],
            system_instruction: None,
        };

        let url = self.model_url(&self.text_model, "generateContent");
        let body = self.post_json(&url, &request).await?;
        let parsed: GenerateContentResponse = serde_json::from_str(&body)
            .map_err(|err| ClientError::Malformed(format!("unexpected response shape: {err}")))?;

        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| content.joined_text())
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(ClientError::Malformed(
                "Failed to generate a design description.".into(),
            ));
        }
        Ok(text)
    }

    /// Render the redesigned room with Imagen and return it as a data URI.
    pub async fn render_design(&self, prompt: &str) -> ClientResult<String> {
        let request = PredictRequest {
            instances: [PredictInstance { prompt }],
            parameters: PredictParameters {
                sample_count: 1,
                aspect_ratio: "16:9",
            },
        };

        let url = self.model_url(&self.image_model, "predict");
        let body = self.post_json(&url, &request).await?;
        let parsed: PredictResponse = serde_json::from_str(&body)
            .map_err(|err| ClientError::Malformed(format!("unexpected response shape: {err}")))?;

        let Some(prediction) = parsed.predictions.into_iter().next() else {
            return Err(ClientError::Malformed("Failed to generate an image.".into()));
        };
        prediction_data_uri(prediction)
    }

    /// Open a conversation context configured with the given persona.
    pub fn open_chat(&self, system_instruction: &str) -> GeminiChatSession {
        GeminiChatSession {
            client: self.clone(),
            system_instruction: Content {
                role: None,
                parts: vec![Part::text(system_instruction)],
            },
            history: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

fn prediction_data_uri(prediction: Prediction) -> ClientResult<String> {
    let Some(data) = prediction.bytes_base64_encoded else {
        return Err(ClientError::Malformed("Failed to generate an image.".into()));
    };
    let mime = prediction
        .mime_type
        .filter(|mime| !mime.is_empty())
        .unwrap_or_else(|| FALLBACK_IMAGE_MIME.to_string());
    Ok(format!("data:{mime};base64,{data}"))
}

// ============================================
// Streaming chat session
// ============================================

/// A single remote conversation. History lives behind a mutex so the
/// completed assistant turn can be recorded when its stream finishes.
pub struct GeminiChatSession {
    client: GeminiClient,
    system_instruction: Content,
    history: Arc<Mutex<Vec<Content>>>,
}

#[async_trait]
impl ChatSession for GeminiChatSession {
    async fn send_streaming(&self, text: &str) -> ClientResult<FragmentStream> {
        let user_turn = Content::user_text(text);

        let mut contents = {
            let history = self.history.lock().expect("chat history poisoned");
            history.clone()
        };
        contents.push(user_turn.clone());

        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(self.system_instruction.clone()),
        };

        let url = self
            .client
            .model_url(&self.client.text_model, "streamGenerateContent?alt=sse");
        let client = self.client.clone();
        let history = Arc::clone(&self.history);
        let (tx, rx) = unbounded::<ClientResult<String>>();

        tokio::spawn(async move {
            match stream_reply(&client, &url, &request, &tx).await {
                Ok(full_reply) => {
                    let mut history = history.lock().expect("chat history poisoned");
                    history.push(user_turn);
                    history.push(Content::model_text(full_reply));
                }
                Err(err) => {
                    tracing::error!(error = %err, "chat stream failed");
                    let _ = tx.unbounded_send(Err(err));
                }
            }
        });

        Ok(rx.boxed())
    }
}

/// Consume the SSE response, forwarding each text fragment as it arrives.
/// Returns the concatenated reply for the session history.
async fn stream_reply(
    client: &GeminiClient,
    url: &str,
    request: &GenerateContentRequest,
    tx: &UnboundedSender<ClientResult<String>>,
) -> ClientResult<String> {
    let response = client
        .client
        .post(url)
        .header("x-goog-api-key", &client.api_key)
        .json(request)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await?;
        return Err(ClientError::Api {
            status: status.as_u16(),
            body,
        });
    }

    let mut bytes = response.bytes_stream();
    let mut buffer = String::new();
    let mut full_reply = String::new();

    while let Some(chunk) = bytes.next().await {
        let chunk = chunk?;
        buffer.push_str(&String::from_utf8_lossy(&chunk));
        for payload in drain_sse_data(&mut buffer) {
            forward_fragment(&payload, &mut full_reply, tx);
        }
    }

    // Flush a trailing event that arrived without a final newline.
    if !buffer.trim().is_empty() {
        buffer.push('\n');
        for payload in drain_sse_data(&mut buffer) {
            forward_fragment(&payload, &mut full_reply, tx);
        }
    }

    Ok(full_reply)
}

fn forward_fragment(
    payload: &str,
    full_reply: &mut String,
    tx: &UnboundedSender<ClientResult<String>>,
) {
    if let Some(fragment) = fragment_from_event(payload)
        && !fragment.is_empty()
    {
        full_reply.push_str(&fragment);
        // The receiver going away just means the UI stopped listening.
        let _ = tx.unbounded_send(Ok(fragment));
    }
}

/// Pull complete `data:` payloads out of the SSE buffer, leaving any partial
/// trailing line in place for the next chunk.
fn drain_sse_data(buffer: &mut String) -> Vec<String> {
    let mut payloads = Vec::new();
    while let Some(newline) = buffer.find('\n') {
        let line: String = buffer.drain(..=newline).collect();
        let line = line.trim();
        if let Some(data) = line.strip_prefix("data:") {
            let data = data.trim();
            if !data.is_empty() && data != "[DONE]" {
                payloads.push(data.to_string());
            }
        }
    }
    payloads
}

/// Extract the text delta carried by one streamed event.
fn fragment_from_event(payload: &str) -> Option<String> {
    let parsed: GenerateContentResponse = serde_json::from_str(payload).ok()?;
    let content = parsed.candidates.into_iter().next()?.content?;
    Some(content.joined_text())
}
