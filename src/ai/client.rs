use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::BoxStream;
use thiserror::Error;

use crate::types::{GeneratedDesign, RoomType, SourceImage};

use super::providers::GeminiClient;

// ============================================
// Fixed strings
// ============================================

/// System instruction for the chat persona.
pub const PERSONA: &str = r#"You are Decora, a friendly and knowledgeable AI interior design assistant from Exceldes. Your tone is warm, professional, creative, and encouraging. Your primary goal is to provide helpful, inspiring, and practical advice on interior design.

When a user asks about the price of items in a design or where to buy them, you have new capabilities:
1.  **Pricing:** Provide estimated prices in Indian Rupees (INR). Always explicitly state that these are *estimates* and actual prices can vary based on brand, material, and retailer. For example, say "A sofa like that could range from ₹30,000 to ₹70,000..."
2.  **Sourcing (India-Centric):** Provide suggestions for where users can find similar items. Your recommendations should be tailored to India and, if possible, specific major cities like Delhi, Mumbai, and Bangalore.
    *   **Online Stores:** Frequently mention popular Indian online furniture stores like Pepperfry, Urban Ladder, WoodenStreet, and home decor sections of Amazon India or Flipkart.
    *   **Physical Stores (City-Specific):**
        *   **For Delhi:** Suggest exploring Kirti Nagar for a wide variety of furniture, Fabindia or Westside for decor, and luxury options at places like DLF Emporio.
        *   **For Mumbai:** Suggest browsing stores in Raghuvanshi Mills for high-end options, exploring boutiques in Bandra, or checking out chains like Home Centre.
        *   **For Bangalore:** Suggest looking around Infantry Road for furniture showrooms, Jayanagar for a mix of shops, or visiting stores like IKEA.
3.  **Disclaimer:** Always conclude your pricing and sourcing advice with a friendly disclaimer. For example: "Remember, these are just suggestions to get you started! I recommend checking the stores' websites or visiting them for the latest prices and availability."

Do not mention you are a language model. Focus on being a helpful design assistant for an Indian audience."#;

/// First assistant message in every chat thread.
pub const GREETING: &str = "Hello! I'm Decora, your AI design assistant. How can I inspire you today? Feel free to ask about styles, colors, or anything else about interior design!";

/// Shown in place of a reply when the stream fails.
pub const CHAT_APOLOGY: &str =
    "I seem to be having trouble right now. Please try again later.";

/// Shown when generation is attempted with incomplete input.
pub const VALIDATION_MESSAGE: &str =
    "Please select a room type, upload an image, and choose a style.";

/// Fallback when a generation failure carries no message of its own.
pub const GENERIC_GENERATION_ERROR: &str =
    "Failed to generate design ideas. Please try again.";

/// Prompt handed to the vision model: analyze the photo and synthesize the
/// prompt the image model will render from.
pub fn design_prompt(room_type: RoomType, style: &str) -> String {
    format!(
        "Analyze the attached image of a {room_type}. Based on this room's layout (including \
         windows, doors, and structural elements), generate a detailed, descriptive prompt for an \
         image generation AI. The goal is to create a photorealistic image of the same \
         {room_type} redesigned in a \"{style}\" style. The prompt should vividly describe new \
         furniture, a cohesive color palette, appropriate lighting, textures, and decor elements \
         appropriate for a {room_type}. The prompt must be creative, detailed, and focus on \
         creating an aspirational yet achievable design. Output ONLY the generated prompt, with \
         no extra text, labels or introduction."
    )
}

// ============================================
// Error Types
// ============================================

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("{0}")]
    Malformed(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

/// A lazy, finite, non-restartable sequence of reply fragments. Consumers
/// concatenate fragments in delivery order; an `Err` item ends the reply.
pub type FragmentStream = BoxStream<'static, ClientResult<String>>;

// ============================================
// Client traits
// ============================================

/// One-shot design generation: photo in, description plus rendered image out.
#[async_trait]
pub trait DesignClient: Send + Sync {
    async fn generate(
        &self,
        image: &SourceImage,
        room_type: RoomType,
        style: &str,
    ) -> ClientResult<GeneratedDesign>;
}

/// Opens persona-configured chat sessions.
pub trait ChatClient: Send + Sync {
    fn open_session(&self) -> Arc<dyn ChatSession>;
}

/// One remote conversation context. The session owns its history; each send
/// yields a fragment stream for that turn only.
#[async_trait]
pub trait ChatSession: Send + Sync {
    async fn send_streaming(&self, text: &str) -> ClientResult<FragmentStream>;
}

// ============================================
// Provider-backed client
// ============================================

/// Unified AI client wrapper for Decora, backed by the Gemini REST API.
pub struct DecoraAI {
    gemini: GeminiClient,
}

impl DecoraAI {
    /// Create the client from environment configuration. Fails when no API
    /// credential is present, which callers treat as fatal at startup.
    pub fn from_env() -> Result<Self> {
        let gemini = GeminiClient::from_env()?;
        Ok(Self { gemini })
    }
}

#[async_trait]
impl DesignClient for DecoraAI {
    async fn generate(
        &self,
        image: &SourceImage,
        room_type: RoomType,
        style: &str,
    ) -> ClientResult<GeneratedDesign> {
        // Step 1: synthesize an image-generation prompt from the photo.
        let description = self.gemini.describe_room(image, room_type, style).await?;
        if description.trim().is_empty() {
            return Err(ClientError::Malformed(
                "Failed to generate a design description.".into(),
            ));
        }
        tracing::debug!(chars = description.len(), "design description synthesized");

        // Step 2: render the redesigned room from that prompt.
        let image_url = self.gemini.render_design(&description).await?;

        Ok(GeneratedDesign {
            description,
            image_url,
        })
    }
}

impl ChatClient for DecoraAI {
    fn open_session(&self) -> Arc<dyn ChatSession> {
        Arc::new(self.gemini.open_chat(PERSONA))
    }
}
