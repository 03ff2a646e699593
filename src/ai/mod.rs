/// AI module for Decora
///
/// Everything that talks to the remote model provider lives here. The rest of
/// the app depends only on the client traits, so tests substitute stub
/// clients without any process-wide state.
///
/// # Architecture
///
/// - `client` - trait seams (`DesignClient`, `ChatClient`, `ChatSession`),
///   error types, fixed prompt/message strings, and the `DecoraAI` wrapper
/// - `providers` - the Gemini REST implementation (vision description,
///   Imagen rendering, SSE chat streaming)
///
/// # Usage
///
/// ```rust,no_run
/// use decora::ai::{DecoraAI, DesignClient};
/// use decora::types::{RoomType, SourceImage};
///
/// # async fn example() -> anyhow::Result<()> {
/// let ai = DecoraAI::from_env()?;
/// let photo = SourceImage::new(vec![0xFF, 0xD8], "image/jpeg");
/// let design = ai.generate(&photo, RoomType::Kitchen, "Coastal").await?;
/// println!("{}", design.description);
/// # Ok(())
/// # }
/// ```
mod client;
mod providers;

// Re-export main types
pub use client::{
    CHAT_APOLOGY, ChatClient, ChatSession, ClientError, ClientResult, DecoraAI, DesignClient,
    FragmentStream, GENERIC_GENERATION_ERROR, GREETING, PERSONA, VALIDATION_MESSAGE, design_prompt,
};
