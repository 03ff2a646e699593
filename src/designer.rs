//! Design flow state machine.
//!
//! `DesignSession` owns all state for the room-redesign flow and exposes
//! explicit transition functions so the flow is testable without a rendering
//! surface. The view layer performs the actual remote call: `begin_generate`
//! hands it a `GenerationRequest`, and the awaited outcome comes back through
//! `complete_generate`.

use thiserror::Error;

use crate::ai::{ClientError, GENERIC_GENERATION_ERROR, VALIDATION_MESSAGE};
use crate::types::{GeneratedDesign, RoomType, SourceImage, Stage};

/// Payload for exactly one generation call.
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationRequest {
    pub image: SourceImage,
    pub room_type: RoomType,
    pub style: String,
}

/// Why `begin_generate` refused to start a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GenerateBlocked {
    /// A request is already in flight; the call is a no-op.
    #[error("a generation request is already in flight")]
    InFlight,
    /// Required input missing; the session has moved to the error stage.
    #[error("room type, photo, and style must all be set before generating")]
    MissingInput,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DesignSession {
    room_type: Option<RoomType>,
    source_image: Option<SourceImage>,
    style_prompt: String,
    stage: Stage,
    result_image: Option<String>,
    error_message: Option<String>,
}

impl DesignSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn room_type(&self) -> Option<RoomType> {
        self.room_type
    }

    pub fn source_image(&self) -> Option<&SourceImage> {
        self.source_image.as_ref()
    }

    pub fn style_prompt(&self) -> &str {
        &self.style_prompt
    }

    pub fn result_image(&self) -> Option<&str> {
        self.result_image.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Valid in any stage; selection alone never transitions.
    pub fn select_room_type(&mut self, room_type: RoomType) {
        self.room_type = Some(room_type);
    }

    /// A successfully decoded photo moves the flow to the preview stage.
    pub fn upload_photo(&mut self, image: SourceImage) {
        self.source_image = Some(image);
        self.stage = Stage::Preview;
    }

    /// Preset pick or free text; whitespace-only input counts as unset.
    pub fn select_style(&mut self, style: impl Into<String>) {
        self.style_prompt = style.into().trim().to_string();
    }

    /// Validate inputs and move to the loading stage. On success the caller
    /// must issue exactly one remote call and report back through
    /// [`complete_generate`](Self::complete_generate).
    pub fn begin_generate(&mut self) -> Result<GenerationRequest, GenerateBlocked> {
        if self.stage == Stage::Loading {
            return Err(GenerateBlocked::InFlight);
        }

        let (Some(image), Some(room_type)) = (self.source_image.clone(), self.room_type) else {
            self.fail(VALIDATION_MESSAGE.to_string());
            return Err(GenerateBlocked::MissingInput);
        };
        if self.style_prompt.is_empty() {
            self.fail(VALIDATION_MESSAGE.to_string());
            return Err(GenerateBlocked::MissingInput);
        }

        self.stage = Stage::Loading;
        self.result_image = None;
        self.error_message = None;
        Ok(GenerationRequest {
            image,
            room_type,
            style: self.style_prompt.clone(),
        })
    }

    /// Apply the outcome of the in-flight request. Ignored unless the session
    /// is actually loading, so a stale resolution cannot clobber a reset flow.
    pub fn complete_generate(&mut self, outcome: Result<GeneratedDesign, ClientError>) {
        if self.stage != Stage::Loading {
            return;
        }
        match outcome {
            Ok(design) => {
                self.result_image = Some(design.image_url);
                self.stage = Stage::Result;
            }
            Err(err) => {
                let message = err.to_string();
                let message = if message.is_empty() {
                    GENERIC_GENERATION_ERROR.to_string()
                } else {
                    message
                };
                self.fail(message);
            }
        }
    }

    /// Keep the photo and room type, go back to preview for a new style.
    pub fn try_another_style(&mut self) {
        if self.stage != Stage::Result {
            return;
        }
        self.result_image = None;
        self.error_message = None;
        self.stage = Stage::Preview;
    }

    /// Clear the whole session from a terminal stage.
    pub fn start_over(&mut self) {
        if !matches!(self.stage, Stage::Result | Stage::Error) {
            return;
        }
        *self = Self::default();
    }

    fn fail(&mut self, message: String) {
        self.result_image = None;
        self.error_message = Some(message);
        self.stage = Stage::Error;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo() -> SourceImage {
        SourceImage::new(vec![0xFF, 0xD8, 0xFF], "image/jpeg")
    }

    fn ready_session() -> DesignSession {
        let mut session = DesignSession::new();
        session.select_room_type(RoomType::Kitchen);
        session.upload_photo(photo());
        session.select_style("Coastal");
        session
    }

    #[test]
    fn upload_moves_to_preview() {
        let mut session = DesignSession::new();
        assert_eq!(session.stage(), Stage::Initial);
        session.upload_photo(photo());
        assert_eq!(session.stage(), Stage::Preview);
        assert!(session.source_image().is_some());
    }

    #[test]
    fn generate_without_inputs_is_a_validation_error() {
        let mut session = DesignSession::new();
        session.select_room_type(RoomType::Bedroom);

        let blocked = session.begin_generate().unwrap_err();
        assert_eq!(blocked, GenerateBlocked::MissingInput);
        assert_eq!(session.stage(), Stage::Error);
        assert_eq!(session.error_message(), Some(VALIDATION_MESSAGE));
    }

    #[test]
    fn whitespace_style_counts_as_unset() {
        let mut session = ready_session();
        session.select_style("   ");
        assert!(session.begin_generate().is_err());
        assert_eq!(session.stage(), Stage::Error);
    }

    #[test]
    fn begin_generate_yields_the_request_payload() {
        let mut session = ready_session();
        let request = session.begin_generate().expect("valid inputs");
        assert_eq!(session.stage(), Stage::Loading);
        assert_eq!(request.room_type, RoomType::Kitchen);
        assert_eq!(request.style, "Coastal");
        assert_eq!(request.image, photo());
    }

    #[test]
    fn second_generate_while_loading_is_rejected() {
        let mut session = ready_session();
        session.begin_generate().expect("first request");
        assert_eq!(
            session.begin_generate().unwrap_err(),
            GenerateBlocked::InFlight
        );
        // Still loading, no error surfaced.
        assert_eq!(session.stage(), Stage::Loading);
        assert!(session.error_message().is_none());
    }

    #[test]
    fn success_lands_in_result_with_the_image() {
        let mut session = ready_session();
        session.begin_generate().expect("request");
        session.complete_generate(Ok(GeneratedDesign {
            description: "a calm coastal kitchen".into(),
            image_url: "data:image/jpeg;base64,AAAA".into(),
        }));
        assert_eq!(session.stage(), Stage::Result);
        assert_eq!(session.result_image(), Some("data:image/jpeg;base64,AAAA"));
        assert!(session.error_message().is_none());
    }

    #[test]
    fn failure_lands_in_error_with_the_message() {
        let mut session = ready_session();
        session.begin_generate().expect("request");
        session.complete_generate(Err(ClientError::Malformed(
            "no image candidates returned".into(),
        )));
        assert_eq!(session.stage(), Stage::Error);
        assert_eq!(session.error_message(), Some("no image candidates returned"));
        assert!(session.result_image().is_none());
    }

    #[test]
    fn try_another_style_keeps_photo_and_room() {
        let mut session = ready_session();
        session.begin_generate().expect("request");
        session.complete_generate(Ok(GeneratedDesign {
            description: String::new(),
            image_url: "data:image/jpeg;base64,AAAA".into(),
        }));

        session.try_another_style();
        assert_eq!(session.stage(), Stage::Preview);
        assert_eq!(session.room_type(), Some(RoomType::Kitchen));
        assert!(session.source_image().is_some());
        assert!(session.result_image().is_none());
        assert!(session.error_message().is_none());
    }

    #[test]
    fn try_another_style_is_a_noop_outside_result() {
        let mut session = ready_session();
        session.try_another_style();
        assert_eq!(session.stage(), Stage::Preview);
        assert!(session.source_image().is_some());
    }

    #[test]
    fn start_over_clears_everything_from_terminal_stages() {
        let mut session = ready_session();
        session.begin_generate().expect("request");
        session.complete_generate(Err(ClientError::Malformed("boom".into())));
        assert_eq!(session.stage(), Stage::Error);

        session.start_over();
        assert_eq!(session, DesignSession::default());
        assert_eq!(session.stage(), Stage::Initial);
    }

    #[test]
    fn start_over_is_gated_to_terminal_stages() {
        let mut session = ready_session();
        session.start_over();
        // Preview is not terminal, so the photo survives.
        assert!(session.source_image().is_some());
    }

    #[test]
    fn stale_completion_after_reset_is_ignored() {
        let mut session = ready_session();
        session.begin_generate().expect("request");
        session.complete_generate(Err(ClientError::Malformed("boom".into())));
        session.start_over();

        session.complete_generate(Ok(GeneratedDesign {
            description: String::new(),
            image_url: "data:image/jpeg;base64,BBBB".into(),
        }));
        assert_eq!(session.stage(), Stage::Initial);
        assert!(session.result_image().is_none());
    }
}
