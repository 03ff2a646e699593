use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single turn in the chat thread. `text` is mutated in place while the
/// assistant reply is still streaming.
#[derive(Clone, Debug, PartialEq)]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub text: String,
    pub created_at: Option<OffsetDateTime>,
}

/// The space categories a user can redesign.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomType {
    Bedroom,
    LivingRoom,
    DiningRoom,
    Kitchen,
    Office,
    Bathroom,
}

impl RoomType {
    pub const ALL: [RoomType; 6] = [
        RoomType::Bedroom,
        RoomType::LivingRoom,
        RoomType::DiningRoom,
        RoomType::Kitchen,
        RoomType::Bathroom,
        RoomType::Office,
    ];

    /// Human label, as shown in the UI and sent to the provider.
    pub fn label(&self) -> &'static str {
        match self {
            RoomType::Bedroom => "Bedroom",
            RoomType::LivingRoom => "Living Room",
            RoomType::DiningRoom => "Dining Room",
            RoomType::Kitchen => "Kitchen",
            RoomType::Office => "Office",
            RoomType::Bathroom => "Bathroom",
        }
    }
}

impl std::fmt::Display for RoomType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Preset aesthetics offered as quick picks; free text is also accepted.
pub const DESIGN_STYLES: &[&str] = &[
    "Modern Minimalist",
    "Bohemian",
    "Scandinavian",
    "Industrial",
    "Coastal",
    "Mid-Century Modern",
];

/// Where the design flow currently is in its lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    Initial,
    Preview,
    Loading,
    Result,
    Error,
}

const FALLBACK_MIME: &str = "image/jpeg";

/// The user's uploaded room photo, held in memory for the session.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

impl SourceImage {
    pub fn new(bytes: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes,
            mime_type: mime_type.into(),
        }
    }

    /// Encode as a `data:` URI for previews and inline provider upload.
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type,
            BASE64.encode(&self.bytes)
        )
    }

    /// Base64 payload without the URI header.
    pub fn base64_data(&self) -> String {
        BASE64.encode(&self.bytes)
    }

    /// Parse a `data:mime/type;base64,...` string. A malformed header falls
    /// back to `image/jpeg` rather than rejecting the payload.
    pub fn from_data_uri(uri: &str) -> Option<Self> {
        let (header, payload) = uri.split_once(";base64,")?;
        let mime_type = match header.split_once(':') {
            Some(("data", mime)) if !mime.is_empty() => mime.to_string(),
            _ => FALLBACK_MIME.to_string(),
        };
        let bytes = BASE64.decode(payload.trim()).ok()?;
        Some(Self { bytes, mime_type })
    }
}

/// Combined result of one generation call.
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedDesign {
    pub description: String,
    /// JPEG data URI ready for an `img` tag.
    pub image_url: String,
}

/// Guess a MIME type from a file name; the picker already filters to images,
/// so an unknown extension falls back to JPEG.
pub fn mime_from_file_name(name: &str) -> &'static str {
    let lowered = name.to_ascii_lowercase();
    if lowered.ends_with(".png") {
        "image/png"
    } else if lowered.ends_with(".webp") {
        "image/webp"
    } else {
        FALLBACK_MIME
    }
}
