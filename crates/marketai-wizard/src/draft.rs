use base64::Engine;
use base64::engine::general_purpose::STANDARD as B64;

use marketai_types::Platform;
use marketai_types::api::SavePostRequest;

use crate::hashtags::Hashtags;

/// How the post's visual is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationMethod {
    AiGenerated,
    UploadEnhance,
}

impl CreationMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::AiGenerated => "AI-Generated Content",
            Self::UploadEnhance => "Upload & Enhance",
        }
    }
}

/// A user-supplied image file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl UploadedImage {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes,
        }
    }

    /// Standard base64, as expected by the image edit endpoint.
    pub fn to_base64(&self) -> String {
        B64.encode(&self.bytes)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AiInput {
    pub description: Option<String>,
    pub company_name: Option<String>,
    pub company_phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UploadInput {
    pub image: Option<UploadedImage>,
    pub edit_description: Option<String>,
}

/// Method-specific input. Only the chosen method's fields can exist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CreationInput {
    #[default]
    Unset,
    AiGenerated(AiInput),
    UploadEnhance(UploadInput),
}

/// Index into the three derived output candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OutputIndex(u8);

impl OutputIndex {
    pub const COUNT: usize = 3;

    pub fn new(index: usize) -> Option<Self> {
        (index < Self::COUNT).then_some(Self(index as u8))
    }

    pub fn get(self) -> usize {
        self.0 as usize
    }
}

/// The in-progress post.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostDraft {
    pub input: CreationInput,
    pub selected_output: Option<OutputIndex>,
    pub platform: Option<Platform>,
    pub hashtags: Hashtags,
    pub caption: Option<String>,
}

/// Empty text counts as absent.
pub(crate) fn present(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

impl PostDraft {
    pub fn creation_method(&self) -> Option<CreationMethod> {
        match self.input {
            CreationInput::Unset => None,
            CreationInput::AiGenerated(_) => Some(CreationMethod::AiGenerated),
            CreationInput::UploadEnhance(_) => Some(CreationMethod::UploadEnhance),
        }
    }

    fn ai(&self) -> Option<&AiInput> {
        match &self.input {
            CreationInput::AiGenerated(ai) => Some(ai),
            _ => None,
        }
    }

    fn upload(&self) -> Option<&UploadInput> {
        match &self.input {
            CreationInput::UploadEnhance(upload) => Some(upload),
            _ => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.ai().and_then(|ai| ai.description.as_deref())
    }

    pub fn company_name(&self) -> Option<&str> {
        self.ai().and_then(|ai| ai.company_name.as_deref())
    }

    pub fn company_phone(&self) -> Option<&str> {
        self.ai().and_then(|ai| ai.company_phone.as_deref())
    }

    pub fn uploaded_image(&self) -> Option<&UploadedImage> {
        self.upload().and_then(|u| u.image.as_ref())
    }

    pub fn image_edit_description(&self) -> Option<&str> {
        self.upload().and_then(|u| u.edit_description.as_deref())
    }

    /// Whether the method-specific input is complete enough to show outputs:
    /// a non-blank description, or an uploaded image.
    pub fn has_required_input(&self) -> bool {
        match &self.input {
            CreationInput::Unset => false,
            CreationInput::AiGenerated(ai) => {
                ai.description.as_deref().is_some_and(|d| !d.trim().is_empty())
            }
            CreationInput::UploadEnhance(upload) => upload.image.is_some(),
        }
    }

    /// Caption length in characters.
    pub fn caption_len(&self) -> usize {
        self.caption.as_deref().map_or(0, |c| c.chars().count())
    }

    /// Catalog request for this draft, or `None` until a platform is chosen.
    pub fn to_save_request(&self, image_url: &str) -> Option<SavePostRequest> {
        Some(SavePostRequest {
            platform: self.platform?,
            caption: self.caption.clone().unwrap_or_default(),
            hashtags: self.hashtags.to_vec(),
            image_url: image_url.to_string(),
        })
    }
}
