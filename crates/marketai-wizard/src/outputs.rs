use crate::draft::{CreationMethod, OutputIndex, PostDraft};

/// Backgrounds of the three candidates, by index.
pub const GRADIENTS: [&str; OutputIndex::COUNT] = [
    "linear-gradient(135deg, #667eea 0%, #764ba2 100%)",
    "linear-gradient(135deg, #f093fb 0%, #f5576c 100%)",
    "linear-gradient(135deg, #4facfe 0%, #00f2fe 100%)",
];

const AI_BOTTOM_TEXT: [&str; OutputIndex::COUNT] = ["Limited Time!", "Don't Miss Out!", "Shop Now!"];
const ENHANCED_LABELS: [&str; OutputIndex::COUNT] =
    ["Enhanced Version", "Styled Version", "Premium Version"];

const DEFAULT_COMPANY_NAME: &str = "Your Business";
const DEFAULT_MAIN_TEXT: &str = "Your amazing offer";
const DEFAULT_ENHANCED_TEXT: &str = "Enhanced Image";

/// One design option offered in the output selection step.
///
/// Company fields and `bottom_text` are only set on the AI-generated path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputCandidate {
    pub gradient: &'static str,
    pub company_name: Option<String>,
    pub company_phone: Option<String>,
    pub main_text: String,
    pub bottom_text: Option<&'static str>,
}

/// Derive the three candidates from the draft. Pure; call again after every
/// edit rather than caching.
pub fn compute_outputs(draft: &PostDraft) -> [OutputCandidate; OutputIndex::COUNT] {
    std::array::from_fn(|i| match draft.creation_method() {
        Some(CreationMethod::AiGenerated) => OutputCandidate {
            gradient: GRADIENTS[i],
            company_name: Some(
                draft
                    .company_name()
                    .unwrap_or(DEFAULT_COMPANY_NAME)
                    .to_string(),
            ),
            company_phone: Some(draft.company_phone().unwrap_or_default().to_string()),
            main_text: draft.description().unwrap_or(DEFAULT_MAIN_TEXT).to_string(),
            bottom_text: Some(AI_BOTTOM_TEXT[i]),
        },
        // Anything other than the AI path renders as an enhanced upload.
        Some(CreationMethod::UploadEnhance) | None => OutputCandidate {
            gradient: GRADIENTS[i],
            company_name: None,
            company_phone: None,
            main_text: match draft.image_edit_description() {
                Some(_) => ENHANCED_LABELS[i].to_string(),
                None => DEFAULT_ENHANCED_TEXT.to_string(),
            },
            bottom_text: None,
        },
    })
}
