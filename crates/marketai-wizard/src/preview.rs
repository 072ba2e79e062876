use marketai_types::Platform;

use crate::draft::PostDraft;
use crate::outputs::GRADIENTS;

const DEFAULT_ACCOUNT_NAME: &str = "Your Company";
const DEFAULT_HANDLE: &str = "company";
const DEFAULT_INITIAL: char = 'M';
const TIKTOK_MAX_HASHTAGS: usize = 3;
const SUMMARY_CAPTION_CHARS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaAspect {
    Square,
    Landscape16x9,
    Portrait9x16,
}

/// What a platform-styled mock of the post shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformPreview {
    pub platform: Platform,
    pub display_name: &'static str,
    pub aspect: MediaAspect,
    pub account_name: String,
    pub avatar_initial: char,
    /// `@handle`, on platforms that show one.
    pub handle: Option<String>,
    pub caption: Option<String>,
    pub hashtag_line: Option<String>,
    pub background: &'static str,
}

pub fn display_name(platform: Platform) -> &'static str {
    match platform {
        Platform::Instagram => "Instagram",
        Platform::Facebook => "Facebook",
        Platform::Twitter => "Twitter/X",
        Platform::LinkedIn => "LinkedIn",
        Platform::TikTok => "TikTok",
    }
}

fn handle_for(company_name: Option<&str>) -> String {
    let base: String = company_name
        .unwrap_or(DEFAULT_HANDLE)
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();
    format!("@{}", base)
}

pub fn platform_preview(platform: Platform, draft: &PostDraft) -> PlatformPreview {
    let company = draft.company_name();

    let (aspect, shows_handle, max_hashtags) = match platform {
        Platform::Instagram => (MediaAspect::Square, false, None),
        Platform::Facebook => (MediaAspect::Square, false, None),
        Platform::Twitter => (MediaAspect::Landscape16x9, true, None),
        Platform::LinkedIn => (MediaAspect::Landscape16x9, false, None),
        Platform::TikTok => (MediaAspect::Portrait9x16, true, Some(TIKTOK_MAX_HASHTAGS)),
    };

    let tags = draft.hashtags.as_slice();
    let shown = &tags[..max_hashtags.map_or(tags.len(), |max| max.min(tags.len()))];

    PlatformPreview {
        platform,
        display_name: display_name(platform),
        aspect,
        account_name: company.unwrap_or(DEFAULT_ACCOUNT_NAME).to_string(),
        avatar_initial: company.and_then(|c| c.chars().next()).unwrap_or(DEFAULT_INITIAL),
        handle: shows_handle.then(|| handle_for(company)),
        caption: draft.caption.clone().filter(|c| !c.is_empty()),
        hashtag_line: (!shown.is_empty()).then(|| shown.join(" ")),
        background: GRADIENTS[draft.selected_output.map_or(0, |i| i.get())],
    }
}

/// Text of the final review panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewSummary {
    pub method_label: &'static str,
    pub platform: Platform,
    /// First 50 characters, with `...` appended when cut.
    pub caption_excerpt: Option<String>,
    pub hashtag_count_label: String,
}

pub fn summarize(draft: &PostDraft) -> Option<PreviewSummary> {
    let platform = draft.platform?;
    let method = draft.creation_method()?;

    let caption_excerpt = draft.caption.as_deref().filter(|c| !c.is_empty()).map(|c| {
        if c.chars().count() > SUMMARY_CAPTION_CHARS {
            format!("{}...", c.chars().take(SUMMARY_CAPTION_CHARS).collect::<String>())
        } else {
            c.to_string()
        }
    });

    let count = draft.hashtags.len();
    Some(PreviewSummary {
        method_label: method.label(),
        platform,
        caption_excerpt,
        hashtag_count_label: format!(
            "{} hashtag{} added",
            count,
            if count == 1 { "" } else { "s" }
        ),
    })
}
