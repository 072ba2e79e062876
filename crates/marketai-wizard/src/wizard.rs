use std::fmt;

use tracing::debug;

use marketai_types::Platform;

use crate::draft::{
    AiInput, CreationInput, CreationMethod, OutputIndex, PostDraft, UploadInput, UploadedImage,
    present,
};
use crate::outputs::{OutputCandidate, compute_outputs};
use crate::preview::{PlatformPreview, PreviewSummary, platform_preview, summarize};

/// The five sections of the post creation flow, in reveal order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WizardStep {
    ChoosingMethod,
    EnteringInput,
    SelectingOutput,
    ChoosingPlatform,
    PreviewingFinal,
}

impl WizardStep {
    pub fn next(self) -> Option<Self> {
        match self {
            Self::ChoosingMethod => Some(Self::EnteringInput),
            Self::EnteringInput => Some(Self::SelectingOutput),
            Self::SelectingOutput => Some(Self::ChoosingPlatform),
            Self::ChoosingPlatform => Some(Self::PreviewingFinal),
            Self::PreviewingFinal => None,
        }
    }

    pub fn number(self) -> u8 {
        self as u8 + 1
    }
}

impl fmt::Display for WizardStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ChoosingMethod => "choose method",
            Self::EnteringInput => "enter input",
            Self::SelectingOutput => "select output",
            Self::ChoosingPlatform => "choose platform",
            Self::PreviewingFinal => "final preview",
        };
        write!(f, "step {} ({})", self.number(), name)
    }
}

/// Hook fired whenever a step becomes the current one, e.g. to scroll its
/// section into view.
pub trait StepObserver: Send {
    fn step_revealed(&mut self, step: WizardStep);
}

pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn step_revealed(&mut self, _step: WizardStep) {}
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WizardError {
    #[error("{0}")]
    Incomplete(&'static str),

    #[error("{required} not reached yet, currently at {current}")]
    StepNotReached {
        required: WizardStep,
        current: WizardStep,
    },

    #[error("field belongs to the {expected:?} method")]
    WrongMethod { expected: CreationMethod },

    #[error("creation method can no longer be changed")]
    MethodLocked,

    #[error("output {0} does not exist")]
    InvalidOutput(usize),

    #[error("already at the final step")]
    AlreadyFinal,

    #[error("Please login to save posts to your catalog")]
    NotSignedIn,
}

/// Forward-only state machine over a [`PostDraft`].
pub struct Wizard {
    draft: PostDraft,
    step: WizardStep,
    observer: Box<dyn StepObserver>,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Wizard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wizard")
            .field("step", &self.step)
            .field("draft", &self.draft)
            .finish_non_exhaustive()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self::with_observer(NoopObserver)
    }

    pub fn with_observer(observer: impl StepObserver + 'static) -> Self {
        Self {
            draft: PostDraft::default(),
            step: WizardStep::ChoosingMethod,
            observer: Box::new(observer),
        }
    }

    pub fn step(&self) -> WizardStep {
        self.step
    }

    pub fn draft(&self) -> &PostDraft {
        &self.draft
    }

    pub fn is_final(&self) -> bool {
        self.step == WizardStep::PreviewingFinal
    }

    fn reveal(&mut self, step: WizardStep) {
        debug!("wizard: {} -> {}", self.step, step);
        self.step = step;
        self.observer.step_revealed(step);
    }

    fn require(&self, required: WizardStep) -> Result<(), WizardError> {
        if self.step < required {
            return Err(WizardError::StepNotReached {
                required,
                current: self.step,
            });
        }
        Ok(())
    }

    /// Pick (or switch) the creation method. Switching discards the other
    /// method's input. Leaving the first step happens immediately.
    pub fn choose_method(&mut self, method: CreationMethod) -> Result<(), WizardError> {
        if self.step > WizardStep::EnteringInput {
            return Err(WizardError::MethodLocked);
        }

        if self.draft.creation_method() != Some(method) {
            self.draft.input = match method {
                CreationMethod::AiGenerated => CreationInput::AiGenerated(AiInput::default()),
                CreationMethod::UploadEnhance => CreationInput::UploadEnhance(UploadInput::default()),
            };
        }

        if self.step == WizardStep::ChoosingMethod {
            self.reveal(WizardStep::EnteringInput);
        }
        Ok(())
    }

    fn ai_mut(&mut self) -> Result<&mut AiInput, WizardError> {
        match &mut self.draft.input {
            CreationInput::AiGenerated(ai) => Ok(ai),
            _ => Err(WizardError::WrongMethod {
                expected: CreationMethod::AiGenerated,
            }),
        }
    }

    fn upload_mut(&mut self) -> Result<&mut UploadInput, WizardError> {
        match &mut self.draft.input {
            CreationInput::UploadEnhance(upload) => Ok(upload),
            _ => Err(WizardError::WrongMethod {
                expected: CreationMethod::UploadEnhance,
            }),
        }
    }

    pub fn set_description(&mut self, text: impl Into<String>) -> Result<(), WizardError> {
        self.ai_mut()?.description = present(text.into());
        Ok(())
    }

    pub fn set_company_name(&mut self, text: impl Into<String>) -> Result<(), WizardError> {
        self.ai_mut()?.company_name = present(text.into());
        Ok(())
    }

    pub fn set_company_phone(&mut self, text: impl Into<String>) -> Result<(), WizardError> {
        self.ai_mut()?.company_phone = present(text.into());
        Ok(())
    }

    pub fn upload_image(&mut self, image: UploadedImage) -> Result<(), WizardError> {
        self.upload_mut()?.image = Some(image);
        Ok(())
    }

    pub fn set_image_edit_description(
        &mut self,
        text: impl Into<String>,
    ) -> Result<(), WizardError> {
        self.upload_mut()?.edit_description = present(text.into());
        Ok(())
    }

    /// The step `advance` would move to, or why it cannot.
    fn gate(&self) -> Result<WizardStep, WizardError> {
        let ready = match self.step {
            WizardStep::ChoosingMethod => self
                .draft
                .creation_method()
                .is_some()
                .then_some(())
                .ok_or(WizardError::Incomplete("Choose a creation method")),
            WizardStep::EnteringInput => match self.draft.creation_method() {
                _ if self.draft.has_required_input() => Ok(()),
                Some(CreationMethod::UploadEnhance) => {
                    Err(WizardError::Incomplete("Upload an image to continue"))
                }
                _ => Err(WizardError::Incomplete("Describe your post to continue")),
            },
            WizardStep::SelectingOutput => self
                .draft
                .selected_output
                .map(|_| ())
                .ok_or(WizardError::Incomplete("Select one of the designs")),
            WizardStep::ChoosingPlatform => self
                .draft
                .platform
                .map(|_| ())
                .ok_or(WizardError::Incomplete("Choose a platform")),
            WizardStep::PreviewingFinal => Err(WizardError::AlreadyFinal),
        };
        ready?;
        self.step.next().ok_or(WizardError::AlreadyFinal)
    }

    pub fn can_advance(&self) -> bool {
        self.gate().is_ok()
    }

    /// Move to the next step if the current step's condition holds.
    pub fn advance(&mut self) -> Result<WizardStep, WizardError> {
        let next = self.gate()?;
        self.reveal(next);
        Ok(next)
    }

    pub fn select_output(&mut self, index: usize) -> Result<(), WizardError> {
        self.require(WizardStep::SelectingOutput)?;
        let index = OutputIndex::new(index).ok_or(WizardError::InvalidOutput(index))?;
        self.draft.selected_output = Some(index);
        Ok(())
    }

    pub fn select_platform(&mut self, platform: Platform) -> Result<(), WizardError> {
        self.require(WizardStep::ChoosingPlatform)?;
        self.draft.platform = Some(platform);
        Ok(())
    }

    pub fn set_caption(&mut self, text: impl Into<String>) -> Result<(), WizardError> {
        self.require(WizardStep::ChoosingPlatform)?;
        self.draft.caption = present(text.into());
        Ok(())
    }

    pub fn add_hashtag(&mut self, raw: &str) -> Result<bool, WizardError> {
        self.require(WizardStep::ChoosingPlatform)?;
        Ok(self.draft.hashtags.add(raw))
    }

    pub fn remove_hashtag(&mut self, tag: &str) -> Result<bool, WizardError> {
        self.require(WizardStep::ChoosingPlatform)?;
        Ok(self.draft.hashtags.remove(tag))
    }

    pub fn add_suggested_hashtags(&mut self) -> Result<usize, WizardError> {
        self.require(WizardStep::ChoosingPlatform)?;
        Ok(self.draft.hashtags.add_suggested())
    }

    pub fn outputs(&self) -> [OutputCandidate; OutputIndex::COUNT] {
        compute_outputs(&self.draft)
    }

    /// Mock of the post for the chosen platform.
    pub fn preview(&self) -> Option<PlatformPreview> {
        self.draft
            .platform
            .map(|platform| platform_preview(platform, &self.draft))
    }

    pub fn summary(&self) -> Option<PreviewSummary> {
        if !self.is_final() {
            return None;
        }
        summarize(&self.draft)
    }

    /// Clear the draft and return to the first step.
    pub fn reset(&mut self) {
        self.draft = PostDraft::default();
        self.reveal(WizardStep::ChoosingMethod);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<WizardStep>>>);

    impl StepObserver for Recorder {
        fn step_revealed(&mut self, step: WizardStep) {
            self.0.lock().unwrap().push(step);
        }
    }

    fn at_platform_step() -> Wizard {
        let mut wizard = Wizard::new();
        wizard.choose_method(CreationMethod::AiGenerated).unwrap();
        wizard.set_description("Weekend sale").unwrap();
        wizard.advance().unwrap();
        wizard.select_output(1).unwrap();
        wizard.advance().unwrap();
        wizard
    }

    #[test]
    fn choosing_method_reveals_input_step() {
        let recorder = Recorder::default();
        let mut wizard = Wizard::with_observer(recorder.clone());
        assert_eq!(wizard.step(), WizardStep::ChoosingMethod);
        assert!(!wizard.can_advance());

        wizard.choose_method(CreationMethod::UploadEnhance).unwrap();
        assert_eq!(wizard.step(), WizardStep::EnteringInput);
        assert_eq!(*recorder.0.lock().unwrap(), [WizardStep::EnteringInput]);
    }

    #[test]
    fn empty_input_blocks_output_step() {
        let mut wizard = Wizard::new();
        wizard.choose_method(CreationMethod::AiGenerated).unwrap();
        wizard.set_company_name("Acme").unwrap();
        assert!(matches!(wizard.advance(), Err(WizardError::Incomplete(_))));

        wizard.set_description("").unwrap();
        assert!(!wizard.can_advance());

        wizard.choose_method(CreationMethod::UploadEnhance).unwrap();
        wizard.set_image_edit_description("brighter").unwrap();
        assert!(!wizard.can_advance());
        assert_eq!(wizard.step(), WizardStep::EnteringInput);

        wizard
            .upload_image(UploadedImage::new("shop.png", vec![0x89, 0x50]))
            .unwrap();
        assert_eq!(wizard.advance(), Ok(WizardStep::SelectingOutput));
    }

    #[test]
    fn switching_method_discards_other_input() {
        let mut wizard = Wizard::new();
        wizard.choose_method(CreationMethod::AiGenerated).unwrap();
        wizard.set_description("Grand opening").unwrap();

        wizard.choose_method(CreationMethod::UploadEnhance).unwrap();
        assert!(wizard.draft().description().is_none());
        assert_eq!(
            wizard.set_description("again"),
            Err(WizardError::WrongMethod {
                expected: CreationMethod::AiGenerated
            })
        );

        wizard.choose_method(CreationMethod::AiGenerated).unwrap();
        assert!(wizard.draft().description().is_none());
    }

    #[test]
    fn reselecting_same_method_keeps_input() {
        let mut wizard = Wizard::new();
        wizard.choose_method(CreationMethod::AiGenerated).unwrap();
        wizard.set_description("Grand opening").unwrap();
        wizard.choose_method(CreationMethod::AiGenerated).unwrap();
        assert_eq!(wizard.draft().description(), Some("Grand opening"));
    }

    #[test]
    fn method_locked_after_input_step() {
        let mut wizard = at_platform_step();
        assert_eq!(
            wizard.choose_method(CreationMethod::UploadEnhance),
            Err(WizardError::MethodLocked)
        );
    }

    #[test]
    fn later_fields_wait_for_their_step() {
        let mut wizard = Wizard::new();
        wizard.choose_method(CreationMethod::AiGenerated).unwrap();

        assert_eq!(
            wizard.select_output(0),
            Err(WizardError::StepNotReached {
                required: WizardStep::SelectingOutput,
                current: WizardStep::EnteringInput,
            })
        );
        assert!(wizard.select_platform(Platform::Instagram).is_err());
        assert!(wizard.add_hashtag("sale").is_err());
    }

    #[test]
    fn output_index_must_be_in_range() {
        let mut wizard = Wizard::new();
        wizard.choose_method(CreationMethod::AiGenerated).unwrap();
        wizard.set_description("Weekend sale").unwrap();
        wizard.advance().unwrap();

        assert_eq!(wizard.select_output(3), Err(WizardError::InvalidOutput(3)));
        assert!(!wizard.can_advance());
        wizard.select_output(2).unwrap();
        assert_eq!(wizard.advance(), Ok(WizardStep::ChoosingPlatform));
    }

    #[test]
    fn full_flow_reaches_final_preview() {
        let mut wizard = at_platform_step();
        assert!(wizard.preview().is_none());
        assert!(!wizard.can_advance());

        wizard.select_platform(Platform::Twitter).unwrap();
        wizard.set_caption("Everything must go").unwrap();
        assert!(wizard.add_hashtag("sale").unwrap());
        assert!(!wizard.add_hashtag("#sale").unwrap());
        assert_eq!(wizard.add_suggested_hashtags().unwrap(), 3);
        assert!(wizard.remove_hashtag("#Business").unwrap());
        assert!(wizard.summary().is_none());

        assert_eq!(wizard.advance(), Ok(WizardStep::PreviewingFinal));
        assert_eq!(wizard.advance(), Err(WizardError::AlreadyFinal));

        let preview = wizard.preview().unwrap();
        assert_eq!(preview.platform, Platform::Twitter);
        assert_eq!(preview.background, crate::outputs::GRADIENTS[1]);

        let summary = wizard.summary().unwrap();
        assert_eq!(summary.caption_excerpt.as_deref(), Some("Everything must go"));
        assert_eq!(summary.hashtag_count_label, "3 hashtags added");
    }

    #[test]
    fn platform_can_change_until_saved() {
        let mut wizard = at_platform_step();
        wizard.select_platform(Platform::Instagram).unwrap();
        wizard.advance().unwrap();
        wizard.select_platform(Platform::TikTok).unwrap();
        assert_eq!(wizard.draft().platform, Some(Platform::TikTok));
    }

    #[test]
    fn reset_clears_everything() {
        let recorder = Recorder::default();
        let mut wizard = Wizard::with_observer(recorder.clone());
        wizard.choose_method(CreationMethod::AiGenerated).unwrap();
        wizard.set_description("Weekend sale").unwrap();
        wizard.advance().unwrap();

        wizard.reset();
        assert_eq!(wizard.step(), WizardStep::ChoosingMethod);
        assert_eq!(wizard.draft(), &PostDraft::default());
        assert_eq!(
            recorder.0.lock().unwrap().last(),
            Some(&WizardStep::ChoosingMethod)
        );
    }

    #[test]
    fn outputs_follow_live_draft() {
        let mut wizard = Wizard::new();
        wizard.choose_method(CreationMethod::AiGenerated).unwrap();
        wizard.set_description("first").unwrap();
        assert_eq!(wizard.outputs()[0].main_text, "first");
        wizard.set_description("second").unwrap();
        assert_eq!(wizard.outputs()[2].main_text, "second");
    }

    #[test]
    fn step_display_is_numbered() {
        assert_eq!(WizardStep::SelectingOutput.to_string(), "step 3 (select output)");
        assert_eq!(WizardStep::PreviewingFinal.next(), None);
    }
}
