//! Client core for MarketAI: the post creation wizard, its derived views,
//! the signed-in session and a typed client for the backend.

pub mod client;
pub mod draft;
pub mod hashtags;
pub mod outputs;
pub mod preview;
pub mod session;
pub mod studio;
pub mod wizard;

pub use client::{Action, ApiClient, ClientError};
pub use draft::{CreationMethod, PostDraft, UploadedImage};
pub use session::{FileSessionStore, MemorySessionStore, SessionContext, SessionStore, UserSession};
pub use studio::Studio;
pub use wizard::{StepObserver, Wizard, WizardError, WizardStep};
