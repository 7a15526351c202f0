// src/core/mod.rs
//! Resume builder core: document editing, preview formatting and the auth flow

pub mod editor;
pub mod flow;
pub mod ids;
pub mod preview;
pub mod reducer;
pub mod session;

pub use editor::{SectionEditor, SectionEntry};
pub use flow::{AuthRequest, FlowController, FlowState, LoginForm, SignupForm};
pub use ids::IdGenerator;
pub use preview::{build_preview, format_date, format_range, quick_preview, ResumePreview};
pub use reducer::{reduce, Section, SectionChange};
pub use session::{BuilderCommand, BuilderSession, CommandOutcome};
