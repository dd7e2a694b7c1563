//! Interaction state for a TruthGuard session.
//!
//! [`InteractionController`] owns the input draft (selected content type,
//! text, staged upload) and the `Idle → Analyzing → Resolved` lifecycle of a
//! submission. Staged uploads hold a [`preview::PreviewGuard`] so previews
//! are released whenever the file is removed, replaced or discarded.

pub mod controller;
pub mod draft;
pub mod preview;

pub use controller::{InteractionController, Phase};
pub use draft::{InputDraft, StagedUpload, ensure_within_limit};
pub use preview::{PreviewGuard, PreviewInfo, PreviewRegistry};
