//! Outcome notifications (toasts) decoupled from persistence and rendering.
//!
//! # Responsibility
//! - Keep the ordered list of active toasts for the UI to render.
//! - Publish shown/retracted events to subscribers.
//!
//! # Invariants
//! - Single-threaded: handles are `Rc`-shared and not `Send`.
//! - Active toasts keep insertion order; no priority, no deduplication.
//! - Nothing is persisted across process restarts.

mod toast;

pub use toast::{
    RetractReason, SubscriptionId, Toast, ToastChannel, ToastEvent, ToastHandle, ToastKind,
};
