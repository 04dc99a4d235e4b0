//! Easel Render Library
//!
//! Retained render-surface abstraction and the reconciler that keeps
//! surface nodes in sync with the scene model.

pub mod headless;
pub mod reconcile;
pub mod surface;

pub use headless::{HeadlessNode, HeadlessSurface};
pub use reconcile::{LIVE_EPSILON, Reconciler};
pub use surface::{Layer, NodeId, Paint, RenderSurface, Visual};
