//! Easel Editor Library
//!
//! The interactive layer of Easel: single-slot pointer sessions for
//! drawing, dragging and resizing, and the [`Editor`] facade that binds a
//! scene, a render surface and a persistence bridge together.

pub mod editor;
pub mod session;

pub use editor::Editor;
pub use session::{DragSession, DrawSession, ResizeSession, Session};
