//! Easel Core Library
//!
//! Platform-agnostic entity model, geometry and persistence for the Easel
//! canvas editor.

pub mod color;
pub mod entity;
pub mod geometry;
pub mod handles;
pub mod scene;
pub mod storage;

pub use color::Color;
pub use entity::{EntityId, Image, Shape, ShapeKind};
pub use geometry::Bounds;
pub use handles::{Corner, HandleRole};
pub use scene::SceneModel;
pub use storage::{PersistenceBridge, SceneStore, StoreError, StoreResult};
