//! Cyclic frame-packing core.
//!
//! Given a set of periodic point objects (bit-width, period, optional
//! pinned start frame / bit offset, optional group adjacency), computes a
//! placement — a frame-phase and a frame-relative bit position per object —
//! such that no two co-occurring objects overlap, total occupied bits are
//! maximized, and the peak end bit is minimized.
//!
//! Pipeline: [`object`] (the typed input model) → [`normalize`] (validate +
//! flatten + derive the unit scale) → [`build`] (emit the constraint model
//! onto a [`backend::ConstraintBackend`]) → [`solve`] (two-stage
//! lexicographic solve) → [`tables`] (materialize the result tables).
//! [`packer::Packer`] wires all five stages behind one `pack()` call.

pub mod backend;
pub mod build;
pub mod cp_sat_backend;
pub mod error;
pub mod normalize;
pub mod object;
pub mod packer;
pub mod solve;
pub mod tables;

pub use error::{PackerError, Result, ValidationRule};
pub use object::{GroupBuilder, GroupObjectList, PointObject, PointOrGroup};
pub use packer::{PackedResult, Packer};
