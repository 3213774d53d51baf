//! C-compatible boundary for the processing session.
//!
//! Exposes an opaque session handle, `#[repr(C)]` plain-old-data structs, and
//! `extern "C"` functions. Nothing here throws across the boundary: every
//! entry point catches panics and reports a status code instead.
//!
//! # Symbol prefix
//!
//! - Functions: `rsn_*`
//! - Types: `Rsn*`
//!
//! # Status codes
//!
//! Functions that can fail return an `int32_t`: `0` is success, negative
//! values follow the engine's error taxonomy (see
//! [`status`](crate::engine::status)).
//!
//! # Thread safety
//!
//! A handle may be shared between one capture caller and one render/config
//! caller, matching the Rust API contract. The capture and render processing
//! paths must not each be driven from more than one thread.

pub mod types;

mod conversions;
pub mod functions;
mod panic_guard;
