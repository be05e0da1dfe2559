// SPDX-License-Identifier: GPL-3.0-only

//! Frame sources
//!
//! - [`camera`]: the [`FrameSource`](camera::FrameSource) trait, the frame
//!   model, and a shared source fed by an external video pipeline
//! - [`file_source`]: a still image served as an always-ready source

pub mod camera;
pub mod file_source;
