// SPDX-License-Identifier: GPL-3.0-only

//! Capture and composition pipelines
//!
//! ```text
//! ┌──────────────┐     ┌────────────────────┐     ┌────────────────┐
//! │ Frame Source │ ──▶ │  Photo Pipeline    │ ──▶ │ CapturedPhoto* │
//! │              │     │  - countdown/burst │     │                │
//! │              │     │  - filter          │     │                │
//! │              │     │  - encoding        │     │                │
//! └──────────────┘     └────────────────────┘     └────────────────┘
//!
//! ┌────────────────┐   ┌────────────────────┐     ┌────────────────┐
//! │ CapturedPhoto* │──▶│  Mosaic Pipeline   │ ──▶ │ Collage image  │
//! │                │   │  - decode          │     │                │
//! │                │   │  - column packing  │     │                │
//! │                │   │  - drawing         │     │                │
//! └────────────────┘   └────────────────────┘     └────────────────┘
//! ```
//!
//! The live frame source is never paused or reconfigured by either pipeline.

pub mod mosaic;
pub mod photo;
