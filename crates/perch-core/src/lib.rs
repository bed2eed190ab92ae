#![forbid(unsafe_code)]

//! Core: geometry primitives, canonical host events, and logging bootstrap.
//!
//! # Role in perch
//! `perch-core` is the vocabulary layer. It defines the pixel-space geometry
//! the positioning engine reasons in and the normalized events a host feeds
//! into the overlay manager (pointer presses, Escape, history pops, resizes).
//!
//! # How it fits in the system
//! `perch-overlay` consumes these types and owns all behavior. Hosts translate
//! their native input (DOM events, winit events, a test script) into
//! [`event::Event`] values and measure their nodes into [`geometry::Rect`]s.

pub mod event;
pub mod geometry;
pub mod logging;
