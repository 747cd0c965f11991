//! Domain logic for the viewer binary.
//!
//! Paging and event navigation live in the library; this module only holds
//! the screen-space transformations the panels share.

pub mod viewport_operations;
