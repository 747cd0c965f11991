//! Presentation layer: visual styling kept apart from viewing logic.

pub mod color_mapping;
