//! Input handling subsystem for UI interactions.
//!
//! Mouse interactions live with the panels that own the hit areas; keyboard
//! shortcuts are handled here.

pub mod keyboard_input_handler;
