//! Typed model of instruction-set encodings with text renderers for bit layouts and
//! assembly templates.

pub mod diagram;
pub mod isa;
