//! Gemini generative-language client and reply normalization.
//!
//! A generative text model gives no format guarantee, so everything it
//! returns is treated as untrusted, partially-structured input. The pipeline
//! applies a layered tolerance strategy - structural slicing
//! ([`extract`]), textual repair ([`extract::repair_json`]), then semantic
//! defaulting ([`normalize`]) - so a malformed reply degrades into a usable,
//! fully-defaulted record instead of crashing the request cycle.

pub mod analysis;
pub mod client;
pub mod extract;
pub mod normalize;
pub mod prompt;
