//! # sopindex
//!
//! Command-line front for `sopindex-core`: builds an index from SOP files and
//! answers one-shot queries through an OpenAI-compatible provider.

/// Log filter setup.
pub mod logging;
/// OpenAI-compatible embedding and chat providers.
pub mod openai;
/// Plain-text rendering of search results and answers.
pub mod render;
