//! Pipeline stages for PDF-to-Markdown OCR conversion.
//!
//! Each submodule implements exactly one step, so each is testable on its
//! own and the remote service can be swapped without touching the
//! assembler.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ recognize ──▶ assemble ( decode ──▶ rewrite )
//! (path)    (OCR API)     (images/ + complete.md)
//! ```
//!
//! 1. [`input`]     — validate the local document and name the bundle
//! 2. [`recognize`] — upload, sign, OCR; the only stage with network I/O
//! 3. [`assemble`]  — persist images and write the joined Markdown
//! 4. [`decode`]    — data-URI payload → raw bytes
//! 5. [`rewrite`]   — placeholder substitution and page joining

pub mod assemble;
pub mod decode;
pub mod input;
pub mod recognize;
pub mod rewrite;
