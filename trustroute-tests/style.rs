//! Style Enforcement Tests
//!
//! Validates library hygiene rules that clippy does not catch on its own.
//!
//! # Test Organization
//!
//! - `library_hygiene` - No panicking shortcuts or dead-code allowances in library code

#[path = "style/library_hygiene.rs"]
mod library_hygiene;
