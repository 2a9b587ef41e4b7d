//! # Tsuzuri
//!
//! An incremental text layout library for Rust.
//!
//! ## Overview
//!
//! `Tsuzuri` lays out text one character at a time. The core of the library
//! is the [`TextBuilder`], a mutable line-layout engine that appends glyphs,
//! breaks lines, and retracts the most recent glyph again: the shape an
//! interactive text field needs, where characters arrive and disappear at
//! the tail while the layout stays live.
//!
//! Glyph metrics come from a [`GlyphStore`]: either [`FontGlyphStore`]
//! (system/file fonts through `fontdb` + `fontdue`) or [`StaticGlyphStore`]
//! (hand-authored metrics with explicit kerning tables, bitmap-font style).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tsuzuri::{FontSystem, FontFace, text::{TextBuilder, TextBuilderConfig}};
//!
//! // 1. Load fonts
//! let font_system = FontSystem::new();
//! font_system.load_system_fonts();
//!
//! // 2. Bind a builder to a face
//! let face = FontFace::new("sans-serif", 16.0);
//! let mut builder = TextBuilder::new(TextBuilderConfig::new(face));
//!
//! // 3. Feed text, break lines, undo; the layout stays current throughout
//! font_system.add_text(&mut builder, "hello");
//! builder.add_new_line();
//! font_system.add_text(&mut builder, "world");
//! builder.remove_last();
//!
//! // 4. Hand the positioned glyphs to a renderer
//! for placed in builder.characters() {
//!     let _ = placed.rect;
//! }
//! ```
//!
//! ## Features
//!
//! *   **Incremental**: every append and retraction keeps the cursor and
//!     bounds consistent without a batch re-layout.
//! *   **Baseline reconciliation**: mixed-ascent glyphs on one line are
//!     realigned in place as deeper glyphs arrive.
//! *   **Policy injection**: width overflow is routed through an
//!     [`OverflowPolicy`](text::OverflowPolicy), so truncation is opt-in.
//! *   **Font Management**: easy loading of system fonts and custom font
//!     files.

pub mod font_store;
pub mod font_system;
pub mod glyph;
pub mod glyph_store;
pub mod text;

// common re-exports
pub use font_store::FontGlyphStore;
pub use font_system::FontSystem;
pub use glyph::{Glyph, GlyphKey, GlyphMetrics};
pub use glyph_store::{FontFace, GlyphStore, StaticFace, StaticGlyphStore};
pub use text::{TextBuilder, TextBuilderConfig};

// re-export dependencies
pub use fontdb;
pub use fontdue;
pub use parking_lot;
