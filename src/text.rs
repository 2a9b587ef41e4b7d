/// The incremental layout engine and its configuration.
pub mod builder;
/// Width-overflow policies injected into the builder.
pub mod policy;

pub use builder::{BaseHeightError, PositionedGlyph, TextBuilder, TextBuilderConfig};
pub use policy::{NoTruncation, OverflowPolicy, TruncateAtWidth};
