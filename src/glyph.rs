use std::fmt;
use std::sync::Arc;

use fxhash::FxBuildHasher;
use std::collections::HashMap;

pub const SUB_PIXEL_QUANTIZE: f32 = 256f32;

/// Measured shape of one character, in builder-local pixels.
///
/// All values are y-down. `baseline` is the distance from the top edge of
/// the glyph's draw rectangle down to the baseline, so a tall capital has a
/// large `baseline` and a descender-only glyph a small one.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlyphMetrics {
    /// Width of the drawn area.
    pub width: f32,
    /// Height of the drawn area.
    pub height: f32,
    /// Horizontal bearing applied between the cursor and the draw rectangle.
    pub x_offset: f32,
    /// Vertical bearing applied between the line top and the draw rectangle.
    pub y_offset: f32,
    /// How far the cursor moves after this glyph is placed.
    pub advance: f32,
    /// Distance from the top of the draw rectangle down to the baseline.
    pub baseline: f32,
    /// Whitespace glyphs contribute no line height.
    pub whitespace: bool,
}

/// Where a glyph's pairwise kerning values come from.
///
/// Kerning is only meaningful between glyphs of the same source: two glyphs
/// of the same face at the same size, or two entries of the same authored
/// pair table. Everything else kerns at zero.
#[derive(Clone)]
pub(crate) enum KernSource {
    /// No kerning information.
    None,
    /// A `fontdue` face; kerned through the font's own pair table.
    Face {
        font: Arc<fontdue::Font>,
        index: u16,
        size: f32,
    },
    /// An authored `(left, right) -> adjustment` table shared by one face.
    Table {
        ch: char,
        pairs: Arc<HashMap<(char, char), f32, FxBuildHasher>>,
    },
}

/// A resolved glyph: metrics plus the kerning capability of its source.
///
/// Stores hand these out as `Arc<Glyph>` so repeated characters share one
/// allocation and removal can re-derive everything from the stored
/// reference.
#[derive(Clone)]
pub struct Glyph {
    pub metrics: GlyphMetrics,
    pub(crate) kern: KernSource,
}

impl Glyph {
    /// Builds a glyph with no kerning information.
    ///
    /// This is the entry point for custom [`GlyphStore`](crate::GlyphStore)
    /// implementations that have metrics but no pair table.
    pub fn from_metrics(metrics: GlyphMetrics) -> Self {
        Self {
            metrics,
            kern: KernSource::None,
        }
    }

    /// Horizontal adjustment for `self` following `prev` on the same line.
    ///
    /// Falls back to 0 when the two glyphs come from different faces or
    /// sizes, mirroring how the layout treats cross-font boundaries.
    pub fn kerning(&self, prev: &Glyph) -> f32 {
        match (&self.kern, &prev.kern) {
            (
                KernSource::Face { font, index, size },
                KernSource::Face {
                    font: prev_font,
                    index: prev_index,
                    size: prev_size,
                },
            ) if Arc::ptr_eq(font, prev_font) && (size - prev_size).abs() < f32::EPSILON => font
                .horizontal_kern_indexed(*prev_index, *index, *size)
                .unwrap_or(0.0),
            (
                KernSource::Table { ch, pairs },
                KernSource::Table { ch: prev_ch, pairs: prev_pairs },
            ) if Arc::ptr_eq(pairs, prev_pairs) => {
                pairs.get(&(*prev_ch, *ch)).copied().unwrap_or(0.0)
            }
            // just ignore kerning across different fonts or sizes
            _ => 0.0,
        }
    }
}

impl fmt::Debug for Glyph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Glyph")
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

/// Cache key for resolved glyphs.
///
/// The same character is not guaranteed to receive the same `GlyphKey`
/// across program runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GlyphKey {
    font_id: fontdb::ID,
    ch: char,
    font_size: u32, // font size * SUB_PIXEL_QUANTIZE as u32
}

impl GlyphKey {
    pub fn new(font_id: fontdb::ID, ch: char, font_size: f32) -> Self {
        Self {
            font_id,
            ch,
            font_size: (font_size * SUB_PIXEL_QUANTIZE).round() as u32,
        }
    }

    pub fn font_id(&self) -> fontdb::ID {
        self.font_id
    }

    pub fn ch(&self) -> char {
        self.ch
    }

    pub fn font_size(&self) -> f32 {
        self.font_size as f32 / SUB_PIXEL_QUANTIZE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Helper to create a dummy fontdb ID.
    fn make_font_id() -> fontdb::ID {
        // fontdb::ID is 64-bit on this platform. It might be NonZero, so use 1.
        unsafe { std::mem::transmute(1u64) }
    }

    fn table_glyph(ch: char, pairs: &Arc<HashMap<(char, char), f32, FxBuildHasher>>) -> Glyph {
        Glyph {
            metrics: GlyphMetrics::default(),
            kern: KernSource::Table {
                ch,
                pairs: Arc::clone(pairs),
            },
        }
    }

    #[test]
    fn key_quantizes_sub_pixel_sizes() {
        let id = make_font_id();

        let a = GlyphKey::new(id, 'a', 12.0);
        let b = GlyphKey::new(id, 'a', 12.0 + 1.0 / (SUB_PIXEL_QUANTIZE * 4.0));
        assert_eq!(a, b);

        let c = GlyphKey::new(id, 'a', 12.5);
        assert_ne!(a, c);
        assert_eq!(c.font_size(), 12.5);
    }

    #[test]
    fn table_kerning_looks_up_ordered_pairs() {
        let mut pairs = HashMap::with_hasher(FxBuildHasher::default());
        pairs.insert(('A', 'V'), -1.5);
        let pairs = Arc::new(pairs);

        let a = table_glyph('A', &pairs);
        let v = table_glyph('V', &pairs);

        assert_eq!(v.kerning(&a), -1.5);
        // the reverse pair is not in the table
        assert_eq!(a.kerning(&v), 0.0);
    }

    #[test]
    fn mismatched_sources_kern_at_zero() {
        let mut pairs = HashMap::with_hasher(FxBuildHasher::default());
        pairs.insert(('A', 'B'), 2.0);
        let pairs = Arc::new(pairs);

        let table = table_glyph('A', &pairs);
        let plain = Glyph::from_metrics(GlyphMetrics::default());

        assert_eq!(plain.kerning(&table), 0.0);
        assert_eq!(table.kerning(&plain), 0.0);

        // two separate tables never kern against each other
        let other_pairs = Arc::new(HashMap::with_hasher(FxBuildHasher::default()));
        let stranger = table_glyph('B', &other_pairs);
        assert_eq!(stranger.kerning(&table), 0.0);
    }
}
