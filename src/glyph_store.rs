use std::collections::HashMap;
use std::sync::Arc;

use fxhash::FxBuildHasher;

use crate::glyph::{Glyph, GlyphMetrics, KernSource};

/// The face a [`TextBuilder`](crate::TextBuilder) is bound to.
///
/// `name` is the family name as the store knows it. `fixed_width` turns on
/// fixed-width substitution in the builder: every non-exempt character is
/// advanced by the width of the configured reference character instead of
/// its own.
#[derive(Clone, Debug, PartialEq)]
pub struct FontFace {
    /// The family name used for lookups.
    pub name: String,
    /// The nominal font size in pixels.
    pub size: f32,
    /// Whether the builder substitutes a uniform advance for this face.
    pub fixed_width: bool,
}

impl FontFace {
    pub fn new(name: impl Into<String>, size: f32) -> Self {
        Self {
            name: name.into(),
            size,
            fixed_width: false,
        }
    }

    /// Enables fixed-width substitution.
    pub fn fixed_width(mut self) -> Self {
        self.fixed_width = true;
        self
    }
}

/// Source of glyph metrics for the layout engine.
///
/// Lookups are synchronous and, from the builder's perspective, pure: the
/// same face and character always resolve to the same metrics. Internal
/// caching and lazy loading are the store's own concern, which is why both
/// methods take `&mut self`.
pub trait GlyphStore {
    /// Looks up `ch` in the face described by `font`.
    fn glyph(&mut self, font: &FontFace, ch: char) -> Option<Arc<Glyph>>;

    /// Looks up `ch` in any face the store knows about.
    ///
    /// This is the builder's second-chance lookup when the bound face has
    /// no coverage for a character.
    fn glyph_any(&mut self, size: f32, ch: char) -> Option<Arc<Glyph>>;
}

/// Consuming builder for one authored face.
///
/// Collects glyph metrics and kerning pairs; the pair table is shared by
/// every glyph of the face once the face is registered with
/// [`StaticGlyphStore::add_face`].
#[derive(Clone, Debug, Default)]
pub struct StaticFace {
    glyphs: Vec<(char, GlyphMetrics)>,
    kerning: Vec<(char, char, f32)>,
}

impl StaticFace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a glyph. A later entry for the same character wins.
    pub fn glyph(mut self, ch: char, metrics: GlyphMetrics) -> Self {
        self.glyphs.push((ch, metrics));
        self
    }

    /// Adds a kerning adjustment for `right` following `left`.
    pub fn kerning(mut self, left: char, right: char, adjustment: f32) -> Self {
        self.kerning.push((left, right, adjustment));
        self
    }
}

struct BuiltFace {
    glyphs: HashMap<char, Arc<Glyph>, FxBuildHasher>,
}

/// Glyph store with hand-authored metrics.
///
/// Useful for bitmap-style fonts whose metrics and kerning pairs are known
/// up front rather than parsed from a font file. Metrics are
/// size-independent: the size passed to lookups is ignored.
#[derive(Default)]
pub struct StaticGlyphStore {
    // insertion order decides the `glyph_any` scan order
    faces: Vec<(String, BuiltFace)>,
}

impl StaticGlyphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `face` under `name`, replacing any previous registration.
    pub fn add_face(&mut self, name: impl Into<String>, face: StaticFace) {
        let name = name.into();

        let mut pairs = HashMap::with_hasher(FxBuildHasher::default());
        for (left, right, adjustment) in face.kerning {
            pairs.insert((left, right), adjustment);
        }
        let pairs = Arc::new(pairs);

        let mut glyphs = HashMap::with_hasher(FxBuildHasher::default());
        for (ch, metrics) in face.glyphs {
            glyphs.insert(
                ch,
                Arc::new(Glyph {
                    metrics,
                    kern: KernSource::Table {
                        ch,
                        pairs: Arc::clone(&pairs),
                    },
                }),
            );
        }

        let built = BuiltFace { glyphs };
        if let Some(slot) = self.faces.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = built;
        } else {
            self.faces.push((name, built));
        }
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    fn face(&self, name: &str) -> Option<&BuiltFace> {
        self.faces
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, face)| face)
    }
}

impl GlyphStore for StaticGlyphStore {
    fn glyph(&mut self, font: &FontFace, ch: char) -> Option<Arc<Glyph>> {
        self.face(&font.name)
            .and_then(|face| face.glyphs.get(&ch))
            .map(Arc::clone)
    }

    fn glyph_any(&mut self, _size: f32, ch: char) -> Option<Arc<Glyph>> {
        self.faces
            .iter()
            .find_map(|(_, face)| face.glyphs.get(&ch))
            .map(Arc::clone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics(advance: f32) -> GlyphMetrics {
        GlyphMetrics {
            width: advance - 1.0,
            height: 8.0,
            advance,
            baseline: 8.0,
            ..GlyphMetrics::default()
        }
    }

    #[test]
    fn lookup_is_per_face() {
        let mut store = StaticGlyphStore::new();
        store.add_face("alpha", StaticFace::new().glyph('a', metrics(6.0)));
        store.add_face("beta", StaticFace::new().glyph('b', metrics(7.0)));

        let alpha = FontFace::new("alpha", 10.0);
        assert!(store.glyph(&alpha, 'a').is_some());
        assert!(store.glyph(&alpha, 'b').is_none());
        assert!(store.glyph(&FontFace::new("missing", 10.0), 'a').is_none());
    }

    #[test]
    fn any_face_scans_in_registration_order() {
        let mut store = StaticGlyphStore::new();
        store.add_face("first", StaticFace::new().glyph('x', metrics(3.0)));
        store.add_face("second", StaticFace::new().glyph('x', metrics(9.0)));

        let glyph = store.glyph_any(10.0, 'x').expect("x is registered");
        assert_eq!(glyph.metrics.advance, 3.0);
        assert!(store.glyph_any(10.0, 'y').is_none());
    }

    #[test]
    fn kerning_pairs_only_apply_within_one_face() {
        let mut store = StaticGlyphStore::new();
        store.add_face(
            "kerned",
            StaticFace::new()
                .glyph('A', metrics(6.0))
                .glyph('V', metrics(6.0))
                .kerning('A', 'V', -2.0),
        );
        store.add_face("other", StaticFace::new().glyph('V', metrics(6.0)));

        let face = FontFace::new("kerned", 10.0);
        let a = store.glyph(&face, 'A').expect("registered");
        let v = store.glyph(&face, 'V').expect("registered");
        assert_eq!(v.kerning(&a), -2.0);

        let foreign_v = store
            .glyph(&FontFace::new("other", 10.0), 'V')
            .expect("registered");
        assert_eq!(foreign_v.kerning(&a), 0.0);
    }

    #[test]
    fn add_face_replaces_previous_registration() {
        let mut store = StaticGlyphStore::new();
        store.add_face("mono", StaticFace::new().glyph('m', metrics(10.0)));
        store.add_face("mono", StaticFace::new().glyph('i', metrics(3.0)));

        let face = FontFace::new("mono", 10.0);
        assert!(store.glyph(&face, 'm').is_none());
        assert!(store.glyph(&face, 'i').is_some());
        assert_eq!(store.len(), 1);
    }
}
