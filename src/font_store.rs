use std::{collections::HashMap, path::PathBuf, sync::Arc};

use fxhash::FxBuildHasher;

use crate::glyph::{Glyph, GlyphKey, GlyphMetrics, KernSource};
use crate::glyph_store::{FontFace, GlyphStore};

/// Glyph store backed by real fonts, using `fontdb` and `fontdue`.
///
/// This struct combines a database of available fonts (`fontdb`) with a
/// cache of loaded font instances (`fontdue`) and a cache of resolved glyph
/// metrics. Faces are located by family name and lazily instantiated the
/// first time one of their glyphs is requested.
pub struct FontGlyphStore {
    /// This is the font set that has been loaded by fontdb.
    font_db: fontdb::Database,
    /// This is the font that has been loaded by fontdue.
    /// Not all fonts in fontdb are necessarily loaded here.
    loaded_font: HashMap<fontdb::ID, Arc<fontdue::Font>, FxBuildHasher>,
    /// Family name -> face ID resolution, memoized so a missing family
    /// warns once instead of once per character.
    families: HashMap<String, Option<fontdb::ID>, FxBuildHasher>,
    /// Resolved glyph metrics keyed by face, character, and quantized size.
    glyphs: HashMap<GlyphKey, Arc<Glyph>, FxBuildHasher>,
}

impl Default for FontGlyphStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FontGlyphStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            font_db: fontdb::Database::new(),
            loaded_font: HashMap::with_hasher(FxBuildHasher::default()),
            families: HashMap::with_hasher(FxBuildHasher::default()),
            glyphs: HashMap::with_hasher(FxBuildHasher::default()),
        }
    }
}

/// Loading fonts into fontdb.
impl FontGlyphStore {
    /// Loads a font from binary data.
    pub fn load_font_binary(&mut self, data: impl Into<Vec<u8>>) {
        self.font_db.load_font_data(data.into());
        self.families.clear();
    }

    /// Loads a font from a file path.
    pub fn load_font_file(&mut self, path: PathBuf) -> Result<(), std::io::Error> {
        let result = self.font_db.load_font_file(path);
        self.families.clear();
        result
    }

    /// Loads all fonts from a directory.
    pub fn load_fonts_dir(&mut self, dir: PathBuf) {
        self.font_db.load_fonts_dir(dir);
        self.families.clear();
    }

    /// Loads the system fonts.
    pub fn load_system_fonts(&mut self) {
        self.font_db.load_system_fonts();
        self.families.clear();
    }

    /// Checks if the store has no faces.
    pub fn is_empty(&self) -> bool {
        self.font_db.is_empty()
    }

    /// Returns the number of available faces.
    pub fn len(&self) -> usize {
        self.font_db.len()
    }
}

/// Resolving faces and glyphs.
impl FontGlyphStore {
    /// Retrieves a loaded font by ID, loading it if necessary.
    pub fn font(&mut self, id: fontdb::ID) -> Option<Arc<fontdue::Font>> {
        use std::collections::hash_map::Entry;

        match self.loaded_font.entry(id) {
            Entry::Occupied(entry) => Some(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let font_result = self.font_db.with_face_data(id, |data, index| {
                    fontdue::Font::from_bytes(
                        data,
                        fontdue::FontSettings {
                            collection_index: index,
                            scale: 40.0,
                            load_substitutions: true,
                        },
                    )
                })?;

                match font_result {
                    Ok(font) => {
                        let r: &mut Arc<fontdue::Font> = entry.insert(Arc::new(font));
                        Some(Arc::clone(r))
                    }
                    Err(e) => {
                        log::error!("Failed to load font (id: {:?}): {}", id, e);
                        None
                    }
                }
            }
        }
    }

    fn resolve_family(&mut self, name: &str) -> Option<fontdb::ID> {
        if let Some(id) = self.families.get(name) {
            return *id;
        }

        let id = self.font_db.query(&fontdb::Query {
            families: &[fontdb::Family::Name(name)],
            ..fontdb::Query::default()
        });
        if id.is_none() {
            log::warn!("No face found for family {:?}", name);
        }
        self.families.insert(name.to_string(), id);
        id
    }

    fn glyph_in_face(&mut self, id: fontdb::ID, size: f32, ch: char) -> Option<Arc<Glyph>> {
        let key = GlyphKey::new(id, ch, size);
        if let Some(glyph) = self.glyphs.get(&key) {
            return Some(Arc::clone(glyph));
        }

        let font = self.font(id)?;
        let index = font.lookup_glyph_index(ch);
        if index == 0 {
            // .notdef: the face has no coverage for this character
            return None;
        }

        let metrics = font.metrics_indexed(index, size);
        let glyph = Arc::new(Glyph {
            metrics: GlyphMetrics {
                width: metrics.width as f32,
                height: metrics.height as f32,
                x_offset: metrics.xmin as f32,
                y_offset: 0.0,
                advance: metrics.advance_width,
                // fontdue positions glyphs relative to the baseline with
                // `ymin` as the bottom offset; top-to-baseline is the sum
                baseline: metrics.height as f32 + metrics.ymin as f32,
                whitespace: ch.is_whitespace(),
            },
            kern: KernSource::Face {
                font: Arc::clone(&font),
                index,
                size,
            },
        });

        self.glyphs.insert(key, Arc::clone(&glyph));
        Some(glyph)
    }
}

impl GlyphStore for FontGlyphStore {
    fn glyph(&mut self, font: &FontFace, ch: char) -> Option<Arc<Glyph>> {
        let id = self.resolve_family(&font.name)?;
        self.glyph_in_face(id, font.size, ch)
    }

    fn glyph_any(&mut self, size: f32, ch: char) -> Option<Arc<Glyph>> {
        let ids: Vec<fontdb::ID> = self.font_db.faces().map(|face| face.id).collect();
        ids.into_iter()
            .find_map(|id| self.glyph_in_face(id, size, ch))
    }
}
