use std::path::PathBuf;

use parking_lot::Mutex;

use crate::{
    font_store::FontGlyphStore,
    text::{OverflowPolicy, TextBuilder},
};

/// High-level entry point for font-backed layout.
///
/// This struct owns a [`FontGlyphStore`] behind a `Mutex` so UI code can
/// share one font set across widgets while each widget drives its own
/// [`TextBuilder`].
///
/// The field is public to allow direct access to the underlying store when
/// necessary (e.g. to hold the lock across a burst of layout calls).
pub struct FontSystem {
    /// The underlying glyph store.
    pub store: Mutex<FontGlyphStore>,
}

impl Default for FontSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl FontSystem {
    /// Creates a new font system with an empty store.
    pub fn new() -> Self {
        Self {
            store: Mutex::new(FontGlyphStore::new()),
        }
    }
}

/// font loading
impl FontSystem {
    /// Loads the system fonts into the store.
    pub fn load_system_fonts(&self) {
        self.store.lock().load_system_fonts();
    }

    /// Loads a font from binary data.
    pub fn load_font_binary(&self, data: impl Into<Vec<u8>>) {
        self.store.lock().load_font_binary(data);
    }

    /// Loads a font from a file path.
    pub fn load_font_file(&self, path: PathBuf) -> Result<(), std::io::Error> {
        self.store.lock().load_font_file(path)
    }

    /// Loads all fonts from a directory.
    pub fn load_fonts_dir(&self, dir: PathBuf) {
        self.store.lock().load_fonts_dir(dir)
    }

    /// Checks if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    /// Returns the number of available faces.
    pub fn len(&self) -> usize {
        self.store.lock().len()
    }
}

/// text layout
impl FontSystem {
    /// Appends one character to `builder` using the fonts in this system.
    pub fn add_char<P: OverflowPolicy>(&self, builder: &mut TextBuilder<P>, ch: char) -> bool {
        builder.add_char(&mut *self.store.lock(), ch)
    }

    /// Appends `text` to `builder` using the fonts in this system.
    ///
    /// The lock is held for the whole string so the glyph cache stays warm
    /// across the burst.
    pub fn add_text<P: OverflowPolicy>(&self, builder: &mut TextBuilder<P>, text: &str) -> bool {
        builder.add_text(&mut *self.store.lock(), text)
    }
}
