use std::collections::HashSet;
use std::sync::Arc;

use euclid::default::{Point2D, Rect, Size2D, Vector2D};
use thiserror::Error;

use crate::glyph::{Glyph, GlyphMetrics};
use crate::glyph_store::{FontFace, GlyphStore};
use crate::text::policy::{NoTruncation, OverflowPolicy};

/// Configuration for a [`TextBuilder`], fixed for the builder's lifetime.
#[derive(Clone, Debug)]
pub struct TextBuilderConfig {
    /// The face characters are resolved against first.
    pub font: FontFace,
    /// Maximum layout width. `None` means unbounded.
    pub max_width: Option<f32>,
    /// Where the first line starts.
    pub start_offset: Point2D<f32>,
    /// Extra spacing: `x` between glyphs on a line, `y` between lines.
    pub spacing: Vector2D<f32>,
    /// Stand-in character when a lookup fails in both the bound face and
    /// the rest of the store.
    pub fallback: char,
    /// Characters exempt from fixed-width substitution.
    pub never_fixed_width: HashSet<char, fxhash::FxBuildHasher>,
    /// Character whose advance defines the fixed width.
    pub fixed_width_reference: char,
    /// When set, every line is as tall as the font's nominal size instead
    /// of the tallest glyph placed on it.
    pub font_size_as_line_height: bool,
}

impl TextBuilderConfig {
    pub fn new(font: FontFace) -> Self {
        Self {
            font,
            max_width: None,
            start_offset: Point2D::zero(),
            spacing: Vector2D::zero(),
            fallback: '?',
            never_fixed_width: HashSet::default(),
            fixed_width_reference: 'm',
            font_size_as_line_height: false,
        }
    }
}

/// One placed character in builder-local coordinates.
///
/// The draw rectangle is the only durable positional record: the builder
/// mutates it in place when later glyphs on the same line move the
/// baseline, and re-derives cursor state from it during removal.
#[derive(Clone, Debug)]
pub struct PositionedGlyph {
    /// The character the caller fed in. When a fallback glyph stands in,
    /// this is still the requested character.
    pub ch: char,
    /// The resolved metrics, shared with the store's cache.
    pub glyph: Arc<Glyph>,
    /// Final position and size, ready for rendering.
    pub rect: Rect<f32>,
    /// Whether this glyph opens its line.
    pub on_new_line: bool,
    /// Advance override applied by fixed-width substitution.
    pub fixed_advance: Option<f32>,
}

impl PositionedGlyph {
    /// The advance that moved the cursor when this glyph was placed.
    pub fn advance(&self) -> f32 {
        self.fixed_advance.unwrap_or(self.glyph.metrics.advance)
    }
}

/// Error from [`TextBuilder::line_base_height`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum BaseHeightError {
    /// The vertical cursor has advanced past the first line, so a single
    /// line baseline no longer exists.
    #[error("base height is only available while the layout is on its first line")]
    PastFirstLine,
}

/// Incremental line-layout engine.
///
/// Characters are appended one at a time and can be retracted from the tail
/// again; cursor, bounds, and baselines stay consistent after every call.
/// The builder owns no font data: each operation that needs metrics takes a
/// [`GlyphStore`] the same way the store is threaded through the rest of
/// the crate.
///
/// The builder is a single-threaded mutable object. Wrap it (or the store)
/// in a lock if layout state must cross threads.
pub struct TextBuilder<P: OverflowPolicy = NoTruncation> {
    config: TextBuilderConfig,
    policy: P,

    characters: Vec<PositionedGlyph>,
    bounds: Size2D<f32>,
    cursor: Point2D<f32>,

    /// Height of the still-open line.
    line_height: f32,
    /// Baseline of the still-open line; `None` until a glyph lands on it.
    line_base: Option<f32>,
    /// Set while the next glyph would open a new line.
    new_line: bool,

    /// Memoized advance of the fixed-width reference character. The
    /// reference width is a property of the face, so this survives
    /// [`reset`](Self::reset).
    fixed_reference: Option<f32>,
}

impl TextBuilder {
    /// Creates a builder that keeps placing glyphs past the width limit.
    pub fn new(config: TextBuilderConfig) -> Self {
        Self::with_policy(config, NoTruncation)
    }
}

impl<P: OverflowPolicy> TextBuilder<P> {
    pub fn with_policy(config: TextBuilderConfig, policy: P) -> Self {
        Self::with_buffer(config, policy, Vec::new())
    }

    /// Reuses `buffer` as the backing storage for placed glyphs.
    ///
    /// The buffer is cleared; its capacity is kept, so a caller re-laying
    /// text every frame can recycle one allocation.
    pub fn with_buffer(
        config: TextBuilderConfig,
        policy: P,
        mut buffer: Vec<PositionedGlyph>,
    ) -> Self {
        buffer.clear();
        let cursor = config.start_offset;
        Self {
            config,
            policy,
            characters: buffer,
            bounds: Size2D::zero(),
            cursor,
            line_height: 0.0,
            line_base: None,
            new_line: true,
            fixed_reference: None,
        }
    }

    /// Consumes the builder, handing back the glyph buffer for reuse.
    pub fn into_buffer(self) -> Vec<PositionedGlyph> {
        self.characters
    }

    /// The placed glyphs, in display order.
    pub fn characters(&self) -> &[PositionedGlyph] {
        &self.characters
    }

    /// The extent spanned by everything placed so far.
    pub fn bounds(&self) -> Size2D<f32> {
        self.bounds
    }

    /// The pre-kerning insertion point for the next glyph.
    pub fn cursor(&self) -> Point2D<f32> {
        self.cursor
    }

    pub fn config(&self) -> &TextBuilderConfig {
        &self.config
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    /// Baseline of the first line.
    ///
    /// Only defined while everything placed so far shares that line; after
    /// a line break the question has no single answer and this returns an
    /// error instead of a misleading value. An empty first line reads as
    /// `0.0`.
    pub fn line_base_height(&self) -> Result<f32, BaseHeightError> {
        if self.cursor.y != self.config.start_offset.y {
            return Err(BaseHeightError::PastFirstLine);
        }
        Ok(self.line_base.unwrap_or(0.0))
    }

    /// Appends every character of `text`, stopping at the first one the
    /// builder refuses. Returns whether the builder is still open.
    pub fn add_text<S: GlyphStore>(&mut self, store: &mut S, text: &str) -> bool {
        for ch in text.chars() {
            if !self.add_char(store, ch) {
                return false;
            }
        }
        true
    }

    /// Attempts to place `ch` as the next glyph.
    ///
    /// Returns whether subsequent characters may still be added. A
    /// character no store tier can resolve is skipped silently and leaves
    /// the builder open; only the overflow policy closes it.
    pub fn add_char<S: GlyphStore>(&mut self, store: &mut S, ch: char) -> bool {
        if !self.policy.can_add() {
            return false;
        }

        let Some(glyph) = self.resolve_glyph(store, ch) else {
            log::debug!("No glyph found for character {:?}; skipping", ch);
            return true;
        };
        let metrics = glyph.metrics;

        let fixed_advance = if self.config.font.fixed_width
            && !self.config.never_fixed_width.contains(&ch)
        {
            self.fixed_reference_advance(store)
        } else {
            None
        };
        let advance = fixed_advance.unwrap_or(metrics.advance);

        let kerning = if self.new_line {
            0.0
        } else {
            match self.characters.last() {
                Some(prev) => glyph.kerning(&prev.glyph) + self.config.spacing.x,
                None => 0.0,
            }
        };

        // the policy sees the overflow before any cursor movement, so a
        // closing policy rejects the glyph without leaving half a commit
        if let Some(max_width) = self.config.max_width
            && self.cursor.x + kerning + advance > max_width
        {
            self.policy.width_exceeded();
            if !self.policy.can_add() {
                return false;
            }
        }

        self.cursor.x += kerning;

        let mut rect = Rect::new(
            Point2D::new(
                self.cursor.x + metrics.x_offset,
                self.cursor.y + metrics.y_offset,
            ),
            Size2D::new(metrics.width, metrics.height),
        );

        // align baselines within the open line: a deeper newcomer pushes
        // the line down to its baseline, a shallower one drops to the
        // line's
        match self.line_base {
            None => self.line_base = Some(metrics.baseline),
            Some(base) if metrics.baseline > base => {
                let delta = metrics.baseline - base;
                for placed in self.characters.iter_mut().rev() {
                    placed.rect.origin.y += delta;
                    if placed.on_new_line {
                        break;
                    }
                }
                self.line_base = Some(metrics.baseline);
            }
            Some(base) if metrics.baseline < base => {
                rect.origin.y += base - metrics.baseline;
            }
            Some(_) => {}
        }

        self.characters.push(PositionedGlyph {
            ch,
            glyph,
            rect,
            on_new_line: self.new_line,
            fixed_advance,
        });

        self.cursor.x += advance;
        self.line_height = self.line_height.max(self.slot_height(&metrics));
        self.new_line = false;

        self.bounds.width = self.bounds.width.max(self.cursor.x);
        self.bounds.height = self
            .bounds
            .height
            .max(self.cursor.y + self.line_height);

        true
    }

    /// Closes the current line and moves the cursor to the next one.
    ///
    /// An empty line still takes vertical space: its height is assumed to
    /// be the font's nominal size, whatever the height policy.
    pub fn add_new_line(&mut self) {
        if self.new_line {
            self.line_height = self.config.font.size;
        }

        self.cursor.x = self.config.start_offset.x;
        self.cursor.y += self.line_height + self.config.spacing.y;
        self.line_base = None;
        self.line_height = 0.0;
        self.new_line = true;
    }

    /// Removes the most recently placed glyph. No-op when empty.
    ///
    /// Removing a line's first glyph climbs back to the end of the previous
    /// line. Bounds are rebuilt by a full rescan: they only ever grew
    /// during appends, so the new maximum can sit anywhere in the remaining
    /// glyphs.
    pub fn remove_last(&mut self) {
        let Some(removed) = self.characters.pop() else {
            return;
        };
        let previous_base = self.line_base;

        let (base, height) = self.scan_line_metrics();
        self.line_base = base;
        self.line_height = height;

        if removed.on_new_line {
            let line_spacing = if self.characters.is_empty() {
                // the very first line carries no leading spacing
                0.0
            } else {
                self.config.spacing.y
            };
            self.cursor.y -= height + line_spacing;
            self.cursor.x = match self.characters.last() {
                Some(prev) => prev.rect.origin.x - prev.glyph.metrics.x_offset + prev.advance(),
                None => self.config.start_offset.x,
            };
        } else {
            self.cursor.x -= removed.advance();
            if let Some(prev) = self.characters.last() {
                self.cursor.x -= removed.glyph.kerning(&prev.glyph) + self.config.spacing.x;
            }

            // the removed glyph may have been the one holding the line
            // down; if the baseline rose, the survivors move back up
            if let (Some(old_base), Some(new_base)) = (previous_base, base)
                && new_base < old_base
            {
                let delta = old_base - new_base;
                for placed in self.characters.iter_mut().rev() {
                    placed.rect.origin.y -= delta;
                    if placed.on_new_line {
                        break;
                    }
                }
            }
        }

        self.bounds = self.scan_bounds();

        if self.characters.is_empty() {
            self.new_line = true;
        }
    }

    /// Returns the builder to its initial empty state.
    ///
    /// The fixed-width reference advance is a property of the face, not of
    /// the accumulated text, so it stays primed across reuse.
    pub fn reset(&mut self) {
        self.characters.clear();
        self.bounds = Size2D::zero();
        self.cursor = self.config.start_offset;
        self.line_base = None;
        self.line_height = 0.0;
        self.new_line = true;
        self.policy.reset();
    }

    /// Four-tier lookup: the bound face, any face, then the same two tiers
    /// for the fallback character.
    fn resolve_glyph<S: GlyphStore>(&self, store: &mut S, ch: char) -> Option<Arc<Glyph>> {
        let font = &self.config.font;
        if let Some(glyph) = store.glyph(font, ch) {
            return Some(glyph);
        }
        if let Some(glyph) = store.glyph_any(font.size, ch) {
            return Some(glyph);
        }
        if let Some(glyph) = store.glyph(font, self.config.fallback) {
            return Some(glyph);
        }
        store.glyph_any(font.size, self.config.fallback)
    }

    fn fixed_reference_advance<S: GlyphStore>(&mut self, store: &mut S) -> Option<f32> {
        if let Some(advance) = self.fixed_reference {
            return Some(advance);
        }
        let advance = self
            .resolve_glyph(store, self.config.fixed_width_reference)
            .map(|glyph| glyph.metrics.advance)?;
        self.fixed_reference = Some(advance);
        Some(advance)
    }

    /// How much line height a single glyph asks for.
    fn slot_height(&self, metrics: &GlyphMetrics) -> f32 {
        if self.config.font_size_as_line_height {
            self.config.font.size
        } else if metrics.whitespace {
            // oversized whitespace metrics must not inflate the line
            0.0
        } else {
            metrics.y_offset + metrics.height
        }
    }

    /// Baseline and height of the line the tail glyph sits on.
    fn scan_line_metrics(&self) -> (Option<f32>, f32) {
        let mut base: Option<f32> = None;
        let mut height = 0.0f32;
        for placed in self.characters.iter().rev() {
            let metrics = &placed.glyph.metrics;
            base = Some(match base {
                Some(base) => base.max(metrics.baseline),
                None => metrics.baseline,
            });
            height = height.max(self.slot_height(metrics));
            if placed.on_new_line {
                break;
            }
        }
        (base, height)
    }

    /// Rebuilds the bounds from every remaining draw rectangle.
    fn scan_bounds(&self) -> Size2D<f32> {
        let mut bounds: Size2D<f32> = Size2D::zero();

        let mut start = 0;
        while start < self.characters.len() {
            let mut end = start + 1;
            while end < self.characters.len() && !self.characters[end].on_new_line {
                end += 1;
            }
            let line = &self.characters[start..end];

            let mut base = f32::MIN;
            let mut height = 0.0f32;
            for placed in line {
                let metrics = &placed.glyph.metrics;
                base = base.max(metrics.baseline);
                height = height.max(self.slot_height(metrics));
                bounds.width = bounds
                    .width
                    .max(placed.rect.origin.x - metrics.x_offset + placed.advance());
            }

            // recover the line's top from any member: placement put each
            // glyph at top + y_offset + (base - baseline)
            let first = &line[0];
            let line_top = first.rect.origin.y
                - first.glyph.metrics.y_offset
                - (base - first.glyph.metrics.baseline);
            bounds.height = bounds.height.max(line_top + height);

            start = end;
        }

        bounds
    }
}
