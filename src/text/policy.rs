/// Decides what happens when the next glyph would cross the width limit.
///
/// The builder consults [`can_add`](OverflowPolicy::can_add) before every
/// placement and calls [`width_exceeded`](OverflowPolicy::width_exceeded)
/// when a glyph would not fit, before committing any cursor movement. A
/// policy that closes itself inside `width_exceeded` therefore rejects the
/// overflowing glyph as well as everything after it.
pub trait OverflowPolicy {
    /// Whether the builder may still accept characters.
    fn can_add(&self) -> bool {
        true
    }

    /// Notification that the next glyph would not fit within the maximum
    /// width. The glyph has not been committed yet.
    fn width_exceeded(&mut self) {}

    /// Called by [`TextBuilder::reset`](crate::TextBuilder::reset) so the
    /// policy can reopen alongside the builder it guards.
    fn reset(&mut self) {}
}

/// Default policy: overflowing glyphs are placed anyway.
///
/// Lines simply run past the width limit, which is what a caller measuring
/// unconstrained text wants.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTruncation;

impl OverflowPolicy for NoTruncation {}

/// Closes the builder at the first glyph that would overflow the width.
///
/// The overflowing glyph itself is rejected. `reset` reopens the builder.
#[derive(Clone, Copy, Debug, Default)]
pub struct TruncateAtWidth {
    closed: bool,
}

impl TruncateAtWidth {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OverflowPolicy for TruncateAtWidth {
    fn can_add(&self) -> bool {
        !self.closed
    }

    fn width_exceeded(&mut self) {
        self.closed = true;
    }

    fn reset(&mut self) {
        self.closed = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_closes_and_reopens() {
        let mut policy = TruncateAtWidth::new();
        assert!(policy.can_add());

        policy.width_exceeded();
        assert!(!policy.can_add());

        policy.reset();
        assert!(policy.can_add());
    }

    #[test]
    fn no_truncation_never_closes() {
        let mut policy = NoTruncation;
        policy.width_exceeded();
        assert!(policy.can_add());
    }
}
