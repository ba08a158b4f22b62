use std::ops::Range;

/// Pages through a list `capacity` items at a time.
///
/// `advance` moves the window forward by a full page and wraps back to the
/// start once the next page would begin past the end. Lists that fit in a
/// single page never move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rotator {
    capacity: usize,
    len: usize,
    start: usize,
}

impl Rotator {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            len: 0,
            start: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn start(&self) -> usize {
        self.start
    }

    /// Track a recomputed list. The window only jumps back to the first
    /// page when the length changed; otherwise the current page stays put.
    /// Returns `true` if the window was reset.
    pub fn set_len(&mut self, len: usize) -> bool {
        if len == self.len {
            return false;
        }
        self.len = len;
        self.start = 0;
        true
    }

    /// Back to the first page.
    pub fn reset(&mut self) {
        self.start = 0;
    }

    pub fn is_rotating(&self) -> bool {
        self.capacity > 0 && self.len > self.capacity
    }

    /// Move to the next page. Returns `true` if the window moved.
    pub fn advance(&mut self) -> bool {
        if !self.is_rotating() {
            return false;
        }
        let next = self.start + self.capacity;
        self.start = if next >= self.len { 0 } else { next };
        true
    }

    /// Index range currently visible.
    pub fn window(&self) -> Range<usize> {
        let start = self.start.min(self.len);
        let end = (start + self.capacity).min(self.len);
        start..end
    }

    /// The visible slice of `items`. `items` is expected to have the length
    /// last passed to [`set_len`](Self::set_len); shorter slices are clamped.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let range = self.window();
        let end = range.end.min(items.len());
        let start = range.start.min(end);
        &items[start..end]
    }

    /// "Showing a-b of n" while rotating, `None` otherwise.
    pub fn page_label(&self) -> Option<String> {
        if !self.is_rotating() {
            return None;
        }
        let range = self.window();
        Some(format!(
            "Showing {}-{} of {}",
            range.start + 1,
            range.end,
            self.len
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_lists_do_not_rotate() {
        let mut r = Rotator::new(5);
        r.set_len(5);
        assert!(!r.is_rotating());
        assert!(!r.advance());
        assert_eq!(r.window(), 0..5);
        assert_eq!(r.page_label(), None);
    }

    #[test]
    fn pages_advance_and_wrap() {
        let mut r = Rotator::new(5);
        r.set_len(12);
        assert_eq!(r.window(), 0..5);
        r.advance();
        assert_eq!(r.window(), 5..10);
        assert_eq!(r.page_label().as_deref(), Some("Showing 6-10 of 12"));
        r.advance();
        assert_eq!(r.window(), 10..12);
        r.advance();
        assert_eq!(r.window(), 0..5);
    }

    #[test]
    fn window_returns_home_after_ceil_len_over_capacity_steps() {
        for len in 1..40usize {
            for cap in 1..len {
                let mut r = Rotator::new(cap);
                r.set_len(len);
                let steps = len.div_ceil(cap);
                for i in 0..steps {
                    if i > 0 {
                        assert_ne!(r.start(), 0, "len={len} cap={cap} step={i}");
                    }
                    r.advance();
                }
                assert_eq!(r.start(), 0, "len={len} cap={cap}");
            }
        }
    }

    #[test]
    fn same_length_refresh_keeps_the_page() {
        let mut r = Rotator::new(3);
        r.set_len(9);
        r.advance();
        assert!(!r.set_len(9));
        assert_eq!(r.start(), 3);
        assert!(r.set_len(8));
        assert_eq!(r.start(), 0);
    }

    #[test]
    fn slice_clamps_to_items() {
        let items = [1, 2, 3, 4, 5, 6, 7];
        let mut r = Rotator::new(3);
        r.set_len(items.len());
        r.advance();
        r.advance();
        assert_eq!(r.slice(&items), &[7]);
        assert_eq!(r.slice(&items[..4]), &[] as &[i32]);
    }

    #[test]
    fn zero_capacity_shows_nothing() {
        let mut r = Rotator::new(0);
        r.set_len(4);
        assert!(!r.is_rotating());
        assert_eq!(r.window(), 0..0);
    }

    #[test]
    fn reset_returns_to_the_first_page() {
        let mut r = Rotator::new(2);
        r.set_len(4);
        r.advance();
        assert_eq!(r.start(), 2);
        assert!(!r.set_len(4));
        r.reset();
        assert_eq!(r.window(), 0..2);
    }
}
