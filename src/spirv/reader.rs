//! Forward-only cursor over a SPIR-V word sequence.

/// Sequential reader over borrowed SPIR-V words.
///
/// Every call to [`WordReader::next`] yields the next unread word and
/// advances the cursor; `None` marks the end of input. There is no seek and
/// no rewind; a fresh reader is needed to read the sequence again. The
/// reader implements [`Iterator`], so it can be handed directly to parsers
/// that pull words (for example naga's SPIR-V front-end).
#[derive(Debug, Clone)]
pub struct WordReader<'a> {
    words: &'a [u32],
    position: usize,
}

impl<'a> WordReader<'a> {
    #[must_use]
    pub fn new(words: &'a [u32]) -> Self {
        Self { words, position: 0 }
    }

    /// Number of words already consumed.
    #[inline]
    #[must_use]
    pub fn position(&self) -> usize {
        self.position
    }

    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.words.len() - self.position
    }

    #[inline]
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.position >= self.words.len()
    }

    /// Consumes `count` words at once, or `None` (consuming nothing) when
    /// fewer remain.
    pub fn read_words(&mut self, count: usize) -> Option<&'a [u32]> {
        let end = self.position.checked_add(count)?;
        let slice = self.words.get(self.position..end)?;
        self.position = end;
        Some(slice)
    }

    /// Consumes everything that is left.
    pub fn read_rest(&mut self) -> &'a [u32] {
        let slice = &self.words[self.position..];
        self.position = self.words.len();
        slice
    }
}

impl Iterator for WordReader<'_> {
    type Item = u32;

    #[inline]
    fn next(&mut self) -> Option<u32> {
        let word = *self.words.get(self.position)?;
        self.position += 1;
        Some(word)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.remaining();
        (n, Some(n))
    }
}

impl ExactSizeIterator for WordReader<'_> {}
