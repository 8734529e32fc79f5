//! Fixed-size bit set over the whole key/button code space.

use input_linux_sys::KEY_CNT;
use std::fmt;

/// Number of distinct key/button codes.
pub const BUTTON_CODE_COUNT: usize = KEY_CNT as usize;

const WORD_BITS: usize = u64::BITS as usize;
const WORDS: usize = BUTTON_CODE_COUNT.div_ceil(WORD_BITS);

/// Button state indexed by key/button code. Iteration is in ascending code
/// order regardless of word boundaries.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonSet {
    words: [u64; WORDS],
}

#[inline]
fn slot(code: u16) -> Option<(usize, u64)> {
    let code = usize::from(code);
    (code < BUTTON_CODE_COUNT).then(|| (code / WORD_BITS, 1u64 << (code % WORD_BITS)))
}

impl ButtonSet {
    #[must_use]
    pub const fn new() -> Self {
        ButtonSet { words: [0; WORDS] }
    }

    /// Marks `code` as pressed. Returns false if `code` is outside the code space.
    pub fn insert(&mut self, code: u16) -> bool {
        match slot(code) {
            Some((word, mask)) => {
                self.words[word] |= mask;
                true
            }
            None => false,
        }
    }

    /// Marks `code` as released. Returns false if `code` is outside the code space.
    pub fn remove(&mut self, code: u16) -> bool {
        match slot(code) {
            Some((word, mask)) => {
                self.words[word] &= !mask;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn contains(&self, code: u16) -> bool {
        slot(code).is_some_and(|(word, mask)| self.words[word] & mask != 0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Codes set in `self` but not in `other`.
    #[must_use]
    pub fn difference(&self, other: &ButtonSet) -> ButtonSet {
        let mut out = ButtonSet::new();
        for (o, (a, b)) in out.words.iter_mut().zip(self.words.iter().zip(other.words.iter())) {
            *o = a & !b;
        }
        out
    }

    /// Codes set in exactly one of `self` and `other`.
    #[must_use]
    pub fn symmetric_difference(&self, other: &ButtonSet) -> ButtonSet {
        let mut out = ButtonSet::new();
        for (o, (a, b)) in out.words.iter_mut().zip(self.words.iter().zip(other.words.iter())) {
            *o = a ^ b;
        }
        out
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            words: &self.words,
            index: 0,
            current: self.words[0],
        }
    }
}

impl fmt::Debug for ButtonSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl FromIterator<u16> for ButtonSet {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        let mut set = ButtonSet::new();
        for code in iter {
            set.insert(code);
        }
        set
    }
}

impl<'a> IntoIterator for &'a ButtonSet {
    type Item = u16;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Ascending iterator over the codes in a [`ButtonSet`].
pub struct Iter<'a> {
    words: &'a [u64; WORDS],
    index: usize,
    current: u64,
}

impl Iterator for Iter<'_> {
    type Item = u16;

    fn next(&mut self) -> Option<u16> {
        loop {
            if self.current != 0 {
                let bit = self.current.trailing_zeros() as usize;
                self.current &= self.current - 1;
                // index * 64 + bit < BUTTON_CODE_COUNT, which fits in u16
                return Some((self.index * WORD_BITS + bit) as u16);
            }
            self.index += 1;
            if self.index >= WORDS {
                return None;
            }
            self.current = self.words[self.index];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iterates_in_ascending_order_across_words() {
        let set: ButtonSet = [0x14b, 0x100, 63, 64, 0, 0x2ff].into_iter().collect();
        let codes: Vec<u16> = set.iter().collect();
        assert_eq!(codes, vec![0, 63, 64, 0x100, 0x14b, 0x2ff]);
        assert_eq!(set.len(), 6);
    }

    #[test]
    fn rejects_codes_outside_code_space() {
        let mut set = ButtonSet::new();
        assert!(!set.insert(BUTTON_CODE_COUNT as u16));
        assert!(!set.remove(u16::MAX));
        assert!(!set.contains(u16::MAX));
        assert!(set.is_empty());
    }

    #[test]
    fn difference_is_directional() {
        let before: ButtonSet = [0x100, 0x101].into_iter().collect();
        let after: ButtonSet = [0x101, 0x102].into_iter().collect();

        let released: Vec<u16> = before.difference(&after).iter().collect();
        let pressed: Vec<u16> = after.difference(&before).iter().collect();
        assert_eq!(released, vec![0x100]);
        assert_eq!(pressed, vec![0x102]);
        assert_eq!(before.symmetric_difference(&after).len(), 2);
    }

    #[test]
    fn remove_clears_only_that_code() {
        let mut set: ButtonSet = [1, 2, 3].into_iter().collect();
        assert!(set.remove(2));
        assert!(set.contains(1) && !set.contains(2) && set.contains(3));
        assert_eq!(set.len(), 2);
    }
}
