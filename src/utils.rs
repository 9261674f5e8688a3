/// Number of key bits consumed per tree level.
pub(crate) const RADIX_SHIFT: usize = 6;

/// Fan-out of every internal node.
pub(crate) const RADIX_SIZE: usize = 1 << RADIX_SHIFT;

const RADIX_MASK: u64 = (RADIX_SIZE - 1) as u64;

/// Largest supported height. A tree of this height covers all 64 key bits.
pub const MAX_HEIGHT: u8 = 10;

/// The digit of `key` consumed at `height`.
#[inline]
pub(crate) fn digit(key: u64, height: u8) -> u8 {
    debug_assert!(height <= MAX_HEIGHT);
    ((key >> (height as usize * RADIX_SHIFT)) & RADIX_MASK) as u8
}

/// The bits of `key` below the digit at `height`, i.e. what a leaf hanging
/// off a node of this height keeps as its `rest`.
#[inline]
pub(crate) fn residual(key: u64, height: u8) -> u64 {
    debug_assert!(height <= MAX_HEIGHT);
    key & ((1u64 << (height as usize * RADIX_SHIFT)) - 1)
}

/// Number of key bits a tree of `height` can index.
#[inline]
pub(crate) fn key_bits(height: u8) -> u32 {
    ((height as u32 + 1) * RADIX_SHIFT as u32).min(u64::BITS)
}

/// Largest key accepted by a tree of `height`.
#[inline]
pub(crate) fn max_key(height: u8) -> u64 {
    let bits = key_bits(height);
    if bits == u64::BITS {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

#[inline]
pub(crate) fn key_fits(key: u64, height: u8) -> bool {
    key <= max_key(height)
}

/// Records the digits taken on the way down so a leaf's full key can be
/// rebuilt from its `rest`.
#[derive(Clone)]
pub(crate) struct KeyTracker {
    root_height: u8,
    len: usize,
    data: [u8; MAX_HEIGHT as usize + 1],
}

impl KeyTracker {
    #[inline]
    pub(crate) fn new(root_height: u8) -> Self {
        Self {
            root_height,
            len: 0,
            data: [0; MAX_HEIGHT as usize + 1],
        }
    }

    #[inline]
    pub(crate) fn push(&mut self, digit: u8) {
        debug_assert!(self.len <= self.root_height as usize);

        self.data[self.len] = digit;
        self.len += 1;
    }

    #[inline]
    pub(crate) fn pop(&mut self) -> u8 {
        debug_assert!(self.len > 0);

        let v = self.data[self.len - 1];
        self.len -= 1;
        v
    }

    /// Combines the tracked digits with the residual bits stored at a leaf.
    #[inline]
    pub(crate) fn to_key(&self, rest: u64) -> u64 {
        let mut key = rest;
        for (i, d) in self.data[..self.len].iter().enumerate() {
            let height = self.root_height as usize - i;
            key |= (*d as u64) << (height * RADIX_SHIFT);
        }
        key
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digits_and_residuals() {
        let key = 0b101010_000111_110000u64;
        assert_eq!(digit(key, 0), 0b110000);
        assert_eq!(digit(key, 1), 0b000111);
        assert_eq!(digit(key, 2), 0b101010);
        assert_eq!(digit(key, 3), 0);

        assert_eq!(residual(key, 0), 0);
        assert_eq!(residual(key, 1), 0b110000);
        assert_eq!(residual(key, 2), 0b000111_110000);

        assert_eq!(digit(u64::MAX, MAX_HEIGHT), 0b1111);
        assert_eq!(residual(u64::MAX, MAX_HEIGHT), (1 << 60) - 1);
    }

    #[test]
    fn key_width_per_height() {
        assert_eq!(key_bits(0), 6);
        assert_eq!(key_bits(2), 18);
        assert_eq!(key_bits(MAX_HEIGHT), 64);

        assert_eq!(max_key(0), 63);
        assert_eq!(max_key(2), (1 << 18) - 1);
        assert_eq!(max_key(MAX_HEIGHT), u64::MAX);

        assert!(key_fits(63, 0));
        assert!(!key_fits(64, 0));
        assert!(key_fits(u64::MAX, MAX_HEIGHT));
    }

    #[test]
    fn key_tracker_rebuilds_key() {
        let key = 0x3_1234_5678u64;
        let root_height = 5;
        let mut tracker = KeyTracker::new(root_height);

        // leaf sits at height 3, below digits taken at heights 5, 4 and 3
        for h in (3..=root_height).rev() {
            tracker.push(digit(key, h));
        }
        assert_eq!(tracker.len(), 3);
        assert_eq!(tracker.to_key(residual(key, 3)), key);

        assert_eq!(tracker.pop(), digit(key, 3));
        assert_eq!(tracker.len(), 2);
    }
}
