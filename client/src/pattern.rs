//! Rolling byte pattern used to check relayed data.

/// Period of the pattern. Prime, so it never lines up with datagram sizes.
const PERIOD: u64 = 251;

/// Fills `buf` with the pattern bytes for stream positions `offset..`.
pub fn fill(offset: u64, buf: &mut [u8]) {
    for (i, byte) in buf.iter_mut().enumerate() {
        *byte = ((offset + i as u64) % PERIOD) as u8;
    }
}

/// Checks received bytes against the pattern, tracking the stream position.
#[derive(Debug, Default)]
pub struct Verifier {
    offset: u64,
    mismatches: u64,
}

impl Verifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check(&mut self, chunk: &[u8]) {
        for &byte in chunk {
            if byte != (self.offset % PERIOD) as u8 {
                self.mismatches += 1;
            }
            self.offset += 1;
        }
    }

    /// Bytes checked so far.
    pub fn checked(&self) -> u64 {
        self.offset
    }

    pub fn mismatches(&self) -> u64 {
        self.mismatches
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_continues_across_calls() {
        let mut whole = [0u8; 600];
        fill(0, &mut whole);

        let mut first = [0u8; 256];
        let mut second = [0u8; 344];
        fill(0, &mut first);
        fill(256, &mut second);
        assert_eq!(&whole[..256], &first[..]);
        assert_eq!(&whole[256..], &second[..]);
        assert_eq!(whole[251], 0);
    }

    #[test]
    fn test_verifier() {
        let mut data = [0u8; 1000];
        fill(0, &mut data);

        let mut verifier = Verifier::new();
        for chunk in data.chunks(77) {
            verifier.check(chunk);
        }
        assert_eq!(verifier.checked(), 1000);
        assert_eq!(verifier.mismatches(), 0);

        verifier.check(&[0xFF, 0xFF]);
        assert_eq!(verifier.mismatches(), 2);
    }
}
