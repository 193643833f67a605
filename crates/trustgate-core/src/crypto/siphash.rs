//! SipHash-2-4: 2 compression rounds per 8-byte block, 4 finalization
//! rounds. Used as the packet MAC, truncated to nothing (the full 64-bit
//! output is the MAC — there is no truncation on the wire).

const ROUND_INIT: [u64; 4] = [
    0x736f_6d65_7073_6575,
    0x646f_7261_6e64_6f6d,
    0x6c79_6765_6e65_7261,
    0x7465_6462_7974_6573,
];

#[inline]
fn rotl(x: u64, b: u32) -> u64 {
    x.rotate_left(b)
}

macro_rules! sipround {
    ($v0:expr, $v1:expr, $v2:expr, $v3:expr) => {
        $v0 = $v0.wrapping_add($v1);
        $v1 = rotl($v1, 13);
        $v1 ^= $v0;
        $v0 = rotl($v0, 32);
        $v2 = $v2.wrapping_add($v3);
        $v3 = rotl($v3, 16);
        $v3 ^= $v2;
        $v0 = $v0.wrapping_add($v3);
        $v3 = rotl($v3, 21);
        $v3 ^= $v0;
        $v2 = $v2.wrapping_add($v1);
        $v1 = rotl($v1, 17);
        $v1 ^= $v2;
        $v2 = rotl($v2, 32);
    };
}

/// Compute SipHash-2-4 over `data` using the 128-bit key `k`.
pub fn siphash24(data: &[u8], k: &[u64; 2]) -> u64 {
    let mut v0 = ROUND_INIT[0] ^ k[0];
    let mut v1 = ROUND_INIT[1] ^ k[1];
    let mut v2 = ROUND_INIT[2] ^ k[0];
    let mut v3 = ROUND_INIT[3] ^ k[1];

    let len = data.len();
    let chunks = data.chunks_exact(8);
    let tail = chunks.remainder();

    for chunk in chunks {
        let m = u64::from_le_bytes(chunk.try_into().unwrap());
        v3 ^= m;
        sipround!(v0, v1, v2, v3);
        sipround!(v0, v1, v2, v3);
        v0 ^= m;
    }

    let mut m: u64 = (len as u64) << 56;
    for (i, &byte) in tail.iter().enumerate() {
        m |= (byte as u64) << (8 * i);
    }

    v3 ^= m;
    sipround!(v0, v1, v2, v3);
    sipround!(v0, v1, v2, v3);
    v0 ^= m;

    v2 ^= 0xff;
    sipround!(v0, v1, v2, v3);
    sipround!(v0, v1, v2, v3);
    sipround!(v0, v1, v2, v3);
    sipround!(v0, v1, v2, v3);

    v0 ^ v1 ^ v2 ^ v3
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Standard key bytes 0x00..0x0f as two little-endian 64-bit words,
    /// the key used by the canonical SipHash-2-4 test vector suite.
    const STD_KEY: [u64; 2] = [0x0706_0504_0302_0100u64, 0x0f0e_0d0c_0b0a_0908u64];

    #[test]
    fn empty_input_is_deterministic() {
        assert_eq!(siphash24(&[], &STD_KEY), siphash24(&[], &STD_KEY));
    }

    #[test]
    fn tail_byte_packing_covers_every_remainder_length() {
        // Exercise the 0..7 byte tail-packing path (match arms for every
        // `left` value in the reference C implementation's switch).
        let mut seen = std::collections::HashSet::new();
        for len in 0..=15usize {
            let data: Vec<u8> = (0..len as u8).collect();
            seen.insert(siphash24(&data, &STD_KEY));
        }
        // All lengths up to 15 bytes must produce distinct MACs; a packing
        // bug (e.g. dropping the length byte) would collide some of these.
        assert_eq!(seen.len(), 16);
    }

    #[test]
    fn eight_byte_input_exercises_full_block_path() {
        let data: Vec<u8> = (0u8..8).collect();
        let out = siphash24(&data, &STD_KEY);
        assert_eq!(out, siphash24(&data, &STD_KEY));
        assert_ne!(out, siphash24(&[], &STD_KEY));
    }

    #[test]
    fn different_keys_produce_different_macs() {
        let data = b"packet-payload-bytes";
        let k1 = [1u64, 2u64];
        let k2 = [1u64, 3u64];
        assert_ne!(siphash24(data, &k1), siphash24(data, &k2));
    }

    #[test]
    fn single_bit_flip_changes_mac() {
        let k = [11u64, 22u64];
        let mut data = vec![0u8; 56];
        let base = siphash24(&data, &k);
        data[30] ^= 0x01;
        let flipped = siphash24(&data, &k);
        assert_ne!(base, flipped);
    }
}
