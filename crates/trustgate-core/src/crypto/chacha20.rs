//! ChaCha20 stream cipher, IETF-shaped state with a 64-bit nonce split into
//! two 32-bit words and a 32-bit block counter. 20 rounds (10 double-rounds).
//!
//! State layout (16 little-endian 32-bit words), matching the wire format
//! exactly:
//!
//! ```text
//! [ "expa" "nd 3" "2-by" "te k" ]   constants
//! [ key[0] key[1] key[2] key[3] ]
//! [ key[4] key[5] key[6] key[7] ]
//! [ counter  nonce_lo  nonce_hi  0 ]
//! ```

const CONSTANTS: [u32; 4] = [0x6170_7865, 0x3320_646e, 0x7962_2d32, 0x6b20_6574];

#[inline]
fn rotl32(v: u32, n: u32) -> u32 {
    v.rotate_left(n)
}

fn quarter_round(x: &mut [u32; 16], a: usize, b: usize, c: usize, d: usize) {
    x[a] = x[a].wrapping_add(x[b]);
    x[d] = rotl32(x[d] ^ x[a], 16);
    x[c] = x[c].wrapping_add(x[d]);
    x[b] = rotl32(x[b] ^ x[c], 12);
    x[a] = x[a].wrapping_add(x[b]);
    x[d] = rotl32(x[d] ^ x[a], 8);
    x[c] = x[c].wrapping_add(x[d]);
    x[b] = rotl32(x[b] ^ x[c], 7);
}

fn block(key: &[u32; 8], counter: u32, nonce: u64) -> [u8; 64] {
    let initial: [u32; 16] = [
        CONSTANTS[0],
        CONSTANTS[1],
        CONSTANTS[2],
        CONSTANTS[3],
        key[0],
        key[1],
        key[2],
        key[3],
        key[4],
        key[5],
        key[6],
        key[7],
        counter,
        nonce as u32,
        (nonce >> 32) as u32,
        0,
    ];

    let mut x = initial;
    for _ in 0..10 {
        quarter_round(&mut x, 0, 4, 8, 12);
        quarter_round(&mut x, 1, 5, 9, 13);
        quarter_round(&mut x, 2, 6, 10, 14);
        quarter_round(&mut x, 3, 7, 11, 15);
        quarter_round(&mut x, 0, 5, 10, 15);
        quarter_round(&mut x, 1, 6, 11, 12);
        quarter_round(&mut x, 2, 7, 8, 13);
        quarter_round(&mut x, 3, 4, 9, 14);
    }

    let mut out = [0u8; 64];
    for i in 0..16 {
        let word = x[i].wrapping_add(initial[i]);
        out[i * 4..i * 4 + 4].copy_from_slice(&word.to_le_bytes());
    }
    out
}

/// XOR `data` in place with the ChaCha20 keystream for `key`/`nonce`,
/// starting at block `counter`. The final partial block is truncated to
/// `data`'s remaining length rather than padded.
pub fn encrypt(data: &mut [u8], key: &[u32; 8], nonce: u64, counter: u32) {
    let mut counter = counter;
    for chunk in data.chunks_mut(64) {
        let keystream = block(key, counter, nonce);
        for (byte, ks) in chunk.iter_mut().zip(keystream.iter()) {
            *byte ^= ks;
        }
        counter = counter.wrapping_add(1);
    }
}
