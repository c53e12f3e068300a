//! Reversible password obfuscation keyed by a shared secret.
//!
//! Every character found on the wheel is rotated by a key-stream byte plus
//! the wheel position of the previous output character; characters off the
//! wheel pass through untouched and do not advance the chain. The key
//! stream is `SHA-256(key) || SHA-256(SHA-256(key))`.

use sha2::{Digest, Sha256};

const WHEEL: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz!\"#$%&'()*+,-./";

/// Longest plain password the service stores.
pub(crate) const MAX_PASSWORD_LEN: usize = 50;

/// Filler appended to short new passwords before scrambling. The service
/// looks for at least fifteen characters of it.
const PASSWORD_PAD: &str = "1gCBizHWbwIYyWLoysGzTe6SyzqFKMniZX05faZHWAwQKXf6Fs";

fn key_stream(key: &str) -> [u8; 64] {
    let first = Sha256::digest(key.as_bytes());
    let second = Sha256::digest(first);
    let mut stream = [0_u8; 64];
    stream[..32].copy_from_slice(&first);
    stream[32..].copy_from_slice(&second);
    stream
}

fn wheel_position(ch: char) -> Option<usize> {
    u8::try_from(ch)
        .ok()
        .and_then(|byte| WHEEL.iter().position(|candidate| *candidate == byte))
}

fn wheel_char(position: usize) -> char {
    char::from(WHEEL[position % WHEEL.len()])
}

/// Scramble `plain` under `key`.
pub(crate) fn encode(plain: &str, key: &str) -> String {
    let stream = key_stream(key);
    let mut chain = 0;
    plain
        .chars()
        .enumerate()
        .map(|(index, ch)| {
            wheel_position(ch).map_or(ch, |position| {
                let shift = usize::from(stream[index % stream.len()]) + chain;
                let rotated = (position + shift) % WHEEL.len();
                chain = rotated;
                wheel_char(rotated)
            })
        })
        .collect()
}

/// Reverse [`encode`].
pub(crate) fn decode(scrambled: &str, key: &str) -> String {
    let stream = key_stream(key);
    let mut chain = 0;
    scrambled
        .chars()
        .enumerate()
        .map(|(index, ch)| {
            wheel_position(ch).map_or(ch, |position| {
                let shift = (usize::from(stream[index % stream.len()]) + chain) % WHEEL.len();
                chain = position;
                wheel_char(position + WHEEL.len() - shift)
            })
        })
        .collect()
}

/// Append the fixed filler to a new password when there is room for it.
pub(crate) fn pad_password(password: &str) -> String {
    let mut padded: String = password.chars().take(MAX_PASSWORD_LEN).collect();
    let room = MAX_PASSWORD_LEN
        .saturating_sub(10)
        .saturating_sub(password.len());
    if room > 15 {
        padded.push_str(PASSWORD_PAD.get(..room).unwrap_or(PASSWORD_PAD));
    }
    padded
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_reverses_encode() {
        for (plain, key) in [
            ("rods", "secret"),
            ("p@ss word/with-odd~chars", "k"),
            ("", "anything"),
            ("0123456789abcdefXYZ!#%", ""),
        ] {
            assert_eq!(decode(&encode(plain, key), key), plain);
        }
    }

    #[test]
    fn encoding_depends_on_key_and_keeps_length() {
        let one = encode("rodsadmin", "alpha");
        let two = encode("rodsadmin", "beta");
        assert_ne!(one, two);
        assert_eq!(one.chars().count(), "rodsadmin".chars().count());
    }

    #[test]
    fn characters_off_the_wheel_pass_through() {
        let scrambled = encode("a b@c", "key");
        assert_eq!(scrambled.chars().nth(1), Some(' '));
        assert_eq!(scrambled.chars().nth(3), Some('@'));
    }

    #[test]
    fn short_passwords_get_padding() {
        let padded = pad_password("newpass");
        assert_eq!(padded.len(), MAX_PASSWORD_LEN - 10);
        assert!(padded.starts_with("newpass1gCBiz"));
    }

    #[test]
    fn long_passwords_are_left_alone() {
        let password = "x".repeat(25);
        assert_eq!(pad_password(&password), password);
        let over = "y".repeat(60);
        assert_eq!(pad_password(&over).len(), MAX_PASSWORD_LEN);
    }
}
