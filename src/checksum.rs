/// Internet checksum (RFC 1071) over an arbitrary byte buffer.
///
/// The buffer is summed as big-endian 16-bit words; a trailing odd byte is
/// treated as the high byte of a zero-padded word.
pub fn internet_checksum(data: &[u8]) -> u16 {
    let mut sum: u64 = 0;
    let mut words = data.chunks_exact(2);

    for word in &mut words {
        sum += u16::from_be_bytes([word[0], word[1]]) as u64;
    }

    if let Some(&last) = words.remainder().first() {
        sum += (last as u64) << 8;
    }

    // Fold the carries back into the low 16 bits
    while (sum >> 16) != 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }

    !(sum as u16)
}

/// A buffer whose checksum field is already filled in sums to zero.
pub fn verify_checksum(data: &[u8]) -> bool {
    internet_checksum(data) == 0
}
