use md5::{Digest, Md5};

const GUID_MODULUS: u64 = 10_000_000_000_000_000;

/// Stable 16-digit feed identifier derived from a posting link.
///
/// MD5 of the link's UTF-8 bytes; the first 16 hex digits read as an
/// unsigned integer, reduced mod 10^16 and zero-padded to 16 digits.
pub fn generate_id(link: &str) -> String {
    let digest = Md5::digest(link.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    let value = u64::from_be_bytes(prefix) % GUID_MODULUS;
    format!("{:016}", value)
}

/// True for a 16-character all-digit identifier
pub fn is_valid_id(guid: &str) -> bool {
    guid.len() == 16 && guid.bytes().all(|b| b.is_ascii_digit())
}
