use rand::RngCore;

const TOKEN_BYTES: usize = 32;

/// 256-bit invite token from the thread-local CSPRNG, hex encoded.
/// Unguessable by construction; uniqueness is additionally backstopped by
/// the storage index on the token path.
pub fn generate_invite_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
