use rand::RngCore;

/// Generates an opaque invitation token: 32 random bytes, hex encoded.
pub fn generate_invitation_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
