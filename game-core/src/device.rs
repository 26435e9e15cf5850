use sha2::{Digest, Sha256};

/// Devices are only ever stored as a digest of the client supplied id
pub fn hash_device_id(device_id: &str) -> String {
    format!("{:x}", Sha256::digest(device_id.trim().as_bytes()))
}
