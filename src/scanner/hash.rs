use sha1::{Digest, Sha1};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const CHUNK_SIZE: usize = 1024 * 1024;

/// SHA-1 of the whole file, read in 1 MiB chunks so large files are never
/// held in memory. Returns a lowercase hex string (40 characters).
pub fn sha1_of_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha1::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// SHA-1 of an in-memory buffer. Empty input has no hash.
pub fn sha1_of_bytes(data: &[u8]) -> Option<String> {
    if data.is_empty() {
        return None;
    }
    Some(format!("{:x}", Sha1::digest(data)))
}
