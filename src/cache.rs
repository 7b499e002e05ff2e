//! File cache for generated move and pruning tables.
//!
//! One file per table name, little endian:
//! - u32: element count
//! - payload: u16 per element (move tables) or one packed byte per pair
//!   of entries (pruning tables)
//!
//! Loading is strictly best-effort: a missing file, a short read, or a
//! length that disagrees with the expected table size is a cache miss and
//! the caller regenerates. Saving failures are ignored as well; the
//! in-memory tables stay usable either way.

use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Default cache directory, relative to the working directory.
pub const DEFAULT_DIR: &str = "tables";

fn table_path(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.bin"))
}

/// Loads a `u16` table, or `None` on any miss.
pub fn load_u16(dir: &Path, name: &str, expected_len: usize) -> Option<Vec<u16>> {
    let mut file = File::open(table_path(dir, name)).ok()?;

    let mut u32_buffer = [0u8; 4];
    file.read_exact(&mut u32_buffer).ok()?;
    if u32::from_le_bytes(u32_buffer) as usize != expected_len {
        return None;
    }

    let mut bytes = vec![0u8; expected_len * 2];
    file.read_exact(&mut bytes).ok()?;

    let mut table = Vec::with_capacity(expected_len);
    for pair in bytes.chunks_exact(2) {
        table.push(u16::from_le_bytes([pair[0], pair[1]]));
    }
    Some(table)
}

/// Loads a packed pruning table, or `None` on any miss.
pub fn load_nibbles(dir: &Path, name: &str, expected_bytes: usize) -> Option<Vec<u8>> {
    let mut file = File::open(table_path(dir, name)).ok()?;

    let mut u32_buffer = [0u8; 4];
    file.read_exact(&mut u32_buffer).ok()?;
    if u32::from_le_bytes(u32_buffer) as usize != expected_bytes {
        return None;
    }

    let mut bytes = vec![0u8; expected_bytes];
    file.read_exact(&mut bytes).ok()?;
    Some(bytes)
}

/// Writes a `u16` table. Callers treat failure as non-fatal.
pub fn save_u16(dir: &Path, name: &str, table: &[u16]) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let mut file = File::create(table_path(dir, name))?;
    file.write_all(&(table.len() as u32).to_le_bytes())?;
    for &value in table {
        file.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

/// Writes a packed pruning table. Callers treat failure as non-fatal.
pub fn save_nibbles(dir: &Path, name: &str, bytes: &[u8]) -> std::io::Result<()> {
    fs::create_dir_all(dir)?;
    let mut file = File::create(table_path(dir, name))?;
    file.write_all(&(bytes.len() as u32).to_le_bytes())?;
    file.write_all(bytes)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "twophase-cache-{label}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_u16_round_trip() {
        let dir = scratch_dir("u16");
        let table: Vec<u16> = (0..1000).map(|i| (i * 7) as u16).collect();
        save_u16(&dir, "twist", &table).unwrap();
        assert_eq!(load_u16(&dir, "twist", table.len()), Some(table));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_nibble_round_trip() {
        let dir = scratch_dir("nib");
        let bytes: Vec<u8> = (0..512).map(|i| (i % 251) as u8).collect();
        save_nibbles(&dir, "slice_twist", &bytes).unwrap();
        assert_eq!(load_nibbles(&dir, "slice_twist", bytes.len()), Some(bytes));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_file_is_a_miss() {
        let dir = scratch_dir("miss");
        assert_eq!(load_u16(&dir, "nope", 10), None);
    }

    #[test]
    fn test_length_mismatch_is_a_miss() {
        let dir = scratch_dir("len");
        let table: Vec<u16> = vec![1, 2, 3];
        save_u16(&dir, "short", &table).unwrap();
        assert_eq!(load_u16(&dir, "short", 4), None);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_truncated_payload_is_a_miss() {
        let dir = scratch_dir("trunc");
        fs::create_dir_all(&dir).unwrap();
        // claims 100 elements but carries none
        fs::write(dir.join("bad.bin"), 100u32.to_le_bytes()).unwrap();
        assert_eq!(load_u16(&dir, "bad", 100), None);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_save_into_unwritable_location_fails_quietly() {
        // /proc is not writable; the error must surface as Err, not panic
        let dir = PathBuf::from("/proc/twophase-no-such-cache");
        assert!(save_u16(&dir, "twist", &[1, 2, 3]).is_err());
    }
}
