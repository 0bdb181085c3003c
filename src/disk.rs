//! Block-device adapter.
//!
//! In the original assignment this is a separate "disk emulator" providing
//! `init_fresh_disk`/`init_disk`/`read_blocks`/`write_blocks` over a named
//! backing file. This module is the Rust equivalent: a small trait so the
//! core can be tested against an in-memory device, plus a `FileDisk` that
//! backs it with a real file the way `mkfs`'s `Ext2Factory` writes an
//! `ext2` image through `std::fs::File` (`Seek` + `read_exact`/`write_all`).

use crate::layout::{BLOCK_SIZE, TOTAL_BLOCKS};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// A block-granular storage device. All I/O on it is whole-block.
pub trait BlockDevice {
	/// Reads `count` blocks starting at `start` into `buf`.
	///
	/// `buf` must be exactly `count * BLOCK_SIZE` bytes long.
	fn read_blocks(&mut self, start: u32, count: u32, buf: &mut [u8]) -> io::Result<()>;

	/// Writes `count` blocks starting at `start` from `buf`.
	///
	/// `buf` must be exactly `count * BLOCK_SIZE` bytes long.
	fn write_blocks(&mut self, start: u32, count: u32, buf: &[u8]) -> io::Result<()>;
}

/// A `BlockDevice` backed by a plain file on the host filesystem.
pub struct FileDisk {
	file: File,
}

impl FileDisk {
	/// Creates a fresh backing file of exactly `TOTAL_BLOCKS * BLOCK_SIZE` bytes,
	/// truncating whatever was there before.
	pub fn init_fresh(path: impl AsRef<Path>) -> io::Result<Self> {
		let file = OpenOptions::new()
			.read(true)
			.write(true)
			.create(true)
			.truncate(true)
			.open(path)?;
		file.set_len((TOTAL_BLOCKS * BLOCK_SIZE) as u64)?;
		Ok(Self { file })
	}

	/// Attaches to an already-formatted backing file without touching its contents.
	pub fn init_existing(path: impl AsRef<Path>) -> io::Result<Self> {
		let file = OpenOptions::new().read(true).write(true).open(path)?;
		Ok(Self { file })
	}
}

impl BlockDevice for FileDisk {
	fn read_blocks(&mut self, start: u32, count: u32, buf: &mut [u8]) -> io::Result<()> {
		debug_assert_eq!(buf.len(), count as usize * BLOCK_SIZE);
		self.file
			.seek(SeekFrom::Start(start as u64 * BLOCK_SIZE as u64))?;
		self.file.read_exact(buf)
	}

	fn write_blocks(&mut self, start: u32, count: u32, buf: &[u8]) -> io::Result<()> {
		debug_assert_eq!(buf.len(), count as usize * BLOCK_SIZE);
		self.file
			.seek(SeekFrom::Start(start as u64 * BLOCK_SIZE as u64))?;
		self.file.write_all(buf)?;
		self.file.flush()
	}
}

/// A `BlockDevice` backed by memory, for tests that don't need a real file.
#[cfg(test)]
pub struct MemDisk {
	blocks: Vec<u8>,
}

#[cfg(test)]
impl MemDisk {
	pub fn new() -> Self {
		Self {
			blocks: vec![0; TOTAL_BLOCKS * BLOCK_SIZE],
		}
	}
}

#[cfg(test)]
impl BlockDevice for MemDisk {
	fn read_blocks(&mut self, start: u32, count: u32, buf: &mut [u8]) -> io::Result<()> {
		let off = start as usize * BLOCK_SIZE;
		let len = count as usize * BLOCK_SIZE;
		buf.copy_from_slice(&self.blocks[off..off + len]);
		Ok(())
	}

	fn write_blocks(&mut self, start: u32, count: u32, buf: &[u8]) -> io::Result<()> {
		let off = start as usize * BLOCK_SIZE;
		let len = count as usize * BLOCK_SIZE;
		self.blocks[off..off + len].copy_from_slice(buf);
		Ok(())
	}
}
