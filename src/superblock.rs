//! The superblock: magic, geometry, and the root j-node.
//!
//! Occupies block 0 in its entirety. The tail of the block past the root
//! j-node is filled with shadow-root slots — reserved for a possible future
//! copy-on-write feature, byte-layout-correct but never read or written by
//! anything in this crate (see `RootJNode` docs and `DESIGN.md`).

use crate::inode::RootJNode;
use crate::layout::{BLOCK_SIZE, INODE_COUNT, MAGIC, NODE_SIZE, TOTAL_BLOCKS};

const HEADER_SIZE: usize = 4 + 4 + 4 + 4; // magic, block_size, fs_size, inode_count
const SHADOW_ROOT_SLOTS: usize = (BLOCK_SIZE - HEADER_SIZE - NODE_SIZE) / NODE_SIZE;

/// In-memory view of block 0.
pub struct Superblock {
	pub root: RootJNode,
}

impl Superblock {
	/// Builds the superblock for a freshly formatted device.
	pub fn format(root: RootJNode) -> Self {
		Self { root }
	}

	pub fn to_bytes(&self) -> [u8; BLOCK_SIZE] {
		let mut out = [0u8; BLOCK_SIZE];
		out[0..4].copy_from_slice(&MAGIC.to_le_bytes());
		out[4..8].copy_from_slice(&(BLOCK_SIZE as u32).to_le_bytes());
		out[8..12].copy_from_slice(&(TOTAL_BLOCKS as u32).to_le_bytes());
		out[12..16].copy_from_slice(&(INODE_COUNT as u32).to_le_bytes());
		out[HEADER_SIZE..HEADER_SIZE + NODE_SIZE].copy_from_slice(&self.root.to_bytes());

		let shadow_start = HEADER_SIZE + NODE_SIZE;
		let empty_shadow = crate::inode::Inode::empty().to_bytes();
		for i in 0..SHADOW_ROOT_SLOTS {
			let off = shadow_start + i * NODE_SIZE;
			if off + NODE_SIZE <= BLOCK_SIZE {
				out[off..off + NODE_SIZE].copy_from_slice(&empty_shadow);
			}
		}
		out
	}

	/// Parses block 0. Returns `None` if the magic number doesn't match.
	pub fn from_bytes(buf: &[u8]) -> Option<Self> {
		let magic = u32::from_le_bytes(buf[0..4].try_into().unwrap());
		if magic != MAGIC {
			return None;
		}
		let root = RootJNode::from_bytes(&buf[HEADER_SIZE..HEADER_SIZE + NODE_SIZE]);
		Some(Self { root })
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::inode::BlockIdx;
	use crate::layout::DIRECT_PTRS;

	#[test]
	fn format_then_parse_roundtrips_magic_and_root() {
		let mut direct = [None; DIRECT_PTRS];
		direct[0] = Some(BlockIdx(0));
		let root = RootJNode {
			size: 1024,
			direct,
		};
		let sb = Superblock::format(root);
		let bytes = sb.to_bytes();
		let parsed = Superblock::from_bytes(&bytes).expect("magic should parse");
		assert_eq!(parsed.root.size, 1024);
		assert_eq!(parsed.root.direct[0], Some(BlockIdx(0)));
	}

	#[test]
	fn bad_magic_is_rejected() {
		let buf = [0u8; BLOCK_SIZE];
		assert!(Superblock::from_bytes(&buf).is_none());
	}
}
