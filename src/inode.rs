//! Inode records and the root j-node.
//!
//! The original assignment reinterprets a raw byte buffer as a C struct to
//! read or write an inode. Per the redesign here, records are (de)serialized
//! explicitly, field by field, little-endian, with no pointer casts — the
//! sentinel `-1` entries the original stores in `direct`/`indirect` become
//! `Option<BlockIdx>`/`Option<InodeNumber>` at the API boundary.

use crate::layout::{DIRECT_PTRS, NODE_SIZE};

/// Index of a data block within the data region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlockIdx(pub u32);

/// Index of an inode within the inode region (0 is the root directory's j-node).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InodeNumber(pub u32);

/// The fixed-width on-disk shape shared by the root j-node and every inode.
///
/// `size == u32::MAX` and a pointer equal to `u32::MAX` both stand in for the
/// original's sentinel `-1`; this type is the only place that encoding is
/// known, everything above it works in `Option`.
#[derive(Debug, Clone, Copy)]
struct RawNode {
	size: u32,
	direct: [u32; DIRECT_PTRS],
	indirect: u32,
}

const SENTINEL: u32 = u32::MAX;

impl RawNode {
	fn empty() -> Self {
		Self {
			size: SENTINEL,
			direct: [SENTINEL; DIRECT_PTRS],
			indirect: SENTINEL,
		}
	}

	fn to_bytes(self) -> [u8; NODE_SIZE] {
		let mut out = [0u8; NODE_SIZE];
		out[0..4].copy_from_slice(&self.size.to_le_bytes());
		for (i, ptr) in self.direct.iter().enumerate() {
			let off = 4 + i * 4;
			out[off..off + 4].copy_from_slice(&ptr.to_le_bytes());
		}
		out[60..64].copy_from_slice(&self.indirect.to_le_bytes());
		out
	}

	fn from_bytes(buf: &[u8]) -> Self {
		debug_assert_eq!(buf.len(), NODE_SIZE);
		let size = u32::from_le_bytes(buf[0..4].try_into().unwrap());
		let mut direct = [0u32; DIRECT_PTRS];
		for (i, slot) in direct.iter_mut().enumerate() {
			let off = 4 + i * 4;
			*slot = u32::from_le_bytes(buf[off..off + 4].try_into().unwrap());
		}
		let indirect = u32::from_le_bytes(buf[60..64].try_into().unwrap());
		Self {
			size,
			direct,
			indirect,
		}
	}
}

/// A file inode: either a free slot or an allocated one with its own chain state.
#[derive(Debug, Clone, Copy)]
pub enum Inode {
	Empty,
	Allocated {
		/// Bytes of file content addressed through *this* node's direct pointers
		/// (the local offset within this node's 14-block window, not the file's
		/// total size — continuation nodes in an indirect chain keep their own).
		size: u32,
		direct: [Option<BlockIdx>; DIRECT_PTRS],
		indirect: Option<InodeNumber>,
	},
}

impl Inode {
	pub fn empty() -> Self {
		Self::Empty
	}

	pub fn is_empty(&self) -> bool {
		matches!(self, Self::Empty)
	}

	pub fn to_bytes(self) -> [u8; NODE_SIZE] {
		let raw = match self {
			Self::Empty => RawNode::empty(),
			Self::Allocated {
				size,
				direct,
				indirect,
			} => RawNode {
				size,
				direct: direct.map(|d| d.map(|b| b.0).unwrap_or(SENTINEL)),
				indirect: indirect.map(|n| n.0).unwrap_or(SENTINEL),
			},
		};
		raw.to_bytes()
	}

	pub fn from_bytes(buf: &[u8]) -> Self {
		let raw = RawNode::from_bytes(buf);
		if raw.size == SENTINEL {
			return Self::Empty;
		}
		let mut direct = [None; DIRECT_PTRS];
		for (i, ptr) in raw.direct.iter().enumerate() {
			direct[i] = (*ptr != SENTINEL).then(|| BlockIdx(*ptr));
		}
		let indirect = (raw.indirect != SENTINEL).then(|| InodeNumber(raw.indirect));
		Self::Allocated {
			size: raw.size,
			direct,
			indirect,
		}
	}
}

/// The root j-node: same byte shape as `Inode`, but its `indirect` field is
/// unused (the root directory never overflows its 14 direct blocks) and its
/// `size` is a plain byte count rather than a within-window offset.
#[derive(Debug, Clone, Copy)]
pub struct RootJNode {
	pub size: u32,
	pub direct: [Option<BlockIdx>; DIRECT_PTRS],
}

impl RootJNode {
	pub fn to_bytes(self) -> [u8; NODE_SIZE] {
		Inode::Allocated {
			size: self.size,
			direct: self.direct,
			indirect: None,
		}
		.to_bytes()
	}

	pub fn from_bytes(buf: &[u8]) -> Self {
		match Inode::from_bytes(buf) {
			Inode::Empty => Self {
				size: 0,
				direct: [None; DIRECT_PTRS],
			},
			Inode::Allocated { size, direct, .. } => Self { size, direct },
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn empty_roundtrip() {
		let bytes = Inode::Empty.to_bytes();
		assert!(matches!(Inode::from_bytes(&bytes), Inode::Empty));
	}

	#[test]
	fn allocated_roundtrip() {
		let mut direct = [None; DIRECT_PTRS];
		direct[0] = Some(BlockIdx(7));
		direct[3] = Some(BlockIdx(400));
		let node = Inode::Allocated {
			size: 2048,
			direct,
			indirect: Some(InodeNumber(12)),
		};
		let bytes = node.to_bytes();
		match Inode::from_bytes(&bytes) {
			Inode::Allocated {
				size,
				direct,
				indirect,
			} => {
				assert_eq!(size, 2048);
				assert_eq!(direct[0], Some(BlockIdx(7)));
				assert_eq!(direct[3], Some(BlockIdx(400)));
				assert_eq!(direct[1], None);
				assert_eq!(indirect, Some(InodeNumber(12)));
			}
			Inode::Empty => panic!("expected allocated node"),
		}
	}

	#[test]
	fn node_size_is_64_bytes() {
		assert_eq!(Inode::Empty.to_bytes().len(), NODE_SIZE);
	}
}
