//! The flat root directory.
//!
//! The directory lives in the last 4 data blocks, as an array of fixed-size
//! entries: `(name, inode_nb)`. Per the redesign here, a slot's state is an
//! explicit `DirSlot` rather than a magic `inode_nb` value, and name
//! comparisons are always bounded to `NAME_LEN` bytes so a too-long lookup
//! key can never read past the stored name's NUL padding.

use crate::inode::InodeNumber;
use crate::layout::{
	DIR_ENTRIES_PER_BLOCK, DIR_ENTRY_SIZE, DIR_TOTAL_ENTRIES, NAME_LEN, UNUSABLE_INODE_NB,
	UNUSABLE_NAME,
};

/// A directory-entry name: up to 9 bytes, NUL-padded to `NAME_LEN` on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileName([u8; NAME_LEN]);

impl FileName {
	/// Builds a name from a string, truncating to the first `NAME_LEN - 1` bytes.
	pub fn new(s: &str) -> Self {
		let mut buf = [0u8; NAME_LEN];
		let bytes = s.as_bytes();
		let n = bytes.len().min(NAME_LEN - 1);
		buf[..n].copy_from_slice(&bytes[..n]);
		Self(buf)
	}

	fn to_bytes(self) -> [u8; NAME_LEN] {
		self.0
	}

	fn from_bytes(buf: &[u8]) -> Self {
		let mut arr = [0u8; NAME_LEN];
		arr.copy_from_slice(&buf[..NAME_LEN]);
		Self(arr)
	}

	/// Renders the name back to a `String`, stopping at the first NUL.
	pub fn as_str(&self) -> String {
		let end = self.0.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
		String::from_utf8_lossy(&self.0[..end]).into_owned()
	}
}

/// The state of one physical directory-entry slot.
#[derive(Debug, Clone, Copy)]
pub enum DirSlot {
	/// Never used, or freed by a removal — available for `insert`.
	Free,
	/// A shadow-root slot reserved for the (unimplemented) copy-on-write
	/// feature. Byte-layout-correct but never allocated into.
	Reserved,
	/// A live directory entry.
	Entry { name: FileName, inode: InodeNumber },
}

const SENTINEL: u32 = u32::MAX;
const RESERVED_SENTINEL: u32 = UNUSABLE_INODE_NB as u32;

impl DirSlot {
	fn to_bytes(self) -> [u8; DIR_ENTRY_SIZE] {
		let mut out = [0u8; DIR_ENTRY_SIZE];
		let (name, inode) = match self {
			Self::Free => ([0u8; NAME_LEN], SENTINEL),
			Self::Reserved => (FileName::new(UNUSABLE_NAME).to_bytes(), RESERVED_SENTINEL),
			Self::Entry { name, inode } => (name.to_bytes(), inode.0),
		};
		out[..NAME_LEN].copy_from_slice(&name);
		out[NAME_LEN..].copy_from_slice(&inode.to_le_bytes());
		out
	}

	fn from_bytes(buf: &[u8]) -> Self {
		let name = FileName::from_bytes(&buf[..NAME_LEN]);
		let inode = u32::from_le_bytes(buf[NAME_LEN..DIR_ENTRY_SIZE].try_into().unwrap());
		match inode {
			SENTINEL => Self::Free,
			RESERVED_SENTINEL => Self::Reserved,
			n => Self::Entry {
				name,
				inode: InodeNumber(n),
			},
		}
	}
}

/// An in-memory cache of the directory's `DIR_TOTAL_ENTRIES` slots.
pub struct Directory {
	slots: Vec<DirSlot>,
}

impl Directory {
	/// Builds a freshly formatted directory.
	///
	/// The 4 directory blocks hold more physical slots than the inode table
	/// supports (`DIR_TOTAL_ENTRIES > MAX_FILES`), so the trailing slots are
	/// permanently reserved — the same "UNUSABLE" capping trick the original
	/// layout uses, generalized to whatever the entry size works out to.
	pub fn format() -> Self {
		let mut slots = vec![DirSlot::Free; DIR_TOTAL_ENTRIES];
		for slot in slots.iter_mut().skip(crate::layout::MAX_FILES) {
			*slot = DirSlot::Reserved;
		}
		Self { slots }
	}

	/// Deserializes the directory from its 4 concatenated on-disk blocks.
	pub fn from_bytes(buf: &[u8]) -> Self {
		let slots = buf
			.chunks_exact(DIR_ENTRY_SIZE)
			.take(DIR_TOTAL_ENTRIES)
			.map(DirSlot::from_bytes)
			.collect();
		Self { slots }
	}

	/// Serializes the directory back into its 4 concatenated on-disk blocks.
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = Vec::with_capacity(DIR_ENTRIES_PER_BLOCK * DIR_ENTRY_SIZE * 4);
		for slot in &self.slots {
			out.extend_from_slice(&slot.to_bytes());
		}
		out
	}

	/// Looks up a name without mutating any state.
	pub fn lookup(&self, name: &str) -> Option<InodeNumber> {
		let key = FileName::new(name);
		self.slots.iter().find_map(|s| match s {
			DirSlot::Entry { name, inode } if *name == key => Some(*inode),
			_ => None,
		})
	}

	/// Inserts a new entry into the first free slot.
	pub fn insert(&mut self, name: &str, inode: InodeNumber) -> Result<(), crate::error::Error> {
		let key = FileName::new(name);
		let slot = self
			.slots
			.iter_mut()
			.find(|s| matches!(s, DirSlot::Free))
			.ok_or(crate::error::Error::NoSpace)?;
		*slot = DirSlot::Entry { name: key, inode };
		Ok(())
	}

	/// Removes the entry for `name`, if one exists.
	pub fn remove(&mut self, name: &str) -> Result<InodeNumber, crate::error::Error> {
		let key = FileName::new(name);
		let slot = self
			.slots
			.iter_mut()
			.find(|s| matches!(s, DirSlot::Entry { name, .. } if *name == key))
			.ok_or(crate::error::Error::NotFound)?;
		let inode = match *slot {
			DirSlot::Entry { inode, .. } => inode,
			_ => unreachable!(),
		};
		*slot = DirSlot::Free;
		Ok(inode)
	}

	/// Iterates over the live entries, in slot order.
	pub fn entries(&self) -> impl Iterator<Item = (FileName, InodeNumber)> + '_ {
		self.slots.iter().filter_map(|s| match s {
			DirSlot::Entry { name, inode } => Some((*name, *inode)),
			_ => None,
		})
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn insert_then_lookup() {
		let mut dir = Directory::format();
		dir.insert("foo", InodeNumber(3)).unwrap();
		assert_eq!(dir.lookup("foo"), Some(InodeNumber(3)));
		assert_eq!(dir.lookup("bar"), None);
	}

	#[test]
	fn remove_is_notfound_when_absent() {
		let mut dir = Directory::format();
		assert!(matches!(
			dir.remove("nope"),
			Err(crate::error::Error::NotFound)
		));
	}

	#[test]
	fn lookup_has_no_side_effects_on_miss() {
		let mut dir = Directory::format();
		dir.insert("a", InodeNumber(1)).unwrap();
		let before = dir.to_bytes();
		let _ = dir.lookup("does-not-exist");
		assert_eq!(before, dir.to_bytes());
	}

	#[test]
	fn full_directory_rejects_insert() {
		let mut dir = Directory::format();
		for i in 0..crate::layout::MAX_FILES {
			dir.insert(&format!("f{i}"), InodeNumber(i as u32)).unwrap();
		}
		assert!(matches!(
			dir.insert("overflow", InodeNumber(9999)),
			Err(crate::error::Error::NoSpace)
		));
	}

	#[test]
	fn roundtrip_through_bytes() {
		let mut dir = Directory::format();
		dir.insert("roundtrip", InodeNumber(42)).unwrap();
		let bytes = dir.to_bytes();
		let restored = Directory::from_bytes(&bytes);
		assert_eq!(restored.lookup("roundtrip"), Some(InodeNumber(42)));
	}

	#[test]
	fn name_longer_than_field_is_truncated_not_overrun() {
		let long = "a".repeat(50);
		let name = FileName::new(&long);
		assert_eq!(name.as_str().len(), NAME_LEN - 1);
	}

	#[test]
	fn entries_lists_live_slots_only() {
		let mut dir = Directory::format();
		dir.insert("x", InodeNumber(5)).unwrap();
		dir.insert("y", InodeNumber(6)).unwrap();
		let names: Vec<String> = dir.entries().map(|(n, _)| n.as_str()).collect();
		assert!(names.contains(&"x".to_string()));
		assert!(names.contains(&"y".to_string()));
		assert_eq!(dir.entries().count(), 2);
	}
}
