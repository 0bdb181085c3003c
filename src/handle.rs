//! The open-file handle table.
//!
//! The original keeps a fixed `fileDescriptorTable[MAX_FDT_SIZE]` array of
//! structs and a handful of `-1` sentinels to mean "free" or "no entry here
//! yet." This keeps the fixed-size table (handles are small integers, same
//! as the original's fileID) but gives each slot an explicit state.

use crate::error::Error;
use crate::inode::InodeNumber;
use crate::layout::MAX_FILES;

/// A small integer identifying an open file, handed back by `Mount::open`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Handle(pub u32);

/// The state of one handle-table slot.
#[derive(Debug, Clone, Copy)]
enum HandleSlot {
	Free,
	Open {
		inode: InodeNumber,
		read_cursor: u32,
		write_cursor: u32,
	},
}

/// A fixed-size table of open-file handles.
pub struct HandleTable {
	slots: Vec<HandleSlot>,
}

impl HandleTable {
	pub fn new() -> Self {
		Self {
			slots: vec![HandleSlot::Free; MAX_FILES],
		}
	}

	/// Opens a handle for `inode`, starting both cursors at `write_cursor`
	/// (append semantics: the original sets the write cursor to the file's
	/// current size and the read cursor to 0).
	///
	/// Returns `NoSpace`, never handle 0, when every slot is occupied — the
	/// original silently returns `0` here, which is indistinguishable from a
	/// legitimately allocated handle 0.
	pub fn open(&mut self, inode: InodeNumber, write_cursor: u32) -> Result<Handle, Error> {
		let idx = self
			.slots
			.iter()
			.position(|s| matches!(s, HandleSlot::Free))
			.ok_or(Error::NoSpace)?;
		self.slots[idx] = HandleSlot::Open {
			inode,
			read_cursor: 0,
			write_cursor,
		};
		Ok(Handle(idx as u32))
	}

	/// Finds an already-open handle for `inode`, if any — used so `open` on an
	/// already-open file returns the existing handle rather than a second one.
	pub fn find_open(&self, inode: InodeNumber) -> Option<Handle> {
		self.slots.iter().position(|s| matches!(s, HandleSlot::Open { inode: i, .. } if *i == inode)).map(|i| Handle(i as u32))
	}

	fn slot(&self, h: Handle) -> Result<&HandleSlot, Error> {
		let slot = self
			.slots
			.get(h.0 as usize)
			.ok_or(Error::InvalidArgument("file descriptor out of range"))?;
		if matches!(slot, HandleSlot::Free) {
			return Err(Error::NotOpen);
		}
		Ok(slot)
	}

	fn slot_mut(&mut self, h: Handle) -> Result<&mut HandleSlot, Error> {
		let slot = self
			.slots
			.get_mut(h.0 as usize)
			.ok_or(Error::InvalidArgument("file descriptor out of range"))?;
		if matches!(slot, HandleSlot::Free) {
			return Err(Error::NotOpen);
		}
		Ok(slot)
	}

	pub fn inode_of(&self, h: Handle) -> Result<InodeNumber, Error> {
		match self.slot(h)? {
			HandleSlot::Open { inode, .. } => Ok(*inode),
			HandleSlot::Free => unreachable!(),
		}
	}

	pub fn read_cursor(&self, h: Handle) -> Result<u32, Error> {
		match self.slot(h)? {
			HandleSlot::Open { read_cursor, .. } => Ok(*read_cursor),
			HandleSlot::Free => unreachable!(),
		}
	}

	pub fn write_cursor(&self, h: Handle) -> Result<u32, Error> {
		match self.slot(h)? {
			HandleSlot::Open { write_cursor, .. } => Ok(*write_cursor),
			HandleSlot::Free => unreachable!(),
		}
	}

	pub fn set_read_cursor(&mut self, h: Handle, value: u32) -> Result<(), Error> {
		match self.slot_mut(h)? {
			HandleSlot::Open { read_cursor, .. } => {
				*read_cursor = value;
				Ok(())
			}
			HandleSlot::Free => unreachable!(),
		}
	}

	pub fn set_write_cursor(&mut self, h: Handle, value: u32) -> Result<(), Error> {
		match self.slot_mut(h)? {
			HandleSlot::Open { write_cursor, .. } => {
				*write_cursor = value;
				Ok(())
			}
			HandleSlot::Free => unreachable!(),
		}
	}

	/// Closes a handle. Errors if it wasn't open.
	pub fn close(&mut self, h: Handle) -> Result<(), Error> {
		let slot = self.slot_mut(h)?;
		*slot = HandleSlot::Free;
		Ok(())
	}

	/// Closes every handle open on `inode` — called when a file is removed
	/// out from under any still-open descriptors.
	pub fn clear_inode(&mut self, inode: InodeNumber) {
		for slot in &mut self.slots {
			if matches!(slot, HandleSlot::Open { inode: i, .. } if *i == inode) {
				*slot = HandleSlot::Free;
			}
		}
	}
}

impl Default for HandleTable {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn open_then_close() {
		let mut t = HandleTable::new();
		let h = t.open(InodeNumber(5), 0).unwrap();
		assert_eq!(t.inode_of(h).unwrap(), InodeNumber(5));
		t.close(h).unwrap();
		assert!(matches!(t.inode_of(h), Err(Error::NotOpen)));
	}

	#[test]
	fn exhaustion_is_no_space_not_handle_zero() {
		let mut t = HandleTable::new();
		let mut handles = Vec::new();
		for i in 0..MAX_FILES {
			handles.push(t.open(InodeNumber(i as u32), 0).unwrap());
		}
		assert!(matches!(
			t.open(InodeNumber(9999), 0),
			Err(Error::NoSpace)
		));
	}

	#[test]
	fn reopening_same_inode_finds_existing_handle() {
		let mut t = HandleTable::new();
		let h = t.open(InodeNumber(3), 10).unwrap();
		assert_eq!(t.find_open(InodeNumber(3)), Some(h));
		assert_eq!(t.find_open(InodeNumber(4)), None);
	}

	#[test]
	fn double_close_is_not_open() {
		let mut t = HandleTable::new();
		let h = t.open(InodeNumber(1), 0).unwrap();
		t.close(h).unwrap();
		assert!(matches!(t.close(h), Err(Error::NotOpen)));
	}
}
