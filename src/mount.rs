//! The assembled file system.
//!
//! `Mount` is the single owned handle mentioned in `DESIGN.md`: it holds the
//! free-block bitmap, root j-node, directory, and handle-table caches that
//! the original implementation scattered across process-global statics, and
//! every operation takes `&mut self` instead of touching ambient state.

use crate::bitmap::Bitmap;
use crate::diag;
use crate::directory::Directory;
use crate::disk::BlockDevice;
use crate::error::Error;
use crate::handle::{Handle, HandleTable};
use crate::inode::{BlockIdx, Inode, InodeNumber, RootJNode};
use crate::layout::{
	BLOCK_SIZE, DATA_REGION_START, DIRECT_PTRS, DIR_ENTRIES_PER_BLOCK, DIR_ENTRY_SIZE, FBM_BLOCK,
	INODES_PER_BLOCK, ROOT_DIR_BLOCKS, ROOT_INODE, SUPERBLOCK_BLOCK, WRITE_MASK_BLOCK,
};
use crate::superblock::Superblock;

/// A mounted file system: owns every cache and every stateful operation.
pub struct Mount<D: BlockDevice> {
	disk: D,
	superblock: Superblock,
	bitmap: Bitmap,
	directory: Directory,
	handles: HandleTable,
}

const DIR_BYTES_PER_BLOCK: usize = DIR_ENTRIES_PER_BLOCK * DIR_ENTRY_SIZE;

fn empty_inode_block() -> [u8; BLOCK_SIZE] {
	let mut buf = [0u8; BLOCK_SIZE];
	let empty = Inode::empty().to_bytes();
	for slot in 0..INODES_PER_BLOCK {
		let off = slot * crate::layout::NODE_SIZE;
		buf[off..off + crate::layout::NODE_SIZE].copy_from_slice(&empty);
	}
	buf
}

impl<D: BlockDevice> Mount<D> {
	/// Formats a fresh device: root j-node, inode block 0 (root-directory
	/// inode at slot 0, 15 empty inodes), directory blocks, FBM, write-mask.
	pub fn format(mut disk: D) -> Result<Self, Error> {
		let bitmap = Bitmap::format();

		let mut root_direct = [None; DIRECT_PTRS];
		root_direct[0] = Some(BlockIdx(0));
		let root = RootJNode {
			size: BLOCK_SIZE as u32,
			direct: root_direct,
		};
		let superblock = Superblock::format(root);

		let mut inode_block = empty_inode_block();
		let mut root_dir_direct = [None; DIRECT_PTRS];
		for (i, b) in ROOT_DIR_BLOCKS.iter().enumerate() {
			root_dir_direct[i] = Some(BlockIdx(*b));
		}
		let root_dir_inode = Inode::Allocated {
			size: (ROOT_DIR_BLOCKS.len() * BLOCK_SIZE) as u32,
			direct: root_dir_direct,
			indirect: None,
		};
		inode_block[..crate::layout::NODE_SIZE].copy_from_slice(&root_dir_inode.to_bytes());

		let directory = Directory::format();

		disk.write_blocks(SUPERBLOCK_BLOCK, 1, &superblock.to_bytes())?;
		disk.write_blocks(DATA_REGION_START, 1, &inode_block)?;
		for (i, b) in ROOT_DIR_BLOCKS.iter().enumerate() {
			let mut block = [0u8; BLOCK_SIZE];
			let start = i * DIR_BYTES_PER_BLOCK;
			block[..DIR_BYTES_PER_BLOCK]
				.copy_from_slice(&directory.to_bytes()[start..start + DIR_BYTES_PER_BLOCK]);
			disk.write_blocks(DATA_REGION_START + b, 1, &block)?;
		}
		disk.write_blocks(FBM_BLOCK, 1, &bitmap.to_bytes())?;
		disk.write_blocks(WRITE_MASK_BLOCK, 1, &[0u8; BLOCK_SIZE])?;

		Ok(Self {
			disk,
			superblock,
			bitmap,
			directory,
			handles: HandleTable::new(),
		})
	}

	/// Attaches to an already-formatted device and warms the in-memory caches.
	pub fn attach(mut disk: D) -> Result<Self, Error> {
		let mut sb_buf = [0u8; BLOCK_SIZE];
		disk.read_blocks(SUPERBLOCK_BLOCK, 1, &mut sb_buf)?;
		let superblock = Superblock::from_bytes(&sb_buf)
			.ok_or(Error::InvalidArgument("superblock magic mismatch"))?;

		let mut fbm_buf = [0u8; BLOCK_SIZE];
		disk.read_blocks(FBM_BLOCK, 1, &mut fbm_buf)?;
		let bitmap = Bitmap::from_bytes(&fbm_buf);

		let mut dir_bytes = Vec::with_capacity(DIR_BYTES_PER_BLOCK * ROOT_DIR_BLOCKS.len());
		for b in ROOT_DIR_BLOCKS {
			let mut block = [0u8; BLOCK_SIZE];
			disk.read_blocks(DATA_REGION_START + b, 1, &mut block)?;
			dir_bytes.extend_from_slice(&block[..DIR_BYTES_PER_BLOCK]);
		}
		let directory = Directory::from_bytes(&dir_bytes);

		Ok(Self {
			disk,
			superblock,
			bitmap,
			directory,
			handles: HandleTable::new(),
		})
	}

	fn data_addr(b: BlockIdx) -> u32 {
		DATA_REGION_START + b.0
	}

	fn read_data_block(&mut self, b: BlockIdx) -> Result<[u8; BLOCK_SIZE], Error> {
		let mut buf = [0u8; BLOCK_SIZE];
		self.disk.read_blocks(Self::data_addr(b), 1, &mut buf)?;
		Ok(buf)
	}

	fn write_data_block(&mut self, b: BlockIdx, buf: &[u8; BLOCK_SIZE]) -> Result<(), Error> {
		self.disk.write_blocks(Self::data_addr(b), 1, buf)?;
		Ok(())
	}

	fn flush_superblock(&mut self) -> Result<(), Error> {
		self.disk
			.write_blocks(SUPERBLOCK_BLOCK, 1, &self.superblock.to_bytes())?;
		Ok(())
	}

	fn flush_bitmap(&mut self) -> Result<(), Error> {
		self.disk.write_blocks(FBM_BLOCK, 1, &self.bitmap.to_bytes())?;
		Ok(())
	}

	fn flush_directory(&mut self) -> Result<(), Error> {
		let bytes = self.directory.to_bytes();
		for (i, b) in ROOT_DIR_BLOCKS.iter().enumerate() {
			let mut block = [0u8; BLOCK_SIZE];
			let start = i * DIR_BYTES_PER_BLOCK;
			block[..DIR_BYTES_PER_BLOCK].copy_from_slice(&bytes[start..start + DIR_BYTES_PER_BLOCK]);
			self.disk.write_blocks(DATA_REGION_START + b, 1, &block)?;
		}
		Ok(())
	}

	/// `(root-direct slot, slot within that inode block)` — centralizes the
	/// `inode_nb / 16`, `inode_nb % 16` arithmetic the original repeats inline.
	fn resolve_inode(n: InodeNumber) -> (usize, usize) {
		(
			n.0 as usize / INODES_PER_BLOCK,
			n.0 as usize % INODES_PER_BLOCK,
		)
	}

	fn load_inode(&mut self, n: InodeNumber) -> Result<Inode, Error> {
		let (root_slot, slot) = Self::resolve_inode(n);
		let block = self.superblock.root.direct[root_slot]
			.ok_or(Error::InvalidArgument("inode block not allocated"))?;
		let buf = self.read_data_block(block)?;
		let off = slot * crate::layout::NODE_SIZE;
		Ok(Inode::from_bytes(&buf[off..off + crate::layout::NODE_SIZE]))
	}

	fn store_inode(&mut self, n: InodeNumber, inode: Inode) -> Result<(), Error> {
		let (root_slot, slot) = Self::resolve_inode(n);
		let block = self.superblock.root.direct[root_slot]
			.ok_or(Error::InvalidArgument("inode block not allocated"))?;
		let mut buf = self.read_data_block(block)?;
		let off = slot * crate::layout::NODE_SIZE;
		buf[off..off + crate::layout::NODE_SIZE].copy_from_slice(&inode.to_bytes());
		self.write_data_block(block, &buf)
	}

	/// Produces a fresh inode number, allocating a new inode block only when
	/// every already-allocated block is full (component E/G).
	fn alloc_inode(&mut self) -> Result<InodeNumber, Error> {
		for i in 0..DIRECT_PTRS {
			if self.superblock.root.direct[i].is_none() {
				let block = self.bitmap.alloc()?;
				self.flush_bitmap()?;
				self.write_data_block(block, &empty_inode_block())?;
				self.superblock.root.direct[i] = Some(block);
				self.superblock.root.size += BLOCK_SIZE as u32;
				self.flush_superblock()?;
			}
			let block = self.superblock.root.direct[i].unwrap();
			let buf = self.read_data_block(block)?;
			for slot in 0..INODES_PER_BLOCK {
				let off = slot * crate::layout::NODE_SIZE;
				if Inode::from_bytes(&buf[off..off + crate::layout::NODE_SIZE]).is_empty() {
					let n = InodeNumber((i * INODES_PER_BLOCK + slot) as u32);
					self.store_inode(
						n,
						Inode::Allocated {
							size: 0,
							direct: [None; DIRECT_PTRS],
							indirect: None,
						},
					)?;
					return Ok(n);
				}
			}
		}
		Err(Error::NoSpace)
	}

	/// Total bytes across the whole indirect chain rooted at `head`.
	fn file_size(&mut self, head: InodeNumber) -> Result<u32, Error> {
		let mut total = 0u32;
		let mut current = Some(head);
		while let Some(n) = current {
			match self.load_inode(n)? {
				Inode::Allocated { size, indirect, .. } => {
					total += size;
					current = indirect;
				}
				Inode::Empty => break,
			}
		}
		Ok(total)
	}

	/// Walks `hops = logical_block / 14` indirect links from `head`, without
	/// allocating — used by reads, where every block must already exist.
	fn chain_step(
		&mut self,
		head: InodeNumber,
		logical_block: u32,
	) -> Result<(InodeNumber, usize), Error> {
		let hops = logical_block as usize / DIRECT_PTRS;
		let local = logical_block as usize % DIRECT_PTRS;
		let mut current = head;
		for _ in 0..hops {
			match self.load_inode(current)? {
				Inode::Allocated {
					indirect: Some(next),
					..
				} => current = next,
				_ => return Err(Error::OutOfRange),
			}
		}
		Ok((current, local))
	}

	/// Same walk as `chain_step`, but allocates whatever is missing along the
	/// way: a continuation inode at each hop boundary (exactly one per
	/// stride, never a scan of all 14 root slots), and the target data block
	/// if its direct slot is still empty.
	fn ensure_block(
		&mut self,
		head: InodeNumber,
		logical_block: u32,
	) -> Result<(InodeNumber, BlockIdx), Error> {
		let hops = logical_block as usize / DIRECT_PTRS;
		let local = logical_block as usize % DIRECT_PTRS;
		let mut current = head;
		for _ in 0..hops {
			let indirect = match self.load_inode(current)? {
				Inode::Allocated { indirect, .. } => indirect,
				Inode::Empty => return Err(Error::NotOpen),
			};
			current = match indirect {
				Some(next) => next,
				None => {
					let next = self.alloc_inode()?;
					if let Inode::Allocated { size, direct, .. } = self.load_inode(current)? {
						self.store_inode(
							current,
							Inode::Allocated {
								size,
								direct,
								indirect: Some(next),
							},
						)?;
					}
					next
				}
			};
		}

		let (size, mut direct, indirect) = match self.load_inode(current)? {
			Inode::Allocated {
				size,
				direct,
				indirect,
			} => (size, direct, indirect),
			Inode::Empty => return Err(Error::NotOpen),
		};
		if let Some(block) = direct[local] {
			return Ok((current, block));
		}
		let block = self.bitmap.alloc()?;
		self.flush_bitmap()?;
		direct[local] = Some(block);
		self.store_inode(
			current,
			Inode::Allocated {
				size,
				direct,
				indirect,
			},
		)?;
		Ok((current, block))
	}

	/// Frees every data block and every inode along the chain rooted at
	/// `head`, iteratively rather than recursively. Does not attempt to free
	/// an FBM bit keyed by an inode number — only actual data-block pointers
	/// in `direct` are ever freed.
	fn free_inode_chain(&mut self, head: InodeNumber) -> Result<(), Error> {
		let mut current = Some(head);
		while let Some(n) = current {
			let (direct, indirect) = match self.load_inode(n)? {
				Inode::Allocated { direct, indirect, .. } => (direct, indirect),
				Inode::Empty => break,
			};
			for block in direct.into_iter().flatten() {
				self.bitmap.set_free(block)?;
			}
			self.flush_bitmap()?;
			self.store_inode(n, Inode::empty())?;
			current = indirect;
		}
		Ok(())
	}

	/// Opens `name`, creating it if it doesn't already exist.
	///
	/// Never silently returns handle 0 on exhaustion: every allocation
	/// failure along the create path propagates `Error::NoSpace`, and a
	/// partially-created file (inode allocated but the directory or handle
	/// table then turned out to be full) is rolled back so no orphaned inode
	/// is left unreachable from any directory entry.
	pub fn open(&mut self, name: &str) -> Result<Handle, Error> {
		if let Some(inode_nb) = self.directory.lookup(name) {
			if let Some(h) = self.handles.find_open(inode_nb) {
				return Ok(h);
			}
			let size = self.file_size(inode_nb)?;
			return self.handles.open(inode_nb, size);
		}

		let inode_nb = self.alloc_inode()?;
		if let Err(e) = self.directory.insert(name, inode_nb) {
			let _ = self.store_inode(inode_nb, Inode::empty());
			return Err(e);
		}
		self.flush_directory()?;

		match self.handles.open(inode_nb, 0) {
			Ok(h) => Ok(h),
			Err(e) => {
				let _ = self.directory.remove(name);
				self.flush_directory()?;
				let _ = self.store_inode(inode_nb, Inode::empty());
				Err(e)
			}
		}
	}

	/// Closes a handle. Does not flush anything — every write already went
	/// straight through to disk.
	pub fn close(&mut self, h: Handle) -> Result<(), Error> {
		self.handles.close(h)
	}

	pub fn seek_read(&mut self, h: Handle, pos: u32) -> Result<(), Error> {
		let inode_nb = self.handles.inode_of(h)?;
		let size = self.file_size(inode_nb)?;
		if pos > size {
			return Err(Error::OutOfRange);
		}
		self.handles.set_read_cursor(h, pos)
	}

	pub fn seek_write(&mut self, h: Handle, pos: u32) -> Result<(), Error> {
		let inode_nb = self.handles.inode_of(h)?;
		let size = self.file_size(inode_nb)?;
		if pos > size {
			return Err(Error::OutOfRange);
		}
		self.handles.set_write_cursor(h, pos)
	}

	/// Reads up to `buf.len()` bytes starting at the handle's read cursor.
	///
	/// Clamps to the file's remaining length rather than erroring — reading
	/// past EOF is a clamp, not a fault (spec'd error taxonomy). Always
	/// copies the full resolved length within a block, never a
	/// `length % BLOCK_SIZE` truncation.
	pub fn read(&mut self, h: Handle, buf: &mut [u8]) -> Result<usize, Error> {
		if buf.is_empty() {
			return Err(Error::InvalidArgument("length must be > 0"));
		}
		let inode_nb = self.handles.inode_of(h)?;
		let cursor = self.handles.read_cursor(h)?;
		let size = self.file_size(inode_nb)?;
		if cursor >= size {
			return Ok(0);
		}

		let mut length = buf.len() as u32;
		if cursor + length > size {
			diag::log("read", "clamping length to remaining file size");
			length = size - cursor;
		}

		let mut pos = cursor;
		let mut remaining = length;
		let mut out_off = 0usize;
		while remaining > 0 {
			let logical_block = pos / BLOCK_SIZE as u32;
			let (owner, local) = self.chain_step(inode_nb, logical_block)?;
			let block = match self.load_inode(owner)? {
				Inode::Allocated { direct, .. } => direct[local].ok_or(Error::OutOfRange)?,
				Inode::Empty => return Err(Error::OutOfRange),
			};
			let data = self.read_data_block(block)?;
			let in_block_off = (pos % BLOCK_SIZE as u32) as usize;
			let take = remaining.min((BLOCK_SIZE - in_block_off) as u32) as usize;
			buf[out_off..out_off + take].copy_from_slice(&data[in_block_off..in_block_off + take]);
			out_off += take;
			pos += take as u32;
			remaining -= take as u32;
		}

		self.handles.set_read_cursor(h, pos)?;
		Ok(length as usize)
	}

	/// Writes `buf` starting at the handle's write cursor, extending the
	/// chain (data blocks, and a single continuation inode per 14-block
	/// stride) as needed.
	pub fn write(&mut self, h: Handle, buf: &[u8]) -> Result<usize, Error> {
		if buf.is_empty() {
			return Err(Error::InvalidArgument("length must be > 0"));
		}
		let inode_nb = self.handles.inode_of(h)?;
		let mut cursor = self.handles.write_cursor(h)?;

		let mut in_off = 0usize;
		let mut remaining = buf.len() as u32;
		while remaining > 0 {
			let logical_block = cursor / BLOCK_SIZE as u32;
			let (owner, block) = self.ensure_block(inode_nb, logical_block)?;
			let mut data = self.read_data_block(block)?;
			let in_block_off = (cursor % BLOCK_SIZE as u32) as usize;
			let take = remaining.min((BLOCK_SIZE - in_block_off) as u32) as usize;
			data[in_block_off..in_block_off + take].copy_from_slice(&buf[in_off..in_off + take]);
			self.write_data_block(block, &data)?;

			let local_block = (logical_block as usize % DIRECT_PTRS) as u32;
			let local_offset = local_block * BLOCK_SIZE as u32 + in_block_off as u32 + take as u32;
			if let Inode::Allocated {
				size,
				direct,
				indirect,
			} = self.load_inode(owner)?
			{
				if local_offset > size {
					self.store_inode(
						owner,
						Inode::Allocated {
							size: local_offset,
							direct,
							indirect,
						},
					)?;
				}
			}

			in_off += take;
			cursor += take as u32;
			remaining -= take as u32;
		}

		self.handles.set_write_cursor(h, cursor)?;
		Ok(buf.len())
	}

	/// Removes `name`: a side-effect-free directory lookup first (never
	/// calling `open`, which would silently create the file if it were
	/// missing), then reclaims its whole inode chain.
	pub fn remove(&mut self, name: &str) -> Result<(), Error> {
		let inode_nb = self.directory.lookup(name).ok_or(Error::NotFound)?;
		self.directory.remove(name)?;
		self.flush_directory()?;
		self.free_inode_chain(inode_nb)?;
		self.handles.clear_inode(inode_nb);
		Ok(())
	}

	/// The root directory's own inode number, reserved and never removable.
	pub fn root_inode(&self) -> InodeNumber {
		InodeNumber(ROOT_INODE)
	}
}
