//! On-disk geometry constants.
//!
//! Everything in this module mirrors the disk layout of the Simple Shadow
//! File System: a fixed 1024-byte block, 1027 blocks total, with the data
//! region, free-block bitmap, and write-mask sitting at fixed offsets.

/// Size of a single disk block, in bytes.
pub const BLOCK_SIZE: usize = 1024;

/// Number of data blocks in the data region.
pub const DATA_BLOCKS: usize = 1024;

/// Total number of blocks on the backing device (superblock + data + FBM + write-mask).
pub const TOTAL_BLOCKS: usize = 1 + DATA_BLOCKS + 1 + 1;

/// Disk block holding the superblock.
pub const SUPERBLOCK_BLOCK: u32 = 0;

/// Disk block at which the data region begins (data block 0 lives here).
pub const DATA_REGION_START: u32 = 1;

/// Disk block holding the free-block bitmap.
pub const FBM_BLOCK: u32 = 1 + DATA_BLOCKS as u32;

/// Disk block holding the (reserved, unused) write-mask.
pub const WRITE_MASK_BLOCK: u32 = FBM_BLOCK + 1;

/// Superblock magic number.
pub const MAGIC: u32 = 0xACBD_0005;

/// Number of inodes the filesystem can hold (199 user files + the root directory).
pub const INODE_COUNT: usize = 200;

/// Byte size of one on-disk inode / root j-node record.
pub const NODE_SIZE: usize = 64;

/// Inodes packed into one inode block.
pub const INODES_PER_BLOCK: usize = BLOCK_SIZE / NODE_SIZE;

/// Direct pointers per inode / root j-node.
pub const DIRECT_PTRS: usize = 14;

/// Maximum number of user files (inode 0 is reserved for the root directory).
pub const MAX_FILES: usize = INODE_COUNT - 1;

/// The inode number reserved for the root directory.
pub const ROOT_INODE: u32 = 0;

/// Data-region indices holding the 4 root-directory blocks.
pub const ROOT_DIR_BLOCKS: [u32; 4] = [
	(DATA_BLOCKS - 4) as u32,
	(DATA_BLOCKS - 3) as u32,
	(DATA_BLOCKS - 2) as u32,
	(DATA_BLOCKS - 1) as u32,
];

/// Byte length of a directory entry's name field (NUL-terminated, so 9 usable chars).
pub const NAME_LEN: usize = 10;

/// Byte size of one on-disk directory entry (10-byte name + 4-byte inode number).
pub const DIR_ENTRY_SIZE: usize = NAME_LEN + 4;

/// Directory entries packed into one directory block.
pub const DIR_ENTRIES_PER_BLOCK: usize = BLOCK_SIZE / DIR_ENTRY_SIZE;

/// Total physical directory-entry slots across the 4 root-directory blocks.
pub const DIR_TOTAL_ENTRIES: usize = DIR_ENTRIES_PER_BLOCK * 4;

/// Maximum bytes addressable through a single inode's direct pointers.
pub const INODE_DIRECT_CAPACITY: u32 = (DIRECT_PTRS * BLOCK_SIZE) as u32;

/// The sentinel `inode_nb` marking a permanently reserved directory slot.
pub const UNUSABLE_INODE_NB: i32 = 100_000;

/// The name stored in a permanently reserved directory slot.
pub const UNUSABLE_NAME: &str = "UNUSABLE";
