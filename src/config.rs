//! Mount configuration.
//!
//! Generalizes the original implementation's hardcoded backing-file name
//! (`DISK_NAME = "260637833_ssfs"`) into a caller-supplied path, following
//! the optional-fields-with-defaults shape `mkfs`'s `Ext2Factory` uses.

use std::path::{Path, PathBuf};

/// The default backing-store path, used when a caller doesn't supply one.
pub const DEFAULT_DISK_NAME: &str = "ssfs_disk";

/// Configuration for attaching to or formatting a backing store.
#[derive(Debug, Clone)]
pub struct MountConfig {
	path: PathBuf,
}

impl MountConfig {
	/// Creates a configuration pointing at the given backing-store path.
	pub fn new(path: impl AsRef<Path>) -> Self {
		Self {
			path: path.as_ref().to_path_buf(),
		}
	}

	/// The backing-store path.
	pub fn path(&self) -> &Path {
		&self.path
	}
}

impl Default for MountConfig {
	fn default() -> Self {
		Self::new(DEFAULT_DISK_NAME)
	}
}
