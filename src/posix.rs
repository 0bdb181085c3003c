//! A thin `int`-returning wrapper over [`Mount`], mirroring the literal
//! surface in the original API (`open`/`close`/`read`/`write`/`seek_r`/
//! `seek_w`/`remove`, returning sentinel integers rather than `Result`).
//!
//! `Mount`'s own methods are the idiomatic surface; this exists only for
//! callers porting code written against that convention.

use crate::config::MountConfig;
use crate::diag;
use crate::disk::FileDisk;
use crate::error::Error;
use crate::handle::Handle;
use crate::mount::Mount;

/// A file system reachable through the `int`-returning calling convention.
pub struct Fs {
	mount: Mount<FileDisk>,
}

impl Fs {
	/// Formats (if `fresh`) or attaches to the backing store named by `config`.
	pub fn new(config: &MountConfig, fresh: bool) -> Result<Self, Error> {
		let mount = if fresh {
			Mount::format(FileDisk::init_fresh(config.path())?)?
		} else {
			Mount::attach(FileDisk::init_existing(config.path())?)?
		};
		Ok(Self { mount })
	}

	/// Returns the handle index on success, `-1` on any error.
	pub fn open(&mut self, name: &str) -> i32 {
		match self.mount.open(name) {
			Ok(h) => h.0 as i32,
			Err(e) => {
				diag::log("open", e);
				-1
			}
		}
	}

	/// Returns `0` on success, `-1` if the descriptor wasn't open.
	pub fn close(&mut self, file_id: i32) -> i32 {
		match to_handle(file_id).and_then(|h| self.mount.close(h)) {
			Ok(()) => 0,
			Err(e) => {
				diag::log("close", e);
				-1
			}
		}
	}

	/// Returns the number of bytes actually read; `0` on any error.
	pub fn read(&mut self, file_id: i32, buf: &mut [u8]) -> i32 {
		match to_handle(file_id).and_then(|h| self.mount.read(h, buf)) {
			Ok(n) => n as i32,
			Err(e) => {
				diag::log("read", e);
				0
			}
		}
	}

	/// Returns the number of bytes actually written; `0` on any error.
	pub fn write(&mut self, file_id: i32, buf: &[u8]) -> i32 {
		match to_handle(file_id).and_then(|h| self.mount.write(h, buf)) {
			Ok(n) => n as i32,
			Err(e) => {
				diag::log("write", e);
				0
			}
		}
	}

	/// Returns `0` on success, `-1` on an invalid offset.
	pub fn seek_r(&mut self, file_id: i32, offset: u32) -> i32 {
		match to_handle(file_id).and_then(|h| self.mount.seek_read(h, offset)) {
			Ok(()) => 0,
			Err(e) => {
				diag::log("seek_r", e);
				-1
			}
		}
	}

	/// Returns `0` on success, `-1` on an invalid offset.
	pub fn seek_w(&mut self, file_id: i32, offset: u32) -> i32 {
		match to_handle(file_id).and_then(|h| self.mount.seek_write(h, offset)) {
			Ok(()) => 0,
			Err(e) => {
				diag::log("seek_w", e);
				-1
			}
		}
	}

	/// Always returns `0`, per the original API's convention; failures are logged.
	pub fn remove(&mut self, name: &str) -> i32 {
		if let Err(e) = self.mount.remove(name) {
			diag::log("remove", e);
		}
		0
	}
}

fn to_handle(file_id: i32) -> Result<Handle, Error> {
	if file_id < 0 {
		return Err(Error::InvalidArgument("file descriptor must be non-negative"));
	}
	Ok(Handle(file_id as u32))
}
