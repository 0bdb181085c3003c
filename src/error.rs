//! Error taxonomy for the filesystem core.
//!
//! No error-handling crate appears anywhere in this codebase's lineage, so
//! this follows the same hand-rolled convention as the rest of it: a plain
//! enum with a `Display` impl, and `From<io::Error>` so `?` works against
//! the disk adapter.

use std::fmt;
use std::io;

/// Kinds of failure the filesystem core can report.
#[derive(Debug)]
pub enum Error {
	/// A fileID/offset/length argument was out of the allowed range.
	InvalidArgument(&'static str),
	/// The handle slot addressed by a fileID is not currently open.
	NotOpen,
	/// A directory lookup found no entry for the given name.
	NotFound,
	/// The free-block bitmap, inode region, directory, or handle table is full.
	NoSpace,
	/// A bitmap bit was asked to transition to the state it is already in.
	AlreadyInState,
	/// Propagated from the disk adapter.
	Io(io::Error),
	/// A seek went past the file's current size.
	OutOfRange,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::InvalidArgument(what) => write!(f, "invalid argument: {what}"),
			Self::NotOpen => write!(f, "file descriptor is not open"),
			Self::NotFound => write!(f, "no such file"),
			Self::NoSpace => write!(f, "no space left"),
			Self::AlreadyInState => write!(f, "block already in requested allocation state"),
			Self::Io(e) => write!(f, "I/O error: {e}"),
			Self::OutOfRange => write!(f, "offset beyond end of file"),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Io(e) => Some(e),
			_ => None,
		}
	}
}

impl From<io::Error> for Error {
	fn from(e: io::Error) -> Self {
		Self::Io(e)
	}
}
