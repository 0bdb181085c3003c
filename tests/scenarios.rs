//! End-to-end scenarios exercising the file system through a real
//! file-backed device, the way a host application would use it.

use rand::Rng;
use ssfs::disk::FileDisk;
use ssfs::error::Error;
use ssfs::mount::Mount;
use tempfile::NamedTempFile;

fn fresh_disk() -> (NamedTempFile, FileDisk) {
	let file = NamedTempFile::new().expect("create scratch backing file");
	let disk = FileDisk::init_fresh(file.path()).expect("format scratch backing file");
	(file, disk)
}

#[test]
fn s1_write_then_seek_then_read() {
	let (_tmp, disk) = fresh_disk();
	let mut fs = Mount::format(disk).unwrap();

	let h = fs.open("a").unwrap();
	assert_eq!(fs.write(h, b"hello").unwrap(), 5);
	fs.seek_read(h, 0).unwrap();
	let mut buf = [0u8; 5];
	assert_eq!(fs.read(h, &mut buf).unwrap(), 5);
	assert_eq!(&buf, b"hello");
}

#[test]
fn s2_read_crosses_block_boundary() {
	let (_tmp, disk) = fresh_disk();
	let mut fs = Mount::format(disk).unwrap();

	let h = fs.open("twoblocks").unwrap();
	fs.write(h, &[b'A'; 1024]).unwrap();
	fs.write(h, &[b'B'; 1024]).unwrap();
	fs.seek_read(h, 0).unwrap();

	let mut buf = [0u8; 2048];
	assert_eq!(fs.read(h, &mut buf).unwrap(), 2048);
	assert!(buf[..1024].iter().all(|&b| b == b'A'));
	assert!(buf[1024..].iter().all(|&b| b == b'B'));
}

#[test]
fn s3_file_spans_the_indirect_inode() {
	let (_tmp, disk) = fresh_disk();
	let mut fs = Mount::format(disk).unwrap();

	let mut rng = rand::thread_rng();
	let len = 14 * 1024 + 10;
	let payload: Vec<u8> = (0..len).map(|_| rng.gen()).collect();

	let h = fs.open("spanning").unwrap();
	assert_eq!(fs.write(h, &payload).unwrap(), payload.len());

	fs.seek_read(h, 0).unwrap();
	let mut readback = vec![0u8; payload.len()];
	assert_eq!(fs.read(h, &mut readback).unwrap(), payload.len());
	assert_eq!(readback, payload);
	assert_eq!(readback[len - 1], payload[len - 1]);
}

#[test]
fn s4_the_200th_open_fails() {
	let (_tmp, disk) = fresh_disk();
	let mut fs = Mount::format(disk).unwrap();

	for i in 0..199 {
		fs.open(&format!("file{i}")).expect("should have room");
	}
	assert!(matches!(fs.open("one-more"), Err(Error::NoSpace)));
}

#[test]
fn s5_remove_returns_the_block_to_the_allocator() {
	let (_tmp, disk) = fresh_disk();
	let mut fs = Mount::format(disk).unwrap();

	let h = fs.open("scratch").unwrap();
	fs.write(h, &[1u8; 1000]).unwrap();
	fs.remove("scratch").unwrap();

	// The freed block is available again: a fresh file can reclaim it and
	// the total data used doesn't grow past what one file's worth of blocks
	// needs.
	let h2 = fs.open("scratch2").unwrap();
	fs.write(h2, &[2u8; 1000]).unwrap();
	fs.seek_read(h2, 0).unwrap();
	let mut buf = [0u8; 1000];
	fs.read(h2, &mut buf).unwrap();
	assert!(buf.iter().all(|&b| b == 2));
}

#[test]
fn s6_contents_survive_a_detach_and_reattach() {
	let tmp = NamedTempFile::new().unwrap();
	{
		let disk = FileDisk::init_fresh(tmp.path()).unwrap();
		let mut fs = Mount::format(disk).unwrap();
		let h = fs.open("persisted").unwrap();
		fs.write(h, b"still here").unwrap();
	}
	{
		let disk = FileDisk::init_existing(tmp.path()).unwrap();
		let mut fs = Mount::attach(disk).unwrap();
		let h = fs.open("persisted").unwrap();
		let mut buf = [0u8; 10];
		assert_eq!(fs.read(h, &mut buf).unwrap(), 10);
		assert_eq!(&buf, b"still here");
	}
}

#[test]
fn round_trip_property_holds_for_random_payloads_under_one_chain_stride() {
	let mut rng = rand::thread_rng();
	for trial in 0..8 {
		let (_tmp, disk) = fresh_disk();
		let mut fs = Mount::format(disk).unwrap();
		let len = rng.gen_range(1..14 * 1024);
		let payload: Vec<u8> = (0..len).map(|_| rng.gen()).collect();
		let name = format!("trial{trial}");

		let h = fs.open(&name).unwrap();
		fs.write(h, &payload).unwrap();
		fs.close(h).unwrap();

		let h2 = fs.open(&name).unwrap();
		fs.seek_read(h2, 0).unwrap();
		let mut buf = vec![0u8; len];
		assert_eq!(fs.read(h2, &mut buf).unwrap(), len);
		assert_eq!(buf, payload);
	}
}

#[test]
fn idempotent_close_errors_the_second_time() {
	let (_tmp, disk) = fresh_disk();
	let mut fs = Mount::format(disk).unwrap();
	let h = fs.open("once").unwrap();
	fs.close(h).unwrap();
	assert!(matches!(fs.close(h), Err(Error::NotOpen)));
}

#[test]
fn cursor_independence_across_two_handles_on_the_same_file() {
	let (_tmp, disk) = fresh_disk();
	let mut fs = Mount::format(disk).unwrap();

	let writer = fs.open("shared").unwrap();
	fs.write(writer, b"first").unwrap();

	// A second handle opened before the write above would have snapshotted
	// write_cursor at that earlier point; here we open a fresh handle after,
	// so it should see the file at its current size for append purposes.
	fs.close(writer).unwrap();
	let reopened = fs.open("shared").unwrap();
	fs.seek_read(reopened, 0).unwrap();
	let mut buf = [0u8; 5];
	assert_eq!(fs.read(reopened, &mut buf).unwrap(), 5);
	assert_eq!(&buf, b"first");
}
