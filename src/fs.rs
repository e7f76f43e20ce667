//! The filesystem capability the loader needs: list a directory and read a file.
//!
//! Injectable so the loader can run against an in-memory tree in tests or
//! embedded contexts.

use std::collections::BTreeMap;
use std::fmt;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

/// Everything confyglot needs from a filesystem.
pub trait FileSystem: Send + Sync + fmt::Debug {
	/// List entry names (not paths) in a directory.
	///
	/// Fails with `NotFound` when missing and `NotADirectory` when `path` is a file.
	fn read_dir(&self, path: &Path) -> std::io::Result<Vec<String>>;

	/// Read a whole file as UTF-8 text.
	fn read_to_string(&self, path: &Path) -> std::io::Result<String>;
}

/// The real filesystem via `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
	fn read_dir(&self, path: &Path) -> std::io::Result<Vec<String>> {
		let mut names = Vec::new();
		for entry in std::fs::read_dir(path)? {
			names.push(entry?.file_name().to_string_lossy().into_owned());
		}
		names.sort();
		Ok(names)
	}

	fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
		std::fs::read_to_string(path)
	}
}

/// An in-memory tree of files. Directories exist implicitly as ancestors of files.
#[derive(Debug, Clone, Default)]
pub struct MemoryFileSystem {
	files: BTreeMap<PathBuf, String>,
}

impl MemoryFileSystem {
	pub fn new() -> Self {
		Self::default()
	}

	/// Build from `(path, contents)` pairs.
	pub fn from_files<P, C, I>(files: I) -> Self
	where
		P: Into<PathBuf>,
		C: Into<String>,
		I: IntoIterator<Item = (P, C)>,
	{
		let mut fs = Self::new();
		for (path, contents) in files {
			fs.insert(path, contents);
		}
		fs
	}

	pub fn insert(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
		self.files.insert(path.into(), contents.into());
	}

	fn is_dir(&self, path: &Path) -> bool {
		self.files
			.keys()
			.any(|file| file != path && file.starts_with(path))
	}
}

impl FileSystem for MemoryFileSystem {
	fn read_dir(&self, path: &Path) -> std::io::Result<Vec<String>> {
		if self.files.contains_key(path) {
			return Err(Error::new(
				ErrorKind::NotADirectory,
				format!("not a directory: '{}'", path.display()),
			));
		}
		if !self.is_dir(path) {
			return Err(Error::new(
				ErrorKind::NotFound,
				format!("no such file or directory: '{}'", path.display()),
			));
		}

		let mut names: Vec<String> = self
			.files
			.keys()
			.filter_map(|file| file.strip_prefix(path).ok())
			.filter_map(|rest| rest.components().next())
			.map(|c| c.as_os_str().to_string_lossy().into_owned())
			.collect();
		names.dedup();
		Ok(names)
	}

	fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
		match self.files.get(path) {
			Some(contents) => Ok(contents.clone()),
			None if self.is_dir(path) => Err(Error::new(
				ErrorKind::IsADirectory,
				format!("is a directory: '{}'", path.display()),
			)),
			None => Err(Error::new(
				ErrorKind::NotFound,
				format!("no such file or directory: '{}'", path.display()),
			)),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> MemoryFileSystem {
		MemoryFileSystem::from_files([
			("/a/b/file.txt", "hello"),
			("/a/b/c/.project.json", "{}"),
			("/a/other.txt", "x"),
		])
	}

	#[test]
	fn test_read_dir_lists_direct_children_once() {
		let fs = sample();
		assert_eq!(fs.read_dir(Path::new("/a")).unwrap(), vec!["b", "other.txt"]);
		assert_eq!(fs.read_dir(Path::new("/a/b")).unwrap(), vec!["c", "file.txt"]);
		assert_eq!(fs.read_dir(Path::new("/")).unwrap(), vec!["a"]);
	}

	#[test]
	fn test_read_dir_errors() {
		let fs = sample();
		let err = fs.read_dir(Path::new("/a/b/file.txt")).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::NotADirectory);
		let err = fs.read_dir(Path::new("/nowhere")).unwrap_err();
		assert_eq!(err.kind(), ErrorKind::NotFound);
	}

	#[test]
	fn test_read_to_string() {
		let fs = sample();
		assert_eq!(fs.read_to_string(Path::new("/a/b/file.txt")).unwrap(), "hello");
		assert_eq!(
			fs.read_to_string(Path::new("/a/missing")).unwrap_err().kind(),
			ErrorKind::NotFound
		);
	}

	#[test]
	fn test_os_file_system_reads_tempdir() {
		let dir = tempfile::tempdir().unwrap();
		std::fs::write(dir.path().join("x.toml"), "a = 1").unwrap();
		let fs = OsFileSystem;
		assert_eq!(fs.read_dir(dir.path()).unwrap(), vec!["x.toml"]);
		assert_eq!(fs.read_to_string(&dir.path().join("x.toml")).unwrap(), "a = 1");
	}
}
