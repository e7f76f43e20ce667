use std::path::{Component, Path, PathBuf};

use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use tracing::{debug, trace};

use crate::config::types::{ConfigFile, Options};
use crate::error::{ConfyglotError, Result};
use crate::formats::Format;

/// Build the file-name pattern `^<prefix>\.(js|json|ya?ml|toml|ini)$`, case-insensitive.
pub fn config_pattern(config_prefix: &str) -> Regex {
	let pattern = format!(
		r"^{}\.(js|json|ya?ml|toml|ini)$",
		regex::escape(config_prefix)
	);
	RegexBuilder::new(&pattern)
		.case_insensitive(true)
		.build()
		.expect("escaped prefix always forms a valid pattern")
}

/// Find the single configuration file in one directory, if any.
///
/// More than one match is a misconfiguration and fails with
/// [`ConfyglotError::AmbiguousConfig`].
pub fn find_config(directory: &Path, pattern: &Regex, options: &Options) -> Result<Option<ConfigFile>> {
	let entries = options
		.fs
		.read_dir(directory)
		.map_err(|source| ConfyglotError::ReadDirectory {
			path: directory.to_path_buf(),
			source,
		})?;

	let mut matches: Vec<ConfigFile> = entries
		.iter()
		.filter(|name| pattern.is_match(name))
		.filter_map(|name| {
			let path = directory.join(name);
			Format::from_path(&path).map(|format| ConfigFile { path, format })
		})
		.collect();

	if matches.len() > 1 {
		return Err(ConfyglotError::AmbiguousConfig {
			directory: directory.to_path_buf(),
			paths: matches.into_iter().map(|file| file.path).collect(),
		});
	}

	let found = matches.pop();
	if let Some(ref file) = found {
		debug!(path = %file.path.display(), format = %file.format, "found configuration");
	}
	Ok(found)
}

/// Find configuration files from `root` down to `directory`, root first.
///
/// `root` defaults to `directory`, so only that one directory is searched.
/// The order is load-bearing: later files override earlier ones.
pub fn find_configs(directory: &Path, root: Option<&Path>, options: &Options) -> Result<Vec<ConfigFile>> {
	let chain = directory_chain(directory, root)?;
	trace!(chain = ?chain, "resolved directory chain");

	let pattern = config_pattern(&options.config_prefix);
	let found = chain
		.par_iter()
		.map(|dir| find_config(dir, &pattern, options))
		.collect::<Result<Vec<_>>>()?;

	Ok(found.into_iter().flatten().collect())
}

/// Every directory from `root` to `directory`, inclusive, top-down.
///
/// Both paths are made absolute and lexically cleaned first, so a trailing
/// separator or `..` in either does not matter.
pub fn directory_chain(directory: &Path, root: Option<&Path>) -> Result<Vec<PathBuf>> {
	let target = clean_path(directory);
	let root_path = match root {
		Some(root) => clean_path(root),
		None => target.clone(),
	};

	let relative = target
		.strip_prefix(&root_path)
		.map_err(|_| ConfyglotError::Path {
			root: root.map_or_else(|| root_path.clone(), Path::to_path_buf),
			directory: directory.to_path_buf(),
		})?;

	let mut chain = vec![root_path.clone()];
	let mut current = root_path;
	for segment in relative.components() {
		current.push(segment);
		chain.push(current.clone());
	}
	Ok(chain)
}

/// Absolute, with `.` and `..` resolved lexically. Symlinks are not followed.
fn clean_path(path: &Path) -> PathBuf {
	let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
	let mut cleaned = PathBuf::new();
	for component in absolute.components() {
		match component {
			Component::CurDir => {}
			Component::ParentDir => {
				cleaned.pop();
			}
			other => cleaned.push(other),
		}
	}
	cleaned
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::fs::MemoryFileSystem;

	fn options(fs: MemoryFileSystem) -> Options {
		Options::default().with_fs(fs)
	}

	#[test]
	fn test_config_pattern() {
		let re = config_pattern(".project");
		for name in [".project.json", ".project.TOML", ".PROJECT.yml", ".project.yaml", ".project.ini", ".project.js"] {
			assert!(re.is_match(name), "{name}");
		}
		for name in ["project.json", "xproject.json", ".project.json.bak", ".project.txt", ".projectXjson"] {
			assert!(!re.is_match(name), "{name}");
		}
	}

	#[test]
	fn test_config_pattern_escapes_prefix() {
		let re = config_pattern("my+app.cfg");
		assert!(re.is_match("my+app.cfg.toml"));
		assert!(!re.is_match("myyapp.cfg.toml"));
		assert!(!re.is_match("my+appXcfg.toml"));
	}

	#[test]
	fn test_directory_chain() {
		let chain = directory_chain(Path::new("/a/b/c"), Some(Path::new("/a"))).unwrap();
		assert_eq!(
			chain,
			vec![PathBuf::from("/a"), PathBuf::from("/a/b"), PathBuf::from("/a/b/c")]
		);
	}

	#[test]
	fn test_directory_chain_defaults_to_target() {
		let chain = directory_chain(Path::new("/a/b"), None).unwrap();
		assert_eq!(chain, vec![PathBuf::from("/a/b")]);
	}

	#[test]
	fn test_directory_chain_ignores_trailing_separator() {
		let chain = directory_chain(Path::new("/a/b"), Some(Path::new("/a/"))).unwrap();
		assert_eq!(chain, vec![PathBuf::from("/a"), PathBuf::from("/a/b")]);
	}

	#[test]
	fn test_directory_chain_rejects_unrelated_root() {
		let err = directory_chain(Path::new("/a/b"), Some(Path::new("/x/y"))).unwrap_err();
		assert_eq!(err.to_string(), "root '/x/y' is not related to given directory /a/b");

		// A sibling sharing a textual prefix is still unrelated.
		assert!(directory_chain(Path::new("/a/bc"), Some(Path::new("/a/b"))).is_err());
		// A descendant of the target is not an ancestor.
		assert!(directory_chain(Path::new("/a"), Some(Path::new("/a/b"))).is_err());
	}

	#[test]
	fn test_find_config_none_and_one() {
		let fs = MemoryFileSystem::from_files([
			("/p/empty/readme.md", ""),
			("/p/one/.project.toml", "a = 1"),
		]);
		let options = options(fs);
		let re = config_pattern(&options.config_prefix);

		assert_eq!(find_config(Path::new("/p/empty"), &re, &options).unwrap(), None);
		assert_eq!(
			find_config(Path::new("/p/one"), &re, &options).unwrap(),
			Some(ConfigFile {
				path: PathBuf::from("/p/one/.project.toml"),
				format: Format::Toml,
			})
		);
	}

	#[test]
	fn test_find_config_ambiguous() {
		let fs = MemoryFileSystem::from_files([
			("/path/to/project/.project.json", ""),
			("/path/to/project/.project.toml", ""),
		]);
		let options = options(fs);
		let re = config_pattern(&options.config_prefix);
		let err = find_config(Path::new("/path/to/project"), &re, &options).unwrap_err();
		match &err {
			ConfyglotError::AmbiguousConfig { directory, paths } => {
				assert_eq!(directory, Path::new("/path/to/project"));
				assert_eq!(
					paths,
					&vec![
						PathBuf::from("/path/to/project/.project.json"),
						PathBuf::from("/path/to/project/.project.toml"),
					]
				);
			}
			other => panic!("unexpected error: {other:?}"),
		}
		assert_eq!(
			err.to_string(),
			"multiple possible configurations found in '/path/to/project': /path/to/project/.project.json, /path/to/project/.project.toml"
		);
	}

	#[test]
	fn test_find_configs_root_first() {
		let fs = MemoryFileSystem::from_files([
			("/r/.project.json", "{}"),
			("/r/a/b/.project.yaml", "x: 1"),
			("/r/a/b/c/file.txt", ""),
		]);
		let found = find_configs(Path::new("/r/a/b/c"), Some(Path::new("/r")), &options(fs)).unwrap();
		let paths: Vec<_> = found.iter().map(|f| f.path.clone()).collect();
		assert_eq!(
			paths,
			vec![PathBuf::from("/r/.project.json"), PathBuf::from("/r/a/b/.project.yaml")]
		);
	}

	#[test]
	fn test_find_configs_missing_directory() {
		let fs = MemoryFileSystem::from_files([("/r/file.txt", "")]);
		let err = find_configs(Path::new("/r/file.txt"), None, &options(fs)).unwrap_err();
		match err {
			ConfyglotError::ReadDirectory { path, source } => {
				assert_eq!(path, PathBuf::from("/r/file.txt"));
				assert_eq!(source.kind(), std::io::ErrorKind::NotADirectory);
			}
			other => panic!("unexpected error: {other:?}"),
		}
	}
}
