//! Configuration discovery, parsing and cascading.
//!
//! This module handles:
//! - Finding one configuration file per directory along a root-to-target chain
//! - Dispatching each file to its format adapter, the normalizer and the schema
//! - Folding the results into one merged configuration

pub mod cascade;
pub mod finder;
pub mod parser;
pub mod types;

pub use cascade::{Loader, load, merge_configs};
pub use finder::{config_pattern, directory_chain, find_config, find_configs};
pub use parser::{parse_config_file, parse_config_path, parse_config_str};
pub use types::{ConfigFile, DateMode, LoadOptions, LoadedConfig, Options};
