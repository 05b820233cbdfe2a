use std::{num::NonZero, path::PathBuf};

use anyhow::Result;
use og_image_core::config::Config;
use typed_path::Utf8NativePathBuf;

const DEFAULT_CONFIG: &str = "config.yml";

// For argp::FromArgs
pub fn native_path(value: &str) -> Result<Utf8NativePathBuf, String> {
    Ok(Utf8NativePathBuf::from(value))
}

pub fn load_config(path: Option<&Utf8NativePathBuf>) -> Result<Config> {
    Config::load(path.map_or(DEFAULT_CONFIG, |path| path.as_str()))
}

pub fn to_path_buf(path: &Utf8NativePathBuf) -> PathBuf { PathBuf::from(path.as_str()) }

pub fn default_concurrency() -> usize {
    std::thread::available_parallelism().map_or(1, NonZero::get)
}
