//! A2M/A2T Loader Domain
//!
//! Entry points that turn a module buffer or file into a [`Song`].

pub mod assembler;

pub use assembler::SongAssembler;

use std::fs;
use std::path::Path;

use crate::a2m_parser::header::{detect_container, Container};
use crate::error::Result;
use crate::song::Song;

/// Decode a complete module from memory.
pub fn load_song(data: &[u8]) -> Result<Song> {
    SongAssembler::new(data).assemble()
}

/// Read and decode a module from disk.
pub fn load_file(path: impl AsRef<Path>) -> Result<Song> {
    A2mFileLoader::load(path)
}

/// Loads A2M/A2T files from disk.
pub struct A2mFileLoader;

impl A2mFileLoader {
    /// Load a module file, detecting the container from its signature.
    pub fn load(path: impl AsRef<Path>) -> Result<Song> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        log::debug!("loading {} ({} bytes)", path.display(), data.len());
        load_song(&data)
    }

    /// Container of a buffer, if its signature is recognised.
    pub fn detect_format(data: &[u8]) -> Option<Container> {
        detect_container(data).ok()
    }
}
