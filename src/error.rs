use std::path::PathBuf;

use thiserror::Error;

/// Maximum size of a headerless 8080 ROM image: the full 16 KiB address
/// space (`$0000-$3FFF`). The ROM-region write-protection boundary at
/// `$2000` (see `memory::ROM_END`) is a separate, narrower concern — it
/// governs which bytes are write-protected after load, not how large a
/// file may be loaded.
pub const MAX_ROM_SIZE: usize = 0x4000;

#[derive(Debug, Error)]
pub enum RomError {
    #[error("could not read ROM file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("ROM file {path} is {size} bytes, which exceeds the {MAX_ROM_SIZE}-byte limit")]
    TooLarge { path: PathBuf, size: usize },
}
