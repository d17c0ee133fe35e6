//! Module mapping port.

use std::io;
use std::path::Path;

use modresolve_core::ModuleIdentity;

/// Performs the physical load of a resolved module file.
///
/// Returns the mapped image size in bytes.
pub trait ModuleMapper: Send + Sync {
    fn map(&self, identity: &ModuleIdentity, path: &Path) -> io::Result<u64>;
}

/// Mapper that accepts any readable regular file.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileMapper;

impl ModuleMapper for FileMapper {
    fn map(&self, _identity: &ModuleIdentity, path: &Path) -> io::Result<u64> {
        let file = std::fs::File::open(path)?;
        let metadata = file.metadata()?;
        if !metadata.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        Ok(metadata.len())
    }
}
