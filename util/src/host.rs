//! Host platform utility functions

use std::path::PathBuf;

/// Retrieve the software root directory from the `SISU_SW_ROOT` environment
/// variable.
pub fn get_sisu_sw_root() -> Result<PathBuf, std::env::VarError> {
    std::env::var("SISU_SW_ROOT").map(PathBuf::from)
}
