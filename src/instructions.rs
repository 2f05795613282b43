//! Instruction-text loading for agent prompts.

use std::path::Path;

use crate::agents::SetupError;

/// Read one instruction file from the instructions directory.
pub fn load(dir: &Path, file: &str) -> Result<String, SetupError> {
    let path = dir.join(file);
    std::fs::read_to_string(&path).map_err(|source| SetupError::AssetRead {
        path: path.display().to_string(),
        source,
    })
}
