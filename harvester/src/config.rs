//! Harvest configuration (SPEC_FULL.md §4.G).

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SplitMode {
    Function,
    File,
}

#[derive(Clone, Debug)]
pub struct HarvestConfig {
    pub max_file_size: u64,
    pub min_functions_per_file: usize,
    pub max_files: usize,
    pub split_mode: SplitMode,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024,
            min_functions_per_file: 1,
            max_files: 200,
            split_mode: SplitMode::Function,
        }
    }
}

/// Directory names never descended into, regardless of depth (SPEC_FULL.md
/// §4.G).
pub const SKIP_DIRS: [&str; 10] = [
    ".git",
    "node_modules",
    "target",
    "dist",
    "build",
    "vendor",
    ".venv",
    "__pycache__",
    ".idea",
    ".vscode",
];
