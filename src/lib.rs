//! redmod-installer — classifies an unpacked Cyberpunk 2077 mod archive and
//! produces a deterministic copy/generate instruction list for an external
//! mod manager to apply.

pub const APP_VERSION: &str = "0.1.0";

pub mod config;
pub mod context;
pub mod detectors;
pub mod error;
pub mod file_tree;
pub mod host;
pub mod instructions;
pub mod layout;
pub mod path_match;
pub mod pipeline;
pub mod redmod;
pub mod scan;

pub use error::{InstallError, InstallResult};
pub use instructions::{Instruction, Instructions, LayoutKind};
pub use pipeline::{install, test_supported, TestSupportedResult};
