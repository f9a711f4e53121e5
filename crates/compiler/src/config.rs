//! Compiler configuration.
//!
//! `CompilerConfig` carries the knobs for the assemble-and-link step. A
//! project can keep them in a `mint.toml` next to its sources:
//!
//! ```toml
//! [build]
//! cc = "clang"
//! runtime = "my_runtime.c"
//! keep-asm = true
//! libraries = ["m"]
//! ```
//!
//! Command-line flags win over file values.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Clone)]
pub struct CompilerConfig {
    /// C compiler used to assemble the generated .s and link the runtime.
    pub cc: String,
    /// Replace the embedded C runtime with this file.
    pub runtime: Option<PathBuf>,
    /// Keep the intermediate .s file after linking.
    pub keep_asm: bool,
    /// Extra libraries passed to the linker.
    pub libraries: Vec<String>,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        CompilerConfig {
            cc: "cc".to_string(),
            runtime: None,
            keep_asm: false,
            libraries: Vec::new(),
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        CompilerConfig::default()
    }

    pub fn with_cc(mut self, cc: impl Into<String>) -> Self {
        self.cc = cc.into();
        self
    }

    pub fn with_runtime(mut self, path: impl Into<PathBuf>) -> Self {
        self.runtime = Some(path.into());
        self
    }

    pub fn with_library(mut self, lib: impl Into<String>) -> Self {
        self.libraries.push(lib.into());
        self
    }

    /// Parse the `[build]` section of a `mint.toml`. Missing keys keep
    /// their defaults; unknown keys are rejected.
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        let file: ConfigFile =
            toml::from_str(toml_str).map_err(|e| format!("Failed to parse config: {}", e))?;
        let build = file.build.unwrap_or_default();

        let mut config = CompilerConfig::default();
        if let Some(cc) = build.cc {
            config.cc = cc;
        }
        config.runtime = build.runtime;
        config.keep_asm = build.keep_asm.unwrap_or(false);
        config.libraries = build.libraries.unwrap_or_default();
        Ok(config)
    }

    /// Load configuration from a TOML file on disk.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config '{}': {}", path.display(), e))?;
        Self::from_toml(&content)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    build: Option<BuildSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct BuildSection {
    cc: Option<String>,
    runtime: Option<PathBuf>,
    keep_asm: Option<bool>,
    libraries: Option<Vec<String>>,
}
