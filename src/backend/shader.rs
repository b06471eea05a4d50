// Shader loading
//
// Vulkan consumes SPIR-V as 32-bit words. Files are read in one go and
// checked for a whole number of words and the SPIR-V magic number.

use crate::error::SetupError;
use std::io::Cursor;
use std::path::{Path, PathBuf};

const SPIRV_MAGIC: u32 = 0x0723_0203;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

/// Provides compiled shader code for each stage
pub trait ShaderLoader {
    fn load(&self, stage: ShaderStage) -> Result<Vec<u32>, SetupError>;
}

/// Reads SPIR-V from files on disk
#[derive(Debug, Clone)]
pub struct FileShaderLoader {
    pub vertex: PathBuf,
    pub fragment: PathBuf,
}

impl FileShaderLoader {
    pub fn new(vertex: impl Into<PathBuf>, fragment: impl Into<PathBuf>) -> Self {
        Self {
            vertex: vertex.into(),
            fragment: fragment.into(),
        }
    }
}

impl ShaderLoader for FileShaderLoader {
    fn load(&self, stage: ShaderStage) -> Result<Vec<u32>, SetupError> {
        let path = match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        };
        let path = resolve_shader_path(path);
        log::info!("Loading {:?} shader from {}", stage, path.display());
        load_spirv(&path)
    }
}

/// Relative paths that don't exist under the working directory are looked
/// up next to the executable.
pub fn resolve_shader_path(path: &Path) -> PathBuf {
    if path.is_absolute() || path.exists() {
        return path.to_path_buf();
    }

    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(path)))
        .filter(|candidate| candidate.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

pub fn load_spirv(path: &Path) -> Result<Vec<u32>, SetupError> {
    let shader_load = |source| SetupError::ShaderLoad {
        path: path.to_path_buf(),
        source,
    };
    let bytes = std::fs::read(path).map_err(shader_load)?;
    parse_spirv(&bytes).map_err(shader_load)
}

/// Convert raw bytes to SPIR-V words, fixing endianness if needed.
pub fn parse_spirv(bytes: &[u8]) -> std::io::Result<Vec<u32>> {
    let words = ash::util::read_spv(&mut Cursor::new(bytes))?;
    if words.first() != Some(&SPIRV_MAGIC) {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            "missing SPIR-V magic number",
        ));
    }
    Ok(words)
}
