use std::collections::HashMap;
use std::fmt;

use anyhow::{anyhow, bail, Result};
use wgpu::naga;

/// Programmable pipeline stage an entry point is declared for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    /// Object/task stage: decides how many mesh workgroups to launch.
    Task,
    /// Mesh stage: emits vertices and primitives per workgroup.
    Mesh,
    Compute,
}

impl From<naga::ShaderStage> for ShaderStage {
    fn from(stage: naga::ShaderStage) -> Self {
        match stage {
            naga::ShaderStage::Vertex => ShaderStage::Vertex,
            naga::ShaderStage::Fragment => ShaderStage::Fragment,
            naga::ShaderStage::Task => ShaderStage::Task,
            naga::ShaderStage::Mesh => ShaderStage::Mesh,
            naga::ShaderStage::Compute => ShaderStage::Compute,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
            ShaderStage::Task => "task",
            ShaderStage::Mesh => "mesh",
            ShaderStage::Compute => "compute",
        };
        f.write_str(s)
    }
}

/// WGSL source plus the table of its stage entry points.
///
/// The source is parsed and validated with naga when the library is created,
/// so syntax errors, validation failures and missing entry points all surface
/// as errors before any pipeline is compiled.
#[derive(Debug, Clone)]
pub struct ShaderLibrary {
    label: &'static str,
    source: &'static str,
    entry_points: HashMap<String, ShaderStage>,
}

impl ShaderLibrary {
    pub fn parse(label: &'static str, source: &'static str) -> Result<Self> {
        let module = naga::front::wgsl::parse_str(source)
            .map_err(|e| anyhow!("shader `{label}` failed to parse:\n{}", e.emit_to_string(source)))?;

        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&module)
        .map_err(|e| anyhow!("shader `{label}` failed validation:\n{}", e.emit_to_string(source)))?;

        let entry_points: HashMap<_, _> = module
            .entry_points
            .iter()
            .map(|ep| (ep.name.clone(), ShaderStage::from(ep.stage)))
            .collect();

        log::debug!("shader `{label}`: {} entry points", entry_points.len());
        Ok(Self {
            label,
            source,
            entry_points,
        })
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    pub fn stage_of(&self, name: &str) -> Option<ShaderStage> {
        self.entry_points.get(name).copied()
    }

    /// Confirms `name` exists and is declared for `stage`.
    pub fn resolve<'n>(&self, stage: ShaderStage, name: &'n str) -> Result<&'n str> {
        match self.stage_of(name) {
            Some(found) if found == stage => Ok(name),
            Some(found) => bail!(
                "shader `{}`: entry point `{name}` is a {found} stage, expected {stage}",
                self.label
            ),
            None => bail!(
                "shader `{}`: missing {stage} entry point `{name}`",
                self.label
            ),
        }
    }
}
