//! Host actions -> glTF animations
//!
//! [`ChannelGatherer`] turns an (action, object) pair into
//! [`AnimationChannel`]s; [`AnimationWriter`] packs channels into a GLB.

mod channels;
mod sampler;
mod source;
mod target;
mod types;
mod writer;

pub use channels::{
    channel_groups, ChannelFilter, ChannelGatherer, ChannelGroup, SamplerBuilder, TargetResolver,
};
pub use sampler::KeyframeSampler;
pub use source::{AnimationSource, BoneSource};
pub use target::{channel_path, pose_bone_name, DataPathTarget};
pub use types::{
    AnimationChannel, AnimationChannelTarget, AnimationSampler, ChannelPath, Interpolation,
    SamplerOutput, TargetNode,
};
pub use writer::{assemble_glb, AnimationWriter};

use anyhow::{Context, Result};
use rigbridge_scene::ActionId;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::convert::UpAxis;
use crate::error::ExportError;

pub const DEFAULT_FRAME_RATE: u32 = 24;

/// How f-curves are grouped into channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelGrouping {
    /// By the last data path component (`location`, `scale`, ...)
    #[default]
    Property,
    /// Bone curves by their full data path, one group per bone and property
    DataPath,
}

/// Export options. Part of the channel cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub up_axis: UpAxis,
    /// Frames per second used to turn keyframe frames into seconds
    pub frame_rate: u32,
    pub grouping: ChannelGrouping,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            up_axis: UpAxis::default(),
            frame_rate: DEFAULT_FRAME_RATE,
            grouping: ChannelGrouping::default(),
        }
    }
}

/// Export every action of a source as one animation each, returning GLB bytes.
///
/// Actions without f-curves are skipped.
pub fn export_source(
    source: &AnimationSource,
    settings: &ExportSettings,
) -> Result<Vec<u8>, ExportError> {
    let (scene, object) = source.build_scene()?;
    let mut gatherer = ChannelGatherer::new();
    let mut writer = AnimationWriter::new(settings.up_axis);
    writer.add_object(scene.object(object)?);

    for (index, action) in scene.actions().iter().enumerate() {
        if action.fcurves.is_empty() {
            tracing::warn!("Action '{}' has no f-curves, skipping", action.name);
            continue;
        }
        let channels = gatherer.gather_channels(&scene, ActionId(index as u32), object, settings)?;
        writer.add_animation(&action.name, &channels)?;
        tracing::info!("Action '{}': {} channels", action.name, channels.len());
    }

    writer.into_glb()
}

/// Read an animation source file and write a GLB.
pub fn export_glb(input: &Path, output: &Path, settings: &ExportSettings) -> Result<()> {
    let source = AnimationSource::load(input)?;
    let glb = export_source(&source, settings)
        .with_context(|| format!("Failed to export animations from {:?}", input))?;
    std::fs::write(output, glb).with_context(|| format!("Failed to write {:?}", output))?;
    Ok(())
}
