//! Channel gathering: one animation channel per animated property

use hashbrown::{HashMap, HashSet};
use rigbridge_scene::{Action, ActionId, FCurve, Object, ObjectId, Scene, SceneId};
use std::sync::Arc;

use super::sampler::KeyframeSampler;
use super::target::DataPathTarget;
use super::types::{AnimationChannel, AnimationChannelTarget, AnimationSampler};
use super::{ChannelGrouping, ExportSettings};
use crate::error::ExportError;

/// F-curves animating one property, in action order
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelGroup<'a> {
    /// Last component of the curves' data path, e.g. `location`
    pub property: &'a str,
    pub curves: Vec<&'a FCurve>,
}

/// Group an action's curves, ordered by each group's first curve.
///
/// [`ChannelGrouping::Property`] keys groups by the last data path component
/// only; [`ChannelGrouping::DataPath`] keys bone curves by their full path, so
/// each bone's property becomes its own group. Other curves (object
/// transforms, morph weights) stay grouped by property in both modes.
pub fn channel_groups(action: &Action, grouping: ChannelGrouping) -> Vec<ChannelGroup<'_>> {
    let mut groups: Vec<ChannelGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for curve in &action.fcurves {
        let key = match grouping {
            ChannelGrouping::Property => curve.property(),
            ChannelGrouping::DataPath if curve.data_path.starts_with("pose.bones[") => {
                curve.data_path.as_str()
            }
            ChannelGrouping::DataPath => curve.property(),
        };
        match index.get(key) {
            Some(&i) => groups[i].curves.push(curve),
            None => {
                index.insert(key, groups.len());
                groups.push(ChannelGroup {
                    property: curve.property(),
                    curves: vec![curve],
                });
            }
        }
    }
    groups
}

/// Builds the keyframe sampler for a curve group.
pub trait SamplerBuilder {
    fn build_sampler(
        &self,
        group: &ChannelGroup<'_>,
        object: &Object,
        settings: &ExportSettings,
    ) -> Result<AnimationSampler, ExportError>;
}

/// Resolves the node and path a curve group animates.
pub trait TargetResolver {
    fn resolve_target(
        &self,
        group: &ChannelGroup<'_>,
        object: &Object,
        settings: &ExportSettings,
    ) -> Result<AnimationChannelTarget, ExportError>;
}

/// Decides whether a group becomes a channel
pub type ChannelFilter = fn(&ChannelGroup<'_>, &Object, &ExportSettings) -> bool;

fn accept_all(_: &ChannelGroup<'_>, _: &Object, _: &ExportSettings) -> bool {
    true
}

type CacheKey = (ActionId, ObjectId, ExportSettings);

/// Gathers animation channels, memoized per (action, object, settings).
///
/// A gatherer covers one conversion pass over one scene; results are shared,
/// and [`ChannelGatherer::reset`] forgets them. Passing a different scene
/// resets the cache, since action and object ids are scene indices. Edits to
/// the scene between calls are not detected. Failed gathers are not cached.
pub struct ChannelGatherer<S = KeyframeSampler, T = DataPathTarget> {
    sampler: S,
    target: T,
    filter: ChannelFilter,
    scene: Option<SceneId>,
    cache: HashMap<CacheKey, Arc<[AnimationChannel]>>,
}

impl ChannelGatherer {
    pub fn new() -> Self {
        Self::with_collaborators(KeyframeSampler, DataPathTarget)
    }
}

impl Default for ChannelGatherer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: SamplerBuilder, T: TargetResolver> ChannelGatherer<S, T> {
    pub fn with_collaborators(sampler: S, target: T) -> Self {
        Self {
            sampler,
            target,
            filter: accept_all,
            scene: None,
            cache: HashMap::new(),
        }
    }

    pub fn with_filter(mut self, filter: ChannelFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Channels for `action` applied to `object`.
    ///
    /// Any collaborator error aborts the whole gather, as do two groups
    /// resolving to the same node and path (e.g. `location` and
    /// `delta_location`).
    pub fn gather_channels(
        &mut self,
        scene: &Scene,
        action: ActionId,
        object: ObjectId,
        settings: &ExportSettings,
    ) -> Result<Arc<[AnimationChannel]>, ExportError> {
        if self.scene != Some(scene.id()) {
            if self.scene.is_some() {
                tracing::debug!("Scene changed, dropping {} cached results", self.cache.len());
            }
            self.cache.clear();
            self.scene = Some(scene.id());
        }

        let key = (action, object, *settings);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(Arc::clone(cached));
        }

        let action_data = scene.action(action)?;
        let object_data = scene.object(object)?;

        let mut channels = Vec::new();
        let mut animated = HashSet::new();
        for group in channel_groups(action_data, settings.grouping) {
            let Some(channel) = self.gather_channel(&group, object_data, settings)? else {
                continue;
            };
            if !animated.insert((channel.target.node.clone(), channel.target.path)) {
                return Err(ExportError::DuplicateChannel {
                    target: channel.target.node.to_string(),
                    path: channel.target.path.to_string(),
                });
            }
            channels.push(channel);
        }

        tracing::debug!(
            "Gathered {} channels for action '{}' on '{}'",
            channels.len(),
            action_data.name,
            object_data.name
        );

        let channels: Arc<[AnimationChannel]> = channels.into();
        self.cache.insert(key, Arc::clone(&channels));
        Ok(channels)
    }

    fn gather_channel(
        &self,
        group: &ChannelGroup<'_>,
        object: &Object,
        settings: &ExportSettings,
    ) -> Result<Option<AnimationChannel>, ExportError> {
        if !(self.filter)(group, object, settings) {
            tracing::debug!("Filtered out '{}' channel", group.property);
            return Ok(None);
        }

        Ok(Some(AnimationChannel {
            extensions: None,
            extras: None,
            sampler: self.sampler.build_sampler(group, object, settings)?,
            target: self.target.resolve_target(group, object, settings)?,
        }))
    }

    /// Forget every cached result.
    pub fn reset(&mut self) {
        self.cache.clear();
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    pub fn sampler(&self) -> &S {
        &self.sampler
    }

    pub fn target(&self) -> &T {
        &self.target
    }
}
