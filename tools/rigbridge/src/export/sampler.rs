//! Keyframe sampling of curve groups

use glam::{EulerRot, Quat, Vec3};
use rigbridge_scene::{KeyframeInterpolation, Object};

use super::target::pose_bone_name;

use super::channels::{ChannelGroup, SamplerBuilder};
use super::types::{AnimationSampler, Interpolation, SamplerOutput};
use super::ExportSettings;
use crate::convert::{self, UpAxis};
use crate::error::ExportError;

/// Samples every curve of a group at the union of their keyframes.
///
/// Bone curves hold offsets from the bone's rest pose; their output is
/// composed with the parent-relative rest transform, so a zero pose yields the
/// rest node's TRS.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyframeSampler;

impl SamplerBuilder for KeyframeSampler {
    fn build_sampler(
        &self,
        group: &ChannelGroup<'_>,
        object: &Object,
        settings: &ExportSettings,
    ) -> Result<AnimationSampler, ExportError> {
        let frames = keyframe_frames(group);
        if frames.is_empty() {
            return Err(ExportError::NoKeyframes(group.property.to_string()));
        }
        let (rest_scale, rest_rotation, rest_translation) = rest_pose(group, object)?;

        let fps = settings.frame_rate.max(1) as f32;
        let input = frames.iter().map(|f| f / fps).collect();
        let up = settings.up_axis;

        let output = match group.property {
            "location" | "delta_location" => {
                SamplerOutput::Translation(sample_vec3(group, &frames, 0.0, |v| {
                    convert::location_to_gltf(rest_translation + rest_rotation * v, up)
                })?)
            }
            "scale" => SamplerOutput::Scale(sample_vec3(group, &frames, 1.0, |v| {
                convert::scale_to_gltf(rest_scale * v, up)
            })?),
            "rotation_quaternion" => SamplerOutput::Rotation(sample_quaternion(
                group,
                &frames,
                rest_rotation,
                up,
            )?),
            "rotation_euler" => {
                SamplerOutput::Rotation(sample_euler(group, &frames, rest_rotation, up)?)
            }
            "value" => SamplerOutput::Weights(
                frames
                    .iter()
                    .flat_map(|&f| group.curves.iter().map(move |c| c.evaluate(f)))
                    .collect(),
            ),
            other => return Err(ExportError::UnsupportedProperty(other.to_string())),
        };

        Ok(AnimationSampler {
            input,
            output,
            interpolation: interpolation(group),
        })
    }
}

/// Parent-relative rest (scale, rotation, translation) of the bone the group
/// animates. Identity for object curves.
fn rest_pose(group: &ChannelGroup<'_>, object: &Object) -> Result<(Vec3, Quat, Vec3), ExportError> {
    let Some(curve) = group.curves.first() else {
        return Ok((Vec3::ONE, Quat::IDENTITY, Vec3::ZERO));
    };
    let Some(bone) = pose_bone_name(&curve.data_path)? else {
        return Ok((Vec3::ONE, Quat::IDENTITY, Vec3::ZERO));
    };

    let rest = object
        .armature()
        .and_then(|armature| armature.local_matrix(armature.find_bone(bone)?))
        .ok_or_else(|| ExportError::BoneNotFound {
            object: object.name.clone(),
            bone: bone.to_string(),
        })?;
    Ok(rest.to_scale_rotation_translation())
}

/// Sorted, deduplicated frames keyed by any curve of the group.
fn keyframe_frames(group: &ChannelGroup<'_>) -> Vec<f32> {
    let mut frames: Vec<f32> = group
        .curves
        .iter()
        .flat_map(|c| c.keyframes.iter().map(|k| k.frame))
        .collect();
    frames.sort_by(f32::total_cmp);
    frames.dedup();
    frames
}

/// STEP when every key holds its value, LINEAR otherwise.
fn interpolation(group: &ChannelGroup<'_>) -> Interpolation {
    let all_constant = group
        .curves
        .iter()
        .flat_map(|c| &c.keyframes)
        .all(|k| k.interpolation == KeyframeInterpolation::Constant);
    if all_constant {
        Interpolation::Step
    } else {
        Interpolation::Linear
    }
}

/// Evaluate the group at `frame`, each curve filling its `array_index` slot.
fn sample_components<const N: usize>(
    group: &ChannelGroup<'_>,
    frame: f32,
    defaults: [f32; N],
) -> Result<[f32; N], ExportError> {
    let mut values = defaults;
    for curve in &group.curves {
        let slot = values.get_mut(curve.array_index as usize).ok_or_else(|| {
            ExportError::ArrayIndexOutOfRange {
                property: group.property.to_string(),
                index: curve.array_index,
            }
        })?;
        *slot = curve.evaluate(frame);
    }
    Ok(values)
}

fn sample_vec3(
    group: &ChannelGroup<'_>,
    frames: &[f32],
    default: f32,
    to_gltf: impl Fn(Vec3) -> Vec3,
) -> Result<Vec<[f32; 3]>, ExportError> {
    frames
        .iter()
        .map(|&f| {
            let v = sample_components(group, f, [default; 3])?;
            Ok(to_gltf(Vec3::from_array(v)).to_array())
        })
        .collect()
}

/// Host quaternions are stored w, x, y, z.
fn sample_quaternion(
    group: &ChannelGroup<'_>,
    frames: &[f32],
    rest: Quat,
    up: UpAxis,
) -> Result<Vec<[f32; 4]>, ExportError> {
    frames
        .iter()
        .map(|&f| {
            let [w, x, y, z] = sample_components(group, f, [1.0, 0.0, 0.0, 0.0])?;
            let q = Quat::from_xyzw(x, y, z, w);
            let q = if q.length_squared() > 0.0 { q.normalize() } else { Quat::IDENTITY };
            Ok(convert::rotation_to_gltf((rest * q).normalize(), up).to_array())
        })
        .collect()
}

/// XYZ euler angles (X applied first).
fn sample_euler(
    group: &ChannelGroup<'_>,
    frames: &[f32],
    rest: Quat,
    up: UpAxis,
) -> Result<Vec<[f32; 4]>, ExportError> {
    frames
        .iter()
        .map(|&f| {
            let [x, y, z] = sample_components(group, f, [0.0; 3])?;
            let q = Quat::from_euler(EulerRot::ZYX, z, y, x);
            Ok(convert::rotation_to_gltf((rest * q).normalize(), up).to_array())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::channels::channel_groups;
    use crate::export::ChannelGrouping;
    use glam::Mat4;
    use rigbridge_scene::{Action, Armature, FCurve, Keyframe, ObjectData, Scene};

    fn sample(action: &Action, settings: &ExportSettings) -> Result<AnimationSampler, ExportError> {
        let mut scene = Scene::new("Scene");
        let id = scene.add_object("Cube", ObjectData::Empty);
        let groups = channel_groups(action, ChannelGrouping::Property);
        KeyframeSampler.build_sampler(&groups[0], scene.object(id)?, settings)
    }

    #[test]
    fn test_translation_union_of_frames() {
        let action = Action::new("Move")
            .with_curve(FCurve::new("location", 0).with_key(0.0, 0.0).with_key(24.0, 2.0))
            .with_curve(FCurve::new("location", 2).with_key(12.0, 5.0));
        let sampler = sample(&action, &ExportSettings::default()).unwrap();

        assert_eq!(sampler.input, vec![0.0, 0.5, 1.0]);
        assert_eq!(
            sampler.output,
            SamplerOutput::Translation(vec![[0.0, 0.0, 5.0], [1.0, 0.0, 5.0], [2.0, 0.0, 5.0]])
        );
        assert_eq!(sampler.interpolation, Interpolation::Linear);
    }

    #[test]
    fn test_quaternion_reordered_to_xyzw() {
        let mut action = Action::new("Turn");
        for (i, value) in [0.5f32, 0.5, 0.5, 0.5].into_iter().enumerate() {
            action = action.with_curve(FCurve::new("rotation_quaternion", i as u32).with_key(1.0, value));
        }
        let sampler = sample(&action, &ExportSettings::default()).unwrap();
        assert_eq!(sampler.output, SamplerOutput::Rotation(vec![[0.5, 0.5, 0.5, 0.5]]));

        let x_only = Action::new("Flip")
            .with_curve(FCurve::new("rotation_quaternion", 0).with_key(0.0, 0.0))
            .with_curve(FCurve::new("rotation_quaternion", 1).with_key(0.0, 1.0));
        let sampler = sample(&x_only, &ExportSettings::default()).unwrap();
        assert_eq!(sampler.output, SamplerOutput::Rotation(vec![[1.0, 0.0, 0.0, 0.0]]));
    }

    #[test]
    fn test_euler_converts_to_quaternion() {
        let action = Action::new("Spin")
            .with_curve(FCurve::new("rotation_euler", 2).with_key(0.0, std::f32::consts::FRAC_PI_2));
        let sampler = sample(&action, &ExportSettings::default()).unwrap();
        let SamplerOutput::Rotation(values) = sampler.output else {
            panic!("expected rotation output");
        };
        let expected = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        assert!(Quat::from_array(values[0]).abs_diff_eq(expected, 1e-6));
    }

    /// Hip at (0, 1, 0); Chest at (0, 2, 0) under Hip, turned 90 degrees about Z
    fn rigged_scene() -> Scene {
        let mut scene = Scene::new("Scene");
        let rig = scene.add_object("Rig", ObjectData::Armature(Armature::new()));
        let mut session = scene.edit_armature(rig).unwrap();
        let hip = session.new_bone("Hip");
        let chest = session.new_bone("Chest");
        {
            let bone = session.bone_mut(hip).unwrap();
            bone.matrix = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0));
            bone.length = 1.0;
        }
        {
            let bone = session.bone_mut(chest).unwrap();
            bone.matrix = Mat4::from_rotation_translation(
                Quat::from_rotation_z(std::f32::consts::FRAC_PI_2),
                Vec3::new(0.0, 2.0, 0.0),
            );
            bone.length = 1.0;
        }
        session.set_parent(chest, Some(hip)).unwrap();
        drop(session);
        scene
    }

    fn sample_bone(action: &Action) -> AnimationSampler {
        let scene = rigged_scene();
        let rig = scene.find_object("Rig").unwrap();
        let groups = channel_groups(action, ChannelGrouping::DataPath);
        KeyframeSampler
            .build_sampler(&groups[0], scene.object(rig).unwrap(), &ExportSettings::default())
            .unwrap()
    }

    #[test]
    fn test_bone_offsets_compose_with_rest_pose() {
        let location = Action::new("Reach").with_curve(
            FCurve::new("pose.bones[\"Chest\"].location", 1)
                .with_key(0.0, 0.0)
                .with_key(24.0, 1.0),
        );
        let SamplerOutput::Translation(values) = sample_bone(&location).output else {
            panic!("expected translation output");
        };
        // Zero offset is the rest translation; +Y is along the turned bone
        assert!(Vec3::from_array(values[0]).abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6));
        assert!(Vec3::from_array(values[1]).abs_diff_eq(Vec3::new(-1.0, 1.0, 0.0), 1e-6));

        let rotation = Action::new("Rest").with_curve(
            FCurve::new("pose.bones[\"Chest\"].rotation_quaternion", 0).with_key(0.0, 1.0),
        );
        let SamplerOutput::Rotation(values) = sample_bone(&rotation).output else {
            panic!("expected rotation output");
        };
        let rest = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        assert!(Quat::from_array(values[0]).abs_diff_eq(rest, 1e-6));

        let scale = Action::new("Grow").with_curve(
            FCurve::new("pose.bones[\"Hip\"].scale", 0).with_key(0.0, 2.0),
        );
        assert_eq!(
            sample_bone(&scale).output,
            SamplerOutput::Scale(vec![[2.0, 1.0, 1.0]])
        );
    }

    #[test]
    fn test_unknown_bone_is_an_error() {
        let scene = rigged_scene();
        let rig = scene.find_object("Rig").unwrap();
        let action = Action::new("Wag")
            .with_curve(FCurve::new("pose.bones[\"Tail\"].location", 0).with_key(0.0, 1.0));
        let groups = channel_groups(&action, ChannelGrouping::DataPath);
        assert!(matches!(
            KeyframeSampler.build_sampler(
                &groups[0],
                scene.object(rig).unwrap(),
                &ExportSettings::default()
            ),
            Err(ExportError::BoneNotFound { .. })
        ));
    }

    #[test]
    fn test_z_up_translation() {
        let action =
            Action::new("Lift").with_curve(FCurve::new("location", 2).with_key(0.0, 3.0));
        let settings = ExportSettings {
            up_axis: UpAxis::Z,
            ..Default::default()
        };
        let sampler = sample(&action, &settings).unwrap();
        assert_eq!(sampler.output, SamplerOutput::Translation(vec![[0.0, 3.0, 0.0]]));
    }

    #[test]
    fn test_all_constant_keys_step() {
        let mut curve = FCurve::new("scale", 0);
        for frame in [0.0, 10.0] {
            curve.insert_keyframe(Keyframe {
                frame,
                value: 2.0,
                interpolation: KeyframeInterpolation::Constant,
            });
        }
        let sampler = sample(&Action::new("Pop").with_curve(curve), &ExportSettings::default()).unwrap();
        assert_eq!(sampler.interpolation, Interpolation::Step);
        assert_eq!(
            sampler.output,
            SamplerOutput::Scale(vec![[2.0, 1.0, 1.0], [2.0, 1.0, 1.0]])
        );
    }

    #[test]
    fn test_morph_weights_per_curve() {
        let action = Action::new("Blink")
            .with_curve(FCurve::new("key_blocks[\"Blink\"].value", 0).with_key(0.0, 0.0).with_key(1.0, 1.0))
            .with_curve(FCurve::new("key_blocks[\"Smile\"].value", 0).with_key(0.0, 0.5));
        let sampler = sample(&action, &ExportSettings::default()).unwrap();
        assert_eq!(sampler.output, SamplerOutput::Weights(vec![0.0, 0.5, 1.0, 0.5]));
    }

    #[test]
    fn test_sampling_errors() {
        let empty = Action::new("Empty").with_curve(FCurve::new("location", 0));
        assert!(matches!(
            sample(&empty, &ExportSettings::default()),
            Err(ExportError::NoKeyframes(_))
        ));

        let wide = Action::new("Wide").with_curve(FCurve::new("location", 3).with_key(0.0, 1.0));
        assert!(matches!(
            sample(&wide, &ExportSettings::default()),
            Err(ExportError::ArrayIndexOutOfRange { index: 3, .. })
        ));

        let odd = Action::new("Odd").with_curve(FCurve::new("hide_viewport", 0).with_key(0.0, 1.0));
        assert!(matches!(
            sample(&odd, &ExportSettings::default()),
            Err(ExportError::UnsupportedProperty(_))
        ));
    }
}
