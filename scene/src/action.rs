//! Animation actions made of keyframed f-curves.

use serde::{Deserialize, Serialize};

/// Interpolation from a keyframe to the next one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyframeInterpolation {
    /// Hold the value until the next key
    Constant,
    #[default]
    Linear,
    /// Evaluated linearly; handles are not modelled
    Bezier,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub frame: f32,
    pub value: f32,
    #[serde(default)]
    pub interpolation: KeyframeInterpolation,
}

impl Keyframe {
    pub fn new(frame: f32, value: f32) -> Self {
        Self {
            frame,
            value,
            interpolation: KeyframeInterpolation::default(),
        }
    }
}

/// One animated scalar: component `array_index` of the property at `data_path`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FCurve {
    /// e.g. `location` or `pose.bones["Spine"].rotation_quaternion`
    pub data_path: String,
    #[serde(default)]
    pub array_index: u32,
    #[serde(default)]
    pub keyframes: Vec<Keyframe>,
}

impl FCurve {
    pub fn new(data_path: impl Into<String>, array_index: u32) -> Self {
        Self {
            data_path: data_path.into(),
            array_index,
            keyframes: Vec::new(),
        }
    }

    /// Builder-style keyframe insertion.
    pub fn with_key(mut self, frame: f32, value: f32) -> Self {
        self.insert_keyframe(Keyframe::new(frame, value));
        self
    }

    /// Inserts a keyframe, replacing any key on the same frame.
    pub fn insert_keyframe(&mut self, key: Keyframe) {
        let at = self.keyframes.partition_point(|k| k.frame < key.frame);
        match self.keyframes.get_mut(at) {
            Some(existing) if existing.frame == key.frame => *existing = key,
            _ => self.keyframes.insert(at, key),
        }
    }

    /// Last dot-delimited component of the data path.
    pub fn property(&self) -> &str {
        self.data_path
            .rsplit('.')
            .next()
            .unwrap_or(self.data_path.as_str())
    }

    pub(crate) fn sort_keyframes(&mut self) {
        self.keyframes.sort_by(|a, b| a.frame.total_cmp(&b.frame));
    }

    /// Evaluates the curve at `frame`.
    ///
    /// Values hold flat before the first and after the last key. Keyframes
    /// must be sorted by frame.
    pub fn evaluate(&self, frame: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keyframes.first(), self.keyframes.last()) else {
            return 0.0;
        };
        if frame <= first.frame {
            return first.value;
        }
        if frame >= last.frame {
            return last.value;
        }

        let next = self.keyframes.partition_point(|k| k.frame <= frame);
        let (k0, k1) = (&self.keyframes[next - 1], &self.keyframes[next]);
        if k0.interpolation == KeyframeInterpolation::Constant {
            return k0.value;
        }

        let span = k1.frame - k0.frame;
        let factor = if span > 0.0 {
            (frame - k0.frame) / span
        } else {
            0.0
        };
        k0.value + (k1.value - k0.value) * factor
    }
}

/// A named set of f-curves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub name: String,
    #[serde(default)]
    pub fcurves: Vec<FCurve>,
}

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fcurves: Vec::new(),
        }
    }

    pub fn with_curve(mut self, curve: FCurve) -> Self {
        self.fcurves.push(curve);
        self
    }
}
