//! Box segment geometry and skinning data.

/// Joint count of the test skin
pub const BONE_COUNT: usize = 3;
/// Segment height between joints
pub const SEGMENT_HEIGHT: f32 = 1.0;
/// 4 vertices per side, 4 sides (open top and bottom)
pub const VERTS_PER_SEGMENT: usize = 16;

/// One segment's primitive data, indices local to the primitive
pub(crate) struct SegmentData {
    pub positions: Vec<[f32; 3]>,
    pub joints: Vec<[u8; 4]>,
    pub weights: Vec<[f32; 4]>,
    pub indices: Vec<u16>,
}

/// Create segment `segment`: a square tube from `segment` to `segment + 1`.
///
/// Bottom vertices belong fully to the segment's joint; top vertices are
/// split 50/50 with the next joint (the last segment keeps its own).
pub(crate) fn create_segment(segment: usize) -> SegmentData {
    let half_w = 0.15;
    let y0 = segment as f32 * SEGMENT_HEIGHT;
    let y1 = y0 + SEGMENT_HEIGHT;
    let bone = segment as u8;
    let next = (segment + 1).min(BONE_COUNT - 1) as u8;

    let sides = [
        [[-half_w, half_w], [half_w, half_w]],
        [[half_w, half_w], [half_w, -half_w]],
        [[half_w, -half_w], [-half_w, -half_w]],
        [[-half_w, -half_w], [-half_w, half_w]],
    ];

    let mut data = SegmentData {
        positions: Vec::new(),
        joints: Vec::new(),
        weights: Vec::new(),
        indices: Vec::new(),
    };

    for (side, [[ax, az], [bx, bz]]) in sides.into_iter().enumerate() {
        let base = (side * 4) as u16;
        let corners = [[ax, y0, az], [bx, y0, bz], [bx, y1, bz], [ax, y1, az]];
        for (i, corner) in corners.into_iter().enumerate() {
            data.positions.push(corner);
            if i < 2 || next == bone {
                data.joints.push([bone, 0, 0, 0]);
                data.weights.push([1.0, 0.0, 0.0, 0.0]);
            } else {
                data.joints.push([bone, next, 0, 0]);
                data.weights.push([0.5, 0.5, 0.0, 0.0]);
            }
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
    data
}

/// Compute min/max bounds for positions
pub(crate) fn compute_bounds(positions: &[[f32; 3]]) -> ([f32; 3], [f32; 3]) {
    let mut min = [f32::MAX; 3];
    let mut max = [f32::MIN; 3];
    for pos in positions {
        for i in 0..3 {
            min[i] = min[i].min(pos[i]);
            max[i] = max[i].max(pos[i]);
        }
    }
    (min, max)
}

/// Inverse bind matrix of joint `bone` (column-major)
pub(crate) fn inverse_bind_matrix(bone: usize) -> [[f32; 4]; 4] {
    [
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, -(bone as f32) * SEGMENT_HEIGHT, 0.0, 1.0],
    ]
}
