use glam::Vec3;

const EPSILON: f32 = 1e-4;

/// Half-space `normal · p <= offset`, the kept side of a clip.
#[derive(Debug, Clone, Copy)]
pub struct ClipPlane {
    normal: Vec3,
    offset: f32,
}

impl ClipPlane {
    pub fn from_point_normal(point: Vec3, normal: Vec3) -> Self {
        let n = normal.normalize_or_zero();
        Self {
            normal: n,
            offset: n.dot(point),
        }
    }

    pub fn signed_distance(&self, point: Vec3) -> f32 {
        self.normal.dot(point) - self.offset
    }
}

/// Clips a convex polygon against a set of planes (Sutherland-Hodgman).
pub fn clip_polygon(vertices: &[Vec3], planes: &[ClipPlane]) -> Vec<Vec3> {
    let mut output = vertices.to_vec();
    for plane in planes {
        output = clip_against_plane(&output, plane);
        if output.is_empty() {
            break;
        }
    }
    output
}

fn clip_against_plane(vertices: &[Vec3], plane: &ClipPlane) -> Vec<Vec3> {
    let mut clipped = Vec::with_capacity(vertices.len() + 1);
    for (i, &current) in vertices.iter().enumerate() {
        let next = vertices[(i + 1) % vertices.len()];
        let current_dist = plane.signed_distance(current);
        let next_dist = plane.signed_distance(next);
        let current_inside = current_dist <= EPSILON;
        let next_inside = next_dist <= EPSILON;

        if current_inside != next_inside {
            let denom = current_dist - next_dist;
            if denom.abs() > f32::EPSILON {
                clipped.push(current + (next - current) * (current_dist / denom));
            }
        }
        if next_inside {
            clipped.push(next);
        }
    }
    clipped
}

/// The four side planes bounding a rectangular face, facing outward.
pub fn face_side_planes(
    center: Vec3,
    tangent_u: Vec3,
    tangent_v: Vec3,
    half_u: f32,
    half_v: f32,
) -> [ClipPlane; 4] {
    [
        ClipPlane::from_point_normal(center + tangent_u * half_u, tangent_u),
        ClipPlane::from_point_normal(center - tangent_u * half_u, -tangent_u),
        ClipPlane::from_point_normal(center + tangent_v * half_v, tangent_v),
        ClipPlane::from_point_normal(center - tangent_v * half_v, -tangent_v),
    ]
}
