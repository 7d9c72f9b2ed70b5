use glam::Vec3;

use super::narrowphase::CollisionInput;
use crate::core::shape::ShapeGeometry;

/// Penetration between two convex shapes. `normal` points from A towards B.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Penetration {
    pub normal: Vec3,
    pub depth: f32,
    /// Point on A deepest inside B.
    pub point_a: Vec3,
    /// Point on B deepest inside A.
    pub point_b: Vec3,
}

/// Furthest point of a convex shape along `direction`, in world space.
pub fn support(input: &CollisionInput, direction: Vec3) -> Vec3 {
    let d = input.transform.inverse_transform_vector(direction);
    let local = match input.geometry {
        ShapeGeometry::Sphere { radius } => d.normalize_or_zero() * *radius,
        ShapeGeometry::Box { half_extents } => Vec3::new(
            half_extents.x.copysign(d.x),
            half_extents.y.copysign(d.y),
            half_extents.z.copysign(d.z),
        ),
        ShapeGeometry::Cylinder {
            radius,
            half_height,
        } => {
            let radial = (d.x * d.x + d.z * d.z).sqrt();
            let (x, z) = if radial > 1e-9 {
                (d.x / radial * radius, d.z / radial * radius)
            } else {
                (0.0, 0.0)
            };
            Vec3::new(x, half_height.copysign(d.y), z)
        }
        ShapeGeometry::Tetra { vertices } => furthest_vertex(vertices, d),
        ShapeGeometry::Polygon { vertices, .. } => furthest_vertex(vertices, d),
        ShapeGeometry::Particle | ShapeGeometry::Plane { .. } => Vec3::ZERO,
    };
    input.transform.transform_point(local)
}

fn furthest_vertex(vertices: &[Vec3], direction: Vec3) -> Vec3 {
    vertices
        .iter()
        .copied()
        .max_by(|a, b| a.dot(direction).total_cmp(&b.dot(direction)))
        .unwrap_or(Vec3::ZERO)
}

/// Minkowski-difference vertex remembering which shape points produced it.
#[derive(Debug, Clone, Copy)]
struct SupportPoint {
    point: Vec3,
    a: Vec3,
    b: Vec3,
}

fn support_pair(a: &CollisionInput, b: &CollisionInput, direction: Vec3) -> SupportPoint {
    let on_a = support(a, direction);
    let on_b = support(b, -direction);
    SupportPoint {
        point: on_a - on_b,
        a: on_a,
        b: on_b,
    }
}

/// Gilbert-Johnson-Keerthi intersection test handing overlaps to EPA.
pub struct GjkAlgorithm;

impl GjkAlgorithm {
    const MAX_ITERATIONS: usize = 64;
    const EPSILON: f32 = 1e-10;

    pub fn intersect(a: &CollisionInput, b: &CollisionInput) -> Option<Penetration> {
        let mut direction = b.transform.position - a.transform.position;
        if direction.length_squared() < Self::EPSILON {
            direction = Vec3::X;
        }

        let first = support_pair(a, b, direction);
        let mut simplex = vec![first];
        direction = -first.point;

        for _ in 0..Self::MAX_ITERATIONS {
            if direction.length_squared() < Self::EPSILON {
                // Origin sits on the simplex boundary: touching, no depth to resolve.
                return None;
            }
            let next = support_pair(a, b, direction);
            if next.point.dot(direction) <= 0.0 {
                return None;
            }
            simplex.insert(0, next);
            if Self::next_simplex(&mut simplex, &mut direction) {
                return EpaAlgorithm::penetration(&simplex, a, b);
            }
        }
        None
    }

    /// Reduces the simplex to the feature nearest the origin. Index 0 is the newest point.
    fn next_simplex(simplex: &mut Vec<SupportPoint>, direction: &mut Vec3) -> bool {
        match simplex.len() {
            2 => Self::line(simplex, direction),
            3 => Self::triangle(simplex, direction),
            _ => Self::tetrahedron(simplex, direction),
        }
    }

    fn line(simplex: &mut Vec<SupportPoint>, direction: &mut Vec3) -> bool {
        let a = simplex[0].point;
        let b = simplex[1].point;
        let ab = b - a;
        let ao = -a;
        if ab.dot(ao) > 0.0 {
            *direction = ab.cross(ao).cross(ab);
            if direction.length_squared() < Self::EPSILON {
                // Origin lies on the segment; any perpendicular keeps the search going.
                *direction = ab.normalize_or_zero().any_orthonormal_vector();
            }
        } else {
            simplex.truncate(1);
            *direction = ao;
        }
        false
    }

    fn triangle(simplex: &mut Vec<SupportPoint>, direction: &mut Vec3) -> bool {
        let (sa, sb, sc) = (simplex[0], simplex[1], simplex[2]);
        let ab = sb.point - sa.point;
        let ac = sc.point - sa.point;
        let ao = -sa.point;
        let abc = ab.cross(ac);

        if abc.cross(ac).dot(ao) > 0.0 {
            if ac.dot(ao) > 0.0 {
                *simplex = vec![sa, sc];
                *direction = ac.cross(ao).cross(ac);
                false
            } else {
                *simplex = vec![sa, sb];
                Self::line(simplex, direction)
            }
        } else if ab.cross(abc).dot(ao) > 0.0 {
            *simplex = vec![sa, sb];
            Self::line(simplex, direction)
        } else if abc.dot(ao) > 0.0 {
            *direction = abc;
            false
        } else {
            *simplex = vec![sa, sc, sb];
            *direction = -abc;
            false
        }
    }

    fn tetrahedron(simplex: &mut Vec<SupportPoint>, direction: &mut Vec3) -> bool {
        let (sa, sb, sc, sd) = (simplex[0], simplex[1], simplex[2], simplex[3]);
        let ab = sb.point - sa.point;
        let ac = sc.point - sa.point;
        let ad = sd.point - sa.point;
        let ao = -sa.point;

        let abc = ab.cross(ac);
        let acd = ac.cross(ad);
        let adb = ad.cross(ab);

        if abc.dot(ao) > 0.0 {
            *simplex = vec![sa, sb, sc];
            return Self::triangle(simplex, direction);
        }
        if acd.dot(ao) > 0.0 {
            *simplex = vec![sa, sc, sd];
            return Self::triangle(simplex, direction);
        }
        if adb.dot(ao) > 0.0 {
            *simplex = vec![sa, sd, sb];
            return Self::triangle(simplex, direction);
        }
        true
    }
}

/// Expanding polytope algorithm recovering depth and witness points from a GJK simplex.
struct EpaAlgorithm;

impl EpaAlgorithm {
    const MAX_ITERATIONS: usize = 64;
    const TOLERANCE: f32 = 1e-4;

    fn penetration(
        simplex: &[SupportPoint],
        a: &CollisionInput,
        b: &CollisionInput,
    ) -> Option<Penetration> {
        if simplex.len() < 4 {
            return None;
        }
        let mut polytope: Vec<SupportPoint> = simplex[..4].to_vec();
        let interior = polytope.iter().map(|p| p.point).sum::<Vec3>() * 0.25;
        let mut faces: Vec<[usize; 3]> = vec![[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]];
        for face in &mut faces {
            Self::orient(&polytope, face, interior);
        }

        let mut closest = Self::closest_face(&polytope, &faces)?;
        for _ in 0..Self::MAX_ITERATIONS {
            let (face_index, normal, distance) = closest;
            let candidate = support_pair(a, b, normal);
            if candidate.point.dot(normal) - distance < Self::TOLERANCE {
                return Self::witness(&polytope, faces[face_index], normal, distance);
            }

            let new_index = polytope.len();
            polytope.push(candidate);

            let mut horizon: Vec<(usize, usize)> = Vec::new();
            let mut removed_any = false;
            faces.retain(|face| {
                let p0 = polytope[face[0]].point;
                let n = (polytope[face[1]].point - p0).cross(polytope[face[2]].point - p0);
                if n.dot(candidate.point - p0) > 0.0 {
                    removed_any = true;
                    for (u, v) in [(face[0], face[1]), (face[1], face[2]), (face[2], face[0])] {
                        if let Some(pos) = horizon.iter().position(|&edge| edge == (v, u)) {
                            horizon.swap_remove(pos);
                        } else {
                            horizon.push((u, v));
                        }
                    }
                    false
                } else {
                    true
                }
            });

            if !removed_any {
                return Self::witness(&polytope, faces[face_index], normal, distance);
            }

            for (u, v) in horizon {
                let mut face = [u, v, new_index];
                Self::orient(&polytope, &mut face, interior);
                faces.push(face);
            }

            closest = Self::closest_face(&polytope, &faces)?;
        }

        let (face_index, normal, distance) = closest;
        Self::witness(&polytope, faces[face_index], normal, distance)
    }

    fn orient(polytope: &[SupportPoint], face: &mut [usize; 3], interior: Vec3) {
        let p0 = polytope[face[0]].point;
        let n = (polytope[face[1]].point - p0).cross(polytope[face[2]].point - p0);
        if n.dot(p0 - interior) < 0.0 {
            face.swap(1, 2);
        }
    }

    fn closest_face(polytope: &[SupportPoint], faces: &[[usize; 3]]) -> Option<(usize, Vec3, f32)> {
        faces
            .iter()
            .enumerate()
            .filter_map(|(index, face)| {
                let p0 = polytope[face[0]].point;
                let n = (polytope[face[1]].point - p0)
                    .cross(polytope[face[2]].point - p0)
                    .normalize_or_zero();
                if n == Vec3::ZERO {
                    None
                } else {
                    Some((index, n, n.dot(p0)))
                }
            })
            .min_by(|x, y| x.2.total_cmp(&y.2))
    }

    fn witness(
        polytope: &[SupportPoint],
        face: [usize; 3],
        normal: Vec3,
        distance: f32,
    ) -> Option<Penetration> {
        if !(distance > 0.0 && distance.is_finite()) {
            return None;
        }
        let (pa, pb, pc) = (polytope[face[0]], polytope[face[1]], polytope[face[2]]);
        let (u, v, w) = barycentric(normal * distance, pa.point, pb.point, pc.point);
        Some(Penetration {
            normal,
            depth: distance,
            point_a: pa.a * u + pb.a * v + pc.a * w,
            point_b: pa.b * u + pb.b * v + pc.b * w,
        })
    }
}

fn barycentric(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> (f32, f32, f32) {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;
    let d00 = v0.dot(v0);
    let d01 = v0.dot(v1);
    let d11 = v1.dot(v1);
    let d20 = v2.dot(v0);
    let d21 = v2.dot(v1);
    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < 1e-12 {
        return (1.0, 0.0, 0.0);
    }
    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    (1.0 - v - w, v, w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Transform;
    use approx::assert_abs_diff_eq;
    use glam::Quat;

    fn input<'a>(geometry: &'a ShapeGeometry, transform: &'a Transform) -> CollisionInput<'a> {
        CollisionInput {
            geometry,
            transform,
        }
    }

    #[test]
    fn overlapping_spheres_report_depth_and_normal() {
        let sphere = ShapeGeometry::sphere(1.0);
        let ta = Transform::default();
        let tb = Transform::from_position(Vec3::new(1.5, 0.0, 0.0));
        let hit = GjkAlgorithm::intersect(&input(&sphere, &ta), &input(&sphere, &tb))
            .expect("spheres overlap");
        assert_abs_diff_eq!(hit.depth, 0.5, epsilon = 0.02);
        assert!(hit.normal.x > 0.95, "normal {:?} should point from A to B", hit.normal);
    }

    #[test]
    fn separated_shapes_do_not_intersect() {
        let cube = ShapeGeometry::cuboid(Vec3::splat(0.5));
        let cylinder = ShapeGeometry::cylinder(0.5, 1.0);
        let ta = Transform::default();
        let tb = Transform::from_position(Vec3::new(3.0, 0.0, 0.0));
        assert!(GjkAlgorithm::intersect(&input(&cube, &ta), &input(&cylinder, &tb)).is_none());
    }

    #[test]
    fn box_resting_into_cylinder_side() {
        let cube = ShapeGeometry::cuboid(Vec3::splat(0.5));
        let cylinder = ShapeGeometry::cylinder(0.5, 1.0);
        let ta = Transform::new(Vec3::new(0.0, 0.0, 0.0), Quat::IDENTITY);
        let tb = Transform::from_position(Vec3::new(0.0, 0.0, 0.9));
        let hit = GjkAlgorithm::intersect(&input(&cube, &ta), &input(&cylinder, &tb))
            .expect("overlap of 0.1 along z");
        assert_abs_diff_eq!(hit.depth, 0.1, epsilon = 0.01);
        assert!(hit.normal.z > 0.95);
        assert!((hit.point_a - hit.point_b).dot(hit.normal) > 0.0);
    }

    #[test]
    fn support_of_rotated_box_is_a_corner() {
        let cube = ShapeGeometry::cuboid(Vec3::ONE);
        let t = Transform::new(Vec3::ZERO, Quat::from_rotation_y(std::f32::consts::FRAC_PI_4));
        let p = support(&input(&cube, &t), Vec3::X);
        assert_abs_diff_eq!(p.x, std::f32::consts::SQRT_2, epsilon = 1e-5);
    }
}
