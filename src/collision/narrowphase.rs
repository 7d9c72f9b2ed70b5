use glam::Vec3;

use super::clipping::{clip_polygon, face_side_planes};
use super::gjk::GjkAlgorithm;
use super::manifold::{CandidatePoint, ManifoldMode};
use crate::core::shape::{ShapeGeometry, ShapeType};
use crate::core::types::Transform;
use crate::error::{PhysicsError, Result};

/// Borrowed view of one shape at its current world pose.
#[derive(Debug, Clone, Copy)]
pub struct CollisionInput<'a> {
    pub geometry: &'a ShapeGeometry,
    pub transform: &'a Transform,
}

/// Writes candidate points for `first` against `second`; normals point from first to second.
pub type DetectFn = fn(&CollisionInput, &CollisionInput, f32, &mut Vec<CandidatePoint>);

/// One narrow-phase strategy as stored in the dispatch table.
#[derive(Clone, Copy)]
pub struct Detector {
    pub name: &'static str,
    pub mode: ManifoldMode,
    detect: DetectFn,
    flip: bool,
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("name", &self.name)
            .field("mode", &self.mode)
            .field("flip", &self.flip)
            .finish()
    }
}

impl Detector {
    /// Runs the detector, swapping the inputs for mirrored table entries.
    /// `margin` is the distance up to which separated features still report a point.
    pub fn detect(
        &self,
        first: &CollisionInput,
        second: &CollisionInput,
        margin: f32,
        out: &mut Vec<CandidatePoint>,
    ) {
        out.clear();
        if self.flip {
            (self.detect)(second, first, margin, out);
            for point in out.iter_mut() {
                point.normal = -point.normal;
            }
        } else {
            (self.detect)(first, second, margin, out);
        }
    }
}

/// Type-pair dispatch. A `None` cell is an unsupported pair.
#[derive(Debug, Clone)]
pub struct DetectorTable {
    table: [[Option<Detector>; ShapeType::COUNT]; ShapeType::COUNT],
}

impl Default for DetectorTable {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorTable {
    pub fn new() -> Self {
        let mut table = Self {
            table: [[None; ShapeType::COUNT]; ShapeType::COUNT],
        };

        table.register(ShapeType::Sphere, ShapeType::Sphere, "sphere-sphere", sphere_sphere, ManifoldMode::Full);
        table.register(ShapeType::Box, ShapeType::Sphere, "box-sphere", box_sphere, ManifoldMode::Full);
        table.register(ShapeType::Box, ShapeType::Box, "box-box", box_box, ManifoldMode::Full);

        for convex in [
            ShapeType::Sphere,
            ShapeType::Box,
            ShapeType::Cylinder,
            ShapeType::Tetra,
            ShapeType::Polygon,
            ShapeType::Particle,
        ] {
            table.register(ShapeType::Plane, convex, "plane-convex", plane_convex, ManifoldMode::Full);
        }

        let general = [
            ShapeType::Sphere,
            ShapeType::Box,
            ShapeType::Cylinder,
            ShapeType::Tetra,
            ShapeType::Polygon,
            ShapeType::Particle,
        ];
        for (i, &first) in general.iter().enumerate() {
            for &second in &general[i..] {
                if first == ShapeType::Particle && second == ShapeType::Particle {
                    continue;
                }
                if table.table[first.index()][second.index()].is_none() {
                    table.register(first, second, "gjk-epa", convex_convex, ManifoldMode::Incremental);
                }
            }
        }
        table
    }

    fn register(
        &mut self,
        first: ShapeType,
        second: ShapeType,
        name: &'static str,
        detect: DetectFn,
        mode: ManifoldMode,
    ) {
        self.table[first.index()][second.index()] = Some(Detector {
            name,
            mode,
            detect,
            flip: false,
        });
        if first != second {
            self.table[second.index()][first.index()] = Some(Detector {
                name,
                mode,
                detect,
                flip: true,
            });
        }
    }

    pub fn supports(&self, first: ShapeType, second: ShapeType) -> bool {
        self.table[first.index()][second.index()].is_some()
    }

    pub fn get(&self, first: ShapeType, second: ShapeType) -> Result<Detector> {
        self.table[first.index()][second.index()]
            .ok_or(PhysicsError::UnsupportedPair { first, second })
    }
}

fn push_point(out: &mut Vec<CandidatePoint>, on_first: Vec3, on_second: Vec3, normal: Vec3, depth: f32) {
    out.push(CandidatePoint {
        position: (on_first + on_second) * 0.5,
        normal,
        depth,
    });
}

fn sphere_sphere(a: &CollisionInput, b: &CollisionInput, margin: f32, out: &mut Vec<CandidatePoint>) {
    let (ShapeGeometry::Sphere { radius: ra }, ShapeGeometry::Sphere { radius: rb }) = (a.geometry, b.geometry)
    else {
        return;
    };
    let delta = b.transform.position - a.transform.position;
    let distance = delta.length();
    let reach = ra + rb;
    if distance > reach + margin {
        return;
    }
    let normal = if distance > 1e-6 { delta / distance } else { Vec3::Y };
    push_point(
        out,
        a.transform.position + normal * *ra,
        b.transform.position - normal * *rb,
        normal,
        reach - distance,
    );
}

fn box_sphere(a: &CollisionInput, b: &CollisionInput, margin: f32, out: &mut Vec<CandidatePoint>) {
    let (ShapeGeometry::Box { half_extents }, ShapeGeometry::Sphere { radius }) = (a.geometry, b.geometry) else {
        return;
    };
    let center = a.transform.inverse_transform_point(b.transform.position);
    let clamped = center.clamp(-*half_extents, *half_extents);

    let (local_normal, local_point, depth) = if clamped == center {
        // Centre inside the box: push out through the nearest face.
        let gaps = *half_extents - center.abs();
        let axis = if gaps.x <= gaps.y && gaps.x <= gaps.z {
            0
        } else if gaps.y <= gaps.z {
            1
        } else {
            2
        };
        let sign = if center[axis] >= 0.0 { 1.0 } else { -1.0 };
        let mut normal = Vec3::ZERO;
        normal[axis] = sign;
        let mut point = center;
        point[axis] = half_extents[axis] * sign;
        (normal, point, radius + gaps[axis])
    } else {
        let offset = center - clamped;
        let distance = offset.length();
        if distance > radius + margin {
            return;
        }
        (offset / distance, clamped, radius - distance)
    };

    let normal = a.transform.transform_vector(local_normal);
    push_point(
        out,
        a.transform.transform_point(local_point),
        b.transform.position - normal * *radius,
        normal,
        depth,
    );
}

#[derive(Debug, Clone, Copy)]
struct OrientedBox {
    center: Vec3,
    axes: [Vec3; 3],
    half: Vec3,
}

impl OrientedBox {
    fn new(transform: &Transform, half: Vec3) -> Self {
        let rotation = transform.rotation_matrix();
        Self {
            center: transform.position,
            axes: [rotation.x_axis, rotation.y_axis, rotation.z_axis],
            half,
        }
    }

    fn projected_radius(&self, axis: Vec3) -> f32 {
        (0..3).map(|k| self.half[k] * self.axes[k].dot(axis).abs()).sum()
    }

    /// Midpoint of the edge parallel to `axis_index` furthest along `direction`.
    fn support_edge(&self, axis_index: usize, direction: Vec3) -> Vec3 {
        let mut point = self.center;
        for k in 0..3 {
            if k != axis_index {
                let sign = if self.axes[k].dot(direction) >= 0.0 { 1.0 } else { -1.0 };
                point += self.axes[k] * self.half[k] * sign;
            }
        }
        point
    }
}

#[derive(Debug, Clone, Copy)]
enum SeparatingAxis {
    FaceA(usize),
    FaceB(usize),
    Edge(usize, usize),
}

fn box_box(a: &CollisionInput, b: &CollisionInput, margin: f32, out: &mut Vec<CandidatePoint>) {
    let (ShapeGeometry::Box { half_extents: ha }, ShapeGeometry::Box { half_extents: hb }) = (a.geometry, b.geometry)
    else {
        return;
    };
    let box_a = OrientedBox::new(a.transform, *ha);
    let box_b = OrientedBox::new(b.transform, *hb);
    let offset = box_b.center - box_a.center;

    let mut best: Option<(f32, Vec3, SeparatingAxis)> = None;
    let mut test = |axis: Vec3, kind: SeparatingAxis, bias: f32| -> bool {
        let separation =
            offset.dot(axis).abs() - box_a.projected_radius(axis) - box_b.projected_radius(axis);
        if separation > margin {
            return false;
        }
        let normal = if offset.dot(axis) >= 0.0 { axis } else { -axis };
        if best.map_or(true, |(current, _, _)| separation > current + bias) {
            best = Some((separation, normal, kind));
        }
        true
    };

    for i in 0..3 {
        if !test(box_a.axes[i], SeparatingAxis::FaceA(i), 0.0) {
            return;
        }
    }
    for j in 0..3 {
        if !test(box_b.axes[j], SeparatingAxis::FaceB(j), 1e-4) {
            return;
        }
    }
    for i in 0..3 {
        for j in 0..3 {
            let axis = box_a.axes[i].cross(box_b.axes[j]);
            let length = axis.length();
            if length < 1e-5 {
                continue;
            }
            // Edge axes must be clearly better than a face to win.
            if !test(axis / length, SeparatingAxis::Edge(i, j), 1e-3) {
                return;
            }
        }
    }

    let Some((separation, normal, kind)) = best else {
        return;
    };

    match kind {
        SeparatingAxis::FaceA(i) => face_contact(&box_a, i, &box_b, normal, margin, false, out),
        SeparatingAxis::FaceB(j) => face_contact(&box_b, j, &box_a, -normal, margin, true, out),
        SeparatingAxis::Edge(i, j) => {
            let pa = box_a.support_edge(i, normal);
            let pb = box_b.support_edge(j, -normal);
            let (on_a, on_b) = closest_between_segments(
                pa,
                box_a.axes[i],
                box_a.half[i],
                pb,
                box_b.axes[j],
                box_b.half[j],
            );
            push_point(out, on_a, on_b, normal, -separation);
        }
    }
}

/// Clips the incident face against the reference face. `normal` leaves the reference box.
fn face_contact(
    reference: &OrientedBox,
    axis: usize,
    incident: &OrientedBox,
    normal: Vec3,
    margin: f32,
    reference_is_second: bool,
    out: &mut Vec<CandidatePoint>,
) {
    let face_center = reference.center + normal * reference.half[axis];
    let (u, v) = ((axis + 1) % 3, (axis + 2) % 3);
    let planes = face_side_planes(
        face_center,
        reference.axes[u],
        reference.axes[v],
        reference.half[u],
        reference.half[v],
    );

    let incident_axis = (0..3)
        .max_by(|&x, &y| {
            incident.axes[x]
                .dot(normal)
                .abs()
                .total_cmp(&incident.axes[y].dot(normal).abs())
        })
        .unwrap_or(0);
    let facing = if incident.axes[incident_axis].dot(normal) > 0.0 { -1.0 } else { 1.0 };
    let incident_center =
        incident.center + incident.axes[incident_axis] * incident.half[incident_axis] * facing;
    let (iu, iv) = ((incident_axis + 1) % 3, (incident_axis + 2) % 3);
    let du = incident.axes[iu] * incident.half[iu];
    let dv = incident.axes[iv] * incident.half[iv];
    let polygon = [
        incident_center + du + dv,
        incident_center - du + dv,
        incident_center - du - dv,
        incident_center + du - dv,
    ];

    for point in clip_polygon(&polygon, &planes) {
        let separation = (point - face_center).dot(normal);
        if separation > margin {
            continue;
        }
        let on_reference = point - normal * separation;
        if reference_is_second {
            push_point(out, point, on_reference, -normal, -separation);
        } else {
            push_point(out, on_reference, point, normal, -separation);
        }
    }
}

/// Closest points between two centred segments `p + d·s`, `|s| <= half`.
fn closest_between_segments(
    pa: Vec3,
    da: Vec3,
    half_a: f32,
    pb: Vec3,
    db: Vec3,
    half_b: f32,
) -> (Vec3, Vec3) {
    let r = pa - pb;
    let b = da.dot(db);
    let c = da.dot(r);
    let f = db.dot(r);
    let denom = 1.0 - b * b;
    let mut s = if denom > 1e-6 { ((b * f - c) / denom).clamp(-half_a, half_a) } else { 0.0 };
    let t = (b * s + f).clamp(-half_b, half_b);
    s = (b * t - c).clamp(-half_a, half_a);
    (pa + da * s, pb + db * t)
}

fn plane_convex(a: &CollisionInput, b: &CollisionInput, margin: f32, out: &mut Vec<CandidatePoint>) {
    let ShapeGeometry::Plane { normal } = a.geometry else {
        return;
    };
    let normal = a.transform.transform_vector(*normal);
    let origin = a.transform.position;

    let mut report = |point: Vec3| {
        let separation = (point - origin).dot(normal);
        if separation <= margin {
            push_point(out, point - normal * separation, point, normal, -separation);
        }
    };

    let t = b.transform;
    match b.geometry {
        ShapeGeometry::Sphere { radius } => report(t.position - normal * *radius),
        ShapeGeometry::Box { half_extents } => {
            for corner in box_corners(*half_extents) {
                report(t.transform_point(corner));
            }
        }
        ShapeGeometry::Cylinder {
            radius,
            half_height,
        } => {
            let axis = t.transform_vector(Vec3::Y);
            let radial = -(normal - axis * normal.dot(axis));
            let rim: Vec<Vec3> = if radial.length() > 0.1 {
                vec![radial.normalize() * *radius]
            } else {
                // Nearly flat on the plane: sample the cap outline.
                let (u, v) = axis.any_orthonormal_pair();
                vec![u * *radius, -u * *radius, v * *radius, -v * *radius]
            };
            for cap in [1.0, -1.0] {
                let cap_center = t.position + axis * (*half_height * cap);
                for offset in &rim {
                    report(cap_center + *offset);
                }
            }
        }
        ShapeGeometry::Tetra { vertices } => {
            for vertex in vertices {
                report(t.transform_point(*vertex));
            }
        }
        ShapeGeometry::Polygon { vertices, .. } => {
            for vertex in vertices {
                report(t.transform_point(*vertex));
            }
        }
        ShapeGeometry::Particle => report(t.position),
        ShapeGeometry::Plane { .. } => {}
    }
}

fn box_corners(half: Vec3) -> [Vec3; 8] {
    let mut corners = [Vec3::ZERO; 8];
    for (i, corner) in corners.iter_mut().enumerate() {
        *corner = Vec3::new(
            if i & 1 == 0 { -half.x } else { half.x },
            if i & 2 == 0 { -half.y } else { half.y },
            if i & 4 == 0 { -half.z } else { half.z },
        );
    }
    corners
}

fn convex_convex(a: &CollisionInput, b: &CollisionInput, _margin: f32, out: &mut Vec<CandidatePoint>) {
    if let Some(hit) = GjkAlgorithm::intersect(a, b) {
        push_point(out, hit.point_a, hit.point_b, hit.normal, hit.depth);
    }
}
