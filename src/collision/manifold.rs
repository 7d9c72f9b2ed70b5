use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::types::Transform;

/// Upper bound on persistent points per shape pair.
pub const MAX_MANIFOLD_POINTS: usize = 4;

/// Raw detector output. `normal` points from shape 1 towards shape 2 and
/// `position` is the midpoint between the two surface points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CandidatePoint {
    pub position: Vec3,
    pub normal: Vec3,
    pub depth: f32,
}

impl CandidatePoint {
    /// Surface point on shape 1 (deepest into shape 2).
    pub fn point1(&self) -> Vec3 {
        self.position + self.normal * (self.depth * 0.5)
    }

    /// Surface point on shape 2 (deepest into shape 1).
    pub fn point2(&self) -> Vec3 {
        self.position - self.normal * (self.depth * 0.5)
    }
}

/// Whether a detector regenerates the whole patch each step or adds one point at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifoldMode {
    Full,
    Incremental,
}

/// One persistent contact point with its accumulated solver impulses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ManifoldPoint {
    /// Point on shape 1 in body 1's frame.
    pub local_point1: Vec3,
    /// Point on shape 2 in body 2's frame.
    pub local_point2: Vec3,
    /// World midpoint between both surface points.
    pub position: Vec3,
    pub normal: Vec3,
    /// Signed distance along the normal; negative when penetrating.
    pub separation: f32,
    pub normal_impulse: f32,
    pub tangent_impulse: f32,
    pub binormal_impulse: f32,
    /// Impulses were inherited from the previous step.
    pub warm_started: bool,
}

impl ManifoldPoint {
    fn from_candidate(candidate: &CandidatePoint, body1: &Transform, body2: &Transform) -> Self {
        Self {
            local_point1: body1.inverse_transform_point(candidate.point1()),
            local_point2: body2.inverse_transform_point(candidate.point2()),
            position: candidate.position,
            normal: candidate.normal,
            separation: -candidate.depth,
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
            binormal_impulse: 0.0,
            warm_started: false,
        }
    }

    pub fn penetration(&self) -> f32 {
        -self.separation
    }
}

/// Up to four persistent contact points between two shapes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactManifold {
    points: Vec<ManifoldPoint>,
}

impl ContactManifold {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[ManifoldPoint] {
        &self.points
    }

    pub(crate) fn points_mut(&mut self) -> &mut [ManifoldPoint] {
        &mut self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Smallest separation across all points, `f32::MAX` when empty.
    pub fn min_separation(&self) -> f32 {
        self.points
            .iter()
            .map(|p| p.separation)
            .fold(f32::MAX, f32::min)
    }

    /// Re-evaluates persisted points against the current body poses and drops
    /// points that separated or slid apart beyond `breaking_distance`.
    pub fn refresh(&mut self, body1: &Transform, body2: &Transform, breaking_distance: f32) {
        self.points.retain_mut(|point| {
            let p1 = body1.transform_point(point.local_point1);
            let p2 = body2.transform_point(point.local_point2);
            let delta = p2 - p1;
            let separation = delta.dot(point.normal);
            let drift = delta - point.normal * separation;
            point.separation = separation;
            point.position = (p1 + p2) * 0.5;
            separation <= breaking_distance && drift.length_squared() <= breaking_distance * breaking_distance
        });
    }

    /// Merges fresh detector output with the persisted points, matching by locality
    /// on body 1 so accumulated impulses carry over.
    pub fn merge(
        &mut self,
        candidates: &[CandidatePoint],
        mode: ManifoldMode,
        body1: &Transform,
        body2: &Transform,
        matching_radius: f32,
    ) {
        let old = std::mem::take(&mut self.points);
        let mut used = vec![false; old.len()];
        let mut merged = Vec::with_capacity(candidates.len() + old.len());
        let radius_sq = matching_radius * matching_radius;

        for candidate in candidates {
            let mut point = ManifoldPoint::from_candidate(candidate, body1, body2);
            let nearest = old
                .iter()
                .enumerate()
                .filter(|(i, _)| !used[*i])
                .map(|(i, o)| (i, o.local_point1.distance_squared(point.local_point1)))
                .filter(|(_, d)| *d <= radius_sq)
                .min_by(|a, b| a.1.total_cmp(&b.1));
            if let Some((index, _)) = nearest {
                used[index] = true;
                let previous = &old[index];
                point.normal_impulse = previous.normal_impulse;
                point.tangent_impulse = previous.tangent_impulse;
                point.binormal_impulse = previous.binormal_impulse;
                point.warm_started = true;
            }
            merged.push(point);
        }

        if mode == ManifoldMode::Incremental {
            merged.extend(
                old.into_iter()
                    .zip(used)
                    .filter(|(_, matched)| !matched)
                    .map(|(mut point, _)| {
                        point.warm_started = true;
                        point
                    }),
            );
        }

        reduce_points(&mut merged);
        self.points = merged;
    }
}

/// Keeps the deepest point, then greedily the points spanning the largest area.
fn reduce_points(points: &mut Vec<ManifoldPoint>) {
    if points.len() <= MAX_MANIFOLD_POINTS {
        return;
    }

    let deepest = index_of_max(points, |p| -p.separation);
    let a = points[deepest].position;
    let far = index_of_max(points, |p| p.position.distance_squared(a));
    let b = points[far].position;
    let third = index_of_max(points, |p| (b - a).cross(p.position - a).length_squared());
    let c = points[third].position;
    let fourth = index_of_max(points, |p| {
        let d = p.position;
        let abd = (b - a).cross(d - a).length_squared();
        let bcd = (c - b).cross(d - b).length_squared();
        let cad = (a - c).cross(d - c).length_squared();
        // Points inside the triangle add nothing.
        let abc = (b - a).cross(c - a).length_squared();
        if abd.sqrt() + bcd.sqrt() + cad.sqrt() <= abc.sqrt() + 1e-6 {
            0.0
        } else {
            abd.max(bcd).max(cad)
        }
    });

    let mut keep = vec![deepest];
    for index in [far, third, fourth] {
        if !keep.contains(&index) {
            keep.push(index);
        }
    }
    let reduced = keep.iter().map(|&i| points[i]).collect();
    *points = reduced;
}

fn index_of_max(points: &[ManifoldPoint], score: impl Fn(&ManifoldPoint) -> f32) -> usize {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| (i, score(p)))
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
