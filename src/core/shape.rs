use glam::{Mat3, Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::types::{InertiaTensorExt, MassInfo, Transform};
use crate::collision::aabb::Aabb;
use crate::config::AABB_INFINITY;
use crate::error::{PhysicsError, Result};
use crate::utils::allocator::{BodyHandle, ContactHandle, ProxyHandle};
use crate::utils::math::outer;

/// Type tag used to index the narrow-phase dispatch table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeType {
    Sphere,
    Box,
    Cylinder,
    Tetra,
    Polygon,
    Particle,
    Plane,
}

impl ShapeType {
    pub const COUNT: usize = 7;

    pub const ALL: [ShapeType; Self::COUNT] = [
        ShapeType::Sphere,
        ShapeType::Box,
        ShapeType::Cylinder,
        ShapeType::Tetra,
        ShapeType::Polygon,
        ShapeType::Particle,
        ShapeType::Plane,
    ];

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Local geometry of a shape. Cylinders are aligned with the local Y axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeGeometry {
    Sphere { radius: f32 },
    Box { half_extents: Vec3 },
    Cylinder { radius: f32, half_height: f32 },
    Tetra { vertices: [Vec3; 4] },
    /// Closed convex polyhedron. Faces wind counter-clockwise seen from outside.
    Polygon { vertices: Vec<Vec3>, faces: Vec<[u32; 3]> },
    /// A point; the shape's density is its mass.
    Particle,
    /// Infinite half-space through the shape origin, solid below `normal`.
    Plane { normal: Vec3 },
}

impl ShapeGeometry {
    pub fn sphere(radius: f32) -> Self {
        Self::Sphere { radius }
    }

    pub fn cuboid(half_extents: Vec3) -> Self {
        Self::Box { half_extents }
    }

    pub fn cylinder(radius: f32, half_height: f32) -> Self {
        Self::Cylinder {
            radius,
            half_height,
        }
    }

    pub fn tetra(a: Vec3, b: Vec3, c: Vec3, d: Vec3) -> Self {
        Self::Tetra {
            vertices: [a, b, c, d],
        }
    }

    pub fn polygon(vertices: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Self {
        Self::Polygon { vertices, faces }
    }

    pub fn plane(normal: Vec3) -> Self {
        Self::Plane { normal }
    }

    pub fn shape_type(&self) -> ShapeType {
        match self {
            ShapeGeometry::Sphere { .. } => ShapeType::Sphere,
            ShapeGeometry::Box { .. } => ShapeType::Box,
            ShapeGeometry::Cylinder { .. } => ShapeType::Cylinder,
            ShapeGeometry::Tetra { .. } => ShapeType::Tetra,
            ShapeGeometry::Polygon { .. } => ShapeType::Polygon,
            ShapeGeometry::Particle => ShapeType::Particle,
            ShapeGeometry::Plane { .. } => ShapeType::Plane,
        }
    }

    /// Closed-form volume. Particles have none, planes are unbounded.
    pub fn volume(&self) -> f32 {
        match self {
            ShapeGeometry::Sphere { radius } => {
                4.0 / 3.0 * std::f32::consts::PI * radius * radius * radius
            }
            ShapeGeometry::Box { half_extents } => {
                8.0 * half_extents.x * half_extents.y * half_extents.z
            }
            ShapeGeometry::Cylinder {
                radius,
                half_height,
            } => std::f32::consts::PI * radius * radius * half_height * 2.0,
            ShapeGeometry::Tetra { vertices } => tetra_integral(vertices).volume,
            ShapeGeometry::Polygon { vertices, faces } => polyhedron_integral(vertices, faces).volume,
            ShapeGeometry::Particle => 0.0,
            ShapeGeometry::Plane { .. } => f32::INFINITY,
        }
    }

    /// Mass, centroid and inertia about the centroid, in the shape's local frame.
    pub fn mass_info(&self, density: f32) -> MassInfo {
        match self {
            ShapeGeometry::Sphere { radius } => {
                let mass = density * self.volume();
                MassInfo {
                    mass,
                    center: Vec3::ZERO,
                    inertia: Mat3::for_solid_sphere(*radius, mass),
                }
            }
            ShapeGeometry::Box { half_extents } => {
                let mass = density * self.volume();
                MassInfo {
                    mass,
                    center: Vec3::ZERO,
                    inertia: Mat3::for_solid_box(*half_extents, mass),
                }
            }
            ShapeGeometry::Cylinder {
                radius,
                half_height,
            } => {
                let mass = density * self.volume();
                MassInfo {
                    mass,
                    center: Vec3::ZERO,
                    inertia: Mat3::for_solid_cylinder(*radius, *half_height, mass),
                }
            }
            ShapeGeometry::Tetra { vertices } => tetra_integral(vertices).mass_info(density),
            ShapeGeometry::Polygon { vertices, faces } => {
                polyhedron_integral(vertices, faces).mass_info(density)
            }
            ShapeGeometry::Particle => MassInfo {
                mass: density,
                ..MassInfo::default()
            },
            ShapeGeometry::Plane { .. } => MassInfo::default(),
        }
    }

    /// Tight world bound without padding.
    pub fn world_aabb(&self, transform: &Transform) -> Aabb {
        let rotation = transform.rotation_matrix();
        let center = transform.position;
        match self {
            ShapeGeometry::Sphere { radius } => {
                Aabb::from_center_half_extents(center, Vec3::splat(*radius))
            }
            ShapeGeometry::Box { half_extents } => {
                Aabb::from_oriented_box(center, rotation, *half_extents)
            }
            ShapeGeometry::Cylinder {
                radius,
                half_height,
            } => Aabb::from_oriented_box(center, rotation, Vec3::new(*radius, *half_height, *radius)),
            ShapeGeometry::Tetra { vertices } => {
                Aabb::from_points(vertices.iter().map(|v| transform.transform_point(*v)))
            }
            ShapeGeometry::Polygon { vertices, .. } => {
                Aabb::from_points(vertices.iter().map(|v| transform.transform_point(*v)))
            }
            ShapeGeometry::Particle => Aabb::new(center, center),
            ShapeGeometry::Plane { normal } => plane_aabb(center, transform.rotation * *normal),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let positive = |value: f32, field: &str| -> Result<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(PhysicsError::config(
                    "shape geometry",
                    format!("{field} must be positive and finite, got {value}"),
                ))
            }
        };
        match self {
            ShapeGeometry::Sphere { radius } => positive(*radius, "sphere radius"),
            ShapeGeometry::Box { half_extents } => {
                positive(half_extents.x, "box half extent x")?;
                positive(half_extents.y, "box half extent y")?;
                positive(half_extents.z, "box half extent z")
            }
            ShapeGeometry::Cylinder {
                radius,
                half_height,
            } => {
                positive(*radius, "cylinder radius")?;
                positive(*half_height, "cylinder half height")
            }
            ShapeGeometry::Tetra { vertices } => {
                if !vertices.iter().all(|v| v.is_finite()) {
                    return Err(PhysicsError::config("tetra", "vertices must be finite"));
                }
                positive(tetra_integral(vertices).volume, "tetra volume")
            }
            ShapeGeometry::Polygon { vertices, faces } => validate_polyhedron(vertices, faces),
            ShapeGeometry::Particle => Ok(()),
            ShapeGeometry::Plane { normal } => {
                if normal.is_finite() && normal.length_squared() > 1e-12 {
                    Ok(())
                } else {
                    Err(PhysicsError::config("plane", "normal must be non-zero"))
                }
            }
        }
    }

    fn normalized(self) -> Self {
        match self {
            ShapeGeometry::Plane { normal } => ShapeGeometry::Plane {
                normal: normal.normalize(),
            },
            other => other,
        }
    }
}

/// Group bitmasks deciding which shapes may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionFilter {
    pub belongs_to: u32,
    pub collides_with: u32,
}

impl Default for CollisionFilter {
    fn default() -> Self {
        Self {
            belongs_to: 1,
            collides_with: u32::MAX,
        }
    }
}

impl CollisionFilter {
    pub fn accepts(&self, other: &CollisionFilter) -> bool {
        (self.belongs_to & other.collides_with) != 0 && (other.belongs_to & self.collides_with) != 0
    }

    /// A shape must belong to at least one group.
    fn validate(&self) -> Result<()> {
        if self.belongs_to == 0 {
            return Err(PhysicsError::config(
                "collision filter",
                "belongs_to must name at least one group",
            ));
        }
        Ok(())
    }
}

/// Per-shape configuration with documented defaults.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapeConfig {
    /// Offset from the owning body's origin. Default: zero.
    pub relative_position: Vec3,
    /// Rotation relative to the owning body. Default: identity.
    pub relative_rotation: Quat,
    /// Default: 1.
    pub density: f32,
    /// Default: 0.2.
    pub friction: f32,
    /// Default: 0.2.
    pub restitution: f32,
    /// Default: belongs to group 1, collides with everything.
    pub filter: CollisionFilter,
}

impl Default for ShapeConfig {
    fn default() -> Self {
        Self {
            relative_position: Vec3::ZERO,
            relative_rotation: Quat::IDENTITY,
            density: 1.0,
            friction: 0.2,
            restitution: 0.2,
            filter: CollisionFilter::default(),
        }
    }
}

impl ShapeConfig {
    pub fn with_relative_position(mut self, position: Vec3) -> Self {
        self.relative_position = position;
        self
    }

    pub fn with_relative_rotation(mut self, rotation: Quat) -> Self {
        self.relative_rotation = rotation;
        self
    }

    pub fn with_density(mut self, density: f32) -> Self {
        self.density = density;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_filter(mut self, belongs_to: u32, collides_with: u32) -> Self {
        self.filter = CollisionFilter {
            belongs_to,
            collides_with,
        };
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.density.is_finite() && self.density > 0.0) {
            return Err(PhysicsError::config(
                "shape config",
                format!("density must be positive, got {}", self.density),
            ));
        }
        validate_friction(self.friction)?;
        validate_restitution(self.restitution)?;
        self.filter.validate()?;
        if !self.relative_position.is_finite() || !self.relative_rotation.is_finite() {
            return Err(PhysicsError::config(
                "shape config",
                "relative transform must be finite",
            ));
        }
        if self.relative_rotation.length_squared() < 1e-12 {
            return Err(PhysicsError::config(
                "shape config",
                "relative rotation must be a non-zero quaternion",
            ));
        }
        Ok(())
    }
}

fn validate_friction(friction: f32) -> Result<()> {
    if friction.is_finite() && friction >= 0.0 {
        Ok(())
    } else {
        Err(PhysicsError::config(
            "shape config",
            format!("friction must be non-negative, got {friction}"),
        ))
    }
}

fn validate_restitution(restitution: f32) -> Result<()> {
    if restitution.is_finite() && restitution >= 0.0 {
        Ok(())
    } else {
        Err(PhysicsError::config(
            "shape config",
            format!("restitution must be non-negative, got {restitution}"),
        ))
    }
}

/// A validated shape waiting to be attached to a body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDesc {
    geometry: ShapeGeometry,
    config: ShapeConfig,
}

impl ShapeDesc {
    pub fn new(geometry: ShapeGeometry, config: ShapeConfig) -> Result<Self> {
        geometry.validate()?;
        config.validate()?;
        let mut config = config;
        config.relative_rotation = config.relative_rotation.normalize();
        Ok(Self {
            geometry: geometry.normalized(),
            config,
        })
    }

    pub fn geometry(&self) -> &ShapeGeometry {
        &self.geometry
    }

    pub fn config(&self) -> &ShapeConfig {
        &self.config
    }

    pub(crate) fn into_parts(self) -> (ShapeGeometry, ShapeConfig) {
        (self.geometry, self.config)
    }
}

/// A shape registered in a world, owned by exactly one body.
#[derive(Debug, Clone)]
pub struct Shape {
    pub(crate) body: BodyHandle,
    pub(crate) geometry: ShapeGeometry,
    pub(crate) config: ShapeConfig,
    pub(crate) transform: Transform,
    pub(crate) aabb: Aabb,
    pub(crate) proxy: Option<ProxyHandle>,
    pub(crate) contacts: Vec<ContactHandle>,
}

impl Shape {
    pub(crate) fn new(body: BodyHandle, geometry: ShapeGeometry, config: ShapeConfig) -> Self {
        Self {
            body,
            geometry,
            config,
            transform: Transform::default(),
            aabb: Aabb::default(),
            proxy: None,
            contacts: Vec::new(),
        }
    }

    pub fn body(&self) -> BodyHandle {
        self.body
    }

    pub fn shape_type(&self) -> ShapeType {
        self.geometry.shape_type()
    }

    pub fn geometry(&self) -> &ShapeGeometry {
        &self.geometry
    }

    pub fn config(&self) -> &ShapeConfig {
        &self.config
    }

    /// World transform as of the last proxy update.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Padded (and swept) world bound as of the last proxy update.
    pub fn aabb(&self) -> &Aabb {
        &self.aabb
    }

    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    pub fn volume(&self) -> f32 {
        self.geometry.volume()
    }

    pub fn mass_info(&self) -> MassInfo {
        self.geometry.mass_info(self.config.density)
    }

    /// Pose relative to the owning body.
    pub fn local_transform(&self) -> Transform {
        Transform::new(self.config.relative_position, self.config.relative_rotation)
    }

    pub fn set_friction(&mut self, friction: f32) -> Result<()> {
        validate_friction(friction)?;
        self.config.friction = friction;
        Ok(())
    }

    pub fn set_restitution(&mut self, restitution: f32) -> Result<()> {
        validate_restitution(restitution)?;
        self.config.restitution = restitution;
        Ok(())
    }

    pub fn set_collision_filter(&mut self, belongs_to: u32, collides_with: u32) -> Result<()> {
        let filter = CollisionFilter {
            belongs_to,
            collides_with,
        };
        filter.validate()?;
        self.config.filter = filter;
        Ok(())
    }

    /// Recomputes the world transform from the owning body's pose and refreshes the padded bound.
    pub(crate) fn update_proxy(&mut self, body_transform: &Transform, margin: f32, displacement: Vec3) {
        self.transform = body_transform.combine(&self.local_transform());
        self.aabb = self
            .geometry
            .world_aabb(&self.transform)
            .expanded(margin)
            .swept(displacement)
            .clamped(AABB_INFINITY);
    }
}

fn plane_aabb(point: Vec3, normal: Vec3) -> Aabb {
    let mut min = Vec3::splat(-AABB_INFINITY);
    let mut max = Vec3::splat(AABB_INFINITY);
    // Only an axis-aligned plane yields a bounded side.
    for axis in 0..3 {
        let n = normal[axis];
        if (n.abs() - 1.0).abs() < 1e-6 {
            if n > 0.0 {
                max[axis] = point[axis];
            } else {
                min[axis] = point[axis];
            }
        }
    }
    Aabb::new(min, max)
}

/// Volume, first and second moments of a solid, accumulated from signed tetrahedra.
#[derive(Debug, Clone, Copy, Default)]
struct SolidIntegral {
    volume: f32,
    reference: Vec3,
    /// Volume-weighted centroid offset from `reference`.
    moment: Vec3,
    /// Covariance about `reference` (unit density).
    covariance: Mat3,
}

impl SolidIntegral {
    fn new(reference: Vec3) -> Self {
        Self {
            reference,
            ..Self::default()
        }
    }

    fn add_tetra(&mut self, a: Vec3, b: Vec3, c: Vec3) {
        let (a, b, c) = (a - self.reference, b - self.reference, c - self.reference);
        let basis = Mat3::from_cols(a, b, c);
        let det = basis.determinant();
        let canonical = Mat3::from_cols(
            Vec3::new(2.0, 1.0, 1.0),
            Vec3::new(1.0, 2.0, 1.0),
            Vec3::new(1.0, 1.0, 2.0),
        ) * (1.0 / 120.0);
        let volume = det / 6.0;
        self.volume += volume;
        self.moment += (a + b + c) * 0.25 * volume;
        self.covariance += basis * canonical * basis.transpose() * det;
    }

    fn mass_info(&self, density: f32) -> MassInfo {
        if self.volume <= 0.0 {
            return MassInfo::default();
        }
        let offset = self.moment / self.volume;
        let about_center = self.covariance - outer(offset, offset) * self.volume;
        let trace = about_center.x_axis.x + about_center.y_axis.y + about_center.z_axis.z;
        let inertia = (Mat3::from_diagonal(Vec3::splat(trace)) - about_center) * density;
        MassInfo {
            mass: self.volume * density,
            center: self.reference + offset,
            inertia,
        }
    }
}

fn tetra_integral(vertices: &[Vec3; 4]) -> SolidIntegral {
    let mut integral = SolidIntegral::new(vertices[0]);
    let (b, c, d) = (vertices[1], vertices[2], vertices[3]);
    // Either winding is accepted for tetrahedra.
    if (b - vertices[0]).cross(c - vertices[0]).dot(d - vertices[0]) >= 0.0 {
        integral.add_tetra(b, c, d);
    } else {
        integral.add_tetra(c, b, d);
    }
    integral
}

fn polyhedron_integral(vertices: &[Vec3], faces: &[[u32; 3]]) -> SolidIntegral {
    let centroid = vertices.iter().copied().sum::<Vec3>() / vertices.len().max(1) as f32;
    let mut integral = SolidIntegral::new(centroid);
    for face in faces {
        let fetch = |i: u32| vertices.get(i as usize).copied();
        if let (Some(a), Some(b), Some(c)) = (fetch(face[0]), fetch(face[1]), fetch(face[2])) {
            integral.add_tetra(a, b, c);
        }
    }
    integral
}

fn validate_polyhedron(vertices: &[Vec3], faces: &[[u32; 3]]) -> Result<()> {
    if vertices.len() < 4 || faces.len() < 4 {
        return Err(PhysicsError::config(
            "polygon",
            format!(
                "needs at least 4 vertices and 4 faces, got {} and {}",
                vertices.len(),
                faces.len()
            ),
        ));
    }
    if !vertices.iter().all(|v| v.is_finite()) {
        return Err(PhysicsError::config("polygon", "vertices must be finite"));
    }
    if let Some(face) = faces
        .iter()
        .find(|face| face.iter().any(|&i| i as usize >= vertices.len()))
    {
        return Err(PhysicsError::config(
            "polygon",
            format!("face {face:?} references a missing vertex"),
        ));
    }
    let volume = polyhedron_integral(vertices, faces).volume;
    if !(volume.is_finite() && volume > 1e-9) {
        return Err(PhysicsError::config(
            "polygon",
            format!("faces must enclose a positive volume with outward winding, got {volume}"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn unit_cube_polygon() -> ShapeGeometry {
        let vertices = vec![
            Vec3::new(-1.0, -1.0, -1.0),
            Vec3::new(1.0, -1.0, -1.0),
            Vec3::new(1.0, 1.0, -1.0),
            Vec3::new(-1.0, 1.0, -1.0),
            Vec3::new(-1.0, -1.0, 1.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
            Vec3::new(-1.0, 1.0, 1.0),
        ];
        let faces = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 7, 6],
            [3, 6, 2],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];
        ShapeGeometry::polygon(vertices, faces)
    }

    #[test]
    fn polygon_cube_matches_box_mass() {
        let polygon = unit_cube_polygon();
        assert!(polygon.validate().is_ok());
        let cube = ShapeGeometry::cuboid(Vec3::ONE);
        let poly_info = polygon.mass_info(2.0);
        let box_info = cube.mass_info(2.0);
        assert_abs_diff_eq!(poly_info.mass, box_info.mass, epsilon = 1e-3);
        assert_abs_diff_eq!(poly_info.center.length(), 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(poly_info.inertia.x_axis.x, box_info.inertia.x_axis.x, epsilon = 1e-3);
        assert_abs_diff_eq!(poly_info.inertia.y_axis.x, 0.0, epsilon = 1e-3);
    }

    #[test]
    fn inverted_polygon_is_malformed() {
        if let ShapeGeometry::Polygon { vertices, faces } = unit_cube_polygon() {
            let flipped: Vec<[u32; 3]> = faces.iter().map(|f| [f[0], f[2], f[1]]).collect();
            let err = ShapeGeometry::polygon(vertices, flipped).validate();
            assert!(matches!(err, Err(PhysicsError::Configuration { .. })));
        }
    }

    #[test]
    fn tetra_centroid_is_vertex_average() {
        let tetra = ShapeGeometry::tetra(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(1.0, 0.0, 2.0),
        );
        let info = tetra.mass_info(1.0);
        assert_abs_diff_eq!(tetra.volume(), 8.0 / 6.0, epsilon = 1e-5);
        assert_abs_diff_eq!(info.center.x, 1.5, epsilon = 1e-5);
        assert_abs_diff_eq!(info.center.y, 0.5, epsilon = 1e-5);
        assert_abs_diff_eq!(info.center.z, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn degenerate_geometry_is_rejected() {
        let bad = [
            ShapeGeometry::sphere(0.0),
            ShapeGeometry::sphere(-1.0),
            ShapeGeometry::cuboid(Vec3::new(1.0, 0.0, 1.0)),
            ShapeGeometry::cylinder(1.0, -0.5),
            ShapeGeometry::tetra(Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::new(1.0, 1.0, 0.0)),
            ShapeGeometry::plane(Vec3::ZERO),
        ];
        for geometry in bad {
            assert!(
                ShapeDesc::new(geometry.clone(), ShapeConfig::default()).is_err(),
                "{geometry:?} should be rejected"
            );
        }
        let zero_density = ShapeConfig::default().with_density(0.0);
        assert!(ShapeDesc::new(ShapeGeometry::sphere(1.0), zero_density).is_err());
    }

    #[test]
    fn shape_outside_every_group_is_rejected() {
        let orphan = ShapeConfig::default().with_filter(0, u32::MAX);
        assert!(matches!(
            ShapeDesc::new(ShapeGeometry::sphere(1.0), orphan),
            Err(PhysicsError::Configuration { .. })
        ));
        // Colliding with nothing is a valid way to disable a shape.
        let inert = ShapeConfig::default().with_filter(1, 0);
        assert!(ShapeDesc::new(ShapeGeometry::sphere(1.0), inert).is_ok());
    }

    #[test]
    fn sphere_volume_and_mass() {
        let sphere = ShapeGeometry::sphere(1.0);
        let info = sphere.mass_info(1.0);
        assert_abs_diff_eq!(sphere.volume(), 4.18879, epsilon = 1e-4);
        assert_abs_diff_eq!(info.inertia.x_axis.x, 0.4 * info.mass, epsilon = 1e-4);
    }

    #[test]
    fn horizontal_plane_bound_stops_at_surface() {
        let plane = ShapeGeometry::plane(Vec3::Y);
        let aabb = plane.world_aabb(&Transform::from_position(Vec3::new(0.0, 2.0, 0.0)));
        assert_eq!(aabb.max.y, 2.0);
        assert_eq!(aabb.min.y, -AABB_INFINITY);
        assert_eq!(aabb.max.x, AABB_INFINITY);
    }
}
