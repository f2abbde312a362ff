use crate::math::{normalize, Vec3};
use crate::ray::Ray;
use crate::RaytracerConfig;

/// Raw-float "no hit" value, shared with the WGSL intersection code
pub const NO_HIT: f32 = -1.0;

/// Phong material
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Material {
    pub color: Vec3,
    pub ambient: f32,
    pub diffuse: f32,
    pub specular: f32,
    /// Phong exponent, expected > 0
    pub shininess: f32,
}

impl Material {
    pub fn new(color: Vec3, ambient: f32, diffuse: f32, specular: f32, shininess: f32) -> Self {
        Self {
            color,
            ambient,
            diffuse,
            specular,
            shininess,
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self::new(Vec3::ONE, 0.1, 0.7, 0.3, 32.0)
    }
}

/// Capabilities every traceable shape provides
pub trait Hittable {
    /// Nearest ray parameter beyond [`RaytracerConfig::EPSILON`], if any
    fn intersect(&self, ray: &Ray) -> Option<f32>;
    /// Outward unit normal at a point on the surface
    fn normal_at(&self, point: Vec3) -> Vec3;
    fn material(&self) -> &Material;
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Sphere {
    pub center: Vec3,
    pub radius: f32,
    pub material: Material,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material: Material) -> Self {
        Self {
            center,
            radius,
            material,
        }
    }

    /// Same as [`Hittable::intersect`] but with the [`NO_HIT`] sentinel, the
    /// form the GPU code works with.
    pub fn hit_distance(&self, ray: &Ray) -> f32 {
        self.intersect(ray).unwrap_or(NO_HIT)
    }
}

impl Hittable for Sphere {
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        let oc = ray.origin - self.center;
        let a = ray.direction.dot(ray.direction);
        let b = 2.0 * oc.dot(ray.direction);
        let c = oc.dot(oc) - self.radius * self.radius;
        let discriminant = b * b - 4.0 * a * c;

        if discriminant < 0.0 {
            return None;
        }

        let sqrt_d = discriminant.sqrt();
        let near = (-b - sqrt_d) / (2.0 * a);
        if near > RaytracerConfig::EPSILON {
            return Some(near);
        }
        let far = (-b + sqrt_d) / (2.0 * a);
        if far > RaytracerConfig::EPSILON {
            return Some(far);
        }
        None
    }

    fn normal_at(&self, point: Vec3) -> Vec3 {
        normalize(point - self.center)
    }

    fn material(&self) -> &Material {
        &self.material
    }
}

/// Closed set of shapes a scene can hold.
///
/// Dispatch is a `match` rather than a trait object so the scene stays a flat
/// array that maps directly onto the GPU uniform layout.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Geometry {
    Sphere(Sphere),
}

impl Hittable for Geometry {
    #[inline]
    fn intersect(&self, ray: &Ray) -> Option<f32> {
        match self {
            Geometry::Sphere(sphere) => sphere.intersect(ray),
        }
    }

    #[inline]
    fn normal_at(&self, point: Vec3) -> Vec3 {
        match self {
            Geometry::Sphere(sphere) => sphere.normal_at(point),
        }
    }

    #[inline]
    fn material(&self) -> &Material {
        match self {
            Geometry::Sphere(sphere) => sphere.material(),
        }
    }
}

impl From<Sphere> for Geometry {
    fn from(sphere: Sphere) -> Self {
        Geometry::Sphere(sphere)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn unit_sphere_at_origin() -> Sphere {
        Sphere::new(Vec3::ZERO, 1.0, Material::default())
    }

    #[test]
    fn test_intersect_from_outside() {
        let sphere = unit_sphere_at_origin();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        let t = sphere.intersect(&ray).expect("ray aimed at center must hit");
        // center distance - radius
        assert!((t - 4.0).abs() < 1e-5);
    }

    #[test]
    fn test_intersect_miss() {
        let sphere = unit_sphere_at_origin();
        let ray = Ray::new(Vec3::new(0.0, 2.0, 5.0), Vec3::NEG_Z);
        assert_eq!(sphere.intersect(&ray), None);
        assert_eq!(sphere.hit_distance(&ray), NO_HIT);
    }

    #[test]
    fn test_intersect_from_inside_returns_exit() {
        let sphere = unit_sphere_at_origin();
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        let t = sphere.intersect(&ray).expect("ray from inside must hit");
        assert!((t - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_intersect_behind_origin() {
        let sphere = unit_sphere_at_origin();
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::Z);
        assert_eq!(sphere.intersect(&ray), None);
    }

    #[test]
    fn test_intersect_on_surface_skips_self() {
        let sphere = unit_sphere_at_origin();
        // Starting on the surface and leaving: the t ~ 0 root is rejected
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::Z);
        assert_eq!(sphere.intersect(&ray), None);
        // Starting on the surface and entering: far side at t = 2
        let ray = Ray::new(Vec3::new(0.0, 0.0, 1.0), Vec3::NEG_Z);
        let t = sphere.intersect(&ray).expect("must hit far side");
        assert!((t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_normal_at() {
        let sphere = Sphere::new(Vec3::new(1.0, 0.0, 0.0), 2.0, Material::default());
        let n = sphere.normal_at(Vec3::new(1.0, 2.0, 0.0));
        assert!(n.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn test_geometry_dispatch() {
        let sphere = unit_sphere_at_origin();
        let geometry = Geometry::from(sphere);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert_eq!(geometry.intersect(&ray), sphere.intersect(&ray));
        assert_eq!(geometry.material(), &Material::default());
    }

    #[test]
    fn test_material_default() {
        let m = Material::default();
        assert_eq!(m.color, Vec3::ONE);
        assert_eq!((m.ambient, m.diffuse, m.specular, m.shininess), (0.1, 0.7, 0.3, 32.0));
    }
}
