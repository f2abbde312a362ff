use crate::geometry::{Geometry, Hittable, Material, Sphere};
use crate::math::{normalize, Vec3};
use crate::ray::Ray;
use crate::RaytracerConfig;

/// Point light, no distance attenuation
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Light {
    pub fn new(position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            position,
            color,
            intensity,
        }
    }
}

impl Default for Light {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ONE, 1.0)
    }
}

/// Result of a scene intersection query
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HitRecord {
    pub t: f32,
    pub point: Vec3,
    pub normal: Vec3,
    pub material: Material,
    pub hit: bool,
}

impl HitRecord {
    /// Miss result; `t` is left at the far bound of the query
    pub fn miss(t_max: f32) -> Self {
        Self {
            t: t_max,
            point: Vec3::ZERO,
            normal: Vec3::ZERO,
            material: Material::default(),
            hit: false,
        }
    }
}

/// Geometry, lights and background; read-only while rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub objects: Vec<Geometry>,
    pub lights: Vec<Light>,
    pub background_color: Vec3,
}

impl Scene {
    pub fn new(background_color: Vec3) -> Self {
        Self {
            objects: Vec::new(),
            lights: Vec::new(),
            background_color,
        }
    }

    pub fn add_object(&mut self, object: impl Into<Geometry>) {
        self.objects.push(object.into());
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Light used for shading. Only the first light contributes.
    pub fn primary_light(&self) -> Option<&Light> {
        self.lights.first()
    }

    /// Spheres in insertion order
    pub fn spheres(&self) -> impl Iterator<Item = &Sphere> + '_ {
        self.objects.iter().map(|object| match object {
            Geometry::Sphere(sphere) => sphere,
        })
    }

    /// Nearest hit with `t` in `(t_min, t_max)`; on equal `t` the object
    /// inserted first wins.
    pub fn intersect(&self, ray: &Ray, t_min: f32, t_max: f32) -> HitRecord {
        let mut closest = t_max;
        let mut nearest: Option<&Geometry> = None;

        for object in &self.objects {
            if let Some(t) = object.intersect(ray) {
                if t > t_min && t < closest {
                    closest = t;
                    nearest = Some(object);
                }
            }
        }

        match nearest {
            Some(object) => {
                let point = ray.at(closest);
                HitRecord {
                    t: closest,
                    point,
                    normal: object.normal_at(point),
                    material: *object.material(),
                    hit: true,
                }
            }
            None => HitRecord::miss(t_max),
        }
    }

    /// `intersect` with the default bounds
    pub fn intersect_scene(&self, ray: &Ray) -> HitRecord {
        self.intersect(ray, RaytracerConfig::T_MIN, RaytracerConfig::T_MAX)
    }

    /// Whether something lies strictly between `point` and `light_pos`
    pub fn is_in_shadow(&self, point: Vec3, light_pos: Vec3) -> bool {
        let to_light = light_pos - point;
        let light_distance = to_light.length();
        let light_dir = normalize(to_light);

        let shadow_ray = Ray::new(point + light_dir * RaytracerConfig::EPSILON, light_dir);
        let hit = self.intersect_scene(&shadow_ray);
        hit.hit && hit.t < light_distance
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new(Vec3::new(0.5, 0.7, 1.0))
    }
}

/// Builder for scenes
pub struct SceneBuilder {
    scene: Scene,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self {
            scene: Scene::default(),
        }
    }

    pub fn add_sphere(mut self, center: Vec3, radius: f32, material: Material) -> Self {
        self.scene.add_object(Sphere::new(center, radius, material));
        self
    }

    pub fn add_light(mut self, position: Vec3, color: Vec3, intensity: f32) -> Self {
        self.scene.add_light(Light::new(position, color, intensity));
        self
    }

    /// Ground plane sphere, four coloured spheres and a single white light
    pub fn build_default_scene() -> Scene {
        Self::new()
            // Ground
            .add_sphere(
                Vec3::new(0.0, -100.5, 0.0),
                100.0,
                Material::new(Vec3::new(0.5, 0.5, 0.5), 0.1, 0.7, 0.2, 16.0),
            )
            // Red center
            .add_sphere(
                Vec3::new(0.0, 0.0, 0.0),
                0.5,
                Material::new(Vec3::new(1.0, 0.2, 0.2), 0.1, 0.7, 0.5, 32.0),
            )
            // Green left
            .add_sphere(
                Vec3::new(-1.2, 0.0, 0.0),
                0.5,
                Material::new(Vec3::new(0.2, 1.0, 0.2), 0.1, 0.6, 0.4, 16.0),
            )
            // Blue right
            .add_sphere(
                Vec3::new(1.2, 0.0, 0.0),
                0.5,
                Material::new(Vec3::new(0.2, 0.2, 1.0), 0.1, 0.8, 0.6, 64.0),
            )
            // Small yellow on top
            .add_sphere(
                Vec3::new(0.0, 0.8, 0.0),
                0.3,
                Material::new(Vec3::new(1.0, 1.0, 0.2), 0.1, 0.7, 0.7, 128.0),
            )
            .add_light(Vec3::new(3.0, 4.0, 2.0), Vec3::ONE, 1.0)
            .build()
    }

    pub fn build(self) -> Scene {
        self.scene
    }
}

impl Default for SceneBuilder {
    fn default() -> Self {
        Self::new()
    }
}
