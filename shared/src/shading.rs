use crate::math::{normalize, reflect, Vec3};
use crate::scene::{HitRecord, Light, Scene};

/// Phong lighting for a single light.
///
/// The ambient term is always present; a shadowed point gets nothing else.
/// `view_dir` points from the hit back towards the ray origin.
pub fn phong(scene: &Scene, hit: &HitRecord, light: &Light, view_dir: Vec3) -> Vec3 {
    let material = &hit.material;
    let ambient = material.color * material.ambient;

    if scene.is_in_shadow(hit.point, light.position) {
        return ambient;
    }

    let light_dir = normalize(light.position - hit.point);
    let radiance = light.color * light.intensity;

    let diff = hit.normal.dot(light_dir).max(0.0);
    let diffuse = material.color * radiance * (material.diffuse * diff);

    let reflect_dir = reflect(-light_dir, hit.normal);
    let spec = view_dir.dot(reflect_dir).max(0.0).powf(material.shininess);
    let specular = radiance * (material.specular * spec);

    ambient + diffuse + specular
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geometry::{Material, Sphere};
    use crate::ray::Ray;

    fn lit_hit(scene: &Scene) -> HitRecord {
        let ray = Ray::new(Vec3::new(0.0, 0.0, 3.0), Vec3::NEG_Z);
        scene.intersect_scene(&ray)
    }

    #[test]
    fn test_head_on_light() {
        // Light, viewer and normal all aligned: diffuse and specular at full strength
        let material = Material::new(Vec3::new(1.0, 0.5, 0.25), 0.1, 0.7, 0.3, 32.0);
        let mut scene = Scene::default();
        scene.add_object(Sphere::new(Vec3::ZERO, 0.5, material));
        let light = Light::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ONE, 1.0);

        let hit = lit_hit(&scene);
        let color = phong(&scene, &hit, &light, Vec3::Z);
        let expected = material.color * 0.1 + material.color * 0.7 + Vec3::splat(0.3);
        assert!(color.abs_diff_eq(expected, 1e-5), "{:?} != {:?}", color, expected);
    }

    #[test]
    fn test_shadowed_is_ambient_only() {
        let material = Material::default();
        let mut scene = Scene::default();
        scene.add_object(Sphere::new(Vec3::ZERO, 0.5, material));
        // Blocker between the hit point and the light
        scene.add_object(Sphere::new(Vec3::new(0.0, 0.0, 5.0), 0.5, material));
        let light = Light::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ONE, 1.0);

        let ray = Ray::new(Vec3::new(0.0, 0.0, 2.0), Vec3::NEG_Z);
        let hit = scene.intersect_scene(&ray);
        let color = phong(&scene, &hit, &light, Vec3::Z);
        assert_eq!(color, material.color * material.ambient);
    }

    #[test]
    fn test_light_behind_surface() {
        let material = Material::default();
        let mut scene = Scene::default();
        scene.add_object(Sphere::new(Vec3::ZERO, 0.5, material));
        // Light on the far side: the sphere occludes itself
        let light = Light::new(Vec3::new(0.0, 0.0, -10.0), Vec3::ONE, 1.0);

        let hit = lit_hit(&scene);
        let color = phong(&scene, &hit, &light, Vec3::Z);
        assert!(color.abs_diff_eq(material.color * material.ambient, 1e-6));
    }

    #[test]
    fn test_intensity_scales_direct_terms() {
        let material = Material::new(Vec3::ONE, 0.0, 1.0, 0.0, 8.0);
        let mut scene = Scene::default();
        scene.add_object(Sphere::new(Vec3::ZERO, 0.5, material));

        let hit = lit_hit(&scene);
        let dim = phong(&scene, &hit, &Light::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ONE, 0.5), Vec3::Z);
        let bright = phong(&scene, &hit, &Light::new(Vec3::new(0.0, 0.0, 10.0), Vec3::ONE, 1.0), Vec3::Z);
        assert!((bright - dim * 2.0).abs().max_element() < 1e-6);
    }
}
