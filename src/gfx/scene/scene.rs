use cgmath::{Deg, Vector3, Zero};
use wgpu::Device;

use crate::{
    config::{DemoConfig, LabelSettings},
    gfx::{
        camera::{
            camera_controller::CameraController, camera_utils::CameraManager,
            orbit_camera::OrbitCamera,
        },
        geometry::{generate_torus_knot, GeometryData},
        resources::{
            global_bindings::Lighting,
            material::{Material, MaterialManager},
        },
    },
    sampling::KnotSampler,
    wgpu_utils::binding_builder::BindGroupLayoutWithDesc,
};

use super::object::{Mesh, Object};

const LABEL_MATERIAL_ID: &str = "label";

/// Material ID shared by every knot painted with `color`
pub fn knot_material_id(color: u32) -> String {
    format!("neon_{:06x}", color)
}

/// Main scene containing objects, materials, lights and camera
pub struct Scene {
    pub camera_manager: CameraManager,
    pub objects: Vec<Object>,
    pub material_manager: MaterialManager, // Centralized material storage
    pub lighting: Lighting,
    knot_indices: Vec<usize>,
    label_index: Option<usize>,
}

impl Scene {
    /// Creates an empty scene with the given camera manager
    pub fn new(camera_manager: CameraManager) -> Self {
        Self {
            camera_manager,
            objects: Vec::new(),
            material_manager: MaterialManager::new(),
            lighting: Lighting::default(),
            knot_indices: Vec::new(),
            label_index: None,
        }
    }

    /// Builds the camera, lights and the randomized field of torus knots
    ///
    /// Only CPU state is created here; GPU resources follow in
    /// [`init_gpu_resources`](Self::init_gpu_resources) once a device exists.
    pub fn build_knot_field(config: &DemoConfig, sampler: &mut KnotSampler, aspect: f32) -> Self {
        let cam = &config.camera;
        let camera = OrbitCamera::new(cam.distance, 0.0, 0.0, Vector3::zero(), aspect)
            .with_projection(Deg(cam.fov_y_degrees), cam.znear, cam.zfar)
            .with_distance_bounds(cam.min_distance, cam.max_distance);
        let controller =
            CameraController::new(cam.rotate_speed, cam.zoom_speed).with_damping(cam.damping_factor);

        let mut scene = Self::new(CameraManager::new(camera, controller));
        scene.lighting = Lighting::from_settings(&config.lights);

        let style = &config.knot_style;
        for i in 0..config.knot_count {
            let knot = sampler.sample_knot();

            let material_id = knot_material_id(knot.color);
            if !scene.material_manager.contains(&material_id) {
                scene.material_manager.add_material(Material::neon(
                    &material_id,
                    knot.color,
                    style.emissive_intensity,
                    style.metallic,
                    style.roughness,
                ));
            }

            let geometry = generate_torus_knot(
                knot.radius,
                style.tube_radius,
                style.tubular_segments,
                style.radial_segments,
                style.p,
                style.q,
            );
            let object = Object::new(&format!("knot_{}", i), vec![Mesh::from_geometry(&geometry)])
                .with_position(knot.position)
                .with_material(&material_id);

            let index = scene.add_object(object);
            scene.knot_indices.push(index);
        }

        log::info!(
            "Built knot field: {} knots, {} materials",
            scene.knot_count(),
            scene.material_manager.len()
        );
        scene
    }

    /// Adds an object and returns its index
    pub fn add_object(&mut self, object: Object) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    /// Adds the extruded text label; a second call is ignored
    ///
    /// Returns the label's object index.
    pub fn attach_label(&mut self, geometry: &GeometryData, settings: &LabelSettings) -> usize {
        if let Some(index) = self.label_index {
            log::warn!("Label already attached, ignoring");
            return index;
        }

        self.material_manager
            .add_material(Material::unlit(LABEL_MATERIAL_ID, settings.color));

        let object = Object::new("label", vec![Mesh::from_geometry(geometry)])
            .with_position(settings.position)
            .with_material(LABEL_MATERIAL_ID);
        let index = self.add_object(object);
        self.label_index = Some(index);

        log::info!(
            "Attached label {:?} ({} triangles)",
            settings.text,
            geometry.triangle_count()
        );
        index
    }

    /// Rotates every knot about X and Y by `step` radians
    pub fn advance_frame(&mut self, step: f32) {
        for &index in &self.knot_indices {
            self.objects[index].rotate_xy(step);
        }
    }

    /// Applies pending camera input and recomputes camera matrices
    pub fn update(&mut self) {
        self.camera_manager.update();
    }

    /// Tracks a new viewport size in the camera projection
    pub fn resize(&mut self, width: u32, height: u32) {
        self.camera_manager.camera.resize_projection(width, height);
        self.camera_manager.camera.update_view_proj();
    }

    pub fn knot_indices(&self) -> &[usize] {
        &self.knot_indices
    }

    pub fn knot_count(&self) -> usize {
        self.knot_indices.len()
    }

    pub fn label(&self) -> Option<&Object> {
        self.label_index.map(|index| &self.objects[index])
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Creates GPU resources for every object and material that lacks them
    ///
    /// Safe to call again after objects are added; existing resources are kept.
    pub fn init_gpu_resources(
        &mut self,
        device: &Device,
        queue: &wgpu::Queue,
        transform_layout: &BindGroupLayoutWithDesc,
        material_layout: &BindGroupLayoutWithDesc,
    ) {
        for object in self.objects.iter_mut() {
            object.init_gpu_resources(device, queue, transform_layout);
        }

        self.material_manager
            .update_all_gpu_resources(device, queue, material_layout);
    }

    /// Syncs every object transform to the GPU
    pub fn update_all_transforms(&mut self, queue: &wgpu::Queue) {
        for object in &mut self.objects {
            if object.has_gpu_resources() {
                object.update_transform(queue);
            }
        }
    }

    /// Gets the material assigned to the object, or the default material
    pub fn get_material_for_object(&self, object: &Object) -> &Material {
        self.material_manager
            .get_material_for_object(object.get_material_id())
    }

    /// Gets statistics about the scene
    pub fn get_statistics(&self) -> SceneStatistics {
        let total_triangles: u32 = self
            .objects
            .iter()
            .map(|obj| obj.meshes.iter().map(|m| m.index_count() / 3).sum::<u32>())
            .sum();

        let total_vertices: u32 = self
            .objects
            .iter()
            .map(|obj| obj.meshes.iter().map(|m| m.vertex_count()).sum::<u32>())
            .sum();

        SceneStatistics {
            object_count: self.objects.len(),
            material_count: self.material_manager.len(),
            total_triangles,
            total_vertices,
        }
    }
}

/// Scene statistics for logging
#[derive(Debug)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub material_count: usize,
    pub total_triangles: u32,
    pub total_vertices: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::NEON_PALETTE, gfx::geometry::extrude_shapes, gfx::geometry::Shape};

    fn seeded_scene(seed: u64) -> Scene {
        let config = DemoConfig::default().with_seed(seed);
        let mut sampler = KnotSampler::new(&config);
        Scene::build_knot_field(&config, &mut sampler, 1200.0 / 800.0)
    }

    /// Furthest vertex from the knot's axis, in [1.5 * radius, 1.5 * radius + tube]
    fn knot_extent(object: &Object) -> f32 {
        object.meshes[0]
            .vertices()
            .iter()
            .map(|v| (v.position[0].powi(2) + v.position[1].powi(2)).sqrt())
            .fold(0.0f32, f32::max)
    }

    #[test]
    fn test_builds_fifty_knots() {
        let scene = seeded_scene(7);
        assert_eq!(scene.knot_count(), 50);
        assert_eq!(scene.object_count(), 50);
        assert!(scene.label().is_none());

        for object in &scene.objects {
            let material = scene.get_material_for_object(object);
            assert!(NEON_PALETTE
                .iter()
                .any(|&color| knot_material_id(color) == material.name));
            assert_eq!(material.emissive_intensity, 1.5);

            let extent = knot_extent(object);
            assert!(
                extent >= 1.5 * 0.3 - 1e-4 && extent <= 1.5 * 1.5 + 0.1 + 1e-4,
                "extent {}",
                extent
            );
        }
    }

    #[test]
    fn test_knots_are_placed_in_the_cube() {
        let scene = seeded_scene(11);
        for object in &scene.objects {
            for axis in [object.position.x, object.position.y, object.position.z] {
                assert!((-5.0..=5.0).contains(&axis));
            }
        }
    }

    #[test]
    fn test_materials_are_shared_per_color() {
        let scene = seeded_scene(3);
        // Default material plus at most one per palette entry
        assert!(scene.material_manager.len() <= NEON_PALETTE.len() + 1);
    }

    #[test]
    fn test_advance_frame_rotates_every_knot() {
        let mut scene = seeded_scene(5);
        for _ in 0..100 {
            scene.advance_frame(0.01);
        }
        for &index in scene.knot_indices() {
            let rotation = scene.objects[index].rotation;
            assert!((rotation.x - 1.0).abs() < 1e-4);
            assert!((rotation.y - 1.0).abs() < 1e-4);
            assert_eq!(rotation.z, 0.0);
        }
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut scene = seeded_scene(1);
        scene.resize(800, 400);
        assert_eq!(scene.camera_manager.camera.aspect, 2.0);
        scene.resize(0, 400);
        assert_eq!(scene.camera_manager.camera.aspect, 2.0);
    }

    #[test]
    fn test_camera_starts_ten_units_back() {
        let scene = seeded_scene(1);
        let eye = scene.camera_manager.camera.eye;
        assert!(eye.x.abs() < 1e-6 && eye.y.abs() < 1e-6);
        assert!((eye.z - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_label_is_attached_once_and_not_rotated() {
        let mut scene = seeded_scene(2);
        let square = vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let geometry = extrude_shapes(&[Shape::new(square)], 0.2);
        let settings = LabelSettings::default();

        let index = scene.attach_label(&geometry, &settings);
        assert_eq!(scene.attach_label(&geometry, &settings), index);
        assert_eq!(scene.object_count(), 51);
        assert_eq!(scene.knot_count(), 50);

        scene.advance_frame(0.01);
        let label = scene.label().expect("label attached");
        assert_eq!(label.position, Vector3::new(-3.0, 0.0, 0.0));
        assert_eq!(label.rotation, Vector3::zero());
        assert!(scene.get_material_for_object(label).unlit);
    }
}
