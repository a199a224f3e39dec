use std::time::Duration;

use cgmath::{MetricSpace, Point3};
use jersey_viewer::{
    ViewerConfig,
    data_structures::scene_graph::collect_mesh_slots,
    input::{Action, InputState},
    viewer::Viewer,
};
use winit::{dpi::PhysicalPosition, event::MouseButton};

use crate::common::test_utils::{jersey_model, still_config};

mod common;

#[test]
fn loaded_model_is_the_only_instance_and_scaled() {
    let mut viewer = Viewer::new(&ViewerConfig::default());
    assert_eq!(viewer.model_count(), 0);

    let jersey = viewer.attach_model(jersey_model());
    assert_eq!(jersey.scale(), 0.05);
    assert_eq!(viewer.model_count(), 1);

    // Child world transforms carry the root scale
    let slots = collect_mesh_slots(viewer.jersey().unwrap().root());
    assert_eq!(slots.len(), 3);
    assert!(slots.iter().all(|(_, world)| (world.scale.x - 0.05).abs() < 1e-6));
    let right_sleeve = slots[2].1.position;
    assert!((right_sleeve.x - 0.05).abs() < 1e-6);
}

#[test]
fn materials_before_load_are_ignored() {
    let mut viewer = Viewer::new(&ViewerConfig::default());
    assert!(!viewer.select_variant("libero"));
    assert!(!viewer.select_variant_at(0));
    assert!(viewer.mesh_materials().is_empty());

    // The default variant still wins once the model arrives
    viewer.attach_model(jersey_model());
    let regular = viewer.materials().id("regular");
    assert_eq!(viewer.mesh_materials(), vec![regular; 3]);
}

#[test]
fn last_selected_variant_is_on_every_mesh() {
    let mut viewer = Viewer::new(&ViewerConfig::default());
    viewer.attach_model(jersey_model());

    assert!(viewer.select_variant("regular"));
    assert!(viewer.select_variant("libero"));

    let libero = viewer.materials().id("libero");
    assert!(libero.is_some());
    assert_eq!(viewer.mesh_materials(), vec![libero; 3]);
}

#[test]
fn showcase_preset_targets_higher() {
    let mut viewer = Viewer::new(&ViewerConfig::showcase());
    viewer.attach_model(jersey_model());
    assert_eq!(viewer.controls.target, Point3::new(0.0, 0.75, 0.0));
    let jersey = viewer.materials().id("jersey");
    assert_eq!(viewer.mesh_materials(), vec![jersey; 3]);
}

#[test]
fn aspect_follows_surface_after_next_frame() {
    let mut viewer = Viewer::new(&ViewerConfig::default());
    viewer.frame((800, 600), None);
    assert!((viewer.projection.aspect() - 800.0 / 600.0).abs() < 1e-6);

    let update = viewer.frame((500, 1000), Some(Duration::from_millis(16)));
    assert_eq!(update.resized, Some((500, 1000)));
    assert!((viewer.projection.aspect() - 0.5).abs() < 1e-6);
}

#[test]
fn light_sits_on_the_camera_every_frame() {
    let mut viewer = Viewer::new(&ViewerConfig::default());
    viewer.attach_model(jersey_model());
    for _ in 0..10 {
        viewer.frame((640, 480), Some(Duration::from_millis(16)));
        assert_eq!(viewer.light.position, viewer.camera.position);
    }
    // Auto rotation moved the camera
    let start = Point3::new(1.0, 1.0, 2.0);
    assert!(viewer.camera.position.distance(start) > 0.0);
}

#[test]
fn camera_looks_at_model_after_load() {
    let mut viewer = Viewer::new(&still_config());
    viewer.attach_model(jersey_model());
    viewer.frame((640, 480), None);
    assert_eq!(viewer.camera.target, Point3::new(0.0, 0.65, 0.0));
    // Retargeting keeps the camera where it was
    assert!(viewer.camera.position.distance(Point3::new(1.0, 1.0, 2.0)) < 1e-4);
}

#[test]
fn double_click_on_surface_toggles_fullscreen() {
    let mut viewer = Viewer::new(&still_config());
    let mut input = InputState::new(true);
    let t0 = instant::Instant::now();

    input.cursor_moved(PhysicalPosition::new(320.0, 240.0), &mut viewer, 480.0);
    input.press(MouseButton::Left, t0, &mut viewer);
    input.release(&mut viewer);
    let action = input.press(MouseButton::Left, t0 + Duration::from_millis(150), &mut viewer);
    input.release(&mut viewer);
    assert_eq!(action, Action::ToggleFullscreen);

    assert!(viewer.toggle_fullscreen(false));
    assert!(viewer.is_fullscreen());
    assert!(!viewer.toggle_fullscreen(true));
    assert!(!viewer.is_fullscreen());
}

#[test]
fn double_click_outside_surface_does_not_toggle() {
    let mut viewer = Viewer::new(&still_config());
    let mut input = InputState::new(true);
    let t0 = instant::Instant::now();

    input.cursor_moved(PhysicalPosition::new(5.0, 5.0), &mut viewer, 480.0);
    input.cursor_left(&mut viewer);
    for offset in [0, 100] {
        let action = input.press(
            MouseButton::Left,
            t0 + Duration::from_millis(offset),
            &mut viewer,
        );
        input.release(&mut viewer);
        assert_eq!(action, Action::None);
    }
    assert!(!viewer.is_fullscreen());
}

#[test]
fn dragging_orbits_the_camera() {
    let mut viewer = Viewer::new(&still_config());
    viewer.attach_model(jersey_model());
    viewer.frame((640, 480), None);
    let before = viewer.camera.position;
    let distance = viewer.camera.distance_to_target();

    let mut input = InputState::new(true);
    input.cursor_moved(PhysicalPosition::new(100.0, 100.0), &mut viewer, 480.0);
    input.press(MouseButton::Left, instant::Instant::now(), &mut viewer);
    input.cursor_moved(PhysicalPosition::new(160.0, 100.0), &mut viewer, 480.0);
    input.release(&mut viewer);
    viewer.frame((640, 480), None);

    assert!(viewer.camera.position.distance(before) > 1e-3);
    assert!((viewer.camera.distance_to_target() - distance).abs() < 1e-4);
}
