//! End-to-end tests of the painter's pipeline through the public API.

use painter3d::compositor::Compositor;
use painter3d::prelude::*;
use painter3d::store::{GeometryStore, StoreCapacity};

fn renderer_with(camera: Camera) -> Renderer {
    Renderer::new(RendererConfig {
        width: 200,
        height: 200,
        camera,
        ..RendererConfig::default()
    })
    .unwrap()
}

fn facing_square(center: Vec3, half: f32) -> Primitive {
    Primitive::polygon(vec![
        center + Vec3::new(-half, -half, 0.0),
        center + Vec3::new(half, -half, 0.0),
        center + Vec3::new(half, half, 0.0),
        center + Vec3::new(-half, half, 0.0),
    ])
}

fn polygons(meta: &MetafileBackend) -> Vec<(Rgba, Vec<Vec2>)> {
    meta.drawn()
        .filter_map(|c| match c {
            DrawCommand::Polygon { color, points } => Some((*color, points.clone())),
            _ => None,
        })
        .collect()
}

#[test]
fn lit_polygon_in_front_of_camera_reaches_backend_once() {
    let camera = Camera::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO, Vec3::Y)
        .with_clip(-1.0, -50.0);
    let mut renderer = renderer_with(camera);
    let mut meta = MetafileBackend::new();

    renderer.begin_frame().unwrap();
    renderer
        .add_light(Vec3::new(0.0, 0.0, 10.0), Rgba::WHITE, &Mat4::identity())
        .unwrap();
    renderer
        .add_ambient(Rgba::new(0.1, 0.1, 0.1, 1.0))
        .unwrap();
    let outcome = renderer
        .draw(
            &facing_square(Vec3::ZERO, 1.0),
            &Attributes::default(),
            &Mat4::identity(),
        )
        .unwrap();
    assert!(matches!(outcome, DrawOutcome::Queued(_)));

    let stats = renderer.composite(&mut meta).unwrap();
    assert_eq!(stats.drawn, 1);
    assert_eq!(meta.polygon_count(), 1);

    let drawn = polygons(&meta);
    let (color, points) = &drawn[0];
    assert_eq!(points.len(), 4);
    assert!(color.r > 0.95 && color.g > 0.95 && color.b > 0.95, "{:?}", color);
    assert_eq!(meta.commands().first(), Some(&DrawCommand::Clear(Rgba::BLACK)));
    assert_eq!(meta.commands().last(), Some(&DrawCommand::Present));
}

#[test]
fn farther_polygon_is_painted_first() {
    let mut renderer = renderer_with(Camera::default());
    let mut meta = MetafileBackend::new();
    let near = Attributes {
        color: Rgba::rgb(1.0, 0.0, 0.0),
        ..Attributes::default()
    };
    let far = Attributes {
        color: Rgba::rgb(0.0, 0.0, 1.0),
        ..Attributes::default()
    };

    renderer.begin_frame().unwrap();
    renderer.add_ambient(Rgba::WHITE).unwrap();
    // Submitted nearest first.
    renderer
        .draw(&facing_square(Vec3::new(0.0, 0.0, 2.0), 1.0), &near, &Mat4::identity())
        .unwrap();
    renderer
        .draw(&facing_square(Vec3::new(0.0, 0.0, -5.0), 1.0), &far, &Mat4::identity())
        .unwrap();
    renderer.composite(&mut meta).unwrap();

    let drawn = polygons(&meta);
    assert_eq!(drawn.len(), 2);
    assert_eq!(drawn[0].0, Rgba::rgb(0.0, 0.0, 1.0));
    assert_eq!(drawn[1].0, Rgba::rgb(1.0, 0.0, 0.0));
}

#[test]
fn raster_output_shows_nearest_surface() {
    let mut renderer = renderer_with(Camera::default());
    let mut raster = RasterBackend::new(200, 200, RasterOptions::default());

    let mut scene = Scene::new();
    let ambient = scene.add_ambient(Rgba::WHITE);
    let near = scene.add_primitive(facing_square(Vec3::new(0.0, 0.0, 2.0), 1.0));
    let far = scene.add_primitive(facing_square(Vec3::new(0.0, 0.0, -5.0), 3.0));
    scene.set_attributes(
        near,
        AttributeOverrides {
            color: Some(Rgba::rgb(1.0, 0.0, 0.0)),
            ..AttributeOverrides::default()
        },
    );
    scene.set_attributes(
        far,
        AttributeOverrides {
            color: Some(Rgba::rgb(0.0, 0.0, 1.0)),
            ..AttributeOverrides::default()
        },
    );
    // Near first in traversal order; the sort must still put it on top.
    let root = scene.add_group(vec![ambient, near, far]);

    let stats = renderer.render_scene(&scene, root, &mut raster).unwrap();
    assert_eq!(stats.drawn, 2);

    let fb = raster.framebuffer();
    assert_eq!(fb.get_pixel(100, 100), Some(Rgba::rgb(1.0, 0.0, 0.0).to_argb()));
    assert_eq!(fb.get_pixel(0, 0), Some(Rgba::BLACK.to_argb()));
    assert_eq!(raster.frames_presented(), 1);
}

#[test]
fn shared_light_subtree_is_gathered_once() {
    let mut renderer = renderer_with(Camera::default());
    let mut meta = MetafileBackend::new();

    let mut scene = Scene::new();
    let light = scene.add_light(Vec3::new(0.0, 0.0, 10.0), Rgba::rgb(0.4, 0.4, 0.4));
    let lamp = scene.add_group(vec![light]);
    let left = scene.add_group(vec![lamp]);
    let right = scene.add_group(vec![lamp]);
    let square = scene.add_primitive(facing_square(Vec3::ZERO, 1.0));
    let root = scene.add_group(vec![left, right, square]);

    renderer.render_scene(&scene, root, &mut meta).unwrap();
    assert_eq!(renderer.store().lights().len(), 1);

    let drawn = polygons(&meta);
    // One 0.4 light at near-normal incidence; a double count would exceed 0.5.
    assert!(drawn[0].0.r > 0.35 && drawn[0].0.r < 0.45, "{:?}", drawn[0].0);
}

#[test]
fn shared_primitive_is_drawn_for_every_parent() {
    let mut renderer = renderer_with(Camera::default());
    let mut meta = MetafileBackend::new();

    let mut scene = Scene::new();
    let square = scene.add_primitive(facing_square(Vec3::ZERO, 0.5));
    let left = scene.add_group(vec![square]);
    let right = scene.add_group(vec![square]);
    scene.set_transform(left, Mat4::translation(-2.0, 0.0, 0.0));
    scene.set_transform(right, Mat4::translation(2.0, 0.0, 0.0));
    let root = scene.add_group(vec![left, right]);

    let stats = renderer.render_scene(&scene, root, &mut meta).unwrap();
    assert_eq!(stats.submitted, 2);
    assert_eq!(stats.drawn, 2);

    let drawn = polygons(&meta);
    let center_x = |points: &Vec<Vec2>| points.iter().map(|p| p.x).sum::<f32>() / 4.0;
    let mut xs = vec![center_x(&drawn[0].1), center_x(&drawn[1].1)];
    xs.sort_by(f32::total_cmp);
    assert!(xs[0] < 100.0 && xs[1] > 100.0);
}

#[test]
fn square_straddling_hither_gains_two_vertices() {
    let camera = Camera::default().with_clip(-1.0, -50.0);
    let mut renderer = renderer_with(camera);
    let mut meta = MetafileBackend::new();

    // Horizontal square below the eye, eye-space z from -0.5 to -2.
    let square = Primitive::polygon(vec![
        Vec3::new(-1.0, -1.0, 9.5),
        Vec3::new(1.0, -1.0, 9.5),
        Vec3::new(1.0, -1.0, 8.0),
        Vec3::new(-1.0, -1.0, 8.0),
    ]);
    let tip = Primitive::polygon(vec![
        Vec3::new(0.0, -1.0, 8.0),
        Vec3::new(1.0, -1.0, 9.5),
        Vec3::new(-1.0, -1.0, 9.5),
    ]);

    renderer.begin_frame().unwrap();
    renderer
        .draw(&square, &Attributes::default(), &Mat4::identity())
        .unwrap();
    renderer
        .draw(&tip, &Attributes::default(), &Mat4::identity())
        .unwrap();
    let stats = renderer.composite(&mut meta).unwrap();
    assert_eq!(stats.drawn, 2);

    let mut counts: Vec<usize> = polygons(&meta).iter().map(|(_, p)| p.len()).collect();
    counts.sort();
    // Square: two survivors plus two cuts. Triangle: one survivor plus two.
    assert_eq!(counts, vec![3, 4]);
}

#[test]
fn fully_clipped_and_malformed_primitives_are_counted() {
    let mut renderer = renderer_with(Camera::default().with_clip(-1.0, -50.0));
    let mut meta = MetafileBackend::new();

    renderer.begin_frame().unwrap();
    // Behind the camera.
    renderer
        .draw(
            &facing_square(Vec3::new(0.0, 0.0, 20.0), 1.0),
            &Attributes::default(),
            &Mat4::identity(),
        )
        .unwrap();
    renderer
        .draw(
            &Primitive::polygon(vec![Vec3::ZERO, Vec3::X]),
            &Attributes::default(),
            &Mat4::identity(),
        )
        .unwrap();
    let stats = renderer.composite(&mut meta).unwrap();

    assert_eq!(stats.submitted, 2);
    assert_eq!(stats.clipped, 1);
    assert_eq!(stats.malformed, 1);
    assert_eq!(stats.drawn, 0);
    assert_eq!(meta.commands().len(), 2);
}

#[test]
fn frame_cannot_begin_twice() {
    let mut renderer = renderer_with(Camera::default());
    renderer.begin_frame().unwrap();
    assert_eq!(renderer.begin_frame(), Err(RenderError::FrameInProgress));
}

#[test]
fn store_growth_keeps_coordinates_apart() {
    let mut store = GeometryStore::new(StoreCapacity {
        primitives: 2,
        vertices: 2,
        colors: 2,
        lights: 1,
    });
    let mut compositor = Compositor::new();
    compositor.begin_frame(&mut store).unwrap();

    // 40 primitives of 1..=4 vertices force several doublings of every pool.
    for i in 0..40 {
        let marker = i as f32;
        let points = vec![Vec3::new(marker, marker, 0.0); i % 4 + 1];
        compositor
            .accumulate(
                &mut store,
                PrimitiveKind::PointSet,
                &points,
                Rgba::WHITE,
                marker,
            )
            .unwrap();
    }
    assert!(store.primitive_capacity() >= 40);

    let mut meta = MetafileBackend::new();
    compositor
        .composite(&mut store, Rgba::BLACK, &mut meta)
        .unwrap();

    for (i, command) in meta.drawn().enumerate() {
        match command {
            DrawCommand::Point { points, .. } => {
                assert_eq!(points.len(), i % 4 + 1);
                assert!(points.iter().all(|p| p.x == i as f32 && p.y == i as f32));
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}

#[test]
fn line_reaching_far_off_screen_is_rastered_across_the_view() {
    let mut renderer = renderer_with(Camera::default());
    let mut raster = RasterBackend::new(200, 200, RasterOptions::default());
    let red = Rgba::rgb(1.0, 0.0, 0.0);

    renderer.begin_frame().unwrap();
    // Just past hither, so projection throws both ends far outside the view.
    let line = Primitive::line_strip(vec![
        Vec3::new(-1.0e9, 0.0, 9.8),
        Vec3::new(1.0e9, 0.0, 9.8),
    ]);
    let attributes = Attributes {
        color: red,
        ..Attributes::default()
    };
    let outcome = renderer.draw(&line, &attributes, &Mat4::identity()).unwrap();
    assert!(matches!(outcome, DrawOutcome::Queued(_)));
    let stats = renderer.composite(&mut raster).unwrap();
    assert_eq!(stats.drawn, 1);

    let fb = raster.framebuffer();
    for x in [0, 100, 199] {
        assert!(
            (98..=102).any(|y| fb.get_pixel(x, y) == Some(red.to_argb())),
            "column {}",
            x
        );
    }
}

#[test]
fn floor_around_the_camera_fills_below_the_horizon() {
    let mut renderer = renderer_with(Camera::default());
    let mut raster = RasterBackend::new(200, 200, RasterOptions::default());

    renderer.begin_frame().unwrap();
    renderer.add_ambient(Rgba::WHITE).unwrap();
    let floor = Primitive::polygon(vec![
        Vec3::new(-100.0, -1.0, 9.95),
        Vec3::new(100.0, -1.0, 9.95),
        Vec3::new(100.0, -1.0, -50.0),
        Vec3::new(-100.0, -1.0, -50.0),
    ]);
    let attributes = Attributes {
        color: Rgba::rgb(1.0, 0.0, 0.0),
        ..Attributes::default()
    };
    renderer.draw(&floor, &attributes, &Mat4::identity()).unwrap();
    let stats = renderer.composite(&mut raster).unwrap();
    assert_eq!(stats.drawn, 1);

    let fb = raster.framebuffer();
    let bottom = Rgba::from_argb(fb.get_pixel(100, 199).unwrap());
    assert!(bottom.r > 0.9 && bottom.g < 0.1, "{:?}", bottom);
    assert_eq!(fb.get_pixel(100, 0), Some(Rgba::BLACK.to_argb()));
}
