use std::error::Error;
use std::path::PathBuf;

use painter3d::prelude::*;

const ROTATION_SPEED: f32 = 0.001; // radians per millisecond

struct DemoScene {
    scene: Scene,
    root: NodeId,
    spinner: NodeId,
}

fn build_scene(obj: Option<&PathBuf>) -> Result<DemoScene, LoadError> {
    let mut scene = Scene::new();

    let mesh = match obj {
        Some(path) => Mesh::from_obj(path)?,
        None => Mesh::cube(),
    };
    let faces: Vec<NodeId> = mesh
        .polygons()
        .into_iter()
        .map(|polygon| scene.add_primitive(polygon))
        .collect();
    let spinner = scene.add_group(faces);
    scene.set_attributes(
        spinner,
        AttributeOverrides {
            color: Some(Rgba::rgb(0.9, 0.6, 0.2)),
            backcull: Some(true),
            material: Some(Material::Shiny),
            ..AttributeOverrides::default()
        },
    );

    let floor = scene.add_primitive(Primitive::new(
        PrimitiveKind::Polygon,
        VertexList::Colored(vec![
            (Vec3::new(-4.0, -2.0, 4.0), Rgba::rgb(0.2, 0.2, 0.8)),
            (Vec3::new(4.0, -2.0, 4.0), Rgba::rgb(0.2, 0.8, 0.2)),
            (Vec3::new(4.0, -2.0, -4.0), Rgba::rgb(0.8, 0.2, 0.2)),
            (Vec3::new(-4.0, -2.0, -4.0), Rgba::rgb(0.8, 0.8, 0.2)),
        ]),
    ));

    let outline = scene.add_primitive(Primitive::line_strip(vec![
        Vec3::new(-3.0, 2.5, 0.0),
        Vec3::new(-1.0, 3.0, 0.0),
        Vec3::new(1.0, 2.5, 0.0),
        Vec3::new(3.0, 3.0, 0.0),
    ]));
    scene.set_attributes(
        outline,
        AttributeOverrides {
            color: Some(Rgba::WHITE),
            ..AttributeOverrides::default()
        },
    );

    let samples = scene.add_primitive(Primitive::new(
        PrimitiveKind::PointSet,
        VertexList::Valued(
            (0..9)
                .map(|i| {
                    let t = i as f32 / 8.0;
                    (Vec3::new(-3.0 + 6.0 * t, -1.5, 2.5), t)
                })
                .collect(),
        ),
    ));

    let light = scene.add_light(Vec3::new(3.0, 5.0, 8.0), Rgba::rgb(0.8, 0.8, 0.8));
    let ambient = scene.add_ambient(Rgba::rgb(0.15, 0.15, 0.15));

    let root = scene.add_group(vec![light, ambient, floor, spinner, outline, samples]);
    Ok(DemoScene {
        scene,
        root,
        spinner,
    })
}

struct Args {
    png: Option<PathBuf>,
    obj: Option<PathBuf>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        png: None,
        obj: None,
    };
    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--png" => args.png = iter.next().map(PathBuf::from),
            "--obj" => args.obj = iter.next().map(PathBuf::from),
            other => {
                return Err(format!(
                    "unknown argument '{}' (expected --png <path> or --obj <path>)",
                    other
                ))
            }
        }
    }
    Ok(args)
}

fn spin(demo: &mut DemoScene, angle: f32) {
    demo.scene.set_transform(
        demo.spinner,
        Mat4::rotation_y(angle) * Mat4::rotation_x(angle * 0.5),
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = PainterConfig::load()?;
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.debug.log_level.as_str()),
    )
    .init();

    let args = parse_args()?;
    let mut demo = build_scene(args.obj.as_ref())?;
    let mut renderer = Renderer::new(config.renderer_config())?;
    let mut raster =
        RasterBackend::new(renderer.width(), renderer.height(), config.raster_options());
    log::info!("rendering {}x{}", renderer.width(), renderer.height());

    if let Some(path) = args.png {
        spin(&mut demo, 0.6);
        let stats = renderer.render_scene(&demo.scene, demo.root, &mut raster)?;
        log::info!("{:?}", stats);
        raster.save(&path)?;
        return Ok(());
    }

    let mut window = Window::new("painter3d", renderer.width(), renderer.height())?;
    let mut limiter = FrameLimiter::new(&window);
    let mut angle = 0.0;

    loop {
        match window.poll_events() {
            WindowEvent::Quit => break,
            WindowEvent::Resize(w, h) if w > 0 && h > 0 => {
                renderer.set_viewport(w, h)?;
                raster.resize(w, h);
                window.resize(w, h);
            }
            WindowEvent::Resize(..) | WindowEvent::None => {}
        }

        let delta = limiter.wait_and_get_delta(&window);
        angle += delta as f32 * ROTATION_SPEED;
        spin(&mut demo, angle);

        let stats = renderer.render_scene(&demo.scene, demo.root, &mut raster)?;
        log::trace!("{:?}", stats);
        window.present(raster.framebuffer())?;
    }

    Ok(())
}
