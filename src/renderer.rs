//! The per-instance painter's-algorithm pipeline.
//!
//! A [`Renderer`] owns every buffer the pipeline writes into: the
//! [`GeometryStore`], the clipper's scratch buffers and the device-point
//! scratch used for projection. Nothing is shared between instances.
//!
//! For each primitive handed to [`Renderer::draw`]:
//!
//! 1. compose the model transform with the eye transform
//! 2. compute the flat face normal and cull back faces
//! 3. clip against hither and yon in eye space
//! 4. resolve and shade the flat color
//! 5. project, map to device pixels and queue it with its mean depth
//!
//! [`Renderer::composite`] then sorts and replays the frame.

use crate::backend::DrawBackend;
use crate::camera::Camera;
use crate::clipper::{ClipVertex, EyeSpaceClipper};
use crate::color::Rgba;
use crate::compositor::{Compositor, FrameStats};
use crate::error::RenderError;
use crate::light::{face_normal, Lighting, Surface};
use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;
use crate::primitive::{Attributes, Primitive, PrimitiveKind, VertexList};
use crate::scene::{NodeContent, NodeId, Scene};
use crate::store::{GeometryStore, LightId, PrimitiveId, StoreCapacity};
use crate::transform::TransformStack;

/// Deepest group nesting followed before a branch is abandoned.
const MAX_SCENE_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct RendererConfig {
    pub width: u32,
    pub height: u32,
    pub capacity: StoreCapacity,
    pub camera: Camera,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            capacity: StoreCapacity::default(),
            camera: Camera::default(),
        }
    }
}

/// What happened to one primitive handed to [`Renderer::draw`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawOutcome {
    Queued(PrimitiveId),
    /// Too little of it survived the clip planes.
    Clipped,
    /// Back-facing with culling enabled.
    Culled,
    /// Too few vertices to begin with.
    Malformed,
}

/// Transform and attributes inherited from an enclosing scene traversal.
#[derive(Debug, Clone, Default)]
pub struct Inherited {
    /// Model transform of the enclosing group.
    pub model: Mat4,
    pub attributes: Attributes,
}

pub struct Renderer {
    width: u32,
    height: u32,
    camera: Camera,
    store: GeometryStore,
    transforms: TransformStack,
    clipper: EyeSpaceClipper,
    lighting: Lighting,
    compositor: Compositor,
    device_points: Vec<Vec3>,
}

impl Renderer {
    pub fn new(config: RendererConfig) -> Result<Self, RenderError> {
        check_viewport(config.width, config.height)?;
        config.camera.validate()?;

        let mut transforms = TransformStack::new(config.width as f32 / config.height as f32);
        transforms.set_camera(&config.camera);

        Ok(Self {
            width: config.width,
            height: config.height,
            clipper: EyeSpaceClipper::new(config.camera.hither, config.camera.yon),
            camera: config.camera,
            store: GeometryStore::new(config.capacity),
            transforms,
            lighting: Lighting::new(),
            compositor: Compositor::new(),
            device_points: Vec::new(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn store(&self) -> &GeometryStore {
        &self.store
    }

    pub fn lighting(&self) -> &Lighting {
        &self.lighting
    }

    /// Counters of the frame in progress, or of the last composited frame.
    pub fn stats(&self) -> FrameStats {
        self.compositor.stats()
    }

    /// Replaces the camera, rebuilding the projection and the clip planes.
    pub fn set_camera(&mut self, camera: Camera) -> Result<(), RenderError> {
        camera.validate()?;
        self.transforms.set_camera(&camera);
        self.clipper.set_planes(camera.hither, camera.yon);
        self.camera = camera;
        Ok(())
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        check_viewport(width, height)?;
        self.width = width;
        self.height = height;
        self.transforms.set_aspect_ratio(width as f32 / height as f32);
        Ok(())
    }

    // =========================================================================
    // Frame
    // =========================================================================

    /// Starts a frame: empties the store, the light table and the ambient sum.
    pub fn begin_frame(&mut self) -> Result<(), RenderError> {
        self.compositor.begin_frame(&mut self.store)?;
        self.lighting.reset();
        Ok(())
    }

    /// Sorts the frame and replays it into `backend`, cleared to the camera
    /// background.
    pub fn composite(&mut self, backend: &mut dyn DrawBackend) -> Result<FrameStats, RenderError> {
        self.compositor
            .composite(&mut self.store, self.camera.background, backend)
    }

    // =========================================================================
    // Lights
    // =========================================================================

    /// Adds a positional light given in the model space of `model`.
    pub fn add_light(
        &mut self,
        position: Vec3,
        color: Rgba,
        model: &Mat4,
    ) -> Result<LightId, RenderError> {
        self.require_frame()?;
        let model_to_eye = self.transforms.enter(model);
        Ok(self
            .lighting
            .gather_light(&mut self.store, position, color, &model_to_eye))
    }

    pub fn add_ambient(&mut self, color: Rgba) -> Result<(), RenderError> {
        self.require_frame()?;
        self.lighting.gather_ambient(color);
        Ok(())
    }

    /// Marks a light-bearing subtree as gathered. Returns `false` when it
    /// already was this frame.
    pub fn enter_light_subtree(&mut self, node: NodeId) -> bool {
        self.lighting.enter_subtree(node)
    }

    // =========================================================================
    // Primitives
    // =========================================================================

    /// Runs one primitive through the pipeline and queues it for compositing.
    pub fn draw(
        &mut self,
        primitive: &Primitive,
        attributes: &Attributes,
        model: &Mat4,
    ) -> Result<DrawOutcome, RenderError> {
        self.require_frame()?;
        self.compositor.stats_mut().submitted += 1;

        let kind = primitive.kind;
        let vertices = &primitive.vertices;
        if !primitive.is_well_formed() {
            log::warn!(
                "dropping {:?} with {} vertices (needs {})",
                kind,
                vertices.len(),
                kind.min_vertices()
            );
            self.compositor.stats_mut().malformed += 1;
            return Ok(DrawOutcome::Malformed);
        }

        let model_to_eye = self.transforms.enter(model);

        let normal = if kind == PrimitiveKind::Polygon {
            let normal = eye_normal(vertices, &model_to_eye);
            if attributes.backcull && normal.z < 0.0 {
                log::trace!("culled back-facing polygon, eye normal {:?}", normal);
                self.compositor.stats_mut().culled += 1;
                return Ok(DrawOutcome::Culled);
            }
            Some(normal)
        } else {
            None
        };

        let fallback = attributes.color;
        let clipped = self.clipper.clip(
            kind,
            (0..vertices.len()).map(|i| {
                ClipVertex::new(
                    model_to_eye.transform_point(vertices.position(i)),
                    vertices.color(i).unwrap_or(fallback),
                    [
                        vertices.value(i).unwrap_or(0.0),
                        vertices.value2(i).unwrap_or(0.0),
                    ],
                )
            }),
        );
        let Some(outcome) = clipped else {
            log::trace!("{:?} clipped away", kind);
            self.compositor.stats_mut().clipped += 1;
            return Ok(DrawOutcome::Clipped);
        };

        let survivors = self.clipper.output();
        let base = resolve_color(vertices, survivors, attributes);
        let color = match normal {
            Some(normal) => self.lighting.shade(
                self.store.lights(),
                &Surface {
                    position: model_to_eye.transform_point(vertices.position(0)),
                    normal,
                    color: base,
                    material: attributes.material,
                },
            ),
            None => base,
        };

        let (width, height) = (self.width as f32, self.height as f32);
        self.device_points.clear();
        for vertex in survivors {
            let ndc = self.transforms.project_point(vertex.position);
            self.device_points.push(to_device(ndc, width, height));
        }

        let id = self.compositor.accumulate(
            &mut self.store,
            kind,
            &self.device_points,
            color,
            outcome.depth,
        )?;
        Ok(DrawOutcome::Queued(id))
    }

    // =========================================================================
    // Scene traversal
    // =========================================================================

    /// Renders a whole scene into `backend` as one frame.
    pub fn render_scene(
        &mut self,
        scene: &Scene,
        root: NodeId,
        backend: &mut dyn DrawBackend,
    ) -> Result<FrameStats, RenderError> {
        self.submit_scene(scene, root, None)?;
        self.composite(backend)
    }

    /// Gathers the lights of `root` and draws its primitives.
    ///
    /// A top-level call (`inherited` is `None`) starts a new frame. A nested
    /// call, made with the transform and attributes in effect at the point
    /// of nesting, adds to the frame already accumulating.
    pub fn submit_scene(
        &mut self,
        scene: &Scene,
        root: NodeId,
        inherited: Option<&Inherited>,
    ) -> Result<(), RenderError> {
        let top_level = Inherited::default();
        let inherited = match inherited {
            Some(inherited) => inherited,
            None => {
                self.begin_frame()?;
                &top_level
            }
        };

        let result = self
            .gather_node(scene, root, &inherited.model, 0)
            .and_then(|()| self.draw_node(scene, root, inherited, 0));
        if result.is_err() {
            self.compositor.abort_frame();
        }
        result
    }

    fn gather_node(
        &mut self,
        scene: &Scene,
        id: NodeId,
        parent_model: &Mat4,
        depth: usize,
    ) -> Result<(), RenderError> {
        let Some(node) = scene.node(id) else {
            log::warn!("scene has no node {:?}", id);
            return Ok(());
        };
        if !node.may_bear_light() || !self.lighting.enter_subtree(id) {
            return Ok(());
        }
        if depth > MAX_SCENE_DEPTH {
            log::warn!("scene nested deeper than {} at {:?}", MAX_SCENE_DEPTH, id);
            return Ok(());
        }

        let model = compose(parent_model, node.transform.as_ref());
        match &node.content {
            NodeContent::Group(children) => {
                for child in children {
                    self.gather_node(scene, *child, &model, depth + 1)?;
                }
            }
            NodeContent::Light { position, color } => {
                self.add_light(*position, *color, &model)?;
            }
            NodeContent::Ambient(color) => self.add_ambient(*color)?,
            NodeContent::Primitive(_) => {}
        }
        Ok(())
    }

    fn draw_node(
        &mut self,
        scene: &Scene,
        id: NodeId,
        parent: &Inherited,
        depth: usize,
    ) -> Result<(), RenderError> {
        let Some(node) = scene.node(id) else {
            return Ok(());
        };
        if depth > MAX_SCENE_DEPTH {
            return Ok(());
        }

        match &node.content {
            NodeContent::Group(children) => {
                let inherited = Inherited {
                    model: compose(&parent.model, node.transform.as_ref()),
                    attributes: node.attributes.apply(&parent.attributes),
                };
                for child in children {
                    self.draw_node(scene, *child, &inherited, depth + 1)?;
                }
            }
            NodeContent::Primitive(primitive) => {
                let model = compose(&parent.model, node.transform.as_ref());
                let attributes = node.attributes.apply(&parent.attributes);
                self.draw(primitive, &attributes, &model)?;
            }
            NodeContent::Light { .. } | NodeContent::Ambient(_) => {}
        }
        Ok(())
    }

    fn require_frame(&self) -> Result<(), RenderError> {
        if self.compositor.is_accumulating() {
            Ok(())
        } else {
            Err(RenderError::NoFrameInProgress)
        }
    }
}

fn check_viewport(width: u32, height: u32) -> Result<(), RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::InvalidViewport { width, height });
    }
    Ok(())
}

fn compose(parent: &Mat4, local: Option<&Mat4>) -> Mat4 {
    match local {
        Some(local) => *parent * *local,
        None => *parent,
    }
}

/// Maps normalized device coordinates to pixels, origin top-left.
pub fn to_device(ndc: Vec3, width: f32, height: f32) -> Vec3 {
    Vec3::new(
        (ndc.x + 1.0) * 0.5 * width,
        (1.0 - ndc.y) * 0.5 * height,
        ndc.z,
    )
}

/// Flat face normal in eye space. Collinear leading edges fall back to +Z.
fn eye_normal(vertices: &VertexList, model_to_eye: &Mat4) -> Vec3 {
    let leading = [
        vertices.position(0),
        vertices.position(1),
        vertices.position(2),
    ];
    match face_normal(&leading) {
        Some(normal) => model_to_eye.transform_vector(normal).normalize_or(Vec3::Z),
        None => {
            log::debug!("degenerate face normal, using +Z");
            Vec3::Z
        }
    }
}

/// The unshaded flat color of a clipped primitive.
fn resolve_color(vertices: &VertexList, survivors: &[ClipVertex], attributes: &Attributes) -> Rgba {
    let count = survivors.len() as f32;
    if vertices.has_colors() {
        let mut sum = Rgba::TRANSPARENT;
        for vertex in survivors {
            sum += vertex.color;
        }
        sum * (1.0 / count)
    } else if vertices.has_values() {
        let mean = survivors.iter().map(|v| v.values[0]).sum::<f32>() / count;
        attributes.color_map.map(mean)
    } else {
        attributes.color
    }
}
