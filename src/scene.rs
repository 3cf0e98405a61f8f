//! A minimal scene graph to drive the pipeline.
//!
//! Nodes live in an arena and are addressed by [`NodeId`]. A node may be
//! listed as a child of several groups, so the graph is a DAG rather than a
//! tree. Each node can carry a model transform and attribute overrides that
//! apply to everything beneath it.

use crate::color::Rgba;
use crate::math::mat4::Mat4;
use crate::math::vec3::Vec3;
use crate::primitive::{AttributeOverrides, Primitive};

/// Handle to a node in a [`Scene`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq)]
pub enum NodeContent {
    Group(Vec<NodeId>),
    Primitive(Primitive),
    /// Positional light, position in the node's model space.
    Light { position: Vec3, color: Rgba },
    Ambient(Rgba),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Applied before the transforms of every enclosing group.
    pub transform: Option<Mat4>,
    pub attributes: AttributeOverrides,
    pub content: NodeContent,
}

impl Node {
    fn new(content: NodeContent) -> Self {
        Self {
            transform: None,
            attributes: AttributeOverrides::default(),
            content,
        }
    }

    /// True for lights, ambients, and groups, which may hold either.
    pub fn may_bear_light(&self) -> bool {
        !matches!(self.content, NodeContent::Primitive(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: Vec<Node>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn add_group(&mut self, children: Vec<NodeId>) -> NodeId {
        self.push(Node::new(NodeContent::Group(children)))
    }

    pub fn add_primitive(&mut self, primitive: Primitive) -> NodeId {
        self.push(Node::new(NodeContent::Primitive(primitive)))
    }

    pub fn add_light(&mut self, position: Vec3, color: Rgba) -> NodeId {
        self.push(Node::new(NodeContent::Light { position, color }))
    }

    pub fn add_ambient(&mut self, color: Rgba) -> NodeId {
        self.push(Node::new(NodeContent::Ambient(color)))
    }

    /// Appends `child` to a group. Returns `false` if `group` is not a group.
    pub fn add_child(&mut self, group: NodeId, child: NodeId) -> bool {
        match self.nodes.get_mut(group.0).map(|n| &mut n.content) {
            Some(NodeContent::Group(children)) => {
                children.push(child);
                true
            }
            _ => {
                log::warn!("node {:?} is not a group; child {:?} not added", group, child);
                false
            }
        }
    }

    pub fn set_transform(&mut self, id: NodeId, transform: Mat4) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.transform = Some(transform);
        }
    }

    pub fn set_attributes(&mut self, id: NodeId, attributes: AttributeOverrides) {
        if let Some(node) = self.nodes.get_mut(id.0) {
            node.attributes = attributes;
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
