//! Node hierarchy of a loaded model and its skins.
//!
//! A [`Rig`] is a flat list of [`Joint`]s that reference their parent by index,
//! the way glTF nodes do. Animation tracks write into the `local` transform of
//! a joint; the `rest` transform is what the file declared and is used to
//! fill in any weight that no running action covers.
//!
//! [`Rig`]: struct.Rig.html
//! [`Joint`]: struct.Joint.html

use cgmath;
use mint;

use cgmath::Matrix4;

/// Index of a joint inside its [`Rig`](struct.Rig.html).
pub type JointIndex = usize;

/// A matrix defining how to bind mesh vertices to a joint.
pub type InverseBindMatrix = mint::ColumnMatrix4<f32>;

/// Position, rotation and uniform scale of a joint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeTransform {
    /// Position.
    pub position: mint::Point3<f32>,
    /// Orientation.
    pub orientation: mint::Quaternion<f32>,
    /// Scale.
    pub scale: f32,
}

impl Default for NodeTransform {
    fn default() -> Self {
        NodeTransform {
            position: [0.0, 0.0, 0.0].into(),
            orientation: mint::Quaternion {
                v: [0.0, 0.0, 0.0].into(),
                s: 1.0,
            },
            scale: 1.0,
        }
    }
}

impl NodeTransform {
    /// Creates a transform that only scales.
    pub fn from_scale(scale: f32) -> Self {
        NodeTransform {
            scale,
            ..NodeTransform::default()
        }
    }

    /// Composes `self` (the parent) with `child`, returning the child's transform
    /// relative to whatever `self` is relative to.
    pub fn concat(
        &self,
        child: &NodeTransform,
    ) -> NodeTransform {
        let parent_rot = cgmath::Quaternion::from(self.orientation);
        let child_rot = cgmath::Quaternion::from(child.orientation);
        let parent_pos = cgmath::Vector3::new(self.position.x, self.position.y, self.position.z);
        let child_pos = cgmath::Vector3::new(child.position.x, child.position.y, child.position.z);
        let position = parent_rot * (child_pos * self.scale) + parent_pos;
        NodeTransform {
            position: [position.x, position.y, position.z].into(),
            orientation: (parent_rot * child_rot).into(),
            scale: self.scale * child.scale,
        }
    }

    fn to_matrix(&self) -> Matrix4<f32> {
        let rotation = cgmath::Matrix3::from(cgmath::Quaternion::from(self.orientation));
        let mut matrix = Matrix4::from(rotation * self.scale);
        matrix.w = cgmath::Vector4::new(self.position.x, self.position.y, self.position.z, 1.0);
        matrix
    }
}

/// A single node of a [`Rig`](struct.Rig.html).
#[derive(Clone, Debug)]
pub struct Joint {
    /// Name used to bind animation tracks to this joint.
    pub name: String,
    /// Index of the parent joint, if any.
    pub parent: Option<JointIndex>,
    /// Transform declared by the source file.
    pub rest: NodeTransform,
    /// Current transform relative to the parent.
    pub local: NodeTransform,
}

impl Joint {
    /// Creates a joint at rest.
    pub fn new<S: Into<String>>(
        name: S,
        parent: Option<JointIndex>,
        rest: NodeTransform,
    ) -> Self {
        Joint {
            name: name.into(),
            parent,
            rest,
            local: rest,
        }
    }
}

/// Node hierarchy that animation actions write into.
#[derive(Clone, Debug, Default)]
pub struct Rig {
    joints: Vec<Joint>,
    children: Vec<Vec<JointIndex>>,
    roots: Vec<JointIndex>,
}

impl Rig {
    /// Builds a rig from a flat list of joints.
    ///
    /// Parents pointing outside of the list are treated as missing, and the
    /// joint becomes a root.
    pub fn new(mut joints: Vec<Joint>) -> Self {
        let count = joints.len();
        let mut children = vec![Vec::new(); count];
        let mut roots = Vec::new();
        for (index, joint) in joints.iter_mut().enumerate() {
            match joint.parent {
                Some(parent) if parent < count && parent != index => children[parent].push(index),
                Some(parent) => {
                    warn!("Joint {:?} has an invalid parent {}", joint.name, parent);
                    joint.parent = None;
                    roots.push(index);
                }
                None => roots.push(index),
            }
        }
        Rig { joints, children, roots }
    }

    /// All joints, in source order.
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Looks up a joint.
    pub fn joint(
        &self,
        index: JointIndex,
    ) -> Option<&Joint> {
        self.joints.get(index)
    }

    /// Indices of the joints without a parent.
    pub fn roots(&self) -> &[JointIndex] {
        &self.roots
    }

    /// Number of joints.
    pub fn len(&self) -> usize {
        self.joints.len()
    }

    /// Returns `true` if the rig has no joints.
    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Finds the first joint with the given name.
    pub fn find(
        &self,
        name: &str,
    ) -> Option<JointIndex> {
        self.joints.iter().position(|joint| joint.name == name)
    }

    /// Puts every joint back to its rest transform.
    pub fn reset_pose(&mut self) {
        for joint in &mut self.joints {
            joint.local = joint.rest;
        }
    }

    pub(crate) fn joint_mut(
        &mut self,
        index: JointIndex,
    ) -> Option<&mut Joint> {
        self.joints.get_mut(index)
    }

    /// Computes the world transform of every joint, with `placement` applied
    /// on top of the roots.
    pub fn world_transforms(
        &self,
        placement: &NodeTransform,
    ) -> Vec<NodeTransform> {
        let mut world = vec![NodeTransform::default(); self.joints.len()];
        let mut stack: Vec<(JointIndex, NodeTransform)> = self.roots
            .iter()
            .map(|&root| (root, *placement))
            .collect();
        while let Some((index, parent)) = stack.pop() {
            let transform = parent.concat(&self.joints[index].local);
            world[index] = transform;
            for &child in &self.children[index] {
                stack.push((child, transform));
            }
        }
        world
    }
}

/// Joints and inverse bind matrices of a skinned mesh.
#[derive(Clone, Debug)]
pub struct Skin {
    /// Optional name from the source file.
    pub name: Option<String>,
    /// Rig joints, in the order the mesh's joint indices refer to them.
    pub joints: Vec<JointIndex>,
    /// One matrix per joint; missing matrices are the identity.
    pub inverse_bind_matrices: Vec<InverseBindMatrix>,
}

impl Skin {
    /// Computes the skinning matrix of every joint from the rig's world
    /// transforms (see [`Rig::world_transforms`]).
    ///
    /// [`Rig::world_transforms`]: struct.Rig.html#method.world_transforms
    pub fn joint_matrices(
        &self,
        world: &[NodeTransform],
    ) -> Vec<mint::ColumnMatrix4<f32>> {
        use cgmath::SquareMatrix;

        self.joints
            .iter()
            .enumerate()
            .map(|(slot, &joint)| {
                let joint_matrix = world
                    .get(joint)
                    .map_or(Matrix4::identity(), NodeTransform::to_matrix);
                let ibm = self.inverse_bind_matrices
                    .get(slot)
                    .map_or(Matrix4::identity(), |&m| Matrix4::from(m));
                (joint_matrix * ibm).into()
            })
            .collect()
    }
}
