/*!
Joint hierarchy used to skin a mesh.

A skeleton is read from a JSON document of the form

```json
{
  "root": {
    "name": "hip",
    "pos": [0, 1, 0],
    "rot": [90, 0, 0, 1],
    "children": [ ... ]
  }
}
```

where `pos` is the translation relative to the parent, and `rot` is an angle
in degrees followed by the rotation axis. Joints are numbered in the order
they appear in the document (parents before children), starting from 0.
*/

use crate::{
    element::{Handle, JH},
    error::{Error, ParseError, Result, TopologyError},
    ids::IdGen,
};
use glam::{Mat4, Quat, Vec3};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// Ids of joints start here for every skeleton.
pub const JOINT_ID_BASE: u32 = 0;

#[derive(Debug, Clone)]
pub struct Joint {
    id: u32,
    name: String,
    pos: Vec3,
    rot: Quat,
    bind: Mat4,
    parent: Option<JH>,
    children: Vec<JH>,
}

impl Joint {
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Translation relative to the parent.
    pub fn position(&self) -> Vec3 {
        self.pos
    }

    /// Rotation relative to the parent.
    pub fn rotation(&self) -> Quat {
        self.rot
    }

    /// Inverse of the world transform at the time the bind pose was computed.
    pub fn bind(&self) -> Mat4 {
        self.bind
    }

    pub fn parent(&self) -> Option<JH> {
        self.parent
    }

    pub fn children(&self) -> &[JH] {
        &self.children
    }

    /// Translation followed by rotation, i.e. `T * R`.
    pub fn local_transform(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.rot, self.pos)
    }
}

/// A tree of joints. Parents are added before their children, so the tree
/// can not have cycles.
#[derive(Debug, Clone)]
pub struct Skeleton {
    joints: Vec<Joint>,
    root: Option<JH>,
    ids: IdGen,
}

impl Default for Skeleton {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Deserialize)]
struct JointRecord {
    #[serde(default)]
    name: String,
    pos: [f32; 3],
    rot: [f32; 4],
    #[serde(default)]
    children: Vec<JointRecord>,
}

#[derive(Deserialize)]
struct SkeletonFile {
    root: Option<JointRecord>,
}

/// Convert an angle in degrees and a rotation axis of any length into a unit
/// quaternion. A zero axis gives no rotation.
fn axis_angle_to_quat(rot: [f32; 4]) -> Quat {
    Vec3::new(rot[1], rot[2], rot[3])
        .try_normalize()
        .map_or(Quat::IDENTITY, |axis| {
            Quat::from_axis_angle(axis, rot[0].to_radians())
        })
}

impl Skeleton {
    pub fn new() -> Self {
        Skeleton {
            joints: Vec::new(),
            root: None,
            ids: IdGen::new(JOINT_ID_BASE),
        }
    }

    pub fn num_joints(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    pub fn root(&self) -> Option<JH> {
        self.root
    }

    pub fn joints(&self) -> impl Iterator<Item = JH> + use<> {
        (0..(self.num_joints() as u32)).map(JH::from)
    }

    pub fn is_valid_joint(&self, j: JH) -> bool {
        (j.index() as usize) < self.joints.len()
    }

    pub fn joint(&self, j: JH) -> Result<&Joint> {
        self.joints
            .get(j.index() as usize)
            .ok_or(TopologyError::InvalidJoint(j).into())
    }

    fn joint_mut(&mut self, j: JH) -> Result<&mut Joint> {
        self.joints
            .get_mut(j.index() as usize)
            .ok_or(TopologyError::InvalidJoint(j).into())
    }

    /// Add a joint under `parent`, or as the root if `parent` is `None`. The
    /// bind matrix of the new joint is identity until
    /// [`Skeleton::compute_bind_matrices`] is called.
    pub fn add_joint(
        &mut self,
        parent: Option<JH>,
        name: impl Into<String>,
        pos: Vec3,
        rot: Quat,
    ) -> Result<JH> {
        match parent {
            Some(p) => {
                self.joint(p)?;
            }
            None if self.root.is_some() => return Err(Error::DuplicateRoot),
            None => {}
        }
        let j = JH::from(self.joints.len() as u32);
        self.joints.push(Joint {
            id: self.ids.next_id(),
            name: name.into(),
            pos,
            rot,
            bind: Mat4::IDENTITY,
            parent,
            children: Vec::new(),
        });
        match parent {
            Some(p) => self.joint_mut(p)?.children.push(j),
            None => self.root = Some(j),
        }
        Ok(j)
    }

    pub fn local_transform(&self, j: JH) -> Result<Mat4> {
        Ok(self.joint(j)?.local_transform())
    }

    /// Product of the local transforms from the root down to `j`.
    pub fn world_transform(&self, j: JH) -> Result<Mat4> {
        let mut tmat = Mat4::IDENTITY;
        let mut current = Some(j);
        while let Some(c) = current {
            let joint = self.joint(c)?;
            tmat = joint.local_transform() * tmat;
            current = joint.parent;
        }
        Ok(tmat)
    }

    /// Position of the joint in world space.
    pub fn world_origin(&self, j: JH) -> Result<Vec3> {
        Ok(self.world_transform(j)?.transform_point3(Vec3::ZERO))
    }

    /// Joints with every parent before its children, and siblings in the order
    /// they were added.
    pub fn pre_order(&self) -> Vec<JH> {
        let mut out = Vec::with_capacity(self.joints.len());
        let mut stack: Vec<JH> = self.root.into_iter().collect();
        while let Some(j) = stack.pop() {
            out.push(j);
            stack.extend(self.joints[j.index() as usize].children.iter().rev());
        }
        out
    }

    /// Joints with every child before its parent, and siblings in the order
    /// they were added.
    pub fn post_order(&self) -> Vec<JH> {
        let mut out = Vec::with_capacity(self.joints.len());
        let mut stack: Vec<(JH, bool)> = self.root.map(|r| (r, false)).into_iter().collect();
        while let Some((j, expanded)) = stack.pop() {
            if expanded {
                out.push(j);
                continue;
            }
            stack.push((j, true));
            stack.extend(
                self.joints[j.index() as usize]
                    .children
                    .iter()
                    .rev()
                    .map(|&c| (c, false)),
            );
        }
        out
    }

    /// Store the inverse of the current world transform of every joint as its
    /// bind matrix. Later pose edits do not change the bind matrices.
    pub fn compute_bind_matrices(&mut self) -> Result<()> {
        for j in self.post_order() {
            let bind = self.world_transform(j)?.inverse();
            self.joint_mut(j)?.bind = bind;
        }
        Ok(())
    }

    /// Rotate the joint by `degrees` around `axis`, in its parent's frame. The
    /// new rotation is applied after the current one. A zero axis leaves the
    /// joint as it is.
    pub fn rotate_joint(&mut self, j: JH, axis: Vec3, degrees: f32) -> Result<()> {
        let joint = self.joint_mut(j)?;
        if let Some(axis) = axis.try_normalize() {
            joint.rot = (Quat::from_axis_angle(axis, degrees.to_radians()) * joint.rot).normalize();
        }
        Ok(())
    }

    pub fn set_joint_position(&mut self, j: JH, pos: Vec3) -> Result<()> {
        self.joint_mut(j)?.pos = pos;
        Ok(())
    }

    /// Bind matrices indexed by joint id.
    pub fn bind_matrices(&self) -> Vec<Mat4> {
        self.joints.iter().map(|j| j.bind).collect()
    }

    /// Current world transforms indexed by joint id.
    pub fn world_transforms(&self) -> Result<Vec<Mat4>> {
        self.joints().map(|j| self.world_transform(j)).collect()
    }

    /// Parse a skeleton document and compute its bind pose. A document without
    /// a root produces an empty skeleton.
    pub fn from_json_str(text: &str) -> Result<Self> {
        let to_parse_error =
            |e: serde_json::Error| Error::Parse(ParseError::new(e.line(), e.to_string()));
        // Joint records nest as deep as the hierarchy, so lift serde_json's
        // depth limit and grow the stack on demand instead.
        let mut de = serde_json::Deserializer::from_str(text);
        de.disable_recursion_limit();
        let file = SkeletonFile::deserialize(serde_stacker::Deserializer::new(&mut de))
            .map_err(to_parse_error)?;
        de.end().map_err(to_parse_error)?;
        let mut skeleton = Skeleton::new();
        let mut stack: Vec<(&JointRecord, Option<JH>)> =
            file.root.iter().map(|r| (r, None)).collect();
        while let Some((record, parent)) = stack.pop() {
            let j = skeleton.add_joint(
                parent,
                record.name.as_str(),
                Vec3::from(record.pos),
                axis_angle_to_quat(record.rot),
            )?;
            stack.extend(record.children.iter().rev().map(|c| (c, Some(j))));
        }
        skeleton.compute_bind_matrices()?;
        debug!("Loaded skeleton with {} joints", skeleton.num_joints());
        Ok(skeleton)
    }

    pub fn load_json(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::File {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loading skeleton from {}", path.display());
        Self::from_json_str(&text)
    }
}
