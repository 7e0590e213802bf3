use crate::{
    element::{Handle, HH},
    error::Result,
    mesh::Mesh,
};
use glam::{UVec2, Vec2, Vec4};

/// Flat per-corner arrays for drawing a mesh.
///
/// Every face contributes one entry per corner to each attribute array, in
/// the order of its halfedge loop, and a fan of triangles to `indices`. The
/// skin arrays are empty unless the mesh is skinned.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderBuffers {
    /// Positions with `w = 1`.
    pub positions: Vec<Vec4>,
    /// Flat normals with `w = 0`.
    pub normals: Vec<Vec4>,
    /// Face colors with `w = 0`.
    pub colors: Vec<Vec4>,
    pub indices: Vec<u32>,
    /// Ids of the closest and second closest joints.
    pub joint_ids: Vec<UVec2>,
    pub weights: Vec<Vec2>,
}

impl RenderBuffers {
    pub fn num_corners(&self) -> usize {
        self.positions.len()
    }

    pub fn num_triangles(&self) -> usize {
        self.indices.len() / 3
    }
}

impl Mesh {
    /// Normal at the head of `h`, from the cross product of `h` and the
    /// halfedge after it. Zero if the two are parallel.
    fn corner_normal(&self, h: HH) -> Result<glam::Vec3> {
        let n = self.next_halfedge(h)?;
        let e0 = self.point(self.head_vertex(h)?) - self.point(self.tail_vertex(h)?);
        let e1 = self.point(self.head_vertex(n)?) - self.point(self.tail_vertex(n)?);
        Ok(e0.cross(e1).normalize_or_zero())
    }

    /// Build the arrays a renderer needs to draw this mesh.
    pub fn render_buffers(&self) -> Result<RenderBuffers> {
        let mut out = RenderBuffers::default();
        let mut hloop = Vec::new();
        for f in self.faces() {
            self.checked_face_loop(f, &mut hloop)?;
            let color = self.face_color(f).extend(0.0);
            let first = out.positions.len() as u32;
            for &h in &hloop {
                let v = self.head_vertex(h)?;
                out.positions.push(self.point(v).extend(1.0));
                out.normals.push(self.corner_normal(h)?.extend(0.0));
                out.colors.push(color);
                if self.is_skinned() {
                    let (ids, weights) = match self.vertex_influences(v) {
                        [Some(a), Some(b)] => (
                            UVec2::new(a.joint.index(), b.joint.index()),
                            Vec2::new(a.weight, b.weight),
                        ),
                        [Some(a), None] => (UVec2::splat(a.joint.index()), Vec2::new(a.weight, 0.0)),
                        _ => (UVec2::ZERO, Vec2::ZERO),
                    };
                    out.joint_ids.push(ids);
                    out.weights.push(weights);
                }
            }
            for i in 1..(hloop.len() as u32 - 1) {
                out.indices.extend([first, first + i, first + i + 1]);
            }
        }
        Ok(out)
    }
}

#[cfg(test)]
mod test {
    use crate::{macros::assert_vec3_eq, mesh::Mesh};
    use glam::{Vec4Swizzles, vec3};

    #[test]
    fn t_box_buffers() {
        let mesh = Mesh::unit_box().unwrap();
        let buf = mesh.render_buffers().expect("Cannot build buffers");
        assert_eq!(buf.num_corners(), 24);
        assert_eq!(buf.normals.len(), 24);
        assert_eq!(buf.colors.len(), 24);
        assert_eq!(buf.num_triangles(), 12);
        assert!(buf.joint_ids.is_empty() && buf.weights.is_empty());
        assert_eq!(&buf.indices[..6], &[0, 1, 2, 0, 2, 3]);
        assert!(buf.positions.iter().all(|p| p.w == 1.0));
        assert!(buf.normals.iter().all(|n| n.w == 0.0));
        // The bottom face looks down.
        for n in &buf.normals[..4] {
            assert_vec3_eq!(n.xyz(), vec3(0.0, 0.0, -1.0));
        }
        for (i, c) in buf.colors.iter().enumerate() {
            assert_eq!(c.xyz(), mesh.face_color(((i / 4) as u32).into()));
            assert_eq!(c.w, 0.0);
        }
    }

    #[test]
    fn t_fan_indices() {
        let mut mesh = Mesh::from_obj_str(
            "v 0 0 0\nv 1 0 0\nv 2 1 0\nv 1 2 0\nv 0 1 0\nv 0 0 1\nf 1 2 3 4 5\nf 1 5 6\n",
        )
        .unwrap();
        let buf = mesh.render_buffers().unwrap();
        assert_eq!(buf.num_corners(), 8);
        assert_eq!(buf.indices, [0, 1, 2, 0, 2, 3, 0, 3, 4, 5, 6, 7]);
        mesh.triangulate().unwrap();
        let tri = mesh.render_buffers().unwrap();
        assert_eq!(tri.num_triangles(), buf.num_triangles());
    }

    #[cfg(feature = "skin")]
    #[test]
    fn t_skinned_buffers() {
        use crate::skeleton::Skeleton;
        use glam::{Quat, UVec2, Vec2, Vec3};

        let mut mesh = Mesh::unit_box().unwrap();
        let mut skel = Skeleton::new();
        skel.add_joint(None, "only", Vec3::ZERO, Quat::IDENTITY).unwrap();
        mesh.skin(&skel).unwrap();
        let buf = mesh.render_buffers().unwrap();
        assert_eq!(buf.joint_ids.len(), 24);
        assert!(buf.joint_ids.iter().all(|&j| j == UVec2::ZERO));
        assert!(buf.weights.iter().all(|&w| w == Vec2::new(1.0, 0.0)));
    }
}
