use crate::{
    element::{Handle, Influence, JH},
    error::{Error, Result, TopologyError},
    mesh::Mesh,
    skeleton::Skeleton,
};
use glam::{Mat4, Vec3};
use tracing::debug;

/// Weights of the closest and second closest joints at distances `d0 <= d1`.
///
/// Each joint gets `1 - d / (d0 + d1)`. When both distances are zero the
/// joints share the vertex equally.
pub fn blend_weights(d0: f32, d1: f32) -> (f32, f32) {
    let sum = d0 + d1;
    if sum > 0.0 {
        (1.0 - d0 / sum, 1.0 - d1 / sum)
    } else {
        (0.5, 0.5)
    }
}

/// The two joints closest to `pos`, visiting joints in the order given. A
/// joint replaces the closest one only if it is strictly closer, and the old
/// closest becomes the second closest.
fn nearest_two(pos: Vec3, origins: &[(JH, Vec3)]) -> [Option<Influence>; 2] {
    let mut closest: Option<(JH, f32)> = None;
    let mut second: Option<(JH, f32)> = None;
    for &(j, origin) in origins {
        let d = pos.distance(origin);
        match (closest, second) {
            (None, _) => closest = Some((j, d)),
            (Some((_, d0)), _) if d < d0 => {
                second = closest;
                closest = Some((j, d));
            }
            (_, None) => second = Some((j, d)),
            (_, Some((_, d1))) if d < d1 => second = Some((j, d)),
            _ => {}
        }
    }
    match (closest, second) {
        (Some((j0, d0)), Some((j1, d1))) => {
            let (w0, w1) = blend_weights(d0, d1);
            [
                Some(Influence { joint: j0, weight: w0 }),
                Some(Influence { joint: j1, weight: w1 }),
            ]
        }
        (Some((j0, _)), None) => [Some(Influence { joint: j0, weight: 1.0 }), None],
        _ => [None, None],
    }
}

impl Mesh {
    /// Bind every vertex to the two joints of `skeleton` closest to it.
    ///
    /// Joint distances are measured to the world space origin of each joint in
    /// its current pose. The mesh is marked as skinned only once every vertex
    /// has its influences.
    pub fn skin(&mut self, skeleton: &Skeleton) -> Result<()> {
        if skeleton.is_empty() {
            return Err(Error::EmptySkeleton);
        }
        let origins = skeleton
            .pre_order()
            .into_iter()
            .map(|j| -> Result<(JH, Vec3)> { Ok((j, skeleton.world_origin(j)?)) })
            .collect::<Result<Vec<_>>>()?;
        let influences: Vec<[Option<Influence>; 2]> = self
            .vertices()
            .map(|v| nearest_two(self.point(v), &origins))
            .collect();
        for (v, infl) in self.vertices().zip(influences) {
            self.topol.set_vertex_influences(v, infl);
        }
        self.skinned = true;
        debug!(
            "Skinned {} vertices to {} joints",
            self.num_vertices(),
            skeleton.num_joints()
        );
        Ok(())
    }

    /// Vertex positions deformed by linear blend skinning: each vertex is
    /// moved by `sum(w * world * bind)` over its influences. Returns the rest
    /// positions if the mesh is not skinned.
    pub fn deformed_positions(&self, skeleton: &Skeleton) -> Result<Vec<Vec3>> {
        if !self.skinned {
            return Ok(self.vertices().map(|v| self.point(v)).collect());
        }
        let skin_mats: Vec<Mat4> = skeleton
            .world_transforms()?
            .into_iter()
            .zip(skeleton.bind_matrices())
            .map(|(world, bind)| world * bind)
            .collect();
        self.vertices()
            .map(|v| -> Result<Vec3> {
                let p = self.point(v);
                let mut out = Vec3::ZERO;
                for infl in self.vertex_influences(v).into_iter().flatten() {
                    let mat = skin_mats
                        .get(infl.joint.index() as usize)
                        .ok_or(TopologyError::InvalidJoint(infl.joint))?;
                    out += mat.transform_point3(p) * infl.weight;
                }
                Ok(out)
            })
            .collect()
    }
}
