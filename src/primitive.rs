use crate::{
    error::Result,
    mesh::Mesh,
    obj::{PolygonRecord, build_mesh},
};
use glam::Vec3;

impl Mesh {
    /// Create a mesh from vertex positions and polygons given as zero based
    /// indices into `positions`. Polygons are validated the same way as faces
    /// read from a file; the reported line of an error is the 1-based position
    /// of the polygon in `faces`.
    pub fn from_polygons<F>(positions: &[Vec3], faces: &[F]) -> Result<Self>
    where
        F: AsRef<[u32]>,
    {
        let polygons: Vec<PolygonRecord> = faces
            .iter()
            .enumerate()
            .map(|(i, f)| PolygonRecord {
                line: i + 1,
                indices: f.as_ref().to_vec(),
            })
            .collect();
        build_mesh(positions, &polygons)
    }

    /// Makes a box with the following topology, spanning from the min point to
    /// the max point.
    ///
    ///  ```text
    ///       7-----------6
    ///      /|          /|
    ///     / |         / |
    ///    4-----------5  |
    ///    |  |        |  |
    ///    |  3--------|--2
    ///    | /         | /
    ///    |/          |/
    ///    0-----------1
    ///  ```
    pub fn quad_box(min: Vec3, max: Vec3) -> Result<Self> {
        const BOX_POS: [(bool, bool, bool); 8] = [
            (false, false, false),
            (true, false, false),
            (true, true, false),
            (false, true, false),
            (false, false, true),
            (true, false, true),
            (true, true, true),
            (false, true, true),
        ];
        const BOX_IDX: [[u32; 4]; 6] = [
            [0, 3, 2, 1],
            [0, 1, 5, 4],
            [1, 2, 6, 5],
            [2, 3, 7, 6],
            [3, 0, 4, 7],
            [4, 5, 6, 7],
        ];
        let pos = BOX_POS.map(|(xf, yf, zf)| {
            Vec3::new(
                if xf { max.x } else { min.x },
                if yf { max.y } else { min.y },
                if zf { max.z } else { min.z },
            )
        });
        Self::from_polygons(&pos, &BOX_IDX)
    }

    /// Create a mesh representing a box with quadrilateral faces, of size 1,
    /// spanning from the origin to (1, 1, 1).
    pub fn unit_box() -> Result<Self> {
        Self::quad_box(Vec3::ZERO, Vec3::ONE)
    }
}

#[cfg(test)]
mod test {
    use crate::{
        error::{Error, ParseError},
        mesh::Mesh,
    };
    use arrayvec::ArrayVec;
    use glam::vec3;

    #[test]
    fn t_quad_box() {
        let mesh = Mesh::quad_box(vec3(-1.0, -2.0, -3.0), vec3(1.0, 2.0, 3.0))
            .expect("Cannot create box");
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_halfedges(), 24);
        assert_eq!(mesh.num_faces(), 6);
        mesh.check_topology().expect("Topological errors found");
        assert_eq!(mesh.point(0.into()), vec3(-1.0, -2.0, -3.0));
        assert_eq!(mesh.point(6.into()), vec3(1.0, 2.0, 3.0));
        // Every face is wound so that its normal points out of the box.
        let center = mesh.vertices().map(|v| mesh.point(v)).sum::<glam::Vec3>() / 8.0;
        for f in mesh.faces() {
            let pts: ArrayVec<glam::Vec3, 4> = mesh.fv_iter(f).map(|v| mesh.point(v)).collect();
            let normal = (pts[1] - pts[0]).cross(pts[2] - pts[1]);
            let fcenter = pts.iter().sum::<glam::Vec3>() / 4.0;
            assert!(normal.dot(fcenter - center) > 0.0);
        }
    }

    #[test]
    fn t_polygons_out_of_range() {
        let pos = [vec3(0.0, 0.0, 0.0), vec3(1.0, 0.0, 0.0), vec3(0.0, 1.0, 0.0)];
        let faces: [&[u32]; 2] = [&[0, 1, 2], &[0, 2, 3]];
        assert!(matches!(
            Mesh::from_polygons(&pos, &faces),
            Err(Error::Parse(ParseError { line: 2, .. }))
        ));
        let faces: [Vec<u32>; 1] = [vec![0, 1]];
        assert!(matches!(
            Mesh::from_polygons(&pos, &faces),
            Err(Error::Parse(ParseError { line: 1, .. }))
        ));
    }
}
