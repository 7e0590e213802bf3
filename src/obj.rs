/*!
Mesh import from the line-oriented text format:

```text
v x y z            vertex position, referenced by its 1-based position in the file
f i1 i2 ... ik     face with k >= 3 vertex references; `i/...` suffixes are ignored
```

Everything else, and every line shorter than 2 characters, is ignored.
*/

use crate::{
    element::{Handle, HH, VH},
    error::{Error, ParseError, Result},
    mesh::Mesh,
};
use std::{collections::HashMap, path::Path};
use tracing::debug;

/// A polygon waiting to be added to the mesh, with zero based vertex indices
/// and the line it came from for error reporting.
pub(crate) struct PolygonRecord {
    pub(crate) line: usize,
    pub(crate) indices: Vec<u32>,
}

/// Canonical key of the undirected edge between two vertices. Built from the
/// vertex indices so the pairing does not depend on where records live.
fn edge_key(a: VH, b: VH) -> (u32, u32) {
    let (a, b) = (a.index(), b.index());
    if a < b { (a, b) } else { (b, a) }
}

fn parse_f32(token: &str, line: usize) -> Result<f32> {
    token
        .parse::<f32>()
        .map_err(|_| ParseError::new(line, format!("'{token}' is not a number")).into())
}

fn parse_vertex_ref(token: &str, line: usize) -> Result<u32> {
    let idx = token.split('/').next().unwrap_or(token);
    match idx.parse::<u32>() {
        Ok(0) => Err(ParseError::new(line, "vertex indices start at 1").into()),
        Ok(i) => Ok(i - 1),
        Err(_) => Err(ParseError::new(line, format!("'{token}' is not a vertex index")).into()),
    }
}

/// Parse the whole text before touching any mesh.
fn parse_records(text: &str) -> Result<(Vec<glam::Vec3>, Vec<PolygonRecord>)> {
    let mut positions = Vec::new();
    let mut polygons = Vec::new();
    for (li, raw) in text.lines().enumerate() {
        let line = li + 1;
        if raw.len() < 2 {
            continue;
        }
        let mut tokens = raw.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let coords = tokens
                    .map(|t| parse_f32(t, line))
                    .collect::<Result<Vec<_>>>()?;
                // An optional fourth (w) coordinate is allowed and ignored.
                if coords.len() != 3 && coords.len() != 4 {
                    return Err(ParseError::new(
                        line,
                        format!("expected 3 coordinates, found {}", coords.len()),
                    )
                    .into());
                }
                positions.push(glam::vec3(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                let indices = tokens
                    .map(|t| parse_vertex_ref(t, line))
                    .collect::<Result<Vec<_>>>()?;
                polygons.push(PolygonRecord { line, indices });
            }
            _ => {} // Normals, texture coordinates, groups, comments etc.
        }
    }
    Ok((positions, polygons))
}

/// Build a mesh from positions and polygons. Vertices are created first, then
/// one halfedge per polygon side, then each halfedge is paired with the one
/// seen earlier on the same undirected edge.
pub(crate) fn build_mesh(positions: &[glam::Vec3], polygons: &[PolygonRecord]) -> Result<Mesh> {
    let nverts = positions.len();
    for poly in polygons {
        if poly.indices.len() < 3 {
            return Err(ParseError::new(
                poly.line,
                format!("a face needs at least 3 vertices, found {}", poly.indices.len()),
            )
            .into());
        }
        if let Some(&bad) = poly.indices.iter().find(|&&i| i as usize >= nverts) {
            return Err(ParseError::new(
                poly.line,
                format!("vertex index {} is out of range (1..={nverts})", bad + 1),
            )
            .into());
        }
        let n = poly.indices.len();
        if (0..n).any(|i| poly.indices[i] == poly.indices[(i + 1) % n]) {
            return Err(ParseError::new(poly.line, "a face repeats a vertex along one side").into());
        }
    }
    let nhalfedges = polygons.iter().map(|p| p.indices.len()).sum();
    let mut mesh = Mesh::with_capacity(nverts, nhalfedges, polygons.len());
    let verts: Vec<VH> = positions.iter().map(|p| mesh.add_vertex(*p)).collect();
    let mut seen: HashMap<(u32, u32), HH> = HashMap::with_capacity(nhalfedges / 2 + 1);
    let mut hloop: Vec<HH> = Vec::new();
    for poly in polygons {
        let f = mesh.add_face();
        let n = poly.indices.len();
        hloop.clear();
        for i in 0..n {
            let from = verts[poly.indices[i] as usize];
            let to = verts[poly.indices[(i + 1) % n] as usize];
            let h = mesh.add_halfedge();
            mesh.topol.link_vertex(h, to);
            mesh.topol.link_face(h, f);
            match seen.get(&edge_key(from, to)) {
                None => {
                    seen.insert(edge_key(from, to), h);
                }
                Some(&other) => {
                    if mesh.sym_halfedge(other).is_some() {
                        return Err(ParseError::new(
                            poly.line,
                            format!(
                                "edge ({}, {}) is shared by more than two faces",
                                from.index() + 1,
                                to.index() + 1
                            ),
                        )
                        .into());
                    }
                    if mesh.head_vertex(other)? == to {
                        return Err(ParseError::new(
                            poly.line,
                            format!(
                                "edge ({}, {}) is traversed in the same direction by two faces",
                                from.index() + 1,
                                to.index() + 1
                            ),
                        )
                        .into());
                    }
                    mesh.topol.link_sym(h, other);
                }
            }
            hloop.push(h);
        }
        for i in 0..n {
            mesh.topol.link_next(hloop[i], hloop[(i + 1) % n]);
        }
    }
    debug!(
        "Imported mesh: {} vertices, {} halfedges, {} faces",
        mesh.num_vertices(),
        mesh.num_halfedges(),
        mesh.num_faces()
    );
    Ok(mesh)
}

impl Mesh {
    /// Parse a mesh from text. Nothing is built unless every record is valid.
    pub fn from_obj_str(text: &str) -> Result<Self> {
        let (positions, polygons) = parse_records(text)?;
        build_mesh(&positions, &polygons)
    }

    pub fn load_obj(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::File {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loading mesh from {}", path.display());
        Self::from_obj_str(&text)
    }

    /// Replace the contents of this mesh with the mesh in the file. Ids start
    /// over from their base. On failure the mesh is left as it was.
    pub fn reload_obj(&mut self, path: &Path) -> Result<()> {
        *self = Self::load_obj(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::{
        element::{Handle, HH},
        error::{Error, ParseError},
        mesh::Mesh,
        topol::TOPOLOGY_ID_BASE,
    };
    use std::path::Path;

    const CUBE_OBJ: &str = "\
# unit cube
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
v 0 0 1
v 1 0 1
v 1 1 1
v 0 1 1
vn 0 0 1
f 1/1/1 4/1/1 3/1/1 2/1/1
f 1 2 6 5
f 2 3 7 6
f 3 4 8 7
f 4 1 5 8
f 5 6 7 8
";

    fn parse_error_line(result: Result<Mesh, Error>) -> usize {
        match result {
            Err(Error::Parse(ParseError { line, .. })) => line,
            Err(e) => panic!("Expected a parse error, got {e}"),
            Ok(_) => panic!("Expected a parse error"),
        }
    }

    #[test]
    fn t_cube_import() {
        let mesh = Mesh::from_obj_str(CUBE_OBJ).expect("Cannot import cube");
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_halfedges(), 24);
        assert_eq!(mesh.num_faces(), 6);
        mesh.check_topology().expect("Topological errors found");
        assert!(mesh.halfedges().all(|h| mesh.sym_halfedge(h).is_some()));
        for f in mesh.faces() {
            assert_eq!(mesh.face_valence(f).unwrap(), 4);
        }
        assert_eq!(mesh.point(6.into()), glam::vec3(1.0, 1.0, 1.0));
    }

    #[test]
    fn t_sym_pairing_is_deterministic() {
        let a = Mesh::from_obj_str(CUBE_OBJ).unwrap();
        let b = Mesh::from_obj_str(CUBE_OBJ).unwrap();
        for h in a.halfedges() {
            assert_eq!(a.sym_halfedge(h), b.sym_halfedge(h));
            assert_eq!(a.halfedge_id(h), b.halfedge_id(h));
        }
        assert_eq!(a.vertex_id(0.into()), TOPOLOGY_ID_BASE);
        assert_eq!(a.face_id(5.into()), TOPOLOGY_ID_BASE + 5);
    }

    #[test]
    fn t_face_halfedges() {
        let mesh = Mesh::from_obj_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        // The face refers to its last halfedge, which points at the first vertex.
        let h = mesh.face_halfedge(0.into()).unwrap();
        assert_eq!(h, HH::from(2));
        assert_eq!(mesh.head_vertex(h).unwrap().index(), 0);
        assert_eq!(mesh.tail_vertex(h).unwrap().index(), 2);
        // Boundary edges are legal and have no sym.
        assert!(mesh.halfedges().all(|h| mesh.sym_halfedge(h).is_none()));
        mesh.check_topology().unwrap();
    }

    #[test]
    fn t_malformed_records() {
        assert_eq!(parse_error_line(Mesh::from_obj_str("v 0 0 0\nv 1 x 0\n")), 2);
        assert_eq!(parse_error_line(Mesh::from_obj_str("v 0 0\n")), 1);
        assert_eq!(
            parse_error_line(Mesh::from_obj_str("v 0 0 0\nv 1 0 0\nv 0 1 0\n\nf 1 2\n")),
            5
        );
        assert_eq!(
            parse_error_line(Mesh::from_obj_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 4\n")),
            4
        );
        assert_eq!(
            parse_error_line(Mesh::from_obj_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 b 3\n")),
            4
        );
        assert_eq!(
            parse_error_line(Mesh::from_obj_str("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n")),
            4
        );
    }

    #[test]
    fn t_non_manifold_edges() {
        // Both triangles go 1 -> 2.
        let flipped = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 -1 0\nf 1 2 3\nf 1 2 4\n";
        assert_eq!(parse_error_line(Mesh::from_obj_str(flipped)), 6);
        // Three triangles on the edge 1-2.
        let fan = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 0 -1 0\nv 0 0 1\nf 1 2 3\nf 2 1 4\nf 1 2 5\n";
        assert_eq!(parse_error_line(Mesh::from_obj_str(fan)), 8);
    }

    #[test]
    fn t_short_and_unknown_lines_ignored() {
        let text = "#\n\nv 0 0 0\nvt 0 0\nv 1 0 0\no thing\nv 0 1 0\ns\nf 1 2 3\n";
        let mesh = Mesh::from_obj_str(text).unwrap();
        assert_eq!((3, 3, 1), (mesh.num_vertices(), mesh.num_halfedges(), mesh.num_faces()));
    }

    #[test]
    fn t_missing_file() {
        let err = Mesh::load_obj(Path::new("/nonexistent/mesh.obj"));
        assert!(matches!(err, Err(Error::File { .. })));
    }

    #[test]
    fn t_reload_restarts_ids() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("halfmesh_reload_{}.obj", std::process::id()));
        std::fs::write(&path, CUBE_OBJ).unwrap();
        let mut mesh = Mesh::load_obj(&path).unwrap();
        mesh.split_edge(0.into()).unwrap();
        mesh.triangulate().unwrap();
        assert_eq!(mesh.num_vertices(), 9);
        assert_eq!(mesh.num_faces(), 14);
        mesh.reload_obj(&path).unwrap();
        let fresh = Mesh::load_obj(&path).unwrap();
        assert_eq!(mesh.num_vertices(), 8);
        assert_eq!(mesh.num_halfedges(), 24);
        assert_eq!(mesh.num_faces(), fresh.num_faces());
        for v in mesh.vertices() {
            assert_eq!(mesh.vertex_id(v), fresh.vertex_id(v));
        }
        for f in mesh.faces() {
            assert_eq!(mesh.face_color(f), fresh.face_color(f));
        }
        // A failed reload leaves the mesh untouched.
        assert!(mesh.reload_obj(Path::new("/nonexistent/mesh.obj")).is_err());
        assert_eq!(mesh.num_vertices(), 8);
        std::fs::remove_file(&path).unwrap();
    }
}
