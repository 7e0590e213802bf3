/*!
This is the core of a halfedge based polygon mesh editor. It covers importing
polygon meshes, local topological edits, Catmull-Clark subdivision, and binding
a mesh to a skeleton for linear blend skinning.

# Overview

+ A [`Mesh`] stores its vertices, halfedges and faces in an append-only
  [`Topology`] arena. Elements are referred to by typed handles ([`VH`],
  [`HH`], [`FH`]) that index into the arena. Records are never removed one at a
  time; loading a new mesh clears everything and starts the ids over.

+ Every halfedge points at the vertex at its head, the face it borders, the
  next halfedge around that face and, unless it lies on the boundary, its sym:
  the halfedge going the other way along the same edge. These links are only
  set through the linking mutators ([`Mesh::set_vertex`], [`Mesh::set_face`],
  [`Mesh::set_next`], [`Mesh::set_sym`]), which keep the back references of
  vertices and faces consistent. [`Mesh::check_topology`] verifies the whole
  structure.

+ Meshes are read from the line oriented `v` / `f` text format with
  [`Mesh::load_obj`] or [`Mesh::from_obj_str`]. Malformed input is reported as a
  [`ParseError`] with the offending line.

+ Edits: [`Mesh::split_edge`], [`Mesh::triangulate_face`],
  [`Mesh::triangulate`] and, with the `subdiv` feature,
  `Mesh::subdivide_catmull_clark`.

+ With the `skin` feature, a `Skeleton` is read from JSON and
  `Mesh::skin` binds every vertex to its two closest joints.

+ [`Mesh::render_buffers`] flattens the mesh into the per-corner arrays a
  renderer consumes.
*/

mod buffers;
mod check;
mod edit;
mod element;
mod error;
mod ids;
mod iterator;
mod macros;
mod mesh;
mod obj;
mod primitive;
mod topol;

#[cfg(feature = "skin")]
mod skeleton;
#[cfg(feature = "skin")]
mod skin;
#[cfg(feature = "subdiv")]
mod subdiv;

pub use buffers::RenderBuffers;
pub use element::{FH, HH, Handle, HasTopology, Influence, JH, VH};
pub use error::{Error, ParseError, Result, TopologyError};
pub use ids::IdGen;
pub use mesh::Mesh;
pub use topol::{TOPOLOGY_ID_BASE, Topology};

#[cfg(feature = "skin")]
pub use skeleton::{JOINT_ID_BASE, Joint, Skeleton};
#[cfg(feature = "skin")]
pub use skin::blend_weights;
