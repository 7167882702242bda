//! Mesh storage, face adjacency and structural validation.

pub mod adjacency;
pub mod mesh;
pub mod validation;

pub use adjacency::{AdjacencyRebuilder, AdjacencyTable, FaceHashRebuilder};
pub use mesh::{Point, Prism, Quad, SolutionField, TetMesh, Tetra};
