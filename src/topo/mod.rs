//! Arena-based half-edge topology.

mod edit;
mod store;
mod types;
pub mod validate;

pub use store::HalfEdgeMesh;
pub use types::{EdgeId, Face, FaceId, HalfEdge, HalfEdgeId, Vertex, VertexId};
pub use validate::{is_closed, validate, ValidationResult};
