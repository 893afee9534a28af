//! Procedural generation.
//!
//! - Trigonometric noise
//! - Island terrain height formula and disc meshes
//! - Low-poly props (rocks, boulders, trees)
//!
//! Nothing in here touches the ECS; the world plugin turns the results into entities.

pub mod mesh;
pub mod noise;
pub mod shapes;
pub mod terrain;

pub use mesh::MeshData;
pub use terrain::{terrain_height, BASE_ELEVATION, NO_GROUND};
