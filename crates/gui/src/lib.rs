// Library crate: exposes testable modules for integration tests.
// GUI-specific modules (app, ui, viewport rendering) remain in the binary crate.

pub mod export;
pub mod fixtures;
pub mod generate;
pub mod harness;
pub mod ingest;
pub mod state;
pub mod validation;

/// Subset of viewport types needed by ingest/export (MeshData, Aabb).
/// The full viewport (camera, renderer, panel) stays in the binary crate.
pub mod viewport {
    pub mod mesh;
}
