//! Embedded WGSL: stage templates, the shared uniform block, and the
//! default user sources.
//!
//! The templates carry literal `{{...}}` markers on comment lines; the
//! marker strings below are the split points used by the assembler. Texture
//! binding indices 0..5 and the uniform binding are fixed agreements between
//! `common_uniforms.wgsl` and the pipeline code in [`crate::gpu`].

/// Splice marker of the simulation fragment template.
pub const SIMULATION_MARKER: &str = "{{simulation}}";
/// Splice marker of the shade vertex template.
pub const VERTEX_MARKER: &str = "{{vertex}}";
/// Splice marker of the shade fragment template.
pub const FRAGMENT_MARKER: &str = "{{fragment}}";

/// Uniform block and state texture declarations shared by every stage.
pub const COMMON_UNIFORMS_WGSL: &str = include_str!("shaders/common_uniforms.wgsl");

/// Fixed fullscreen-triangle vertex stage of the simulation pass.
pub const SIMULATION_VS_WGSL: &str = include_str!("shaders/simulate_vs.wgsl");

/// Simulation fragment template (user slot: `simulate`).
pub const SIMULATION_FS_TEMPLATE: &str = include_str!("shaders/simulate_fs.wgsl");
/// Shade vertex template (user slot: `shade_vertex`).
pub const SHADE_VS_TEMPLATE: &str = include_str!("shaders/shade_vs.wgsl");
/// Shade fragment template (user slot: `shade_fragment`).
pub const SHADE_FS_TEMPLATE: &str = include_str!("shaders/shade_fs.wgsl");

/// Default contents of the shared user slot.
pub const USER_DEFAULT_COMMON: &str = include_str!("shaders/default_common.wgsl");
/// Default contents of the simulation user slot.
pub const USER_DEFAULT_SIMULATION: &str = include_str!("shaders/default_simulation.wgsl");
/// Default contents of the vertex user slot.
pub const USER_DEFAULT_VERTEX: &str = include_str!("shaders/default_vertex.wgsl");
/// Default contents of the fragment user slot.
pub const USER_DEFAULT_FRAGMENT: &str = include_str!("shaders/default_fragment.wgsl");
