//! # Glint - GPU particle shader sandbox
//!
//! A small real-time sandbox for live-editable GPU particle simulations.
//! User-supplied WGSL snippets are spliced into built-in templates and
//! compiled into a two-pass pipeline: a simulation pass that advances
//! particle state stored in floating-point textures, and a shade pass that
//! draws one instanced quad per particle.
//!
//! ## Quick start
//!
//! ```ignore
//! use glint::{Sandbox, SandboxConfig, UserSlot};
//!
//! let mut sandbox = Sandbox::new(&device, &queue, SandboxConfig::new(surface_format))?;
//!
//! // Per frame, driven by the host:
//! sandbox.update(time_seconds);
//! sandbox.render(&frame_view, width, height);
//!
//! // Live-edit the simulation:
//! sandbox.set_user_source(UserSlot::Simulation, my_wgsl_snippet);
//! if sandbox.try_compile().is_err() {
//!     // The previous shader keeps running; details are in the error log.
//!     eprintln!("{:?}", sandbox.error_log());
//! }
//! ```
//!
//! ## Core concepts
//!
//! ### User slots
//!
//! Four editable source slots feed three compiled stages: a shared
//! [`Common`](UserSlot::Common) slot spliced everywhere, plus one slot each
//! for the simulation, vertex, and fragment stages. Changing a slot
//! reassembles its module sources immediately; [`Sandbox::try_compile`]
//! validates them CPU-side (via naga) and replaces the pipelines wholesale.
//! A failed compile keeps the last-good programs running.
//!
//! ### Particle state
//!
//! Particle attributes (position, color, auxiliary data) live in
//! `Rgba32Float` textures, one texel per particle. Three generations are
//! kept in a ring; each tick rotates the ring and re-renders the simulation
//! fragment program into the newest slot while the older slots are bound as
//! inputs.
//!
//! ### Pragmas
//!
//! `#pragma size <w> <h>` in the simulation slot sets the particle grid
//! resolution; `#pragma vertexCount <n>` in the vertex slot sets the
//! vertices drawn per particle. Invalid values fall back to the defaults;
//! unknown directives are ignored.

pub mod clock;
pub mod diag;
pub mod error;
pub mod gpu;
pub mod pragma;
pub mod sandbox;
pub mod shaders;
pub mod suite;
pub mod template;
pub mod uniforms;

pub use clock::FrameClock;
pub use diag::{ErrorLog, SharedErrorLog, ERROR_LOG_CAPACITY};
pub use error::{GpuError, SandboxError, ShaderError};
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
pub use gpu::BlendMode;
pub use pragma::{PipelineConfig, Pragma};
pub use sandbox::{Sandbox, SandboxConfig};
pub use suite::{BindingInfo, CompiledPrograms, CompiledStage, ShaderSuite, Stage, UserSlot};
pub use uniforms::{CommonUniforms, ControllerPose, CONTROLLER_COUNT};

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::clock::FrameClock;
    pub use crate::error::{GpuError, SandboxError, ShaderError};
    pub use crate::gpu::BlendMode;
    pub use crate::sandbox::{Sandbox, SandboxConfig};
    pub use crate::suite::{Stage, UserSlot};
    pub use crate::{Mat4, Quat, Vec2, Vec3, Vec4};
}
