//! User shader slots, template assembly, and CPU-side compilation.
//!
//! A [`ShaderSuite`] owns everything about shader source that does not touch
//! the GPU: the split templates, the four editable user slots, the assembled
//! module sources (kept consistent with the slots at all times), and the
//! last successfully compiled program set. Compilation here means parsing
//! and validating the assembled WGSL with naga; the sandbox only builds wgpu
//! pipelines from sources that already passed.

use crate::error::ShaderError;
use crate::pragma::{self, PipelineConfig};
use crate::shaders;
use crate::template::{self, SplitTemplate};

/// Editable user source slots, in host index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSlot {
    /// Shared code spliced into every stage.
    Common,
    /// Body of the simulation stage (`fn simulate`).
    Simulation,
    /// Body of the shade vertex stage (`fn shade_vertex`).
    Vertex,
    /// Body of the shade fragment stage (`fn shade_fragment`).
    Fragment,
}

impl UserSlot {
    pub const ALL: [UserSlot; 4] = [
        UserSlot::Common,
        UserSlot::Simulation,
        UserSlot::Vertex,
        UserSlot::Fragment,
    ];

    pub fn index(self) -> usize {
        match self {
            UserSlot::Common => 0,
            UserSlot::Simulation => 1,
            UserSlot::Vertex => 2,
            UserSlot::Fragment => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Compiled shader stages, in assembly order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Fragment stage of the simulation pass.
    Simulation,
    /// Vertex stage of the shade pass.
    Vertex,
    /// Fragment stage of the shade pass.
    Fragment,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Simulation, Stage::Vertex, Stage::Fragment];

    pub fn index(self) -> usize {
        match self {
            Stage::Simulation => 0,
            Stage::Vertex => 1,
            Stage::Fragment => 2,
        }
    }

    /// The user slot spliced into this stage (besides the shared slot).
    pub fn user_slot(self) -> UserSlot {
        match self {
            Stage::Simulation => UserSlot::Simulation,
            Stage::Vertex => UserSlot::Vertex,
            Stage::Fragment => UserSlot::Fragment,
        }
    }

    fn template(self) -> &'static str {
        match self {
            Stage::Simulation => shaders::SIMULATION_FS_TEMPLATE,
            Stage::Vertex => shaders::SHADE_VS_TEMPLATE,
            Stage::Fragment => shaders::SHADE_FS_TEMPLATE,
        }
    }

    fn marker(self) -> &'static str {
        match self {
            Stage::Simulation => shaders::SIMULATION_MARKER,
            Stage::Vertex => shaders::VERTEX_MARKER,
            Stage::Fragment => shaders::FRAGMENT_MARKER,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Simulation => "simulation",
            Stage::Vertex => "vertex",
            Stage::Fragment => "fragment",
        };
        f.write_str(name)
    }
}

/// One reflected resource binding of a compiled stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingInfo {
    pub name: String,
    pub group: u32,
    pub binding: u32,
}

/// One validated stage: its source text plus the reflected interface.
#[derive(Debug, Clone)]
pub struct CompiledStage {
    /// The exact assembled source the validation ran on.
    pub source: String,
    /// Named resource bindings (group/binding pairs), reflection order.
    pub bindings: Vec<BindingInfo>,
    /// Entry point names declared by the module.
    pub entry_points: Vec<String>,
}

impl CompiledStage {
    /// Look up a binding by its global name.
    pub fn binding(&self, name: &str) -> Option<&BindingInfo> {
        self.bindings.iter().find(|b| b.name == name)
    }
}

/// A complete validated program set, replaced wholesale on recompilation.
#[derive(Debug, Clone)]
pub struct CompiledPrograms {
    stages: [CompiledStage; 3],
    /// Pipeline parameters declared by the sources via pragmas.
    pub config: PipelineConfig,
}

impl CompiledPrograms {
    pub fn stage(&self, stage: Stage) -> &CompiledStage {
        &self.stages[stage.index()]
    }
}

/// Shader source state: templates, user slots, assembled modules, and the
/// last-good compiled set.
#[derive(Debug)]
pub struct ShaderSuite {
    templates: [SplitTemplate; 3],
    user_sources: [String; 4],
    assembled: [String; 3],
    compiled: Option<CompiledPrograms>,
}

impl ShaderSuite {
    /// Build the suite with the built-in default user sources installed.
    ///
    /// Fails only if an embedded template is missing its marker, which is a
    /// defect in the build rather than a runtime condition.
    pub fn new() -> Result<Self, ShaderError> {
        let templates = [
            template::split(Stage::Simulation.template(), Stage::Simulation.marker())?,
            template::split(Stage::Vertex.template(), Stage::Vertex.marker())?,
            template::split(Stage::Fragment.template(), Stage::Fragment.marker())?,
        ];

        let mut suite = Self {
            templates,
            user_sources: [
                shaders::USER_DEFAULT_COMMON.to_owned(),
                shaders::USER_DEFAULT_SIMULATION.to_owned(),
                shaders::USER_DEFAULT_VERTEX.to_owned(),
                shaders::USER_DEFAULT_FRAGMENT.to_owned(),
            ],
            assembled: [String::new(), String::new(), String::new()],
            compiled: None,
        };
        for stage in Stage::ALL {
            suite.reassemble(stage);
        }
        Ok(suite)
    }

    /// Current text of a user slot.
    pub fn user_source(&self, slot: UserSlot) -> &str {
        &self.user_sources[slot.index()]
    }

    /// Replace a user slot and reassemble every source that splices it.
    ///
    /// Assembly is eager so [`assembled_source`](Self::assembled_source)
    /// never serves text that is stale relative to the slots. Compilation
    /// stays a separate, explicit step.
    pub fn set_user_source(&mut self, slot: UserSlot, source: impl Into<String>) {
        self.user_sources[slot.index()] = source.into();
        match slot {
            UserSlot::Common => {
                for stage in Stage::ALL {
                    self.reassemble(stage);
                }
            }
            UserSlot::Simulation => self.reassemble(Stage::Simulation),
            UserSlot::Vertex => self.reassemble(Stage::Vertex),
            UserSlot::Fragment => self.reassemble(Stage::Fragment),
        }
    }

    /// The assembled module source for a stage.
    pub fn assembled_source(&self, stage: Stage) -> &str {
        &self.assembled[stage.index()]
    }

    /// The last successfully compiled program set, if any.
    pub fn compiled(&self) -> Option<&CompiledPrograms> {
        self.compiled.as_ref()
    }

    /// Validate the assembled sources and swap in a new program set.
    ///
    /// All three stages must pass; the first failure is returned and the
    /// previous compiled set - sources, reflection tables, and pipeline
    /// config alike - is left untouched. Pragmas are applied only after
    /// every stage validated, so a broken source cannot install a partial
    /// configuration either.
    pub fn try_compile(&mut self) -> Result<&CompiledPrograms, ShaderError> {
        let simulation = self.compile_stage(Stage::Simulation)?;
        let vertex = self.compile_stage(Stage::Vertex)?;
        let fragment = self.compile_stage(Stage::Fragment)?;

        let mut config = self
            .compiled
            .as_ref()
            .map(|c| c.config)
            .unwrap_or_default();
        config.apply_simulation_pragmas(self.user_source(UserSlot::Simulation));
        config.apply_vertex_pragmas(self.user_source(UserSlot::Vertex));

        tracing::debug!(
            "compiled shader programs; grid {}x{}, {} vertices per particle",
            config.grid_size[0],
            config.grid_size[1],
            config.vertex_count
        );

        Ok(self.compiled.insert(CompiledPrograms {
            stages: [simulation, vertex, fragment],
            config,
        }))
    }

    fn reassemble(&mut self, stage: Stage) {
        let split = &self.templates[stage.index()];
        // Pragma lines configure the host, not the GPU; comment them out so
        // the spliced module stays valid WGSL.
        let user_common = pragma::comment_out(self.user_source(UserSlot::Common));
        let user = pragma::comment_out(self.user_source(stage.user_slot()));

        self.assembled[stage.index()] = template::assemble(
            &split.prefix,
            shaders::COMMON_UNIFORMS_WGSL,
            &user_common,
            &user,
            &split.postfix,
        );
    }

    fn compile_stage(&self, stage: Stage) -> Result<CompiledStage, ShaderError> {
        let source = self.assembled_source(stage);

        let module = naga::front::wgsl::parse_str(source).map_err(|e| ShaderError::Parse {
            stage,
            message: e.to_string(),
        })?;

        let mut validator = naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        );
        validator
            .validate(&module)
            .map_err(|e| ShaderError::Validation {
                stage,
                message: format!("{:?}", e),
            })?;

        let bindings = module
            .global_variables
            .iter()
            .filter_map(|(_, var)| match (&var.name, &var.binding) {
                (Some(name), Some(rb)) => Some(BindingInfo {
                    name: name.clone(),
                    group: rb.group,
                    binding: rb.binding,
                }),
                _ => None,
            })
            .collect();
        let entry_points = module.entry_points.iter().map(|ep| ep.name.clone()).collect();

        Ok(CompiledStage {
            source: source.to_owned(),
            bindings,
            entry_points,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pragma::DEFAULT_GRID_SIZE;

    #[test]
    fn test_default_sources_compile() {
        let mut suite = ShaderSuite::new().unwrap();
        suite.try_compile().expect("built-in defaults must validate");

        let programs = suite.compiled().unwrap();
        assert_eq!(programs.config.grid_size, [256, 256]);
        assert_eq!(programs.config.vertex_count, 6);
    }

    #[test]
    fn test_entry_points_and_bindings_are_reflected() {
        let mut suite = ShaderSuite::new().unwrap();
        suite.try_compile().unwrap();
        let programs = suite.compiled().unwrap();

        let sim = programs.stage(Stage::Simulation);
        assert_eq!(sim.entry_points, ["fs_main"]);

        let uniforms = sim.binding("u").expect("uniform block reflected");
        assert_eq!((uniforms.group, uniforms.binding), (0, 0));

        let vertex = programs.stage(Stage::Vertex);
        let tex = vertex.binding("state_position").unwrap();
        assert_eq!((tex.group, tex.binding), (1, 0));
        let prev = vertex.binding("prev_data").unwrap();
        assert_eq!((prev.group, prev.binding), (1, 5));
    }

    #[test]
    fn test_set_user_source_reassembles() {
        let mut suite = ShaderSuite::new().unwrap();
        suite.set_user_source(UserSlot::Fragment, "fn shade_fragment(v: VertexOutput) -> vec4<f32> { return v.color; }");

        assert!(suite
            .assembled_source(Stage::Fragment)
            .contains("return v.color;"));
        // Other stages keep their assembled text.
        assert!(suite
            .assembled_source(Stage::Simulation)
            .contains("fn simulate"));
    }

    #[test]
    fn test_common_slot_reaches_every_stage() {
        let mut suite = ShaderSuite::new().unwrap();
        suite.set_user_source(UserSlot::Common, "fn shared_helper() -> f32 { return 1.0; }");

        for stage in Stage::ALL {
            assert!(suite.assembled_source(stage).contains("shared_helper"));
        }
    }

    #[test]
    fn test_failed_compile_keeps_last_good_programs() {
        let mut suite = ShaderSuite::new().unwrap();
        suite.try_compile().unwrap();
        let before = suite.compiled().unwrap().clone();

        suite.set_user_source(UserSlot::Simulation, "fn simulate( this is not wgsl");
        let err = suite.try_compile().unwrap_err();
        assert!(matches!(err, ShaderError::Parse { stage: Stage::Simulation, .. }));

        let after = suite.compiled().unwrap();
        assert_eq!(after.stage(Stage::Simulation).source, before.stage(Stage::Simulation).source);
        assert_eq!(after.config, before.config);
    }

    #[test]
    fn test_failed_compile_does_not_apply_pragmas() {
        let mut suite = ShaderSuite::new().unwrap();
        suite.try_compile().unwrap();

        // Valid pragma, broken code: the grid declaration must not land.
        suite.set_user_source(
            UserSlot::Simulation,
            "#pragma size 8 8\nfn simulate( broken",
        );
        assert!(suite.try_compile().is_err());
        assert_eq!(suite.compiled().unwrap().config.grid_size, [256, 256]);
    }

    #[test]
    fn test_type_mismatch_names_the_failing_stage() {
        let mut suite = ShaderSuite::new().unwrap();
        // Well-formed declaration, wrong type for the template's call site.
        suite.set_user_source(
            UserSlot::Fragment,
            "fn shade_fragment(v: VertexOutput) -> f32 { return 1.0; }",
        );

        match suite.try_compile().unwrap_err() {
            ShaderError::Parse { stage, .. } | ShaderError::Validation { stage, .. } => {
                assert_eq!(stage, Stage::Fragment)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_size_pragma_falls_back_to_default() {
        let mut suite = ShaderSuite::new().unwrap();
        let simulation = suite.user_source(UserSlot::Simulation).to_owned();
        suite.set_user_source(
            UserSlot::Simulation,
            simulation.replace("#pragma size 256 256", "#pragma size abc 10"),
        );

        suite.try_compile().unwrap();
        assert_eq!(suite.compiled().unwrap().config.grid_size, DEFAULT_GRID_SIZE);
    }

    #[test]
    fn test_assembled_source_is_consistent_after_edit() {
        let mut suite = ShaderSuite::new().unwrap();
        suite.set_user_source(UserSlot::Vertex, "// edited\nfn shade_vertex(p: Particle, vertex_index: u32) -> ShadedVertex { return ShadedVertex(p.position, p.color, vec2<f32>(0.0)); }");

        let assembled = suite.assembled_source(Stage::Vertex);
        assert!(assembled.contains("// edited"));
        assert!(!assembled.contains("vertexCount 6"));
    }

    #[test]
    fn test_slot_round_trip() {
        let mut suite = ShaderSuite::new().unwrap();
        suite.set_user_source(UserSlot::Common, "// mine");
        assert_eq!(suite.user_source(UserSlot::Common), "// mine");
        assert_eq!(UserSlot::from_index(2), Some(UserSlot::Vertex));
        assert_eq!(UserSlot::from_index(9), None);
    }
}
