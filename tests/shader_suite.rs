//! Integration tests for the shader suite: template assembly, CPU-side
//! compilation, pragma configuration, and the last-good program invariant,
//! exercised end to end over the embedded templates.

use glint::{ShaderSuite, Stage, UserSlot};

const MINIMAL_SIMULATION: &str = "fn simulate(texcoord: vec2<i32>) -> Particle {\n    return Particle(vec4<f32>(0.0), vec4<f32>(0.0), vec4<f32>(0.0));\n}\n";

const MINIMAL_VERTEX: &str = "fn shade_vertex(p: Particle, vertex_index: u32) -> ShadedVertex {\n    return ShadedVertex(p.position, p.color, quad_corner(vertex_index));\n}\n";

#[test]
fn default_sources_assemble_and_validate() {
    let mut suite = ShaderSuite::new().expect("templates carry their markers");
    let programs = suite.try_compile().expect("default sources must validate");

    assert_eq!(programs.config.grid_size, [256, 256]);
    assert_eq!(programs.config.vertex_count, 6);
    assert_eq!(programs.config.particle_count(), 256 * 256);
}

#[test]
fn assembled_source_contains_template_and_user_pieces() {
    let suite = ShaderSuite::new().unwrap();

    let simulation = suite.assembled_source(Stage::Simulation);
    assert!(simulation.contains("struct CommonUniforms"));
    assert!(simulation.contains("fn field_depth"));
    assert!(simulation.contains("fn fs_main"));

    let vertex = suite.assembled_source(Stage::Vertex);
    assert!(vertex.contains("fn quad_corner"));
    assert!(vertex.contains("fn shade_vertex"));
    assert!(vertex.contains("fn vs_main"));
}

#[test]
fn user_slot_set_and_get_round_trip() {
    let mut suite = ShaderSuite::new().unwrap();
    suite.set_user_source(UserSlot::Simulation, MINIMAL_SIMULATION);

    assert_eq!(suite.user_source(UserSlot::Simulation), MINIMAL_SIMULATION);
    assert!(suite
        .assembled_source(Stage::Simulation)
        .contains("return Particle(vec4<f32>(0.0)"));
}

#[test]
fn broken_source_keeps_last_good_programs_and_recovers() {
    let mut suite = ShaderSuite::new().unwrap();
    suite.try_compile().unwrap();
    let good_source = suite.compiled().unwrap().stage(Stage::Simulation).source.clone();

    // Break it: the old program set must survive unchanged.
    suite.set_user_source(UserSlot::Simulation, "fn simulate(( nope");
    assert!(suite.try_compile().is_err());
    assert_eq!(
        suite.compiled().unwrap().stage(Stage::Simulation).source,
        good_source
    );

    // Fix it: compilation picks the new source up again.
    suite.set_user_source(UserSlot::Simulation, MINIMAL_SIMULATION);
    suite.try_compile().expect("fixed source compiles");
    assert!(suite
        .compiled()
        .unwrap()
        .stage(Stage::Simulation)
        .source
        .contains("return Particle(vec4<f32>(0.0)"));
}

#[test]
fn size_pragma_flows_into_pipeline_config() {
    let mut suite = ShaderSuite::new().unwrap();
    suite.set_user_source(
        UserSlot::Simulation,
        format!("#pragma size 64 32\n{MINIMAL_SIMULATION}"),
    );

    let programs = suite.try_compile().unwrap();
    assert_eq!(programs.config.grid_size, [64, 32]);
    assert_eq!(programs.config.particle_count(), 2048);
}

#[test]
fn vertex_count_pragma_flows_into_pipeline_config() {
    let mut suite = ShaderSuite::new().unwrap();
    suite.set_user_source(
        UserSlot::Vertex,
        format!("#pragma vertexCount 3\n{MINIMAL_VERTEX}"),
    );

    let programs = suite.try_compile().unwrap();
    assert_eq!(programs.config.vertex_count, 3);
}

#[test]
fn reflection_exposes_the_fixed_binding_agreement() {
    let mut suite = ShaderSuite::new().unwrap();
    suite.try_compile().unwrap();
    let programs = suite.compiled().unwrap();

    for stage in Stage::ALL {
        let uniforms = programs.stage(stage).binding("u").expect("uniform block");
        assert_eq!((uniforms.group, uniforms.binding), (0, 0));
    }

    let vertex = programs.stage(Stage::Vertex);
    for (index, name) in [
        "state_position",
        "state_color",
        "state_data",
        "prev_position",
        "prev_color",
        "prev_data",
    ]
    .iter()
    .enumerate()
    {
        let binding = vertex.binding(name).expect("state texture binding");
        assert_eq!((binding.group, binding.binding), (1, index as u32));
    }
}

#[test]
fn shared_slot_feeds_all_three_stages() {
    let mut suite = ShaderSuite::new().unwrap();
    suite.set_user_source(
        UserSlot::Common,
        "fn tint(c: vec4<f32>) -> vec4<f32> { return c * 0.5; }",
    );
    suite.set_user_source(
        UserSlot::Fragment,
        "fn shade_fragment(v: VertexOutput) -> vec4<f32> { return tint(v.color); }",
    );

    suite.try_compile().expect("helper is visible to the fragment stage");
    for stage in Stage::ALL {
        assert!(suite.assembled_source(stage).contains("fn tint"));
    }
}
