//! `#pragma` directives embedded in user shader source.
//!
//! Pragmas configure the host-side pipeline rather than GPU-side logic: the
//! simulation slot may declare the particle grid resolution and the vertex
//! slot the number of vertices drawn per particle. Directives the sandbox
//! does not recognize are ignored so user code can carry annotations for
//! other tools.

/// Line prefix that introduces a directive, after leading whitespace.
pub const PRAGMA_PREFIX: &str = "#pragma";

/// Default particle grid resolution.
pub const DEFAULT_GRID_SIZE: [u32; 2] = [256, 256];

/// Default number of vertices drawn per particle instance (one quad).
pub const DEFAULT_VERTEX_COUNT: u32 = 6;

/// One parsed directive: the whitespace-separated tokens after `#pragma`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pragma {
    pub args: Vec<String>,
}

/// Scan `source` for pragma directives.
///
/// A line is recognized when, after trimming leading whitespace, it begins
/// with the literal `#pragma`. Everything else on the line becomes the
/// argument list; lines with no arguments yield an empty directive.
pub fn parse(source: &str) -> Vec<Pragma> {
    source
        .lines()
        .filter_map(|line| line.trim_start().strip_prefix(PRAGMA_PREFIX))
        .map(|rest| Pragma {
            args: rest.split_whitespace().map(str::to_owned).collect(),
        })
        .collect()
}

/// Rewrite pragma lines as comments so spliced user code stays valid WGSL.
///
/// WGSL has no preprocessor: directives are consumed host-side and must not
/// reach the compiler. Commenting rather than deleting keeps line numbers
/// stable for shader error messages.
pub fn comment_out(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    for line in source.lines() {
        if line.trim_start().starts_with(PRAGMA_PREFIX) {
            out.push_str("// ");
        }
        out.push_str(line);
        out.push('\n');
    }
    if !source.ends_with('\n') {
        out.pop();
    }
    out
}

/// Pragma-configurable pipeline parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Particle grid resolution; one simulated particle per texel.
    pub grid_size: [u32; 2],
    /// Vertices drawn per particle instance.
    pub vertex_count: u32,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            vertex_count: DEFAULT_VERTEX_COUNT,
        }
    }
}

impl PipelineConfig {
    /// Total particle count for the current grid.
    pub fn particle_count(&self) -> u32 {
        self.grid_size[0] * self.grid_size[1]
    }

    /// Apply `size <w> <h>` directives from a simulation source.
    ///
    /// Unparsable or non-positive values reset the resolution to the
    /// built-in default rather than applying a partial value; directives
    /// with the wrong argument count are ignored entirely.
    pub fn apply_simulation_pragmas(&mut self, source: &str) {
        for pragma in parse(source) {
            if pragma.args.len() == 3 && pragma.args[0] == "size" {
                let w: i32 = pragma.args[1].parse().unwrap_or(0);
                let h: i32 = pragma.args[2].parse().unwrap_or(0);
                if w > 0 && h > 0 {
                    self.grid_size = [w as u32, h as u32];
                } else {
                    self.grid_size = DEFAULT_GRID_SIZE;
                }
            }
        }
    }

    /// Apply `vertexCount <n>` directives from a vertex source.
    pub fn apply_vertex_pragmas(&mut self, source: &str) {
        for pragma in parse(source) {
            if pragma.args.len() == 2 && pragma.args[0] == "vertexCount" {
                let count: i32 = pragma.args[1].parse().unwrap_or(0);
                if count > 0 {
                    self.vertex_count = count as u32;
                } else {
                    self.vertex_count = DEFAULT_VERTEX_COUNT;
                }
            }
        }
    }
}
