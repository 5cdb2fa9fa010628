use sketch_render::ShaderSources;

/// Vertex stage of the built-in shader stage program.
pub const STAGE_VERTEX: &str = include_str!("../shaders/stage.vert.wgsl");

/// Fragment stage: ray-marched blobs shaded with the matcap, one following the pointer.
pub const STAGE_FRAGMENT: &str = include_str!("../shaders/stage.frag.wgsl");

pub fn builtin() -> ShaderSources {
    ShaderSources::new("stage", STAGE_VERTEX, STAGE_FRAGMENT)
}
