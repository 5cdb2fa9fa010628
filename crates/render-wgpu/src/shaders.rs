/// WGSL shader for normal-material meshes: colors fragments by view-space normal.
pub const NORMAL_SHADER: &str = r#"
struct MeshUniforms {
    view_proj: mat4x4<f32>,
    view: mat4x4<f32>,
    model: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> mesh: MeshUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) view_normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = mesh.model * vec4<f32>(vertex.position, 1.0);
    let view_normal = (mesh.view * mesh.model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = mesh.view_proj * world_pos;
    out.view_normal = view_normal;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(normalize(in.view_normal) * 0.5 + 0.5, 1.0);
}
"#;
