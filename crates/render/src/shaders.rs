//! WGSL sources for the built-in materials.
//!
//! Every program shares one uniform block at group 0, binding 0:
//! projection `p`, view `v`, world `w` and colour `m`. Vertex attributes are
//! position `P` at location 0 and normal `N` at location 1.

/// Vertex stage of [`crate::BasicMaterial`].
pub const BASIC_VERTEX_SHADER: &str = r#"
struct Uniforms {
    p: mat4x4<f32>,
    v: mat4x4<f32>,
    w: mat4x4<f32>,
    m: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct VertexInput {
    @location(0) P: vec3<f32>,
    @location(1) N: vec3<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
};

@vertex
fn vs_main(vertex: VertexInput) -> VertexOutput {
    let world_pos = uniforms.w * vec4<f32>(vertex.P, 1.0);
    let world_normal = (uniforms.w * vec4<f32>(vertex.N, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = uniforms.p * uniforms.v * world_pos;
    out.world_normal = world_normal;
    return out;
}
"#;

/// Fragment stage of [`crate::BasicMaterial`]: flat colour with a single
/// directional light.
pub const BASIC_FRAGMENT_SHADER: &str = r#"
struct Uniforms {
    p: mat4x4<f32>,
    v: mat4x4<f32>,
    w: mat4x4<f32>,
    m: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

@fragment
fn fs_main(@location(0) world_normal: vec3<f32>) -> @location(0) vec4<f32> {
    let light_dir = normalize(vec3<f32>(0.3, 0.5, 1.0));
    let len = length(world_normal);
    var diffuse = 1.0;
    if (len > 0.0) {
        diffuse = max(dot(world_normal / len, light_dir), 0.0);
    }
    let lighting = 0.35 + diffuse * 0.65;
    return vec4<f32>(uniforms.m.rgb * lighting, uniforms.m.a);
}
"#;
