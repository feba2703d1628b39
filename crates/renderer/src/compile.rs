//! GLSL wrapping and compilation.
//!
//! Scene fragment shaders are written against bare uniform names
//! (`fogDist`, `muRotation`, ...) and a `mainImage(out vec4, in vec2)` entry
//! point. Before compilation each source is wrapped with a generated prologue
//! that declares the program's std140 uniform block (field order taken from
//! its schema) plus macro aliases, and an epilogue that remaps `gl_FragCoord`
//! to a bottom-left origin and delegates to `mainImage`.
//!
//! Sources are validated through naga's GLSL frontend first so compilation
//! failures surface as [`CompileError`] with a readable log instead of a
//! device-level panic.

use std::borrow::Cow;

use engine::{CompileError, UniformSchema, UniformType};
use wgpu::naga::front::glsl::{Frontend, Options};
use wgpu::naga::ShaderStage;

pub(crate) fn compile_vertex_shader(
    device: &wgpu::Device,
    source: &str,
) -> Result<wgpu::ShaderModule, CompileError> {
    validate(source, ShaderStage::Vertex)?;
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("scene vertex"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(source.to_string()),
            stage: ShaderStage::Vertex,
            defines: &[],
        },
    }))
}

pub(crate) fn compile_fragment_shader(
    device: &wgpu::Device,
    source: &str,
    schema: &UniformSchema,
) -> Result<wgpu::ShaderModule, CompileError> {
    let wrapped = wrap_fragment(source, schema)?;
    validate(&wrapped, ShaderStage::Fragment)?;
    Ok(device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some("scene fragment"),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Owned(wrapped),
            stage: ShaderStage::Fragment,
            defines: &[],
        },
    }))
}

fn validate(source: &str, stage: ShaderStage) -> Result<(), CompileError> {
    let mut frontend = Frontend::default();
    frontend
        .parse(&Options::from(stage), source)
        .map(|_| ())
        .map_err(|errors| CompileError::new(errors.emit_to_string(source)))
}

/// Produces a self-contained GLSL 450 fragment shader from scene code.
///
/// The epilogue reads `resolution` to flip `gl_FragCoord` into the
/// bottom-left convention the scenes were written for, so every schema must
/// declare it.
pub(crate) fn wrap_fragment(source: &str, schema: &UniformSchema) -> Result<String, CompileError> {
    if !schema.contains("resolution") {
        return Err(CompileError::new(
            "schema must declare 'resolution'; the wrapper epilogue depends on it",
        ));
    }

    let mut sanitized = String::new();
    let mut skipped_version = false;
    for line in source.lines() {
        if !skipped_version && line.trim_start().starts_with("#version") {
            skipped_version = true;
            continue;
        }
        sanitized.push_str(line);
        sanitized.push('\n');
    }

    Ok(format!(
        "{header}\n#line 1\n{sanitized}{FOOTER}",
        header = block_declaration(schema),
        sanitized = sanitized
    ))
}

/// Generates the uniform block plus macro aliases for one schema.
///
/// Fields are prefixed inside the block to avoid clashes with scene-local
/// names; bool fields are carried as ints and aliased to a comparison so
/// scenes can branch on them directly.
pub(crate) fn block_declaration(schema: &UniformSchema) -> String {
    let mut decl = String::from(
        "#version 450\n\
         layout(location = 0) in vec2 v_uv;\n\
         layout(location = 0) out vec4 outColor;\n\n\
         layout(std140, set = 0, binding = 0) uniform SceneParams {\n",
    );
    for (name, ty) in schema.fields() {
        let glsl = match ty {
            UniformType::Float => "float",
            UniformType::Int | UniformType::Bool => "int",
            UniformType::Vec2 => "vec2",
            UniformType::Vec3 => "vec3",
        };
        decl.push_str(&format!("    {glsl} _{name};\n"));
    }
    decl.push_str("} ubo;\n\n");
    for (name, ty) in schema.fields() {
        match ty {
            UniformType::Bool => {
                decl.push_str(&format!("#define {name} (ubo._{name} != 0)\n"));
            }
            _ => decl.push_str(&format!("#define {name} ubo._{name}\n")),
        }
    }
    decl
}

const FOOTER: &str = r"void main() {
    vec2 fragCoord = vec2(gl_FragCoord.x, resolution.y - gl_FragCoord.y);
    vec4 color = vec4(0.0);
    mainImage(color, fragCoord);
    outColor = vec4(color.rgb, 1.0);
}
";
