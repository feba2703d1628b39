//! std140 uniform-block packing.
//!
//! The engine's uniform bundle is a name/value map; the GPU wants one byte
//! buffer laid out exactly as the generated GLSL block declares. [`UboLayout`]
//! derives that layout from a program's schema once at registration and packs
//! each frame's bundle into it.
//!
//! std140 rules used here: scalars are 4-byte aligned, vec2 8-byte, vec3
//! 16-byte aligned with a 12-byte footprint (a following scalar may occupy
//! the tail), and the block size rounds up to a multiple of 16.

use engine::{UniformBundle, UniformSchema, UniformType, UniformValue};
use tracing::warn;

#[derive(Debug, Clone)]
struct UboField {
    name: String,
    ty: UniformType,
    offset: usize,
}

/// Byte layout of one program's uniform block.
#[derive(Debug, Clone)]
pub(crate) struct UboLayout {
    fields: Vec<UboField>,
    size: usize,
}

fn footprint(ty: UniformType) -> (usize, usize) {
    // (size, alignment)
    match ty {
        UniformType::Float | UniformType::Int | UniformType::Bool => (4, 4),
        UniformType::Vec2 => (8, 8),
        UniformType::Vec3 => (12, 16),
    }
}

fn align_to(value: usize, alignment: usize) -> usize {
    value.div_ceil(alignment) * alignment
}

impl UboLayout {
    pub fn from_schema(schema: &UniformSchema) -> Self {
        let mut fields = Vec::with_capacity(schema.len());
        let mut cursor = 0;
        for (name, ty) in schema.fields() {
            let (size, alignment) = footprint(*ty);
            let offset = align_to(cursor, alignment);
            cursor = offset + size;
            fields.push(UboField {
                name: name.clone(),
                ty: *ty,
                offset,
            });
        }
        Self {
            fields,
            size: align_to(cursor.max(4), 16),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    #[cfg(test)]
    pub fn offset_of(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| field.offset)
    }

    /// Packs the schema-listed subset of a bundle into block bytes.
    ///
    /// The bundle is a superset by design; fields the bundle happens to miss
    /// stay zeroed, which only occurs when a scene schema names a uniform the
    /// plan never produces (a configuration bug worth logging, not a frame
    /// failure).
    pub fn pack(&self, bundle: &UniformBundle) -> Vec<u8> {
        let mut bytes = vec![0_u8; self.size];
        for field in &self.fields {
            match bundle.get(&field.name) {
                Some(value) => write_field(&mut bytes, field, value),
                None => warn!(uniform = %field.name, "composed bundle is missing a schema field"),
            }
        }
        bytes
    }
}

fn write_field(bytes: &mut [u8], field: &UboField, value: &UniformValue) {
    let slot = &mut bytes[field.offset..];
    match (field.ty, value) {
        (UniformType::Float, UniformValue::Float(v)) => write_f32(slot, *v),
        (UniformType::Float, UniformValue::Int(v)) => write_f32(slot, *v as f32),
        (UniformType::Int, UniformValue::Int(v)) => write_i32(slot, *v),
        (UniformType::Int, UniformValue::Float(v)) => write_i32(slot, *v as i32),
        (UniformType::Int, UniformValue::Bool(v)) => write_i32(slot, i32::from(*v)),
        (UniformType::Bool, UniformValue::Bool(v)) => write_i32(slot, i32::from(*v)),
        (UniformType::Bool, UniformValue::Int(v)) => write_i32(slot, i32::from(*v != 0)),
        (UniformType::Vec2, UniformValue::Vec2(v)) => {
            write_f32(slot, v[0]);
            write_f32(&mut slot[4..], v[1]);
        }
        (UniformType::Vec3, UniformValue::Vec3(v)) => {
            write_f32(slot, v[0]);
            write_f32(&mut slot[4..], v[1]);
            write_f32(&mut slot[8..], v[2]);
        }
        (ty, value) => {
            warn!(uniform = %field.name, ?ty, ?value, "uniform value kind does not match schema");
        }
    }
}

fn write_f32(slot: &mut [u8], value: f32) {
    slot[..4].copy_from_slice(&value.to_le_bytes());
}

fn write_i32(slot: &mut [u8], value: i32) {
    slot[..4].copy_from_slice(&value.to_le_bytes());
}
