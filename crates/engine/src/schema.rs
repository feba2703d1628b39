//! Uniform schema declarations.
//!
//! Each program declares the uniforms it consumes as an ordered field list.
//! Field order is load-bearing: the renderer derives the std140 uniform-block
//! layout (and the generated GLSL block declaration) from it, so the schema
//! is the single source of truth shared by the composer and the GPU side.

/// Scalar/vector kinds a uniform field can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniformType {
    Float,
    Int,
    Bool,
    Vec2,
    Vec3,
}

/// Ordered set of uniform fields required by one program.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UniformSchema {
    fields: Vec<(String, UniformType)>,
}

impl UniformSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field. Declaration order becomes block layout order.
    pub fn field(mut self, name: &str, ty: UniformType) -> Self {
        debug_assert!(
            !self.contains(name),
            "duplicate uniform field '{name}' in schema"
        );
        self.fields.push((name.to_string(), ty));
        self
    }

    pub fn fields(&self) -> &[(String, UniformType)] {
        &self.fields
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| field == name)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
