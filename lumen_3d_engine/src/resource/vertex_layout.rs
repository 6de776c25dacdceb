//! Named, typed vertex attribute layouts.
//!
//! A layout is an ordered list of attributes packed back to back: the byte
//! offset of attribute `i` is the sum of the sizes of attributes `0..i`, and
//! the stride is the sum of all sizes. Attribute `i` is bound to shader
//! location `i`.

use crate::error::{Error, Result};
use crate::engine_bail;
use crate::graphics_device::{ComponentType, VertexAttributePointer};

/// Type of one vertex attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeType {
    Float1,
    Float2,
    Float3,
    Float4,
    Int1,
    Int2,
    Int3,
    Int4,
    UInt1,
    UInt2,
    UInt3,
    UInt4,
}

impl AttributeType {
    /// Number of scalar components
    pub fn components(&self) -> u32 {
        match self {
            AttributeType::Float1 | AttributeType::Int1 | AttributeType::UInt1 => 1,
            AttributeType::Float2 | AttributeType::Int2 | AttributeType::UInt2 => 2,
            AttributeType::Float3 | AttributeType::Int3 | AttributeType::UInt3 => 3,
            AttributeType::Float4 | AttributeType::Int4 | AttributeType::UInt4 => 4,
        }
    }

    /// Scalar type of each component
    pub fn component_type(&self) -> ComponentType {
        match self {
            AttributeType::Float1 | AttributeType::Float2
            | AttributeType::Float3 | AttributeType::Float4 => ComponentType::Float,
            AttributeType::Int1 | AttributeType::Int2
            | AttributeType::Int3 | AttributeType::Int4 => ComponentType::Int,
            AttributeType::UInt1 | AttributeType::UInt2
            | AttributeType::UInt3 | AttributeType::UInt4 => ComponentType::UnsignedInt,
        }
    }

    /// Size in bytes of one attribute value
    pub fn size_bytes(&self) -> u32 {
        self.components() * self.component_type().size_bytes()
    }
}

/// Attribute as declared by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeDescriptor {
    /// Attribute name in the vertex shader (`aPos`, `aTexCoord`, ...)
    pub name: String,
    /// Attribute type
    pub ty: AttributeType,
}

impl AttributeDescriptor {
    pub fn new(name: impl Into<String>, ty: AttributeType) -> Self {
        Self { name: name.into(), ty }
    }
}

/// Attribute with its resolved location and offset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexAttribute {
    /// Attribute name
    pub name: String,
    /// Attribute type
    pub ty: AttributeType,
    /// Shader location (declaration order)
    pub location: u32,
    /// Byte offset inside one vertex
    pub offset: u32,
}

/// Interleaved vertex layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    attributes: Vec<VertexAttribute>,
    stride: u32,
}

impl VertexLayout {
    /// Resolve offsets and stride from an ordered list of descriptors
    pub fn new(descriptors: Vec<AttributeDescriptor>) -> Result<Self> {
        if descriptors.is_empty() {
            engine_bail!("lumen3d::VertexLayout",
                Error::InvalidResource("Vertex layout needs at least one attribute".to_string()));
        }

        let mut attributes: Vec<VertexAttribute> = Vec::with_capacity(descriptors.len());
        let mut offset = 0;
        for (location, descriptor) in descriptors.into_iter().enumerate() {
            if attributes.iter().any(|a| a.name == descriptor.name) {
                engine_bail!("lumen3d::VertexLayout", Error::InvalidResource(format!(
                    "Vertex attribute '{}' declared twice", descriptor.name
                )));
            }
            let size = descriptor.ty.size_bytes();
            attributes.push(VertexAttribute {
                name: descriptor.name,
                ty: descriptor.ty,
                location: location as u32,
                offset,
            });
            offset += size;
        }

        Ok(Self { attributes, stride: offset })
    }

    /// Bytes per vertex
    pub fn stride(&self) -> u32 {
        self.stride
    }

    /// Attributes in declaration order
    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }

    /// Find an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&VertexAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Device attribute pointers describing this layout
    pub fn pointers(&self) -> impl Iterator<Item = VertexAttributePointer> + '_ {
        self.attributes.iter().map(move |attribute| VertexAttributePointer {
            index: attribute.location,
            components: attribute.ty.components(),
            component_type: attribute.ty.component_type(),
            stride: self.stride,
            offset: attribute.offset,
        })
    }
}

#[cfg(test)]
#[path = "vertex_layout_tests.rs"]
mod tests;
