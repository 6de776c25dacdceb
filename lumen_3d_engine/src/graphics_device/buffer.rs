/// Buffer handles, buffer kinds and vertex attribute pointers

/// Opaque GPU buffer handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferHandle(pub u64);

/// Opaque GPU vertex array handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexArrayHandle(pub u64);

/// Buffer binding target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    /// Per-vertex data
    Vertex,
    /// Element (index) data
    Index,
}

/// Scalar type of one attribute component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// 32-bit float
    Float,
    /// 32-bit signed integer
    Int,
    /// 32-bit unsigned integer
    UnsignedInt,
}

impl ComponentType {
    /// Size in bytes of one component
    pub fn size_bytes(&self) -> u32 {
        match self {
            ComponentType::Float | ComponentType::Int | ComponentType::UnsignedInt => 4,
        }
    }
}

/// Index buffer element type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexType {
    /// 16-bit indices
    U16,
    /// 32-bit indices
    U32,
}

impl IndexType {
    /// Size in bytes of one index element
    pub fn size_bytes(&self) -> u32 {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

/// Attribute pointer recorded into the bound vertex array
///
/// Describes where attribute `index` lives inside the currently bound
/// vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttributePointer {
    /// Attribute location in the vertex shader
    pub index: u32,
    /// Number of components (1..=4)
    pub components: u32,
    /// Component scalar type
    pub component_type: ComponentType,
    /// Distance in bytes between two consecutive vertices
    pub stride: u32,
    /// Offset in bytes of this attribute inside a vertex
    pub offset: u32,
}
