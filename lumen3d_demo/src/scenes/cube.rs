//! Unit cube shared by the demo scenes

use lumen_3d_engine::lumen3d::device::Gpu;
use lumen_3d_engine::lumen3d::resource::{AttributeDescriptor, AttributeType, VertexArray, VertexBuffer};
use lumen_3d_engine::lumen3d::Result;

/// Floats per vertex in [`CUBE_VERTICES`]
const STRIDE: usize = 8;

/// 36 vertices: position, normal, texture coordinates
#[rustfmt::skip]
const CUBE_VERTICES: [f32; 36 * STRIDE] = [
    // positions         // normals           // texture coords
    -0.5, -0.5, -0.5,    0.0,  0.0, -1.0,    0.0,  0.0,
     0.5, -0.5, -0.5,    0.0,  0.0, -1.0,    1.0,  0.0,
     0.5,  0.5, -0.5,    0.0,  0.0, -1.0,    1.0,  1.0,
     0.5,  0.5, -0.5,    0.0,  0.0, -1.0,    1.0,  1.0,
    -0.5,  0.5, -0.5,    0.0,  0.0, -1.0,    0.0,  1.0,
    -0.5, -0.5, -0.5,    0.0,  0.0, -1.0,    0.0,  0.0,

    -0.5, -0.5,  0.5,    0.0,  0.0,  1.0,    0.0,  0.0,
     0.5, -0.5,  0.5,    0.0,  0.0,  1.0,    1.0,  0.0,
     0.5,  0.5,  0.5,    0.0,  0.0,  1.0,    1.0,  1.0,
     0.5,  0.5,  0.5,    0.0,  0.0,  1.0,    1.0,  1.0,
    -0.5,  0.5,  0.5,    0.0,  0.0,  1.0,    0.0,  1.0,
    -0.5, -0.5,  0.5,    0.0,  0.0,  1.0,    0.0,  0.0,

    -0.5,  0.5,  0.5,   -1.0,  0.0,  0.0,    1.0,  0.0,
    -0.5,  0.5, -0.5,   -1.0,  0.0,  0.0,    1.0,  1.0,
    -0.5, -0.5, -0.5,   -1.0,  0.0,  0.0,    0.0,  1.0,
    -0.5, -0.5, -0.5,   -1.0,  0.0,  0.0,    0.0,  1.0,
    -0.5, -0.5,  0.5,   -1.0,  0.0,  0.0,    0.0,  0.0,
    -0.5,  0.5,  0.5,   -1.0,  0.0,  0.0,    1.0,  0.0,

     0.5,  0.5,  0.5,    1.0,  0.0,  0.0,    1.0,  0.0,
     0.5,  0.5, -0.5,    1.0,  0.0,  0.0,    1.0,  1.0,
     0.5, -0.5, -0.5,    1.0,  0.0,  0.0,    0.0,  1.0,
     0.5, -0.5, -0.5,    1.0,  0.0,  0.0,    0.0,  1.0,
     0.5, -0.5,  0.5,    1.0,  0.0,  0.0,    0.0,  0.0,
     0.5,  0.5,  0.5,    1.0,  0.0,  0.0,    1.0,  0.0,

    -0.5, -0.5, -0.5,    0.0, -1.0,  0.0,    0.0,  1.0,
     0.5, -0.5, -0.5,    0.0, -1.0,  0.0,    1.0,  1.0,
     0.5, -0.5,  0.5,    0.0, -1.0,  0.0,    1.0,  0.0,
     0.5, -0.5,  0.5,    0.0, -1.0,  0.0,    1.0,  0.0,
    -0.5, -0.5,  0.5,    0.0, -1.0,  0.0,    0.0,  0.0,
    -0.5, -0.5, -0.5,    0.0, -1.0,  0.0,    0.0,  1.0,

    -0.5,  0.5, -0.5,    0.0,  1.0,  0.0,    0.0,  1.0,
     0.5,  0.5, -0.5,    0.0,  1.0,  0.0,    1.0,  1.0,
     0.5,  0.5,  0.5,    0.0,  1.0,  0.0,    1.0,  0.0,
     0.5,  0.5,  0.5,    0.0,  1.0,  0.0,    1.0,  0.0,
    -0.5,  0.5,  0.5,    0.0,  1.0,  0.0,    0.0,  0.0,
    -0.5,  0.5, -0.5,    0.0,  1.0,  0.0,    0.0,  1.0,
];

/// Which columns of the cube table end up in the vertex buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeAttributes {
    /// `aPos`
    Positions,
    /// `aPos`, `aTexCoord`
    Textured,
    /// `aPos`, `aNormal`, `aTexCoords`
    Lit,
}

impl CubeAttributes {
    fn columns(&self) -> &'static [std::ops::Range<usize>] {
        match self {
            CubeAttributes::Positions => &[0..3],
            CubeAttributes::Textured => &[0..3, 6..8],
            CubeAttributes::Lit => &[0..8],
        }
    }

    fn descriptors(&self) -> Vec<AttributeDescriptor> {
        match self {
            CubeAttributes::Positions => vec![
                AttributeDescriptor::new("aPos", AttributeType::Float3),
            ],
            CubeAttributes::Textured => vec![
                AttributeDescriptor::new("aPos", AttributeType::Float3),
                AttributeDescriptor::new("aTexCoord", AttributeType::Float2),
            ],
            CubeAttributes::Lit => vec![
                AttributeDescriptor::new("aPos", AttributeType::Float3),
                AttributeDescriptor::new("aNormal", AttributeType::Float3),
                AttributeDescriptor::new("aTexCoords", AttributeType::Float2),
            ],
        }
    }
}

/// Interleaved vertex data for the requested attributes
pub fn cube_vertices(attributes: CubeAttributes) -> Vec<f32> {
    CUBE_VERTICES
        .chunks_exact(STRIDE)
        .flat_map(|vertex| {
            attributes
                .columns()
                .iter()
                .flat_map(move |range| vertex[range.clone()].iter().copied())
        })
        .collect()
}

/// Vertex array holding a unit cube, drawn with 36 vertices
pub fn cube_vertex_array(gpu: &Gpu, attributes: CubeAttributes) -> Result<VertexArray> {
    let mut buffer = VertexBuffer::from_slice(gpu, &cube_vertices(attributes))?;
    buffer.set_attributes(attributes.descriptors())?;

    let mut vertex_array = VertexArray::new(gpu)?;
    vertex_array.set_vertex_buffer(buffer)?;
    Ok(vertex_array)
}
