//! GPU resource module
//!
//! Owning wrappers around device objects: buffers and their layouts, vertex
//! arrays, shader programs, textures and models. Every wrapper releases its
//! device object on drop.

pub mod vertex_layout;
pub mod buffer;
pub mod vertex_array;
pub mod shader_program;
pub mod image_decoder;
pub mod texture;
pub mod model;
pub mod obj_parser;

pub use vertex_layout::{AttributeDescriptor, AttributeType, VertexAttribute, VertexLayout};
pub use buffer::{ElementBuffer, VertexBuffer};
pub use vertex_array::{BoundVertexArray, VertexArray};
pub use shader_program::{ProgramScope, ShaderProgram};
pub use image_decoder::{DecodedImage, ImageDecoder, ImageFileDecoder};
pub use texture::{Texture, TextureBinding};
pub use model::{MaterialTexture, Mesh, MeshData, Model, ModelParser, TextureKind};
pub use obj_parser::{obj_vertex_attributes, ObjParser};
