//! Wavefront OBJ / MTL model parser.
//!
//! Supported statements:
//! - `v`, `vt`, `vn`: positions, texture coordinates, normals
//! - `f`: polygons (fan-triangulated), 1-based or negative relative indices
//! - `o`, `g`, `usemtl`: start a new mesh
//! - `mtllib`: material libraries with `map_Kd`, `map_Ks`, `map_Bump` / `bump` / `norm`
//!
//! Every mesh uses the layout `aPos` FLOAT3, `aNormal` FLOAT3,
//! `aTexCoords` FLOAT2. Identical corners are shared through the index list.

use std::path::Path;
use glam::{Vec2, Vec3};
use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::{engine_trace, engine_warn};
use crate::resource::{
    AttributeDescriptor, AttributeType, MaterialTexture, MeshData, ModelParser, TextureKind,
};

const SOURCE: &str = "lumen3d::ObjParser";

/// Attribute layout of every parsed mesh
pub fn obj_vertex_attributes() -> Vec<AttributeDescriptor> {
    vec![
        AttributeDescriptor::new("aPos", AttributeType::Float3),
        AttributeDescriptor::new("aNormal", AttributeType::Float3),
        AttributeDescriptor::new("aTexCoords", AttributeType::Float2),
    ]
}

/// Wavefront OBJ parser
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjParser;

impl ObjParser {
    pub fn new() -> Self {
        Self
    }
}

impl ModelParser for ObjParser {
    fn parse(&self, path: &Path) -> Result<Vec<MeshData>> {
        let text = std::fs::read_to_string(path).map_err(|e| Error::resource_load(path, e))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        parse_obj(&text, base_dir).map_err(|(line, reason)| {
            Error::resource_load(path, format!("line {}: {}", line, reason))
        })
    }
}

// ===== OBJ =====

type ParseResult<T> = std::result::Result<T, (usize, String)>;

/// Corner key: position, texcoord and normal indices
type Corner = (usize, Option<usize>, Option<usize>);

struct Group {
    name: String,
    material: Option<String>,
    vertices: Vec<f32>,
    indices: Vec<u32>,
    corners: FxHashMap<Corner, u32>,
}

impl Group {
    fn new(name: String, material: Option<String>) -> Self {
        Self {
            name,
            material,
            vertices: Vec::new(),
            indices: Vec::new(),
            corners: FxHashMap::default(),
        }
    }

    fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

#[derive(Default)]
struct Attributes {
    positions: Vec<Vec3>,
    texcoords: Vec<Vec2>,
    normals: Vec<Vec3>,
}

fn parse_obj(text: &str, base_dir: &Path) -> ParseResult<Vec<MeshData>> {
    let mut attributes = Attributes::default();
    let mut materials: FxHashMap<String, Vec<MaterialTexture>> = FxHashMap::default();
    let mut groups = vec![Group::new("default".to_string(), None)];
    let mut object_name = "default".to_string();

    for (number, raw) in text.lines().enumerate() {
        let line_number = number + 1;
        let line = raw.split('#').next().unwrap_or("").trim();
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };
        let rest = line[keyword.len()..].trim();

        match keyword {
            "v" => attributes.positions.push(parse_vec3(parts, line_number)?),
            "vn" => attributes.normals.push(parse_vec3(parts, line_number)?),
            "vt" => {
                let values = parse_floats(parts, 2, line_number)?;
                attributes.texcoords.push(Vec2::new(values[0], values[1]));
            }
            "f" => {
                let group = groups.last_mut().ok_or((line_number, "no active group".to_string()))?;
                let corners = parts
                    .map(|corner| corner_index(group, &attributes, corner, line_number))
                    .collect::<ParseResult<Vec<u32>>>()?;
                if corners.len() < 3 {
                    return Err((line_number, format!("face with {} vertices", corners.len())));
                }
                for i in 1..corners.len() - 1 {
                    group.indices.extend_from_slice(&[corners[0], corners[i], corners[i + 1]]);
                }
            }
            "usemtl" => {
                let material = Some(rest.to_string());
                start_group(&mut groups, object_name.clone(), material);
            }
            "o" | "g" => {
                object_name = if rest.is_empty() { "default".to_string() } else { rest.to_string() };
                let material = groups.last().and_then(|g| g.material.clone());
                start_group(&mut groups, object_name.clone(), material);
            }
            "mtllib" => {
                for library in rest.split_whitespace() {
                    let library_path = base_dir.join(library);
                    match std::fs::read_to_string(&library_path) {
                        Ok(mtl) => {
                            let mtl_dir = library_path.parent().unwrap_or(base_dir);
                            materials.extend(parse_mtl(&mtl, mtl_dir));
                        }
                        Err(err) => engine_warn!(SOURCE, "Material library '{}' not loaded: {}",
                            library_path.display(), err),
                    }
                }
            }
            other => engine_trace!(SOURCE, "Ignoring OBJ statement '{}' on line {}", other, line_number),
        }
    }

    let meshes = groups
        .into_iter()
        .filter(|group| !group.is_empty())
        .map(|group| {
            let textures = match &group.material {
                Some(material) => materials.get(material).cloned().unwrap_or_else(|| {
                    engine_warn!(SOURCE, "Material '{}' is not defined", material);
                    Vec::new()
                }),
                None => Vec::new(),
            };
            let name = match &group.material {
                Some(material) => format!("{}:{}", group.name, material),
                None => group.name,
            };
            MeshData {
                name,
                vertices: group.vertices,
                indices: group.indices,
                attributes: obj_vertex_attributes(),
                textures,
            }
        })
        .collect();

    Ok(meshes)
}

/// Start a new group, reusing the current one if it has no faces yet
fn start_group(groups: &mut Vec<Group>, name: String, material: Option<String>) {
    match groups.last_mut() {
        Some(current) if current.is_empty() => {
            current.name = name;
            current.material = material;
        }
        _ => groups.push(Group::new(name, material)),
    }
}

fn parse_floats<'a>(parts: impl Iterator<Item = &'a str>, min: usize, line: usize) -> ParseResult<Vec<f32>> {
    let values = parts
        .map(|p| p.parse::<f32>().map_err(|_| (line, format!("invalid number '{}'", p))))
        .collect::<ParseResult<Vec<f32>>>()?;
    if values.len() < min {
        return Err((line, format!("expected {} values, found {}", min, values.len())));
    }
    Ok(values)
}

fn parse_vec3<'a>(parts: impl Iterator<Item = &'a str>, line: usize) -> ParseResult<Vec3> {
    let values = parse_floats(parts, 3, line)?;
    Ok(Vec3::new(values[0], values[1], values[2]))
}

/// Resolve a 1-based or negative (relative) OBJ index
fn resolve_index(raw: &str, count: usize, line: usize) -> ParseResult<usize> {
    let index: i64 = raw.parse().map_err(|_| (line, format!("invalid index '{}'", raw)))?;
    let resolved = match index {
        0 => return Err((line, "index 0 is invalid".to_string())),
        i if i > 0 => i - 1,
        i => count as i64 + i,
    };
    if resolved < 0 || resolved >= count as i64 {
        return Err((line, format!("index {} out of range ({} available)", index, count)));
    }
    Ok(resolved as usize)
}

/// Index of the vertex for a `p`, `p/t`, `p//n` or `p/t/n` corner
fn corner_index(group: &mut Group, attributes: &Attributes, corner: &str, line: usize) -> ParseResult<u32> {
    let mut fields = corner.split('/');
    let position = resolve_index(fields.next().unwrap_or(""), attributes.positions.len(), line)?;
    let texcoord = match fields.next() {
        Some(raw) if !raw.is_empty() => Some(resolve_index(raw, attributes.texcoords.len(), line)?),
        _ => None,
    };
    let normal = match fields.next() {
        Some(raw) if !raw.is_empty() => Some(resolve_index(raw, attributes.normals.len(), line)?),
        _ => None,
    };

    let key = (position, texcoord, normal);
    if let Some(&index) = group.corners.get(&key) {
        return Ok(index);
    }

    let p = attributes.positions[position];
    let n = normal.map_or(Vec3::ZERO, |i| attributes.normals[i]);
    let t = texcoord.map_or(Vec2::ZERO, |i| attributes.texcoords[i]);
    let index = (group.vertices.len() / 8) as u32;
    group.vertices.extend_from_slice(&[p.x, p.y, p.z, n.x, n.y, n.z, t.x, t.y]);
    group.corners.insert(key, index);
    Ok(index)
}

// ===== MTL =====

fn parse_mtl(text: &str, mtl_dir: &Path) -> FxHashMap<String, Vec<MaterialTexture>> {
    let mut materials: FxHashMap<String, Vec<MaterialTexture>> = FxHashMap::default();
    let mut current: Option<String> = None;

    for raw in text.lines() {
        let line = raw.split('#').next().unwrap_or("").trim();
        let mut parts = line.split_whitespace();
        let Some(keyword) = parts.next() else {
            continue;
        };

        let kind = match keyword {
            "newmtl" => {
                let name = line[keyword.len()..].trim().to_string();
                materials.entry(name.clone()).or_default();
                current = Some(name);
                continue;
            }
            "map_Kd" => TextureKind::Diffuse,
            "map_Ks" => TextureKind::Specular,
            "map_Bump" | "map_bump" | "bump" | "norm" => TextureKind::Normal,
            _ => continue,
        };

        // Map options (`-bm 0.5`, ...) come first; the file name is last
        let (Some(material), Some(file)) = (&current, parts.last()) else {
            continue;
        };
        if let Some(textures) = materials.get_mut(material) {
            textures.push(MaterialTexture {
                kind,
                path: mtl_dir.join(file),
            });
        }
    }

    materials
}

#[cfg(test)]
#[path = "obj_parser_tests.rs"]
mod tests;
