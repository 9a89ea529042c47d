//! Petal quad geometry

use bytemuck::{Pod, Zeroable};

/// Petal mesh vertex, 24 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PetalVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

/// Unit quad in the XY plane, front face toward +Z and back face toward -Z
pub struct PetalMesh {
    pub vertices: [PetalVertex; 8],
    pub indices: [u16; 12],
}

impl PetalMesh {
    pub fn quad() -> Self {
        const CORNERS: [[f32; 3]; 4] = [
            [-0.5, -0.5, 0.0],
            [0.5, -0.5, 0.0],
            [-0.5, 0.5, 0.0],
            [0.5, 0.5, 0.0],
        ];
        let vertices = std::array::from_fn(|i| PetalVertex {
            position: CORNERS[i % 4],
            normal: if i < 4 { [0.0, 0.0, 1.0] } else { [0.0, 0.0, -1.0] },
        });
        Self {
            vertices,
            indices: [0, 1, 2, 2, 1, 3, 4, 6, 5, 6, 7, 5],
        }
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

impl Default for PetalMesh {
    fn default() -> Self {
        Self::quad()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn face_normal(mesh: &PetalMesh, tri: usize) -> Vec3 {
        let [a, b, c] = [0, 1, 2].map(|k| Vec3::from_array(mesh.vertices[mesh.indices[tri * 3 + k] as usize].position));
        (b - a).cross(c - a).normalize()
    }

    #[test]
    fn quad_is_double_sided() {
        let mesh = PetalMesh::quad();
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.indices.len(), 12);
        // Counter-clockwise winding agrees with the stored normal on both faces
        for tri in 0..4 {
            let stored = Vec3::from_array(mesh.vertices[mesh.indices[tri * 3] as usize].normal);
            assert!((face_normal(&mesh, tri) - stored).length() < 1e-6, "triangle {tri}");
        }
    }

    #[test]
    fn byte_views_match_layout() {
        let mesh = PetalMesh::quad();
        assert_eq!(std::mem::size_of::<PetalVertex>(), 24);
        assert_eq!(mesh.vertex_bytes().len(), 8 * 24);
        assert_eq!(mesh.index_bytes().len(), 24);
    }
}
