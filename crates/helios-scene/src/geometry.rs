//! Procedural mesh generation: UV spheres for the sun and planets, flat
//! annuli for the orbit guides.

/// Longitude/latitude segment count for sphere tessellation.
pub const SPHERE_SEGMENTS: u32 = 32;

/// Segment count around an orbit ring.
pub const RING_SEGMENTS: u32 = 64;

/// Half-width of an orbit ring: inner radius is `distance - 0.1`, outer is
/// `distance + 0.1`.
pub const RING_HALF_WIDTH: f32 = 0.1;

/// CPU-side indexed mesh: positions, per-vertex normals, triangle indices.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Generate a UV sphere centered at the origin.
///
/// `segments` counts both longitude bands and latitude bands; the grid has
/// `(segments + 1)²` vertices and `segments² · 2` triangles.
pub fn uv_sphere(radius: f32, segments: u32) -> MeshData {
    let mut mesh = MeshData::default();
    let seg = segments as usize;

    for v in 0..=seg {
        // Polar angle from +Y pole to -Y pole.
        let phi = std::f32::consts::PI * v as f32 / seg as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for u in 0..=seg {
            let theta = std::f32::consts::TAU * u as f32 / seg as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();

            let normal = [sin_phi * cos_theta, cos_phi, sin_phi * sin_theta];
            mesh.normals.push(normal);
            mesh.positions
                .push([normal[0] * radius, normal[1] * radius, normal[2] * radius]);
        }
    }

    let stride = (seg + 1) as u32;
    for v in 0..segments {
        for u in 0..segments {
            let a = v * stride + u;
            let b = a + 1;
            let c = a + stride;
            let d = c + 1;
            mesh.indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    mesh
}

/// Generate a flat annulus lying in the XZ plane at y = 0, centered on the
/// origin, spanning `distance ± RING_HALF_WIDTH`. Normals point up; the
/// renderer draws it double-sided.
pub fn orbit_ring(distance: f32) -> MeshData {
    let inner = distance - RING_HALF_WIDTH;
    let outer = distance + RING_HALF_WIDTH;
    let mut mesh = MeshData::default();
    let seg = RING_SEGMENTS as usize;

    for i in 0..=seg {
        let theta = std::f32::consts::TAU * i as f32 / seg as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();
        mesh.positions.push([cos_theta * inner, 0.0, sin_theta * inner]);
        mesh.positions.push([cos_theta * outer, 0.0, sin_theta * outer]);
        mesh.normals.push([0.0, 1.0, 0.0]);
        mesh.normals.push([0.0, 1.0, 0.0]);
    }

    for i in 0..RING_SEGMENTS {
        let a = i * 2;
        let b = a + 1;
        let c = a + 2;
        let d = a + 3;
        mesh.indices.extend_from_slice(&[a, b, c, c, b, d]);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sphere_vertex_and_triangle_counts() {
        let mesh = uv_sphere(8.0, SPHERE_SEGMENTS);
        let expected_vertices = (SPHERE_SEGMENTS as usize + 1).pow(2);
        assert_eq!(mesh.vertex_count(), expected_vertices);
        assert_eq!(
            mesh.triangle_count(),
            (SPHERE_SEGMENTS as usize).pow(2) * 2
        );
        assert_eq!(mesh.normals.len(), mesh.positions.len());
    }

    #[test]
    fn test_sphere_vertices_lie_on_radius() {
        let radius = 2.2;
        let mesh = uv_sphere(radius, 16);
        for p in &mesh.positions {
            let len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!((len - radius).abs() < 1e-4, "vertex off sphere: {len}");
        }
    }

    #[test]
    fn test_sphere_normals_are_unit_radial() {
        let mesh = uv_sphere(5.0, 8);
        for (p, n) in mesh.positions.iter().zip(&mesh.normals) {
            let n_len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((n_len - 1.0).abs() < 1e-5);
            // Normal is parallel to position: their dot equals |p|.
            let dot = p[0] * n[0] + p[1] * n[1] + p[2] * n[2];
            let p_len = (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();
            assert!((dot - p_len).abs() < 1e-4);
        }
    }

    #[test]
    fn test_sphere_indices_in_bounds() {
        let mesh = uv_sphere(1.0, SPHERE_SEGMENTS);
        let max = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < max));
    }

    #[test]
    fn test_ring_radii_bound_the_distance() {
        let distance = 25.0;
        let mesh = orbit_ring(distance);
        for p in &mesh.positions {
            assert_eq!(p[1], 0.0, "ring must lie in the XZ plane");
            let r = (p[0] * p[0] + p[2] * p[2]).sqrt();
            assert!(
                r >= distance - RING_HALF_WIDTH - 1e-4 && r <= distance + RING_HALF_WIDTH + 1e-4,
                "ring vertex radius {r} outside [{}, {}]",
                distance - RING_HALF_WIDTH,
                distance + RING_HALF_WIDTH
            );
        }
    }

    #[test]
    fn test_ring_has_inner_and_outer_vertices() {
        let distance = 15.0;
        let mesh = orbit_ring(distance);
        // First vertex pair sits at theta = 0: (inner, 0, 0) and (outer, 0, 0).
        assert!((mesh.positions[0][0] - (distance - RING_HALF_WIDTH)).abs() < 1e-5);
        assert!((mesh.positions[1][0] - (distance + RING_HALF_WIDTH)).abs() < 1e-5);
    }

    #[test]
    fn test_ring_counts() {
        let mesh = orbit_ring(60.0);
        assert_eq!(mesh.vertex_count(), (RING_SEGMENTS as usize + 1) * 2);
        assert_eq!(mesh.triangle_count(), RING_SEGMENTS as usize * 2);
        let max = mesh.vertex_count() as u32;
        assert!(mesh.indices.iter().all(|&i| i < max));
    }
}
