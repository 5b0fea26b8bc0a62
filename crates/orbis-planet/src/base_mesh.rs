//! Subdivided icosahedron base mesh for planet generation.

use glam::DVec3;

use crate::AttributeBuffer;

/// Land and ocean base buffers. Both are non-indexed, hold the same corner
/// positions on the unit sphere, and have a vertex count divisible by 3.
#[derive(Clone, Debug)]
pub struct BaseMesh {
    pub land: AttributeBuffer,
    pub ocean: AttributeBuffer,
}

impl BaseMesh {
    /// Both buffers start from the same corner positions.
    pub fn from_positions(positions: Vec<[f32; 3]>) -> Self {
        let land = AttributeBuffer::from_vec(positions);
        let ocean = land.clone();
        Self { land, ocean }
    }
}

/// Produces the unit-sphere triangle soup that generation displaces.
pub trait BaseMeshProvider: Send + Sync {
    fn generate(&self, detail: u32) -> BaseMesh;
}

/// Icosahedron whose faces are each split into `(detail + 1)^2` triangles,
/// projected onto the unit sphere.
#[derive(Clone, Copy, Debug, Default)]
pub struct Icosphere;

impl BaseMeshProvider for Icosphere {
    fn generate(&self, detail: u32) -> BaseMesh {
        BaseMesh::from_positions(icosphere_positions(detail))
    }
}

const ICOSAHEDRON_INDICES: [usize; 60] = [
    0, 11, 5, 0, 5, 1, 0, 1, 7, 0, 7, 10, 0, 10, 11, 1, 5, 9, 5, 11, 4, 11, 10, 2, 10, 7, 6, 7, 1,
    8, 3, 9, 4, 3, 4, 2, 3, 2, 6, 3, 6, 8, 3, 8, 9, 4, 9, 5, 2, 4, 11, 6, 2, 10, 8, 6, 7, 9, 8, 1,
];

fn icosahedron_vertices() -> [DVec3; 12] {
    let t = (1.0 + 5.0_f64.sqrt()) / 2.0;
    [
        DVec3::new(-1.0, t, 0.0),
        DVec3::new(1.0, t, 0.0),
        DVec3::new(-1.0, -t, 0.0),
        DVec3::new(1.0, -t, 0.0),
        DVec3::new(0.0, -1.0, t),
        DVec3::new(0.0, 1.0, t),
        DVec3::new(0.0, -1.0, -t),
        DVec3::new(0.0, 1.0, -t),
        DVec3::new(t, 0.0, -1.0),
        DVec3::new(t, 0.0, 1.0),
        DVec3::new(-t, 0.0, -1.0),
        DVec3::new(-t, 0.0, 1.0),
    ]
}

/// Non-indexed icosphere corner positions, 3 per face, `20 * (detail + 1)^2` faces.
///
/// Each icosahedron face is split with a barycentric grid of `detail + 1`
/// segments per edge before projection, so corners shared between faces are
/// recomputed per face and may differ in the last bits.
pub fn icosphere_positions(detail: u32) -> Vec<[f32; 3]> {
    let vertices = icosahedron_vertices();
    let cols = detail as usize + 1;
    let mut out = Vec::with_capacity(60 * cols * cols);

    for tri in ICOSAHEDRON_INDICES.chunks(3) {
        subdivide_face(
            vertices[tri[0]],
            vertices[tri[1]],
            vertices[tri[2]],
            cols,
            &mut out,
        );
    }

    out
}

fn subdivide_face(a: DVec3, b: DVec3, c: DVec3, cols: usize, out: &mut Vec<[f32; 3]>) {
    // grid[i][j]: row i walks from edge ab toward c, j across the row.
    let mut grid: Vec<Vec<DVec3>> = Vec::with_capacity(cols + 1);
    for i in 0..=cols {
        let t = i as f64 / cols as f64;
        let aj = a.lerp(c, t);
        let bj = b.lerp(c, t);
        let rows = cols - i;
        let row = if rows == 0 {
            vec![aj]
        } else {
            (0..=rows)
                .map(|j| aj.lerp(bj, j as f64 / rows as f64))
                .collect()
        };
        grid.push(row);
    }

    let mut push = |p: DVec3| out.push(p.normalize().as_vec3().to_array());

    for i in 0..cols {
        for j in 0..2 * (cols - i) - 1 {
            let k = j / 2;
            if j % 2 == 0 {
                push(grid[i][k + 1]);
                push(grid[i + 1][k]);
                push(grid[i][k]);
            } else {
                push(grid[i][k + 1]);
                push(grid[i + 1][k + 1]);
                push(grid[i + 1][k]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn face_area(p: &[[f32; 3]]) -> f64 {
        let [a, b, c] = [p[0], p[1], p[2]].map(|v| glam::Vec3::from_array(v).as_dvec3());
        (b - a).cross(c - a).length() * 0.5
    }

    #[test]
    fn test_face_counts() {
        assert_eq!(icosphere_positions(0).len(), 60);
        assert_eq!(icosphere_positions(1).len(), 20 * 4 * 3);
        assert_eq!(icosphere_positions(4).len(), 20 * 25 * 3);
    }

    #[test]
    fn test_vertices_on_unit_sphere() {
        for p in icosphere_positions(5) {
            let len = glam::Vec3::from_array(p).length();
            assert!((len - 1.0).abs() < 1e-5, "vertex off unit sphere: {len}");
        }
    }

    #[test]
    fn test_faces_are_nearly_equal_area() {
        let positions = icosphere_positions(6);
        let areas: Vec<f64> = positions.chunks(3).map(face_area).collect();
        let min = areas.iter().copied().fold(f64::INFINITY, f64::min);
        let max = areas.iter().copied().fold(0.0, f64::max);
        assert!(min > 0.0);
        assert!(max / min < 2.0, "area ratio {}", max / min);
    }

    #[test]
    fn test_faces_wind_outward() {
        for face in icosphere_positions(2).chunks(3) {
            let [a, b, c] = [face[0], face[1], face[2]].map(|v| glam::Vec3::from_array(v).as_dvec3());
            let normal = (b - a).cross(c - a);
            let mid = (a + b + c) / 3.0;
            assert!(normal.dot(mid) > 0.0, "face winds inward");
        }
    }

    #[test]
    fn test_land_and_ocean_share_topology() {
        let mesh = Icosphere.generate(3);
        assert_eq!(mesh.land, mesh.ocean);
        assert_eq!(mesh.land.len() % 3, 0);
    }
}
