//! The blend pass: lets placed vegetation raise and tint the land surface.

use orbis_terrain::{Biome, VegetationField};

use crate::LandMesh;
use crate::vertex_cache::VertexInfo;

/// Re-project every land corner to its cached radial height plus the biome's
/// vegetation delta, and recolor each face with the biome's blended color.
///
/// `corner_info` holds the cached samples for each land corner, in buffer
/// order. Runs after the scatter pass so every face sees the final field.
pub fn blend_vegetation<B: Biome + ?Sized>(
    biome: &B,
    field: &VegetationField,
    land: &mut LandMesh,
    corner_info: &[VertexInfo],
    edge_length: f64,
) {
    debug_assert_eq!(corner_info.len(), land.positions.len());

    for face in 0..land.positions.face_count() {
        let i = face * 3;
        let [a, b, c] = land.positions.face(face).map(|p| p.normalize());
        let base_color = land.colors.color(i);

        let blend =
            biome.vegetation_height_and_color_for_face(field, a, b, c, base_color, edge_length);

        land.positions.set_face(
            face,
            [
                a * (corner_info[i].height + blend.height_a),
                b * (corner_info[i + 1].height + blend.height_b),
                c * (corner_info[i + 2].height + blend.height_c),
            ],
        );
        land.colors.fill_face(face, blend.color.to_array());
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec3;
    use orbis_terrain::{Color, GroundInfluence};

    use super::*;
    use crate::AttributeBuffer;

    struct Plain;

    impl Biome for Plain {
        fn height(&self, _: DVec3) -> f64 {
            0.0
        }
        fn sea_height(&self, _: DVec3) -> f64 {
            0.0
        }
        fn color(&self, _: DVec3, _: f64, _: f64) -> Option<Color> {
            None
        }
        fn sea_color(&self, _: DVec3, _: f64) -> Option<Color> {
            None
        }
        fn vegetation_items(&self) -> &[orbis_terrain::VegetationItem] {
            &[]
        }
        fn min_height(&self) -> f64 {
            -1.0
        }
        fn max_height(&self) -> f64 {
            1.0
        }
    }

    fn one_face(radius: f64, color: [f32; 3]) -> (LandMesh, Vec<VertexInfo>) {
        let corners = [
            DVec3::new(1.0, 0.0, 0.0),
            DVec3::new(0.99, 0.1, 0.0).normalize(),
            DVec3::new(0.99, 0.0, 0.1).normalize(),
        ];
        let mut positions = AttributeBuffer::zeroed(3);
        positions.set_face(0, corners.map(|c| c * radius));
        let mut colors = AttributeBuffer::zeroed(3);
        colors.fill_face(0, color);
        let info = VertexInfo {
            position: corners[0],
            height: radius,
            scatter: DVec3::ZERO,
            sea_height: 1.0,
            sea_morph_height: 1.0,
        };
        (
            LandMesh {
                positions,
                normals: AttributeBuffer::zeroed(3),
                colors,
            },
            vec![info; 3],
        )
    }

    #[test]
    fn test_empty_field_keeps_surface() {
        let (mut land, info) = one_face(1.1, [0.5, 0.5, 0.5]);
        let before = land.clone();
        blend_vegetation(&Plain, &VegetationField::new(), &mut land, &info, 0.1);

        for i in 0..3 {
            assert!(land.positions.get(i).distance(before.positions.get(i)) < 1e-6);
        }
        assert_eq!(land.colors, before.colors);
    }

    #[test]
    fn test_nearby_vegetation_raises_and_tints() {
        let (mut land, info) = one_face(1.0, [1.0, 1.0, 1.0]);
        let mut field = VegetationField::new();
        field.insert(
            DVec3::X,
            &GroundInfluence {
                radius: 0.5,
                raise: 0.01,
                color: Some(Color::BLACK),
                color_strength: 1.0,
            },
        );

        blend_vegetation(&Plain, &field, &mut land, &info, 0.1);

        assert!(land.positions.get(0).length() > 1.0);
        let tinted = land.colors.color(0);
        assert!(tinted.r < 1.0);
        assert_eq!(land.colors.values[0], land.colors.values[2]);
    }
}
