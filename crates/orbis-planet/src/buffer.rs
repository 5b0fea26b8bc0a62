//! Flat `[f32; 3]` vertex attribute buffers.

use glam::DVec3;
use orbis_terrain::Color;

/// One vertex attribute (position, normal or color) for a non-indexed mesh.
///
/// Face `f` owns entries `3f`, `3f + 1` and `3f + 2`. Values are stored as
/// `f32` for upload; reads and writes go through `f64` vectors.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttributeBuffer {
    pub values: Vec<[f32; 3]>,
}

impl AttributeBuffer {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    /// A buffer of `len` zero entries.
    pub fn zeroed(len: usize) -> Self {
        Self {
            values: vec![[0.0; 3]; len],
        }
    }

    pub fn from_vec(values: Vec<[f32; 3]>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn face_count(&self) -> usize {
        self.values.len() / 3
    }

    /// Read entry `index` as a `DVec3`.
    pub fn get(&self, index: usize) -> DVec3 {
        let [x, y, z] = self.values[index];
        DVec3::new(x as f64, y as f64, z as f64)
    }

    pub fn set(&mut self, index: usize, value: DVec3) {
        self.values[index] = value.as_vec3().to_array();
    }

    /// The three entries of face `face`.
    pub fn face(&self, face: usize) -> [DVec3; 3] {
        let i = face * 3;
        [self.get(i), self.get(i + 1), self.get(i + 2)]
    }

    pub fn set_face(&mut self, face: usize, values: [DVec3; 3]) {
        let i = face * 3;
        for (j, value) in values.into_iter().enumerate() {
            self.set(i + j, value);
        }
    }

    /// Write the same value to all three entries of `face`.
    pub fn fill_face(&mut self, face: usize, value: [f32; 3]) {
        let i = face * 3;
        self.values[i..i + 3].fill(value);
    }

    /// Entry `index` as a color.
    pub fn color(&self, index: usize) -> Color {
        Color::from(self.values[index])
    }

    /// Buffer contents as bytes for GPU upload.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.values)
    }

    pub fn byte_size(&self) -> usize {
        self.values.len() * std::mem::size_of::<[f32; 3]>()
    }
}
