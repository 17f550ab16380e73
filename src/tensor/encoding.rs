use crate::tensor::TextureLayout;
use ndarray::ArrayD;

/// A concrete plan for storing one logical tensor shape as a 2D texture grid.
///
/// The plan fixes the grid dimensions for a `(shape, layout)` pair and provides the
/// conversions between the logical tensor and the grid's row-major texel storage:
/// `encode_*` flattens a tensor into texels (zero-filling any tail the grid has beyond
/// the logical element count), `decode_f32` is the inverse, and `offsets` is the
/// per-element linear-offset table: for each logical element, its position inside the
/// grid's row-major storage. The padding operator lifts that table into the padded
/// coordinate space when it builds an index map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoding {
    layout: TextureLayout,
    rows: usize,
    cols: usize,
    shape: Vec<usize>,
}

impl Encoding {
    /// Plans the texture grid for `shape` under the given layout.
    ///
    /// # Parameters
    ///
    /// - `shape` - The logical buffer shape; all dimensions are assumed positive
    /// - `layout` - The linearization strategy
    ///
    /// # Returns
    ///
    /// * `Encoding` - The planned grid with its rows, columns and logical shape fixed
    pub fn plan(shape: &[usize], layout: TextureLayout) -> Encoding {
        let len: usize = shape.iter().product();
        let (rows, cols) = match layout {
            TextureLayout::Linear => {
                let cols = shape.last().copied().unwrap_or(1);
                let rows = if cols == 0 { 0 } else { len / cols };
                (rows, cols)
            }
            TextureLayout::Square => {
                let mut side = (len as f64).sqrt().ceil() as usize;
                while side * side < len {
                    side += 1;
                }
                (side, side)
            }
        };
        Encoding {
            layout,
            rows,
            cols,
            shape: shape.to_vec(),
        }
    }

    pub fn layout(&self) -> TextureLayout {
        self.layout
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// The logical shape this plan encodes.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// Number of logical elements in the encoded tensor.
    pub fn element_count(&self) -> usize {
        self.shape.iter().product()
    }

    /// Number of texels in the grid, including any zero tail.
    pub fn texel_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Flattens `data` into the grid's row-major texel storage, zero-filling the tail.
    pub fn encode_f32(&self, data: &ArrayD<f32>) -> Vec<f32> {
        assert_eq!(
            data.len(),
            self.element_count(),
            "tensor does not match the planned encoding shape"
        );
        let mut texels = vec![0.0f32; self.texel_count()];
        for (texel, value) in texels.iter_mut().zip(data.iter()) {
            *texel = *value;
        }
        texels
    }

    /// Flattens an integer tensor into the grid's row-major texel storage.
    pub fn encode_i32(&self, data: &ArrayD<i32>) -> Vec<i32> {
        assert_eq!(
            data.len(),
            self.element_count(),
            "tensor does not match the planned encoding shape"
        );
        let mut texels = vec![0i32; self.texel_count()];
        for (texel, value) in texels.iter_mut().zip(data.iter()) {
            *texel = *value;
        }
        texels
    }

    /// Rebuilds the logical tensor from texel storage, discarding the tail.
    pub fn decode_f32(&self, texels: &[f32]) -> ArrayD<f32> {
        assert!(
            texels.len() >= self.element_count(),
            "texel storage is smaller than the planned encoding"
        );
        ArrayD::from_shape_vec(self.shape.clone(), texels[..self.element_count()].to_vec())
            .expect("texel slice matches the planned shape")
    }

    /// The per-element linear-offset table produced by this encoding.
    ///
    /// Element `[i, j, ...]` of the returned tensor holds the row-major position of the
    /// corresponding logical element inside the texel storage. Both layouts store the
    /// logical elements contiguously from texel zero, so the table is the identity
    /// mapping reshaped to the logical shape; consumers treat it as opaque offsets.
    pub fn offsets(&self) -> ArrayD<i32> {
        let table: Vec<i32> = (0..self.element_count() as i32).collect();
        ArrayD::from_shape_vec(self.shape.clone(), table)
            .expect("offset table length matches the planned shape")
    }
}
