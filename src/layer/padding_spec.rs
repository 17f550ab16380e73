use crate::layer::DataFormat;

/// Shorthand forms accepted when configuring spatial padding.
///
/// All three forms describe per-axis `(before, after)` amounts for the three spatial
/// axes and normalize to a [`PaddingSpec`]:
/// - `Uniform(p)`: the same amount on both sides of every spatial axis.
/// - `Spatial([a, b, c])`: one symmetric amount per spatial axis.
/// - `Explicit(pairs)`: full `(before, after)` control per spatial axis.
///
/// Amounts are assumed non-negative by configuration contract; this is a documented
/// precondition, not a runtime check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Padding {
    Uniform(usize),
    Spatial([usize; 3]),
    Explicit([[usize; 2]; 3]),
}

impl Default for Padding {
    fn default() -> Self {
        Padding::Uniform(1)
    }
}

impl Padding {
    /// Normalizes this shorthand to the canonical pair-triple form.
    pub fn normalize(self) -> PaddingSpec {
        let pairs = match self {
            Padding::Uniform(p) => [[p, p], [p, p], [p, p]],
            Padding::Spatial([a, b, c]) => [[a, a], [b, b], [c, c]],
            Padding::Explicit(pairs) => pairs,
        };
        PaddingSpec { pairs }
    }
}

/// Canonical padding specification: three `(before, after)` pairs bound to the three
/// spatial axes in canonical order.
///
/// The binding is independent of the configured [`DataFormat`]; the data format only
/// decides which buffer axes the spatial axes live on when a layer executes. A spec is
/// built once from a [`Padding`] shorthand and immutable thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PaddingSpec {
    pairs: [[usize; 2]; 3],
}

impl PaddingSpec {
    /// The `(before, after)` pairs for the three spatial axes.
    pub fn pairs(&self) -> [[usize; 2]; 3] {
        self.pairs
    }

    /// Padding inserted before spatial axis `axis` (0, 1 or 2).
    pub fn before(&self, axis: usize) -> usize {
        self.pairs[axis][0]
    }

    /// Padding appended after spatial axis `axis` (0, 1 or 2).
    pub fn after(&self, axis: usize) -> usize {
        self.pairs[axis][1]
    }

    /// Total growth of spatial axis `axis`.
    pub fn total(&self, axis: usize) -> usize {
        self.pairs[axis][0] + self.pairs[axis][1]
    }

    /// The buffer shape produced by padding `shape` under the given data format.
    ///
    /// Only the three spatial extents grow; the channel extent is untouched.
    pub fn padded_shape(&self, shape: [usize; 4], data_format: DataFormat) -> [usize; 4] {
        match data_format {
            DataFormat::ChannelsLast => [
                shape[0] + self.total(0),
                shape[1] + self.total(1),
                shape[2] + self.total(2),
                shape[3],
            ],
            DataFormat::ChannelsFirst => [
                shape[0],
                shape[1] + self.total(0),
                shape[2] + self.total(1),
                shape[3] + self.total(2),
            ],
        }
    }
}

impl From<Padding> for PaddingSpec {
    fn from(padding: Padding) -> Self {
        padding.normalize()
    }
}
