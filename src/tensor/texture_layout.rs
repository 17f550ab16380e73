/// Strategy for linearizing a tensor's buffer into a 2D texture grid.
///
/// GPU texture engines operate on 2D grids only, so every tensor handed to the GPU path
/// is flattened into one of two shapes:
/// - `Linear`: one grid row per leading-index combination, one column per element of the
///   last axis. A rank-4 buffer `[a, b, c, d]` becomes an `a*b*c x d` grid with no tail.
/// - `Square`: the flat buffer of length `n` becomes a `side x side` grid with
///   `side = ceil(sqrt(n))`; the unused tail texels are zero.
///
/// `Linear` keeps the channel axis addressable as a texture column but can exceed the
/// device's maximum texture dimension on large tensors; `Square` always stays close to
/// the minimal footprint, which is why fresh uploads default to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureLayout {
    Linear,
    #[default]
    Square,
}

impl TextureLayout {
    /// Picks a layout for the given buffer shape: `Linear` when both grid dimensions fit
    /// within `max_dim`, `Square` otherwise.
    pub fn select(shape: &[usize], max_dim: usize) -> TextureLayout {
        let len: usize = shape.iter().product();
        let cols = shape.last().copied().unwrap_or(1);
        let rows = if cols == 0 { 0 } else { len / cols };
        if rows <= max_dim && cols <= max_dim {
            TextureLayout::Linear
        } else {
            TextureLayout::Square
        }
    }
}
