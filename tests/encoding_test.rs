use ndarray::ArrayD;
use texpad::tensor::{Encoding, TextureLayout};

#[test]
fn test_linear_plan_uses_one_column_per_trailing_axis_element() {
    let enc = Encoding::plan(&[2, 3, 4, 5], TextureLayout::Linear);

    assert_eq!(enc.rows(), 24);
    assert_eq!(enc.cols(), 5);
    // A linear grid has no tail: every texel is a logical element.
    assert_eq!(enc.texel_count(), enc.element_count());
}

#[test]
fn test_square_plan_covers_the_buffer_with_a_zero_tail() {
    let enc = Encoding::plan(&[2, 2, 2, 1], TextureLayout::Square);

    // 8 elements round up to a 3x3 grid with one tail texel.
    assert_eq!((enc.rows(), enc.cols()), (3, 3));
    assert_eq!(enc.texel_count(), 9);

    let data = ArrayD::from_shape_vec(
        vec![2, 2, 2, 1],
        (1..=8).map(|v| v as f32).collect::<Vec<_>>(),
    )
    .unwrap();
    let texels = enc.encode_f32(&data);
    assert_eq!(
        texels,
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 0.0]
    );

    // Decoding drops the tail and restores the logical shape.
    let decoded = enc.decode_f32(&texels);
    assert_eq!(decoded, data);
}

#[test]
fn test_offset_table_walks_the_buffer_in_row_major_order() {
    let enc = Encoding::plan(&[1, 2, 2, 2], TextureLayout::Square);
    let offsets = enc.offsets();

    assert_eq!(offsets.shape(), &[1, 2, 2, 2]);
    assert_eq!(offsets[[0, 0, 0, 0]], 0);
    assert_eq!(offsets[[0, 0, 0, 1]], 1);
    assert_eq!(offsets[[0, 0, 1, 0]], 2);
    assert_eq!(offsets[[0, 1, 1, 1]], 7);
}

#[test]
fn test_layout_selection_falls_back_to_square_on_oversized_grids() {
    // 4*4*4 = 64 rows by 8 columns fits comfortably.
    assert_eq!(
        TextureLayout::select(&[4, 4, 4, 8], 8192),
        TextureLayout::Linear
    );
    // 64*64*4 = 16384 rows exceeds the dimension cap.
    assert_eq!(
        TextureLayout::select(&[64, 64, 4, 8], 8192),
        TextureLayout::Square
    );
}
