//! Adam7 pass geometry.
//!
//! A non-interlaced image is modelled as a single degenerate pass
//! (stride 1 in both directions) so the scanline engine only has to
//! know how to drive one loop shape.

/// One Adam7 pass: every `row_stride`-th row starting at `first_row`
/// contributes a scanline, and within it every `col_stride`-th column
/// starting at `first_col` contributes a pixel.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Pass
{
    pub first_row: usize,
    pub row_stride: usize,
    pub first_col: usize,
    pub col_stride: usize
}

impl Pass
{
    pub const FULL: Pass = Pass { first_row: 0, row_stride: 1, first_col: 0, col_stride: 1 };

    /// The seven Adam7 passes in transmission order.
    pub const ADAM7: [Pass; 7] = [
        Pass { first_row: 0, row_stride: 8, first_col: 0, col_stride: 8 },
        Pass { first_row: 0, row_stride: 8, first_col: 4, col_stride: 8 },
        Pass { first_row: 4, row_stride: 8, first_col: 0, col_stride: 4 },
        Pass { first_row: 0, row_stride: 4, first_col: 2, col_stride: 4 },
        Pass { first_row: 2, row_stride: 4, first_col: 0, col_stride: 2 },
        Pass { first_row: 0, row_stride: 2, first_col: 1, col_stride: 2 },
        Pass { first_row: 1, row_stride: 2, first_col: 0, col_stride: 1 },
    ];

    /// Sub-image dimensions this pass contributes out of a full image
    /// of `width` x `height`. Either coordinate can be zero, meaning
    /// this pass transmits no scanlines at all (e.g. every pass but
    /// the first, on a 1x1 image).
    pub const fn sub_dims(&self, width: usize, height: usize) -> (usize, usize)
    {
        let sub_width = ceil_div_from(width, self.first_col, self.col_stride);
        let sub_height = ceil_div_from(height, self.first_row, self.row_stride);

        (sub_width, sub_height)
    }

    pub const fn dst_row(&self, row: usize) -> usize
    {
        self.first_row + row * self.row_stride
    }

    pub const fn dst_col(&self, col: usize) -> usize
    {
        self.first_col + col * self.col_stride
    }
}

/// Number of `stride`-spaced samples starting at `first` that fit in
/// `[0, total)`; zero if `first >= total`.
const fn ceil_div_from(total: usize, first: usize, stride: usize) -> usize
{
    if total <= first
    {
        0
    }
    else
    {
        (total - first + stride - 1) / stride
    }
}
