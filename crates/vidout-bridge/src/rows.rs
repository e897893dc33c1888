//! Row-by-row copy between buffers whose strides differ.

/// One row copy: `len` bytes from `src_offset` to `dst_offset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowSpan {
    pub dst_offset: usize,
    pub src_offset: usize,
    pub len: usize,
}

/// Spans copying `height` rows of `row_bytes` each.
///
/// Rows start at `dst_linesize * row` in the destination and at
/// `src_linesize * row` in the source; the two strides are independent.
pub fn row_spans(
    dst_linesize: u32,
    src_linesize: u32,
    row_bytes: u32,
    height: u32,
) -> impl Iterator<Item = RowSpan> {
    (0..height as usize).map(move |row| RowSpan {
        dst_offset: dst_linesize as usize * row,
        src_offset: src_linesize as usize * row,
        len: row_bytes as usize,
    })
}

/// Copy `height` rows of `row_bytes` from `src` into `dst`.
///
/// Stops at the first row that would fall outside either buffer and returns
/// the number of rows copied.
pub fn copy_rows(
    dst: &mut [u8],
    dst_linesize: u32,
    src: &[u8],
    src_linesize: u32,
    row_bytes: u32,
    height: u32,
) -> u32 {
    let mut copied = 0;
    for span in row_spans(dst_linesize, src_linesize, row_bytes, height) {
        let (Some(to), Some(from)) = (
            dst.get_mut(span.dst_offset..span.dst_offset + span.len),
            src.get(span.src_offset..span.src_offset + span.len),
        ) else {
            break;
        };
        to.copy_from_slice(from);
        copied += 1;
    }
    copied
}
