use crate::Buffer;

/// Linearly rescales samples so the minimum maps to `0` and the maximum to
/// `255`. Empty or nearly flat buffers (`max - min < 1e-6`) are left as is.
pub fn normalize(buf: &mut Buffer) {
    let Some((lo, hi)) = buf.min_max() else {
        return;
    };
    let range = hi - lo;
    if range < 1e-6 {
        return;
    }

    for v in buf.data_mut() {
        *v = (*v - lo) / range * 255.0;
    }
}

/// Copies the `h x w` window whose top-left corner is column `x`, row `y`.
/// Cells whose source falls outside `src` stay `0.0`.
pub fn crop(src: &Buffer, x: usize, y: usize, w: usize, h: usize) -> Buffer {
    let mut out = Buffer::new(h, w);
    if out.is_empty() {
        return out;
    }

    for i in 0..h {
        let Some(sy) = y.checked_add(i).filter(|&sy| sy < src.rows()) else {
            break;
        };
        let src_row = src.row(sy);
        let dst_row = out.row_mut(i);
        for (j, dst) in dst_row.iter_mut().enumerate() {
            if let Some(&v) = x.checked_add(j).and_then(|sx| src_row.get(sx)) {
                *dst = v;
            }
        }
    }

    out
}

/// Nearest-neighbour resample to `new_h x new_w`.
///
/// Destination `(i, j)` reads source `(floor(i * rows / new_h),
/// floor(j * cols / new_w))`, clamped to the last row and column.
pub fn resize_nearest(src: &Buffer, new_w: usize, new_h: usize) -> Buffer {
    let mut out = Buffer::new(new_h, new_w);
    if out.is_empty() || src.is_empty() {
        return out;
    }

    let scale_y = src.rows() as f64 / new_h as f64;
    let scale_x = src.cols() as f64 / new_w as f64;
    for i in 0..new_h {
        let sy = ((i as f64 * scale_y) as usize).min(src.rows() - 1);
        let src_row = src.row(sy);
        for (j, dst) in out.row_mut(i).iter_mut().enumerate() {
            let sx = ((j as f64 * scale_x) as usize).min(src.cols() - 1);
            *dst = src_row[sx];
        }
    }

    out
}

/// Converts samples to 8-bit by truncating toward zero and clamping to
/// `[0, 255]`. NaN maps to `0`.
pub fn to_u8_clamped(buf: &Buffer) -> Vec<u8> {
    buf.data()
        .iter()
        .map(|&v| {
            let t = v.trunc();
            if t.is_nan() || t <= 0.0 {
                0
            } else if t >= 255.0 {
                255
            } else {
                t as u8
            }
        })
        .collect()
}
