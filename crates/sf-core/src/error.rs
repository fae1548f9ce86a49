use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("index ({row}, {col}) out of bounds for {rows}x{cols} buffer")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
    #[error("dimension mismatch in {op}: {}x{} vs {}x{}", .lhs.0, .lhs.1, .rhs.0, .rhs.1)]
    DimensionMismatch {
        op: &'static str,
        lhs: (usize, usize),
        rhs: (usize, usize),
    },
    #[error("size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn messages_carry_context() {
        let e = Error::IndexOutOfBounds {
            row: 3,
            col: 7,
            rows: 2,
            cols: 5,
        };
        assert_eq!(e.to_string(), "index (3, 7) out of bounds for 2x5 buffer");

        let e = Error::DimensionMismatch {
            op: "matmul",
            lhs: (2, 3),
            rhs: (2, 3),
        };
        assert_eq!(e.to_string(), "dimension mismatch in matmul: 2x3 vs 2x3");
    }
}
