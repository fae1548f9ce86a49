//! Greyscale raster files to and from [`sf_core::Buffer`].
//!
//! Loading accepts any format the `image` crate decodes for the enabled
//! features (PGM `P2`/`P5`, PNG); colour input is converted to luma.
//! Saving writes ASCII PGM (`P2`, maxval 255) unless the path ends in
//! `.png`. Samples are truncated toward zero and clamped to `[0, 255]`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding};
use image::{ExtendedColorType, GrayImage, ImageEncoder, ImageError};
use log::debug;
use sf_core::{Buffer, to_u8_clamped};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RasterError {
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot decode {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
    #[error("cannot encode {}: {source}", .path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
    #[error("refusing to save empty {rows}x{cols} raster to {}", .path.display())]
    Empty {
        path: PathBuf,
        rows: usize,
        cols: usize,
    },
    #[error(transparent)]
    Buffer(#[from] sf_core::Error),
}

pub fn load_raster(path: impl AsRef<Path>) -> Result<Buffer, RasterError> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|e| match e {
        ImageError::IoError(source) => RasterError::Io {
            path: path.to_path_buf(),
            source,
        },
        source => RasterError::Decode {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let luma = img.to_luma8();
    let (w, h) = luma.dimensions();
    debug!("loaded {}: {w}x{h}", path.display());

    Ok(Buffer::from_u8(h as usize, w as usize, luma.as_raw())?)
}

pub fn save_raster(path: impl AsRef<Path>, buf: &Buffer) -> Result<(), RasterError> {
    let path = path.as_ref();
    if buf.is_empty() {
        return Err(RasterError::Empty {
            path: path.to_path_buf(),
            rows: buf.rows(),
            cols: buf.cols(),
        });
    }

    let width = dim_u32(buf.cols())?;
    let height = dim_u32(buf.rows())?;
    let pixels = to_u8_clamped(buf);
    let encode_err = |source| RasterError::Encode {
        path: path.to_path_buf(),
        source,
    };

    if is_png(path) {
        let expected = buf.rows() * buf.cols();
        let gray = GrayImage::from_raw(width, height, pixels).ok_or(sf_core::Error::SizeMismatch {
            expected,
            actual: buf.data().len(),
        })?;
        gray.save(path).map_err(encode_err)?;
    } else {
        let io_err = |source| RasterError::Io {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(io_err)?;
        let mut out = BufWriter::new(file);
        PnmEncoder::new(&mut out)
            .with_subtype(PnmSubtype::Graymap(SampleEncoding::Ascii))
            .write_image(&pixels, width, height, ExtendedColorType::L8)
            .map_err(encode_err)?;
        out.flush().map_err(io_err)?;
    }

    debug!("saved {}: {width}x{height}", path.display());
    Ok(())
}

fn dim_u32(n: usize) -> Result<u32, RasterError> {
    u32::try_from(n).map_err(|_| {
        RasterError::Buffer(sf_core::Error::InvalidArgument(format!(
            "raster dimension {n} exceeds u32"
        )))
    })
}

fn is_png(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use sf_core::Buffer;

    use super::{RasterError, load_raster, save_raster};

    #[test]
    fn ascii_pgm_with_comments_loads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("a.pgm");
        fs::write(&path, "P2\n# made by hand\n3 2\n255\n0 10 20\n30 40 255\n").expect("write");

        let buf = load_raster(&path).expect("valid pgm");
        assert_eq!(buf.shape(), (2, 3));
        assert_eq!(buf.data(), &[0.0, 10.0, 20.0, 30.0, 40.0, 255.0]);
    }

    #[test]
    fn binary_pgm_loads() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("b.pgm");
        let mut bytes = b"P5\n2 2\n255\n".to_vec();
        bytes.extend_from_slice(&[1, 2, 250, 9]);
        fs::write(&path, bytes).expect("write");

        let buf = load_raster(&path).expect("valid pgm");
        assert_eq!(buf.shape(), (2, 2));
        assert_eq!(buf.data(), &[1.0, 2.0, 250.0, 9.0]);
    }

    #[test]
    fn save_clamps_and_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.pgm");
        let buf = Buffer::from_rows(&[[-5.0, 12.9, 300.0], [255.0, 0.4, 128.5]]).expect("valid");

        save_raster(&path, &buf).expect("save");
        let text = fs::read_to_string(&path).expect("ascii pgm");
        assert!(text.starts_with("P2"));

        let back = load_raster(&path).expect("reload");
        assert_eq!(back.shape(), (2, 3));
        assert_eq!(back.data(), &[0.0, 12.0, 255.0, 255.0, 0.0, 128.0]);
    }

    #[test]
    fn png_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.png");
        let buf = Buffer::from_rows(&[[0.0, 64.0], [128.0, 255.0]]).expect("valid");

        save_raster(&path, &buf).expect("save");
        assert_eq!(load_raster(&path).expect("reload"), buf);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_raster(dir.path().join("nope.pgm")).expect_err("missing");
        assert!(matches!(err, RasterError::Io { .. }));
    }

    #[test]
    fn malformed_file_is_decode_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.pgm");
        fs::write(&path, "XX\n3 2\n255\n1 2 3\n4 5 6\n").expect("write");

        let err = load_raster(&path).expect_err("bad magic");
        assert!(matches!(err, RasterError::Decode { .. }));
    }

    #[test]
    fn empty_buffer_is_not_saved() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("empty.pgm");

        let err = save_raster(&path, &Buffer::new(0, 0)).expect_err("empty");
        assert!(matches!(err, RasterError::Empty { .. }));
        assert!(!path.exists());
    }
}
