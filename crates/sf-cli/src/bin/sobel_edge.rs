use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use serde::Serialize;
use sf_core::{Buffer, Padding, normalize};
use sf_filter::kernels2d::{box_blur, gaussian, identity, sobel_x, sobel_y};
use sf_filter::{Conv2D, SobelConfig, SobelDetector};
use sf_raster::{load_raster, save_raster};

const DEMO_INPUT: &str = "sample.pgm";
const DEMO_OUTPUT: &str = "sample_edge.pgm";
const DEMO_THRESHOLD: f64 = 100.0;

#[derive(Parser, Debug)]
#[command(name = "sobel_edge")]
#[command(about = "Greyscale convolution and Sobel edge detection")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sobel gradient-magnitude edge map.
    #[command(name = "edges")]
    Edges(EdgesArgs),
    /// Convolve with a standard kernel.
    #[command(name = "convolve")]
    Convolve(ConvolveArgs),
    /// Write the synthetic demo image.
    #[command(name = "sample")]
    Sample(SampleArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PaddingArg {
    None,
    Zero,
    Replicate,
}

impl From<PaddingArg> for Padding {
    fn from(p: PaddingArg) -> Self {
        match p {
            PaddingArg::None => Padding::None,
            PaddingArg::Zero => Padding::Zero,
            PaddingArg::Replicate => Padding::Replicate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum KernelArg {
    Identity,
    Box,
    Gaussian,
    SobelX,
    SobelY,
}

#[derive(Args, Debug, Clone)]
struct OutputArgs {
    /// Rescale the result to 0..255 before saving.
    #[arg(long)]
    normalize: bool,
    /// Write run parameters as JSON.
    #[arg(long)]
    meta: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
struct EdgesArgs {
    #[arg(long, required_unless_present = "demo")]
    input: Option<PathBuf>,
    #[arg(long, required_unless_present = "demo")]
    output: Option<PathBuf>,
    /// Binarize at this magnitude (strictly greater is an edge).
    #[arg(long)]
    threshold: Option<f64>,
    #[arg(long)]
    invert: bool,
    #[arg(long, value_enum, default_value_t = PaddingArg::Replicate)]
    padding: PaddingArg,
    /// Generate sample.pgm and write sample_edge.pgm, threshold 100 unless set.
    #[arg(long, conflicts_with = "input")]
    demo: bool,
    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Args, Debug, Clone)]
struct ConvolveArgs {
    #[arg(long, required = true)]
    input: PathBuf,
    #[arg(long, required = true)]
    output: PathBuf,
    #[arg(long, value_enum, default_value_t = KernelArg::Gaussian)]
    kernel: KernelArg,
    #[arg(long, default_value_t = 3)]
    size: usize,
    #[arg(long, default_value_t = 1.0)]
    sigma: f64,
    #[arg(long, default_value_t = 1)]
    stride: usize,
    #[arg(long, value_enum, default_value_t = PaddingArg::Zero)]
    padding: PaddingArg,
    #[command(flatten)]
    out: OutputArgs,
}

#[derive(Args, Debug, Clone)]
struct SampleArgs {
    #[arg(long, default_value = DEMO_INPUT)]
    output: PathBuf,
}

#[derive(Debug, Clone, Serialize)]
struct MetaEdges {
    operation: &'static str,
    padding: &'static str,
    threshold: Option<f64>,
    invert: bool,
    normalized: bool,
    input_size: [usize; 2],
    output_size: [usize; 2],
}

#[derive(Debug, Clone, Serialize)]
struct MetaConvolve {
    operation: &'static str,
    kernel: &'static str,
    kernel_size: [usize; 2],
    sigma: Option<f64>,
    stride: usize,
    padding: &'static str,
    normalized: bool,
    input_size: [usize; 2],
    output_size: [usize; 2],
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Edges(args) => run_edges(args),
        Command::Convolve(args) => run_convolve(args),
        Command::Sample(args) => run_sample(args),
    }
}

fn run_edges(args: EdgesArgs) -> Result<()> {
    let (input, output, threshold) = if args.demo {
        let input = PathBuf::from(DEMO_INPUT);
        write_sample(&input)?;
        (
            input,
            args.output.unwrap_or_else(|| PathBuf::from(DEMO_OUTPUT)),
            args.threshold.or(Some(DEMO_THRESHOLD)),
        )
    } else {
        match (args.input, args.output) {
            (Some(i), Some(o)) => (i, o, args.threshold),
            _ => bail!("edges requires --input and --output unless --demo is given."),
        }
    };

    if let Some(t) = threshold
        && !(t.is_finite() && t >= 0.0)
    {
        bail!("threshold must be a finite non-negative number, got {t}.");
    }

    let img = load_input(&input)?;

    let cfg = SobelConfig {
        padding: args.padding.into(),
        threshold,
        invert: args.invert,
    };
    match cfg.threshold {
        Some(t) => info!("using threshold {t}"),
        None => info!("thresholding disabled"),
    }
    info!("applying Sobel edge detection ({:?} padding)", cfg.padding);

    let mut result = SobelDetector::new(cfg)
        .apply(&img)
        .context("running Sobel edge detection")?;
    if args.out.normalize {
        normalize(&mut result);
    }

    save_output(&output, &result)?;

    if let Some(meta) = &args.out.meta {
        write_json(
            meta,
            &MetaEdges {
                operation: "sobel_magnitude",
                padding: padding_name(cfg.padding),
                threshold: cfg.threshold,
                invert: cfg.invert,
                normalized: args.out.normalize,
                input_size: [img.rows(), img.cols()],
                output_size: [result.rows(), result.cols()],
            },
        )?;
    }

    info!("processing complete");
    Ok(())
}

fn run_convolve(args: ConvolveArgs) -> Result<()> {
    let kernel = build_kernel(args.kernel, args.size, args.sigma)?;
    let kernel_size = [kernel.rows(), kernel.cols()];
    let conv = Conv2D::new(kernel)
        .with_stride(args.stride)
        .with_context(|| format!("invalid stride {}", args.stride))?
        .with_padding(args.padding.into());

    let img = load_input(&args.input)?;
    let (rows, cols) = conv.output_shape(img.rows(), img.cols());
    if rows == 0 {
        bail!(
            "{}x{} kernel with stride {} leaves no output for a {}x{} input.",
            kernel_size[0],
            kernel_size[1],
            conv.stride(),
            img.rows(),
            img.cols()
        );
    }

    info!(
        "convolving with {:?} {}x{} kernel, stride {}, {:?} padding",
        args.kernel,
        kernel_size[0],
        kernel_size[1],
        conv.stride(),
        conv.padding()
    );
    let mut result = conv.apply(&img).context("running convolution")?;
    if args.out.normalize {
        normalize(&mut result);
    }

    save_output(&args.output, &result)?;

    if let Some(meta) = &args.out.meta {
        write_json(
            meta,
            &MetaConvolve {
                operation: "convolve",
                kernel: kernel_name(args.kernel),
                kernel_size,
                sigma: (args.kernel == KernelArg::Gaussian).then_some(args.sigma),
                stride: conv.stride(),
                padding: padding_name(conv.padding()),
                normalized: args.out.normalize,
                input_size: [img.rows(), img.cols()],
                output_size: [result.rows(), result.cols()],
            },
        )?;
    }

    info!("processing complete");
    Ok(())
}

fn run_sample(args: SampleArgs) -> Result<()> {
    write_sample(&args.output)
}

fn build_kernel(kind: KernelArg, size: usize, sigma: f64) -> Result<Buffer> {
    if size == 0 && matches!(kind, KernelArg::Identity | KernelArg::Box | KernelArg::Gaussian) {
        bail!("kernel size must be >= 1.");
    }

    Ok(match kind {
        KernelArg::Identity => identity(size),
        KernelArg::Box => box_blur(size),
        KernelArg::Gaussian => gaussian(size, sigma).context("building gaussian kernel")?,
        KernelArg::SobelX => sobel_x(),
        KernelArg::SobelY => sobel_y(),
    })
}

/// 200x200 test card: white square, grey disc and a horizontal ramp strip.
fn synthesize_sample() -> Buffer {
    const SIZE: usize = 200;
    let mut img = Buffer::new(SIZE, SIZE);

    for i in 0..SIZE {
        for (j, px) in img.row_mut(i).iter_mut().enumerate() {
            let mut v = 0.0;

            if (20..80).contains(&i) && (20..80).contains(&j) {
                v = 255.0;
            }

            let (di, dj) = (i as isize - 60, j as isize - 140);
            if di * di + dj * dj < 30 * 30 {
                v = 128.0;
            }

            if (120..180).contains(&i) && (20..180).contains(&j) {
                v = (j - 20) as f64 / 160.0 * 255.0;
            }

            *px = v;
        }
    }

    img
}

fn write_sample(path: &Path) -> Result<()> {
    let img = synthesize_sample();
    save_raster(path, &img)
        .with_context(|| format!("writing sample image {}", path.display()))?;
    info!("generated sample image {}", path.display());
    Ok(())
}

fn load_input(path: &Path) -> Result<Buffer> {
    info!("loading image from {}", path.display());
    let img =
        load_raster(path).with_context(|| format!("loading input image {}", path.display()))?;
    info!("image loaded, size {}x{}", img.cols(), img.rows());
    Ok(img)
}

fn save_output(path: &Path, img: &Buffer) -> Result<()> {
    info!("saving result to {}", path.display());
    save_raster(path, img).with_context(|| format!("saving image {}", path.display()))
}

fn write_json(path: &Path, value: &impl Serialize) -> Result<()> {
    let bytes = serde_json::to_vec_pretty(value).context("serializing json")?;
    fs::write(path, bytes).with_context(|| format!("writing json {}", path.display()))
}

fn padding_name(p: Padding) -> &'static str {
    match p {
        Padding::None => "none",
        Padding::Zero => "zero",
        Padding::Replicate => "replicate",
    }
}

fn kernel_name(k: KernelArg) -> &'static str {
    match k {
        KernelArg::Identity => "identity",
        KernelArg::Box => "box",
        KernelArg::Gaussian => "gaussian",
        KernelArg::SobelX => "sobel-x",
        KernelArg::SobelY => "sobel-y",
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use sf_core::Padding;

    use std::fs;

    use super::{
        Cli, Command, KernelArg, PaddingArg, build_kernel, run_edges, synthesize_sample,
    };

    #[test]
    fn sample_has_expected_regions() {
        let img = synthesize_sample();
        assert_eq!(img.shape(), (200, 200));

        assert_eq!(img.get(0, 0), Ok(0.0));
        assert_eq!(img.get(50, 50), Ok(255.0));
        assert_eq!(img.get(60, 140), Ok(128.0));
        assert_eq!(img.get(150, 20), Ok(0.0));
        assert_eq!(img.get(150, 100), Ok(127.5));
        assert_eq!(img.get(190, 100), Ok(0.0));
    }

    #[test]
    fn edges_defaults_to_replicate() {
        let cli = Cli::try_parse_from(["sobel_edge", "edges", "--input", "a.pgm", "--output", "b.pgm"])
            .expect("valid args");
        let Command::Edges(args) = cli.cmd else {
            panic!("expected edges subcommand");
        };
        assert_eq!(args.padding, PaddingArg::Replicate);
        assert_eq!(Padding::from(args.padding), Padding::Replicate);
        assert!(args.threshold.is_none());
        assert!(!args.invert);
    }

    #[test]
    fn edges_requires_paths_without_demo() {
        assert!(Cli::try_parse_from(["sobel_edge", "edges", "--input", "a.pgm"]).is_err());
        assert!(Cli::try_parse_from(["sobel_edge", "edges", "--demo"]).is_ok());
    }

    #[test]
    fn demo_refuses_user_input_path() {
        let err = Cli::try_parse_from([
            "sobel_edge", "edges", "--demo", "--input", "mine.pgm", "--output", "o.pgm",
        ])
        .expect_err("--demo conflicts with --input");
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);

        let cli = Cli::try_parse_from(["sobel_edge", "edges", "--demo", "--output", "o.pgm"])
            .expect("demo with custom output");
        let Command::Edges(args) = cli.cmd else {
            panic!("expected edges subcommand");
        };
        assert!(args.input.is_none());
    }

    #[test]
    fn edges_leaves_input_file_untouched() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("mine.pgm");
        let output = dir.path().join("o.pgm");
        let original = "P2\n2 1\n255\n7 9\n";
        fs::write(&input, original).expect("write");

        let cli = Cli::try_parse_from([
            "sobel_edge",
            "edges",
            "--input",
            input.to_str().expect("utf-8 temp path"),
            "--output",
            output.to_str().expect("utf-8 temp path"),
        ])
        .expect("valid args");
        let Command::Edges(args) = cli.cmd else {
            panic!("expected edges subcommand");
        };
        run_edges(args).expect("edges run");

        assert_eq!(fs::read_to_string(&input).expect("input still readable"), original);
        assert!(output.exists());
    }

    #[test]
    fn convolve_parses_kernel_options() {
        let cli = Cli::try_parse_from([
            "sobel_edge",
            "convolve",
            "--input",
            "a.pgm",
            "--output",
            "b.pgm",
            "--kernel",
            "sobel-x",
            "--stride",
            "2",
            "--padding",
            "none",
        ])
        .expect("valid args");
        let Command::Convolve(args) = cli.cmd else {
            panic!("expected convolve subcommand");
        };
        assert_eq!(args.kernel, KernelArg::SobelX);
        assert_eq!(args.stride, 2);
        assert_eq!(args.padding, PaddingArg::None);
    }

    #[test]
    fn kernel_building_validates_inputs() {
        assert!(build_kernel(KernelArg::Gaussian, 5, 0.0).is_err());
        assert!(build_kernel(KernelArg::Box, 0, 1.0).is_err());

        let k = build_kernel(KernelArg::Gaussian, 5, 1.0).expect("valid");
        assert!((k.sum() - 1.0).abs() < 1e-9);
        assert_eq!(build_kernel(KernelArg::SobelY, 0, 1.0).expect("fixed").shape(), (3, 3));
    }
}
