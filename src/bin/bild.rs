//! bild CLI - wavelet image compression from the command line.
//!
//! Reads BMP, PNG and PNM rasters and writes BILD containers, and back.

use bild_rs::constants::{DEFAULT_QUALITY, MAX_QUALITY, MIN_QUALITY};
use bild_rs::{Image, compress_to_file, decompress_file, read_file_info};
use clap::{Parser, Subcommand};
use image::DynamicImage;
use log::info;
use std::path::{Path, PathBuf};

/// Wavelet based image compression
#[derive(Parser)]
#[command(name = "bild")]
#[command(version)]
#[command(about = "Compress images into BILD files and restore them", long_about = None)]
#[command(after_help = "EXAMPLES:
    bild compress -i photo.bmp -o photo.bild -q 4
    bild decompress -i photo.bild -o restored.png
    bild info -i photo.bild

QUALITY:
    0 is lossless, 1-7 trade detail for size. Above 2 the coefficient
    stream is run-length coded before entropy coding.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compress a raster image into a BILD file
    #[command(visible_alias = "c")]
    Compress {
        /// Input image (BMP, PNG or PNM)
        #[arg(short, long)]
        input: PathBuf,

        /// Output BILD file, defaults to the input with a .bild extension
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Quality level, 0 (lossless) to 7
        #[arg(
            short,
            long,
            default_value_t = DEFAULT_QUALITY,
            value_parser = clap::value_parser!(u32).range(MIN_QUALITY as i64..=MAX_QUALITY as i64)
        )]
        quality: u32,
    },

    /// Decompress a BILD file into a raster image
    ///
    /// The output format follows the output file extension.
    #[command(visible_alias = "d")]
    Decompress {
        /// Input BILD file
        #[arg(short, long)]
        input: PathBuf,

        /// Output image, defaults to the input with a .bmp extension
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write a single channel grayscale image
        #[arg(short, long)]
        grayscale: bool,
    },

    /// Print the header of a BILD file
    #[command(visible_alias = "i")]
    Info {
        /// Input BILD file
        #[arg(short, long)]
        input: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Compress {
            input,
            output,
            quality,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("bild"));
            compress(&input, &output, quality)
        }
        Commands::Decompress {
            input,
            output,
            grayscale,
        } => {
            let output = output.unwrap_or_else(|| input.with_extension("bmp"));
            decompress(&input, &output, grayscale)
        }
        Commands::Info { input } => show_info(&input),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn load_image(input: &Path) -> Result<Image, Box<dyn std::error::Error>> {
    let image = match image::open(input)? {
        DynamicImage::ImageLuma8(gray) => {
            let (width, height) = gray.dimensions();
            Image::from_gray8(width, height, gray.as_raw())?
        }
        other => {
            let rgb = other.to_rgb8();
            let (width, height) = rgb.dimensions();
            Image::from_rgb8(width, height, rgb.as_raw())?
        }
    };
    Ok(image)
}

fn compress(input: &Path, output: &Path, quality: u32) -> Result<(), Box<dyn std::error::Error>> {
    let image = load_image(input)?;
    info!(
        "Loaded {}x{} image from {:?}",
        image.width(),
        image.height(),
        input
    );

    let size = compress_to_file(&image, output, quality)?;
    let raw_size = image.width() * image.height() * 3;
    println!(
        "✓ Compressed {}x{} image to {:?} at quality {} ({} of {} bytes)",
        image.width(),
        image.height(),
        output,
        quality,
        size,
        raw_size
    );
    Ok(())
}

fn decompress(
    input: &Path,
    output: &Path,
    grayscale: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let image = decompress_file(input)?;
    let (width, height) = (image.width() as u32, image.height() as u32);

    if grayscale {
        image::GrayImage::from_raw(width, height, image.to_gray8())
            .ok_or("decoded image does not match its dimensions")?
            .save(output)?;
    } else {
        image::RgbImage::from_raw(width, height, image.to_rgb8())
            .ok_or("decoded image does not match its dimensions")?
            .save(output)?;
    }

    println!("✓ Decompressed {}x{} image to {:?}", width, height, output);
    Ok(())
}

fn show_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let header = read_file_info(input)?;

    println!("BILD version............... {}", header.version);
    println!("Image size (bytes)........ {}", header.raw_size());
    println!(
        "Image dimension (pixels).. {} x {} (width x height)",
        header.width, header.height
    );
    println!("Quality................... {}", header.quality);
    Ok(())
}
