use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::codecs::bmp::BmpEncoder;
use image::ColorType;
use log::{error, info};
use tracer_shared::{render_cpu, Camera, Scene};

/// Errors from writing rendered images to disk
#[derive(Debug)]
pub enum ImageOutputError {
    InvalidBufferLength { expected: usize, actual: usize },
    Io(io::Error),
    Encode(image::ImageError),
    /// Every format failed; the individual errors were logged
    AllFormatsFailed,
}

impl fmt::Display for ImageOutputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageOutputError::InvalidBufferLength { expected, actual } => write!(
                f,
                "pixel buffer has {} bytes, expected {}",
                actual, expected
            ),
            ImageOutputError::Io(err) => write!(f, "I/O error: {}", err),
            ImageOutputError::Encode(err) => write!(f, "encoding failed: {}", err),
            ImageOutputError::AllFormatsFailed => write!(f, "no image format could be written"),
        }
    }
}

impl std::error::Error for ImageOutputError {}

impl From<io::Error> for ImageOutputError {
    fn from(err: io::Error) -> Self {
        ImageOutputError::Io(err)
    }
}

impl From<image::ImageError> for ImageOutputError {
    fn from(err: image::ImageError) -> Self {
        ImageOutputError::Encode(err)
    }
}

/// Binary PPM: `P6`, dimensions and max value on three lines, then RGB rows top to bottom
pub fn encode_ppm<W: Write>(writer: &mut W, pixels: &[u8], width: u32, height: u32) -> io::Result<()> {
    write!(writer, "P6\n{} {}\n255\n", width, height)?;
    writer.write_all(pixels)
}

/// 24-bit uncompressed BMP with bottom-up BGR rows
pub fn encode_bmp<W: Write>(
    writer: &mut W,
    pixels: &[u8],
    width: u32,
    height: u32,
) -> Result<(), ImageOutputError> {
    let mut encoder = BmpEncoder::new(writer);
    encoder.encode(pixels, width, height, ColorType::Rgb8)?;
    Ok(())
}

fn timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d_%H-%M-%S-%3f").to_string()
}

fn write_file(
    path: &Path,
    encode: impl FnOnce(&mut BufWriter<File>) -> Result<(), ImageOutputError>,
) -> Result<(), ImageOutputError> {
    let mut writer = BufWriter::new(File::create(path)?);
    encode(&mut writer)?;
    writer.flush()?;
    Ok(())
}

/// Write `pixels` (packed RGB8, top row first) as `{prefix}_{timestamp}.ppm`
/// and `.bmp` under `dir`. Returns the paths that were written.
pub fn save_image(
    pixels: &[u8],
    width: u32,
    height: u32,
    dir: &Path,
    prefix: &str,
) -> Result<Vec<PathBuf>, ImageOutputError> {
    let expected = width as usize * height as usize * 3;
    if pixels.len() != expected {
        return Err(ImageOutputError::InvalidBufferLength {
            expected,
            actual: pixels.len(),
        });
    }

    fs::create_dir_all(dir)?;
    let stem = format!("{}_{}", prefix, timestamp());

    let ppm_path = dir.join(format!("{}.ppm", stem));
    let bmp_path = dir.join(format!("{}.bmp", stem));
    let results = [
        (
            ppm_path.clone(),
            write_file(&ppm_path, |w| Ok(encode_ppm(w, pixels, width, height)?)),
        ),
        (
            bmp_path.clone(),
            write_file(&bmp_path, |w| encode_bmp(w, pixels, width, height)),
        ),
    ];

    let mut written = Vec::new();
    for (path, result) in results {
        match result {
            Ok(()) => {
                info!("Saved {}", path.display());
                written.push(path);
            }
            Err(err) => error!("Failed to write {}: {}", path.display(), err),
        }
    }

    if written.is_empty() {
        return Err(ImageOutputError::AllFormatsFailed);
    }
    Ok(written)
}

/// Render the scene on the CPU and save it
pub fn capture(
    scene: &Scene,
    camera: &Camera,
    width: u32,
    height: u32,
    dir: &Path,
    prefix: &str,
) -> Result<Vec<PathBuf>, ImageOutputError> {
    info!("Rendering {}x{} screenshot on the CPU...", width, height);
    let start = Instant::now();
    let pixels = render_cpu(scene, camera, width, height);
    info!("CPU render finished in {:.2?}", start.elapsed());

    save_image(&pixels, width, height, dir, prefix)
}

#[cfg(test)]
mod test {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("sphere_tracer_{}_{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    /// Split a binary PPM into (width, height, maxval, pixel bytes)
    fn parse_ppm(data: &[u8]) -> (u32, u32, u32, &[u8]) {
        let mut fields = Vec::new();
        let mut start = 0;
        for (i, byte) in data.iter().enumerate() {
            if byte.is_ascii_whitespace() {
                fields.push(std::str::from_utf8(&data[start..i]).unwrap());
                start = i + 1;
                if fields.len() == 4 {
                    break;
                }
            }
        }
        assert_eq!(fields[0], "P6");
        (
            fields[1].parse().unwrap(),
            fields[2].parse().unwrap(),
            fields[3].parse().unwrap(),
            &data[start..],
        )
    }

    #[test]
    fn test_ppm_header_round_trip() {
        let (width, height) = (3u32, 2u32);
        let pixels: Vec<u8> = (0..width * height * 3).map(|i| i as u8 * 10).collect();
        let mut out = Vec::new();
        encode_ppm(&mut out, &pixels, width, height).unwrap();

        let text_header = std::str::from_utf8(&out[..out.len() - pixels.len()]).unwrap();
        assert_eq!(text_header.lines().count(), 3);

        let (w, h, maxval, data) = parse_ppm(&out);
        assert_eq!((w, h, maxval), (width, height, 255));
        assert_eq!(data.len(), (w * h * 3) as usize);
        assert_eq!(data, &pixels[..]);
    }

    #[test]
    fn test_bmp_single_pixel_layout() {
        let mut out = Vec::new();
        encode_bmp(&mut out, &[10, 20, 30], 1, 1).unwrap();

        let le_u32 = |at: usize| u32::from_le_bytes([out[at], out[at + 1], out[at + 2], out[at + 3]]);
        assert_eq!(out.len(), 58);
        assert_eq!(&out[0..2], b"BM");
        assert_eq!(le_u32(2), 58); // file size
        assert_eq!(le_u32(10), 54); // pixel offset
        assert_eq!(le_u32(14), 40); // DIB header size
        assert_eq!(le_u32(18), 1); // width
        assert_eq!(le_u32(22), 1); // height
        assert_eq!(u16::from_le_bytes([out[28], out[29]]), 24);
        // BGR then one byte of row padding
        assert_eq!(&out[54..57], &[30, 20, 10]);
    }

    #[test]
    fn test_bmp_single_white_pixel() {
        let mut out = Vec::new();
        encode_bmp(&mut out, &[255, 255, 255], 1, 1).unwrap();
        assert_eq!(out.len(), 58);
        assert_eq!(&out[54..58], &[255, 255, 255, 0]);
    }

    #[test]
    fn test_bmp_rows_bottom_up() {
        // top row red, bottom row blue
        let pixels = [255, 0, 0, 0, 0, 255];
        let mut out = Vec::new();
        encode_bmp(&mut out, &pixels, 1, 2).unwrap();
        assert_eq!(&out[54..57], &[255, 0, 0]); // blue, stored first
        assert_eq!(&out[58..61], &[0, 0, 255]); // red
    }

    #[test]
    fn test_save_image_creates_dir_and_both_files() {
        let dir = temp_dir("save");
        let pixels = vec![128u8; 4 * 3 * 3];

        let written = save_image(&pixels, 4, 3, &dir, "shot").unwrap();
        assert_eq!(written.len(), 2);
        for path in &written {
            assert!(path.exists());
            let name = path.file_name().unwrap().to_string_lossy().to_string();
            assert!(name.starts_with("shot_"));
        }
        assert!(written.iter().any(|p| p.extension().unwrap() == "ppm"));
        assert!(written.iter().any(|p| p.extension().unwrap() == "bmp"));

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_save_image_rejects_wrong_length() {
        let dir = temp_dir("bad_len");
        match save_image(&[0u8; 5], 2, 1, &dir, "shot") {
            Err(ImageOutputError::InvalidBufferLength { expected, actual }) => {
                assert_eq!(expected, 6);
                assert_eq!(actual, 5);
            }
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(!dir.exists());
    }

    #[test]
    fn test_timestamp_format() {
        // YYYY-MM-DD_HH-MM-SS-mmm
        let stamp = timestamp();
        assert_eq!(stamp.len(), 23);
        assert_eq!(&stamp[10..11], "_");
        assert_eq!(stamp.matches('-').count(), 5);
    }
}
