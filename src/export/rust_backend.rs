//! Pure Rust export backend — zero external dependencies.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image` crate (pure Rust decoders) |
//! | Decode (AVIF) | `avif-parse` + `rav1d` + custom YUV→RGB ([`avif`](super::avif)) |
//! | Resize | `image::imageops` with `Lanczos3` filter |
//! | Exact crop | cover-resize + anchored `crop_imm` |
//! | Alpha flatten | composite onto opaque white |
//! | Encode → JPEG | `JpegEncoder::new_with_quality` |
//! | Encode → PNG | `PngEncoder` with best compression |
//! | EXIF carry-over | raw APP1 splice ([`exif`](super::exif)) |
//! | Atomic write | `tempfile::NamedTempFile::persist` |

use super::avif;
use super::backend::{Dimensions, ExportError, ImageBackend};
use super::calculations::{
    contain_dimensions, cover_dimensions, crop_origin, scale_to_height, scale_to_width,
};
use super::exif;
use super::params::{ExportParams, OutputFormat, Quality, ResizeMode};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage};
use std::io::Write;
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in and known to work.
///
/// AVIF is deliberately excluded here: the `image` crate's `"avif"` feature
/// only enables the encoder, and `ImageFormat::reading_enabled()` still
/// reports `true` for it. Our own rav1d-based decoder covers AVIF instead.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    let mut exts: Vec<&'static str> = PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect();
    // AVIF is decoded via our rav1d-based decoder (not the image crate)
    exts.push("avif");
    exts
});

/// Image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn extension_lower(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Load and decode a source image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, ExportError> {
    if avif::is_avif(path) {
        return avif::decode(path);
    }
    // HEVC-encoded HEIC has no pure-Rust decoder; fail with a pointer to
    // the supported phone container rather than a generic decode error.
    if matches!(extension_lower(path).as_str(), "heic" | "heif") {
        return Err(ExportError::Decode(format!(
            "{}: HEVC-encoded HEIC is not supported; export from the phone as AVIF or JPEG",
            path.display()
        )));
    }
    ImageReader::open(path)
        .map_err(ExportError::Io)?
        .decode()
        .map_err(|e| ExportError::Decode(format!("{}: {e}", path.display())))
}

/// Apply exactly one resize transform.
fn apply_mode(img: DynamicImage, mode: &ResizeMode) -> Result<DynamicImage, ExportError> {
    let source = (img.width(), img.height());

    match *mode {
        ResizeMode::Passthrough => Ok(img),
        ResizeMode::Exact {
            width,
            height,
            focus,
        } => {
            let cover = cover_dimensions(source, (width, height));
            let covered = img.resize_exact(cover.0, cover.1, FilterType::Lanczos3);
            let (x, y) = crop_origin(cover, (width, height), focus.anchor_y());
            Ok(covered.crop_imm(x, y, width, height))
        }
        ResizeMode::Box { width, height } => Ok(resize_within(img, (width, height))),
        ResizeMode::MaxBound {
            max_width,
            max_height,
        } => match (max_width, max_height) {
            (Some(w), Some(h)) => Ok(resize_within(img, (w, h))),
            (Some(w), None) => {
                let (tw, th) = scale_to_width(source, w);
                Ok(img.resize_exact(tw, th, FilterType::Lanczos3))
            }
            (None, Some(h)) => {
                let (tw, th) = scale_to_height(source, h);
                Ok(img.resize_exact(tw, th, FilterType::Lanczos3))
            }
            (None, None) => Err(ExportError::InvalidParameter(
                "max mode requires at least one of max width / max height".to_string(),
            )),
        },
    }
}

/// Downscale to fit inside `bounds`, skipping the resample entirely when the
/// source already fits.
fn resize_within(img: DynamicImage, bounds: (u32, u32)) -> DynamicImage {
    let source = (img.width(), img.height());
    let target = contain_dimensions(source, bounds);
    if target == source {
        img
    } else {
        img.resize_exact(target.0, target.1, FilterType::Lanczos3)
    }
}

/// JPEG cannot carry alpha: flatten transparent sources onto opaque white.
/// White is the documented, consistent background for this policy.
fn normalize_color(img: DynamicImage, format: OutputFormat) -> DynamicImage {
    if format == OutputFormat::Jpeg && img.color().has_alpha() {
        flatten_onto_white(&img)
    } else {
        img
    }
}

fn flatten_onto_white(img: &DynamicImage) -> DynamicImage {
    let rgba = img.to_rgba8();
    let mut rgb = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, px) in rgba.enumerate_pixels() {
        let a = px[3] as u32;
        let blend = |c: u8| ((c as u32 * a + 255 * (255 - a)) / 255) as u8;
        rgb.put_pixel(x, y, Rgb([blend(px[0]), blend(px[1]), blend(px[2])]));
    }
    DynamicImage::ImageRgb8(rgb)
}

/// Encode to an in-memory buffer so a failed encode never touches disk.
fn encode(
    img: &DynamicImage,
    format: OutputFormat,
    quality: Quality,
) -> Result<Vec<u8>, ExportError> {
    let mut buf = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut buf, quality.value() as u8);
            img.write_with_encoder(encoder)
                .map_err(|e| ExportError::Write(format!("JPEG encode failed: {e}")))?;
        }
        OutputFormat::Png => {
            // PNG is lossless; quality does not apply
            let encoder =
                PngEncoder::new_with_quality(&mut buf, CompressionType::Best, PngFilter::Adaptive);
            img.write_with_encoder(encoder)
                .map_err(|e| ExportError::Write(format!("PNG encode failed: {e}")))?;
        }
    }
    Ok(buf)
}

/// Write through a temp file in the destination directory and rename into
/// place. On any failure the output path is left untouched.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ExportError> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        ExportError::Write(format!("cannot create file in {}: {e}", dir.display()))
    })?;
    tmp.write_all(bytes)
        .map_err(|e| ExportError::Write(format!("cannot write {}: {e}", path.display())))?;
    tmp.persist(path)
        .map_err(|e| ExportError::Write(format!("cannot write {}: {}", path.display(), e.error)))?;
    Ok(())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, ExportError> {
        if avif::is_avif(path) {
            return avif::identify(path);
        }
        let (width, height) = image::image_dimensions(path)
            .map_err(|e| ExportError::Decode(format!("{}: {e}", path.display())))?;
        Ok(Dimensions { width, height })
    }

    fn export(&self, params: &ExportParams) -> Result<(), ExportError> {
        let img = load_image(&params.source)?;
        let shaped = apply_mode(img, &params.mode)?;
        let normalized = normalize_color(shaped, params.format);
        let mut bytes = encode(&normalized, params.format, params.quality)?;

        // Splice the source's EXIF segment into the fresh encode. Only a
        // JPEG source has one to lift, only a JPEG output can hold it.
        if params.keep_metadata && params.format == OutputFormat::Jpeg {
            let src_bytes = std::fs::read(&params.source).map_err(ExportError::Io)?;
            if let Some(segment) = exif::extract_exif(&src_bytes) {
                bytes = exif::embed_exif(&bytes, &segment);
            }
        }

        write_atomic(&params.output, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::params::Focus;
    use image::{ExtendedColorType, ImageEncoder, Rgba, RgbaImage};

    #[test]
    fn supported_extensions_cover_expected_formats() {
        let exts = supported_input_extensions();
        for expected in &["jpg", "jpeg", "png", "tif", "tiff", "webp", "avif"] {
            assert!(
                exts.contains(expected),
                "expected {expected} in supported extensions"
            );
        }
    }

    /// Create a small valid JPEG file with the given dimensions.
    fn create_test_jpeg(path: &Path, width: u32, height: u32) {
        let img = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let file = std::fs::File::create(path).unwrap();
        let writer = std::io::BufWriter::new(file);
        JpegEncoder::new(writer)
            .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
            .unwrap();
    }

    /// Create a PNG with a semi-transparent gradient.
    fn create_test_rgba_png(path: &Path, width: u32, height: u32) {
        let img = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([200, 40, 40, ((x + y) % 256) as u8])
        });
        img.save(path).unwrap();
    }

    fn jpeg_params(source: &Path, output: &Path, mode: ResizeMode) -> ExportParams {
        ExportParams {
            source: source.to_path_buf(),
            output: output.to_path_buf(),
            mode,
            format: OutputFormat::Jpeg,
            quality: Quality::new(85),
            keep_metadata: false,
        }
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        create_test_jpeg(&path, 200, 150);

        let dims = RustBackend::new().identify(&path).unwrap();
        assert_eq!(dims.width, 200);
        assert_eq!(dims.height, 150);
    }

    #[test]
    fn identify_nonexistent_file_errors() {
        let result = RustBackend::new().identify(Path::new("/nonexistent/image.jpg"));
        assert!(result.is_err());
    }

    #[test]
    fn exact_mode_hits_target_dimensions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 400, 300);

        let output = tmp.path().join("banner.jpg");
        let backend = RustBackend::new();
        backend
            .export(&jpeg_params(
                &source,
                &output,
                ResizeMode::Exact {
                    width: 200,
                    height: 50,
                    focus: Focus::Center,
                },
            ))
            .unwrap();

        let dims = backend.identify(&output).unwrap();
        assert_eq!((dims.width, dims.height), (200, 50));
    }

    #[test]
    fn box_mode_fits_inside_bounds() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 400, 300);

        let output = tmp.path().join("boxed.jpg");
        let backend = RustBackend::new();
        backend
            .export(&jpeg_params(
                &source,
                &output,
                ResizeMode::Box {
                    width: 160,
                    height: 213,
                },
            ))
            .unwrap();

        let dims = backend.identify(&output).unwrap();
        assert_eq!((dims.width, dims.height), (160, 120));
    }

    #[test]
    fn box_mode_never_upscales() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 120, 90);

        let output = tmp.path().join("boxed.jpg");
        let backend = RustBackend::new();
        backend
            .export(&jpeg_params(
                &source,
                &output,
                ResizeMode::Box {
                    width: 1600,
                    height: 2133,
                },
            ))
            .unwrap();

        let dims = backend.identify(&output).unwrap();
        assert_eq!((dims.width, dims.height), (120, 90));
    }

    #[test]
    fn max_bound_single_width_scales_proportionally() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 400, 300);

        let output = tmp.path().join("max.jpg");
        let backend = RustBackend::new();
        backend
            .export(&jpeg_params(
                &source,
                &output,
                ResizeMode::MaxBound {
                    max_width: Some(200),
                    max_height: None,
                },
            ))
            .unwrap();

        let dims = backend.identify(&output).unwrap();
        assert_eq!((dims.width, dims.height), (200, 150));
    }

    #[test]
    fn passthrough_preserves_dimensions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 123, 77);

        let output = tmp.path().join("copy.jpg");
        let backend = RustBackend::new();
        backend
            .export(&jpeg_params(&source, &output, ResizeMode::Passthrough))
            .unwrap();

        let dims = backend.identify(&output).unwrap();
        assert_eq!((dims.width, dims.height), (123, 77));
    }

    #[test]
    fn rgba_source_flattens_for_jpeg_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        create_test_rgba_png(&source, 64, 64);

        let output = tmp.path().join("flat.jpg");
        RustBackend::new()
            .export(&jpeg_params(&source, &output, ResizeMode::Passthrough))
            .unwrap();

        let decoded = image::open(&output).unwrap();
        assert!(!decoded.color().has_alpha());
    }

    #[test]
    fn rgba_source_keeps_alpha_for_png_output() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.png");
        create_test_rgba_png(&source, 64, 64);

        let output = tmp.path().join("copy.png");
        let mut params = jpeg_params(&source, &output, ResizeMode::Passthrough);
        params.format = OutputFormat::Png;
        RustBackend::new().export(&params).unwrap();

        let decoded = image::open(&output).unwrap();
        assert!(decoded.color().has_alpha());
    }

    #[test]
    fn unwritable_destination_errors_and_leaves_no_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 100, 100);

        let output = tmp.path().join("no-such-dir").join("out.jpg");
        let result =
            RustBackend::new().export(&jpeg_params(&source, &output, ResizeMode::Passthrough));

        assert!(matches!(result, Err(ExportError::Write(_))));
        assert!(!output.exists());
    }

    #[test]
    fn corrupt_source_is_a_decode_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("broken.jpg");
        std::fs::write(&source, b"not a jpeg at all").unwrap();

        let output = tmp.path().join("out.jpg");
        let result =
            RustBackend::new().export(&jpeg_params(&source, &output, ResizeMode::Passthrough));

        assert!(matches!(result, Err(ExportError::Decode(_))));
        assert!(!output.exists());
    }

    #[test]
    fn heic_source_gets_a_pointed_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("IMG_0001.heic");
        std::fs::write(&source, b"ftypheic").unwrap();

        let output = tmp.path().join("out.jpg");
        let result =
            RustBackend::new().export(&jpeg_params(&source, &output, ResizeMode::Passthrough));

        match result {
            Err(ExportError::Decode(msg)) => assert!(msg.contains("HEIC")),
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn default_export_strips_exif() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 100, 100);

        // Graft a synthetic EXIF segment onto the source
        let tagged = exif::embed_exif(
            &std::fs::read(&source).unwrap(),
            b"Exif\0\0II*\0\x08\0\0\0",
        );
        std::fs::write(&source, tagged).unwrap();

        let output = tmp.path().join("stripped.jpg");
        RustBackend::new()
            .export(&jpeg_params(&source, &output, ResizeMode::Passthrough))
            .unwrap();

        assert_eq!(exif::extract_exif(&std::fs::read(&output).unwrap()), None);
    }

    #[test]
    fn keep_metadata_carries_exif_over() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("source.jpg");
        create_test_jpeg(&source, 100, 100);

        let segment = b"Exif\0\0II*\0\x08\0\0\0".to_vec();
        let tagged = exif::embed_exif(&std::fs::read(&source).unwrap(), &segment);
        std::fs::write(&source, tagged).unwrap();

        let output = tmp.path().join("kept.jpg");
        let mut params = jpeg_params(&source, &output, ResizeMode::Passthrough);
        params.keep_metadata = true;
        RustBackend::new().export(&params).unwrap();

        let out_bytes = std::fs::read(&output).unwrap();
        assert_eq!(exif::extract_exif(&out_bytes), Some(segment));
        // The tagged output still decodes cleanly
        let decoded = image::open(&output).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (100, 100));
    }

    #[test]
    fn avif_source_exports_to_jpeg() {
        let tmp = tempfile::TempDir::new().unwrap();
        let source = tmp.path().join("phone.avif");
        let img = RgbImage::from_fn(200, 150, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
        let file = std::fs::File::create(&source).unwrap();
        let encoder = image::codecs::avif::AvifEncoder::new_with_speed_quality(
            std::io::BufWriter::new(file),
            6,
            85,
        );
        DynamicImage::ImageRgb8(img)
            .write_with_encoder(encoder)
            .unwrap();

        let output = tmp.path().join("phone.jpg");
        let backend = RustBackend::new();
        backend
            .export(&jpeg_params(
                &source,
                &output,
                ResizeMode::Box {
                    width: 100,
                    height: 100,
                },
            ))
            .unwrap();

        let dims = backend.identify(&output).unwrap();
        assert_eq!((dims.width, dims.height), (100, 75));
    }
}
