//! AVIF decode support — the phone-container input path.
//!
//! AVIF shares the ISOBMFF/HEIF container family with the `.heic` files
//! phones produce, but carries an AV1 payload that has a pure-Rust decoder.
//! The `image` crate's `"avif"` feature only enables the **encoder** (rav1e);
//! decoding would require `"avif-native"` and the C library dav1d. Instead,
//! `avif-parse` reads the container and `rav1d` (the Rust port of dav1d)
//! decodes the primary item, followed by a BT.601 YUV→RGB conversion here.

use super::backend::{Dimensions, ExportError};
use image::DynamicImage;
use std::path::Path;

/// True when the path's extension says AVIF, case-insensitively.
pub fn is_avif(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("avif"))
}

fn parse_container(path: &Path) -> Result<avif_parse::AvifData, ExportError> {
    let bytes = std::fs::read(path).map_err(ExportError::Io)?;
    avif_parse::read_avif(&mut std::io::Cursor::new(&bytes)).map_err(|e| {
        ExportError::Decode(format!("not a valid AVIF container {}: {e:?}", path.display()))
    })
}

/// Read dimensions from the container metadata without decoding any pixels.
pub fn identify(path: &Path) -> Result<Dimensions, ExportError> {
    let avif = parse_container(path)?;
    let meta = avif.primary_item_metadata().map_err(|e| {
        ExportError::Decode(format!("unreadable AVIF metadata {}: {e:?}", path.display()))
    })?;
    Ok(Dimensions {
        width: meta.max_frame_width.get(),
        height: meta.max_frame_height.get(),
    })
}

/// Decode the primary item of an AVIF file to an RGB image.
pub fn decode(path: &Path) -> Result<DynamicImage, ExportError> {
    let avif = parse_container(path)?;
    decode_av1(&avif.primary_item)
        .map_err(|reason| ExportError::Decode(format!("{} ({reason})", path.display())))
}

/// Drive rav1d over one AV1 temporal unit and convert the picture to RGB.
fn decode_av1(av1_bytes: &[u8]) -> Result<DynamicImage, String> {
    use rav1d::include::dav1d::data::Dav1dData;
    use rav1d::include::dav1d::dav1d::Dav1dSettings;
    use rav1d::include::dav1d::headers::{
        DAV1D_PIXEL_LAYOUT_I400, DAV1D_PIXEL_LAYOUT_I420, DAV1D_PIXEL_LAYOUT_I422,
        DAV1D_PIXEL_LAYOUT_I444,
    };
    use rav1d::include::dav1d::picture::Dav1dPicture;
    use std::ptr::NonNull;

    let mut settings = std::mem::MaybeUninit::<Dav1dSettings>::uninit();
    unsafe {
        rav1d::src::lib::dav1d_default_settings(NonNull::new(settings.as_mut_ptr()).unwrap())
    };
    let mut settings = unsafe { settings.assume_init() };
    // One still image: a single thread and no frame delay
    settings.n_threads = 1;
    settings.max_frame_delay = 1;

    let mut ctx = None;
    let rc =
        unsafe { rav1d::src::lib::dav1d_open(NonNull::new(&mut ctx), NonNull::new(&mut settings)) };
    if rc.0 != 0 {
        return Err(format!("decoder init failed, code {}", rc.0));
    }

    let mut data = Dav1dData::default();
    let buf_ptr =
        unsafe { rav1d::src::lib::dav1d_data_create(NonNull::new(&mut data), av1_bytes.len()) };
    if buf_ptr.is_null() {
        unsafe { rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx)) };
        return Err("could not allocate decoder input buffer".to_string());
    }
    unsafe { std::ptr::copy_nonoverlapping(av1_bytes.as_ptr(), buf_ptr, av1_bytes.len()) };

    let rc = unsafe { rav1d::src::lib::dav1d_send_data(ctx, NonNull::new(&mut data)) };
    if rc.0 != 0 {
        unsafe {
            rav1d::src::lib::dav1d_data_unref(NonNull::new(&mut data));
            rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx));
        }
        return Err(format!("decoder rejected AV1 data, code {}", rc.0));
    }

    let mut pic: Dav1dPicture = unsafe { std::mem::zeroed() };
    let rc = unsafe { rav1d::src::lib::dav1d_get_picture(ctx, NonNull::new(&mut pic)) };
    if rc.0 != 0 {
        unsafe { rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx)) };
        return Err(format!("no decodable picture, code {}", rc.0));
    }

    let width = pic.p.w as u32;
    let height = pic.p.h as u32;
    let bpc = pic.p.bpc as u32;
    let layout = pic.p.layout;

    let chroma = match layout {
        DAV1D_PIXEL_LAYOUT_I400 => None,
        DAV1D_PIXEL_LAYOUT_I420 => Some((true, true)),
        DAV1D_PIXEL_LAYOUT_I422 => Some((true, false)),
        DAV1D_PIXEL_LAYOUT_I444 => Some((false, false)),
        other => {
            unsafe {
                rav1d::src::lib::dav1d_picture_unref(NonNull::new(&mut pic));
                rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx));
            }
            return Err(format!("unsupported pixel layout {other}"));
        }
    };

    let planes = Planes {
        luma: pic.data[0].unwrap().as_ptr() as *const u8,
        luma_stride: pic.stride[0],
        chroma: chroma.map(|(ss_x, ss_y)| ChromaPlanes {
            cb: pic.data[1].unwrap().as_ptr() as *const u8,
            cr: pic.data[2].unwrap().as_ptr() as *const u8,
            stride: pic.stride[1],
            ss_x,
            ss_y,
        }),
        width,
        height,
        bpc,
    };
    let rgb = planes.to_rgb();

    unsafe {
        rav1d::src::lib::dav1d_picture_unref(NonNull::new(&mut pic));
        rav1d::src::lib::dav1d_close(NonNull::new(&mut ctx));
    }

    image::RgbImage::from_raw(width, height, rgb)
        .map(DynamicImage::ImageRgb8)
        .ok_or_else(|| "decoded plane sizes are inconsistent".to_string())
}

/// Borrowed view of a decoded picture's planes. `chroma` is `None` for
/// monochrome (I400) pictures.
struct Planes {
    luma: *const u8,
    luma_stride: isize,
    chroma: Option<ChromaPlanes>,
    width: u32,
    height: u32,
    bpc: u32,
}

struct ChromaPlanes {
    cb: *const u8,
    cr: *const u8,
    stride: isize,
    /// Chroma subsampling: horizontal, vertical (I420 = true, true)
    ss_x: bool,
    ss_y: bool,
}

impl Planes {
    /// Convert to interleaved RGB8 using BT.601 coefficients, scaling
    /// 10/12-bit samples down to 8 bits.
    fn to_rgb(&self) -> Vec<u8> {
        let max_val = ((1u32 << self.bpc) - 1) as f32;
        let center = (1u32 << (self.bpc - 1)) as f32;
        let scale = 255.0 / max_val;

        let mut rgb = Vec::with_capacity((self.width * self.height * 3) as usize);

        for row in 0..self.height {
            for col in 0..self.width {
                let y = sample(self.luma, self.luma_stride, col, row, self.bpc);

                let (r, g, b) = match &self.chroma {
                    None => {
                        let v = (y * scale).clamp(0.0, 255.0);
                        (v, v, v)
                    }
                    Some(c) => {
                        let cx = if c.ss_x { col / 2 } else { col };
                        let cy = if c.ss_y { row / 2 } else { row };
                        let cb = sample(c.cb, c.stride, cx, cy, self.bpc) - center;
                        let cr = sample(c.cr, c.stride, cx, cy, self.bpc) - center;

                        (
                            ((y + 1.402 * cr) * scale).clamp(0.0, 255.0),
                            ((y - 0.344136 * cb - 0.714136 * cr) * scale).clamp(0.0, 255.0),
                            ((y + 1.772 * cb) * scale).clamp(0.0, 255.0),
                        )
                    }
                };

                rgb.push(r as u8);
                rgb.push(g as u8);
                rgb.push(b as u8);
            }
        }

        rgb
    }
}

/// Read one sample from a plane, handling 8-bit and 16-bit storage.
#[inline]
fn sample(ptr: *const u8, stride: isize, x: u32, y: u32, bpc: u32) -> f32 {
    if bpc <= 8 {
        (unsafe { *ptr.offset(y as isize * stride + x as isize) }) as f32
    } else {
        // 10-bit and 12-bit samples are stored as u16
        let offset = y as isize * stride + x as isize * 2;
        (unsafe { *(ptr.offset(offset) as *const u16) }) as f32
    }
}
