//! Pure calculation functions for target dimensions and crop placement.
//!
//! All functions here are pure and testable without any I/O or images.

/// Scale to fit inside `bounds` preserving aspect ratio, never upscaling.
///
/// Returns the source dimensions unchanged when they already fit.
/// Both result dimensions are at least 1.
pub fn contain_dimensions(source: (u32, u32), bounds: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = bounds;

    let scale = (max_w as f64 / src_w as f64)
        .min(max_h as f64 / src_h as f64)
        .min(1.0);

    scaled(source, scale)
}

/// Scale to an exact width, height following proportionally.
pub fn scale_to_width(source: (u32, u32), width: u32) -> (u32, u32) {
    let (src_w, _) = source;
    scaled(source, width as f64 / src_w as f64)
}

/// Scale to an exact height, width following proportionally.
pub fn scale_to_height(source: (u32, u32), height: u32) -> (u32, u32) {
    let (_, src_h) = source;
    scaled(source, height as f64 / src_h as f64)
}

fn scaled(source: (u32, u32), scale: f64) -> (u32, u32) {
    let (src_w, src_h) = source;
    let w = (src_w as f64 * scale).round().max(1.0) as u32;
    let h = (src_h as f64 * scale).round().max(1.0) as u32;
    (w, h)
}

/// Dimensions that completely cover `target` while preserving the source
/// aspect ratio (resize step before an exact crop). One dimension matches
/// the target, the other meets or exceeds it.
pub fn cover_dimensions(source: (u32, u32), target: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    let src_aspect = src_w as f64 / src_h as f64;
    let tgt_aspect = tgt_w as f64 / tgt_h as f64;

    if src_aspect > tgt_aspect {
        // Source is relatively wider: height matches, width exceeds
        let w = ((tgt_h as f64 * src_aspect).round() as u32).max(tgt_w);
        (w, tgt_h)
    } else {
        // Source is relatively taller: width matches, height exceeds
        let h = ((tgt_w as f64 / src_aspect).round() as u32).max(tgt_h);
        (tgt_w, h)
    }
}

/// Top-left corner of the `target` crop window inside a covering image.
///
/// Horizontally centered; vertically placed by `anchor_y` in `[0, 1]`
/// (0 = keep the top band, 1 = keep the bottom band).
pub fn crop_origin(cover: (u32, u32), target: (u32, u32), anchor_y: f32) -> (u32, u32) {
    let (cov_w, cov_h) = cover;
    let (tgt_w, tgt_h) = target;

    let slack_x = cov_w.saturating_sub(tgt_w);
    let slack_y = cov_h.saturating_sub(tgt_h);

    let x = slack_x / 2;
    let y = (slack_y as f64 * anchor_y.clamp(0.0, 1.0) as f64).round() as u32;

    (x, y.min(slack_y))
}
