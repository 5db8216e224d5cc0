//! Minimal JPEG APP1/EXIF segment handling.
//!
//! Re-encoding an image drops every metadata segment. When an export asks to
//! keep metadata, the EXIF payload is lifted out of the source JPEG and
//! spliced verbatim into the freshly encoded output. No TIFF/IFD parsing:
//! the segment travels as opaque bytes.

const SOI: [u8; 2] = [0xFF, 0xD8];
const APP0: u8 = 0xE0;
const APP1: u8 = 0xE1;
const SOS: u8 = 0xDA;
const EOI: u8 = 0xD9;
const EXIF_HEADER: &[u8] = b"Exif\0\0";

/// Extract the EXIF APP1 payload (including the `Exif\0\0` header) from a
/// JPEG byte stream. Returns `None` for non-JPEG data, truncated streams,
/// or files without an EXIF segment.
pub fn extract_exif(data: &[u8]) -> Option<Vec<u8>> {
    if !data.starts_with(&SOI) {
        return None;
    }

    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            return None;
        }
        let marker = data[pos + 1];

        // Image data or end of image: no metadata segments past here
        if marker == SOS || marker == EOI {
            return None;
        }
        // Standalone markers carry no length field
        if (0xD0..=0xD7).contains(&marker) || marker == 0x01 {
            pos += 2;
            continue;
        }

        let length = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if length < 2 || pos + 2 + length > data.len() {
            return None;
        }

        let payload = &data[pos + 4..pos + 2 + length];
        if marker == APP1 && payload.starts_with(EXIF_HEADER) {
            return Some(payload.to_vec());
        }

        pos += 2 + length;
    }

    None
}

/// Splice an EXIF payload (as returned by [`extract_exif`]) into a JPEG byte
/// stream, right after the SOI marker and any JFIF APP0 segment.
///
/// Returns the input unchanged when it is not a JPEG or the payload cannot
/// fit a segment length field.
pub fn embed_exif(data: &[u8], exif: &[u8]) -> Vec<u8> {
    // Segment length counts itself (2 bytes) plus the payload
    if !data.starts_with(&SOI) || exif.len() + 2 > u16::MAX as usize {
        return data.to_vec();
    }

    let mut insert_at = 2;
    if data.len() >= 6 && data[2] == 0xFF && data[3] == APP0 {
        let length = u16::from_be_bytes([data[4], data[5]]) as usize;
        insert_at = (4 + length).min(data.len());
    }

    let mut out = Vec::with_capacity(data.len() + exif.len() + 4);
    out.extend_from_slice(&data[..insert_at]);
    out.extend_from_slice(&[0xFF, APP1]);
    out.extend_from_slice(&((exif.len() + 2) as u16).to_be_bytes());
    out.extend_from_slice(exif);
    out.extend_from_slice(&data[insert_at..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A synthetic EXIF payload: header + a little-endian TIFF stub.
    fn fake_exif() -> Vec<u8> {
        let mut payload = EXIF_HEADER.to_vec();
        payload.extend_from_slice(&[0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]);
        payload
    }

    /// A minimal JPEG-shaped byte stream: SOI, APP0, then SOS + EOI.
    fn bare_jpeg() -> Vec<u8> {
        let mut data = SOI.to_vec();
        // APP0 "JFIF" segment, length 16
        data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x10]);
        data.extend_from_slice(b"JFIF\0");
        data.extend_from_slice(&[0; 9]);
        // SOS marker then fake entropy data and EOI
        data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02, 0x00, 0xFF, 0xD9]);
        data
    }

    #[test]
    fn extract_from_jpeg_without_exif_is_none() {
        assert_eq!(extract_exif(&bare_jpeg()), None);
    }

    #[test]
    fn extract_rejects_non_jpeg() {
        assert_eq!(extract_exif(b"\x89PNG\r\n\x1a\n"), None);
        assert_eq!(extract_exif(&[]), None);
    }

    #[test]
    fn embed_then_extract_roundtrips() {
        let exif = fake_exif();
        let with_exif = embed_exif(&bare_jpeg(), &exif);
        assert_eq!(extract_exif(&with_exif), Some(exif));
    }

    #[test]
    fn embed_places_segment_after_app0() {
        let with_exif = embed_exif(&bare_jpeg(), &fake_exif());
        // SOI (2) + APP0 (2 + 16) = offset 20 for the new APP1 marker
        assert_eq!(&with_exif[20..22], &[0xFF, 0xE1]);
    }

    #[test]
    fn embed_into_jpeg_without_app0_goes_right_after_soi() {
        let mut data = SOI.to_vec();
        data.extend_from_slice(&[0xFF, 0xDA, 0x00, 0x02, 0x00, 0xFF, 0xD9]);
        let with_exif = embed_exif(&data, &fake_exif());
        assert_eq!(&with_exif[2..4], &[0xFF, 0xE1]);
        assert_eq!(extract_exif(&with_exif), Some(fake_exif()));
    }

    #[test]
    fn embed_leaves_non_jpeg_untouched() {
        let png = b"\x89PNG\r\n\x1a\n".to_vec();
        assert_eq!(embed_exif(&png, &fake_exif()), png);
    }

    #[test]
    fn embed_skips_oversized_payloads() {
        let jpeg = bare_jpeg();
        let huge = vec![0u8; u16::MAX as usize];
        assert_eq!(embed_exif(&jpeg, &huge), jpeg);
    }

    #[test]
    fn extract_ignores_non_exif_app1() {
        // XMP also lives in APP1 but with a different header
        let mut data = SOI.to_vec();
        let xmp = b"http://ns.adobe.com/xap/1.0/\0";
        data.extend_from_slice(&[0xFF, 0xE1]);
        data.extend_from_slice(&((xmp.len() + 2) as u16).to_be_bytes());
        data.extend_from_slice(xmp);
        data.extend_from_slice(&[0xFF, 0xD9]);
        assert_eq!(extract_exif(&data), None);
    }

    #[test]
    fn extract_survives_truncated_segment() {
        let mut data = SOI.to_vec();
        data.extend_from_slice(&[0xFF, 0xE1, 0xFF, 0xFF, 0x00]); // length lies
        assert_eq!(extract_exif(&data), None);
    }
}
