//! # Photochute
//!
//! A small pipeline for photos exported from a phone: a drop folder is swept,
//! each photo is converted out of its phone container format, box-fitted and
//! compressed, stripped of metadata, and the original is filed away under a
//! timestamped name. The same resize/export policy is also exposed as a
//! one-shot `export` command for ad-hoc use.
//!
//! # Architecture
//!
//! The crate is one export policy plus thin glue around it:
//!
//! ```text
//! intake   input/   →  output/{stamp}_{n}.jpg   (sweep, one image at a time)
//!                   →  input/raw/{stamp}_{n}.*  (originals, filed away)
//! export   photo    →  photo_{WxH}.jpg          (one-shot, any resize mode)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`export`] | The export policy: resize modes, format/color normalization, atomic writes |
//! | [`intake`] | Sweeps the drop folder, exports each photo, files originals away |
//! | [`config`] | `photochute.toml` loading, env overrides, validation |
//! | [`naming`] | Pure filename/format derivation: output paths, intake stamps |
//! | [`output`] | CLI output formatting — per-file report lines, human sizes |
//!
//! # Design Decisions
//!
//! ## One Closed Mode Enum
//!
//! The resize strategy is a tagged enum ([`export::ResizeMode`]) with one
//! variant per mode, each carrying only the parameters it needs. There is no
//! open bag of optional width/height/max flags validated ad hoc; an invalid
//! combination is unrepresentable or rejected up front as `InvalidParameter`.
//!
//! ## Pure-Rust Imaging (No ImageMagick, No libheif)
//!
//! Decoding and encoding use the `image` crate (Lanczos3 resampling), with
//! AVIF decoded via `avif-parse` + `rav1d` — all pure Rust, statically
//! linked. AVIF is the supported phone container: it is the same HEIF family
//! iPhones export, with an AV1 payload that has a pure-Rust decoder.
//! HEVC-encoded `.heic` has none, so those files fail with a clear error
//! instead of a silent dependency on a system library.
//!
//! ## No Partial Files
//!
//! Every export encodes to memory and persists through a temp file in the
//! destination directory. A failed decode, encode, or write leaves nothing
//! behind at the output path.
//!
//! ## One Metadata Switch
//!
//! The original scripts disagreed about metadata: the optimizing path
//! stripped everything, the conversion helper copied EXIF. Here a single
//! `keep_metadata` flag decides, everywhere. Stripping is the default — the
//! intake use case exists to publish images without location data.

pub mod config;
pub mod export;
pub mod intake;
pub mod naming;
pub mod output;
