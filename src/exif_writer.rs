use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::NaiveDateTime;
use img_parts::jpeg::Jpeg;
use img_parts::{Bytes, ImageEXIF};
use little_exif::exif_tag::ExifTag;
use little_exif::filetype::FileExtension;
use little_exif::metadata::Metadata;
use log::debug;
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::date::EXIF_DATETIME_FORMAT;

// little_exif as_u8_vec(JPEG) returns [APP1 marker 2B][length 2B][Exif\0\0 6B][TIFF data];
// img-parts set_exif() expects just the TIFF data.
const JPEG_EXIF_OVERHEAD: usize = 10;

const EXIF_PREFIX: &[u8] = b"Exif\0\0";

#[derive(Debug, Error)]
pub enum PatchError {
    #[error("{file}: {source}")]
    Read {
        file: String,
        source: std::io::Error,
    },
    #[error("{file}: not a readable JPEG image: {source}")]
    Decode {
        file: String,
        source: img_parts::Error,
    },
    #[error("{file}: serialized EXIF block is empty")]
    Serialize { file: String },
    #[error("{file}: writing patched copy failed: {source}")]
    Persist {
        file: String,
        source: std::io::Error,
    },
}

/// Write a copy of `source` at `dest` whose EXIF original-capture and
/// digitized-capture fields equal `taken`. Every other segment of the
/// image, pixel data included, is carried over untouched. The source file
/// is never modified, and no partial file becomes visible at `dest`: the
/// patched bytes go to a temp file first and are renamed into place.
///
/// The caller is expected to guard against an existing `dest`; if one is
/// there anyway it gets replaced.
pub fn patch_file(source: &Path, dest: &Path, taken: NaiveDateTime) -> Result<(), PatchError> {
    let file = display_name(source);

    let bytes = fs::read(source).map_err(|e| PatchError::Read {
        file: file.clone(),
        source: e,
    })?;
    let mut jpeg = Jpeg::from_bytes(Bytes::from(bytes)).map_err(|e| PatchError::Decode {
        file: file.clone(),
        source: e,
    })?;

    // Remember where the EXIF segment sat so the rewrite keeps it there.
    let orig_exif_pos = exif_segment_pos(&jpeg);

    let mut metadata = match Metadata::new_from_path(source) {
        Ok(m) => {
            debug!("{file}: merging into {} existing EXIF entries", (&m).into_iter().count());
            m
        }
        Err(e) => {
            debug!("{file}: no usable EXIF block ({e}), starting fresh");
            Metadata::new()
        }
    };

    let stamp = taken.format(EXIF_DATETIME_FORMAT).to_string();
    metadata.set_tag(ExifTag::DateTimeOriginal(stamp.clone()));
    // CreateDate is little_exif's name for DateTimeDigitized (0x9004)
    metadata.set_tag(ExifTag::CreateDate(stamp));

    let exif_bytes = metadata
        .as_u8_vec(FileExtension::JPEG)
        .map_err(|_| PatchError::Serialize { file: file.clone() })?;
    if exif_bytes.len() <= JPEG_EXIF_OVERHEAD {
        return Err(PatchError::Serialize { file });
    }
    jpeg.set_exif(Some(Bytes::from(exif_bytes[JPEG_EXIF_OVERHEAD..].to_vec())));

    // set_exif drops the old APP1 and inserts the new one at a fixed slot,
    // which can land behind XMP; move it back where the source had it so
    // EXIF stays ahead of the other APP1 segments.
    if let Some(new_pos) = exif_segment_pos(&jpeg) {
        let target_pos = orig_exif_pos.unwrap_or(1);
        if target_pos < new_pos {
            let segments = jpeg.segments_mut();
            let seg = segments.remove(new_pos);
            segments.insert(target_pos, seg);
        }
    }

    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(parent).map_err(|e| PatchError::Persist {
        file: file.clone(),
        source: e,
    })?;
    tmp.write_all(&jpeg.encoder().bytes())
        .map_err(|e| PatchError::Persist {
            file: file.clone(),
            source: e,
        })?;
    tmp.persist(dest).map_err(|e| PatchError::Persist {
        file,
        source: e.error,
    })?;

    Ok(())
}

/// EXIF APP1 segments have marker 0xE1 and contents starting with "Exif\0\0".
fn exif_segment_pos(jpeg: &Jpeg) -> Option<usize> {
    jpeg.segments()
        .iter()
        .position(|s| s.marker() == 0xE1 && s.contents().starts_with(EXIF_PREFIX))
}

fn display_name(path: &Path) -> String {
    match path.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => path.display().to_string(),
    }
}
