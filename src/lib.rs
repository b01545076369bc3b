pub mod date;
pub mod exif_writer;
pub mod writer;
