use std::io::Cursor;
use image::io::Reader;
use image::ImageError;

/// Reads the pixel width and height of an encoded image.
/// The format is guessed from the bytes, and only the header is decoded.
pub fn probe_dimensions(bytes: &[u8]) -> Result<(u32, u32), ImageError> {
    let reader = Reader::new(Cursor::new(bytes)).with_guessed_format()?;
    reader.into_dimensions()
}

/// Encodes a blank PNG of the size specified.
#[cfg(test)]
pub(crate) fn encode_png(width: u32, height: u32) -> Vec<u8> {
    use image::{DynamicImage, ImageOutputFormat};
    let image = DynamicImage::new_rgba8(width, height);
    let mut cursor = Cursor::new(Vec::new());
    image.write_to(&mut cursor, ImageOutputFormat::Png).unwrap();
    cursor.into_inner()
}
