use crate::{Error, Result, CONFIG};
use guid_create::GUID;
use std::fs::{self, DirBuilder};

/// Checks that `bytes` decode as a raster image. Anything the decoder
/// rejects (truncated file, wrong format, plain text) is refused.
pub fn check_image(bytes: &[u8]) -> Result<()> {
    image::load_from_memory(bytes)
        .map(|_| ())
        .map_err(Error::from)
}

/// Validates and stores an uploaded image under `CONFIG.media_directory`,
/// returning the stored path (relative, servable through `/static`).
pub fn save_image(bytes: &[u8], filename: Option<&str>) -> Result<String> {
    check_image(bytes)?;

    let ext = filename
        .and_then(|f| f.rsplit('.').next())
        .map(|ext| ext.to_lowercase())
        .unwrap_or_else(|| "png".to_owned());
    DirBuilder::new()
        .recursive(true)
        .create(&CONFIG.media_directory)?;
    let dest = format!("{}/{}.{}", CONFIG.media_directory, GUID::rand(), ext);
    fs::write(&dest, bytes)?;
    Ok(dest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, ImageOutputFormat};
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::new_rgba8(4, 4)
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn accepts_a_valid_image() {
        assert!(check_image(&png_bytes()).is_ok());
    }

    #[test]
    fn rejects_non_image_content() {
        assert!(check_image(b"this is not an image").is_err());
        assert!(check_image(&[]).is_err());

        // a PNG signature alone is not a decodable image
        assert!(check_image(&[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]).is_err());
    }
}
