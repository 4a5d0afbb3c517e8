//! Encode background images as `data:` URLs for the settings store.

use base64::Engine;

use super::page::Rgb;

#[derive(Debug, thiserror::Error)]
pub enum DataUrlError {
    #[error("not a recognised image format")]
    NotAnImage(#[from] image::ImageError),
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
}

/// `data:<mime>;base64,<payload>` for an image held in memory. The MIME type
/// comes from sniffing the bytes, not from a file name.
pub fn image_data_url(bytes: &[u8]) -> Result<String, DataUrlError> {
    let format = image::guess_format(bytes)?;
    let payload = base64::engine::general_purpose::STANDARD.encode(bytes);
    Ok(format!("data:{};base64,{payload}", format.to_mime_type()))
}

/// Read an image file and encode it.
pub async fn read_image_data_url(path: &std::path::Path) -> Result<String, DataUrlError> {
    let bytes = tokio::fs::read(path).await?;
    image_data_url(&bytes)
}

/// Mean colour of the image inside a `data:` URL, used to stand in for the
/// picture where it can't be drawn.
pub fn average_color(url: &str) -> Option<Rgb> {
    let (_, payload) = url.strip_prefix("data:")?.split_once(";base64,")?;
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(payload.trim())
        .ok()?;
    let img = image::load_from_memory(&bytes).ok()?;
    let pixel = img
        .resize_exact(1, 1, image::imageops::FilterType::Triangle)
        .to_rgb8();
    let [r, g, b] = pixel.get_pixel(0, 0).0;
    Some(Rgb { r, g, b })
}

#[cfg(test)]
mod tests {
    use super::*;

    // 8-byte PNG signature followed by the start of an IHDR chunk.
    const PNG_HEADER: &[u8] = &[
        0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, b'I', b'H', b'D',
        b'R',
    ];

    #[test]
    fn png_gets_png_mime() {
        let url = image_data_url(PNG_HEADER).unwrap();
        assert!(url.starts_with("data:image/png;base64,iVBORw0KGgo"), "{url}");
    }

    #[test]
    fn text_is_rejected() {
        assert!(matches!(
            image_data_url(b"hello, world"),
            Err(DataUrlError::NotAnImage(_))
        ));
    }

    #[test]
    fn average_of_solid_image() {
        let img = image::RgbImage::from_pixel(4, 4, image::Rgb([200, 10, 40]));
        let mut png = std::io::Cursor::new(Vec::new());
        img.write_to(&mut png, image::ImageFormat::Png).unwrap();
        let url = image_data_url(png.get_ref()).unwrap();
        assert_eq!(average_color(&url), Some(Rgb { r: 200, g: 10, b: 40 }));
        assert_eq!(average_color("data:image/png;base64,!!"), None);
        assert_eq!(average_color("/assets/mountain.webp"), None);
    }

    #[tokio::test]
    async fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bg.bin");
        std::fs::write(&path, PNG_HEADER).unwrap();
        assert!(read_image_data_url(&path).await.is_ok());
        assert!(matches!(
            read_image_data_url(&dir.path().join("missing.png")).await,
            Err(DataUrlError::Io(_))
        ));
    }
}
