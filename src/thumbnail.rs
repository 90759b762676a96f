use eframe::egui::ColorImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("thumbnail request failed: {0}")]
    Fetch(#[from] reqwest::Error),

    #[error("thumbnail could not be decoded: {0}")]
    Decode(#[from] image::ImageError),
}

/// Downloads and decodes the thumbnail at `url`.
pub async fn fetch_thumbnail(client: &reqwest::Client, url: &str) -> Result<ColorImage, ThumbnailError> {
    let bytes = client.get(url).send().await?.error_for_status()?.bytes().await?;
    decode_thumbnail(&bytes)
}

/// Converts encoded image bytes (jpeg, png, webp...) into an egui image
pub fn decode_thumbnail(bytes: &[u8]) -> Result<ColorImage, ThumbnailError> {
    // Load image data into an image::DynamicImage and convert to RGBA8
    let img = image::load_from_memory(bytes)?.to_rgba8();
    let size = [img.width() as usize, img.height() as usize];
    Ok(ColorImage::from_rgba_unmultiplied(size, &img))
}
