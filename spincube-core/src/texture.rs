/// Decoded RGBA textures and bilinear sampling
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("failed to decode texture: {0}")]
    Decode(#[from] image::ImageError),
    #[error("texture has no pixels")]
    Empty,
    #[error("texture {source_ref} could not be loaded: {reason}")]
    Unavailable { source_ref: String, reason: String },
}

impl TextureError {
    pub fn unavailable(source_ref: impl Into<String>, reason: impl ToString) -> Self {
        Self::Unavailable {
            source_ref: source_ref.into(),
            reason: reason.to_string(),
        }
    }
}

/// An RGBA8 image, row 0 at the top
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Texture {
    pub fn from_rgba(width: u32, height: u32, pixels: Vec<[u8; 4]>) -> Result<Self, TextureError> {
        if width == 0 || height == 0 || pixels.len() != width as usize * height as usize {
            return Err(TextureError::Empty);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// Decode an encoded image (PNG or JPEG)
    pub fn decode(bytes: &[u8]) -> Result<Self, TextureError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = rgba.pixels().map(|p| p.0).collect();
        Self::from_rgba(width, height, pixels)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn texel(&self, x: i64, y: i64) -> [u8; 4] {
        let x = x.clamp(0, self.width as i64 - 1) as usize;
        let y = y.clamp(0, self.height as i64 - 1) as usize;
        self.pixels[y * self.width as usize + x]
    }

    /// Bilinear sample with clamp-to-edge addressing. `v = 1` is the top row.
    pub fn sample(&self, u: f32, v: f32) -> [u8; 4] {
        let u = u.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);

        let fx = u * self.width as f32 - 0.5;
        let fy = (1.0 - v) * self.height as f32 - 0.5;
        let x0 = fx.floor();
        let y0 = fy.floor();
        let tx = fx - x0;
        let ty = fy - y0;
        let (x0, y0) = (x0 as i64, y0 as i64);

        let a = self.texel(x0, y0);
        let b = self.texel(x0 + 1, y0);
        let c = self.texel(x0, y0 + 1);
        let d = self.texel(x0 + 1, y0 + 1);

        let mut out = [0u8; 4];
        for i in 0..4 {
            let top = a[i] as f32 * (1.0 - tx) + b[i] as f32 * tx;
            let bottom = c[i] as f32 * (1.0 - tx) + d[i] as f32 * tx;
            out[i] = (top * (1.0 - ty) + bottom * ty).round() as u8;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Texture {
        // top row red/green, bottom row blue/white
        Texture::from_rgba(
            2,
            2,
            vec![
                [255, 0, 0, 255],
                [0, 255, 0, 255],
                [0, 0, 255, 255],
                [255, 255, 255, 255],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_sample_corners() {
        let texture = checker();
        assert_eq!(texture.sample(0.0, 1.0), [255, 0, 0, 255]);
        assert_eq!(texture.sample(1.0, 1.0), [0, 255, 0, 255]);
        assert_eq!(texture.sample(0.0, 0.0), [0, 0, 255, 255]);
        assert_eq!(texture.sample(1.0, 0.0), [255, 255, 255, 255]);
    }

    #[test]
    fn test_sample_blends_between_texels() {
        let texture = checker();
        let mid = texture.sample(0.5, 1.0);
        assert_eq!(mid, [128, 128, 0, 255]);
    }

    #[test]
    fn test_sample_clamps_out_of_range() {
        let texture = checker();
        assert_eq!(texture.sample(-3.0, 7.0), texture.sample(0.0, 1.0));
    }

    #[test]
    fn test_rejects_empty() {
        assert!(matches!(
            Texture::from_rgba(0, 4, Vec::new()),
            Err(TextureError::Empty)
        ));
        assert!(matches!(
            Texture::from_rgba(2, 2, vec![[0; 4]; 3]),
            Err(TextureError::Empty)
        ));
    }

    #[test]
    fn test_decode_png() {
        let mut bytes = Vec::new();
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();

        let texture = Texture::decode(&bytes).unwrap();
        assert_eq!((texture.width(), texture.height()), (3, 2));
        assert_eq!(texture.sample(0.5, 0.5), [10, 20, 30, 255]);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(matches!(
            Texture::decode(b"definitely not an image"),
            Err(TextureError::Decode(_))
        ));
    }
}
