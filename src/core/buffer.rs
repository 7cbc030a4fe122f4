//! Dense batched image buffers (B x C x H x W, `f32`).

use image::{GrayImage, Luma, Rgb, RgbImage};

/// A batch of multi-channel float images, stored row-major per channel.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageBatch {
    pub batch: usize,
    pub channels: usize,
    pub height: usize,
    pub width: usize,
    pub data: Vec<f32>,
}

impl ImageBatch {
    /// A buffer with every element set to `value`.
    pub fn filled(batch: usize, channels: usize, height: usize, width: usize, value: f32) -> Self {
        Self {
            batch,
            channels,
            height,
            width,
            data: vec![value; batch * channels * height * width],
        }
    }

    pub fn zeros(batch: usize, channels: usize, height: usize, width: usize) -> Self {
        Self::filled(batch, channels, height, width, 0.0)
    }

    #[inline]
    fn offset(&self, b: usize, c: usize, y: usize, x: usize) -> usize {
        ((b * self.channels + c) * self.height + y) * self.width + x
    }

    #[inline]
    pub fn get(&self, b: usize, c: usize, y: usize, x: usize) -> f32 {
        self.data[self.offset(b, c, y, x)]
    }

    #[inline]
    pub fn set(&mut self, b: usize, c: usize, y: usize, x: usize, value: f32) {
        let i = self.offset(b, c, y, x);
        self.data[i] = value;
    }

    /// One channel plane of one batch item.
    pub fn plane(&self, b: usize, c: usize) -> &[f32] {
        let start = self.offset(b, c, 0, 0);
        &self.data[start..start + self.height * self.width]
    }

    /// Average-pool non-overlapping 2x2 blocks (stride 2).
    ///
    /// Odd trailing rows/columns are dropped, like a floor-mode pooling layer.
    pub fn avg_pool2x2(&self) -> ImageBatch {
        let height = self.height / 2;
        let width = self.width / 2;
        let mut out = ImageBatch::zeros(self.batch, self.channels, height, width);

        for b in 0..self.batch {
            for c in 0..self.channels {
                for y in 0..height {
                    for x in 0..width {
                        let sum = self.get(b, c, 2 * y, 2 * x)
                            + self.get(b, c, 2 * y, 2 * x + 1)
                            + self.get(b, c, 2 * y + 1, 2 * x)
                            + self.get(b, c, 2 * y + 1, 2 * x + 1);
                        out.set(b, c, y, x, 0.25 * sum);
                    }
                }
            }
        }

        out
    }

    /// Convert the first three channels of batch item `b` to an 8-bit RGB image.
    ///
    /// Values are treated as [0, 1] and clamped.
    pub fn to_rgb_image(&self, b: usize) -> RgbImage {
        assert!(self.channels >= 3, "to_rgb_image needs at least 3 channels");
        let mut img = RgbImage::new(self.width as u32, self.height as u32);
        for y in 0..self.height {
            for x in 0..self.width {
                let px = [0, 1, 2].map(|c| unit_to_u8(self.get(b, c, y, x)));
                img.put_pixel(x as u32, y as u32, Rgb(px));
            }
        }
        img
    }

    /// Convert channel `c` of batch item `b` to an 8-bit grayscale image,
    /// mapping `[lo, hi]` to `[0, 255]`.
    pub fn to_gray_image(&self, b: usize, c: usize, lo: f32, hi: f32) -> GrayImage {
        let scale = if hi > lo { 1.0 / (hi - lo) } else { 0.0 };
        let mut img = GrayImage::new(self.width as u32, self.height as u32);
        for y in 0..self.height {
            for x in 0..self.width {
                let v = (self.get(b, c, y, x) - lo) * scale;
                img.put_pixel(x as u32, y as u32, Luma([unit_to_u8(v)]));
            }
        }
        img
    }
}

fn unit_to_u8(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}
