//! [`AccumulationBuffer`], the running average of all passes rendered so far.

use imgref::ImgVec;

use crate::camera::CanvasConfig;
use crate::math::Rgb;

/// Per-pixel mean of every sample traced so far.
#[derive(Clone, Debug, PartialEq)]
pub struct AccumulationBuffer {
    canvas: CanvasConfig,
    mean: Vec<Rgb>,
    spp: u32,
}

impl AccumulationBuffer {
    /// A buffer of black pixels with no samples.
    pub fn new(canvas: CanvasConfig) -> Self {
        Self {
            canvas,
            mean: vec![Rgb::ZERO; canvas.pixel_count()],
            spp: 0,
        }
    }

    #[allow(missing_docs)]
    pub fn canvas(&self) -> &CanvasConfig {
        &self.canvas
    }

    /// Samples per pixel accumulated so far.
    pub fn spp(&self) -> u32 {
        self.spp
    }

    /// Mean color of each pixel, in raster order.
    pub fn mean(&self) -> &[Rgb] {
        &self.mean
    }

    /// Discards all samples.
    pub fn clear(&mut self) {
        self.mean.fill(Rgb::ZERO);
        self.spp = 0;
    }

    /// Gives mutable access to the means for one pass, whose samples are to be combined
    /// with [`running_mean()`] using the returned sample count; the count is then
    /// incremented.
    pub(crate) fn begin_pass(&mut self) -> (&mut [Rgb], u32) {
        let spp = self.spp;
        self.spp += 1;
        (&mut self.mean, spp)
    }

    /// Adds one sample to every pixel. `samples` must have one entry per pixel.
    ///
    /// # Panics
    ///
    /// Panics if `samples` is the wrong length.
    pub fn add_pass(&mut self, samples: &[Rgb]) {
        assert_eq!(
            samples.len(),
            self.mean.len(),
            "sample count does not match canvas"
        );
        let (mean, spp) = self.begin_pass();
        for (m, &sample) in itertools::zip_eq(mean.iter_mut(), samples) {
            *m = running_mean(*m, spp, sample);
        }
    }

    /// Converts to an 8-bit sRGB image, multiplying by `exposure` and clamping.
    pub fn to_image(&self, exposure: f32) -> ImgVec<[u8; 4]> {
        let data = self
            .mean
            .iter()
            .map(|&color| {
                let [r, g, b] = (color * exposure).clamp(1.0).to_srgb8();
                [r, g, b, 255]
            })
            .collect();
        ImgVec::new(data, self.canvas.width, self.canvas.height)
    }
}

/// Adds `sample` to a mean of `spp` earlier samples.
pub fn running_mean(mean: Rgb, spp: u32, sample: Rgb) -> Rgb {
    let n = spp as f32;
    (mean * n + sample) / (n + 1.0)
}

/// Converts `0xAARRGGBB` pixels from [`preview_pixel()`](crate::integrator::preview_pixel)
/// to an RGBA image.
pub fn argb_to_image(pixels: &[u32], canvas: &CanvasConfig) -> ImgVec<[u8; 4]> {
    let data = pixels
        .iter()
        .map(|&p| {
            let [a, r, g, b] = p.to_be_bytes();
            [r, g, b, a]
        })
        .collect();
    ImgVec::new(data, canvas.width, canvas.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn first_sample_replaces() {
        let sample = Rgb::new(0.1, 2.0, 30.0);
        assert_eq!(running_mean(Rgb::new(5.0, 5.0, 5.0), 0, sample), sample);
    }

    #[test]
    fn converges_to_constant() {
        let target = Rgb::new(0.25, 0.5, 1.0);
        let mut buffer = AccumulationBuffer::new(CanvasConfig::new(1, 1));
        buffer.add_pass(&[Rgb::new(100.0, 0.0, 0.0)]);
        for _ in 0..10_000 {
            buffer.add_pass(&[target]);
        }
        let error = buffer.mean()[0] + target * -1.0;
        assert!(error.to_array().iter().all(|e| e.abs() < 0.02), "{error:?}");
        assert_eq!(buffer.spp(), 10_001);
    }

    #[test]
    fn average_of_two() {
        let mut buffer = AccumulationBuffer::new(CanvasConfig::new(2, 1));
        buffer.add_pass(&[Rgb::ONE, Rgb::ZERO]);
        buffer.add_pass(&[Rgb::ZERO, Rgb::ZERO]);
        assert_eq!(buffer.mean(), &[Rgb::splat(0.5), Rgb::ZERO]);
        buffer.clear();
        assert_eq!(buffer.spp(), 0);
        assert_eq!(buffer.mean(), &[Rgb::ZERO, Rgb::ZERO]);
    }

    #[test]
    fn image() {
        let mut buffer = AccumulationBuffer::new(CanvasConfig::new(2, 1));
        buffer.add_pass(&[Rgb::splat(0.5), Rgb::splat(10.0)]);
        let image = buffer.to_image(2.0);
        assert_eq!((image.width(), image.height()), (2, 1));
        assert_eq!(image.buf(), &[[255, 255, 255, 255], [255, 255, 255, 255]]);
        assert_eq!(buffer.to_image(0.0).buf()[1], [0, 0, 0, 255]);
    }

    #[test]
    fn argb() {
        let image = argb_to_image(&[0xFF10_2030], &CanvasConfig::new(1, 1));
        assert_eq!(image.buf(), &[[0x10, 0x20, 0x30, 0xFF]]);
    }
}
