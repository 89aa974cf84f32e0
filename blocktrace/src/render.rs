//! [`Renderer`], which runs whole passes over a canvas and accumulates them.

use std::time::Instant;

use imgref::ImgVec;

use crate::accum::{AccumulationBuffer, argb_to_image, running_mean};
use crate::camera::{Camera, CanvasConfig};
use crate::integrator::{PathTracer, TraceInfo, preview_pixel};
use crate::math::Rgb;
use crate::scene::Scene;
use crate::settings::RenderSettings;

/// Renders a [`Scene`] progressively, one sample per pixel per pass.
///
/// Each pixel sample's random sequence depends only on the render seed, the pass number,
/// and the pixel's index, so the result does not depend on how the work is divided
/// among threads.
#[derive(Debug)]
pub struct Renderer {
    scene: Scene,
    settings: RenderSettings,
    camera: Camera,
    buffer: AccumulationBuffer,
}

impl Renderer {
    #[allow(missing_docs)]
    pub fn new(scene: Scene, settings: RenderSettings, camera: Camera, canvas: CanvasConfig) -> Self {
        Self {
            scene,
            settings,
            camera,
            buffer: AccumulationBuffer::new(canvas),
        }
    }

    #[allow(missing_docs)]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[allow(missing_docs)]
    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    #[allow(missing_docs)]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// The samples accumulated so far.
    pub fn buffer(&self) -> &AccumulationBuffer {
        &self.buffer
    }

    /// Number of passes completed since the last change.
    pub fn passes(&self) -> u32 {
        self.buffer.spp()
    }

    /// Moves the camera, discarding all accumulated samples.
    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
        self.buffer.clear();
    }

    /// Replaces the settings, discarding all accumulated samples.
    pub fn set_settings(&mut self, settings: RenderSettings) {
        self.settings = settings;
        self.buffer.clear();
    }

    /// Traces one sample for every pixel and folds it into the accumulation buffer.
    pub fn render_pass(&mut self) -> TraceInfo {
        let start_time = Instant::now();
        let canvas = *self.buffer.canvas();
        let tracer = PathTracer::new(&self.scene, &self.settings);
        let camera = &self.camera;
        let (mean, spp) = self.buffer.begin_pass();
        let pass_seed = self
            .settings
            .seed
            .wrapping_add(u64::from(spp).wrapping_mul(canvas.pixel_count() as u64));

        let sample = move |index: usize, pixel: &mut Rgb| -> TraceInfo {
            let mut info = TraceInfo::default();
            let seed = pass_seed.wrapping_add(index as u64);
            let color = tracer.trace_pixel(camera, &canvas, index, seed, &mut info);
            *pixel = running_mean(*pixel, spp, color);
            info
        };

        #[cfg(feature = "auto-threads")]
        let info: TraceInfo = {
            use rayon::iter::{
                IndexedParallelIterator as _, IntoParallelIterator as _, ParallelIterator as _,
            };
            use rayon::slice::ParallelSliceMut as _;

            let width = canvas.width.max(1);
            mean.par_chunks_mut(width)
                .enumerate()
                .map(move |(y, row)| {
                    row.into_par_iter()
                        .enumerate()
                        .map(move |(x, pixel)| sample(y * width + x, pixel))
                })
                .flatten()
                .sum()
        };

        #[cfg(not(feature = "auto-threads"))]
        let info: TraceInfo = {
            let mut total_info = TraceInfo::default();
            for (index, pixel) in mean.iter_mut().enumerate() {
                total_info += sample(index, pixel);
            }
            total_info
        };

        log::info!(
            "pass {pass} took {elapsed:.3?}: {info}",
            pass = spp + 1,
            elapsed = start_time.elapsed(),
        );
        if info.shadow_rays_capped > 0 {
            log::warn!(
                "{} shadow rays crossed too many surfaces and were treated as blocked",
                info.shadow_rays_capped
            );
        }
        info
    }

    /// Renders `passes` passes, stopping early if `keep_going` returns false.
    /// `keep_going` is called before each pass with the number of passes accumulated.
    pub fn render(&mut self, passes: u32, mut keep_going: impl FnMut(u32) -> bool) -> TraceInfo {
        let mut total_info = TraceInfo::default();
        for _ in 0..passes {
            if !keep_going(self.passes()) {
                log::debug!("render stopped after {} passes", self.passes());
                break;
            }
            total_info += self.render_pass();
        }
        total_info
    }

    /// The accumulated image as 8-bit sRGB.
    pub fn image(&self, exposure: f32) -> ImgVec<[u8; 4]> {
        self.buffer.to_image(exposure)
    }

    /// Computes a quick preview of the scene, as `0xAARRGGBB` pixels in raster order.
    /// This does not use or affect the accumulated samples.
    pub fn preview(&self) -> Vec<u32> {
        let canvas = *self.buffer.canvas();
        let pixel = |index: usize| preview_pixel(&self.scene, &self.camera, &canvas, index);

        #[cfg(feature = "auto-threads")]
        {
            use rayon::iter::{IntoParallelIterator as _, ParallelIterator as _};
            (0..canvas.pixel_count()).into_par_iter().map(pixel).collect()
        }
        #[cfg(not(feature = "auto-threads"))]
        {
            (0..canvas.pixel_count()).map(pixel).collect()
        }
    }

    /// [`Self::preview()`] as an RGBA image.
    pub fn preview_image(&self) -> ImgVec<[u8; 4]> {
        argb_to_image(&self.preview(), self.buffer.canvas())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockPalette;
    use crate::environment::{Sky, SkyColor, Sun};
    use crate::material::MaterialPalette;
    use pretty_assertions::assert_eq;

    fn sky_renderer() -> Renderer {
        let scene = Scene::new(BlockPalette::new(), MaterialPalette::new())
            .with_sky(Sky {
                color: SkyColor::Solid(Rgb::splat(0.5)),
                intensity: 2.0,
            })
            .with_sun(Sun {
                enabled: false,
                ..Sun::default()
            });
        Renderer::new(
            scene,
            RenderSettings::default(),
            Camera::look_at([0.0, 0.0, 0.0], [0.0, 0.0, -1.0], 60.0),
            CanvasConfig::new(3, 2),
        )
    }

    #[test]
    fn passes_accumulate() {
        let mut renderer = sky_renderer();
        let info = renderer.render(3, |_| true);
        assert_eq!(renderer.passes(), 3);
        assert_eq!(info.paths, 18);
        for &pixel in renderer.buffer().mean() {
            assert_eq!(pixel, Rgb::splat(1.0));
        }
    }

    #[test]
    fn stop_early() {
        let mut renderer = sky_renderer();
        renderer.render(10, |done| done < 2);
        assert_eq!(renderer.passes(), 2);
        renderer.set_camera(Camera::look_at([0.0, 0.0, 0.0], [0.0, 1.0, 0.0], 60.0));
        assert_eq!(renderer.passes(), 0);
    }

    #[test]
    fn preview_has_crosshair() {
        let renderer = sky_renderer();
        let preview = renderer.preview();
        assert_eq!(preview.len(), 6);
        // full image center is (1, 1)
        assert_eq!(preview[4], crate::integrator::CROSSHAIR_COLOR);
        assert_eq!(renderer.preview_image().buf()[0], [0xB4, 0xB4, 0xB4, 0xFF]);
    }
}
