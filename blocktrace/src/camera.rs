//! Generating the primary ray of each pixel.

use rand::Rng;

use crate::math::{FreeCoordinate, FreePoint, FreeVector};
use crate::raycast::Ray;

/// Size of the image being rendered, which may be one tile of a larger image.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[expect(clippy::exhaustive_structs)]
pub struct CanvasConfig {
    /// Width of this tile in pixels.
    pub width: usize,
    /// Height of this tile in pixels.
    pub height: usize,
    /// Width of the whole image.
    pub full_width: usize,
    /// Height of the whole image.
    pub full_height: usize,
    /// Position of this tile's left edge within the whole image.
    pub crop_x: usize,
    /// Position of this tile's top edge within the whole image.
    pub crop_y: usize,
}

impl CanvasConfig {
    /// A canvas which is the whole image.
    pub const fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            full_width: width,
            full_height: height,
            crop_x: 0,
            crop_y: 0,
        }
    }

    /// Number of pixels in this tile.
    pub const fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Column and row, within the whole image, of the pixel with linear index `index`
    /// in this tile.
    pub const fn full_position(&self, index: usize) -> (usize, usize) {
        (
            index % self.width + self.crop_x,
            index / self.width + self.crop_y,
        )
    }
}

/// Where rays come from.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[non_exhaustive]
pub enum Camera {
    /// A perspective camera with an infinitesimal aperture.
    Pinhole {
        #[allow(missing_docs)]
        position: FreePoint,
        /// Direction of the center of the image.
        forward: FreeVector,
        /// Approximate direction of the top of the image; need not be perpendicular to
        /// `forward`.
        up: FreeVector,
        /// Vertical field of view.
        fov_y_degrees: FreeCoordinate,
    },
    /// One ray per pixel of the tile, in linear order, computed elsewhere.
    PreGenerated(Vec<Ray>),
}

impl Camera {
    /// A pinhole camera at `position` looking toward `target`, with +Y up.
    pub fn look_at(
        position: impl Into<FreePoint>,
        target: impl Into<FreePoint>,
        fov_y_degrees: FreeCoordinate,
    ) -> Self {
        let position = position.into();
        Camera::Pinhole {
            position,
            forward: target.into() - position,
            up: FreeVector::new(0.0, 1.0, 0.0),
            fov_y_degrees,
        }
    }

    /// Returns the ray for the pixel with linear index `index` in `canvas`, jittered
    /// within the pixel using `rng`.
    ///
    /// Returns [`None`] if there is no ray for that pixel, which can only happen for
    /// [`Camera::PreGenerated`].
    pub fn ray(&self, canvas: &CanvasConfig, index: usize, rng: &mut impl Rng) -> Option<Ray> {
        match self {
            &Camera::Pinhole {
                position,
                forward,
                up,
                fov_y_degrees,
            } => {
                let column = (index % canvas.width) as FreeCoordinate;
                let row = (index / canvas.width) as FreeCoordinate;
                let full_height = canvas.full_height as FreeCoordinate;
                let half_width = canvas.full_width as FreeCoordinate / (2.0 * full_height);
                let x = -half_width
                    + (column + rng.random::<FreeCoordinate>() + canvas.crop_x as FreeCoordinate)
                        / full_height;
                let y = -0.5
                    + (row + rng.random::<FreeCoordinate>() + canvas.crop_y as FreeCoordinate)
                        / full_height;

                let scale = (fov_y_degrees.to_radians() / 2.0).tan();
                let forward = forward.normalize();
                let right = forward.cross(up).normalize();
                let true_up = right.cross(forward);
                let direction = right * (scale * x) + true_up * (-scale * y) + forward;
                Some(Ray::new(position, direction.normalize()))
            }
            Camera::PreGenerated(rays) => rays.get(index).map(|ray| ray.normalized()),
        }
    }
}
