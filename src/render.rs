use rand::rngs::SmallRng;
use rand::{
    Rng,
    SeedableRng,
};
use rayon::prelude::*;

use crate::camera::Camera;
use crate::geom::Color;
use crate::progress::ProgressRecorder;
use crate::scene::Scene;

#[derive(Debug, Clone)]
pub struct RenderSettings {
    pub width: usize,
    pub height: usize,
    pub samples_per_pixel: usize,
    pub max_depth: usize,
    /// Seed for the per-row generators. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

/// Averaged linear color per pixel, stored top row first.
#[derive(Debug, Clone)]
pub struct Image {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl Image {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `row` 0 is the top of the image.
    #[cfg(test)]
    pub fn get(&self, col: usize, row: usize) -> Color {
        self.pixels[row * self.width + col]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[Color]> {
        self.pixels.chunks_exact(self.width)
    }
}

/// Render every pixel of the image on the current rayon pool.
///
/// Rows are independent: each gets its own generator derived from the seed,
/// so a seeded render comes out identical regardless of how many threads run it.
pub fn render(
    scene: &Scene,
    camera: &Camera,
    settings: &RenderSettings,
    progress: Option<&ProgressRecorder>,
) -> Image {
    let RenderSettings {
        width,
        height,
        samples_per_pixel,
        max_depth,
        seed,
    } = *settings;

    let rows: Vec<Vec<Color>> = (0..height)
        .into_par_iter()
        .map(|row| {
            let mut rng = row_rng(seed, row);
            // Viewport coordinates run bottom to top.
            let j = height - row - 1;
            let pixels = (0..width)
                .map(|i| {
                    average(samples_per_pixel, || {
                        let u = (i as f64 + rng.gen::<f64>()) / (width.max(2) - 1) as f64;
                        let v = (j as f64 + rng.gen::<f64>()) / (height.max(2) - 1) as f64;
                        let ray = camera.get_ray(&mut rng, u, v);
                        scene.ray_color(ray, &mut rng, max_depth)
                    })
                })
                .collect();
            if let Some(progress) = progress {
                progress.record();
            }
            pixels
        })
        .collect();

    Image {
        width,
        height,
        pixels: rows.into_iter().flatten().collect(),
    }
}

fn row_rng(seed: Option<u64>, row: usize) -> SmallRng {
    match seed {
        Some(seed) => SmallRng::seed_from_u64(seed ^ (row as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)),
        None => SmallRng::from_entropy(),
    }
}

fn average<T, F>(n: usize, mut f: F) -> T
where
    F: FnMut() -> T,
    T: Default + ::std::ops::AddAssign + ::std::ops::Div<f64, Output = T>,
{
    if n == 0 {
        return T::default();
    }
    let mut acc = <T as Default>::default();
    for _ in 0..n {
        acc += f();
    }
    acc / (n as f64)
}
