use image::{DynamicImage, GenericImageView, Rgba};
use palette::{FromColor, Lab, Srgb};
use reqwest::Client;
use tracing::debug;

use crate::{
    error::{Result, classify, require},
    types::{CodeImage, DominantColor},
    utils,
};

const BACKGROUND: &str = "e8e6e6";
const BAR_COLOR: &str = "black";
const SIZE: u32 = 1080;
const CLUSTERS: usize = 3;

/// Fetches Spotify Codes and works out their dominant colour.
#[derive(Debug, Clone)]
pub struct CodeImageClient {
    http: Client,
    base_url: String,
}

impl CodeImageClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Scannable code image URL for a Spotify URI.
    pub fn image_url(&self, uri: &str) -> String {
        utils::join_url(
            &self.base_url,
            &format!("{BACKGROUND}/{BAR_COLOR}/{SIZE}/{uri}"),
        )
    }

    /// Downloads the code image for `uri` and returns it with its dominant colour.
    pub async fn get_code_image(&self, uri: &str) -> Result<CodeImage> {
        let uri = require(Some(uri), "uri")?;
        let url = self.image_url(uri);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let headers = response.headers().clone();
            let body = response.text().await.unwrap_or_default();
            return Err(classify(status, &headers, &body));
        }

        let bytes = response.bytes().await?;
        let decoded = image::load_from_memory(&bytes)?;
        let dominant_color = ColorExtractor::dominant_color(&decoded);
        debug!(uri, color = %dominant_color.hex(), "resolved code image");

        Ok(CodeImage {
            image: url,
            dominant_color,
        })
    }
}

pub struct ColorExtractor;

impl ColorExtractor {
    /// Centroid of the most populated Lab cluster, as RGB.
    pub fn dominant_color(image: &DynamicImage) -> DominantColor {
        let pixels = Self::sample_pixels(image);
        if pixels.is_empty() {
            return DominantColor {
                r: 128,
                g: 128,
                b: 128,
            };
        }

        let (centroids, assignments) = Self::k_means_clustering(&pixels, CLUSTERS);

        let mut counts = vec![0usize; centroids.len()];
        for &assignment in &assignments {
            counts[assignment] += 1;
        }
        let largest = counts
            .iter()
            .enumerate()
            .max_by_key(|&(i, count)| (*count, std::cmp::Reverse(i)))
            .map(|(i, _)| i)
            .unwrap_or(0);

        let rgb = Srgb::from_color(centroids[largest]);
        DominantColor {
            r: Self::channel(rgb.red),
            g: Self::channel(rgb.green),
            b: Self::channel(rgb.blue),
        }
    }

    fn channel(value: f32) -> u8 {
        (value.clamp(0.0, 1.0) * 255.0).round() as u8
    }

    fn sample_pixels(image: &DynamicImage) -> Vec<Lab> {
        let (width, height) = image.dimensions();
        let mut pixels = Vec::new();

        let step = Self::sample_step(width, height);

        for y in (0..height).step_by(step as usize) {
            for x in (0..width).step_by(step as usize) {
                let Rgba([r, g, b, a]) = image.get_pixel(x, y);
                if a < 128 {
                    continue;
                }

                let rgb = Srgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
                pixels.push(Lab::from_color(rgb));
            }
        }

        pixels
    }

    // Grid spacing for roughly 400 samples. Widened first: large codes overflow u32
    fn sample_step(width: u32, height: u32) -> u32 {
        (((width as u64 * height as u64) as f64).sqrt() as u32 / 20).max(1)
    }

    fn k_means_clustering(pixels: &[Lab], k: usize) -> (Vec<Lab>, Vec<usize>) {
        let mut centroids = Self::initialize_centroids(pixels, k);
        let mut assignments = vec![0; pixels.len()];

        for iteration in 0..50 {
            let mut changed = false;
            for (i, pixel) in pixels.iter().enumerate() {
                let nearest = Self::find_nearest_centroid(pixel, &centroids);
                if assignments[i] != nearest {
                    assignments[i] = nearest;
                    changed = true;
                }
            }

            if !changed && iteration > 0 {
                break;
            }

            Self::update_centroids(pixels, &assignments, &mut centroids);
        }

        (centroids, assignments)
    }

    // k-means++ style: each new centroid is the pixel farthest from the existing ones
    fn initialize_centroids(pixels: &[Lab], k: usize) -> Vec<Lab> {
        let mut centroids = Vec::with_capacity(k);
        centroids.push(pixels[0]);

        for _ in 1..k {
            let mut distances = vec![f32::MAX; pixels.len()];
            for (i, pixel) in pixels.iter().enumerate() {
                for centroid in &centroids {
                    distances[i] = distances[i].min(Self::color_distance(pixel, centroid));
                }
            }

            let max_idx = distances
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.total_cmp(b))
                .map(|(idx, _)| idx)
                .unwrap_or(0);

            centroids.push(pixels[max_idx]);
        }

        centroids
    }

    fn find_nearest_centroid(pixel: &Lab, centroids: &[Lab]) -> usize {
        centroids
            .iter()
            .enumerate()
            .map(|(i, c)| (i, Self::color_distance(pixel, c)))
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn update_centroids(pixels: &[Lab], assignments: &[usize], centroids: &mut [Lab]) {
        let k = centroids.len();
        let mut sums = vec![(0.0, 0.0, 0.0); k];
        let mut counts = vec![0; k];

        for (pixel, &assignment) in pixels.iter().zip(assignments) {
            sums[assignment].0 += pixel.l;
            sums[assignment].1 += pixel.a;
            sums[assignment].2 += pixel.b;
            counts[assignment] += 1;
        }

        for (i, centroid) in centroids.iter_mut().enumerate() {
            if counts[i] > 0 {
                *centroid = Lab::new(
                    sums[i].0 / counts[i] as f32,
                    sums[i].1 / counts[i] as f32,
                    sums[i].2 / counts[i] as f32,
                );
            }
        }
    }

    fn color_distance(a: &Lab, b: &Lab) -> f32 {
        let dl = a.l - b.l;
        let da = a.a - b.a;
        let db = a.b - b.b;
        (dl * dl + da * da + db * db).sqrt()
    }
}
