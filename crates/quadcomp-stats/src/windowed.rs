//! Windowed statistics using prefix sums
//!
//! Computes the local mean of every pixel over a `(2r+1) × (2r+1)` window,
//! clipped at the image edges, and a deviation index on top of it: the
//! per-pixel deviation `Σ_c |pixel_c − local_mean_c|` is itself
//! prefix-summed, so the total or mean deviation of any rectangle is O(1).

use crate::prefix::PrefixSum;
use crate::{StatsError, StatsResult};
use quadcomp_core::{Raster, Rect, Sample};
use tracing::debug;

/// Window around (x, y) with the given radius, clipped to the image
#[inline]
fn neighbourhood(x: u32, y: u32, radius: u32, width: u32, height: u32) -> Rect {
    Rect::new_unchecked(
        x.saturating_sub(radius),
        x.saturating_add(radius).saturating_add(1).min(width),
        y.saturating_sub(radius),
        y.saturating_add(radius).saturating_add(1).min(height),
    )
}

/// Local means of every sample, row-major with interleaved channels
fn local_means(prefix: &PrefixSum, radius: u32) -> StatsResult<Vec<i64>> {
    let (w, h, c) = (prefix.width(), prefix.height(), prefix.channels());
    let mut means = Vec::with_capacity(w as usize * h as usize * c as usize);
    for y in 0..h {
        for x in 0..w {
            means.extend(prefix.rect_mean(neighbourhood(x, y, radius, w, h))?);
        }
    }
    Ok(means)
}

/// Compute the local mean of every pixel
///
/// Each output sample is the floor of the mean of its channel over the
/// `(2r+1) × (2r+1)` neighbourhood, clipped at the image edges and divided
/// by the clipped area. A radius of 0 is treated as 1.
///
/// # Errors
///
/// Propagates raster construction errors (none for a valid input).
pub fn local_mean<T: Sample>(raster: &Raster<T>, radius: u32) -> StatsResult<Raster<i64>> {
    let radius = radius.max(1);
    let prefix = PrefixSum::from_raster(raster);
    let means = local_means(&prefix, radius)?;
    Ok(Raster::from_data(
        raster.width(),
        raster.height(),
        raster.channels(),
        means,
    )?)
}

/// Prefix sums plus a local-deviation index over one raster
///
/// Immutable once built; built once per raster and dropped after the bulk
/// build that consumes it.
#[derive(Debug, Clone)]
pub struct WindowedStats {
    sums: PrefixSum,
    deviation: PrefixSum,
    radius: u32,
}

impl WindowedStats {
    /// Build the index for `raster` with the given neighbourhood radius
    ///
    /// A radius of 0 is treated as 1.
    pub fn new<T: Sample>(raster: &Raster<T>, radius: u32) -> StatsResult<Self> {
        let radius = radius.max(1);
        let sums = PrefixSum::from_raster(raster);
        let means = local_means(&sums, radius)?;

        let channels = raster.channels() as usize;
        let width = raster.width() as usize;
        let deviation = PrefixSum::from_fn(raster.width(), raster.height(), 1, |x, y, _| {
            let base = (y as usize * width + x as usize) * channels;
            raster
                .pixel_unchecked(x, y)
                .iter()
                .zip(&means[base..base + channels])
                .map(|(&p, &m)| (p.widen() - m).abs())
                .sum()
        })?;

        debug!(
            width = raster.width(),
            height = raster.height(),
            channels = raster.channels(),
            radius,
            "built windowed statistics index"
        );

        Ok(Self {
            sums,
            deviation,
            radius,
        })
    }

    /// Get the indexed width
    pub fn width(&self) -> u32 {
        self.sums.width()
    }

    /// Get the indexed height
    pub fn height(&self) -> u32 {
        self.sums.height()
    }

    /// Get the number of channels
    pub fn channels(&self) -> u32 {
        self.sums.channels()
    }

    /// Get the effective neighbourhood radius
    pub fn radius(&self) -> u32 {
        self.radius
    }

    /// Per-channel sums over `rect`
    pub fn rect_sums(&self, rect: Rect) -> StatsResult<Vec<i64>> {
        self.sums.rect_sums(rect)
    }

    /// Per-channel floor mean over `rect`
    pub fn rect_mean(&self, rect: Rect) -> StatsResult<Vec<i64>> {
        self.sums.rect_mean(rect)
    }

    /// Total local deviation over `rect`
    pub fn rect_deviation(&self, rect: Rect) -> StatsResult<i64> {
        self.deviation.rect_sum(rect, 0)
    }

    /// Local deviation per pixel over `rect`, floored
    pub fn mean_deviation(&self, rect: Rect) -> StatsResult<i64> {
        if rect.is_empty() {
            return Err(StatsError::InvalidParameters(
                "mean deviation of an empty rect".into(),
            ));
        }
        Ok(self.rect_deviation(rect)?.div_euclid(rect.area() as i64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn brute_local_mean(raster: &Raster<u8>, x: u32, y: u32, c: u32, r: u32) -> i64 {
        let (w, h) = raster.dimensions();
        let (mut sum, mut count) = (0i64, 0i64);
        for yy in y.saturating_sub(r)..(y + r + 1).min(h) {
            for xx in x.saturating_sub(r)..(x + r + 1).min(w) {
                sum += raster.get(xx, yy, c).unwrap() as i64;
                count += 1;
            }
        }
        sum.div_euclid(count)
    }

    fn sample() -> Raster<u8> {
        Raster::from_fn(9, 6, 3, |x, y, c| ((x * x * 7 + y * 13 + c * 101) % 256) as u8).unwrap()
    }

    #[test]
    fn test_local_mean_matches_brute_force() {
        let r = sample();
        for radius in [1, 2, 4, 20] {
            let m = local_mean(&r, radius).unwrap();
            for y in 0..6 {
                for x in 0..9 {
                    for c in 0..3 {
                        assert_eq!(
                            m.get(x, y, c).unwrap(),
                            brute_local_mean(&r, x, y, c, radius),
                            "radius {} at ({}, {}, {})",
                            radius,
                            x,
                            y,
                            c
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_local_mean_radius_zero_is_one() {
        let r = sample();
        assert_eq!(local_mean(&r, 0).unwrap(), local_mean(&r, 1).unwrap());
        assert_eq!(WindowedStats::new(&r, 0).unwrap().radius(), 1);
    }

    #[test]
    fn test_uniform_raster_has_no_deviation() {
        let r = Raster::new_with_value(5, 5, 3, 77u8).unwrap();
        let stats = WindowedStats::new(&r, 2).unwrap();
        assert_eq!(stats.rect_deviation(r.bounds()).unwrap(), 0);
        assert_eq!(stats.rect_mean(r.bounds()).unwrap(), vec![77, 77, 77]);
    }

    #[test]
    fn test_deviation_matches_brute_force() {
        let r = sample();
        let stats = WindowedStats::new(&r, 2).unwrap();
        let means = local_mean(&r, 2).unwrap();

        let rect = Rect::new_unchecked(2, 7, 1, 5);
        let mut expected = 0i64;
        for y in rect.y_min..rect.y_max {
            for x in rect.x_min..rect.x_max {
                for c in 0..3 {
                    let p = r.get(x, y, c).unwrap() as i64;
                    expected += (p - means.get(x, y, c).unwrap()).abs();
                }
            }
        }
        assert_eq!(stats.rect_deviation(rect).unwrap(), expected);
        assert_eq!(
            stats.mean_deviation(rect).unwrap(),
            expected.div_euclid(rect.area() as i64)
        );
    }

    #[test]
    fn test_step_edge_deviates() {
        let r = Raster::from_fn(8, 8, 1, |x, _, _| if x < 4 { 0u8 } else { 200 }).unwrap();
        let stats = WindowedStats::new(&r, 1).unwrap();
        assert_eq!(stats.rect_deviation(Rect::square(0, 0, 2)).unwrap(), 0);
        assert!(stats.mean_deviation(Rect::new_unchecked(3, 5, 0, 8)).unwrap() > 0);
        assert!(stats.mean_deviation(Rect::new_unchecked(3, 3, 0, 8)).is_err());
    }
}
