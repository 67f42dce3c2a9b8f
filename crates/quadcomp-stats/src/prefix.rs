//! Prefix sums (summed area tables)
//!
//! `P[y][x]` holds the sum of every sample in `[0, x] × [0, y]`, per
//! channel, in `i64`. Any rectangle sum then costs four lookups.

use crate::{StatsError, StatsResult};
use quadcomp_core::{Raster, Rect, Sample};

/// Per-channel 2D inclusive prefix sums
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixSum {
    width: u32,
    height: u32,
    channels: u32,
    data: Vec<i64>,
}

impl PrefixSum {
    /// Build the prefix sums of every channel of `raster`
    pub fn from_raster<T: Sample>(raster: &Raster<T>) -> Self {
        Self::accumulate(raster.width(), raster.height(), raster.channels(), |x, y, c| {
            raster.get_unchecked(x, y, c).widen()
        })
    }

    /// Build the prefix sums of a derived plane given by `f(x, y, channel)`
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Core` if any dimension is 0.
    pub fn from_fn(
        width: u32,
        height: u32,
        channels: u32,
        f: impl FnMut(u32, u32, u32) -> i64,
    ) -> StatsResult<Self> {
        if width == 0 || height == 0 || channels == 0 {
            return Err(quadcomp_core::Error::InvalidDimension {
                width,
                height,
                channels,
            }
            .into());
        }
        Ok(Self::accumulate(width, height, channels, f))
    }

    fn accumulate(
        width: u32,
        height: u32,
        channels: u32,
        mut f: impl FnMut(u32, u32, u32) -> i64,
    ) -> Self {
        let (w, c) = (width as usize, channels as usize);
        let row_len = w * c;
        let mut data = vec![0i64; row_len * height as usize];
        let mut row_sum = vec![0i64; c];

        for y in 0..height {
            row_sum.fill(0);
            let row_start = y as usize * row_len;
            for x in 0..width {
                let idx = row_start + x as usize * c;
                for ch in 0..channels {
                    let i = ch as usize;
                    row_sum[i] += f(x, y, ch);
                    let above = if y > 0 { data[idx + i - row_len] } else { 0 };
                    data[idx + i] = row_sum[i] + above;
                }
            }
        }

        Self {
            width,
            height,
            channels,
            data,
        }
    }

    /// Get the indexed width
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the indexed height
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the number of channels
    #[inline]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    #[inline]
    fn at(&self, x: u32, y: u32, channel: u32) -> i64 {
        let idx = (y as usize * self.width as usize + x as usize) * self.channels as usize
            + channel as usize;
        self.data[idx]
    }

    /// Inclusive prefix sum at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `StatsError::Core` if the position or channel is out of range.
    pub fn get(&self, x: u32, y: u32, channel: u32) -> StatsResult<i64> {
        if x >= self.width || y >= self.height {
            return Err(quadcomp_core::Error::IndexOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            }
            .into());
        }
        self.check_channel(channel)?;
        Ok(self.at(x, y, channel))
    }

    fn check_channel(&self, channel: u32) -> StatsResult<()> {
        if channel >= self.channels {
            return Err(StatsError::InvalidParameters(format!(
                "channel {} out of range for {} channels",
                channel, self.channels
            )));
        }
        Ok(())
    }

    fn check_rect(&self, rect: Rect) -> StatsResult<()> {
        if rect.is_empty() || rect.x_max > self.width || rect.y_max > self.height {
            return Err(StatsError::InvalidRect {
                x_min: rect.x_min,
                x_max: rect.x_max,
                y_min: rect.y_min,
                y_max: rect.y_max,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    fn sum_unchecked(&self, rect: Rect, channel: u32) -> i64 {
        let (x1, y1) = (rect.x_max - 1, rect.y_max - 1);
        let mut sum = self.at(x1, y1, channel);
        if rect.x_min > 0 {
            sum -= self.at(rect.x_min - 1, y1, channel);
        }
        if rect.y_min > 0 {
            sum -= self.at(x1, rect.y_min - 1, channel);
        }
        if rect.x_min > 0 && rect.y_min > 0 {
            sum += self.at(rect.x_min - 1, rect.y_min - 1, channel);
        }
        sum
    }

    /// Sum of one channel over `rect` in O(1)
    ///
    /// # Errors
    ///
    /// Returns `StatsError::InvalidRect` if `rect` is empty or not inside the
    /// indexed area, `StatsError::InvalidParameters` for a bad channel.
    pub fn rect_sum(&self, rect: Rect, channel: u32) -> StatsResult<i64> {
        self.check_rect(rect)?;
        self.check_channel(channel)?;
        Ok(self.sum_unchecked(rect, channel))
    }

    /// Sums of every channel over `rect`
    pub fn rect_sums(&self, rect: Rect) -> StatsResult<Vec<i64>> {
        self.check_rect(rect)?;
        Ok((0..self.channels)
            .map(|c| self.sum_unchecked(rect, c))
            .collect())
    }

    /// Per-channel mean over `rect`, rounded toward negative infinity
    pub fn rect_mean(&self, rect: Rect) -> StatsResult<Vec<i64>> {
        let area = rect.area() as i64;
        Ok(self
            .rect_sums(rect)?
            .into_iter()
            .map(|sum| sum.div_euclid(area))
            .collect())
    }
}
