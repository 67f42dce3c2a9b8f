//! Raster - The input pixel container
//!
//! A `Raster<T>` is a `width × height` grid of pixels with a fixed number of
//! channels, each channel stored as one [`Sample`].
//!
//! # Memory Layout
//!
//! Data is stored in row-major order with no padding. Channel `c` of the
//! pixel at (x, y) is at index `(y * width + x) * channels + c`.
//!
//! # Examples
//!
//! ```
//! use quadcomp_core::Raster;
//!
//! let raster = Raster::from_rows(&[[0u8, 1], [2, 3]]).unwrap();
//! assert_eq!(raster.dimensions(), (2, 2));
//! assert_eq!(raster.get(1, 1, 0).unwrap(), 3);
//! ```

use crate::error::{Error, Result};
use crate::rect::Rect;
use std::fmt;

/// Per-channel element type of a [`Raster`]
///
/// Implemented for every integer type that widens losslessly into `i64`,
/// which is the accumulator type of all region statistics.
pub trait Sample:
    Copy + PartialEq + PartialOrd + Default + fmt::Debug + Send + Sync + Into<i64> + TryFrom<i64>
{
    /// Widen into the `i64` accumulator type
    #[inline]
    fn widen(self) -> i64 {
        self.into()
    }
}

impl<T> Sample for T where
    T: Copy
        + PartialEq
        + PartialOrd
        + Default
        + fmt::Debug
        + Send
        + Sync
        + Into<i64>
        + TryFrom<i64>
{
}

/// Multi-channel raster image
#[derive(Debug, Clone, PartialEq)]
pub struct Raster<T = u8> {
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Samples per pixel
    channels: u32,
    /// Sample data (row-major, interleaved channels)
    data: Vec<T>,
}

fn check_dimensions(width: u32, height: u32, channels: u32) -> Result<usize> {
    if width == 0 || height == 0 || channels == 0 {
        return Err(Error::InvalidDimension {
            width,
            height,
            channels,
        });
    }
    Ok(width as usize * height as usize * channels as usize)
}

impl<T: Sample> Raster<T> {
    /// Create a new raster with all samples set to `T::default()`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if any dimension is 0.
    pub fn new(width: u32, height: u32, channels: u32) -> Result<Self> {
        Self::new_with_value(width, height, channels, T::default())
    }

    /// Create a new raster with all samples set to `value`
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if any dimension is 0.
    pub fn new_with_value(width: u32, height: u32, channels: u32, value: T) -> Result<Self> {
        let size = check_dimensions(width, height, channels)?;
        Ok(Self {
            width,
            height,
            channels,
            data: vec![value; size],
        })
    }

    /// Create a raster from raw interleaved data
    ///
    /// # Errors
    ///
    /// Returns an error if dimensions are invalid or the data length doesn't
    /// match `width * height * channels`.
    pub fn from_data(width: u32, height: u32, channels: u32, data: Vec<T>) -> Result<Self> {
        let size = check_dimensions(width, height, channels)?;
        if data.len() != size {
            return Err(Error::DimensionMismatch {
                expected: size,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Create a single-channel raster from rows of samples
    ///
    /// # Errors
    ///
    /// Returns an error if there are no rows, a row is empty, or the rows
    /// have different lengths.
    pub fn from_rows<R: AsRef<[T]>>(rows: &[R]) -> Result<Self> {
        let height = rows.len() as u32;
        let width = rows.first().map_or(0, |row| row.as_ref().len()) as u32;
        let size = check_dimensions(width, height, 1)?;

        let mut data = Vec::with_capacity(size);
        for row in rows {
            let row = row.as_ref();
            if row.len() != width as usize {
                return Err(Error::DimensionMismatch {
                    expected: width as usize,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }

        Ok(Self {
            width,
            height,
            channels: 1,
            data,
        })
    }

    /// Create a raster by evaluating `f(x, y, channel)` for every sample
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidDimension` if any dimension is 0.
    pub fn from_fn(
        width: u32,
        height: u32,
        channels: u32,
        mut f: impl FnMut(u32, u32, u32) -> T,
    ) -> Result<Self> {
        let size = check_dimensions(width, height, channels)?;
        let mut data = Vec::with_capacity(size);
        for y in 0..height {
            for x in 0..width {
                for c in 0..channels {
                    data.push(f(x, y, c));
                }
            }
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Get the raster width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Get the raster height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Get the number of channels per pixel
    #[inline]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    /// Get the raster dimensions as (width, height)
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Get the full raster extent as a rect
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new_unchecked(0, self.width, 0, self.height)
    }

    /// Get the raw sample data
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Check whether (x, y) lies inside the raster
    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.channels as usize
    }

    fn check_point(&self, x: u32, y: u32) -> Result<()> {
        if !self.contains(x, y) {
            return Err(Error::IndexOutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    /// Get all channels of the pixel at (x, y)
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexOutOfBounds` if coordinates are out of range.
    pub fn pixel(&self, x: u32, y: u32) -> Result<&[T]> {
        self.check_point(x, y)?;
        Ok(self.pixel_unchecked(x, y))
    }

    /// Get all channels of the pixel at (x, y) without bounds checking
    ///
    /// Panics if the coordinates are out of range.
    #[inline]
    pub fn pixel_unchecked(&self, x: u32, y: u32) -> &[T] {
        let start = self.offset(x, y);
        &self.data[start..start + self.channels as usize]
    }

    /// Get one sample at (x, y)
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinates or the channel are out of range.
    pub fn get(&self, x: u32, y: u32, channel: u32) -> Result<T> {
        self.check_point(x, y)?;
        if channel >= self.channels {
            return Err(Error::InvalidParameter(format!(
                "channel {} out of range for {} channels",
                channel, self.channels
            )));
        }
        Ok(self.get_unchecked(x, y, channel))
    }

    /// Get one sample at (x, y) without bounds checking
    #[inline]
    pub fn get_unchecked(&self, x: u32, y: u32, channel: u32) -> T {
        self.data[self.offset(x, y) + channel as usize]
    }

    /// Set one sample at (x, y)
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinates or the channel are out of range.
    pub fn set(&mut self, x: u32, y: u32, channel: u32, value: T) -> Result<()> {
        self.check_point(x, y)?;
        if channel >= self.channels {
            return Err(Error::InvalidParameter(format!(
                "channel {} out of range for {} channels",
                channel, self.channels
            )));
        }
        let idx = self.offset(x, y) + channel as usize;
        self.data[idx] = value;
        Ok(())
    }

    /// Set all channels of the pixel at (x, y)
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinates are out of range or `pixel` does
    /// not have exactly `channels` samples.
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: &[T]) -> Result<()> {
        self.check_point(x, y)?;
        if pixel.len() != self.channels as usize {
            return Err(Error::DimensionMismatch {
                expected: self.channels as usize,
                actual: pixel.len(),
            });
        }
        let start = self.offset(x, y);
        self.data[start..start + pixel.len()].copy_from_slice(pixel);
        Ok(())
    }

    /// Clip `rect` to the raster, rejecting rects that end up empty
    fn clip_region(&self, rect: Rect) -> Result<Rect> {
        rect.clip(self.width, self.height).ok_or_else(|| {
            Error::InvalidParameter(format!(
                "rect x {}..{}, y {}..{} does not intersect {}x{} raster",
                rect.x_min, rect.x_max, rect.y_min, rect.y_max, self.width, self.height
            ))
        })
    }

    /// Per-channel (min, max) over a rectangle
    ///
    /// Runs in O(area). The rect is clipped to the raster first.
    ///
    /// # Errors
    ///
    /// Returns an error if the rect does not intersect the raster.
    pub fn region_extrema(&self, rect: Rect) -> Result<Vec<(T, T)>> {
        let rect = self.clip_region(rect)?;
        let mut extrema: Vec<(T, T)> = self
            .pixel_unchecked(rect.x_min, rect.y_min)
            .iter()
            .map(|&v| (v, v))
            .collect();

        for y in rect.y_min..rect.y_max {
            for x in rect.x_min..rect.x_max {
                for (ext, &v) in extrema.iter_mut().zip(self.pixel_unchecked(x, y)) {
                    if v < ext.0 {
                        ext.0 = v;
                    }
                    if v > ext.1 {
                        ext.1 = v;
                    }
                }
            }
        }

        Ok(extrema)
    }

    /// Per-channel sum over a rectangle
    ///
    /// Runs in O(area). The rect is clipped to the raster first.
    ///
    /// # Errors
    ///
    /// Returns an error if the rect does not intersect the raster.
    pub fn region_sum(&self, rect: Rect) -> Result<Vec<i64>> {
        let rect = self.clip_region(rect)?;
        let mut sums = vec![0i64; self.channels as usize];
        for y in rect.y_min..rect.y_max {
            for x in rect.x_min..rect.x_max {
                for (sum, &v) in sums.iter_mut().zip(self.pixel_unchecked(x, y)) {
                    *sum += v.widen();
                }
            }
        }
        Ok(sums)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_zero_dimensions() {
        assert!(Raster::<u8>::new(0, 4, 1).is_err());
        assert!(Raster::<u8>::new(4, 0, 1).is_err());
        assert!(Raster::<u8>::new(4, 4, 0).is_err());
    }

    #[test]
    fn test_from_rows() {
        let r = Raster::from_rows(&[vec![1i32, 2, 3], vec![4, 5, 6]]).unwrap();
        assert_eq!(r.width(), 3);
        assert_eq!(r.height(), 2);
        assert_eq!(r.channels(), 1);
        assert_eq!(r.get(2, 1, 0).unwrap(), 6);
        assert_eq!(r.pixel(0, 1).unwrap(), &[4]);
    }

    #[test]
    fn test_from_rows_ragged() {
        let rows: Vec<Vec<u8>> = vec![vec![1, 2], vec![3]];
        assert!(matches!(
            Raster::from_rows(&rows),
            Err(Error::DimensionMismatch {
                expected: 2,
                actual: 1
            })
        ));
        let empty: Vec<Vec<u8>> = Vec::new();
        assert!(Raster::from_rows(&empty).is_err());
    }

    #[test]
    fn test_from_data_length_check() {
        assert!(Raster::from_data(2, 2, 3, vec![0u8; 12]).is_ok());
        assert!(Raster::from_data(2, 2, 3, vec![0u8; 11]).is_err());
    }

    #[test]
    fn test_from_fn_interleaves_channels() {
        let r = Raster::from_fn(2, 2, 3, |x, y, c| (x * 100 + y * 10 + c) as u16).unwrap();
        assert_eq!(r.pixel(1, 1).unwrap(), &[110, 111, 112]);
        assert_eq!(r.get(0, 1, 2).unwrap(), 12);
    }

    #[test]
    fn test_set_and_get() {
        let mut r = Raster::<u8>::new(3, 3, 3).unwrap();
        r.set_pixel(1, 2, &[10, 20, 30]).unwrap();
        r.set(0, 0, 1, 7).unwrap();
        assert_eq!(r.pixel(1, 2).unwrap(), &[10, 20, 30]);
        assert_eq!(r.get(0, 0, 1).unwrap(), 7);
        assert!(r.set_pixel(1, 2, &[1, 2]).is_err());
        assert!(r.get(3, 0, 0).is_err());
        assert!(r.get(0, 0, 3).is_err());
    }

    #[test]
    fn test_region_extrema_and_sum() {
        let r = Raster::from_rows(&[[0u8, 0, 1, 2], [0, 0, 3, 4]]).unwrap();
        let rect = Rect::new_unchecked(2, 4, 0, 2);
        assert_eq!(r.region_extrema(rect).unwrap(), vec![(1, 4)]);
        assert_eq!(r.region_sum(rect).unwrap(), vec![10]);
        let zeros = Rect::new_unchecked(0, 2, 0, 2);
        assert_eq!(r.region_extrema(zeros).unwrap(), vec![(0, 0)]);
    }

    #[test]
    fn test_region_stats_clip() {
        let r = Raster::<u8>::new_with_value(2, 2, 1, 5).unwrap();
        assert_eq!(r.region_sum(Rect::square(0, 0, 4)).unwrap(), vec![20]);
        assert!(r.region_sum(Rect::square(2, 2, 2)).is_err());
    }
}
