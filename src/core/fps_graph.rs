// src/core/fps_graph.rs

//! Rolling frame-rate graph.

use crate::constants::{GRAPH_FALLBACK_MAX_FPS, MAX_GRAPH_DIMENSION};
use std::collections::VecDeque;

/// An RGBA pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    /// Opaque black.
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    /// Opaque green.
    pub const GREEN: Self = Self([0, 255, 0, 255]);
}

/// A rolling frame-rate history drawn into a fixed pixel buffer.
///
/// The buffer is `width * height` pixels, row-major, with row 0 at the bottom.
/// At most `width` samples are kept; each sample is one column.
#[derive(Debug, Clone)]
pub struct FpsGraph {
    width: usize,
    height: usize,
    samples: VecDeque<f32>,
    pixels: Vec<Rgba>,
    background: Rgba,
    line: Rgba,
}

impl FpsGraph {
    /// Creates a cleared graph. Each dimension is clamped to
    /// `2..=MAX_GRAPH_DIMENSION`.
    pub fn new(width: usize, height: usize) -> Self {
        let width = width.clamp(2, MAX_GRAPH_DIMENSION);
        let height = height.clamp(2, MAX_GRAPH_DIMENSION);
        Self {
            width,
            height,
            samples: VecDeque::with_capacity(width),
            pixels: vec![Rgba::BLACK; width * height],
            background: Rgba::BLACK,
            line: Rgba::GREEN,
        }
    }

    /// Overrides the background and line colors.
    pub fn with_colors(mut self, background: Rgba, line: Rgba) -> Self {
        self.background = background;
        self.line = line;
        self.clear();
        self
    }

    /// Records one frame rate, evicting the oldest once `width` samples are held.
    /// Non-finite and negative values are ignored.
    pub fn push(&mut self, fps: f32) {
        if !fps.is_finite() || fps < 0.0 {
            log::trace!("Ignoring FPS sample {}", fps);
            return;
        }
        if self.samples.len() >= self.width {
            self.samples.pop_front();
        }
        self.samples.push_back(fps);
    }

    /// Records a frame of `unscaled_dt` seconds as `1 / dt` frames per second.
    pub fn push_frame_time(&mut self, unscaled_dt: f32) {
        if unscaled_dt > 0.0 {
            self.push(1.0 / unscaled_dt);
        }
    }

    /// Clears the buffer and draws every consecutive pair of samples as a line,
    /// scaled against the highest sample.
    pub fn redraw(&mut self) {
        self.clear();

        let max = self.max_sample();
        let rows: Vec<i64> = self
            .samples
            .iter()
            .map(|&s| scale_to_row(s, max, self.height))
            .collect();

        for (x, pair) in rows.windows(2).enumerate() {
            if let &[y0, y1] = pair {
                let x0 = i64::try_from(x).unwrap_or(i64::MAX);
                draw_line(self, (x0, y0), (x0 + 1, y1));
            }
        }
    }

    /// Fills the buffer with the background color.
    pub fn clear(&mut self) {
        self.pixels.fill(self.background);
    }

    fn max_sample(&self) -> f32 {
        let max = self.samples.iter().copied().fold(0.0_f32, f32::max);
        if max > 0.0 { max } else { GRAPH_FALLBACK_MAX_FPS }
    }

    fn set_pixel(&mut self, x: i64, y: i64) {
        let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
            return;
        };
        if x >= self.width || y >= self.height {
            return;
        }
        let color = self.line;
        if let Some(pixel) = self.pixels.get_mut(y * self.width + x) {
            *pixel = color;
        }
    }

    /// The pixel at `(x, y)`, row 0 being the bottom.
    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(y * self.width + x).copied()
    }

    /// The raw buffer, row-major from the bottom row.
    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    /// Retained samples, oldest first.
    pub fn samples(&self) -> impl Iterator<Item = f32> + '_ {
        self.samples.iter().copied()
    }

    /// Graph width in pixels (and sample capacity).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Graph height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// A coarse text rendering of the most recent `cols` samples, `rows` lines tall.
    pub fn render_ascii(&self, cols: usize, rows: usize) -> String {
        let rows = rows.max(1);
        let max = self.max_sample();
        let skip = self.samples.len().saturating_sub(cols);
        let levels: Vec<i64> = self
            .samples
            .iter()
            .skip(skip)
            .map(|&s| scale_to_row(s, max, rows))
            .collect();

        (0..rows)
            .rev()
            .map(|row| {
                let row = i64::try_from(row).unwrap_or(i64::MAX);
                levels
                    .iter()
                    .map(|&level| if level == row { '*' } else { ' ' })
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Maps a sample onto `0..height`, clamped.
#[allow(clippy::cast_possible_truncation)]
fn scale_to_row(sample: f32, max: f32, height: usize) -> i64 {
    let top = i64::try_from(height).unwrap_or(i64::MAX) - 1;
    let row = (sample / max * height as f32) as i64;
    row.clamp(0, top)
}

/// Bresenham's line algorithm between two points, inclusive.
fn draw_line(graph: &mut FpsGraph, from: (i64, i64), to: (i64, i64)) {
    let (mut x0, mut y0) = from;
    let (x1, y1) = to;
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;

    loop {
        graph.set_pixel(x0, y0);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x0 += sx;
        }
        if e2 < dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lit_pixels(graph: &FpsGraph) -> usize {
        graph.pixels().iter().filter(|&&p| p == Rgba::GREEN).count()
    }

    #[test]
    fn test_sample_capacity_matches_width() {
        let mut graph = FpsGraph::new(4, 10);
        for fps in [10.0, 20.0, 30.0, 40.0, 50.0, 60.0] {
            graph.push(fps);
        }
        assert_eq!(graph.samples().collect::<Vec<_>>(), vec![30.0, 40.0, 50.0, 60.0]);
    }

    #[test]
    fn test_dimensions_are_clamped() {
        let graph = FpsGraph::new(usize::MAX, 0);
        assert_eq!(graph.width(), MAX_GRAPH_DIMENSION);
        assert_eq!(graph.height(), 2);
        assert_eq!(graph.pixels().len(), MAX_GRAPH_DIMENSION * 2);
    }

    #[test]
    fn test_invalid_samples_are_ignored() {
        let mut graph = FpsGraph::new(4, 10);
        graph.push(f32::INFINITY);
        graph.push(f32::NAN);
        graph.push(-1.0);
        graph.push_frame_time(0.0);
        graph.push_frame_time(0.5);
        assert_eq!(graph.samples().collect::<Vec<_>>(), vec![2.0]);
    }

    #[test]
    fn test_redraw_draws_flat_line_at_top_for_constant_fps() {
        // --- Setup ---
        let mut graph = FpsGraph::new(5, 4);
        for _ in 0..5 {
            graph.push(60.0);
        }

        // --- Execute ---
        graph.redraw();

        // --- Assert ---
        // Every sample equals the max, which clamps to the top row.
        for x in 0..5 {
            assert_eq!(graph.pixel(x, 3), Some(Rgba::GREEN));
            assert_eq!(graph.pixel(x, 0), Some(Rgba::BLACK));
        }
        assert_eq!(lit_pixels(&graph), 5);
    }

    #[test]
    fn test_redraw_connects_steep_segments() {
        let mut graph = FpsGraph::new(2, 10);
        graph.push(0.0);
        graph.push(100.0);

        graph.redraw();

        // From (0,0) to (1,9): Bresenham lights one pixel per row.
        assert_eq!(lit_pixels(&graph), 10);
        assert_eq!(graph.pixel(0, 0), Some(Rgba::GREEN));
        assert_eq!(graph.pixel(1, 9), Some(Rgba::GREEN));
    }

    #[test]
    fn test_redraw_clears_previous_frame() {
        let mut graph = FpsGraph::new(3, 3).with_colors(Rgba([1, 1, 1, 255]), Rgba::GREEN);
        graph.push(30.0);
        graph.push(30.0);
        graph.redraw();
        assert!(lit_pixels(&graph) > 0);

        let mut empty = FpsGraph::new(3, 3);
        empty.redraw();
        assert_eq!(lit_pixels(&empty), 0);
        assert_eq!(graph.pixel(3, 0), None);
    }

    #[test]
    fn test_render_ascii_uses_latest_samples() {
        let mut graph = FpsGraph::new(10, 10);
        for fps in [10.0, 60.0, 20.0, 60.0] {
            graph.push(fps);
        }

        let text = graph.render_ascii(3, 2);

        // Latest three samples: 60 (top), 20 (bottom), 60 (top).
        assert_eq!(text, "* *\n *");
    }
}
