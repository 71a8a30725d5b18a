use glam::Vec2;

pub(crate) type Rgba = [u8; 4];

/// RGBA8 framebuffer view with bounds-checked primitives.
///
/// A panel translates every draw call to its top-left corner and clips to its bounds, which
/// lets overlays draw in local coordinates.
pub(crate) struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
    origin: (i32, i32),
    clip: ClipRect,
}

/// Absolute pixel bounds, right and bottom exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ClipRect {
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
}

impl<'a> Canvas<'a> {
    pub(crate) fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        Self {
            frame,
            width,
            height,
            origin: (0, 0),
            clip: ClipRect {
                left: 0,
                top: 0,
                right: width.min(i32::MAX as u32) as i32,
                bottom: height.min(i32::MAX as u32) as i32,
            },
        }
    }

    pub(crate) fn width(&self) -> u32 {
        self.width
    }

    pub(crate) fn height(&self) -> u32 {
        self.height
    }

    /// Restricts drawing to the given rectangle and makes its corner the local origin.
    pub(crate) fn set_panel(&mut self, x: i32, y: i32, panel_width: i32, panel_height: i32) {
        let full_right = self.width.min(i32::MAX as u32) as i32;
        let full_bottom = self.height.min(i32::MAX as u32) as i32;
        self.origin = (x, y);
        self.clip = ClipRect {
            left: x.clamp(0, full_right),
            top: y.clamp(0, full_bottom),
            right: x.saturating_add(panel_width.max(0)).clamp(0, full_right),
            bottom: y.saturating_add(panel_height.max(0)).clamp(0, full_bottom),
        };
    }

    pub(crate) fn reset_panel(&mut self) {
        self.set_panel(
            0,
            0,
            self.width.min(i32::MAX as u32) as i32,
            self.height.min(i32::MAX as u32) as i32,
        );
    }

    pub(crate) fn clear(&mut self, color: Rgba) {
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&color);
        }
    }

    pub(crate) fn put_pixel(&mut self, x: i32, y: i32, color: Rgba) {
        let x = x.saturating_add(self.origin.0);
        let y = y.saturating_add(self.origin.1);
        if x < self.clip.left || y < self.clip.top || x >= self.clip.right || y >= self.clip.bottom
        {
            return;
        }
        let Some(pixel_offset) = (y as usize)
            .checked_mul(self.width as usize)
            .and_then(|row| row.checked_add(x as usize))
        else {
            return;
        };
        let Some(byte_offset) = pixel_offset.checked_mul(4) else {
            return;
        };
        let Some(end) = byte_offset.checked_add(4) else {
            return;
        };
        if end > self.frame.len() {
            return;
        }
        self.frame[byte_offset..end].copy_from_slice(&color);
    }

    pub(crate) fn fill_rect(
        &mut self,
        x: i32,
        y: i32,
        rect_width: i32,
        rect_height: i32,
        color: Rgba,
    ) {
        let left = x.saturating_add(self.origin.0).max(self.clip.left);
        let top = y.saturating_add(self.origin.1).max(self.clip.top);
        let right = x
            .saturating_add(self.origin.0)
            .saturating_add(rect_width)
            .min(self.clip.right);
        let bottom = y
            .saturating_add(self.origin.1)
            .saturating_add(rect_height)
            .min(self.clip.bottom);
        for py in top..bottom {
            for px in left..right {
                self.put_pixel(px - self.origin.0, py - self.origin.1, color);
            }
        }
    }

    pub(crate) fn rect_outline(
        &mut self,
        x: i32,
        y: i32,
        rect_width: i32,
        rect_height: i32,
        thickness: i32,
        color: Rgba,
    ) {
        if rect_width <= 0 || rect_height <= 0 {
            return;
        }
        let t = thickness.max(1);
        self.fill_rect(x, y, rect_width, t, color);
        self.fill_rect(x, y + rect_height - t, rect_width, t, color);
        self.fill_rect(x, y, t, rect_height, color);
        self.fill_rect(x + rect_width - t, y, t, rect_height, color);
    }

    pub(crate) fn disc(&mut self, center: Vec2, radius: i32, color: Rgba) {
        if !center.is_finite() {
            return;
        }
        let cx = center.x.round() as i32;
        let cy = center.y.round() as i32;
        let r2 = radius * radius;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= r2 {
                    self.put_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// Draws the part of the segment that falls inside the canvas.
    pub(crate) fn line(&mut self, from: Vec2, to: Vec2, color: Rgba) {
        self.dashed_line(from, to, 0, color);
    }

    /// `dash == 0` draws a solid line; otherwise `dash` pixels on, `dash` pixels off.
    pub(crate) fn dashed_line(&mut self, from: Vec2, to: Vec2, dash: u32, color: Rgba) {
        let offset = Vec2::new(self.origin.0 as f32, self.origin.1 as f32);
        let min = Vec2::new(self.clip.left as f32, self.clip.top as f32) - offset;
        let max = Vec2::new(self.clip.right as f32 - 1.0, self.clip.bottom as f32 - 1.0) - offset;
        let Some((from, to)) = clip_segment(from, to, min, max) else {
            return;
        };

        let (mut x0, mut y0) = (from.x.round() as i32, from.y.round() as i32);
        let (x1, y1) = (to.x.round() as i32, to.y.round() as i32);
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut error = dx + dy;
        let mut step = 0u32;

        loop {
            if dash == 0 || (step / dash) % 2 == 0 {
                self.put_pixel(x0, y0, color);
            }
            if x0 == x1 && y0 == y1 {
                break;
            }
            let doubled = 2 * error;
            if doubled >= dy {
                error += dy;
                x0 += sx;
            }
            if doubled <= dx {
                error += dx;
                y0 += sy;
            }
            step = step.wrapping_add(1);
        }
    }
}

/// Liang-Barsky clip of a segment against the inclusive box `[min, max]`.
pub(crate) fn clip_segment(from: Vec2, to: Vec2, min: Vec2, max: Vec2) -> Option<(Vec2, Vec2)> {
    if !from.is_finite() || !to.is_finite() || max.x < min.x || max.y < min.y {
        return None;
    }
    let delta = to - from;
    let mut t0 = 0.0f32;
    let mut t1 = 1.0f32;
    let checks = [
        (-delta.x, from.x - min.x),
        (delta.x, max.x - from.x),
        (-delta.y, from.y - min.y),
        (delta.y, max.y - from.y),
    ];
    for (p, q) in checks {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    Some((from + delta * t0, from + delta * t1))
}
