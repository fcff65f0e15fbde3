use {crate::*, base::Vec2};

// Cohen-Sutherland outcodes
const INSIDE: u8 = 0;
const LEFT: u8 = 1;
const RIGHT: u8 = 2;
const BOTTOM: u8 = 4;
const TOP: u8 = 8;

impl Image {
    fn set_pixel(&mut self, x: i32, y: i32, color: [u8; 3]) {
        if x < 0 || y < 0 || x >= self.size.x as i32 || y >= self.size.y as i32 {
            return;
        }
        let i = (y as usize * self.size.x + x as usize) * 3;
        self.data[i..i + 3].copy_from_slice(&color);
    }

    // square brush of `width` pixels centred on (x, y)
    fn stamp(&mut self, x: i32, y: i32, width: i32, color: [u8; 3]) {
        let lo = -(width - 1) / 2;
        for dy in lo..lo + width {
            for dx in lo..lo + width {
                self.set_pixel(x + dx, y + dy, color);
            }
        }
    }

    /// Draw a clipped line of the given width. Only RGB images are drawn on.
    pub fn draw_line(&mut self, from: Vec2<i32>, to: Vec2<i32>, width: i32, color: [u8; 3]) {
        if self.format != PixelFormat::Rgb8 || self.size.area() == 0 {
            return;
        }
        let Some((mut x0, mut y0, x1, y1)) = clip_line(
            from.x,
            from.y,
            to.x,
            to.y,
            self.size.x as i32,
            self.size.y as i32,
        ) else {
            return;
        };

        // Bresenham
        let dx = (x1 - x0).abs();
        let dy = (y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx - dy;
        loop {
            self.stamp(x0, y0, width.max(1), color);
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

    /// Draw a filled circle, clipped to the image.
    pub fn draw_filled_circle(&mut self, center: Vec2<i32>, radius: i32, color: [u8; 3]) {
        if self.format != PixelFormat::Rgb8 {
            return;
        }
        let r2 = radius * radius;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= r2 {
                    self.set_pixel(center.x + dx, center.y + dy, color);
                }
            }
        }
    }
}

fn compute_outcode(x: i32, y: i32, width: i32, height: i32) -> u8 {
    let mut code = INSIDE;
    if x < 0 {
        code |= LEFT;
    } else if x >= width {
        code |= RIGHT;
    }
    if y < 0 {
        code |= TOP;
    } else if y >= height {
        code |= BOTTOM;
    }
    code
}

fn clip_line(
    mut x0: i32,
    mut y0: i32,
    mut x1: i32,
    mut y1: i32,
    width: i32,
    height: i32,
) -> Option<(i32, i32, i32, i32)> {
    loop {
        let outcode0 = compute_outcode(x0, y0, width, height);
        let outcode1 = compute_outcode(x1, y1, width, height);
        if (outcode0 | outcode1) == 0 {
            return Some((x0, y0, x1, y1));
        }
        if (outcode0 & outcode1) != 0 {
            return None;
        }

        let outcode = if outcode0 != 0 { outcode0 } else { outcode1 };
        let dx = (x1 - x0) as i64;
        let dy = (y1 - y0) as i64;
        let (x, y) = if outcode & TOP != 0 {
            (x0 + (dx * -(y0 as i64) / dy) as i32, 0)
        } else if outcode & BOTTOM != 0 {
            (x0 + (dx * (height - 1 - y0) as i64 / dy) as i32, height - 1)
        } else if outcode & LEFT != 0 {
            (0, y0 + (dy * -(x0 as i64) / dx) as i32)
        } else {
            (width - 1, y0 + (dy * (width - 1 - x0) as i64 / dx) as i32)
        };

        if outcode == outcode0 {
            x0 = x;
            y0 = y;
        } else {
            x1 = x;
            y1 = y;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WHITE: [u8; 3] = [255, 255, 255];

    #[test]
    fn test_horizontal_line() {
        let mut image = Image::filled(Vec2::new(8, 4), [0, 0, 0]);
        image.draw_line(Vec2::new(1, 1), Vec2::new(6, 1), 1, WHITE);
        for x in 1..=6 {
            assert_eq!(image.pixel(x, 1), Some(WHITE));
        }
        assert_eq!(image.pixel(0, 1), Some([0, 0, 0]));
        assert_eq!(image.pixel(1, 2), Some([0, 0, 0]));
    }

    #[test]
    fn test_wide_line_covers_two_rows() {
        let mut image = Image::filled(Vec2::new(8, 4), [0, 0, 0]);
        image.draw_line(Vec2::new(1, 1), Vec2::new(6, 1), 2, WHITE);
        assert_eq!(image.pixel(3, 1), Some(WHITE));
        assert_eq!(image.pixel(3, 2), Some(WHITE));
    }

    #[test]
    fn test_line_is_clipped() {
        let mut image = Image::filled(Vec2::new(4, 4), [0, 0, 0]);
        image.draw_line(Vec2::new(-10, 2), Vec2::new(10, 2), 1, WHITE);
        for x in 0..4 {
            assert_eq!(image.pixel(x, 2), Some(WHITE));
        }
        image.draw_line(Vec2::new(-10, -10), Vec2::new(-5, -1), 1, [1, 2, 3]);
        assert!(image.data.iter().all(|&b| b == 0 || b == 255));
    }

    #[test]
    fn test_circle_clipped_at_corner() {
        let mut image = Image::filled(Vec2::new(5, 5), [0, 0, 0]);
        image.draw_filled_circle(Vec2::new(0, 0), 2, WHITE);
        assert_eq!(image.pixel(0, 0), Some(WHITE));
        assert_eq!(image.pixel(2, 0), Some(WHITE));
        assert_eq!(image.pixel(2, 2), Some([0, 0, 0]));
    }
}
