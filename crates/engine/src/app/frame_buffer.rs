use crate::sim::{Color, Surface};

/// RGBA8 framebuffer view at the logical resolution.
///
/// Rectangles are clipped to the buffer; anything fully outside is a no-op.
pub struct FrameBuffer<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> FrameBuffer<'a> {
    /// Returns `None` when `frame` is smaller than `width * height` pixels.
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Option<Self> {
        let required = (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(4)?;
        if frame.len() < required {
            return None;
        }
        Some(Self {
            frame,
            width,
            height,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let bytes = self.frame.get(offset..offset + 4)?;
        Some([bytes[0], bytes[1], bytes[2], bytes[3]])
    }
}

impl Surface for FrameBuffer<'_> {
    fn fill(&mut self, color: Color) {
        let rgba = color.to_rgba();
        for pixel in self.frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&rgba);
        }
    }

    fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Color) {
        let Some((x_range, y_range)) = clip_rect(x, y, width, height, self.width, self.height)
        else {
            return;
        };
        let rgba = color.to_rgba();
        let stride = self.width as usize * 4;
        for row in y_range {
            let start = row * stride + x_range.start * 4;
            let end = row * stride + x_range.end * 4;
            for pixel in self.frame[start..end].chunks_exact_mut(4) {
                pixel.copy_from_slice(&rgba);
            }
        }
    }
}

type PixelRange = std::ops::Range<usize>;

fn clip_rect(
    x: i32,
    y: i32,
    width: u32,
    height: u32,
    buffer_width: u32,
    buffer_height: u32,
) -> Option<(PixelRange, PixelRange)> {
    let clip_axis = |start: i32, len: u32, limit: u32| -> Option<PixelRange> {
        let start = i64::from(start);
        let end = start + i64::from(len);
        let clipped_start = start.max(0);
        let clipped_end = end.min(i64::from(limit));
        if clipped_start >= clipped_end {
            return None;
        }
        Some(clipped_start as usize..clipped_end as usize)
    };
    Some((
        clip_axis(x, width, buffer_width)?,
        clip_axis(y, height, buffer_height)?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color::rgb(0xff, 0, 0);
    const SKY: Color = Color::rgb(0x79, 0x74, 0xff);

    #[test]
    fn rejects_undersized_frames() {
        let mut bytes = vec![0u8; 4 * 4 * 3];
        assert!(FrameBuffer::new(&mut bytes, 4, 4).is_none());
        assert!(FrameBuffer::new(&mut bytes, 4, 3).is_some());
    }

    #[test]
    fn fill_covers_every_pixel() {
        let mut bytes = vec![0u8; 3 * 2 * 4];
        let mut buffer = FrameBuffer::new(&mut bytes, 3, 2).expect("buffer");

        buffer.fill(SKY);

        assert_eq!(buffer.pixel(0, 0), Some(SKY.to_rgba()));
        assert_eq!(buffer.pixel(2, 1), Some(SKY.to_rgba()));
        assert_eq!(buffer.pixel(3, 0), None);
    }

    #[test]
    fn rect_partially_off_screen_is_clipped() {
        let mut bytes = vec![0u8; 4 * 4 * 4];
        let mut buffer = FrameBuffer::new(&mut bytes, 4, 4).expect("buffer");
        buffer.fill(Color::BLACK);

        buffer.fill_rect(-2, 2, 4, 10, RED);

        assert_eq!(buffer.pixel(0, 2), Some(RED.to_rgba()));
        assert_eq!(buffer.pixel(1, 3), Some(RED.to_rgba()));
        assert_eq!(buffer.pixel(2, 2), Some(Color::BLACK.to_rgba()));
        assert_eq!(buffer.pixel(0, 1), Some(Color::BLACK.to_rgba()));
    }

    #[test]
    fn rect_fully_outside_draws_nothing() {
        let mut bytes = vec![0u8; 2 * 2 * 4];
        let mut buffer = FrameBuffer::new(&mut bytes, 2, 2).expect("buffer");

        buffer.fill_rect(5, 0, 3, 3, RED);
        buffer.fill_rect(0, -9, 3, 3, RED);
        buffer.fill_rect(0, 0, 0, 3, RED);

        assert!(bytes.iter().all(|byte| *byte == 0));
    }
}
