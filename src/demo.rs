use crate::core::{DirtyUpdate, TextureSize, BYTES_PER_PIXEL};
use crate::traits::DisplaySink;

const CURSOR_SIZE: u32 = 16;
const BAND_WIDTH: u32 = 16;
const BAND_SPEED: u32 = 4;
const BLINK_PERIOD: u64 = 180;
const BLINK_HIDDEN: u64 = 30;

/// Synthetic framebuffer source standing in for a guest display.
///
/// Sends a full frame whenever the content size changes, then one narrow
/// dirty band per step, and walks the cursor around the centre.
#[derive(Debug, Default)]
pub struct DemoSource {
    frame: u64,
    size: Option<TextureSize>,
    cursor_defined: bool,
}

impl DemoSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Produce one step of updates for a display of `content` size
    pub fn step<S: DisplaySink + ?Sized>(&mut self, sink: &S, content: TextureSize) {
        if !self.cursor_defined {
            let cursor = cursor_image();
            sink.define_cursor(&cursor, CURSOR_SIZE, CURSOR_SIZE, CURSOR_SIZE * BYTES_PER_PIXEL);
            self.cursor_defined = true;
        }

        if content.is_empty() {
            return;
        }

        if self.size != Some(content) {
            let pixels = background(content);
            sink.update_region(DirtyUpdate::full(&pixels, content));
            self.size = Some(content);
        } else {
            self.send_band(sink, content);
        }

        let visible = self.frame % BLINK_PERIOD >= BLINK_HIDDEN;
        let angle = self.frame as f32 * 0.02;
        let radius = content.width.min(content.height) as f32 * 0.3;
        let x = content.width as f32 * 0.5 + radius * angle.cos();
        let y = content.height as f32 * 0.5 + radius * angle.sin();
        sink.set_cursor_visible(visible, x as i32, y as i32);

        self.frame += 1;
    }

    fn send_band<S: DisplaySink + ?Sized>(&self, sink: &S, content: TextureSize) {
        let width = BAND_WIDTH.min(content.width);
        let x = (self.frame as u32).wrapping_mul(BAND_SPEED) % (content.width - width + 1);
        let hue = (self.frame % 256) as u8;
        let pixels = [hue, 255 - hue, 128, 255].repeat((width * content.height) as usize);
        sink.update_region(DirtyUpdate::new(
            &pixels,
            x,
            0,
            width,
            content.height,
            width * BYTES_PER_PIXEL,
        ));
    }
}

/// Vertical gradient, BGRA
fn background(size: TextureSize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(size.buffer_size());
    for y in 0..size.height {
        let shade = (y * 255 / size.height.max(1)) as u8;
        for _ in 0..size.width {
            pixels.extend_from_slice(&[shade, shade / 2, 32, 255]);
        }
    }
    pixels
}

/// White triangle with a black edge on a transparent background, BGRA
fn cursor_image() -> Vec<u8> {
    let mut pixels = vec![0u8; (CURSOR_SIZE * CURSOR_SIZE * BYTES_PER_PIXEL) as usize];
    for y in 0..CURSOR_SIZE {
        for x in 0..=y.min(CURSOR_SIZE - 1) {
            let offset = ((y * CURSOR_SIZE + x) * BYTES_PER_PIXEL) as usize;
            let value = if x == 0 || x == y || y == CURSOR_SIZE - 1 { 0 } else { 255 };
            pixels[offset..offset + 4].copy_from_slice(&[value, value, value, 255]);
        }
    }
    pixels
}
