use {
    anyhow::Result,
    base::Vec2,
    capture::{ClipHandle, DEFAULT_THUMBNAIL_COUNT},
    image::Image,
    minifb::Key,
    motion::FrameRangeSelector,
};

const STRIP_HEIGHT: usize = 24;
const START_COLOR: [u8; 3] = [0, 220, 0];
const END_COLOR: [u8; 3] = [220, 0, 0];
const CURSOR_COLOR: [u8; 3] = [255, 255, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrimAction {
    Continue,
    Confirm,
    Abort,
}

/// Keyboard trimming: arrows move the cursor, `S` and `E` put a handle on it.
pub struct Trimmer {
    cursor: usize,
    strip: Image,
}

impl Trimmer {
    pub fn new(clip: &ClipHandle) -> Result<Self> {
        Ok(Self {
            cursor: 0,
            strip: clip.thumbnail_strip(DEFAULT_THUMBNAIL_COUNT, STRIP_HEIGHT)?,
        })
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn handle(&mut self, key: Key, selector: &mut FrameRangeSelector) -> TrimAction {
        let last = selector.total_frames().saturating_sub(1);
        match key {
            Key::Left => self.cursor = self.cursor.saturating_sub(1),
            Key::Right => self.cursor = (self.cursor + 1).min(last),
            Key::Down => self.cursor = self.cursor.saturating_sub(30),
            Key::Up => self.cursor = (self.cursor + 30).min(last),
            Key::S => self.cursor = selector.set_start(self.cursor),
            Key::E => self.cursor = selector.set_end(self.cursor),
            Key::Enter => return TrimAction::Confirm,
            Key::Escape => return TrimAction::Abort,
            _ => {}
        }
        TrimAction::Continue
    }

    /// The frame under the cursor with the thumbnail strip and handle markers below it.
    pub fn render(&self, clip: &ClipHandle, selector: &FrameRangeSelector) -> Result<Image> {
        let mut view = clip.decode_frame(self.cursor)?;
        let top = view.size.y.saturating_sub(self.strip.size.y);
        let width = view.size.x.min(self.strip.size.x);
        for y in 0..self.strip.size.y.min(view.size.y) {
            let src = y * self.strip.size.x * 3;
            let dst = ((top + y) * view.size.x) * 3;
            view.data[dst..dst + width * 3].copy_from_slice(&self.strip.data[src..src + width * 3]);
        }

        let total = selector.total_frames().max(1);
        let x_of = |frame: usize| (frame * view.size.x / total) as i32;
        let (top, bottom) = (top as i32, view.size.y as i32 - 1);
        for (frame, color) in [
            (selector.start_frame(), START_COLOR),
            (selector.end_frame(), END_COLOR),
            (self.cursor, CURSOR_COLOR),
        ] {
            let x = x_of(frame);
            view.draw_line(Vec2::new(x, top), Vec2::new(x, bottom), 2, color);
        }
        Ok(view)
    }

    pub fn title(&self, selector: &FrameRangeSelector) -> String {
        format!(
            "Trim: frame {} ({:.2}s), range {}..{} | arrows move, S start, E end, Enter confirm",
            self.cursor,
            selector.seek(self.cursor).as_secs_f64(),
            selector.start_frame(),
            selector.end_frame()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trimmer() -> Trimmer {
        Trimmer {
            cursor: 0,
            strip: Image::filled(Vec2::new(4, 2), [0, 0, 0]),
        }
    }

    #[test]
    fn test_cursor_stays_in_clip() {
        let mut selector = FrameRangeSelector::new(90).unwrap();
        let mut trimmer = trimmer();
        trimmer.handle(Key::Left, &mut selector);
        assert_eq!(trimmer.cursor(), 0);
        for _ in 0..5 {
            trimmer.handle(Key::Up, &mut selector);
        }
        assert_eq!(trimmer.cursor(), 89);
        trimmer.handle(Key::Down, &mut selector);
        assert_eq!(trimmer.cursor(), 59);
    }

    #[test]
    fn test_handles_follow_cursor() {
        let mut selector = FrameRangeSelector::new(90).unwrap();
        let mut trimmer = trimmer();
        trimmer.handle(Key::Up, &mut selector);
        trimmer.handle(Key::Up, &mut selector);
        assert_eq!(trimmer.handle(Key::S, &mut selector), TrimAction::Continue);
        assert_eq!(selector.start_frame(), 60);

        // the end handle cannot pass the start handle
        trimmer.handle(Key::Down, &mut selector);
        trimmer.handle(Key::E, &mut selector);
        assert_eq!(selector.end_frame(), 61);
        assert_eq!(trimmer.cursor(), 61);

        assert_eq!(trimmer.handle(Key::Enter, &mut selector), TrimAction::Confirm);
        assert_eq!(trimmer.handle(Key::Escape, &mut selector), TrimAction::Abort);
    }
}
