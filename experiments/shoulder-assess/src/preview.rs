use {
    anyhow::Result,
    base::Vec2,
    image::{Image, rgb_to_u32},
    minifb::{Key, KeyRepeat, Window, WindowOptions},
};

/// The preview window. Shows RGB images, scaled by minifb if they do not fit.
pub struct Preview {
    window: Window,
}

impl Preview {
    pub fn open(title: &str, size: Vec2<usize>) -> Result<Self> {
        let mut window = Window::new(title, size.x, size.y, WindowOptions::default())?;
        window.set_target_fps(30);
        Ok(Self { window })
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    pub fn show(&mut self, image: &Image) -> Result<()> {
        let rgb = image.to_rgb()?;
        let buffer = rgb_to_u32(&rgb.data);
        self.window
            .update_with_buffer(&buffer, rgb.size.x, rgb.size.y)?;
        Ok(())
    }

    /// Keep the window responsive without drawing.
    pub fn poll(&mut self) {
        self.window.update();
    }

    /// Keys pressed since the last update.
    pub fn keys(&self) -> Vec<Key> {
        self.window.get_keys_pressed(KeyRepeat::Yes)
    }
}
