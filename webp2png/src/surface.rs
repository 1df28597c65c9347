//! Drawing surfaces and the registry that owns them

use std::collections::HashMap;

use imageproc::image::{DynamicImage, Rgba, RgbaImage};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// An RGBA paint target, the native stand-in for a canvas element.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pixels: RgbaImage,
}

impl Default for Surface {
    fn default() -> Self {
        let (width, height) = Self::DEFAULT_DIMENSIONS;
        Self::new(width, height)
    }
}

impl Surface {
    /// Size of a canvas that was never painted on
    pub const DEFAULT_DIMENSIONS: (u32, u32) = (300, 150);

    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Make every pixel transparent, keeping the current size
    pub fn clear(&mut self) {
        self.pixels.pixels_mut().for_each(|p| *p = TRANSPARENT);
    }

    /// Resize to `image` and copy its pixels over
    pub fn paint(&mut self, image: &DynamicImage) {
        self.pixels = image.to_rgba8();
    }
}

/// Surfaces keyed by a stable id. The adapter only borrows from here.
#[derive(Debug, Default)]
pub struct SurfaceRegistry {
    surfaces: HashMap<String, Surface>,
}

impl SurfaceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with a single blank surface under `id`
    pub fn with_surface(id: impl Into<String>) -> Self {
        let mut registry = Self::new();
        registry.insert(id, Surface::default());
        registry
    }

    pub fn insert(&mut self, id: impl Into<String>, surface: Surface) -> Option<Surface> {
        self.surfaces.insert(id.into(), surface)
    }

    pub fn remove(&mut self, id: &str) -> Option<Surface> {
        self.surfaces.remove(id)
    }

    pub fn get(&self, id: &str) -> Option<&Surface> {
        self.surfaces.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Surface> {
        self.surfaces.get_mut(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.surfaces.contains_key(id)
    }
}
