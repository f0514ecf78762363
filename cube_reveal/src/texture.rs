use std::collections::HashMap;
use std::sync::Arc;

use cube_content::{PlateRasterizer, TileRasterizer};
use image::RgbaImage;

use crate::host::HostScene;

/// Rendered artwork for one (icon, label) pair.
#[derive(Debug)]
pub struct TileTexture {
    pub image: RgbaImage,
    pub anisotropy: u32,
}

/// Append-only cache of tile artwork. Entries are never evicted; the content
/// table bounds how many can exist.
pub struct TextureCache {
    rasterizer: Box<dyn TileRasterizer>,
    entries: HashMap<(String, String), Arc<TileTexture>>,
    anisotropy: u32,
}

impl TextureCache {
    pub fn new(rasterizer: Box<dyn TileRasterizer>, anisotropy: u32) -> Self {
        Self {
            rasterizer,
            entries: HashMap::new(),
            anisotropy: anisotropy.max(1),
        }
    }

    pub fn with_plate_rasterizer(size: u32, anisotropy: u32) -> Self {
        Self::new(Box::new(PlateRasterizer::new(size)), anisotropy)
    }

    pub fn get_or_create(&mut self, icon: &str, label: &str) -> Arc<TileTexture> {
        let key = (icon.to_string(), label.to_string());
        if let Some(texture) = self.entries.get(&key) {
            return Arc::clone(texture);
        }
        let texture = Arc::new(TileTexture {
            image: self.rasterizer.rasterize(icon, label),
            anisotropy: self.anisotropy,
        });
        self.entries.insert(key, Arc::clone(&texture));
        texture
    }

    pub fn get(&self, icon: &str, label: &str) -> Option<Arc<TileTexture>> {
        self.entries
            .get(&(icon.to_string(), label.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn anisotropy(&self) -> u32 {
        self.anisotropy
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str, &Arc<TileTexture>)> {
        self.entries
            .iter()
            .map(|((icon, label), texture)| (icon.as_str(), label.as_str(), texture))
    }
}

/// Ask the renderer for its anisotropy limit, falling back to 1.
pub fn query_anisotropy<H: HostScene + ?Sized>(host: &H) -> u32 {
    match host.max_anisotropy() {
        Ok(value) => value.max(1),
        Err(err) => {
            log::warn!("anisotropy query failed, using 1: {err}");
            1
        }
    }
}
