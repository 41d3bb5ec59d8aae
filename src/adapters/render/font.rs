use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_text_mut, text_size};
use tracing::{debug, info, warn};

use super::bitmap_font;

const SYSTEM_FONT_PATHS: [&str; 5] = [
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// Fuente de las etiquetas de las cajas.
///
/// `Builtin` es el último recurso y siempre existe: dibujar etiquetas nunca falla.
pub enum LabelFont {
    Scalable { font: FontVec, scale: PxScale },
    Builtin { scale: u32 },
}

impl std::fmt::Debug for LabelFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LabelFont::Scalable { scale, .. } => f
                .debug_struct("Scalable")
                .field("scale", &scale.y)
                .finish_non_exhaustive(),
            LabelFont::Builtin { scale } => f.debug_struct("Builtin").field("scale", scale).finish(),
        }
    }
}

impl LabelFont {
    /// Prueba `preferred`, luego las rutas habituales del sistema y por último la fuente integrada.
    pub fn resolve(preferred: Option<&Path>, size: f32) -> Self {
        if let Some(path) = preferred {
            match load_font(path) {
                Ok(font) => {
                    info!("Fuente de etiquetas: {}", path.display());
                    return LabelFont::Scalable { font, scale: PxScale::from(size) };
                }
                Err(e) => warn!("No se pudo cargar la fuente {}: {}. Probando fuentes del sistema.", path.display(), e),
            }
        }

        for path in SYSTEM_FONT_PATHS {
            if let Ok(font) = load_font(Path::new(path)) {
                info!("Fuente de etiquetas: {}", path);
                return LabelFont::Scalable { font, scale: PxScale::from(size) };
            }
        }

        debug!("Sin fuente TrueType, se usa la fuente raster integrada");
        Self::builtin(size)
    }

    /// Fuente integrada con altura aproximada de `size` píxeles.
    pub fn builtin(size: f32) -> Self {
        let scale = (size / bitmap_font::GLYPH_HEIGHT as f32).round().max(1.0) as u32;
        LabelFont::Builtin { scale }
    }

    pub fn is_builtin(&self) -> bool {
        matches!(self, LabelFont::Builtin { .. })
    }

    pub fn measure(&self, text: &str) -> (u32, u32) {
        match self {
            LabelFont::Scalable { font, scale } => text_size(*scale, font, text),
            LabelFont::Builtin { scale } => bitmap_font::text_size(text, *scale),
        }
    }

    pub fn draw(&self, img: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, text: &str) {
        match self {
            LabelFont::Scalable { font, scale } => draw_text_mut(img, color, x, y, *scale, font, text),
            LabelFont::Builtin { scale } => bitmap_font::draw_text(img, color, x, y, *scale, text),
        }
    }
}

fn load_font(path: &Path) -> anyhow::Result<FontVec> {
    let data = std::fs::read(path)?;
    FontVec::try_from_vec(data).map_err(|_| anyhow::anyhow!("fichero de fuente inválido {}", path.display()))
}
