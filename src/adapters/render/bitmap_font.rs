//! Fuente raster 5x7 integrada, para cuando no se puede cargar ninguna TrueType.
//!
//! Las mayúsculas usan el glifo de la minúscula; los caracteres fuera de la
//! tabla se dibujan como `?`.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

pub const GLYPH_WIDTH: u32 = 5;
pub const GLYPH_HEIGHT: u32 = 7;
/// Una columna en blanco entre glifos.
pub const GLYPH_ADVANCE: u32 = GLYPH_WIDTH + 1;
/// Escalado máximo al dibujar; mantiene las coordenadas dentro de `i32`.
const MAX_SCALE: u32 = 1 << 16;

// Cada fila usa los 5 bits bajos; el bit 4 es el píxel de la izquierda.
fn glyph(ch: char) -> [u8; 7] {
    match ch.to_ascii_lowercase() {
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        'a' => [0x00, 0x00, 0x0E, 0x01, 0x0F, 0x11, 0x0F],
        'b' => [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x1E],
        'c' => [0x00, 0x00, 0x0E, 0x10, 0x10, 0x11, 0x0E],
        'd' => [0x01, 0x01, 0x0D, 0x13, 0x11, 0x11, 0x0F],
        'e' => [0x00, 0x00, 0x0E, 0x11, 0x1F, 0x10, 0x0E],
        'f' => [0x06, 0x09, 0x08, 0x1C, 0x08, 0x08, 0x08],
        'g' => [0x00, 0x0F, 0x11, 0x11, 0x0F, 0x01, 0x0E],
        'h' => [0x10, 0x10, 0x16, 0x19, 0x11, 0x11, 0x11],
        'i' => [0x04, 0x00, 0x0C, 0x04, 0x04, 0x04, 0x0E],
        'j' => [0x02, 0x00, 0x06, 0x02, 0x02, 0x12, 0x0C],
        'k' => [0x10, 0x10, 0x12, 0x14, 0x18, 0x14, 0x12],
        'l' => [0x0C, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'm' => [0x00, 0x00, 0x1A, 0x15, 0x15, 0x11, 0x11],
        'n' => [0x00, 0x00, 0x16, 0x19, 0x11, 0x11, 0x11],
        'o' => [0x00, 0x00, 0x0E, 0x11, 0x11, 0x11, 0x0E],
        'p' => [0x00, 0x00, 0x1E, 0x11, 0x1E, 0x10, 0x10],
        'q' => [0x00, 0x00, 0x0D, 0x13, 0x0F, 0x01, 0x01],
        'r' => [0x00, 0x00, 0x16, 0x19, 0x10, 0x10, 0x10],
        's' => [0x00, 0x00, 0x0E, 0x10, 0x0E, 0x01, 0x1E],
        't' => [0x08, 0x08, 0x1C, 0x08, 0x08, 0x09, 0x06],
        'u' => [0x00, 0x00, 0x11, 0x11, 0x11, 0x13, 0x0D],
        'v' => [0x00, 0x00, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'w' => [0x00, 0x00, 0x11, 0x11, 0x15, 0x15, 0x0A],
        'x' => [0x00, 0x00, 0x11, 0x0A, 0x04, 0x0A, 0x11],
        'y' => [0x00, 0x00, 0x11, 0x11, 0x0F, 0x01, 0x0E],
        'z' => [0x00, 0x00, 0x1F, 0x02, 0x04, 0x08, 0x1F],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '%' => [0x18, 0x19, 0x02, 0x04, 0x08, 0x13, 0x03],
        '(' => [0x02, 0x04, 0x08, 0x08, 0x08, 0x04, 0x02],
        ')' => [0x08, 0x04, 0x02, 0x02, 0x02, 0x04, 0x08],
        ' ' => [0x00; 7],
        _ => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
    }
}

/// Tamaño de `text` con cada píxel de la fuente escalado a `scale x scale`.
///
/// Satura en `u32::MAX` en lugar de desbordar.
pub fn text_size(text: &str, scale: u32) -> (u32, u32) {
    let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
    if chars == 0 {
        return (0, 0);
    }
    let width = chars.saturating_mul(GLYPH_ADVANCE).saturating_sub(1).saturating_mul(scale);
    (width, GLYPH_HEIGHT.saturating_mul(scale))
}

/// Dibuja `text` con la esquina superior izquierda en (x, y). Se recorta al borde de la imagen.
pub fn draw_text(img: &mut RgbImage, color: Rgb<u8>, x: i32, y: i32, scale: u32, text: &str) {
    let scale = scale.clamp(1, MAX_SCALE);
    let size = i64::from(scale);
    let (width, height) = (i64::from(img.width()), i64::from(img.height()));
    for (i, ch) in text.chars().enumerate() {
        let origin_x = i64::from(x) + i as i64 * i64::from(GLYPH_ADVANCE) * size;
        if origin_x >= width {
            break;
        }
        for (row, bits) in glyph(ch).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                let px = origin_x + i64::from(col) * size;
                let py = i64::from(y) + row as i64 * size;
                // fuera de la imagen; además mantiene Rect dentro de i32
                if px >= width || py >= height || px + size <= 0 || py + size <= 0 {
                    continue;
                }
                draw_filled_rect_mut(img, Rect::at(px as i32, py as i32).of_size(scale, scale), color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_size_scales_with_length_and_factor() {
        assert_eq!(text_size("", 2), (0, 0));
        assert_eq!(text_size("a", 1), (5, 7));
        assert_eq!(text_size("ab", 2), (22, 14));
    }

    #[test]
    fn draws_only_inside_text_box() {
        let mut img = RgbImage::new(40, 20);
        let white = Rgb([255, 255, 255]);
        draw_text(&mut img, white, 2, 3, 2, "1.0");

        let (w, h) = text_size("1.0", 2);
        let lit: Vec<_> = img
            .enumerate_pixels()
            .filter(|(_, _, p)| **p == white)
            .map(|(x, y, _)| (x, y))
            .collect();
        assert!(!lit.is_empty());
        assert!(lit.iter().all(|&(x, y)| x >= 2 && x < 2 + w && y >= 3 && y < 3 + h));
    }

    #[test]
    fn huge_scale_and_long_text_do_not_overflow() {
        let label = "forearm fracture: 0.87".repeat(200);
        let (w, h) = text_size(&label, u32::MAX / 2);
        assert_eq!(w, u32::MAX);
        assert_eq!(h, u32::MAX);

        let white = Rgb([255, 255, 255]);
        let mut img = RgbImage::new(16, 16);
        draw_text(&mut img, white, i32::MAX - 4, i32::MAX - 4, 5_000, &label);
        draw_text(&mut img, white, i32::MIN, i32::MIN, u32::MAX, &label);
        assert_eq!(img, RgbImage::new(16, 16));

        // 'b' enciende el píxel (0, 0) del glifo: a escala máxima cubre toda la imagen
        draw_text(&mut img, white, 0, 0, u32::MAX, "b");
        assert!(img.pixels().all(|p| *p == white));
    }

    #[test]
    fn clips_at_image_border() {
        let mut img = RgbImage::new(4, 4);
        draw_text(&mut img, Rgb([1, 2, 3]), -3, -3, 3, "8");
        draw_text(&mut img, Rgb([1, 2, 3]), 2, 2, 3, "8");
    }
}
