use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut};
use imageproc::rect::Rect;

use super::font::LabelFont;
use crate::application::ports::AnnotatorPort;
use crate::domain::{
    classes::{class_color, class_name},
    detection::{BoundingBox, Detection, DetectionSet},
};

pub const BOX_THICKNESS: u32 = 3;
const LABEL_PADDING: u32 = 5;
const LABEL_TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Dibuja cajas y etiquetas `"<clase>: <score>"` sobre una copia de la radiografía.
///
/// Guarda la fuente resuelta al arrancar; el dibujo en sí es puro.
#[derive(Debug)]
pub struct Annotator {
    font: LabelFont,
}

impl Annotator {
    pub fn new(font: LabelFont) -> Self {
        Self { font }
    }

    fn draw_detection(&self, img: &mut RgbImage, det: &Detection) {
        let name = class_name(det.class_id);
        let color = Rgb(class_color(&name));
        let rect = box_to_rect(&det.bbox);

        draw_thick_rect(img, rect, color, BOX_THICKNESS);

        let label = format!("{}: {:.2}", name, det.confidence);
        let (text_w, text_h) = self.font.measure(&label);
        // la banda nunca necesita ser mayor que la imagen
        let band_w = text_w.saturating_add(2 * LABEL_PADDING).min(img.width().max(1));
        let band_h = text_h.saturating_add(2 * LABEL_PADDING).min(img.height().max(1));
        let background = Rect::at(rect.left(), rect.top()).of_size(band_w, band_h);
        draw_filled_rect_mut(img, background, color);
        self.font.draw(
            img,
            LABEL_TEXT_COLOR,
            rect.left() + LABEL_PADDING as i32,
            rect.top() + LABEL_PADDING as i32,
            &label,
        );
    }
}

impl AnnotatorPort for Annotator {
    fn annotate(&self, source: &RgbImage, detections: &DetectionSet) -> RgbImage {
        let mut canvas = source.clone();
        for det in detections {
            self.draw_detection(&mut canvas, det);
        }
        canvas
    }
}

/// Rectángulo en píxeles que cubre la caja, ambos bordes inclusive.
fn box_to_rect(bbox: &BoundingBox) -> Rect {
    // mantiene la aritmética de Rect dentro de i32 ante coordenadas absurdas
    const LIMIT: f32 = (1 << 24) as f32;
    let px = |v: f32| v.clamp(-LIMIT, LIMIT).round() as i32;

    let (left, top) = (px(bbox.xmin), px(bbox.ymin));
    let width = (px(bbox.xmax) - left).max(0) as u32 + 1;
    let height = (px(bbox.ymax) - top).max(0) as u32 + 1;
    Rect::at(left, top).of_size(width, height)
}

// El trazo crece hacia dentro: el borde exterior queda sobre las coordenadas de la caja.
fn draw_thick_rect(img: &mut RgbImage, rect: Rect, color: Rgb<u8>, thickness: u32) {
    for t in 0..thickness {
        let inset = 2 * t;
        if rect.width() <= inset || rect.height() <= inset {
            break;
        }
        let ring = Rect::at(rect.left() + t as i32, rect.top() + t as i32)
            .of_size(rect.width() - inset, rect.height() - inset);
        draw_hollow_rect_mut(img, ring, color);
    }
}
