use std::borrow::Cow;

/// Tabla de etiquetas del detector. Índice == class id que emite el modelo.
pub const CLASS_NAMES: [&str; 7] = [
    "elbow positive",
    "fingers positive",
    "forearm fracture",
    "humerus fracture",
    "humerus",
    "shoulder fracture",
    "wrist positive",
];

pub const NUM_CLASSES: usize = CLASS_NAMES.len();

/// Para cualquier clase sin entrada en `CLASS_COLORS` (p.ej. `class_12`).
pub const DEFAULT_COLOR: [u8; 3] = [255, 0, 0];

const CLASS_COLORS: [(&str, [u8; 3]); 7] = [
    ("elbow positive", [255, 0, 0]),
    ("fingers positive", [255, 165, 0]),
    ("forearm fracture", [0, 255, 0]),
    ("humerus fracture", [0, 0, 255]),
    ("humerus", [128, 0, 128]),
    ("shoulder fracture", [255, 255, 0]),
    ("wrist positive", [0, 255, 255]),
];

/// Traduce un class id a su nombre visible.
///
/// Los ids fuera de la tabla se degradan a `class_<id>` en vez de fallar.
pub fn class_name(class_id: usize) -> Cow<'static, str> {
    match CLASS_NAMES.get(class_id) {
        Some(name) => Cow::Borrowed(*name),
        None => Cow::Owned(format!("class_{}", class_id)),
    }
}

pub fn class_color(name: &str) -> [u8; 3] {
    CLASS_COLORS
        .iter()
        .find(|(class, _)| *class == name)
        .map(|(_, rgb)| *rgb)
        .unwrap_or(DEFAULT_COLOR)
}
