use serde::{Deserialize, Serialize};

use super::errors::{DomainError, DomainResult};

/// Caja alineada a los ejes, en píxeles de la imagen original.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct BoundingBox {
    pub xmin: f32,
    pub ymin: f32,
    pub xmax: f32,
    pub ymax: f32,
}

impl BoundingBox {
    pub fn new(xmin: f32, ymin: f32, xmax: f32, ymax: f32) -> Self {
        Self { xmin, ymin, xmax, ymax }
    }

    pub fn is_well_formed(&self) -> bool {
        let coords = [self.xmin, self.ymin, self.xmax, self.ymax];
        coords.iter().all(|c| c.is_finite()) && self.xmin <= self.xmax && self.ymin <= self.ymax
    }

    pub fn to_array(self) -> [f32; 4] {
        [self.xmin, self.ymin, self.xmax, self.ymax]
    }
}

impl From<[f32; 4]> for BoundingBox {
    fn from(b: [f32; 4]) -> Self {
        Self::new(b[0], b[1], b[2], b[3])
    }
}

impl From<BoundingBox> for [f32; 4] {
    fn from(b: BoundingBox) -> Self {
        b.to_array()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub bbox: BoundingBox,
    pub class_id: usize,
    pub confidence: f32,
}

impl Detection {
    pub fn new(bbox: [f32; 4], class_id: usize, confidence: f32) -> Self {
        Self { bbox: BoundingBox::from(bbox), class_id, confidence }
    }

    /// Comprueba lo que garantiza el proveedor: caja bien formada, confianza en [0, 1].
    pub fn validate(&self) -> DomainResult<()> {
        if !self.bbox.is_well_formed() {
            return Err(DomainError::ContractViolation(format!(
                "caja mal formada {:?} para la clase {}",
                self.bbox.to_array(),
                self.class_id
            )));
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(DomainError::ContractViolation(format!(
                "confianza {} fuera de [0, 1] para la clase {}",
                self.confidence, self.class_id
            )));
        }
        Ok(())
    }
}

/// Detecciones de una imagen.
///
/// El orden es el de salida del proveedor y toda operación lo conserva; `best()`
/// lo usa para desempatar. Solo se construye con [`DetectionSet::from_provider`],
/// así que cada elemento ya está validado.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionSet {
    items: Vec<Detection>,
}

impl DetectionSet {
    pub fn from_provider(items: Vec<Detection>) -> DomainResult<Self> {
        for det in &items {
            det.validate()?;
        }
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.items.iter()
    }

    /// Conserva las detecciones con confianza estrictamente mayor que `threshold`.
    pub fn filter_by_confidence(&self, threshold: f32) -> DetectionSet {
        let items = self
            .items
            .iter()
            .filter(|d| d.confidence > threshold)
            .cloned()
            .collect();
        DetectionSet { items }
    }

    /// Detección de mayor confianza; en empate gana la primera.
    pub fn best(&self) -> Option<&Detection> {
        self.items.iter().fold(None, |best: Option<&Detection>, det| match best {
            Some(b) if b.confidence >= det.confidence => Some(b),
            _ => Some(det),
        })
    }

    /// Conjunto de un elemento para la vista de una sola caja.
    pub fn single(det: &Detection) -> DetectionSet {
        DetectionSet { items: vec![det.clone()] }
    }
}

impl<'a> IntoIterator for &'a DetectionSet {
    type Item = &'a Detection;
    type IntoIter = std::slice::Iter<'a, Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(class_id: usize, confidence: f32) -> Detection {
        Detection::new([10.0, 10.0, 50.0, 50.0], class_id, confidence)
    }

    fn sample() -> DetectionSet {
        DetectionSet::from_provider(vec![
            det(0, 0.91),
            det(1, 0.30),
            det(2, 0.50),
            det(3, 0.0),
            det(4, 0.77),
            det(5, 0.50),
            det(6, 1.0),
        ])
        .unwrap()
    }

    fn confidences(set: &DetectionSet) -> Vec<f32> {
        set.iter().map(|d| d.confidence).collect()
    }

    #[test]
    fn filter_is_strict_and_keeps_order() {
        let kept = sample().filter_by_confidence(0.5);
        assert_eq!(confidences(&kept), vec![0.91_f32, 0.77, 1.0]);
    }

    #[test]
    fn filter_is_monotonic_in_threshold() {
        let set = sample();
        let thresholds = [0.0, 0.25, 0.3, 0.5, 0.77, 0.9, 1.0];
        for (i, &low) in thresholds.iter().enumerate() {
            for &high in &thresholds[i..] {
                let loose = set.filter_by_confidence(low);
                let tight = set.filter_by_confidence(high);
                assert!(
                    tight.iter().all(|d| loose.iter().any(|e| e == d)),
                    "filter({high}) not contained in filter({low})"
                );
            }
        }
    }

    #[test]
    fn filter_is_idempotent() {
        let once = sample().filter_by_confidence(0.4);
        let twice = once.filter_by_confidence(0.4);
        assert_eq!(once, twice);
    }

    #[test]
    fn filter_edge_thresholds() {
        assert!(DetectionSet::default().filter_by_confidence(0.5).is_empty());

        let zero = sample().filter_by_confidence(0.0);
        assert_eq!(zero.len(), 6);
        assert!(zero.iter().all(|d| d.confidence > 0.0));

        assert!(sample().filter_by_confidence(1.0).is_empty());
    }

    #[test]
    fn detection_at_threshold_is_dropped() {
        let set = DetectionSet::from_provider(vec![det(2, 0.5)]).unwrap();
        assert!(set.filter_by_confidence(0.5).is_empty());
    }

    #[test]
    fn best_picks_maximum_and_first_on_ties() {
        let set = DetectionSet::from_provider(vec![
            det(1, 0.6),
            det(2, 0.8),
            det(3, 0.8),
            det(4, 0.7),
        ])
        .unwrap();
        let best = set.best().unwrap();
        assert_eq!(best.class_id, 2);
        assert_eq!(set.best(), set.best());
    }

    #[test]
    fn best_of_empty_is_none() {
        assert!(DetectionSet::default().best().is_none());
    }

    #[test]
    fn malformed_boxes_are_rejected() {
        let inverted = Detection::new([50.0, 10.0, 10.0, 50.0], 2, 0.9);
        let err = DetectionSet::from_provider(vec![det(0, 0.9), inverted]).unwrap_err();
        assert!(matches!(err, DomainError::ContractViolation(_)));

        let nan = Detection::new([f32::NAN, 10.0, 10.0, 50.0], 2, 0.9);
        assert!(nan.validate().is_err());
    }

    #[test]
    fn confidence_outside_unit_interval_is_rejected() {
        assert!(det(0, 1.2).validate().is_err());
        assert!(det(0, -0.1).validate().is_err());
        assert!(det(0, f32::NAN).validate().is_err());
    }

    #[test]
    fn degenerate_box_is_well_formed() {
        assert!(Detection::new([5.0, 5.0, 5.0, 5.0], 0, 0.6).validate().is_ok());
    }

    #[test]
    fn box_serializes_as_array() {
        let json = serde_json::to_value(BoundingBox::new(1.0, 2.0, 3.0, 4.0)).unwrap();
        assert_eq!(json, serde_json::json!([1.0, 2.0, 3.0, 4.0]));
    }
}
