pub mod fracture_detector;
pub mod model_catalog;
