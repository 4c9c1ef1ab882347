/// User interface components
///
/// - Before/after comparison canvas (comparison.rs) and its pointer math (slider.rs)
/// - File dialog and drop validation (picker.rs)
/// - API key modal (settings_dialog.rs)

pub mod comparison;
pub mod picker;
pub mod settings_dialog;
pub mod slider;
