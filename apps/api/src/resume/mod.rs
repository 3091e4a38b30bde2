// Resume form: model, validation rules, skills tag input, progress tracking,
// and the HTML preview the client rasterizes for export.

pub mod handlers;
pub mod models;
pub mod preview;
pub mod progress;
pub mod skills;
pub mod validation;

pub use models::ResumeForm;
