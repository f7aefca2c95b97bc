//! Notes: the entity, list filters and the repository boundary

mod note;
mod repository;

pub use note::*;
pub use repository::*;
