pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, bundled_data_dir, load_catalog, load_plan};
pub use schema::Plan;
