pub mod config;
pub mod files;
pub mod repo;
pub mod schema;
pub mod store;

pub use config::{load_config, save_config};
pub use files::{database_file, get_data_dir, init_local_dir, log_file};
pub use store::Store;
