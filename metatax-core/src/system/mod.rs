pub mod paths;

pub use paths::{default_config_path, metatax_home, CONFIG_FILE_NAME};
