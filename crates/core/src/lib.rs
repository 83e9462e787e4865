pub mod csv_import;
pub mod embed;
pub mod error;
pub mod html_entities;
pub mod importer;
pub mod render;
pub mod slug;
pub mod snippet;
pub mod style;
pub mod testimonial;
pub mod types;
pub mod widget_config;
