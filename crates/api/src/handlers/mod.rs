pub mod auth;
pub mod import;
pub mod ownership;
pub mod products;
pub mod public;
pub mod testimonials;
pub mod widgets;
