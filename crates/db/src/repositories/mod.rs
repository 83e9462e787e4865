//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod product_repo;
pub mod testimonial_repo;
pub mod user_repo;
pub mod widget_repo;

pub use product_repo::ProductRepo;
pub use testimonial_repo::TestimonialRepo;
pub use user_repo::UserRepo;
pub use widget_repo::WidgetRepo;
