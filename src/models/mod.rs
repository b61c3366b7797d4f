pub mod common;
pub mod image;
pub mod repo;
pub mod request;
pub mod result;
pub mod text;

pub use common::*;
pub use image::*;
pub use repo::*;
pub use request::*;
pub use result::*;
pub use text::*;
