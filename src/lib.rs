/// Prism - on-the-fly image transformation service
///
/// Accepts uploaded raster images, stores the originals under generated
/// identifiers, and renders transformed variants (resize, crop, pad,
/// filter, blur) on demand from query parameters.

pub mod api;
pub mod config;
pub mod context;
pub mod error;
pub mod repository;
pub mod server;
pub mod storage;
pub mod transform;
