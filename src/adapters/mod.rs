pub mod geoip;
pub mod http;

pub use geoip::{GeoClient, GeoEndpoints};
pub use http::HttpFetcher;
