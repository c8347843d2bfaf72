pub mod endpoints;
pub mod params;
pub mod scrape;
