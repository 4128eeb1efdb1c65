pub mod scale;
pub mod svg;
