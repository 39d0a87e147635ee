pub mod composer;
pub mod svg;
