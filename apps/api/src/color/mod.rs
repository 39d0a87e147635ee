// Color harmonization: WCAG contrast helpers, palettes, dominant-color
// sampling and scheme generation. Pure and synchronous apart from handlers.

pub mod contrast;
pub mod handlers;
pub mod harmonizer;
pub mod palette;
pub mod sampler;
