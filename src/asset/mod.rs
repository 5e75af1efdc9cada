//! Text asset transformations: SCSS compilation, minification and the
//! reserved image token rewrite.

pub mod minify;
pub mod scss;
pub mod token;

pub use minify::{minify_css, minify_js};
pub use scss::compile_scss;
pub use token::{MARKUP_IMG_PATH, STYLES_IMG_PATH, rewrite_img_token};
