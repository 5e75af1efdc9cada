//! Configuration section definitions.
//!
//! Each module corresponds to a section in `assetline.toml`:
//!
//! | Module    | TOML Section | Purpose                          |
//! |-----------|--------------|----------------------------------|
//! | `dirs`    | `[dirs]`     | Source and destination roots     |
//! | `images`  | `[images]`   | Raster image optimization        |
//! | `scripts` | `[scripts]`  | Script minification              |
//! | `serve`   | `[serve]`    | Development server + live reload  |

mod dirs;
mod images;
mod scripts;
mod serve;

pub use dirs::DirsConfig;
pub use images::ImagesConfig;
pub use scripts::ScriptsConfig;
pub use serve::ServeConfig;
