//! Reserved image path token.
//!
//! Sources may write `@img/` as a placeholder for the deployed image folder.
//! Markup rewrites it to `img/`, stylesheets (one level down in `css/`) to
//! `../img/`.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{NoExpand, Regex};

/// The literal placeholder.
pub const IMG_TOKEN: &str = "@img/";

/// Image prefix as seen from the destination root.
pub const MARKUP_IMG_PATH: &str = "img/";

/// Image prefix as seen from the stylesheet folder.
pub const STYLES_IMG_PATH: &str = "../img/";

static IMG_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(&regex::escape(IMG_TOKEN)).unwrap());

/// Replace every occurrence of the token.
pub fn rewrite_img_token<'a>(text: &'a str, replacement: &str) -> Cow<'a, str> {
    IMG_TOKEN_RE.replace_all(text, NoExpand(replacement))
}
