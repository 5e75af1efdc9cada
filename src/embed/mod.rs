//! Embedded static resources.
//!
//! - `template` - Template types for typed variable injection
//! - `serve` - Dev server resources (livereload.js)

mod template;

pub use template::{Template, TemplateVars};

pub mod serve {
    use super::{Template, TemplateVars};

    /// URL the live-reload client is served from.
    pub const LIVERELOAD_URL: &str = "/__assetline/livereload.js";

    /// Variables for livereload.js.
    pub struct LivereloadVars {
        pub ws_port: u16,
        /// Show the connection banner.
        pub notify: bool,
    }

    impl TemplateVars for LivereloadVars {
        fn apply(&self, content: &str) -> String {
            content
                .replace("__ASSETLINE_WS_PORT__", &self.ws_port.to_string())
                .replace("__ASSETLINE_NOTIFY__", if self.notify { "true" } else { "false" })
        }
    }

    /// Live reload client.
    pub const LIVERELOAD_JS: Template<LivereloadVars> =
        Template::new(include_str!("serve/livereload.js"));

    /// Script tag injected into served HTML.
    pub fn livereload_tag() -> String {
        format!(r#"<script src="{LIVERELOAD_URL}" defer></script>"#)
    }
}

#[cfg(test)]
mod tests {
    use super::serve::*;

    #[test]
    fn test_livereload_js_with_vars() {
        let rendered = LIVERELOAD_JS.render(&LivereloadVars {
            ws_port: 35730,
            notify: false,
        });
        assert!(rendered.contains("var port = 35730;"));
        assert!(rendered.contains("var notify = false;"));
        assert!(!rendered.contains("__ASSETLINE_"));
    }

    #[test]
    fn test_livereload_tag() {
        assert_eq!(
            livereload_tag(),
            r#"<script src="/__assetline/livereload.js" defer></script>"#
        );
    }
}
