// Preview payload construction.
//
// The remote renderer serves the theme's templates but pulls the compiled
// stylesheet and script from the local dev server, so the document head is
// rewritten to point at `http://{host}:{port}/guide/...`.

use crate::context::RuntimeContext;
use crate::error::{Result, ThemeError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A theme already bundled into templates, asset URLs and variable values.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PreviewBundle {
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
    #[serde(default)]
    pub assets: BTreeMap<String, String>,
    #[serde(default)]
    pub variables: BTreeMap<String, serde_json::Value>,
    pub api_version: u32,
}

impl PreviewBundle {
    /// Read a bundle previously written as JSON.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| ThemeError::BundleRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| ThemeError::BundleParse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Metadata {
    pub api_version: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PreviewTemplates {
    #[serde(flatten)]
    pub templates: BTreeMap<String, String>,
    pub css: String,
    pub js: String,
    pub document_head: String,
    pub assets: BTreeMap<String, String>,
    pub variables: BTreeMap<String, serde_json::Value>,
    pub metadata: Metadata,
}

/// Body of the local preview upload.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct PreviewPayload {
    pub templates: PreviewTemplates,
}

/// Client-side snippet that reloads the page when the dev server says so.
pub fn livereload_script(host: &str, port: u16) -> String {
    format!(
        r#"<script>(() => {{
  const socket = new WebSocket('ws://{host}:{port}/livereload');
  socket.onopen = () => console.log('Listening to theme changes');
  socket.onmessage = e => e.data === 'reload' && location.reload();
}})()</script>
"#
    )
}

fn document_head(original: &str, context: &RuntimeContext) -> String {
    let (host, port) = (context.host.as_str(), context.port);
    let livereload = if context.livereload {
        livereload_script(host, port)
    } else {
        String::new()
    };
    format!(
        "\n<link rel=\"stylesheet\" href=\"http://{host}:{port}/guide/style.css\">\n\
         {original}\n\
         <script src=\"http://{host}:{port}/guide/script.js\"></script>\n\
         {livereload}\n"
    )
}

/// Assemble the upload body for `bundle` against the resolved context.
pub fn build_payload(bundle: PreviewBundle, context: &RuntimeContext) -> PreviewPayload {
    let PreviewBundle {
        mut templates,
        assets,
        variables,
        api_version,
    } = bundle;

    // These keys are written explicitly below; keep them out of the
    // flattened map so the JSON has no duplicates.
    templates.remove("css");
    templates.remove("js");
    let head = templates.remove("document_head").unwrap_or_default();

    PreviewPayload {
        templates: PreviewTemplates {
            templates,
            css: String::new(),
            js: String::new(),
            document_head: document_head(&head, context),
            assets,
            variables,
            metadata: Metadata { api_version },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn context(livereload: bool) -> RuntimeContext {
        RuntimeContext {
            bind: "localhost".into(),
            host: "localhost".into(),
            port: 4567,
            logs: false,
            livereload,
            subdomain: "z3n".into(),
            username: "admin@zendesk.com".into(),
            password: "123456".into(),
            origin: "https://z3n.zendesk.com".into(),
        }
    }

    fn bundle() -> PreviewBundle {
        PreviewBundle {
            templates: BTreeMap::from([
                ("home_page".to_string(), "<h1>Home</h1>".to_string()),
                ("document_head".to_string(), "<meta charset=\"utf-8\">".to_string()),
                ("css".to_string(), "body {}".to_string()),
            ]),
            assets: BTreeMap::from([(
                "logo.png".to_string(),
                "http://localhost:4567/guide/assets/logo.png".to_string(),
            )]),
            variables: BTreeMap::from([("color_brand".to_string(), json!("#17494D"))]),
            api_version: 3,
        }
    }

    #[test]
    fn wraps_document_head_with_local_assets() {
        let payload = build_payload(bundle(), &context(false));
        let head = &payload.templates.document_head;

        assert!(head.contains(r#"<link rel="stylesheet" href="http://localhost:4567/guide/style.css">"#));
        assert!(head.contains("<meta charset=\"utf-8\">"));
        assert!(head.contains(r#"<script src="http://localhost:4567/guide/script.js"></script>"#));
        assert!(!head.contains("WebSocket"));
    }

    #[test]
    fn adds_livereload_script_when_enabled() {
        let payload = build_payload(bundle(), &context(true));
        assert!(payload
            .templates
            .document_head
            .contains("new WebSocket('ws://localhost:4567/livereload')"));
    }

    #[test]
    fn serializes_the_upload_body() {
        let payload = build_payload(bundle(), &context(false));
        let value = serde_json::to_value(&payload).unwrap();
        let templates = &value["templates"];

        assert_eq!(templates["home_page"], "<h1>Home</h1>");
        assert_eq!(templates["css"], "");
        assert_eq!(templates["js"], "");
        assert_eq!(templates["assets"]["logo.png"], "http://localhost:4567/guide/assets/logo.png");
        assert_eq!(templates["variables"]["color_brand"], "#17494D");
        assert_eq!(templates["metadata"], json!({ "api_version": 3 }));
    }

    #[test]
    fn loads_bundle_from_disk() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bundle.json");
        std::fs::write(&path, r#"{"templates": {"home_page": "hi"}, "api_version": 2}"#).unwrap();

        let loaded = PreviewBundle::load(&path).unwrap();
        assert_eq!(loaded.api_version, 2);
        assert_eq!(loaded.templates["home_page"], "hi");
        assert!(loaded.assets.is_empty());
    }

    #[test]
    fn malformed_bundle_names_the_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("bundle.json");
        std::fs::write(&path, "{nope").unwrap();

        let err = PreviewBundle::load(&path).unwrap_err();
        assert!(err.to_string().contains(&path.display().to_string()));
    }
}
