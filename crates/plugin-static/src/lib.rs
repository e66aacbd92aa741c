//! # plugin-static
//!
//! Serves files from configured root directories under `/static/{*path}`.
//! A route-only plugin: it declares no hooks at all.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use http::Method;
use tracing::debug;

use burrow_core::{AppError, AppResult};
use burrow_maze::Maze;
use burrow_plugin::{
    BuiltinPlugin, MazeAccess, MazePlugin, PluginDescriptor, PluginRequest, PluginResponse,
    RouteDescriptor,
};

pub const NAME: &str = "static";

const ROUTE_ASSET: &str = "asset";
const DEFAULT_ROOT: &str = "www";

pub fn builtin() -> BuiltinPlugin {
    BuiltinPlugin {
        name: NAME,
        build: |settings, enabled| {
            let roots: Vec<PathBuf> = settings
                .get("roots")
                .and_then(|v| v.as_array())
                .map(|values| {
                    values
                        .iter()
                        .filter_map(|v| v.as_str())
                        .map(PathBuf::from)
                        .collect()
                })
                .unwrap_or_else(|| vec![PathBuf::from(DEFAULT_ROOT)]);

            PluginDescriptor::builder(NAME, env!("CARGO_PKG_VERSION"))
                .settings(settings)
                .enabled(enabled)
                .route(RouteDescriptor::instance(
                    NAME,
                    Method::GET,
                    "/static/{*path}",
                    MazeAccess::NotRequired,
                    ROUTE_ASSET,
                ))
                .factory(Arc::new(move |_| {
                    Ok(Arc::new(StaticPlugin { roots: roots.clone() }) as Arc<dyn MazePlugin>)
                }))
                .build()
        },
    }
}

pub struct StaticPlugin {
    roots: Vec<PathBuf>,
}

impl StaticPlugin {
    /// First root containing the requested file. Traversal components are
    /// rejected before any filesystem access.
    async fn resolve(&self, raw: &str) -> AppResult<(PathBuf, Vec<u8>)> {
        let relative = sanitize(raw)?;
        for root in &self.roots {
            let candidate = root.join(&relative);
            match tokio::fs::read(&candidate).await {
                Ok(body) => return Ok((candidate, body)),
                Err(error) => {
                    debug!(path = %candidate.display(), %error, "static lookup miss");
                }
            }
        }
        Err(AppError::not_found(format!("no such file: {raw}")))
    }
}

#[async_trait]
impl MazePlugin for StaticPlugin {
    fn name(&self) -> &str {
        NAME
    }

    async fn handle_route(
        &self,
        route_id: &str,
        _maze: &Maze,
        request: PluginRequest,
    ) -> AppResult<PluginResponse> {
        match route_id {
            ROUTE_ASSET => {
                let raw = request
                    .params
                    .get("path")
                    .ok_or_else(|| AppError::not_found("missing file path"))?;
                let (path, body) = self.resolve(raw).await?;
                Ok(PluginResponse::raw(content_type_for(&path), body))
            }
            _ => Err(AppError::not_found(format!("no route '{route_id}'"))),
        }
    }
}

/// Normalizes a request path into a relative path with plain components
/// only. Absolute paths and parent references are refused.
fn sanitize(raw: &str) -> AppResult<PathBuf> {
    let path = Path::new(raw);
    let mut clean = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => return Err(AppError::forbidden("invalid file path")),
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(AppError::not_found("missing file path"));
    }
    Ok(clean)
}

fn content_type_for(path: &Path) -> String {
    mime_guess::from_path(path).first_or_octet_stream().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_accepts_nested_relative_paths() {
        assert_eq!(sanitize("css/site.css").unwrap(), PathBuf::from("css/site.css"));
        assert_eq!(sanitize("./index.html").unwrap(), PathBuf::from("index.html"));
    }

    #[test]
    fn sanitize_rejects_traversal() {
        assert!(sanitize("../secret").is_err());
        assert!(sanitize("css/../../secret").is_err());
        assert!(sanitize("/etc/passwd").is_err());
        assert!(sanitize("").is_err());
    }

    #[tokio::test]
    async fn resolve_finds_files_across_roots() {
        let a = tempfile::tempdir().unwrap();
        let b = tempfile::tempdir().unwrap();
        std::fs::write(b.path().join("page.html"), "<html></html>").unwrap();
        let plugin = StaticPlugin {
            roots: vec![a.path().to_path_buf(), b.path().to_path_buf()],
        };
        let (path, body) = plugin.resolve("page.html").await.unwrap();
        assert!(path.starts_with(b.path()));
        assert_eq!(body, b"<html></html>");
        assert!(plugin.resolve("missing.html").await.is_err());
    }

    #[test]
    fn content_types_by_extension() {
        assert_eq!(content_type_for(Path::new("a.html")), "text/html");
        assert_eq!(content_type_for(Path::new("a.css")), "text/css");
        assert_eq!(content_type_for(Path::new("a.gif")), "image/gif");
        assert_eq!(content_type_for(Path::new("a.webp")), "image/webp");
        assert_eq!(content_type_for(Path::new("a.woff2")), "font/woff2");
        assert_eq!(content_type_for(Path::new("a.wasm")), "application/wasm");
        assert_eq!(content_type_for(Path::new("a.qqq")), "application/octet-stream");
    }
}
