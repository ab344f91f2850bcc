//! Loading of assets from disk (native) or over HTTP (web).
//!
//! Every load is attempted exactly once. Failures are returned to the caller,
//! which decides whether the scene can continue without the asset.

use anyhow::Context;

use crate::text::Font;

/// Resolves asset paths against a fixed root and fetches their contents.
#[derive(Clone, Debug)]
pub struct AssetLoader {
    #[cfg(not(target_arch = "wasm32"))]
    root: std::path::PathBuf,
}

impl AssetLoader {
    /// On native targets `root` is a directory. The web build ignores it and
    /// always fetches from `<origin>/assets/`.
    pub fn new(root: &str) -> Self {
        #[cfg(target_arch = "wasm32")]
        let _ = root;
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            root: std::path::PathBuf::from(root),
        }
    }

    #[cfg(target_arch = "wasm32")]
    fn format_url(&self, file_name: &str) -> anyhow::Result<reqwest::Url> {
        let window = web_sys::window().context("no window")?;
        let origin = window
            .location()
            .origin()
            .map_err(|e| anyhow::anyhow!("{:?}", e))?;
        let base = reqwest::Url::parse(&format!("{}/assets/", origin))?;
        Ok(base.join(file_name)?)
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn path(&self, file_name: &str) -> std::path::PathBuf {
        self.root.join(file_name)
    }

    pub async fn load_binary(&self, file_name: &str) -> anyhow::Result<Vec<u8>> {
        #[cfg(target_arch = "wasm32")]
        let data = {
            let url = self.format_url(file_name)?;
            reqwest::get(url)
                .await?
                .error_for_status()?
                .bytes()
                .await?
                .to_vec()
        };
        #[cfg(not(target_arch = "wasm32"))]
        let data = {
            let path = self.path(file_name);
            tokio::fs::read(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?
        };
        Ok(data)
    }

    pub async fn load_string(&self, file_name: &str) -> anyhow::Result<String> {
        #[cfg(target_arch = "wasm32")]
        let txt = {
            let url = self.format_url(file_name)?;
            reqwest::get(url).await?.error_for_status()?.text().await?
        };
        #[cfg(not(target_arch = "wasm32"))]
        let txt = {
            let path = self.path(file_name);
            tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("reading {}", path.display()))?
        };
        Ok(txt)
    }

    pub async fn load_font(&self, file_name: &str) -> anyhow::Result<Font> {
        let json = self.load_string(file_name).await?;
        Font::from_json(&json).with_context(|| format!("parsing font {}", file_name))
    }

    /// Fetch and decode an image. The format is guessed from its contents.
    pub async fn load_image(&self, file_name: &str) -> anyhow::Result<image::DynamicImage> {
        let data = self.load_binary(file_name).await?;
        image::load_from_memory(&data).with_context(|| format!("decoding image {}", file_name))
    }
}
