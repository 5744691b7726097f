use std::borrow::Cow;

use rust_embed::RustEmbed;

/// Embed the entire `assets/` directory into the binary.
#[derive(RustEmbed)]
#[folder = "assets"]
struct EmbeddedAssets;

/// Raw bytes of an embedded asset. Accepts `catalog/x.json`,
/// `/catalog/x.json` and `assets/catalog/x.json`.
pub fn load(path: &str) -> Option<Cow<'static, [u8]>> {
    EmbeddedAssets::get(&canonical_asset_path(path)).map(|file| file.data)
}

/// Names of embedded files under `dir`, sorted.
pub fn list(dir: &str) -> Vec<String> {
    let prefix = format!("{}/", canonical_asset_path(dir).trim_end_matches('/'));
    let mut names: Vec<String> = EmbeddedAssets::iter()
        .filter(|name| name.starts_with(&prefix))
        .map(|name| name.into_owned())
        .collect();
    names.sort();
    names
}

fn canonical_asset_path(path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    if let Some(rest) = trimmed.strip_prefix("assets/") {
        rest.to_string()
    } else {
        trimmed.to_string()
    }
}
