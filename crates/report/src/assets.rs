//! Tiered font asset loading
//!
//! Sources are tried in order (bundled, relative, absolute). The first tier
//! that yields the regular face wins; the caller decides what to do when every
//! tier fails.

use crate::{ReportConfig, ReportError, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where a font came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetTier {
    /// Bytes handed to the engine directly
    Bundled,
    /// Fetched relative to the application's serving path
    Relative,
    /// Fetched from a directory next to the running executable
    Absolute,
    /// Standard PDF serif font, nothing loaded
    BuiltIn,
}

/// A provider of font files for one tier
pub trait AssetSource: Send + Sync {
    fn tier(&self) -> AssetTier;

    /// Fetch a file by name
    fn fetch(&self, name: &str) -> Result<Vec<u8>>;
}

/// Files held in memory, keyed by file name
#[derive(Debug, Clone, Default)]
pub struct BundledAssets {
    files: HashMap<String, Vec<u8>>,
}

impl BundledAssets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, data: Vec<u8>) {
        self.files.insert(name.to_string(), data);
    }

    pub fn with_file(mut self, name: &str, data: Vec<u8>) -> Self {
        self.insert(name, data);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl AssetSource for BundledAssets {
    fn tier(&self) -> AssetTier {
        AssetTier::Bundled
    }

    fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        self.files
            .get(name)
            .cloned()
            .ok_or_else(|| ReportError::AssetNotFound(format!("bundled:{name}")))
    }
}

/// Files under `root/serving_path`
#[derive(Debug, Clone)]
pub struct RelativeAssets {
    root: PathBuf,
    serving_path: String,
}

impl RelativeAssets {
    pub fn new(root: impl Into<PathBuf>, serving_path: &str) -> Self {
        Self {
            root: root.into(),
            serving_path: serving_path.trim_matches('/').to_string(),
        }
    }

    fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(&self.serving_path).join(name)
    }
}

impl AssetSource for RelativeAssets {
    fn tier(&self) -> AssetTier {
        AssetTier::Relative
    }

    fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        read_file(&self.path_of(name))
    }
}

/// Files in a fixed directory, usually derived from the executable location
#[derive(Debug, Clone)]
pub struct AbsoluteAssets {
    dir: PathBuf,
}

impl AbsoluteAssets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `asset_dir` beside the running executable
    pub fn beside_executable(asset_dir: &str) -> Result<Self> {
        let exe = std::env::current_exe()?;
        let base = exe
            .parent()
            .ok_or_else(|| ReportError::AssetNotFound(exe.display().to_string()))?;
        Ok(Self::new(base.join(asset_dir)))
    }
}

impl AssetSource for AbsoluteAssets {
    fn tier(&self) -> AssetTier {
        AssetTier::Absolute
    }

    fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        read_file(&self.dir.join(name))
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .map_err(|e| ReportError::AssetNotFound(format!("{}: {e}", path.display())))
}

/// Font files to load together
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontRequest {
    pub regular: String,
    pub bold: Option<String>,
}

impl FontRequest {
    pub fn new(regular: &str, bold: Option<&str>) -> Self {
        Self {
            regular: regular.to_string(),
            bold: bold.map(str::to_string),
        }
    }
}

impl From<&crate::FontFiles> for FontRequest {
    fn from(files: &crate::FontFiles) -> Self {
        Self::new(&files.regular, files.bold.as_deref())
    }
}

/// Outcome of loading a font
#[derive(Debug, Clone, PartialEq)]
pub enum FontLoad {
    Loaded {
        tier: AssetTier,
        regular: Vec<u8>,
        bold: Option<Vec<u8>>,
    },
    AllFailed,
}

impl FontLoad {
    pub fn tier(&self) -> Option<AssetTier> {
        match self {
            FontLoad::Loaded { tier, .. } => Some(*tier),
            FontLoad::AllFailed => None,
        }
    }
}

/// Ordered list of asset sources
#[derive(Default)]
pub struct AssetLoader {
    sources: Vec<Box<dyn AssetSource>>,
}

impl AssetLoader {
    /// Loader with no sources; every load fails over to built-in fonts
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: Box<dyn AssetSource>) -> Self {
        self.sources.push(source);
        self
    }

    /// Relative then absolute tiers for a native application rooted at `root`
    pub fn standard(config: &ReportConfig, root: impl Into<PathBuf>) -> Self {
        let mut loader = Self::new().with_source(Box::new(RelativeAssets::new(
            root,
            &config.asset_dir,
        )));
        match AbsoluteAssets::beside_executable(&config.asset_dir) {
            Ok(absolute) => loader = loader.with_source(Box::new(absolute)),
            Err(e) => log::debug!("no executable-relative asset tier: {e}"),
        }
        loader
    }

    pub fn tiers(&self) -> Vec<AssetTier> {
        self.sources.iter().map(|s| s.tier()).collect()
    }

    /// Try each source in order until the regular face loads
    ///
    /// A missing bold face does not fail a tier; bold text then uses the
    /// regular face.
    pub fn load(&self, request: &FontRequest) -> FontLoad {
        for source in &self.sources {
            let (regular, bold) = fetch_pair(source.as_ref(), request);
            match regular {
                Ok(regular) => {
                    let bold = match bold {
                        Some(Ok(bold)) => Some(bold),
                        Some(Err(e)) => {
                            log::warn!("bold face unavailable from {:?} tier: {e}", source.tier());
                            None
                        }
                        None => None,
                    };
                    log::info!("loaded {} from {:?} tier", request.regular, source.tier());
                    return FontLoad::Loaded {
                        tier: source.tier(),
                        regular,
                        bold,
                    };
                }
                Err(e) => log::debug!("{:?} tier failed for {}: {e}", source.tier(), request.regular),
            }
        }
        log::warn!("could not load {} from any tier", request.regular);
        FontLoad::AllFailed
    }
}

/// Fetch regular and bold from one source, in parallel where threads exist
#[cfg(not(target_arch = "wasm32"))]
fn fetch_pair(
    source: &dyn AssetSource,
    request: &FontRequest,
) -> (Result<Vec<u8>>, Option<Result<Vec<u8>>>) {
    std::thread::scope(|scope| {
        let bold = request
            .bold
            .as_deref()
            .map(|name| scope.spawn(move || source.fetch(name)));
        let regular = source.fetch(&request.regular);
        let bold = bold.map(|handle| {
            handle.join().unwrap_or_else(|_| {
                Err(ReportError::AssetNotFound(format!(
                    "fetch of {} panicked",
                    request.bold.as_deref().unwrap_or_default()
                )))
            })
        });
        (regular, bold)
    })
}

#[cfg(target_arch = "wasm32")]
fn fetch_pair(
    source: &dyn AssetSource,
    request: &FontRequest,
) -> (Result<Vec<u8>>, Option<Result<Vec<u8>>>) {
    let regular = source.fetch(&request.regular);
    let bold = request.bold.as_deref().map(|name| source.fetch(name));
    (regular, bold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        tier: AssetTier,
        files: BundledAssets,
        fetches: Arc<AtomicUsize>,
    }

    impl AssetSource for CountingSource {
        fn tier(&self) -> AssetTier {
            self.tier
        }

        fn fetch(&self, name: &str) -> Result<Vec<u8>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.files.fetch(name)
        }
    }

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "report-assets-{tag}-{}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_bundled_tier_wins() {
        let loader = AssetLoader::new().with_source(Box::new(
            BundledAssets::new()
                .with_file("a.ttf", vec![1])
                .with_file("a-bold.ttf", vec![2]),
        ));
        let load = loader.load(&FontRequest::new("a.ttf", Some("a-bold.ttf")));
        assert_eq!(
            load,
            FontLoad::Loaded {
                tier: AssetTier::Bundled,
                regular: vec![1],
                bold: Some(vec![2]),
            }
        );
    }

    #[test]
    fn test_falls_through_tiers_in_order() {
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));
        let loader = AssetLoader::new()
            .with_source(Box::new(CountingSource {
                tier: AssetTier::Bundled,
                files: BundledAssets::new(),
                fetches: Arc::clone(&first),
            }))
            .with_source(Box::new(CountingSource {
                tier: AssetTier::Relative,
                files: BundledAssets::new().with_file("a.ttf", vec![7]),
                fetches: Arc::clone(&second),
            }));

        let load = loader.load(&FontRequest::new("a.ttf", Some("missing-bold.ttf")));
        assert_eq!(load.tier(), Some(AssetTier::Relative));
        assert!(matches!(load, FontLoad::Loaded { bold: None, .. }));
        // regular and bold are both attempted in each tier
        assert_eq!(first.load(Ordering::SeqCst), 2);
        assert_eq!(second.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_all_failed() {
        let loader = AssetLoader::new().with_source(Box::new(BundledAssets::new()));
        assert_eq!(
            loader.load(&FontRequest::new("none.ttf", None)),
            FontLoad::AllFailed
        );
        assert_eq!(
            AssetLoader::new().load(&FontRequest::new("none.ttf", None)),
            FontLoad::AllFailed
        );
    }

    #[test]
    fn test_relative_assets_read_from_serving_path() {
        let root = temp_dir("relative");
        let fonts = root.join("assets").join("fonts");
        std::fs::create_dir_all(&fonts).unwrap();
        std::fs::write(fonts.join("x.ttf"), [9, 9]).unwrap();

        let source = RelativeAssets::new(&root, "/assets/fonts/");
        assert_eq!(source.fetch("x.ttf").unwrap(), vec![9, 9]);
        assert!(matches!(
            source.fetch("y.ttf"),
            Err(ReportError::AssetNotFound(_))
        ));
    }

    #[test]
    fn test_absolute_assets() {
        let dir = temp_dir("absolute");
        std::fs::write(dir.join("z.ttf"), [4]).unwrap();
        let source = AbsoluteAssets::new(&dir);
        assert_eq!(source.tier(), AssetTier::Absolute);
        assert_eq!(source.fetch("z.ttf").unwrap(), vec![4]);
    }

    #[test]
    fn test_standard_loader_tiers() {
        let loader = AssetLoader::standard(&ReportConfig::default(), ".");
        assert_eq!(loader.tiers()[0], AssetTier::Relative);
    }
}
