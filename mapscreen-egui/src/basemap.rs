//! Catalog of basemap styles available to the [`GalileoSurface`](crate::GalileoSurface).
//!
//! A style is drawn as a stack of raster tile layers, e.g. the hybrid style is satellite imagery
//! with a transparent layer of boundaries and labels on top.

use std::any::Any;
use std::collections::HashMap;
use std::path::Path;

use galileo::error::GalileoError;
use galileo::layer::attribution::Attribution;
use galileo::layer::raster_tile_layer::RasterTileLayerBuilder;
use galileo::layer::{Layer, RasterTileLayer};
use galileo::render::Canvas;
use galileo::tile_schema::TileIndex;
use galileo::{MapView, Messenger, TileSchema};
use mapscreen::{MapScreenError, StyleUri};
use serde::{Deserialize, Serialize};

const OSM_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_ATTRIBUTION: &str = "© OpenStreetMap contributors";
const OSM_ATTRIBUTION_URL: &str = "https://www.openstreetmap.org/copyright";

const ESRI_IMAGERY_URL: &str =
    "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{z}/{y}/{x}";
const ESRI_LABELS_URL: &str = "https://server.arcgisonline.com/ArcGIS/rest/services/Reference/World_Boundaries_and_Places/MapServer/tile/{z}/{y}/{x}";
const ESRI_ATTRIBUTION: &str = "Tiles © Esri";
const ESRI_ATTRIBUTION_URL: &str = "https://www.esri.com";

/// A raster tile source given by a URL template with `{z}`, `{x}` and `{y}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileSource {
    url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attribution: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    attribution_url: Option<String>,
}

impl TileSource {
    /// Creates a source from a URL template.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            attribution: None,
            attribution_url: None,
        }
    }

    /// Sets the attribution shown on the map while the source is visible.
    pub fn with_attribution(mut self, text: impl Into<String>, url: Option<String>) -> Self {
        self.attribution = Some(text.into());
        self.attribution_url = url;
        self
    }

    /// URL template.
    pub fn url_template(&self) -> &str {
        &self.url
    }

    /// Attribution of the source. A link is only given if the source has an attribution URL.
    pub fn attribution(&self) -> Option<Attribution> {
        Some(Attribution::new(
            self.attribution.clone()?,
            self.attribution_url.clone(),
        ))
    }

    /// Returns true if the template has all three tile index placeholders.
    pub fn is_valid_template(&self) -> bool {
        ["{z}", "{x}", "{y}"]
            .iter()
            .all(|placeholder| self.url.contains(placeholder))
    }

    /// URL of the tile with the given index.
    pub fn tile_url(&self, z: u32, x: i32, y: i32) -> String {
        self.url
            .replace("{z}", &z.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

/// One catalog entry as it appears in the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasemapEntry {
    /// Style the entry defines.
    pub uri: StyleUri,
    /// Tile sources from bottom to top.
    pub layers: Vec<TileSource>,
}

/// Maps style identifiers to the tile sources drawing them.
#[derive(Debug, Clone)]
pub struct BasemapCatalog {
    entries: HashMap<StyleUri, Vec<TileSource>>,
}

impl Default for BasemapCatalog {
    fn default() -> Self {
        let osm = TileSource::new(OSM_URL)
            .with_attribution(OSM_ATTRIBUTION, Some(OSM_ATTRIBUTION_URL.to_owned()));
        let imagery = TileSource::new(ESRI_IMAGERY_URL)
            .with_attribution(ESRI_ATTRIBUTION, Some(ESRI_ATTRIBUTION_URL.to_owned()));
        let labels = TileSource::new(ESRI_LABELS_URL);

        let mut entries = HashMap::new();
        entries.insert(StyleUri::new(StyleUri::STREETS), vec![osm]);
        entries.insert(StyleUri::new(StyleUri::SATELLITE), vec![imagery.clone()]);
        entries.insert(StyleUri::new(StyleUri::HYBRID), vec![imagery, labels]);

        Self { entries }
    }
}

impl BasemapCatalog {
    /// Adds or replaces a style.
    pub fn insert(&mut self, entry: BasemapEntry) -> Result<(), MapScreenError> {
        if entry.layers.is_empty() {
            return Err(MapScreenError::Config(format!(
                "basemap {} has no layers",
                entry.uri
            )));
        }

        if let Some(source) = entry.layers.iter().find(|s| !s.is_valid_template()) {
            return Err(MapScreenError::Config(format!(
                "basemap {} has invalid tile url {}",
                entry.uri,
                source.url_template()
            )));
        }

        self.entries.insert(entry.uri, entry.layers);
        Ok(())
    }

    /// Tile sources of the style.
    ///
    /// Besides catalog entries, an `http(s)` URL template is accepted as a style of its own.
    pub fn resolve(&self, uri: &StyleUri) -> Result<Vec<TileSource>, MapScreenError> {
        if let Some(sources) = self.entries.get(uri) {
            return Ok(sources.clone());
        }

        let source = TileSource::new(uri.as_str());
        let is_url = uri.as_str().starts_with("https://") || uri.as_str().starts_with("http://");
        if is_url && source.is_valid_template() {
            return Ok(vec![source]);
        }

        Err(MapScreenError::StyleLoad {
            uri: uri.clone(),
            reason: "style is not in the basemap catalog".into(),
        })
    }

    /// Returns true if the style is in the catalog.
    pub fn contains(&self, uri: &StyleUri) -> bool {
        self.entries.contains_key(uri)
    }
}

/// Raster tile layer drawing one [`TileSource`].
pub struct BasemapLayer {
    tiles: RasterTileLayer,
    attribution: Option<Attribution>,
}

impl BasemapLayer {
    /// Builds the layer for the source.
    ///
    /// Tiles are loaded in the background, and `messenger` is notified every time a tile is ready
    /// to be drawn. With `tile_cache` set, downloaded tiles are stored in that directory.
    pub fn build(
        source: &TileSource,
        tile_cache: Option<&Path>,
        messenger: impl Messenger + 'static,
    ) -> Result<Self, GalileoError> {
        let template = source.clone();
        let mut builder = RasterTileLayerBuilder::new_rest(move |index: &TileIndex| {
            template.tile_url(index.z, index.x, index.y)
        })
        .with_messenger(messenger);

        if let Some(cache) = tile_cache {
            builder = builder.with_file_cache_checked(cache);
        }

        Ok(Self {
            tiles: builder.build()?,
            attribution: source.attribution(),
        })
    }
}

impl Layer for BasemapLayer {
    fn render(&self, view: &MapView, canvas: &mut dyn Canvas) {
        self.tiles.render(view, canvas);
    }

    fn prepare(&self, view: &MapView) {
        self.tiles.prepare(view);
    }

    fn set_messenger(&mut self, messenger: Box<dyn Messenger>) {
        self.tiles.set_messenger(messenger);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn tile_schema(&self) -> Option<TileSchema> {
        Layer::tile_schema(&self.tiles)
    }

    fn attribution(&self) -> Option<Attribution> {
        self.attribution.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use assert_matches::assert_matches;
    use galileo_types::cartesian::Size;
    use galileo_types::latlon;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    // 1x1 transparent PNG.
    const TILE: &[u8] = &[
        0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
        0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0xf8,
        0xcf, 0xc0, 0xf0, 0x1f, 0x00, 0x05, 0x00, 0x01, 0xff, 0x89, 0x99, 0x3d, 0x1d, 0x00, 0x00,
        0x00, 0x00, 0x49, 0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
    ];

    #[derive(Clone, Default)]
    struct CountingMessenger(Arc<AtomicUsize>);

    impl Messenger for CountingMessenger {
        fn request_redraw(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    async fn serve_tiles() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                tokio::spawn(async move {
                    let mut request = vec![0; 4096];
                    let _ = stream.read(&mut request).await;

                    let header = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: image/png\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        TILE.len()
                    );
                    let _ = stream.write_all(header.as_bytes()).await;
                    let _ = stream.write_all(TILE).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        format!("http://{address}/{{z}}/{{x}}/{{y}}.png")
    }

    #[test]
    fn default_catalog_has_all_default_styles() {
        let catalog = BasemapCatalog::default();

        for uri in [StyleUri::STREETS, StyleUri::SATELLITE, StyleUri::HYBRID] {
            assert!(catalog.contains(&uri.into()), "{uri} is missing");
        }

        let hybrid = catalog.resolve(&StyleUri::HYBRID.into()).unwrap();
        assert_eq!(hybrid.len(), 2);
        assert!(hybrid.iter().all(TileSource::is_valid_template));
    }

    #[test]
    fn url_templates_are_styles() {
        let catalog = BasemapCatalog::default();
        let uri = StyleUri::new("https://tiles.example.com/{z}/{x}/{y}.png");

        let sources = catalog.resolve(&uri).unwrap();
        assert_eq!(sources[0].tile_url(3, 4, 5), "https://tiles.example.com/3/4/5.png");
    }

    #[test]
    fn unknown_styles_fail_to_resolve() {
        let catalog = BasemapCatalog::default();

        assert_matches!(
            catalog.resolve(&"mapscreen://styles/moon".into()),
            Err(MapScreenError::StyleLoad { .. })
        );
        assert_matches!(
            catalog.resolve(&"https://tiles.example.com/tile.png".into()),
            Err(MapScreenError::StyleLoad { .. })
        );
    }

    #[test]
    fn esri_templates_put_row_before_column() {
        let source = TileSource::new(ESRI_IMAGERY_URL);
        assert!(source.tile_url(7, 10, 20).ends_with("/tile/7/20/10"));
    }

    #[test]
    fn attribution_links_only_when_url_is_set() {
        let linked = TileSource::new(OSM_URL)
            .with_attribution("OSM", Some("https://osm.org".into()))
            .attribution()
            .unwrap();
        assert_eq!(linked.get_text(), "OSM");
        assert_eq!(linked.get_url(), Some("https://osm.org"));

        let plain = TileSource::new(OSM_URL)
            .with_attribution("Local tiles", None)
            .attribution()
            .unwrap();
        assert_eq!(plain.get_url(), None);

        assert!(TileSource::new(OSM_URL).attribution().is_none());
    }

    #[test]
    fn text_only_attribution_is_read_from_config() {
        let json = r#"{"url": "https://t.example.com/{z}/{x}/{y}.png", "attribution": "Example"}"#;
        let source: TileSource = serde_json::from_str(json).unwrap();
        let layer = BasemapLayer::build(&source, None, CountingMessenger::default()).unwrap();

        let attribution = Layer::attribution(&layer).unwrap();
        assert_eq!(attribution.get_text(), "Example");
        assert_eq!(attribution.get_url(), None);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn loaded_tiles_notify_the_messenger() {
        let source = TileSource::new(serve_tiles().await);
        let messenger = CountingMessenger::default();
        let layer = BasemapLayer::build(&source, None, messenger.clone()).unwrap();

        let view = MapView::new(&latlon!(0.0, 0.0), 156543.03392800014)
            .with_size(Size::new(256.0, 256.0));
        layer.tiles.load_tiles(&view).await;

        assert!(messenger.0.load(Ordering::SeqCst) > 0);
    }

    #[test]
    fn insert_validates_entries() {
        let mut catalog = BasemapCatalog::default();

        assert_matches!(
            catalog.insert(BasemapEntry {
                uri: "custom://empty".into(),
                layers: vec![],
            }),
            Err(MapScreenError::Config(_))
        );
        assert_matches!(
            catalog.insert(BasemapEntry {
                uri: "custom://bad".into(),
                layers: vec![TileSource::new("https://example.com/{z}.png")],
            }),
            Err(MapScreenError::Config(_))
        );

        catalog
            .insert(BasemapEntry {
                uri: "custom://topo".into(),
                layers: vec![TileSource::new("https://topo.example.com/{z}/{x}/{y}.png")],
            })
            .unwrap();
        assert!(catalog.contains(&"custom://topo".into()));
    }
}
