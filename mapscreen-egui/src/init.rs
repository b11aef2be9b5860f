//! Startup of the map screen window.

use galileo_egui::EguiMapState;
use mapscreen::{MapScreenController, MapScreenError};
use thiserror::Error;
use tokio::runtime::{Handle, Runtime};

use crate::app::MapScreenApp;
use crate::config::AppConfig;
use crate::input::InteractionTracker;
use crate::location::{provider_for, LocationFeed};
use crate::surface::GalileoSurface;
use crate::tab_bar::TabBar;

const INITIAL_WINDOW_SIZE: [f32; 2] = [480.0, 800.0];

/// Error starting the application.
#[derive(Debug, Error)]
pub enum InitError {
    /// The async runtime could not be created.
    #[error("failed to create async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    /// The configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(#[from] MapScreenError),
    /// eframe failed to create the window or the rendering context.
    #[error("failed to run the window: {0}")]
    Eframe(#[from] eframe::Error),
}

/// Initializes logging. `RUST_LOG` overrides the default `info` level.
pub fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// Runs the map screen window until it is closed.
///
/// Location providers run on a multi-threaded tokio runtime that lives as long as the window.
pub fn run(config: AppConfig) -> Result<(), InitError> {
    config.validate()?;

    let runtime = Runtime::new()?;
    let handle = runtime.handle().clone();
    let _enter = handle.enter();

    std::thread::spawn(move || runtime.block_on(std::future::pending::<()>()));

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(config.title.clone())
            .with_inner_size(INITIAL_WINDOW_SIZE),
        ..Default::default()
    };

    let title = config.title.clone();
    eframe::run_native(&title, native_options, app_creator(config, handle.clone()))?;

    Ok(())
}

fn app_creator(config: AppConfig, runtime: Handle) -> eframe::AppCreator<'static> {
    Box::new(
        move |cc: &eframe::CreationContext<'_>| -> Result<Box<dyn eframe::App>, Box<dyn std::error::Error + Send + Sync>> {
            let ctx = cc.egui_ctx.clone();
            let render_state = cc
                .wgpu_render_state
                .clone()
                .ok_or("wgpu render state is not available")?;

            let interaction = InteractionTracker::default();
            let map = GalileoSurface::create_map(&config.screen);
            let map_state =
                EguiMapState::new(map, ctx.clone(), render_state, [interaction.handler()]);

            let feed = LocationFeed::new(provider_for(&config.location), runtime)
                .with_repaint(ctx.clone());
            let surface = GalileoSurface::new(map_state, ctx, config.catalog()?, feed)
                .with_tile_cache(config.tile_cache.clone())
                .with_icons(config.icons.clone());

            let mut controller =
                MapScreenController::new(surface, TabBar::new(), config.screen.clone());
            controller.initialize()?;

            Ok(Box::new(MapScreenApp::new(controller, interaction)))
        },
    )
}
