//! Trayify: hide X11 windows into their own system tray entries.

mod app;
mod app_command;
mod config;
mod error;
mod icons;
mod signal_handler;
mod tray_command;
mod tray_handle;
mod tray_manager;
mod window_icon;
mod x11_controller;

pub(crate) use {
    app::App,
    app_command::AppCommand,
    error::{AppError, Result as AppResult},
    icons::IconImage,
    signal_handler::SignalHandler,
    tray_command::TrayCommand,
    tray_handle::TrayHandle,
    tray_manager::TrayManager,
    x11_controller::X11WindowController,
};

use crate::config::Config;

use std::sync::Arc;

use tao::{
    event::{Event, StartCause},
    event_loop::{ControlFlow, EventLoopBuilder},
};
use tokio::sync::{mpsc, watch};
use tracing::error;
use tracing_subscriber::EnvFilter;
use trayify_core::EntryRegistry;

const DEFAULT_LOG_FILTER: &str = "trayify=debug,trayify_core=debug";

/// Application entry point.
fn main() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            error!("Failed to load config: {:?}", e);
            std::process::exit(1);
        }
    };

    let main_icon = match IconImage::main_icon(&config.tray) {
        Ok(icon) => icon,
        Err(e) => {
            error!("Failed to load main icon: {:?}", e);
            std::process::exit(1);
        }
    };

    let event_loop = EventLoopBuilder::<TrayCommand>::with_user_event().build();
    let tray_proxy = event_loop.create_proxy();

    // TrayManager lives on the main thread - TrayIcon is !Send on all platforms.
    let mut tray_manager = match TrayManager::new(main_icon) {
        Ok(tm) => tm,
        Err(e) => {
            error!("Failed to create TrayManager: {:?}", e);
            std::process::exit(1);
        }
    };

    // Consumed once the loop reports Init.
    let mut startup = Some(config);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::UserEvent(TrayCommand::Shutdown) => {
                *control_flow = ControlFlow::ExitWithCode(0);
            }
            Event::UserEvent(cmd) => tray_manager.apply(cmd),
            Event::NewEvents(StartCause::Init) => {
                let Some(config) = startup.take() else {
                    return;
                };

                let host = Arc::new(TrayHandle::new(
                    tray_proxy.clone(),
                    config.tray.default_icon_path.clone(),
                ));
                let controller = Arc::new(X11WindowController::new(config.behaviour.confirm_kill));
                let registry = Arc::new(EntryRegistry::new(
                    controller,
                    host,
                    config.registry_options(),
                ));

                let (command_tx, command_rx) = mpsc::channel(32);
                let (shutdown_tx, shutdown_rx) = watch::channel(false);
                let tray_proxy = tray_proxy.clone();

                // Spawn tokio runtime on separate thread.
                // TrayManager stays on the main thread.
                std::thread::spawn(move || {
                    let rt = match tokio::runtime::Runtime::new() {
                        Ok(rt) => rt,
                        Err(e) => {
                            error!("Failed to create tokio runtime: {:?}", e);
                            std::process::exit(1);
                        }
                    };

                    rt.block_on(async {
                        let signal_handler = SignalHandler::new(command_tx);

                        let app = App {
                            registry,
                            tray_proxy,
                            command_rx,
                            shutdown_tx,
                        };

                        tokio::join!(
                            async {
                                if let Err(e) = signal_handler.run(shutdown_rx).await {
                                    error!(error = ?e, "Signal handler error");
                                }
                            },
                            async {
                                if let Err(e) = app.run().await {
                                    error!(error = ?e, "App error");
                                }
                            }
                        );
                    });
                });
            }
            _ => {}
        }
    });
}
