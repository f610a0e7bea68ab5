//! `viewpipe open`: spawn windows, configure them once ready, wait for close.

use tokio::task::JoinSet;
use tracing::{info, warn};
use viewpipe_common::WindowError;
use viewpipe_config::{ViewpipeConfig, WindowDefaults};
use viewpipe_window::{Window, WindowOptions};

/// Host function exposed to every page.
pub const LOG_BINDING: &str = "viewpipe_log";

pub async fn run(config: &ViewpipeConfig, args: &crate::cli::OpenArgs) -> viewpipe_common::Result<()> {
    let settings = args.window_settings(&config.window);
    let mut options = WindowOptions::from(config);
    if args.verbose {
        options = options.verbose();
    }

    let mut windows = Vec::with_capacity(args.windows);
    for _ in 0..args.windows.max(1) {
        match Window::spawn(&options) {
            Ok(window) => windows.push(window),
            Err(e) => {
                windows.iter().for_each(Window::destroy);
                return Err(e.into());
            }
        }
    }
    info!(count = windows.len(), "windows spawned");

    let mut open = JoinSet::new();
    for window in &windows {
        watch_pages(window);
        let driver = window.clone();
        let settings = settings.clone();
        tokio::spawn(async move {
            if let Err(e) = configure(&driver, &settings).await {
                warn!(window = %driver.id().short(), error = %e, "window setup failed");
            }
        });
        let closing = window.clone();
        open.spawn(async move {
            closing.closed().await;
            closing.id().clone()
        });
    }

    loop {
        tokio::select! {
            next = open.join_next() => match next {
                Some(Ok(id)) => info!(window = %id.short(), remaining = open.len(), "window closed"),
                Some(Err(e)) => warn!(error = %e, "close watcher failed"),
                None => break,
            },
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    warn!(error = %e, "ctrl-c handler failed");
                }
                info!("interrupted, closing windows");
                windows.iter().for_each(Window::destroy);
                break;
            }
        }
    }
    Ok(())
}

/// Apply the initial settings once the native side is ready.
async fn configure(window: &Window, settings: &WindowDefaults) -> Result<(), WindowError> {
    window.ready().await?;

    window.set_title(settings.title.as_str())?;
    match window.set_size(settings.width, settings.height, settings.size_hint) {
        Err(WindowError::UnsupportedOption(reason)) => {
            warn!(window = %window.id().short(), %reason, "size hint ignored");
            window.set_size(settings.width, settings.height, Default::default())?;
        }
        other => other?,
    }

    let id = window.id().clone();
    window.bind(LOG_BINDING, move |args| {
        info!(window = %id.short(), args = %serde_json::Value::Array(args.to_vec()), "page log");
    })?;

    if let Some(url) = &settings.url {
        window.navigate(url.as_str())?;
    }
    Ok(())
}

fn watch_pages(window: &Window) {
    let id = window.id().clone();
    window.on_navigate(move |page| info!(window = %id.short(), url = %page.url, "navigating"));
    let id = window.id().clone();
    window.on_load(move |page| info!(window = %id.short(), url = %page.url, "loaded"));
}
