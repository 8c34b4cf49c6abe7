//! Bonfire Flame entry point
//!
//! On the web: binds a flame engine to `#flame-canvas`, reads its inputs from
//! the canvas `data-*` attributes and drives it with `requestAnimationFrame`.
//! Natively: a headless runner that reports population statistics.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(not(target_arch = "wasm32"))]
mod cli;
#[cfg(not(target_arch = "wasm32"))]
mod headless;

#[cfg(target_arch = "wasm32")]
mod web_flame {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;
    use web_sys::{HtmlCanvasElement, MutationObserver, MutationObserverInit, VisibilityState};

    use bonfire_flame::platform::web::FrameHandler;
    use bonfire_flame::platform::{RafScheduler, backing_size, prefers_reduced_motion};
    use bonfire_flame::renderer::GlowRenderState;
    use bonfire_flame::sim::FlameInputs;
    use bonfire_flame::{FlameEngine, FrameHandle, RenderError, Settings};

    type WebEngine = FlameEngine<GlowRenderState, RafScheduler>;

    const CANVAS_ID: &str = "flame-canvas";

    /// Session inputs published by the host on the canvas element
    fn read_inputs(canvas: &HtmlCanvasElement) -> FlameInputs {
        let level = canvas.get_attribute("data-level");
        let phase = canvas.get_attribute("data-phase");
        let breathing = canvas.get_attribute("data-breathing");
        let covenant = canvas.get_attribute("data-covenant");
        FlameInputs::from_tags(
            level.as_deref(),
            phase.as_deref(),
            breathing.as_deref(),
            covenant.as_deref(),
        )
    }

    pub async fn run() -> Result<(), RenderError> {
        let window = web_sys::window()
            .ok_or_else(|| RenderError::SurfaceUnavailable("no window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| RenderError::SurfaceUnavailable("no document".into()))?;

        // Host not ready: nothing to draw on, nothing to do
        let Some(canvas) = document
            .get_element_by_id(CANVAS_ID)
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::debug!("No #{} canvas, flame not started", CANVAS_ID);
            return Ok(());
        };

        let mut settings = Settings::load();
        if prefers_reduced_motion() {
            settings.reduced_motion = true;
        }

        // Backing store at device resolution, drawing in logical px
        let (logical_w, logical_h) = settings.surface_size();
        let (width, height) = backing_size((logical_w, logical_h), window.device_pixel_ratio());
        canvas.set_width(width);
        canvas.set_height(height);

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| RenderError::SurfaceUnavailable(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|_| RenderError::AdapterUnavailable)?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let render_state =
            GlowRenderState::new(surface, &adapter, width, height, (logical_w, logical_h)).await?;

        let scheduler = RafScheduler::new(window.clone());
        let slot = scheduler.handler_slot();
        let inputs = read_inputs(&canvas);
        let engine: Rc<RefCell<WebEngine>> = Rc::new(RefCell::new(FlameEngine::new(
            inputs,
            settings,
            scheduler,
            Some(render_state),
        )));

        {
            let engine = engine.clone();
            let handler: FrameHandler = Rc::new(move |handle: FrameHandle, timestamp: f64| {
                engine.borrow_mut().on_frame(handle, timestamp);
            });
            *slot.borrow_mut() = Some(handler);
        }

        watch_inputs(&canvas, engine.clone());
        watch_visibility(&document, engine.clone());
        watch_resize(&window, &canvas, (logical_w, logical_h), engine.clone());

        engine.borrow_mut().start();
        Ok(())
    }

    /// Re-read inputs whenever the host rewrites the canvas attributes
    fn watch_inputs(canvas: &HtmlCanvasElement, engine: Rc<RefCell<WebEngine>>) {
        let target = canvas.clone();
        let closure = Closure::<dyn FnMut()>::new(move || {
            let inputs = read_inputs(&target);
            engine.borrow_mut().set_inputs(inputs);
        });

        let observer = match MutationObserver::new(closure.as_ref().unchecked_ref()) {
            Ok(observer) => observer,
            Err(e) => {
                log::warn!("Input observer unavailable: {:?}", e);
                return;
            }
        };
        let options = MutationObserverInit::new();
        options.set_attributes(true);
        if let Err(e) = observer.observe_with_options(canvas, &options) {
            log::warn!("Failed to observe canvas inputs: {:?}", e);
            return;
        }
        closure.forget();
    }

    /// Keep the backing store at device resolution when the pixel ratio changes
    fn watch_resize(
        window: &web_sys::Window,
        canvas: &HtmlCanvasElement,
        logical: (f32, f32),
        engine: Rc<RefCell<WebEngine>>,
    ) {
        let win = window.clone();
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let (width, height) = backing_size(logical, win.device_pixel_ratio());
            if canvas.width() == width && canvas.height() == height {
                return;
            }
            canvas.set_width(width);
            canvas.set_height(height);
            if let Some(surface) = engine.borrow_mut().surface_mut() {
                surface.resize(width, height);
            }
            log::debug!("Flame canvas resized to {}x{}", width, height);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// A hidden flame is torn down; it starts fresh when shown again
    fn watch_visibility(document: &web_sys::Document, engine: Rc<RefCell<WebEngine>>) {
        let doc = document.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let mut engine = engine.borrow_mut();
            if doc.visibility_state() == VisibilityState::Hidden {
                engine.stop();
            } else {
                engine.start();
            }
        });
        let _ = document
            .add_event_listener_with_callback("visibilitychange", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    log::info!("Bonfire flame starting...");
    if let Err(e) = web_flame::run().await {
        log::error!("Flame failed to start: {}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = cli::Cli::parse();
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    headless::run(&cli)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
