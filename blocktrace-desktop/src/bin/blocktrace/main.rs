//! Binary for rendering blocktrace scene files to images.

// Crate-specific lint settings. (General settings can be found in the workspace manifest.)
#![forbid(unsafe_code)]

use std::time::Instant;

use anyhow::Context as _;
use clap::Parser as _;

use blocktrace::camera::CanvasConfig;
use blocktrace::render::Renderer;
use blocktrace_desktop::logging;
use blocktrace_desktop::scene_file::{LoadedScene, SceneFile};
use blocktrace_desktop::write_png::write_png;

mod command_options;
use command_options::{BlocktraceArgs, ImageSizeArg};

static TITLE: &str = "blocktrace";

fn main() -> Result<(), anyhow::Error> {
    // Destructure as a check that we're using/skipping all the args
    let BlocktraceArgs {
        scene_file: scene_path,
        output_file,
        passes,
        size,
        preview,
        exposure,
        logging: logging_args,
        settings: settings_args,
    } = BlocktraceArgs::parse();

    logging::install(&logging_args)?;

    let settings = settings_args.build_settings()?;

    let start_load_time = Instant::now();
    let LoadedScene {
        scene,
        camera,
        canvas,
        ..
    } = SceneFile::read(&scene_path)?
        .build()
        .with_context(|| format!("invalid scene file {}", scene_path.display()))?;
    log::debug!(
        "Loaded scene ({:.3} s)",
        start_load_time.elapsed().as_secs_f32()
    );

    let canvas = match size {
        Some(ImageSizeArg([width, height])) => CanvasConfig::new(width, height),
        None => canvas,
    };
    let mut renderer = Renderer::new(scene, settings, camera, canvas);

    let image = if preview {
        renderer.preview_image()
    } else {
        let progress_bar = logging::new_progress_bar(u64::from(passes), "Tracing");
        let start_render_time = Instant::now();
        let info = renderer.render(passes, |done| {
            progress_bar.set_position(u64::from(done));
            true
        });
        progress_bar.set_position(u64::from(renderer.passes()));
        progress_bar.finish();
        log::info!(
            "Rendered {passes} passes in {elapsed:.3} s: {info}",
            passes = renderer.passes(),
            elapsed = start_render_time.elapsed().as_secs_f32(),
        );
        renderer.image(exposure)
    };

    write_png(&output_file, image.as_ref())
        .with_context(|| format!("failed to write {}", output_file.display()))?;
    log::info!("Wrote {}", output_file.display());
    Ok(())
}
