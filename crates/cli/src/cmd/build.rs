use std::{path::Path, sync::Arc};

use anyhow::{Context, Result, bail};
use argp::FromArgs;
use futures_util::{StreamExt, stream};
use og_image_core::{
    content::load_posts,
    models::{RouteDescriptor, RouteProps},
    paths::static_paths,
    util::og_image_file,
};
use og_image_images::OgRenderer;
use typed_path::Utf8NativePathBuf;

use crate::util::{default_concurrency, load_config, native_path, to_path_buf};

#[derive(FromArgs, PartialEq, Eq, Debug)]
/// Render the preview image of every post into the output directory.
#[argp(subcommand, name = "build")]
pub struct Args {
    #[argp(option, short = 'c', from_str_fn(native_path))]
    /// config file (default: config.yml)
    config: Option<Utf8NativePathBuf>,
    #[argp(option, short = 'o', from_str_fn(native_path))]
    /// output directory (overrides build.out_dir)
    out_dir: Option<Utf8NativePathBuf>,
    #[argp(option, short = 'j')]
    /// number of images rendered at once
    jobs: Option<usize>,
}

pub async fn run(args: Args) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    let posts = load_posts(&config.content)?;
    let routes = static_paths(&posts);
    let renderer = Arc::new(OgRenderer::from_config(&config)?);
    let out_dir = args.out_dir.as_ref().map_or_else(|| config.build.out_dir(), to_path_buf);
    let concurrency =
        args.jobs.or(config.build.concurrency).unwrap_or_else(default_concurrency).max(1);
    build(routes, renderer, &out_dir, concurrency).await
}

/// Render every route, reporting all failures at the end.
pub async fn build(
    routes: Vec<RouteDescriptor>,
    renderer: Arc<OgRenderer>,
    out_dir: &Path,
    concurrency: usize,
) -> Result<()> {
    let total = routes.len();
    tracing::info!(count = total, concurrency, out_dir = %out_dir.display(), "Rendering images");
    let results = stream::iter(routes)
        .map(|route| {
            let renderer = renderer.clone();
            let path = og_image_file(out_dir, &route.params.slug);
            tokio::task::spawn_blocking(move || {
                let result = write_image(&renderer, &route.props, &path);
                (route.params.slug, path, result)
            })
        })
        .buffer_unordered(concurrency)
        .collect::<Vec<_>>()
        .await;

    let mut failed = 0;
    for result in results {
        let (slug, path, result) = result.context("Render task failed")?;
        match result {
            Ok(()) => tracing::debug!(%slug, path = %path.display(), "Wrote image"),
            Err(e) => {
                failed += 1;
                tracing::error!(%slug, "{e:?}");
            }
        }
    }
    if failed > 0 {
        bail!("Failed to render {failed} of {total} images");
    }
    tracing::info!(count = total, "Rendered images");
    Ok(())
}

fn write_image(renderer: &OgRenderer, props: &RouteProps, path: &Path) -> Result<()> {
    let data = renderer.render(props)?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))
}
