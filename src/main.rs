mod cli;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use ricochet_animation::{
    start_ricochet, Hook, Hooks, RicochetParams, SessionSnapshot, SimulatedElement, SimulatedHost,
    Visibility,
};
use ricochet_utils::{Edge, HitCounts, HookError, Rect, RicochetOptions};

use crate::cli::CliArgs;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CliArgs::parse();
    let options = resolve_options(&args)?;
    let report = run(&args, options)?;

    println!("frames:   {}", report.frames);
    let per_edge: Vec<String> = Edge::ALL
        .iter()
        .map(|edge| format!("{} {}", edge, report.hits.get(*edge)))
        .collect();
    println!(
        "hits:     {} ({})",
        report.hits.total(),
        per_edge.join(", ")
    );
    println!(
        "offsets:  x={:.2} y={:.2}",
        report.snapshot.horizontal.offset, report.snapshot.vertical.offset
    );
    println!("state:    {}", report.snapshot.state);
    Ok(())
}

/// Config file first, then command-line overrides
fn resolve_options(args: &CliArgs) -> Result<RicochetOptions> {
    let mut options = match &args.config {
        Some(path) => RicochetOptions::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => RicochetOptions::default(),
    };

    if let Some(speed) = args.horizontal_speed {
        options.horizontal_speed = speed;
    }
    if let Some(speed) = args.vertical_speed {
        options.vertical_speed = speed;
    }
    if let Some(direction) = args.direction {
        options.initial_direction = direction;
    }

    options.validate().context("invalid ricochet options")?;
    Ok(options)
}

struct RunReport {
    frames: u64,
    hits: HitCounts,
    snapshot: SessionSnapshot,
}

fn run(args: &CliArgs, options: RicochetOptions) -> Result<RunReport> {
    if !(args.fps.is_finite() && args.fps > 0.0) {
        bail!("--fps must be a positive number, got {}", args.fps);
    }
    if args.item.width > args.container.width || args.item.height > args.container.height {
        bail!("the item does not fit inside the container");
    }

    let host = Rc::new(SimulatedHost::new());
    let container = SimulatedElement::container(Rect::new(
        0.0,
        0.0,
        args.container.width,
        args.container.height,
    ));
    let item = SimulatedElement::item(&container, args.item.width, args.item.height);

    let hits = Rc::new(RefCell::new(HitCounts::default()));
    let params = RicochetParams::new(container, item)
        .with_options(options)
        .with_hooks(reporting_hooks(hits.clone(), args.json));

    info!(
        "Ricochet: {}x{} item in {}x{} container, {} at {}/{} units/s",
        args.item.width,
        args.item.height,
        args.container.width,
        args.container.height,
        options.initial_direction,
        options.horizontal_speed,
        options.vertical_speed
    );

    let session = start_ricochet(host.clone(), params);

    let frame_ms = 1000.0 / args.fps;
    let duration_ms = millis(args.duration);

    let mut elapsed = 0.0;
    let mut frames = 0;
    for (at, visibility) in visibility_changes(args, duration_ms) {
        frames += host.run_for(at - elapsed, frame_ms);
        host.set_visibility(visibility);
        elapsed = at;
    }
    frames += host.run_for(duration_ms - elapsed, frame_ms);

    let snapshot = session.snapshot();
    session.teardown();

    let hits = *hits.borrow();
    Ok(RunReport {
        frames,
        hits,
        snapshot,
    })
}

/// Visibility toggles inside the run, in time order. A show time that is not
/// after the hide time is ignored.
fn visibility_changes(args: &CliArgs, duration_ms: f64) -> Vec<(f64, Visibility)> {
    let mut changes = Vec::new();
    if let Some(hide) = args.hide_at.map(millis).filter(|hide| *hide < duration_ms) {
        changes.push((hide, Visibility::Hidden));
        if let Some(show) = args
            .show_at
            .map(millis)
            .filter(|show| *show > hide && *show < duration_ms)
        {
            changes.push((show, Visibility::Visible));
        }
    }
    changes
}

fn reporting_hooks(hits: Rc<RefCell<HitCounts>>, json: bool) -> Hooks {
    let counter = |edge: Edge| {
        let hits = hits.clone();
        Hook::new(move |_| hits.borrow_mut().record(edge))
    };

    let border = if json {
        Hook::fallible(|event| {
            let line = serde_json::to_string(event).map_err(|e| HookError::failed(e.to_string()))?;
            println!("{}", line);
            Ok(())
        })
    } else {
        Hook::new(|event| info!("Ricochet: {}", event))
    };

    Hooks::new()
        .on_hit_border(border)
        .on_hit_left(counter(Edge::Left))
        .on_hit_right(counter(Edge::Right))
        .on_hit_top(counter(Edge::Top))
        .on_hit_bottom(counter(Edge::Bottom))
        .on_error(|event, err| log::error!("Ricochet: reporting {} failed: {}", event, err))
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(extra: &[&str]) -> CliArgs {
        let mut argv = vec!["ricochet"];
        argv.extend_from_slice(extra);
        CliArgs::parse_from(argv)
    }

    #[test]
    fn test_cli_overrides_defaults() {
        let options = resolve_options(&args(&["--vertical-speed", "0", "-d", "top-right"])).unwrap();
        assert_eq!(options.horizontal_speed, 370.0);
        assert_eq!(options.vertical_speed, 0.0);
        assert_eq!(options.initial_direction.to_string(), "top-right");
    }

    #[test]
    fn test_negative_speed_is_rejected() {
        assert!(resolve_options(&args(&["--horizontal-speed=-1"])).is_err());
    }

    #[test]
    fn test_run_counts_hits() {
        let args = args(&[
            "--horizontal-speed",
            "100",
            "--vertical-speed",
            "100",
            "--fps",
            "100",
            "--duration",
            "15s",
            "-d",
            "top-left",
        ]);
        let options = resolve_options(&args).unwrap();
        let report = run(&args, options).unwrap();

        assert_eq!(report.frames, 1500);
        assert_eq!((report.hits.left, report.hits.right), (2, 2));
        assert_eq!((report.hits.top, report.hits.bottom), (3, 3));
    }

    #[test]
    fn test_hidden_window_freezes_motion() {
        let args = args(&[
            "--vertical-speed",
            "0",
            "--horizontal-speed",
            "10",
            "--fps",
            "10",
            "--duration",
            "10s",
            "--hide-at",
            "2s",
            "--show-at",
            "7s",
        ]);
        let options = resolve_options(&args).unwrap();
        let report = run(&args, options).unwrap();

        // visible for 2s + 3s at 10 units/s
        assert!((report.snapshot.horizontal.offset - 50.0).abs() < 1e-6);
        assert_eq!(report.snapshot.vertical.offset, 0.0);
    }

    #[test]
    fn test_visibility_changes_are_ordered_and_clipped() {
        let both = args(&["--hide-at", "2s", "--show-at", "7s"]);
        assert_eq!(
            visibility_changes(&both, 10_000.0),
            vec![(2000.0, Visibility::Hidden), (7000.0, Visibility::Visible)]
        );
        assert_eq!(
            visibility_changes(&both, 5_000.0),
            vec![(2000.0, Visibility::Hidden)]
        );

        let show_first = args(&["--hide-at", "5s", "--show-at", "1s"]);
        assert_eq!(
            visibility_changes(&show_first, 10_000.0),
            vec![(5000.0, Visibility::Hidden)]
        );
        assert!(visibility_changes(&args(&["--show-at", "1s"]), 10_000.0).is_empty());
    }

    #[test]
    fn test_oversized_item_is_rejected() {
        let args = args(&["--container", "40x40", "--item", "50x50"]);
        assert!(run(&args, RicochetOptions::default()).is_err());
    }
}
