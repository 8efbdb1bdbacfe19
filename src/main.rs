//! Search Replay CLI - Play back a precomputed search trace.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ab_glyph::FontVec;
use search_replay::{
    Cell, ReplayConfig,
    playback::{Driver, ThreadSleeper},
    render::{ExportOptions, export_frames},
    store::DirectorySource,
    surface::ReplaySession,
};

/// Optional configuration file inside the data directory.
const CONFIG_FILE: &str = "replay.json";

struct Args {
    data_dir: PathBuf,
    run_id: String,
    speed: Option<f64>,
    cell_size: Option<f64>,
    export: Option<PathBuf>,
    font: Option<PathBuf>,
    show_final: bool,
}

fn main() {
    env_logger::init();

    let argv: Vec<String> = std::env::args().collect();

    if argv.get(1).map(String::as_str) == Some("--example") {
        print_example_config();
        return;
    }

    let args = parse_args(&argv).unwrap_or_else(|msg| {
        if !msg.is_empty() {
            eprintln!("Error: {}", msg);
            eprintln!();
        }
        print_usage(&argv[0]);
        std::process::exit(1);
    });

    let config = load_config(&args.data_dir);
    let source = DirectorySource::new(&args.data_dir);
    let available = source.runs().unwrap_or_default();

    let mut session = ReplaySession::new(source, &config).unwrap_or_else(|e| {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    });

    if let Some(speed) = args.speed {
        apply_setting("speed", session.on_speed_change(speed));
    }
    if let Some(cell_size) = args.cell_size {
        apply_setting("cell size", session.on_cell_size_change(cell_size));
    }

    if let Err(e) = session.on_run_select(&args.run_id) {
        eprintln!("Error loading run: {}", e);
        if !available.is_empty() {
            eprintln!("Available runs: {}", available.join(", "));
        }
        std::process::exit(1);
    }

    let view = session.view();
    println!("Search Replay");
    println!("=============");
    println!("Run: {}", args.run_id);
    println!("Frames: {}", view.frame_count);
    if let Some(run) = session.controller().run() {
        let (rows, cols) = run.frames.dimensions();
        println!("Grid: {}x{}", rows, cols);
        println!("Solution points: {}", run.solution.len());
    }
    println!("Speed: {} frames/s", view.speed);
    println!("Cell size: {} px", view.cell_size);
    println!();

    if let Some(out_dir) = &args.export {
        export(&session, &config, &args, out_dir);
        return;
    }

    if args.show_final {
        if let Err(e) = session.on_show_final_path() {
            eprintln!("Nothing to show: {}", e);
            std::process::exit(1);
        }
    } else {
        session.on_play_pause();
    }

    let total = view.frame_count;
    let step = (total / 10).max(1);
    let result = Driver::new(ThreadSleeper).run(session.controller_mut(), |controller| {
        let index = controller.state().current_index;
        if index % step == 0 || controller.is_last_frame() {
            let visited = controller
                .current_frame()
                .map_or(0, |f| f.count(Cell::VisitedPath));
            println!("  Frame {}/{}: visited={}", index + 1, total, visited);
        }
        Ok::<_, std::convert::Infallible>(())
    });
    let Ok(emitted) = result;

    println!();
    println!("Frames shown: {}", emitted);
    if let Some(message) = session.completion_message() {
        println!("{}", message);
    }
    let view = session.view();
    if !view.solution_text.is_empty() {
        println!("{}", view.solution_text);
    }
}

fn export(
    session: &ReplaySession<DirectorySource>,
    config: &ReplayConfig,
    args: &Args,
    out_dir: &Path,
) {
    let Some(run) = session.controller().run() else {
        return;
    };

    let font = args.font.as_ref().map(|path| {
        let data = fs::read(path).unwrap_or_else(|e| {
            eprintln!("Error reading font file: {}", e);
            std::process::exit(1);
        });
        let font = FontVec::try_from_vec(data).unwrap_or_else(|_| {
            eprintln!("Error parsing font file: {}", path.display());
            std::process::exit(1);
        });
        Arc::new(font)
    });

    let options = ExportOptions {
        cell_size: session.view().cell_size as f32,
        reveal: config.reveal,
        font,
    };

    match export_frames(run, &options, out_dir) {
        Ok(paths) => println!("Exported {} frames to {}", paths.len(), out_dir.display()),
        Err(e) => {
            eprintln!("Export failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn apply_setting<E: std::fmt::Display>(name: &str, result: Result<f64, E>) {
    if let Err(e) = result {
        eprintln!("Ignoring {}: {}", name, e);
    }
}

fn load_config(data_dir: &Path) -> ReplayConfig {
    let path = data_dir.join(CONFIG_FILE);
    if !path.exists() {
        return ReplayConfig::default();
    }
    let text = fs::read_to_string(&path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {}", e);
        std::process::exit(1);
    });
    serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {}", e);
        std::process::exit(1);
    })
}

fn parse_args(argv: &[String]) -> Result<Args, String> {
    if argv.len() < 3 {
        return Err(String::new());
    }

    let mut args = Args {
        data_dir: PathBuf::from(&argv[1]),
        run_id: argv[2].clone(),
        speed: None,
        cell_size: None,
        export: None,
        font: None,
        show_final: false,
    };

    let mut rest = argv[3..].iter();
    while let Some(flag) = rest.next() {
        let mut value = || {
            rest.next()
                .cloned()
                .ok_or_else(|| format!("{} needs a value", flag))
        };
        match flag.as_str() {
            "--speed" => args.speed = Some(parse_number(flag, &value()?)?),
            "--cell-size" => args.cell_size = Some(parse_number(flag, &value()?)?),
            "--export" => args.export = Some(PathBuf::from(value()?)),
            "--font" => args.font = Some(PathBuf::from(value()?)),
            "--final" => args.show_final = true,
            other => return Err(format!("Unknown argument: {}", other)),
        }
    }

    Ok(args)
}

fn parse_number(flag: &str, value: &str) -> Result<f64, String> {
    value
        .parse()
        .map_err(|_| format!("{} expects a number, got {:?}", flag, value))
}

fn print_usage(program: &str) {
    eprintln!("Usage: {} <data-dir> <run-id> [options]", program);
    eprintln!();
    eprintln!("Replay a precomputed search trace.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  data-dir          Directory with <run>.json, <run>Solution.json, <run>SolutionText.txt");
    eprintln!("  run-id            Run to replay (e.g. dijkstra, aStar)");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --speed N         Frames per second");
    eprintln!("  --cell-size N     Cell size in pixels");
    eprintln!("  --final           Jump straight to the final frame");
    eprintln!("  --export DIR      Write every frame as PNG instead of playing");
    eprintln!("  --font FILE       TTF/OTF font for text in exported frames");
    eprintln!();
    eprintln!("An optional {} in data-dir overrides defaults; see --example.", CONFIG_FILE);
}

fn print_example_config() {
    let config = ReplayConfig::default();

    println!("Example configuration ({}):", CONFIG_FILE);
    println!("{}", serde_json::to_string_pretty(&config).unwrap());
}
