use std::{env, fs, io, path::{Path, PathBuf}, process::ExitCode, time::Instant};

use indexmap::IndexMap;
use rayon::prelude::*;
use related_content::{
    related_scores, ComparisonConfig, PearsonCompare, VectorBuilder,
};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// One text file of the document directory
struct Document {
    title: String,
    body: String,
}

fn document_fields(doc: &Document) -> Vec<String> {
    vec![doc.title.clone(), doc.body.clone()]
}

// ディレクトリ直下のファイルを並列に読み込む (ファイル名順)
fn load_documents<P: AsRef<Path>>(dir: P) -> io::Result<IndexMap<String, Document>> {
    let start = Instant::now();
    let mut files: Vec<PathBuf> = fs::read_dir(&dir)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    info!(files = files.len(), threads = rayon::current_num_threads(), "reading documents");

    let docs: Vec<Option<(String, Document)>> = files
        .par_iter()
        .map(|path| {
            let body = match fs::read_to_string(path) {
                Ok(body) => body,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipped unreadable file");
                    return None;
                }
            };
            let key = path.file_name()?.to_str()?.to_string();
            let title = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .replace(['_', '-'], " ");
            Some((key, Document { title, body }))
        })
        .collect();

    let docs: IndexMap<String, Document> = docs.into_iter().flatten().collect();
    info!(
        docs = docs.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "documents loaded"
    );
    Ok(docs)
}

struct Args {
    docs_dir: String,
    target: Option<String>,
    limit: Option<usize>,
    f_min: Option<f64>,
    f_max: Option<f64>,
    scores: bool,
}

fn parse_args() -> Result<Option<Args>, String> {
    let mut args = env::args().skip(1);
    let mut parsed = Args {
        docs_dir: String::from("data/docs"),
        target: None,
        limit: None,
        f_min: None,
        f_max: None,
        scores: false,
    };
    while let Some(a) = args.next() {
        match a.as_str() {
            "--docs" => parsed.docs_dir = args.next().ok_or("--docs requires a path")?,
            "--target" => parsed.target = Some(args.next().ok_or("--target requires a file name")?),
            "--limit" => {
                let v = args.next().ok_or("--limit requires a number")?;
                match v.parse::<usize>() {
                    Ok(n) if n > 0 => parsed.limit = Some(n),
                    _ => return Err("--limit needs positive integer".into()),
                }
            }
            "--f-min" => parsed.f_min = Some(parse_threshold("--f-min", args.next())?),
            "--f-max" => parsed.f_max = Some(parse_threshold("--f-max", args.next())?),
            "--scores" => parsed.scores = true,
            "-h" | "--help" => return Ok(None),
            other => {
                // 最初の位置引数は target
                if parsed.target.is_none() {
                    parsed.target = Some(other.to_string());
                } else {
                    warn!("extra arg ignored: {}", other);
                }
            }
        }
    }
    Ok(Some(parsed))
}

fn parse_threshold(flag: &str, value: Option<String>) -> Result<f64, String> {
    let value = value.ok_or_else(|| format!("{flag} requires a number"))?;
    value.parse::<f64>().map_err(|e| format!("{flag} {value:?}: {e}"))
}

fn print_usage() {
    eprintln!(
        "Usage: related-content [--docs DIR] [--target FILE] [--limit N] \
         [--f-min F] [--f-max F] [--scores]"
    );
    eprintln!("Without --target every document is listed. Output format: <doc>\\t<related...>");
    eprintln!("Thresholds default to RELATED_F_MIN / RELATED_F_MAX, then 0.1 / 1.0.");
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let args = match parse_args() {
        Ok(Some(args)) => args,
        Ok(None) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            error!("{e}");
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    let config = match ComparisonConfig::with_overrides(args.f_min, args.f_max) {
        Ok(config) => config,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let docs = match load_documents(&args.docs_dir) {
        Ok(docs) => docs,
        Err(e) => {
            error!(dir = %args.docs_dir, "failed to load documents: {e}");
            return ExitCode::FAILURE;
        }
    };
    if docs.is_empty() {
        error!("no documents loaded. abort");
        return ExitCode::FAILURE;
    }

    let projector = document_fields as fn(&Document) -> Vec<String>;
    let mut builder = match VectorBuilder::new(docs, projector, config) {
        Ok(builder) => builder,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let build_start = Instant::now();
    let space = match builder.flush() {
        Ok(space) => space,
        Err(e) => {
            error!("failed to build vector space: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(
        records = space.len(),
        vocab = space.vocab_size(),
        elapsed_ms = build_start.elapsed().as_secs_f64() * 1000.0,
        "vector space ready"
    );

    let targets: Vec<String> = match &args.target {
        Some(target) if !space.vectors().contains_key(target) => {
            error!(%target, "unknown document");
            return ExitCode::FAILURE;
        }
        Some(target) => vec![target.clone()],
        None => space.vectors().keys().cloned().collect(),
    };

    for target in &targets {
        let mut ranked = match related_scores::<_, _, PearsonCompare>(target, space.vectors()) {
            Ok(ranked) => ranked,
            Err(e) => {
                error!(%target, "{e}");
                return ExitCode::FAILURE;
            }
        };
        if let Some(limit) = args.limit {
            ranked.truncate(limit);
        }
        let row: Vec<String> = ranked
            .iter()
            .map(|(key, score)| {
                if args.scores {
                    format!("{key}({score:.4})")
                } else {
                    key.clone()
                }
            })
            .collect();
        println!("{}\t{}", target, row.join(" "));
    }

    ExitCode::SUCCESS
}
