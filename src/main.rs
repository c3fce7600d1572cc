//! `bindview` command line: load one structure, report what was built.

use std::io::Write as _;
use std::path::{Path, PathBuf};

use bindview::analysis::{
    self, Analysis, AnalysisError, AnalysisKind, AnalysisRequest,
};
use bindview::error::BindviewError;
use bindview::loader::{LoadSummary, StructureLoader};
use bindview::options::Options;
use bindview::scene::{Scene, SceneSummary};
use bindview::structure::{load_binding_sites, BindingSite, StructureId};
use serde::Serialize;

const USAGE: &str = "Usage: bindview <PDB_ID | path.pdb> [--sites FILE.json] \
                     [--options FILE.toml] [--export FILE.json] [--analyze KIND]";

/// Identifier used for local files whose name is not a structure id.
const LOCAL_ID: &str = "XXXX";

#[derive(Debug, Default)]
struct Args {
    input: String,
    sites: Option<PathBuf>,
    options: Option<PathBuf>,
    export: Option<PathBuf>,
    analyze: Option<AnalysisKind>,
}

#[derive(Serialize)]
struct Report<'a> {
    load: &'a LoadSummary,
    scene: &'a SceneSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    analysis: Option<&'a Analysis>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    while let Some(arg) = args.next() {
        if !arg.starts_with("--") {
            if !parsed.input.is_empty() {
                return Err(format!("unexpected argument {arg}"));
            }
            parsed.input = arg;
            continue;
        }
        let mut value = |flag: &str| {
            args.next().ok_or_else(|| format!("{flag} needs a value"))
        };
        match arg.as_str() {
            "--sites" => parsed.sites = Some(value("--sites")?.into()),
            "--options" => parsed.options = Some(value("--options")?.into()),
            "--export" => parsed.export = Some(value("--export")?.into()),
            "--analyze" => {
                let kind = value("--analyze")?;
                parsed.analyze = Some(kind.parse().map_err(|e| format!("{e}"))?);
            }
            _ => return Err(format!("unknown flag {arg}")),
        }
    }
    if parsed.input.is_empty() {
        return Err("missing structure".to_owned());
    }
    Ok(parsed)
}

/// Id to load and, for local files, the text already read.
fn resolve_input(input: &str) -> Result<(StructureId, Option<String>), BindviewError> {
    let path = Path::new(input);
    if path.exists() {
        let text = std::fs::read_to_string(path)?;
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
        let id = StructureId::new(stem).or_else(|_| {
            log::warn!("{} is not named after a structure id, using {LOCAL_ID}", path.display());
            StructureId::new(LOCAL_ID)
        })?;
        return Ok((id, Some(text)));
    }
    Ok((StructureId::new(input)?, None))
}

fn run_analysis(
    kind: AnalysisKind,
    options: &Options,
    id: &StructureId,
    text: &str,
    sites: &[BindingSite],
) -> Result<Analysis, BindviewError> {
    let provider = analysis::provider_from_options(&options.analysis)?;
    let request = match kind {
        AnalysisKind::StructurePrediction => AnalysisRequest::Structure { id, text },
        AnalysisKind::BindingSiteAnalysis => AnalysisRequest::BindingSites { id, sites },
        AnalysisKind::DrugCandidates => {
            let site = sites.first().ok_or(AnalysisError::MissingBindingSite)?;
            AnalysisRequest::DrugCandidates { id, site }
        }
    };
    Ok(analysis::run(provider.as_ref(), &request))
}

fn run(args: &Args) -> Result<(), BindviewError> {
    let options = match &args.options {
        Some(path) => Options::load(path)?,
        None => Options::default(),
    };
    let sites = match &args.sites {
        Some(path) => load_binding_sites(path)?,
        None => Vec::new(),
    };

    let (id, local_text) = resolve_input(&args.input)?;
    let mut scene = Scene::new();
    let mut loader = StructureLoader::from_options(options.clone());

    let (summary, text) = match local_text {
        Some(text) => (loader.load_text(id.clone(), &text, sites.clone(), &mut scene)?, text),
        None if args.analyze == Some(AnalysisKind::StructurePrediction) => {
            // Structure analysis needs the raw text as well as the scene.
            let text = bindview::structure::default_source(&options.source)
                .fetch(&id)
                .map_err(|reason| BindviewError::StructureUnavailable {
                    id: id.to_string(),
                    reason,
                })?;
            (loader.load_text(id.clone(), &text, sites.clone(), &mut scene)?, text)
        }
        None => (loader.load_blocking(id.clone(), sites.clone(), &mut scene)?, String::new()),
    };

    if summary.skip_warning {
        log::warn!(
            "{} malformed ATOM lines were skipped; the structure may be incomplete",
            summary.skipped_lines
        );
    }
    for degraded in &summary.degraded {
        log::warn!("omitted: {degraded}");
    }

    let analysis = args
        .analyze
        .map(|kind| run_analysis(kind, &options, &id, &text, &sites))
        .transpose()?;

    let scene_summary = scene.summary();
    if let Some(path) = &args.export {
        std::fs::write(path, serde_json::to_string_pretty(&scene_summary)?)?;
        log::info!("scene exported to {}", path.display());
    }

    let report = Report {
        load: &summary,
        scene: &scene_summary,
        analysis: analysis.as_ref(),
    };
    let mut out = std::io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &report)?;
    writeln!(out)?;
    Ok(())
}

fn main() {
    env_logger::init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            log::error!("{USAGE}");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}
