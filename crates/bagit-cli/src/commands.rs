use std::path::Path;

use anyhow::{bail, Context};
use bagit::{
    Bag, BagConfig, BagInfoValue, BagIssue, FetchReport, HashAlgorithm, HttpFetcher, RehashPolicy,
};
use colored::Colorize;
use serde::Serialize;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let out = cli.format;
    match cli.command {
        Command::Init(args) => cmd_init(args, config, out),
        Command::Validate(args) => cmd_validate(args, config, out),
        Command::Update(args) => cmd_update(args, config, out),
        Command::Info(args) => cmd_info(args, config, out),
        Command::SetInfo(args) => cmd_set_info(args, config, out),
        Command::Add(args) => cmd_add(args, config, out),
        Command::Package(args) => cmd_package(args, config, out),
        Command::Fetch(args) => cmd_fetch(args, config, out),
        Command::Hash(args) => cmd_hash(args, config, out),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<BagConfig> {
    match path {
        Some(path) => Ok(BagConfig::load(path)?),
        None => Ok(BagConfig::default()),
    }
}

fn emit<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Open a bag that will be written back to disk.
fn open_for_update(path: &Path, config: BagConfig) -> anyhow::Result<Bag> {
    let bag = Bag::open(path, config)
        .with_context(|| format!("cannot open bag at {}", path.display()))?;
    if bag.is_compressed() {
        bail!("{} is an archive; extract it before modifying", path.display());
    }
    Ok(bag)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn cmd_init(args: InitArgs, mut config: BagConfig, out: OutputFormat) -> anyhow::Result<()> {
    if args.path.join("bagit.txt").exists() {
        bail!("{} is already a bag", args.path.display());
    }
    if let Some(name) = &args.algorithm {
        config.hash_algorithm = name.parse()?;
    }
    if args.minimal {
        config.extended = false;
    }
    let bag = Bag::open(&args.path, config)?;

    if out == OutputFormat::Json {
        return emit(&Summary::of(&bag)?);
    }
    println!("{} Initialized bag in {}", "✓".green().bold(), args.path.display().to_string().bold());
    println!("  Algorithms: {}", algorithm_list(&bag.hash_algorithms()).cyan());
    println!("  Extended: {}", bag.is_extended());
    Ok(())
}

#[derive(Serialize)]
struct ValidationOutput<'a> {
    valid: bool,
    issues: &'a [BagIssue],
}

fn cmd_validate(args: BagArgs, config: BagConfig, out: OutputFormat) -> anyhow::Result<()> {
    let mut bag = Bag::open(&args.bag, config)
        .with_context(|| format!("cannot open bag at {}", args.bag.display()))?;
    let valid = bag.validate();

    if out == OutputFormat::Json {
        emit(&ValidationOutput { valid, issues: bag.issues() })?;
    } else if valid {
        println!("{} {} is valid", "✓".green().bold(), args.bag.display());
    } else {
        println!("{} {} is invalid", "✗".red().bold(), args.bag.display());
        for issue in bag.issues() {
            println!("  {}: {}", issue.subject.yellow(), issue.message);
        }
    }
    if !valid {
        bail!("{} issue(s) found", bag.issues().len());
    }
    Ok(())
}

fn cmd_update(args: UpdateArgs, mut config: BagConfig, out: OutputFormat) -> anyhow::Result<()> {
    if args.if_modified {
        config.rehash = RehashPolicy::IfModified;
    }
    let mut bag = open_for_update(&args.bag, config)?;
    let report = bag.update()?;

    if out == OutputFormat::Json {
        return emit(&report);
    }
    println!("{} Updated {}", "✓".green().bold(), args.bag.display().to_string().bold());
    for rename in &report.renamed {
        println!("  {} {} → {}", "renamed:".yellow(), rename.from, rename.to);
    }
    for path in &report.added {
        println!("  {} {}", "added:".green(), path);
    }
    for path in &report.changed {
        println!("  {} {}", "changed:".cyan(), path);
    }
    for path in &report.removed {
        println!("  {} {}", "removed:".red(), path);
    }
    Ok(())
}

#[derive(Serialize)]
struct Summary {
    directory: String,
    version: Option<String>,
    encoding: String,
    algorithms: Vec<HashAlgorithm>,
    extended: bool,
    compressed: bool,
    payload_oxum: String,
    bag_info: Vec<(String, BagInfoValue)>,
    fetch_entries: usize,
}

impl Summary {
    fn of(bag: &Bag) -> anyhow::Result<Self> {
        Ok(Self {
            directory: bag.directory().display().to_string(),
            version: bag.version().map(|v| v.to_string()),
            encoding: bag.encoding().label().to_string(),
            algorithms: bag.hash_algorithms(),
            extended: bag.is_extended(),
            compressed: bag.is_compressed(),
            payload_oxum: bag.payload_oxum()?.to_string(),
            bag_info: bag
                .bag_info()
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
            fetch_entries: bag.fetch().len(),
        })
    }
}

fn cmd_info(args: BagArgs, config: BagConfig, out: OutputFormat) -> anyhow::Result<()> {
    let bag = Bag::open(&args.bag, config)
        .with_context(|| format!("cannot open bag at {}", args.bag.display()))?;
    let summary = Summary::of(&bag)?;
    if out == OutputFormat::Json {
        return emit(&summary);
    }

    println!("Bag {}", summary.directory.bold());
    println!("  Version: {}", summary.version.as_deref().unwrap_or("(unreadable)"));
    println!("  Encoding: {}", summary.encoding);
    println!("  Algorithms: {}", algorithm_list(&summary.algorithms).cyan());
    println!("  Payload-Oxum: {}", summary.payload_oxum);
    if summary.compressed {
        if let Some(format) = bag.compression() {
            println!("  Archive: {}", format.to_string().yellow());
        }
    }
    if summary.fetch_entries > 0 {
        println!("  Fetch entries: {}", summary.fetch_entries);
    }
    for (key, value) in &summary.bag_info {
        for v in value.values() {
            println!("  {}: {}", key.bold(), v);
        }
    }
    Ok(())
}

fn cmd_set_info(args: SetInfoArgs, config: BagConfig, out: OutputFormat) -> anyhow::Result<()> {
    let mut bag = open_for_update(&args.bag, config)?;
    bag.set_bag_info_data(&args.key, &args.value)?;
    bag.update()?;

    if out == OutputFormat::Json {
        return emit(&Summary::of(&bag)?);
    }
    println!("{} {}: {}", "✓".green().bold(), args.key.bold(), args.value);
    Ok(())
}

fn cmd_add(args: AddArgs, config: BagConfig, out: OutputFormat) -> anyhow::Result<()> {
    let dest = match args.dest {
        Some(dest) => dest,
        None => args
            .src
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("{} has no file name", args.src.display()))?,
    };
    let mut bag = open_for_update(&args.bag, config)?;
    let target = bag.add_file(&args.src, &dest)?;
    let report = bag.update()?;

    if out == OutputFormat::Json {
        return emit(&report);
    }
    println!("{} Added {}", "✓".green().bold(), target.display());
    Ok(())
}

fn cmd_package(args: PackageArgs, config: BagConfig, out: OutputFormat) -> anyhow::Result<()> {
    let bag = Bag::open(&args.bag, config)
        .with_context(|| format!("cannot open bag at {}", args.bag.display()))?;
    let output = bag.package(&args.output, args.archive.map(Into::into))?;
    tracing::info!("packaged {} into {}", args.bag.display(), output.display());

    if out == OutputFormat::Json {
        return emit(&serde_json::json!({ "output": output.display().to_string() }));
    }
    println!("{} Packaged {}", "✓".green().bold(), output.display().to_string().bold());
    Ok(())
}

fn cmd_fetch(args: BagArgs, config: BagConfig, out: OutputFormat) -> anyhow::Result<()> {
    let mut bag = open_for_update(&args.bag, config)?;
    let fetcher = HttpFetcher::new()?;
    let report: FetchReport = bag.resolve_fetch(&fetcher);
    if !report.fetched.is_empty() {
        bag.update()?;
    }

    if out == OutputFormat::Json {
        emit(&report)?;
    } else {
        for path in &report.fetched {
            println!("  {} {}", "fetched:".green(), path);
        }
        for failure in &report.failures {
            println!("  {} {} ({})", "failed:".red(), failure.url, failure.reason);
        }
    }
    if !report.is_complete() {
        bail!("{} fetch entries failed", report.failures.len());
    }
    Ok(())
}

fn cmd_hash(args: HashArgs, config: BagConfig, out: OutputFormat) -> anyhow::Result<()> {
    let mut bag = open_for_update(&args.bag, config)?;
    let (verb, name) = match &args.action {
        HashAction::Add { algorithm } => {
            bag.add_hash_encoding(algorithm)?;
            ("Added", algorithm)
        }
        HashAction::Remove { algorithm } => {
            bag.remove_hash_encoding(algorithm)?;
            ("Removed", algorithm)
        }
    };
    bag.update()?;

    if out == OutputFormat::Json {
        return emit(&bag.hash_algorithms());
    }
    println!("{} {} {}", "✓".green().bold(), verb, name.cyan());
    println!("  Algorithms: {}", algorithm_list(&bag.hash_algorithms()));
    Ok(())
}

fn algorithm_list(algorithms: &[HashAlgorithm]) -> String {
    algorithms
        .iter()
        .map(HashAlgorithm::name)
        .collect::<Vec<_>>()
        .join(", ")
}
