//! props - inspect reservoir property catalogs.
//!
//! ```bash
//! props info field.json
//! props list field.json --kind porosity
//! props show field.json 4b7c...
//! ```

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};
use uuid::Uuid;

use reservoir_props::model::RecordKind;
use reservoir_props::prelude::*;

/// Environment variable overriding the log filter.
const LOG_ENV: &str = "PROPS_LOG";

#[derive(Parser, Debug)]
#[command(name = "props")]
#[command(about = "Inspect reservoir property catalogs")]
struct Args {
    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record counts, supports and local property kinds
    Info {
        catalog: PathBuf,
    },
    /// One line per property
    List {
        catalog: PathBuf,
        /// Only properties on this support
        #[arg(long)]
        support: Option<Uuid>,
        /// Only properties of this kind
        #[arg(long)]
        kind: Option<String>,
        /// Only properties whose title contains this text (case-insensitive)
        #[arg(long)]
        title: Option<String>,
    },
    /// Full metadata of one property
    Show {
        catalog: PathBuf,
        uuid: Uuid,
    },
}

fn init_logging(verbose: u8, quiet: bool) {
    let default = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default));
    fmt().with_env_filter(filter).with_target(false).init();
}

fn open(catalog: &Path) -> anyhow::Result<SharedModel> {
    let model = Model::open_with(catalog, StoreOptions::read_only())
        .with_context(|| format!("cannot open catalog {}", catalog.display()))?;
    Ok(model.into_shared())
}

fn cmd_info(catalog: &Path) -> anyhow::Result<()> {
    let model = open(catalog)?;
    let model = model.read();
    println!("Catalog: {}", catalog.display());
    for kind in RecordKind::ALL {
        println!("  {:<22} {}", kind.name(), model.count(kind));
    }
    for support in model.supports() {
        let s = support.as_support();
        let cells = s
            .element_shape(IndexableElement::Cells)
            .map(|shape| shape.to_string())
            .unwrap_or_else(|_| "-".into());
        println!("\nSupport {} '{}' ({}), cells {}", s.uuid(), s.title(), s.support_kind(), cells);
        println!("  properties: {}", model.properties_for_support(&s.uuid()).len());
    }
    let local = model.kinds().local_kinds();
    if !local.is_empty() {
        println!("\nLocal property kinds:");
        for k in local {
            println!("  {} '{}' (parent {})", k.uuid, k.title, k.parent_or_default());
        }
    }
    Ok(())
}

fn cmd_list(catalog: &Path, support: Option<Uuid>, kind: Option<String>, title: Option<String>) -> anyhow::Result<()> {
    let model = open(catalog)?;
    let supports: Vec<Uuid> = match support {
        Some(s) => vec![s],
        None => model.read().supports().map(|s| s.as_support().uuid()).collect(),
    };
    let mut criteria = Criteria::new();
    if let Some(k) = kind {
        criteria = criteria.kind(k);
    }
    if let Some(t) = title {
        criteria = criteria.title_with(t, TitleMode::Contains, true);
    }
    for support in supports {
        let pc = PropertyCollection::for_support(model.clone(), support)?.select(&criteria);
        for uuid in pc.parts() {
            println!("{}  {}", uuid, pc.part_str(uuid, true)?);
        }
    }
    Ok(())
}

fn cmd_show(catalog: &Path, uuid: Uuid) -> anyhow::Result<()> {
    let model = open(catalog)?;
    let Some(d) = model.read().property(&uuid) else {
        bail!("no property {} in {}", uuid, catalog.display());
    };
    let pc = PropertyCollection::for_support(model.clone(), d.support_uuid)?;
    let shape = {
        let m = model.read();
        let support = m.support(&d.support_uuid).context("support missing")?;
        d.canonical_shape(support)?
    };

    println!("Property {}", d.uuid);
    println!("  title:       {}", d.citation_title);
    println!("  kind:        {}", d.property_kind);
    if let (Some(ft), Some(f)) = (&d.facet_type, &d.facet) {
        println!("  facet:       {} = {}", ft, f);
    }
    println!("  element:     {}", d.indexable_element);
    println!("  discrete:    {}", d.is_discrete);
    println!("  points:      {}", d.is_points);
    println!("  count:       {}", d.count);
    println!("  shape:       {}", shape);
    println!("  storage:     {}", d.pod);
    if let Some(uom) = &d.uom {
        println!("  uom:         {}", uom);
    }
    if let Some(r) = d.realization {
        println!("  realization: {}", r);
    }
    if let (Some(t), Some(ts)) = (d.time_index, d.time_series_uuid) {
        println!("  time index:  {} of {}", t, ts);
    }
    if let Some(null) = d.null_value {
        println!("  null:        {}", null);
    }
    match d.const_value() {
        Some(v) => println!("  constant:    {}", v),
        None => println!("  array:       {}", d.array_uuid().map(|u| u.to_string()).unwrap_or_default()),
    }
    let min = pc.minimum_value_for_part(&uuid)?;
    let max = pc.maximum_value_for_part(&uuid)?;
    if let (Some(min), Some(max)) = (min, max) {
        println!("  range:       {} .. {}", min, max);
    }
    for (k, v) in d.extra_metadata.iter() {
        println!("  {}: {}", k, v);
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    let result = match args.command {
        Command::Info { catalog } => cmd_info(&catalog),
        Command::List {
            catalog,
            support,
            kind,
            title,
        } => cmd_list(&catalog, support, kind, title),
        Command::Show { catalog, uuid } => cmd_show(&catalog, uuid),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}
