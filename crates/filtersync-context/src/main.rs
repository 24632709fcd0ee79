use anyhow::{bail, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use filtersync_context::{
    DependentFilters, FiltersConfig, FiltersProvider, Location, SetMode, UrlLocation,
};
use filtersync_model::{decode, encode, FilterModel, FilterValue, LocationQuery};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

const BASE_URL: &str = "http://localhost/";

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Command::new("filtersync")
        .version(filtersync_context::VERSION)
        .about("Filter model <-> location query synchronization")
        .subcommand_required(true)
        .subcommand(
            Command::new("decode")
                .about("Decode a query string into a filter model (JSON)")
                .arg(Arg::new("query").required(true).help("Query string, e.g. '?a=1&b=2'")),
        )
        .subcommand(
            Command::new("encode")
                .about("Encode a filter model (JSON object) into a query string")
                .arg(Arg::new("model").required(true).help("JSON object, e.g. '{\"a\":[\"x\",\"y\"]}'")),
        )
        .subcommand(
            Command::new("apply")
                .about("Run setters against a query and print the synchronized result")
                .arg(Arg::new("query").default_value("").help("Initial query string"))
                .arg(
                    Arg::new("set")
                        .long("set")
                        .action(ArgAction::Append)
                        .value_name("KEY=VALUE")
                        .help("Set a filter (repeatable, applied in order)"),
                )
                .arg(
                    Arg::new("clear")
                        .long("clear")
                        .action(ArgAction::Append)
                        .value_name("KEY")
                        .help("Clear a filter after all --set operations"),
                )
                .arg(
                    Arg::new("link")
                        .long("link")
                        .action(ArgAction::Append)
                        .value_name("PARENT=DEP[,DEP...]")
                        .help("Setting PARENT clears the listed dependents"),
                )
                .arg(
                    Arg::new("immediate")
                        .long("immediate")
                        .action(ArgAction::SetTrue)
                        .help("Commit every write to the settled model at once"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML file with settle_window_ms / query_sync_window_ms"),
                ),
        );

    let matches = cli.get_matches();
    match matches.subcommand() {
        Some(("decode", args)) => run_decode(args),
        Some(("encode", args)) => run_encode(args),
        Some(("apply", args)) => run_apply(args).await,
        _ => unreachable!("subcommand_required"),
    }
}

fn run_decode(args: &ArgMatches) -> Result<()> {
    let query = args.get_one::<String>("query").map_or("", String::as_str);
    let model = decode(&LocationQuery::parse(query));
    println!("{}", serde_json::to_string_pretty(&model)?);
    Ok(())
}

fn run_encode(args: &ArgMatches) -> Result<()> {
    let input = args.get_one::<String>("model").map_or("{}", String::as_str);
    let model: FilterModel = serde_json::from_str(input).context("model must be a JSON object")?;
    println!("{}", encode(&model.pruned()));
    Ok(())
}

/// Everything `apply` does, parsed from the command line
#[derive(Debug)]
struct ApplyPlan {
    query: String,
    sets: Vec<(String, FilterValue)>,
    clears: Vec<String>,
    links: Option<DependentFilters>,
    mode: SetMode,
    config: FiltersConfig,
}

impl ApplyPlan {
    fn from_args(args: &ArgMatches) -> Result<Self> {
        let config = match args.get_one::<PathBuf>("config") {
            Some(path) => FiltersConfig::load(path)?,
            None => FiltersConfig::default(),
        };
        let mode = if args.get_flag("immediate") {
            SetMode::Immediate
        } else {
            SetMode::Debounced
        };
        Ok(Self {
            query: args.get_one::<String>("query").cloned().unwrap_or_default(),
            sets: values(args, "set")
                .map(String::as_str)
                .map(parse_assignment)
                .collect::<Result<_>>()?,
            clears: values(args, "clear").cloned().collect(),
            links: parse_links(values(args, "link"))?,
            mode,
            config,
        })
    }
}

fn values<'a>(args: &'a ArgMatches, id: &str) -> impl Iterator<Item = &'a String> {
    args.get_many::<String>(id).into_iter().flatten()
}

async fn run_apply(args: &ArgMatches) -> Result<()> {
    let (query, settled) = apply(ApplyPlan::from_args(args)?).await?;
    println!("{query}");
    println!("{}", serde_json::to_string(&settled)?);
    Ok(())
}

/// Run the plan over an in-process location and wait for both windows
async fn apply(plan: ApplyPlan) -> Result<(LocationQuery, FilterModel)> {
    let location = Arc::new(UrlLocation::parse(BASE_URL)?);
    location.replace_query(LocationQuery::parse(&plan.query));

    let mut builder = FiltersProvider::builder(location.clone()).with_config(plan.config);
    if let Some(links) = plan.links {
        builder = builder.with_linker(links);
    }
    let mut provider = builder.init()?;
    let filters = provider.context();

    for (key, value) in plan.sets {
        filters.assign(&key, Some(value), plan.mode)?;
    }
    for key in &plan.clears {
        filters.clear_filter(key, plan.mode)?;
    }

    tokio::time::sleep(plan.config.settle_window() + Duration::from_millis(10)).await;

    let settled = filters.settled_model()?;
    provider.teardown();
    Ok((location.query(), settled))
}

fn parse_assignment(op: &str) -> Result<(String, FilterValue)> {
    let Some((key, raw)) = op.split_once('=') else {
        bail!("--set expects KEY=VALUE, got '{op}'");
    };
    if key.is_empty() {
        bail!("--set expects a non-empty KEY, got '{op}'");
    }
    Ok((key.to_owned(), FilterValue::from_query_value(raw)))
}

fn parse_links<'a>(args: impl Iterator<Item = &'a String>) -> Result<Option<DependentFilters>> {
    let mut links = None::<DependentFilters>;
    for rule in args {
        let Some((parent, dependents)) = rule.split_once('=') else {
            bail!("--link expects PARENT=DEP[,DEP...], got '{rule}'");
        };
        if parent.is_empty() {
            bail!("--link expects a non-empty PARENT, got '{rule}'");
        }
        let rules = links.take().unwrap_or_default();
        links = Some(rules.clears(parent, dependents.split(',').filter(|dep| !dep.is_empty())));
    }
    Ok(links)
}
