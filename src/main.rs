//! `pitchwise` - business-aware self-marketing engine
//!
//! Analyzes a prospect's business and role and produces adapted sales
//! material from the command line or over a WebSocket service.

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::Path;

use crate::cli::{Cli, Commands, ConfigCommand, DataCommand};
use crate::system::{DoctorReport, HostFacts, Requirements};
use pitchwise_core::config::{default_config_path, Config};
use pitchwise_core::logger;
use pitchwise_core::marketing::roi::CurrentCosts;
use pitchwise_core::marketing::RoiInput;
use pitchwise_core::output::OutputFormatter;
use pitchwise_core::{Engine, RecommendRequest};

mod cli;
mod server;
mod system;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let formatter = OutputFormatter::new(cli.format);

    let resolved = Config::resolve(cli.config.as_deref())
        .context("Failed to load configuration")?;
    let (mut config, source) = (resolved.config, resolved.source);
    if let Some(dir) = &cli.data_dir {
        config.knowledge.data_dir = Some(dir.clone());
    }
    if let Some(seed) = cli.seed {
        config.marketing.seed = Some(seed);
    }

    logger::init(
        logger::parse_level(&config.logging.level)?,
        config.logging.file.clone(),
        cli.verbose,
    )?;
    for message in &resolved.ignored {
        log::warn!("{}", message);
    }
    log::debug!(
        "configuration from {}",
        source
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "defaults".to_string())
    );

    match cli.command {
        Commands::Config { cmd } => handle_config(cmd, &config, source.as_deref(), &formatter),
        Commands::Doctor => handle_doctor(&config, &formatter),
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                config.api.host = host;
            }
            if let Some(port) = port {
                config.api.port = port;
            }
            config.validate()?;
            let addr = config.bind_address();
            let engine = Engine::from_config(config)?;
            server::start_server(engine, &addr).await
        }
        command => {
            let mut engine =
                Engine::from_config(config.clone()).context("Failed to load datasets")?;
            handle_command(command, &mut engine, &config, &formatter)
        }
    }
}

fn handle_command(
    command: Commands,
    engine: &mut Engine,
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<()> {
    match command {
        Commands::Analyze { prospect } => {
            let context = engine.analyze(&prospect.to_request())?;
            formatter.emit(&context, |f| f.context_text(&context))?;
        }

        Commands::Strategy { prospect } => {
            let context = engine.analyze(&prospect.to_request())?;
            let strategy = engine.strategy(&context);
            formatter.emit(&strategy, |f| f.strategy_text(&strategy))?;
        }

        Commands::Recommend {
            prospect,
            interests,
            company,
        } => {
            let request = RecommendRequest {
                context: prospect.to_request(),
                interests,
                company,
            };
            let recommendation = engine.recommend(&request)?;
            formatter.emit(&recommendation, |f| f.recommendation_text(&recommendation))?;
        }

        Commands::Pitch { facets } => {
            let pitch = engine
                .marketing()
                .elevator_pitch(&facets.industry, facets.size, &facets.role)?;
            formatter.emit(&json!({ "pitch": pitch }), |_| pitch.clone())?;
        }

        Commands::Proposal {
            target,
            company,
            output,
        } => {
            let proposal = engine
                .marketing()
                .detailed_proposal(&target.to_request(), &company)?;
            match output {
                Some(path) => {
                    write_file(&path, &proposal)?;
                    let message = format!("proposal written to {}", path.display());
                    println!("{}", formatter.success(&message));
                }
                None => formatter.emit(
                    &json!({ "company": company, "proposal": proposal }),
                    |_| proposal.clone(),
                )?,
            }
        }

        Commands::Package { target } => {
            let package = engine.marketing().marketing_package(&target.to_request())?;
            formatter.emit(&package, |f| f.package_text(&package))?;
        }

        Commands::Roi {
            industry,
            size,
            revenue,
            employees,
            labor_costs,
            other_costs,
        } => {
            let employees = employees.unwrap_or_else(|| u64::from(config.marketing.employees));
            let mut input = RoiInput::new(industry, size, revenue, employees);
            if labor_costs.is_some() || other_costs.is_some() {
                input.current_costs = Some(CurrentCosts {
                    labor: labor_costs,
                    other: other_costs,
                });
            }
            let roi = engine.marketing().roi();
            let analysis = roi.calculate(&input)?;
            formatter.emit(&analysis, |_| roi.summary(&analysis))?;
        }

        Commands::Capabilities {
            industry,
            size,
            interests,
            max,
        } => {
            let max = max.unwrap_or(config.marketing.max_capabilities);
            let relevant = engine
                .marketing()
                .capabilities()
                .relevant(&industry, size, &interests);
            let demonstration = engine
                .marketing()
                .capability_demonstration(&industry, size, &interests, max);
            formatter.emit(&relevant, |_| demonstration.clone())?;
        }

        Commands::Compare {
            industry,
            size,
            against,
        } => {
            let comparison = engine
                .marketing()
                .competitive_comparison(&industry, size, against);
            formatter.emit(
                &json!({ "industry": industry, "against": against, "comparison": comparison }),
                |_| comparison.clone(),
            )?;
        }

        Commands::Trust { industry, areas } => {
            let areas = if areas.is_empty() {
                config.marketing.trust_focus.clone()
            } else {
                areas
            };
            let trust = engine.marketing().trust();
            let info = trust.relevant(&industry, &areas);
            formatter.emit(&info, |_| trust.statement(&industry, &areas))?;
        }

        Commands::Propositions { facets, count, vars } => {
            let propositions = if vars.is_empty() {
                let count = count.unwrap_or(config.marketing.proposition_count);
                engine
                    .marketing()
                    .value_propositions(&facets.industry, facets.size, &facets.role, count)?
            } else {
                let custom: BTreeMap<String, String> = vars.into_iter().collect();
                vec![engine
                    .marketing()
                    .value_proposition(&facets.industry, facets.size, &facets.role, &custom)?]
            };
            formatter.emit(&propositions, |_| {
                propositions
                    .iter()
                    .enumerate()
                    .map(|(i, p)| format!("{}. {}\n", i + 1, p))
                    .collect()
            })?;
        }

        Commands::Data { cmd } => handle_data(cmd, engine, config, formatter)?,

        Commands::Serve { .. } | Commands::Doctor | Commands::Config { .. } => {
            unreachable!("handled before the engine is loaded")
        }
    }
    Ok(())
}

fn handle_data(
    cmd: DataCommand,
    engine: &mut Engine,
    config: &Config,
    formatter: &OutputFormatter,
) -> Result<()> {
    match cmd {
        DataCommand::Export { dir } => {
            let dir = match dir {
                Some(dir) => dir,
                None => config.require_data_dir()?.to_path_buf(),
            };
            let written = engine.knowledge().export(&dir)?;
            for path in &written {
                println!("{}", formatter.success(&format!("wrote {}", path.display())));
            }
        }

        DataCommand::Show { name } => {
            let value = engine.knowledge().dataset(&name)?;
            let pretty = serde_json::to_string_pretty(&value)?;
            formatter.emit(&value, |_| pretty.clone())?;
        }

        DataCommand::Update { name, patch, json } => {
            let text = match (patch, json) {
                (Some(path), _) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read patch {}", path.display()))?,
                (None, Some(json)) => json,
                (None, None) => bail!("provide a patch with --patch <file> or --json <text>"),
            };
            let patch: Value = serde_json::from_str(&text).context("Patch is not valid JSON")?;
            let dir = config.require_data_dir()?.to_path_buf();

            engine.update_dataset(&name, &patch)?;
            let path = engine.knowledge().save_dataset(&name, &dir)?;
            println!("{}", formatter.success(&format!("updated {} in {}", name, path.display())));
        }
    }
    Ok(())
}

fn handle_config(
    cmd: ConfigCommand,
    config: &Config,
    source: Option<&Path>,
    formatter: &OutputFormatter,
) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let yaml = serde_yml::to_string(config)?;
            formatter.emit(config, |_| yaml.clone())?;
        }
        ConfigCommand::Path => match source {
            Some(path) => println!("{}", path.display()),
            None => println!(
                "{}",
                formatter.warning("no configuration file found, using defaults")
            ),
        },
        ConfigCommand::Init { path, force } => {
            let path = match path {
                Some(path) => path,
                None => default_config_path()
                    .context("Could not determine the configuration directory")?,
            };
            if path.exists() && !force {
                bail!("{} already exists (use --force to replace it)", path.display());
            }
            Config::default().save(&path)?;
            println!("{}", formatter.success(&format!("wrote {}", path.display())));
        }
    }
    Ok(())
}

fn handle_doctor(config: &Config, formatter: &OutputFormatter) -> Result<()> {
    let dir = match &config.knowledge.data_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let report = DoctorReport::evaluate(HostFacts::collect(&dir), &Requirements::default());

    formatter.emit(&report, |f| {
        let mut out = f.heading(&format!("Host: {}", report.facts.os));
        for check in &report.checks {
            let line = format!("{}: {} (required {})", check.name, check.found, check.required);
            out.push_str(&if check.passed { f.success(&line) } else { f.warning(&line) });
            out.push('\n');
        }
        out
    })?;

    if !report.passed() {
        bail!("this host does not meet the minimum requirements");
    }
    Ok(())
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}
