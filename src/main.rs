//! Resume tailor: fill a DOCX resume template from a YAML profile

use anyhow::{anyhow, Context};
use clap::Parser;
use colored::Colorize;
use log::{error, info};
use resume_tailor::cli::{self, Cli};
use resume_tailor::docx::package::DocxPackage;
use resume_tailor::fill::{DocumentFiller, FillOptions, FillReport};
use resume_tailor::profile::generated::{accept_generated_profile, save_generated_profile};
use resume_tailor::profile::store::{load_profile, save_profile};
use resume_tailor::profile::{flatten, ProfileRecord};
use resume_tailor::Config;
use std::process;

fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Load configuration
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run(&cli, &config) {
        error!("Tailoring failed: {:#}", e);
        process::exit(1);
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = Config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    config.validate()?;
    Ok(config)
}

fn run(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    cli::validate_file_extension(&cli.template, &["docx"])
        .map_err(|e| anyhow!("Template file: {}", e))?;
    cli::validate_file_extension(&cli.output, &["docx"])
        .map_err(|e| anyhow!("Output file: {}", e))?;

    if !cli.json {
        println!("🚀 Resume tailoring");
        println!("📄 Template: {}", cli.template.display());
        println!("👤 Profile: {}", cli.profile.display());
    }

    let profile = read_profile(cli)?;
    let values = flatten(&profile);
    info!("Profile flattened into {} placeholder value(s)", values.len());

    let mut package = DocxPackage::open(&cli.template)
        .with_context(|| format!("Cannot open template {}", cli.template.display()))?;
    let filler = DocumentFiller::new(&values, FillOptions::from(config));
    let report = filler.fill(&mut package)?;
    let saved = package
        .save(&cli.output)
        .with_context(|| format!("Cannot write {}", cli.output.display()))?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
        println!("\n{} Saved to {}", "✅".green(), saved.display().to_string().bold());
    }
    Ok(())
}

fn read_profile(cli: &Cli) -> anyhow::Result<ProfileRecord> {
    if !cli.from_generated {
        let profile = load_profile(&cli.profile)?;
        if let Some(path) = &cli.save_profile {
            save_profile(&profile, path)?;
        }
        return Ok(profile);
    }

    let raw = std::fs::read_to_string(&cli.profile)
        .with_context(|| format!("Cannot read generated profile {}", cli.profile.display()))?;
    let generated = accept_generated_profile(&raw);
    if let Some(path) = &cli.save_profile {
        save_generated_profile(&generated, path)?;
    }
    if let Some(warning) = &generated.warning {
        if !cli.json {
            println!("{} Generated profile may be malformed: {}", "⚠️ ".yellow(), warning);
        }
    }
    generated
        .record
        .ok_or_else(|| anyhow!("Generated profile is not a valid YAML profile"))
}

fn print_report(report: &FillReport) {
    println!("\n📊 Fill summary");
    println!(
        "   Placeholders filled: {}",
        report.replacements.to_string().green()
    );
    println!("   Hyperlinks inserted: {}", report.hyperlinks.to_string().green());
    println!(
        "   Paragraphs changed: {} of {}",
        report.paragraphs_changed, report.paragraphs_scanned
    );
    if report.capped_paragraphs > 0 {
        println!(
            "   {} paragraph(s) hit the pass limit",
            report.capped_paragraphs.to_string().yellow()
        );
    }
    if !report.unresolved.is_empty() {
        println!("{}", "   Placeholders without a profile value:".yellow());
        for name in &report.unresolved {
            println!("     - {{{{{}}}}}", name);
        }
    }
}
