use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::LevelFilter;
use spam_meter::{
    count_words, parse_message, EmailAnalyzer, EmailReport, PatternMatcher, RuleTable,
    ScoringConfig, Severity,
};
use std::io::Read;
use std::process;

const DEFAULT_MAX_BYTES: &str = "1048576";

fn main() {
    let matches = build_cli().get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    match run(&matches) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(2);
        }
    }
}

fn build_cli() -> Command {
    Command::new("spam-meter")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Score email text for spam-like phrasing and obfuscation")
        .long_about(
            "Scores a subject line and body against weighted phrase and pattern rules.\n\
             Exits 0 when the email stays under the flag threshold, 1 when it is flagged\n\
             and 2 on error.",
        )
        .arg(
            Arg::new("subject")
                .short('s')
                .long("subject")
                .value_name("TEXT")
                .help("Subject line to score")
                .conflicts_with("email"),
        )
        .arg(
            Arg::new("body")
                .short('b')
                .long("body")
                .value_name("TEXT")
                .help("Body text to score")
                .conflicts_with_all(["body-file", "email"]),
        )
        .arg(
            Arg::new("body-file")
                .long("body-file")
                .value_name("FILE")
                .help("Read the body from a file ('-' for stdin)")
                .conflicts_with("email"),
        )
        .arg(
            Arg::new("email")
                .short('e')
                .long("email")
                .value_name("FILE")
                .help("Raw message file; the Subject header and body are scored ('-' for stdin)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Scoring configuration file (thresholds and subject multiplier)"),
        )
        .arg(
            Arg::new("rules")
                .short('r')
                .long("rules")
                .value_name("FILE")
                .help("Rule table to use instead of the built-in one"),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .value_parser(["text", "json"])
                .default_value("text"),
        )
        .arg(
            Arg::new("max-bytes")
                .long("max-bytes")
                .value_name("N")
                .help("Refuse input larger than N bytes (subject and body combined)")
                .value_parser(clap::value_parser!(usize))
                .default_value(DEFAULT_MAX_BYTES),
        )
        .arg(
            Arg::new("generate-config")
                .long("generate-config")
                .value_name("FILE")
                .help("Write the default scoring configuration to FILE and exit")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("test-config")
                .long("test-config")
                .help("Validate the configuration and rule table, then exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-rules")
                .long("list-rules")
                .help("Print every rule with its weight and exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
}

fn run(matches: &ArgMatches) -> anyhow::Result<i32> {
    if let Some(path) = matches.get_one::<String>("generate-config") {
        ScoringConfig::default().to_file(path)?;
        println!("Default scoring configuration written to: {path}");
        return Ok(0);
    }

    let config = load_config(matches.get_one::<String>("config"))?;
    let rules = load_rules(matches.get_one::<String>("rules"))?;

    if matches.get_flag("list-rules") {
        print_rules(&rules);
        return Ok(0);
    }

    if matches.get_flag("test-config") {
        config.validate()?;
        println!(
            "Thresholds: flag {}, warning {}, critical {}; subject multiplier {}",
            config.thresholds.flag,
            config.thresholds.warning,
            config.thresholds.critical,
            config.subject_multiplier
        );
        for tier in Severity::PRIORITY {
            println!("{tier} phrase rules: {}", rules.tier_rules(tier).count());
        }
        println!("Pattern rules: {}", rules.pattern_rules().len());
        println!("All rules compiled successfully.");
        return Ok(0);
    }

    let (subject, body) = read_input(matches)?;

    let max_bytes = matches
        .get_one::<usize>("max-bytes")
        .copied()
        .unwrap_or(usize::MAX);
    let input_len = subject.len() + body.len();
    if input_len > max_bytes {
        anyhow::bail!("input is {input_len} bytes, over the --max-bytes limit of {max_bytes}");
    }

    let analyzer = EmailAnalyzer::new(rules, config)?;
    let report = analyzer.analyze(&subject, &body);
    log::info!(
        "Combined score {:.2} ({}), {} matches",
        report.combined_score,
        report.overall_tier,
        report.all_matches.len()
    );

    match matches.get_one::<String>("format").map(String::as_str) {
        Some("json") => println!("{}", serde_json::to_string_pretty(&report)?),
        _ => print_report(&report, count_words(&body)),
    }

    Ok(if report.should_flag { 1 } else { 0 })
}

fn load_config(path: Option<&String>) -> anyhow::Result<ScoringConfig> {
    match path {
        Some(path) => ScoringConfig::from_file(path),
        None => Ok(ScoringConfig::default()),
    }
}

fn load_rules(path: Option<&String>) -> anyhow::Result<RuleTable> {
    match path {
        Some(path) => RuleTable::from_file(path),
        None => RuleTable::builtin(),
    }
}

fn read_source(path: &str) -> anyhow::Result<String> {
    if path == "-" {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .context("failed to read stdin")?;
        Ok(content)
    } else {
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))
    }
}

fn read_input(matches: &ArgMatches) -> anyhow::Result<(String, String)> {
    if let Some(path) = matches.get_one::<String>("email") {
        let message = parse_message(&read_source(path)?);
        return Ok((message.subject.unwrap_or_default(), message.body));
    }

    let subject = matches.get_one::<String>("subject").cloned();
    let body = match (
        matches.get_one::<String>("body"),
        matches.get_one::<String>("body-file"),
    ) {
        (Some(body), _) => Some(body.clone()),
        (None, Some(path)) => Some(read_source(path)?),
        (None, None) => None,
    };

    if subject.is_none() && body.is_none() {
        anyhow::bail!("nothing to score: pass --subject, --body, --body-file or --email");
    }

    Ok((subject.unwrap_or_default(), body.unwrap_or_default()))
}

fn print_report(report: &EmailReport, body_words: usize) {
    println!(
        "Subject:  {:>6.2}  ({})",
        report.subject_result.total_score, report.subject_result.tier
    );
    println!(
        "Body:     {:>6.2}  ({}, {} words)",
        report.body_result.total_score, report.body_result.tier, body_words
    );
    println!(
        "Combined: {:>6.2}  ({}){}",
        report.combined_score,
        report.overall_tier,
        if report.should_flag { "  FLAGGED" } else { "" }
    );

    for summary in report.matches_by_tier() {
        println!();
        println!("{} ({:.1} pts)", summary.tier, summary.score);
        for distinct in &summary.distinct {
            println!("  {} ({:.1})", distinct.text, distinct.weight);
        }
    }
}

fn print_rules(rules: &RuleTable) {
    for tier in Severity::PRIORITY {
        println!("{tier} phrases:");
        for rule in rules.tier_rules(tier) {
            println!("  {:>4.1}  {:<32} {}", rule.weight, rule.phrase, rule.category);
        }
        println!();
    }

    println!("patterns:");
    for rule in rules.pattern_rules() {
        let kind = match rule.matcher {
            PatternMatcher::Regex(_) => "regex",
            PatternMatcher::Scanner(_) => "scanner",
        };
        println!(
            "  {:>4.1}  {:<32} {:<8} {}",
            rule.weight,
            rule.description,
            kind,
            rule.matcher.source()
        );
    }
}
