use anyhow::{Context, Result};
use clap::Parser;
use indicatif::ProgressBar;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tiny_squeeze::cli::{Args, Commands};
use tiny_squeeze::constants::{FREE_TIER_LIMIT, INFO_PREFIX, KEY_PREFIX, SUCCESS_PREFIX};
use tiny_squeeze::utils::create_progress_bar;
use tiny_squeeze::{
    config, locate_image_files, logger, repository_root, staged_image_files, CompressionDriver,
    CompressionService, ProgressLine, RunReport, RunResult, TinifyClient,
};

fn main() -> ExitCode {
    let args = Args::parse();
    logger::set_quiet_mode(args.quiet);
    logger::set_verbose_mode(args.verbose);

    match run(args.command) {
        Ok(code) => code,
        Err(e) => {
            tiny_squeeze::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Compress {
            dir,
            api_keys,
            root,
            json,
        } => compress(dir, &api_keys, root, json),
        Commands::Scan { dir, root } => scan(&dir, root),
        Commands::Usage { api_keys } => usage(&api_keys),
    }
}

fn compress(
    dir: Option<PathBuf>,
    api_keys: &[String],
    root: Option<PathBuf>,
    json: bool,
) -> Result<ExitCode> {
    if json {
        // stdout carries only the JSON document
        logger::set_quiet_mode(true);
    }

    let credentials = config::require_credentials(api_keys)?;
    let root = config::resolve_project_root(root)?;

    let (root, files) = match dir {
        Some(dir) => {
            let files = locate_image_files(&dir, &root);
            if files.is_empty() {
                tiny_squeeze::info!(
                    "{} No jpg/png/gif/webp images found under {}",
                    INFO_PREFIX,
                    dir.display()
                );
            }
            (root, files)
        }
        None => {
            let repo = repository_root(&root)
                .context("Not inside a git repository; pass --dir to compress a directory")?;
            let files = staged_image_files(&repo).context("Failed to list staged files")?;
            if files.is_empty() {
                tiny_squeeze::info!(
                    "{} No staged jpg/png/gif/webp images. Stage them with `git add` or pass --dir",
                    INFO_PREFIX
                );
            }
            (repo, files)
        }
    };

    if files.is_empty() {
        if json {
            println!("{}", RunReport::new(0, RunResult::default(), Vec::new()).to_json()?);
        }
        return Ok(ExitCode::SUCCESS);
    }

    tiny_squeeze::info!(
        "🚀 Compressing {} image(s) with {} API key(s)",
        files.len(),
        credentials.len()
    );

    let client = TinifyClient::new().context("Failed to create Tinify client")?;
    let driver = CompressionDriver::new(&client, &root);

    let progress_bar = if logger::is_quiet() {
        ProgressBar::hidden()
    } else {
        create_progress_bar(files.len() as u64)
    };
    let mut progress = Vec::with_capacity(files.len());
    let result = driver.run(&files, &credentials, |event| {
        progress_bar.set_position(event.current as u64);
        progress_bar.set_message(event.path.display().to_string());
        progress.push(ProgressLine::from(event));
    })?;
    progress_bar.finish_and_clear();

    let clean = result.is_clean();
    let report = RunReport::new(files.len(), result, progress);
    if json {
        println!("{}", report.to_json()?);
    } else {
        println!("{}", report.render_text());
    }

    Ok(if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn scan(dir: &Path, root: Option<PathBuf>) -> Result<ExitCode> {
    let root = config::resolve_project_root(root)?;
    let files = locate_image_files(dir, &root);

    for file in &files {
        println!("{}", file.display());
    }
    tiny_squeeze::info!("{} {} image(s) found", INFO_PREFIX, files.len());

    Ok(ExitCode::SUCCESS)
}

fn usage(api_keys: &[String]) -> Result<ExitCode> {
    let credentials = config::require_credentials(api_keys)?;
    let client = TinifyClient::new().context("Failed to create Tinify client")?;

    let mut all_valid = true;
    let mut remaining_total = 0;
    for (index, credential) in credentials.iter().enumerate() {
        match client.validate(credential) {
            Ok(()) => {
                let used = u64::from(client.usage_snapshot(credential));
                let remaining = FREE_TIER_LIMIT.saturating_sub(used);
                remaining_total += remaining;
                println!(
                    "{} #{} {}: {} used, {} free compressions left",
                    KEY_PREFIX,
                    index + 1,
                    credential,
                    used,
                    remaining
                );
            }
            Err(e) => {
                all_valid = false;
                tiny_squeeze::error!("#{} {}: {}", index + 1, credential, e);
            }
        }
    }
    println!(
        "{} {} free compressions left across valid keys",
        SUCCESS_PREFIX, remaining_total
    );

    Ok(if all_valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
