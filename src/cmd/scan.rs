use std::fs;
use std::io::{self, Write};

use anyhow::{Context, Result};
use crossterm::style::{self, Stylize};

use crate::chart::ContainerImage;
use crate::config::AppConfig;
use crate::progress::Spinner;
use crate::server::ImagesResponse;

/// Scan a document from the terminal and print the sized images.
pub async fn run(url: &str, json: Option<&str>, cfg: &AppConfig) -> Result<()> {
    let service = super::build_service(cfg)?;
    print_registry_summary(cfg);

    let spinner = Spinner::new(format!("Fetching {url} ..."));

    let document = match service.load_document(url).await {
        Ok(doc) => doc,
        Err(err) => {
            spinner.fail("Failed to load document");
            return Err(err).context(format!("Could not load {url}"));
        }
    };
    let mut images = service.find_images(&document);
    drop(document);
    spinner.step(format!("Found {} images", images.len()));

    let total = images.len();
    let result = service
        .enrich(&mut images, |i, image| {
            spinner.set_message(format!(
                "Querying registry {}/{} ({}) ...",
                i + 1,
                total,
                image.name
            ));
        })
        .await;
    if let Err(err) = result {
        spinner.fail("Registry lookup failed");
        return Err(err.into());
    }
    spinner.finish(format!("Sized {total} images"));

    if let Some(dest) = json {
        let output = serde_json::to_string_pretty(&ImagesResponse {
            success: true,
            images,
        })?;
        if dest == "-" {
            println!("{output}");
        } else {
            fs::write(dest, &output).with_context(|| format!("Failed to write JSON to {dest}"))?;
            eprintln!("{} Wrote {dest}", "✔".green());
        }
    } else {
        print_images(&images);
    }

    Ok(())
}

fn print_images(images: &[ContainerImage]) {
    if images.is_empty() {
        println!("No container images found");
        return;
    }

    let width = images.iter().map(|i| i.name.len()).max().unwrap_or(0);
    for image in images {
        let container = if image.container.is_empty() {
            String::new()
        } else {
            format!("  ({})", image.container)
        };
        println!("{:<width$}  {:>10}{container}", image.name, image.size);
    }
}

fn print_registry_summary(cfg: &AppConfig) {
    let mut stderr = io::stderr();
    let _ = writeln!(
        stderr,
        "{} {}{}",
        "Registry".dim(),
        style::style(&cfg.registry_url).cyan(),
        if cfg.strict_fetch { " (strict fetch)".dim().to_string() } else { String::new() },
    );
    let _ = writeln!(stderr);
}
