//! Interactive console demo for a single package

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use console::style;

use quipster::{GenerationRequest, PackageService};

fn capitalize(s: &str) -> String
{   let mut chars = s.chars();
    match chars.next()
    {   Some(first) => first.to_uppercase().chain(chars).collect()
      , None => String::new()
    }
}

fn read_line(label: &str) -> Result<Option<String>>
{   print!("{}", label);
    io::stdout().flush().ok();
    let mut buf = String::new();
    let n = io::stdin().lock().read_line(&mut buf)
      .context("failed to read from stdin")?;
    if n == 0
    {   return Ok(None);
    }
    Ok(Some(buf.trim_end_matches(['\r', '\n']).to_string()))
}

async fn run_one(
  service: &PackageService
, result_label: &str
, request: &GenerationRequest
) -> Result<()>
{   println!("{}", style("Generating...").green());
    match service.generate(request).await
    {   Ok(text) => {
          println!("{} {}\n", style(result_label).green(), text.trim());
        }
      , Err(e) => {
          println!("{} {}\n", style("Error:").red().bold(), e);
        }
    }
    Ok(())
}

/// Run the package examples, then loop on user input until the
/// user declines another round or stdin closes
pub async fn run(service: &PackageService) -> Result<()>
{   let package = service.package();
    let result_label = format!("{}:", capitalize(package.name()));
    let parameters = package.parameters();

    println!("{}\n", style(package.description()).bold());

    let examples = package.examples();
    if !examples.is_empty()
    {   println!("{}", style("First, let's run through some examples...").green());
        for example in &examples
        {   for (key, value) in example
            {   println!("{} {}", style(format!("{}:", capitalize(key))).dim(), value);
            }
            run_one(service, &result_label, example).await?;
        }
    }

    println!("{}", style("Now, try with your own inputs...").green());

    loop
    {   let mut request = GenerationRequest::new();
        for param in &parameters
        {   if let Some(choices) = &param.choices
            {   println!(
                  "{}",
                  style(format!("Valid {}s are: {}", param.name, choices.join(", "))).dim()
                );
            }
            let label = format!("{}: ", capitalize(param.name));
            let Some(value) = read_line(&style(label).green().to_string())?
            else
            {   return Ok(());
            };
            if value.trim().is_empty() && !param.required
            {   continue;
            }
            request.insert(param.name.to_string(), value);
        }

        run_one(service, &result_label, &request).await?;

        let again = read_line(
          &style("Generate another (y/n)? ").green().to_string()
        )?;
        println!();
        match again
        {   Some(answer) if answer.trim().eq_ignore_ascii_case("y") => continue
          , _ => break
        }
    }

    println!("Ready to share with your friends (and the world)?");
    println!(
      "Run {} to get a production-ready API endpoint.",
      style("quipster serve").green()
    );
    Ok(())
}
