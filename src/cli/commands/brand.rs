//! `gear brand` command - Brand domain and logo lookup

use console::style;
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use crate::cli::helpers::Workspace;
use crate::cli::{GlobalOpts, OutputFormat};

const LOGO_SERVICE: &str = "https://logo.clearbit.com";

#[derive(clap::Args, Debug)]
pub struct BrandArgs {
    /// Brand name, e.g. "Sea to Summit"
    pub brand: String,
}

#[derive(Debug, Serialize)]
struct BrandInfo {
    brand: String,
    domain: Option<String>,
    logo: Option<String>,
}

/// Logo image URL for a bare domain
pub fn logo_url(domain: &str) -> String {
    format!("{}/{}", LOGO_SERVICE, domain)
}

pub fn run(args: BrandArgs, global: &GlobalOpts) -> Result<()> {
    let ws = Workspace::open(global)?;
    let brand = args.brand.trim();
    if brand.is_empty() {
        return Err(miette::miette!("brand name is empty"));
    }

    let collaborator = ws.collaborator();
    if !collaborator.is_available() {
        return Err(miette::miette!(
            help = "set GEMINI_API_KEY or enable ai in .gear/config.yaml",
            "brand lookup is unavailable"
        ));
    }

    let domain = collaborator.brand_domain(brand);
    let info = BrandInfo {
        brand: brand.to_string(),
        logo: domain.as_deref().map(logo_url),
        domain,
    };

    match ws.format(global, OutputFormat::Tsv) {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&info).into_diagnostic()?),
        OutputFormat::Yaml => print!("{}", serde_yml::to_string(&info).into_diagnostic()?),
        _ => match (&info.domain, &info.logo) {
            (Some(domain), Some(logo)) => {
                println!("{}\t{}", domain, logo);
            }
            _ => println!("{} no domain found for {}", style("!").yellow(), style(brand).cyan()),
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logo_url() {
        assert_eq!(logo_url("msrgear.com"), "https://logo.clearbit.com/msrgear.com");
    }
}
