//! Report Renderer
//!
//! Renders a birthday, wedding day or congregation register report from a
//! payload JSON file. Fonts are looked up under `assets/fonts` relative to the
//! current directory, then beside the executable; without them the report
//! falls back to built-in Times and Tamil text is drawn without shaping.
//!
//! Usage:
//!   cargo run --example render_report -- <birthday|wedding|register> <payload.json> [output_dir] [config.json]
//!
//! Examples:
//!   RUST_LOG=info cargo run --example render_report -- birthday demos/data/birthday_payload.json
//!   cargo run --example render_report -- register demos/data/register_payload.json output

use report::{
    parse_family_payload, parse_register_payload, AssetLoader, FamilyBlockRenderer,
    OutputAction, RegisterRenderer, ReportComposer, ReportConfig,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!(
            "Usage: {} <birthday|wedding|register> <payload.json> [output_dir] [config.json]",
            args[0]
        );
        std::process::exit(1);
    }

    let kind = args[1].as_str();
    let payload_json = std::fs::read_to_string(&args[2])
        .map_err(|e| format!("Failed to read payload '{}': {}", args[2], e))?;
    let output_dir = args.get(3).map(String::as_str).unwrap_or("output");
    let config = match args.get(4) {
        Some(path) => ReportConfig::from_json(&std::fs::read_to_string(path)?)?,
        None => ReportConfig::default(),
    };

    let loader = AssetLoader::standard(&config, std::env::current_dir()?);
    let mut composer = ReportComposer::new(config.clone(), &loader);
    println!("Latin font tier: {:?}", composer.latin_tier());
    println!("Tamil rasterizer ready: {}", composer.rasterizer().is_ready());

    let output = match kind {
        "birthday" | "wedding" => {
            let payload = parse_family_payload(&payload_json)?;
            let renderer = if kind == "birthday" {
                FamilyBlockRenderer::birthday(&config)
            } else {
                FamilyBlockRenderer::wedding(&config)
            };
            composer.render(
                &renderer,
                &payload.records,
                &payload.church,
                &payload.options,
                OutputAction::Download,
            )?
        }
        "register" => {
            let payload = parse_register_payload(&payload_json)?;
            composer.render(
                &RegisterRenderer::new(),
                &payload.records,
                &payload.church,
                &payload.options,
                OutputAction::Download,
            )?
        }
        other => return Err(format!("unknown report type '{other}'").into()),
    };

    let path = output.write_to(output_dir)?;
    let stats = composer.rasterizer().cache_stats();
    println!(
        "Wrote {} ({} pages, {} bytes)",
        path.display(),
        output.pages,
        output.bytes.len()
    );
    println!(
        "Raster cache: {} hits, {} misses, {} entries",
        stats.hits, stats.misses, stats.entries
    );
    Ok(())
}
