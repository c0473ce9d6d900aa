use std::io::{self, BufRead, IsTerminal, Read};

use anyhow::{Result, anyhow};
use clap::Parser;
use menu_braille::{DocumentFormat, DocumentMode, Presentation};

#[derive(Parser, Debug)]
#[command(
    name = "menu-braille",
    version,
    about = "Transliterate menu text into Grade-1 Braille and render reviewable documents"
)]
struct Cli {
    /// Text file to transliterate (reads stdin when omitted)
    #[arg(short = 'd', long = "data")]
    data: Option<String>,

    /// Write the rendered document to this path
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    /// Document layout: sequential or side-by-side
    #[arg(long = "mode")]
    mode: Option<DocumentMode>,

    /// Document format: pdf or html (default: from --output extension, then settings)
    #[arg(long = "format")]
    format: Option<DocumentFormat>,

    /// Braille form shown in output: glyph or ascii
    #[arg(long = "presentation")]
    presentation: Option<Presentation>,

    /// Document title
    #[arg(short = 't', long = "title")]
    title: Option<String>,

    /// Maximum characters per wrapped line
    #[arg(short = 'w', long = "width")]
    width: Option<usize>,

    /// Ask the summarizer for a context summary of long input
    #[arg(long = "summary")]
    summary: bool,

    /// Print the result and metadata as JSON
    #[arg(long = "json")]
    json: bool,

    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<String>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,

    /// Interactive mode
    #[arg(short = 'i', long = "interactive")]
    interactive: bool,

    /// Run the HTTP server on this address (e.g. 127.0.0.1:8787)
    #[arg(long = "server")]
    server: Option<String>,
}

impl Cli {
    fn config(&self) -> menu_braille::Config {
        menu_braille::Config {
            data: self.data.clone(),
            output: self.output.clone(),
            mode: self.mode,
            format: self.format,
            presentation: self.presentation,
            title: self.title.clone(),
            line_width: self.width,
            summary: self.summary,
            json: self.json,
            settings_path: self.read_settings.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(addr) = cli.server.as_deref() {
        menu_braille::logging::init_server(cli.verbose)?;
        return menu_braille::server::run_server(addr, cli.read_settings.as_deref()).await;
    }
    menu_braille::logging::init(cli.verbose)?;
    if cli.interactive {
        return run_interactive(cli).await;
    }

    let input = if cli.data.is_some() {
        None
    } else if io::stdin().is_terminal() {
        return Err(anyhow!("no input: pass --data <FILE> or pipe text on stdin"));
    } else {
        let mut buffer = Vec::new();
        io::stdin().read_to_end(&mut buffer)?;
        Some(buffer)
    };

    let output = menu_braille::run(cli.config(), input).await?;
    println!("{}", output);
    Ok(())
}

struct InteractiveState {
    config: menu_braille::Config,
}

impl InteractiveState {
    fn new(cli: &Cli) -> Self {
        let mut config = cli.config();
        config.data = None;
        config.output = None;
        Self { config }
    }
}

async fn run_interactive(cli: Cli) -> Result<()> {
    use std::io::Write;

    let mut state = InteractiveState::new(&cli);
    let converter = menu_braille::build_converter(&state.config)?;
    println!("Interactive mode. Use /quit or /exit to finish.");
    println!("Type /help to see available commands.");

    let mut line = String::new();
    let stdin = io::stdin();
    let mut stdin_lock = stdin.lock();
    loop {
        line.clear();
        print!("> ");
        io::stdout().flush()?;
        if stdin_lock.read_line(&mut line)? == 0 {
            break;
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.starts_with('/') {
            if handle_interactive_command(input, &mut state)? {
                break;
            }
            continue;
        }

        let bytes = Some(input.as_bytes().to_vec());
        match menu_braille::run_with(&converter, state.config.clone(), bytes).await {
            Ok(output) => println!("{}", output),
            Err(err) => eprintln!("error: {:#}", err),
        }
    }
    Ok(())
}

fn handle_interactive_command(input: &str, state: &mut InteractiveState) -> Result<bool> {
    let trimmed = input.trim();
    if matches!(trimmed, "/quit" | "/exit") {
        return Ok(true);
    }
    if trimmed == "/help" {
        print_interactive_help();
        return Ok(false);
    }

    if let Some(arg) = trimmed.strip_prefix("/width") {
        let value = arg.trim();
        if value.is_empty() {
            match state.config.line_width {
                Some(width) => println!("width: {}", width),
                None => println!("width: (settings)"),
            }
        } else {
            let width = value
                .parse::<usize>()
                .ok()
                .filter(|width| *width > 0)
                .ok_or_else(|| anyhow!("width must be a positive number"))?;
            state.config.line_width = Some(width);
            println!("width set to {}", width);
        }
        return Ok(false);
    }
    if let Some(arg) = trimmed.strip_prefix("/presentation") {
        let value = arg.trim();
        if value.is_empty() {
            println!(
                "presentation: {}",
                state
                    .config
                    .presentation
                    .map(|presentation| presentation.as_str())
                    .unwrap_or("(settings)")
            );
        } else {
            let presentation = value.parse::<Presentation>()?;
            state.config.presentation = Some(presentation);
            println!("presentation set to {}", presentation.as_str());
        }
        return Ok(false);
    }
    if let Some(arg) = trimmed.strip_prefix("/summary") {
        state.config.summary = parse_toggle(arg, state.config.summary)?;
        println!("summary: {}", state.config.summary);
        return Ok(false);
    }
    if let Some(arg) = trimmed.strip_prefix("/json") {
        state.config.json = parse_toggle(arg, state.config.json)?;
        println!("json: {}", state.config.json);
        return Ok(false);
    }

    eprintln!("unknown command: {}", trimmed);
    Ok(false)
}

fn parse_toggle(arg: &str, current: bool) -> Result<bool> {
    let value = arg.trim();
    if value.is_empty() {
        return Ok(!current);
    }
    match value.to_lowercase().as_str() {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => Err(anyhow!("expected on/off/true/false/1/0")),
    }
}

fn print_interactive_help() {
    println!("Commands:");
    println!("  /quit, /exit                 Exit interactive mode");
    println!("  /width <n>                   Set wrap width (or show current)");
    println!("  /presentation <glyph|ascii>  Set printed form (or show current)");
    println!("  /summary [on|off]            Toggle context summary");
    println!("  /json [on|off]               Toggle JSON output");
}
