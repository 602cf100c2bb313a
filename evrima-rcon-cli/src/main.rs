mod shell;

use ansi_term::Colour::{Fixed, Green, Red, Yellow};
use clap::Parser;
use evrima_rcon_client::command::{commands_in, definitions};
use evrima_rcon_client::{
    Category, ClientOptions, CommandResult, RconClient, ResponseData, ServerConfig,
};
use log::{error, info, LevelFilter};
use rpassword::read_password;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::io::Write;
use std::time::Duration;

const DEFAULT_PORT: u16 = 8888;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Hostname or IP address of the server, e.g. `127.0.0.1`.
    host: String,

    /// RCON port of the server.
    #[clap(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// RCON password. Prompted for when omitted.
    #[clap(long)]
    password: Option<String>,

    /// Timeout for each network operation, in milliseconds.
    #[clap(long, default_value_t = 5000)]
    timeout: u64,

    /// Do not reconnect automatically when the connection drops.
    #[clap(long)]
    no_reconnect: bool,

    /// Log every packet sent and received.
    #[clap(long)]
    debug: bool,

    /// List the available commands and exit.
    #[clap(long)]
    list: bool,

    /// Read commands line by line from stdin without the interactive editor.
    #[clap(long)]
    no_interactive: bool,

    /// Command to run once instead of starting a shell, e.g. `announce`.
    command: Option<String>,

    /// Parameters for the command, joined with spaces.
    params: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ! {
    let args = Args::parse();

    TermLogger::init(
        if args.debug {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        },
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .unwrap();

    if args.list {
        print_commands(&mut std::io::stdout());
        std::process::exit(0);
    }

    let password = match args.password {
        Some(password) => password,
        None => {
            print!("{}:{}'s password: ", args.host, args.port);
            std::io::stdout().flush().unwrap();
            match read_password() {
                Ok(password) => password,
                Err(err) => {
                    error!("Could not read password: {}", err);
                    std::process::exit(1);
                }
            }
        }
    };

    let server = match ServerConfig::new(args.host, args.port, password) {
        Ok(server) => server,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };
    let options = ClientOptions::default()
        .with_timeout(Duration::from_millis(args.timeout))
        .with_auto_reconnect(!args.no_reconnect)
        .with_debug(args.debug);

    let mut client = match RconClient::new(server, options) {
        Ok(client) => client,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    if let Err(err) = client.connect().await {
        error!("Connection failed: {}", err);
        std::process::exit(1);
    }

    if let Some(command) = args.command {
        let params = args.params.join(" ");
        let params = Some(params.as_str()).filter(|p| !p.is_empty());

        let code = match client.send_command(&command, params).await {
            Ok(result) => {
                print_result(&mut std::io::stdout(), &result);
                if result.success {
                    0
                } else {
                    1
                }
            }
            Err(err) => {
                error!("{}", err);
                1
            }
        };
        client.disconnect();
        std::process::exit(code);
    }

    info!(
        "Connected to {}. View builtins with `!help`. {} {}",
        client.name(),
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    );

    repl_loop(client, args.no_interactive).await
}

async fn repl_loop(mut client: RconClient, disable_interactive: bool) -> ! {
    let prompt = format!("{}> ", Fixed(10).paint(client.name()));
    let (mut read, mut write) = shell::new_shell(prompt, disable_interactive);

    while let Some(line) = read.read_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(builtin) = line.strip_prefix('!') {
            match builtin.trim() {
                "help" => print_help(write.out()),
                "list" => print_commands(write.out()),
                "quit" | "exit" => break,
                _ => {
                    writeln!(write.err(), "Unknown builtin.").ok();
                }
            }
            continue;
        }

        let (command, params) = match line.split_once(char::is_whitespace) {
            Some((command, params)) => (command, Some(params.trim())),
            None => (line, None),
        };

        match client.send_command(command, params).await {
            Ok(result) => print_result(write.out(), &result),
            Err(err) => {
                writeln!(write.err(), "An error occurred: {}", err).ok();
            }
        }
    }

    client.disconnect();
    std::process::exit(0)
}

fn print_help(out: &mut dyn Write) {
    writeln!(
        out,
        "{} {}",
        Green.paint(env!("CARGO_PKG_NAME")),
        env!("CARGO_PKG_VERSION")
    )
    .ok();
    writeln!(out).ok();
    writeln!(out, "{}", Yellow.paint("BUILTINS")).ok();
    writeln!(out, "    !help                View this help listing").ok();
    writeln!(out, "    !list                List the server commands").ok();
    writeln!(out, "    !quit                Disconnect and exit").ok();
    writeln!(
        out,
        "    {}   Run a command on the server",
        Green.paint("<COMMAND> [PARAMS]")
    )
    .ok();
}

fn print_commands(out: &mut dyn Write) {
    let width = definitions().iter().map(|def| def.name.len()).max().unwrap_or(0);

    for category in Category::ALL {
        writeln!(out, "{}", Yellow.paint(category.name().to_uppercase())).ok();
        for def in commands_in(category) {
            let padding = " ".repeat(width - def.name.len());
            write!(
                out,
                "    {}{}  0x{:02x}  {}",
                Green.paint(def.name),
                padding,
                def.opcode,
                def.description
            )
            .ok();
            if def.requires_params {
                write!(out, " {}", Fixed(8).paint("(params)")).ok();
            }
            writeln!(out).ok();
            if let Some(example) = def.example {
                writeln!(out, "    {}  e.g. {}", " ".repeat(width + 6), example).ok();
            }
        }
        writeln!(out).ok();
    }
}

fn print_result(out: &mut dyn Write, result: &CommandResult) {
    if !result.success {
        writeln!(out, "{} {}", Red.paint("error:"), result.text()).ok();
        return;
    }

    match &result.data {
        ResponseData::Text(text) => {
            writeln!(out, "{}", text).ok();
        }
        ResponseData::Players(players) => {
            writeln!(out, "{} player(s) online", players.len()).ok();
            for player in players {
                writeln!(
                    out,
                    "    {}  {}  {}",
                    Green.paint(&player.name),
                    player.id,
                    player.eos_id.as_deref().unwrap_or("-")
                )
                .ok();
            }
        }
        ResponseData::ServerDetails(details) => {
            let fields = [
                ("Name", details.name.clone()),
                ("Map", details.map.clone()),
                (
                    "Players",
                    match (details.current_players, details.max_players) {
                        (Some(current), Some(max)) => Some(format!("{}/{}", current, max)),
                        (Some(current), None) => Some(current.to_string()),
                        (None, Some(max)) => Some(format!("?/{}", max)),
                        (None, None) => None,
                    },
                ),
                ("Password", details.has_password.map(yes_no)),
                ("Whitelist", details.whitelist.map(yes_no)),
                ("Global chat", details.global_chat.map(yes_no)),
                ("Humans", details.humans.map(yes_no)),
                ("Mutations", details.mutations.map(yes_no)),
                ("AI", details.ai.map(yes_no)),
                ("Queue", details.queue.map(yes_no)),
                ("Day length", details.day_length_minutes.map(|m| format!("{} min", m))),
                ("Night length", details.night_length_minutes.map(|m| format!("{} min", m))),
                ("Playables", details.playables.as_ref().map(|p| p.join(", "))),
            ];
            print_fields(out, &fields, result);
        }
        ResponseData::PlayerData(data) => {
            let fields = [
                ("Name", data.name.clone()),
                ("Steam ID", data.steam_id.clone()),
                ("Class", data.class.clone()),
                ("Growth", data.growth.map(|v| v.to_string())),
                ("Health", data.health.map(|v| v.to_string())),
                ("Stamina", data.stamina.map(|v| v.to_string())),
                ("Hunger", data.hunger.map(|v| v.to_string())),
                ("Thirst", data.thirst.map(|v| v.to_string())),
            ];
            print_fields(out, &fields, result);
        }
    }
}

// Falls back to the raw response when nothing could be parsed.
fn print_fields(out: &mut dyn Write, fields: &[(&str, Option<String>)], result: &CommandResult) {
    let mut printed = false;
    for (label, value) in fields {
        if let Some(value) = value {
            writeln!(out, "{}: {}", Yellow.paint(format!("{:>14}", label)), value).ok();
            printed = true;
        }
    }
    if !printed {
        writeln!(out, "{}", result.text()).ok();
    }
}

fn yes_no(value: bool) -> String {
    let text = if value { "yes" } else { "no" };
    text.to_string()
}
