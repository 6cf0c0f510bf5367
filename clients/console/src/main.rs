mod command;
mod render;

use chipjack::{
    Action, Card, Deck, EngineError, Event, HouseEdge, HouseEdgeSource, Snapshot, Step, Table,
    TableRules,
};
use clap::Parser;
use std::cell::Cell;
use std::io::{self, BufRead, Write};
use std::rc::Rc;
use std::thread;
use std::time::Duration;

use command::Command;

type BoxErr = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "chipjack", about = "Single-player chip blackjack in the terminal")]
struct Cli {
    /// Chips at the start of the session
    #[arg(long, env = "STARTING_BANKROLL")]
    bankroll: Option<u64>,

    /// House edge in percent, taken off every win (e.g. "1.5")
    #[arg(long, env = "HOUSE_EDGE", default_value = "0")]
    house_edge: String,

    /// Seed for reproducible shuffles
    #[arg(long, env = "DECK_SEED")]
    seed: Option<u64>,

    /// Force the first draws, comma separated (e.g. "AS,9H,KD,7C")
    #[arg(long, env = "DECK_STACK", value_delimiter = ',')]
    stack: Vec<Card>,

    /// Pause between dealer steps in milliseconds
    #[arg(long, env = "PACE_MS", default_value_t = 600)]
    pace_ms: u64,

    /// Larger bankroll and chips
    #[arg(long)]
    high_roller: bool,

    /// Print events and snapshots as JSON lines
    #[arg(long)]
    json: bool,
}

/// Where rendered output goes: narration plus table view, or JSON lines.
struct Output {
    json: bool,
    pace: Duration,
}

impl Output {
    fn events(&self, events: &[Event]) -> Result<(), BoxErr> {
        for event in events {
            self.event(event)?;
        }
        Ok(())
    }

    fn event(&self, event: &Event) -> Result<(), BoxErr> {
        if self.json {
            println!("{}", serde_json::to_string(event)?);
        } else if let Some(line) = render::event(event) {
            println!("{line}");
        }
        Ok(())
    }

    fn snapshot(&self, snapshot: &Snapshot) -> Result<(), BoxErr> {
        if self.json {
            println!("{}", serde_json::to_string(snapshot)?);
        } else {
            print!("{}", render::snapshot(snapshot));
        }
        Ok(())
    }

    fn step(&self, step: &Step) -> Result<(), BoxErr> {
        thread::sleep(self.pace);
        self.event(&step.event)?;
        if !self.json {
            if let Event::HoleCardRevealed { .. } | Event::CardDealt { .. } = step.event {
                println!("Dealer has {}", step.snapshot.dealer_sum);
            }
        }
        Ok(())
    }

    fn notice(&self, message: &str) {
        println!("{}", self.notice_line(message));
    }

    fn notice_line(&self, message: &str) -> String {
        if self.json {
            serde_json::json!({ "notice": message }).to_string()
        } else {
            message.to_string()
        }
    }
}

fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), BoxErr> {
    let mut rules = if cli.high_roller {
        TableRules::high_roller()
    } else {
        TableRules::default()
    };
    if let Some(bankroll) = cli.bankroll {
        rules = rules.with_bankroll(bankroll);
    }

    let table = match cli.seed {
        Some(seed) => Table::with_seed(rules, seed)?,
        None => Table::new(rules)?,
    };
    let table = if cli.stack.is_empty() {
        table
    } else {
        log::info!("Stacking {} cards on top of the deck", cli.stack.len());
        table.with_deck(Deck::stacked(&cli.stack))
    };

    let edge = Rc::new(Cell::new(HouseEdge::parse_percent(&cli.house_edge)));
    let source = Rc::clone(&edge);
    let mut table = table.with_house_edge(move || source.get().fraction());

    let out = Output {
        json: cli.json,
        pace: Duration::from_millis(cli.pace_ms),
    };
    if !out.json {
        println!("House edge {}. Type 'help' for commands.", render::percent(edge.get()));
    }
    out.snapshot(&table.snapshot())?;

    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut line = String::new();
    loop {
        if !out.json {
            print!("> ");
            io::stdout().flush()?;
        }
        line.clear();
        if input.read_line(&mut line)? == 0 {
            break;
        }

        match Command::parse(&line) {
            Ok(Command::Play(action)) => play(&mut table, action, &out)?,
            Ok(Command::Edge(new_edge)) => {
                edge.set(new_edge);
                log::info!("House edge changed to {}", new_edge.fraction());
                out.notice(&format!("House edge set to {}", render::percent(new_edge)));
            }
            Ok(Command::Show) => out.snapshot(&table.snapshot())?,
            Ok(Command::Help) => out.notice(render::HELP.trim_end()),
            Ok(Command::Quit) => break,
            Err(e) => out.notice(&e.to_string()),
        }

        if table.is_game_over() {
            break;
        }
    }

    log::info!("Session ended with bankroll {}", table.bankroll());
    Ok(())
}

/// Apply one action, then pace out any dealer sequence it started.
fn play<S: HouseEdgeSource>(
    table: &mut Table<S>,
    action: Action,
    out: &Output,
) -> Result<(), BoxErr> {
    match table.apply(action) {
        Ok(events) => out.events(&events)?,
        Err(EngineError::DeckExhausted) => {
            out.notice("The deck ran out mid-round. The round is void and every stake is returned.");
        }
        Err(e) => {
            out.notice(&e.to_string());
            return Ok(());
        }
    }

    for step in table.dealer_play() {
        match step {
            Ok(step) => out.step(&step)?,
            Err(e) => {
                out.notice(&format!("{e}. The round is void and every stake is returned."));
                break;
            }
        }
    }

    out.snapshot(&table.snapshot())
}
