use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use gst_invoice_lib::{
  AppState, FormUpdate, IndianState, InvoiceError, InvoiceForm, Notice, NoticeLevel, Session,
  Settings,
};
use time::OffsetDateTime;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "gst-invoice", version, about = "Create GST invoices and export them as PDF")]
struct Cli {
  /// JSON settings file (QR size, page size, font, output directory).
  #[arg(long, global = true)]
  config: Option<PathBuf>,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Print or write an invoice draft to fill in.
  Template {
    /// Pre-fill with example data instead of an empty draft.
    #[arg(long)]
    sample: bool,

    /// Home state for both parties of an empty draft.
    #[arg(long, default_value = "Karnataka")]
    state: String,

    #[arg(long)]
    out: Option<PathBuf>,
  },

  /// Validate a draft and print the invoice preview.
  Preview {
    #[arg(long)]
    input: PathBuf,
  },

  /// Validate a draft and write `Invoice-<number>.pdf`.
  Export {
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    out_dir: Option<PathBuf>,
  },

  /// Edit, review and download interactively.
  Session {
    #[arg(long)]
    input: Option<PathBuf>,
  },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into()),
    )
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let cli = Cli::parse();
  let settings = Arc::new(Settings::load(cli.config.as_deref())?);
  let today = OffsetDateTime::now_utc().date();

  match cli.command {
    Command::Template { sample, state, out } => {
      let form = if sample {
        InvoiceForm::new(today)
      } else {
        InvoiceForm::blank(today, state.parse::<IndianState>()?)
      };
      let json = form.to_json()?;
      match out {
        Some(path) => {
          tokio::fs::write(&path, json).await?;
          println!("Draft written to {}", path.display());
        }
        None => println!("{json}"),
      }
    }

    Command::Preview { input } => {
      let mut session = Session::with_form(settings, today, read_draft(&input).await?);
      submit_or_report(&mut session).await?;
      if let Some(preview) = session.preview() {
        println!("{preview}");
      }
    }

    Command::Export { input, out_dir } => {
      let settings = match out_dir {
        Some(dir) => Arc::new(Settings {
          output_dir: dir,
          ..(*settings).clone()
        }),
        None => settings,
      };
      let mut session = Session::with_form(settings, today, read_draft(&input).await?);
      submit_or_report(&mut session).await?;

      let result = session.download().await;
      print_notice(&Notice::for_download(&result));
      let path = result?;
      println!("{}", path.display());
    }

    Command::Session { input } => {
      let session = match input {
        Some(path) => Session::with_form(settings, today, read_draft(&path).await?),
        None => Session::new(settings, today),
      };
      run_session(session).await?;
    }
  }

  Ok(())
}

async fn read_draft(path: &Path) -> anyhow::Result<InvoiceForm> {
  let raw = tokio::fs::read_to_string(path)
    .await
    .map_err(|e| anyhow::anyhow!("cannot read draft {}: {e}", path.display()))?;
  Ok(InvoiceForm::from_json(&raw)?)
}

async fn submit_or_report(session: &mut Session) -> anyhow::Result<()> {
  match session.submit().await {
    Ok(notice) => {
      print_notice(&notice);
      Ok(())
    }
    Err(InvoiceError::Validation(errors)) => {
      print_violations(&errors);
      anyhow::bail!("invoice draft has {} invalid field(s)", errors.violations().len())
    }
    Err(e) => Err(e.into()),
  }
}

fn print_notice(notice: &Notice) {
  let tag = match notice.level {
    NoticeLevel::Success => "ok",
    NoticeLevel::Error => "error",
    NoticeLevel::Info => "info",
  };
  println!("[{tag}] {}", notice.message);
}

fn print_violations(errors: &gst_invoice_lib::ValidationErrors) {
  println!("Please fix the following fields:");
  for v in errors.violations() {
    println!("  {}: {}", v.field, v.message);
  }
}

const SESSION_HELP: &str = "\
Commands:
  show                 print the draft (editing) or the invoice preview (reviewing)
  set KEY VALUE        change a field, e.g. `set supplier.state Tamil Nadu`,
                       `set invoice.dueDate 2025-04-30`, `set item.2.rate 1500`
  add-item             append an empty line item
  remove-item N        remove line item N (1-based)
  submit               validate the draft and review the invoice
  download             write the reviewed invoice as PDF
  reset                discard everything and start a new invoice
  save FILE            write the draft as JSON
  help                 show this text
  quit                 leave";

async fn run_session(mut session: Session) -> anyhow::Result<()> {
  println!("{SESSION_HELP}");
  let mut lines = BufReader::new(tokio::io::stdin()).lines();

  loop {
    let prompt = if session.is_reviewing() { "review" } else { "edit" };
    print!("{prompt}> ");
    std::io::stdout().flush()?;

    let Some(line) = lines.next_line().await? else {
      break;
    };
    let line = line.trim();
    if line.is_empty() {
      continue;
    }

    let (command, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
      "quit" | "exit" => break,
      "help" => println!("{SESSION_HELP}"),
      "show" => match session.state() {
        AppState::Editing(form) => println!("{}", form.to_json()?),
        AppState::Reviewing { preview } => println!("{preview}"),
      },
      "set" => {
        let Some((key, value)) = rest.split_once(char::is_whitespace) else {
          println!("usage: set KEY VALUE");
          continue;
        };
        let Some(form) = session.form_mut() else {
          println!("The invoice is under review; use `reset` to start a new one.");
          continue;
        };
        match FormUpdate::parse(key, value.trim()).and_then(|u| form.update(u)) {
          Ok(()) => println!("{key} updated"),
          Err(e) => println!("{e}"),
        }
      }
      "add-item" => match session.form_mut() {
        Some(form) => println!("Line item {} added", form.add_item()),
        None => println!("The invoice is under review; use `reset` to start a new one."),
      },
      "remove-item" => {
        let Some(position) = rest.parse::<usize>().ok().filter(|n| *n > 0) else {
          println!("usage: remove-item N (N starts at 1)");
          continue;
        };
        let Some(form) = session.form_mut() else {
          println!("The invoice is under review; use `reset` to start a new one.");
          continue;
        };
        match form.remove_item(position - 1) {
          Ok(item) => println!("Removed line item {position} ({})", item.description),
          Err(e) => println!("{e}"),
        }
      }
      "submit" => match session.submit().await {
        Ok(notice) => {
          print_notice(&notice);
          if let Some(preview) = session.preview() {
            println!("{preview}");
          }
        }
        Err(InvoiceError::Validation(errors)) => print_violations(&errors),
        Err(e) => println!("{e}"),
      },
      "download" => {
        let result = session.download().await;
        print_notice(&Notice::for_download(&result));
        match result {
          Ok(path) => println!("Saved {}", path.display()),
          Err(e) => println!("{e}"),
        }
      }
      "reset" => print_notice(&session.reset()),
      "save" => {
        if rest.is_empty() {
          println!("usage: save FILE");
          continue;
        }
        let Some(form) = session.form() else {
          println!("The invoice is under review; use `reset` to start a new one.");
          continue;
        };
        let json = form.to_json()?;
        match tokio::fs::write(rest, json).await {
          Ok(()) => println!("Draft saved to {rest}"),
          Err(e) => println!("cannot write {rest}: {e}"),
        }
      }
      other => println!("Unknown command `{other}`; type `help`."),
    }
  }

  Ok(())
}
