//! Command-line front end for the flatstore catalog.
//!
//! The binary parses a [`Cli`], resolves [`config::Settings`], installs
//! logging and calls [`run`]. Command output is JSON on the given writer.

pub mod cli;
pub mod config;
pub mod logging;

use std::io::Write;

use flatstore_core::{App, Catalog, Review};
use flatstore_error::{FlatError, Result};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use cli::{AppsCommand, Cli, Commands, ReviewsCommand};
use config::Settings;

/// Process exit codes.
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_USAGE: i32 = 2;

/// Exit code for a failed command: bad input is a usage error, everything
/// else a plain failure.
#[must_use]
pub const fn exit_code(err: &FlatError) -> i32 {
    if err.is_user_error() || matches!(err, FlatError::Config { .. }) {
        EXIT_USAGE
    } else {
        EXIT_ERROR
    }
}

fn emit<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)
        .map_err(|err| FlatError::internal(format!("cannot render output: {err}")))?;
    writeln!(out).map_err(|err| FlatError::io("<stdout>", err))
}

fn parse_json<T: serde::de::DeserializeOwned>(what: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).map_err(|err| FlatError::invalid_argument(what, err))
}

/// Execute `cli.command` against the files named in `settings`.
pub fn run<W: Write>(cli: Cli, settings: &Settings, out: &mut W) -> Result<()> {
    let catalog = Catalog::open(settings.catalog_paths());
    debug!(
        app_file = %settings.app_file.display(),
        review_file = %settings.review_file.display(),
        "catalog opened"
    );

    match cli.command {
        Commands::Load => {
            let report = catalog.warm()?;
            emit(out, &report)
        }

        Commands::Apps(AppsCommand::List(args)) => {
            if args.full {
                let apps = catalog.query_apps(args.limit, args.page, &args.price)?;
                emit(out, &apps)
            } else {
                let names = catalog.list_apps(args.limit, args.page, &args.price)?;
                emit(out, &names)
            }
        }
        Commands::Apps(AppsCommand::Add { json }) => {
            let app: App = parse_json("app json", &json)?;
            let name = app.name.clone();
            catalog.add_app(app)?;
            emit(out, &json!({ "added": name }))
        }
        Commands::Apps(AppsCommand::Delete { name }) => {
            let removed = catalog.delete_app(&name)?;
            emit(out, &json!({ "deleted": name, "removed": removed }))
        }

        Commands::Reviews(ReviewsCommand::List(args)) => {
            let reviews = catalog.list_reviews(
                args.app.as_deref(),
                args.sentiment.as_deref(),
                args.polarity_min,
                args.polarity_max,
            )?;
            emit(out, &reviews)
        }
        Commands::Reviews(ReviewsCommand::Add { json }) => {
            let review: Review = parse_json("review json", &json)?;
            let app = review.app.clone();
            catalog.add_review(review)?;
            emit(out, &json!({ "added": app }))
        }
        Commands::Reviews(ReviewsCommand::Delete { app }) => {
            let removed = catalog.delete_reviews_by_app(&app)?;
            emit(out, &json!({ "deleted": app, "removed": removed }))
        }
    }
}
