#![allow(non_snake_case)]
use RustedCalculus::Utils::logger::save_plot_bundle_to_csv;
use RustedCalculus::Utils::logging::{init_logging, timestamped_log_name};
use RustedCalculus::Utils::settings::Settings;
use RustedCalculus::calculus::{self, CalculusError};
use log::info;
use std::env;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tabled::{Table, settings::Style};

/// usage: RustedCalculus [settings.toml]
fn main() -> ExitCode {
    let settings = match env::args().nth(1) {
        Some(path) => match Settings::from_file(Path::new(&path)) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("{}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };
    let log_file = settings.log_to_file.then(|| {
        settings
            .log_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(timestamped_log_name()))
    });
    if let Err(e) = init_logging(settings.loglevel, log_file) {
        eprintln!("cannot create log file: {}", e);
    }
    match run(&settings) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &Settings) -> Result<(), CalculusError> {
    let (x_min, x_max) = settings.repaired_range();
    let expr = calculus::parse(&settings.function)?;
    let class = calculus::classify(&settings.function);
    println!("f(x) = {}    [{}]", expr, class);
    println!("LaTeX: {}\n", expr.to_latex());
    println!("{}\n", calculus::analyze_function(&settings.function));

    let bundle = calculus::assemble(&expr, x_min, x_max, &settings.plot_options())?;
    if let Some(derivative) = &bundle.derivative_expr {
        println!("f^({})(x) = {}", bundle.derivative_order, derivative);
        println!("LaTeX: {}", derivative.to_latex());
    }
    if let Some(integral) = &bundle.integral_expr {
        println!("∫ f(x) dx = {} + C", integral);
        println!("LaTeX: {} + C", integral.to_latex());
    }
    for failure in &bundle.partial_failures {
        println!("note: {}", failure);
    }
    println!("\nPlot data on [{}, {}]:\n{}", x_min, x_max, bundle.summary_table());

    if let Some(path) = &settings.csv_output {
        save_plot_bundle_to_csv(&bundle, path)?;
        info!("plot data written to {}", path.display());
    }

    let mut suggestions = Table::new(calculus::suggest_functions());
    suggestions.with(Style::modern_rounded());
    println!("\nFunctions to explore:\n{}", suggestions);
    Ok(())
}
