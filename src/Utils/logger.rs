use chrono::Local;
use csv::Writer;
use log::LevelFilter;
use nalgebra::DMatrix;
use simplelog::*;
use std::fs::File;
use std::io;

/// `log_<prefix>_<date>_<time>.txt`
pub fn log_file_name(prefix: &str) -> String {
    let date_and_time = Local::now().format("%Y-%m-%d_%H-%M-%S");
    if prefix.is_empty() {
        format!("log_{}.txt", date_and_time)
    } else {
        format!("log_{}_{}.txt", prefix.replace(' ', "_"), date_and_time)
    }
}

/// Terminal logger plus an optional file logger. The global logger can only be installed
/// once per process; later calls only move the maximum level. Returns true when this call
/// installed it.
pub fn init_logger(level: LevelFilter, log_file: Option<&str>) -> bool {
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    if level != LevelFilter::Off {
        loggers.push(TermLogger::new(
            level,
            Config::default(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ));
        if let Some(filename) = log_file {
            match File::create(filename) {
                Ok(file) => loggers.push(WriteLogger::new(level, Config::default(), file)),
                Err(e) => eprintln!("cannot open log file {}: {}", filename, e),
            }
        }
    }
    let installed = !loggers.is_empty() && CombinedLogger::init(loggers).is_ok();
    log::set_max_level(level);
    installed
}

/// one row per sample: `arg, headers...`
pub fn save_matrix_to_csv(
    matrix: &DMatrix<f64>,
    headers: &[String],
    filename: &str,
    x_mesh: &[f64],
    arg: &str,
) -> io::Result<()> {
    if x_mesh.len() != matrix.nrows() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "{} sample times for {} rows",
                x_mesh.len(),
                matrix.nrows()
            ),
        ));
    }
    let file = File::create(filename)?;
    let mut writer = Writer::from_writer(file);

    let mut headers_with_x = Vec::with_capacity(headers.len() + 1);
    headers_with_x.push(arg.to_string());
    headers_with_x.extend(headers.iter().cloned());
    writer.write_record(&headers_with_x)?;

    for (i, row) in matrix.row_iter().enumerate() {
        let mut row_data = Vec::with_capacity(row.len() + 1);
        row_data.push(x_mesh[i].to_string());
        row_data.extend(row.iter().map(|&val| val.to_string()));
        writer.write_record(&row_data)?;
    }

    writer.flush()?;
    Ok(())
}
