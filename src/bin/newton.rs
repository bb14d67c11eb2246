// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;
extern crate newton_fractal;
extern crate num;
#[macro_use]
extern crate serde_json;

use clap::{App, Arg, ArgMatches};
use failure::Error;
use newton_fractal::config::MAX_ITERATIONS_CEILING;
use newton_fractal::{Config, FailurePolicy, Image, NewtonFractal, PolynomialConfig, SampleGrid};
use num::Complex;
use std::fs::{create_dir_all, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

fn parse_pair<T>(s: &str, separator: char) -> Option<(T, T)>
where
    T: FromStr,
{
    match s.find(separator) {
        None => None,
        Some(index) => match (T::from_str(&s[..index]), T::from_str(&s[index + 1..])) {
            (Ok(l), Ok(r)) => Some((l, r)),
            _ => None,
        },
    }
}

/// "re,im", or just "re" for a real number.
fn parse_complex(s: &str) -> Option<Complex<f64>> {
    let s = s.trim();
    if s.contains(',') {
        parse_pair(s, ',').map(|(re, im)| Complex { re, im })
    } else {
        f64::from_str(s).ok().map(|re| Complex { re, im: 0.0 })
    }
}

/// Complex numbers separated by semicolons.
fn parse_complex_list(s: &str) -> Option<Vec<Complex<f64>>> {
    s.split(';').map(parse_complex).collect()
}

fn validate_pair<T: FromStr>(s: &str, separator: char, err: &str) -> Result<(), String> {
    match parse_pair::<T>(s, separator) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_list(s: &str, err: &str) -> Result<(), String> {
    match parse_complex_list(s) {
        Some(_) => Ok(()),
        None => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    high: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low && i <= high {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const OUTPUT: &str = "output";
const FIGURES: &str = "figures";
const ROOTS: &str = "roots";
const COEFFICIENTS: &str = "coefficients";
const REAL: &str = "real";
const IMAG: &str = "imag";
const SIZE: &str = "size";
const THREADS: &str = "threads";
const ITERATIONS: &str = "iterations";
const TOLERANCE: &str = "tolerance";
const SATURATION: &str = "saturation";
const TIMEOUT: &str = "timeout";
const STRICT: &str = "strict";

fn args<'a>() -> ArgMatches<'a> {
    App::new("newton")
        .version("0.1.0")
        .author("Elf M. Sternberg <elf.sternberg@gmail.com>")
        .about("Newton fractal renderer")
        .arg(
            Arg::with_name(OUTPUT)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file; .json writes the RGB array, anything else an image"),
        )
        .arg(
            Arg::with_name(FIGURES)
                .long(FIGURES)
                .takes_value(true)
                .default_value("Figures")
                .help("Folder for the output when no file is named"),
        )
        .arg(
            Arg::with_name(ROOTS)
                .long(ROOTS)
                .allow_hyphen_values(true)
                .short("r")
                .takes_value(true)
                .conflicts_with(COEFFICIENTS)
                .validator(|s| validate_list(&s, "Could not parse the roots"))
                .help("Roots of the polynomial, as re,im;re,im;..."),
        )
        .arg(
            Arg::with_name(COEFFICIENTS)
                .long(COEFFICIENTS)
                .allow_hyphen_values(true)
                .short("c")
                .takes_value(true)
                .validator(|s| validate_list(&s, "Could not parse the coefficients"))
                .help("Coefficients of the polynomial, lowest power first, as re,im;re,im;..."),
        )
        .arg(
            Arg::with_name(REAL)
                .long(REAL)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2,2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse the real range"))
                .help("Real range of the plane, as min,max"),
        )
        .arg(
            Arg::with_name(IMAG)
                .long(IMAG)
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("-2,2")
                .validator(|s| validate_pair::<f64>(&s, ',', "Could not parse the imaginary range"))
                .help("Imaginary range of the plane, as min,max"),
        )
        .arg(
            Arg::with_name(SIZE)
                .long(SIZE)
                .short("s")
                .takes_value(true)
                .default_value("200")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        16_384,
                        "Could not parse the image size",
                        "Image size must be between 1 and 16384",
                    )
                })
                .help("Width and height of the output image"),
        )
        .arg(
            Arg::with_name(THREADS)
                .long(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("16")
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        usize::max_value(),
                        "Could not parse thread count",
                        "Thread count must be at least 1",
                    )
                })
                .help("Number of threads to use; capped at the number of cores"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .long(ITERATIONS)
                .short("i")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range(
                        &s,
                        0,
                        MAX_ITERATIONS_CEILING,
                        "Could not parse iteration count",
                        &format!("Iteration count must be at most {}", MAX_ITERATIONS_CEILING),
                    )
                })
                .help("Newton steps allowed per point"),
        )
        .arg(
            Arg::with_name(TOLERANCE)
                .long(TOLERANCE)
                .takes_value(true)
                .default_value("1e-3")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        std::f64::MAX,
                        "Could not parse the tolerance",
                        "Tolerance must be positive",
                    )
                })
                .help("Relative distance to a root that counts as reaching it"),
        )
        .arg(
            Arg::with_name(SATURATION)
                .long(SATURATION)
                .takes_value(true)
                .default_value("0.75")
                .validator(|s| {
                    validate_range(
                        &s,
                        0.0,
                        1.0,
                        "Could not parse the saturation",
                        "Saturation must be between 0 and 1",
                    )
                })
                .help("Saturation of the root colors"),
        )
        .arg(
            Arg::with_name(TIMEOUT)
                .long(TIMEOUT)
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        0.0,
                        1e9,
                        "Could not parse the timeout",
                        "Timeout must be a non-negative number of seconds",
                    )
                })
                .help("Give up after this many seconds"),
        )
        .arg(
            Arg::with_name(STRICT)
                .long(STRICT)
                .help("Fail instead of painting points that find no root"),
        )
        .get_matches()
}

// Arguments have already been validated, so a failed parse here means
// a default value is broken.
fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> Result<T, Error> {
    matches
        .value_of(name)
        .and_then(|s| T::from_str(s).ok())
        .ok_or_else(|| format_err!("Could not parse --{}", name))
}

fn range(matches: &ArgMatches, name: &str) -> Result<(f64, f64), Error> {
    matches
        .value_of(name)
        .and_then(|s| parse_pair(s, ','))
        .ok_or_else(|| format_err!("Could not parse --{}", name))
}

/// The roots or coefficients on the command line, or else
/// z^8 + 15z^5 - 16.
fn polynomial_config(matches: &ArgMatches) -> PolynomialConfig {
    let list = |name| matches.value_of(name).and_then(parse_complex_list);
    match (list(ROOTS), list(COEFFICIENTS)) {
        (Some(roots), _) => PolynomialConfig::from_roots(roots),
        (None, Some(coefficients)) => PolynomialConfig::from_coefficients(coefficients),
        (None, None) => {
            let mut coefficients = vec![Complex::new(0.0, 0.0); 9];
            coefficients[0] = Complex::new(-16.0, 0.0);
            coefficients[5] = Complex::new(15.0, 0.0);
            coefficients[8] = Complex::new(1.0, 0.0);
            PolynomialConfig::from_coefficients(coefficients)
        }
    }
}

fn config(matches: &ArgMatches) -> Result<Config, Error> {
    let timeout = match matches.value_of(TIMEOUT) {
        Some(_) => {
            let seconds: f64 = value(matches, TIMEOUT)?;
            Some(Duration::from_millis((seconds * 1000.0) as u64))
        }
        None => None,
    };
    Ok(Config {
        max_iterations: value(matches, ITERATIONS)?,
        tolerance: value(matches, TOLERANCE)?,
        saturation: value(matches, SATURATION)?,
        concurrency: value(matches, THREADS)?,
        timeout,
        failure_policy: if matches.is_present(STRICT) {
            FailurePolicy::Abort
        } else {
            FailurePolicy::Sentinel
        },
        ..Config::default()
    })
}

fn write_json(path: &Path, image: &Image) -> Result<(), Error> {
    let output = BufWriter::new(File::create(path)?);
    serde_json::to_writer(output, &json!({ "rgb": image.to_rgb8() }))?;
    Ok(())
}

fn run() -> Result<(), Error> {
    let matches = args();
    let fractal = NewtonFractal::from_config(&polynomial_config(&matches), &config(&matches)?)?;
    let grid = SampleGrid::new(range(&matches, REAL)?, range(&matches, IMAG)?, value(&matches, SIZE)?)?;

    let output = match matches.value_of(OUTPUT) {
        Some(output) => PathBuf::from(output),
        None => {
            let mut path = PathBuf::from(matches.value_of(FIGURES).unwrap_or("Figures"));
            path.push(format!("{}.png", fractal.polynomial()));
            path
        }
    };

    let render = fractal.render(&grid)?;
    if render.report.failures() > 0 {
        eprintln!(
            "{} of {} points found no root",
            render.report.failures(),
            render.report.total()
        );
    }

    if let Some(dir) = output.parent() {
        if !dir.as_os_str().is_empty() {
            create_dir_all(dir)?;
        }
    }
    info!("writing {}", output.display());
    match output.extension().and_then(|e| e.to_str()) {
        Some("json") => write_json(&output, &render.image)?,
        _ => render.image.save(&output)?,
    }
    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
