// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
extern crate failure;
extern crate image;
#[macro_use]
extern crate log;
extern crate mandelfill;

use clap::{App, Arg, ArgMatches};
use image::pnm::PNMEncoder;
use image::pnm::{PNMSubtype, SampleEncoding};
use image::ColorType;
use mandelfill::{render_with, Framebuffer, Method, Mode, Regime, RenderConfig};
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

fn validate<T>(s: &str) -> Result<(), String>
where
    T: FromStr,
    T::Err: ToString,
{
    T::from_str(s).map(|_| ()).map_err(|e| e.to_string())
}

fn validate_range<T: FromStr + Ord>(
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
const MODE: &str = "mode";
const REGIME: &str = "regime";
const METHOD: &str = "method";
const TILE: &str = "tile";

fn args<'a>() -> ArgMatches<'a> {
    App::new("mandel")
        .version("0.1.0")
        .author(env!("CARGO_PKG_AUTHORS"))
        .about("Mandelbrot renderer using border-tracing subdivision")
        .arg(
            Arg::with_name(OUTPUT)
                .required(true)
                .long(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file (binary PPM)"),
        )
        .arg(
            Arg::with_name(MODE)
                .required(false)
                .long(MODE)
                .short("m")
                .takes_value(true)
                .default_value("lores")
                .validator(|s| validate::<Mode>(&s))
                .help("Display mode: hires (640x400), lores (320x200) or lores240 (320x240)"),
        )
        .arg(
            Arg::with_name(REGIME)
                .required(false)
                .long(REGIME)
                .short("r")
                .takes_value(true)
                .default_value("fixed")
                .validator(|s| validate::<Regime>(&s))
                .help("Arithmetic for the escape-time loop: fixed or float"),
        )
        .arg(
            Arg::with_name(METHOD)
                .required(false)
                .long(METHOD)
                .takes_value(true)
                .default_value("subdivide")
                .validator(|s| validate::<Method>(&s))
                .help("Rasterizer: subdivide or scan"),
        )
        .arg(
            Arg::with_name(TILE)
                .required(false)
                .long(TILE)
                .short("t")
                .takes_value(true)
                .validator(|s| {
                    validate_range(
                        &s,
                        1,
                        64,
                        "Could not parse tile size",
                        "Tile size must be between 1 and 64",
                    )
                })
                .help("Minimum tile size before pixels are evaluated one by one (default: per mode)"),
        )
        .get_matches()
}

fn write_image(outfile: &str, pixels: &[u8], bounds: (usize, usize)) -> Result<(), std::io::Error> {
    let path = Path::new(outfile);
    let output = File::create(&path)?;
    let mut encoder =
        PNMEncoder::new(output).with_subtype(PNMSubtype::Pixmap(SampleEncoding::Binary));
    encoder.encode(pixels, bounds.0 as u32, bounds.1 as u32, ColorType::RGB(8))?;
    Ok(())
}

fn run(matches: &ArgMatches) -> Result<(), failure::Error> {
    // The validators have already vetted every value.
    let mode = Mode::from_str(matches.value_of(MODE).unwrap_or("lores"))?;
    let regime = Regime::from_str(matches.value_of(REGIME).unwrap_or("fixed"))?;
    let method = Method::from_str(matches.value_of(METHOD).unwrap_or("subdivide"))?;
    let mut config = RenderConfig::for_mode(mode)
        .with_regime(regime)
        .with_method(method);
    if let Some(tile) = matches.value_of(TILE) {
        config = config.with_tile_min(usize::from_str(tile)?);
    }

    let viewport = mode.viewport();
    let mut framebuffer = Framebuffer::new(viewport.width(), viewport.height());

    let start = Instant::now();
    let stats = render_with(&mut framebuffer, &viewport, &config)?;
    let elapsed = start.elapsed();
    info!(
        "{} of {} pixels evaluated, {} filled",
        stats.evaluated,
        viewport.len(),
        stats.filled
    );
    println!(
        "Rendered {}x{} in {}.{:03}s",
        viewport.width(),
        viewport.height(),
        elapsed.as_secs(),
        elapsed.subsec_millis()
    );

    let outfile = matches.value_of(OUTPUT).unwrap_or("mandel.ppm");
    write_image(
        outfile,
        &framebuffer.to_rgb8(),
        (viewport.width(), viewport.height()),
    )?;
    info!("wrote {}", outfile);
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let matches = args();
    if let Err(e) = run(&matches) {
        eprintln!("Render failure: {}", e);
        std::process::exit(1);
    }
}
